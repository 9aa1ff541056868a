use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client as HttpClient, Method, StatusCode};
use serde::Deserialize;
use serde_json::Value;

use crate::extractor::{CompanyFacts, NarrativeContent};

use super::payload;
use super::RecordSink;

const DEFAULT_BASE_URL: &str = "https://api.notion.com/v1";
const DEFAULT_NOTION_VERSION: &str = "2022-06-28";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Clone, Debug)]
pub struct NotionClientConfig {
    pub token: Option<String>,
    pub database_id: Option<String>,
    pub base_url: String,
    pub notion_version: String,
    pub timeout: Duration,
}

impl Default for NotionClientConfig {
    fn default() -> Self {
        Self {
            token: std::env::var("NOTION_TOKEN").ok(),
            database_id: std::env::var("NOTION_DATABASE_ID").ok(),
            base_url: DEFAULT_BASE_URL.to_string(),
            notion_version: DEFAULT_NOTION_VERSION.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl NotionClientConfig {
    pub fn from_env() -> Self {
        let mut cfg = Self::default();
        if let Ok(base) = std::env::var("NOTION_API_URL") {
            cfg.base_url = base;
        }
        if let Ok(version) = std::env::var("NOTION_VERSION") {
            cfg.notion_version = version;
        }
        if let Ok(timeout) = std::env::var("NOTION_TIMEOUT_SECS") {
            if let Ok(parsed) = timeout.parse::<u64>() {
                cfg.timeout = Duration::from_secs(parsed);
            }
        }
        cfg
    }
}

/// Writes one database page per company. Built once per run, shared read-only.
#[derive(Clone)]
pub struct NotionClient {
    http: HttpClient,
    token: String,
    database_id: String,
    cfg: NotionClientConfig,
}

impl NotionClient {
    pub fn new(cfg: NotionClientConfig) -> Result<Self, NotionError> {
        let token = cfg.token.clone().filter(|t| !t.is_empty()).ok_or(NotionError::MissingToken)?;
        let database_id = cfg.database_id.clone().filter(|d| !d.is_empty()).ok_or(NotionError::MissingDatabaseId)?;
        let http = HttpClient::builder()
            .timeout(cfg.timeout)
            .build()
            .map_err(NotionError::http)?;
        Ok(Self { http, token, database_id, cfg })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.cfg.base_url.trim_end_matches('/'), path)
    }

    async fn send(&self, method: Method, path: &str, body: Option<&Value>) -> Result<Value, NotionError> {
        let mut req = self
            .http
            .request(method, self.endpoint(path))
            .bearer_auth(&self.token)
            .header("Notion-Version", &self.cfg.notion_version);
        if let Some(body) = body {
            req = req.json(body);
        }

        let response = req.send().await.map_err(NotionError::http)?;
        let status = response.status();
        let bytes = response.bytes().await.map_err(NotionError::http)?;

        if !status.is_success() {
            let error = serde_json::from_slice::<ApiErrorBody>(&bytes).unwrap_or_default();
            return Err(NotionError::Api { status, error });
        }
        serde_json::from_slice(&bytes).map_err(NotionError::Decode)
    }

    /// `GET /databases/{id}`; used to verify credentials and schema.
    pub async fn retrieve_database(&self) -> Result<DatabaseInfo, NotionError> {
        let path = format!("databases/{}", self.database_id);
        let raw = self.send(Method::GET, &path, None).await?;
        Ok(DatabaseInfo::from_value(&raw))
    }

    pub async fn create_page(&self, facts: &CompanyFacts) -> Result<String, NotionError> {
        let body = payload::page_create_body(&self.database_id, facts);
        let raw = self.send(Method::POST, "pages", Some(&body)).await?;
        raw.get("id")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or(NotionError::MissingPageId)
    }

    pub async fn append_children(&self, page_id: &str, narrative: &NarrativeContent) -> Result<(), NotionError> {
        let body = payload::children_body(narrative);
        let path = format!("blocks/{}/children", page_id);
        self.send(Method::PATCH, &path, Some(&body)).await?;
        Ok(())
    }
}

#[async_trait]
impl RecordSink for NotionClient {
    async fn create_record(&self, facts: &CompanyFacts, narrative: &NarrativeContent) -> Result<String, NotionError> {
        let page_id = self.create_page(facts).await?;
        if let Err(source) = self.append_children(&page_id, narrative).await {
            return Err(NotionError::BlocksAppend { page_id, source: Box::new(source) });
        }
        Ok(page_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseInfo {
    pub id: String,
    pub title: String,
    pub properties: Vec<String>,
}

impl DatabaseInfo {
    fn from_value(v: &Value) -> Self {
        let id = v.get("id").and_then(Value::as_str).unwrap_or_default().to_string();
        let title = v
            .get("title")
            .and_then(Value::as_array)
            .map(|parts| parts.iter().filter_map(|p| p.get("plain_text").and_then(Value::as_str)).collect::<String>())
            .unwrap_or_default();
        let mut properties: Vec<String> = v
            .get("properties")
            .and_then(Value::as_object)
            .map(|m| m.keys().cloned().collect())
            .unwrap_or_default();
        properties.sort();
        DatabaseInfo { id, title, properties }
    }
}

/// Coarse classification for diagnostics; control flow never branches on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotionErrorKind {
    RequestTimeout,
    ObjectNotFound,
    Unauthorized,
    Other,
}

impl NotionErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotionErrorKind::RequestTimeout => "request_timeout",
            NotionErrorKind::ObjectNotFound => "object_not_found",
            NotionErrorKind::Unauthorized => "unauthorized",
            NotionErrorKind::Other => "other",
        }
    }
}

#[derive(Debug)]
pub enum NotionError {
    MissingToken,
    MissingDatabaseId,
    Http(reqwest::Error),
    Timeout,
    Api {
        status: StatusCode,
        error: ApiErrorBody,
    },
    Decode(serde_json::Error),
    MissingPageId,
    /// The page exists but its content blocks were not written.
    BlocksAppend {
        page_id: String,
        source: Box<NotionError>,
    },
    #[cfg(test)]
    MockQueueEmpty,
}

impl NotionError {
    fn http(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            NotionError::Timeout
        } else {
            NotionError::Http(err)
        }
    }

    pub fn kind(&self) -> NotionErrorKind {
        match self {
            NotionError::Timeout => NotionErrorKind::RequestTimeout,
            NotionError::Api { status, error } => match error.code.as_deref() {
                Some("object_not_found") => NotionErrorKind::ObjectNotFound,
                Some("unauthorized") | Some("restricted_resource") => NotionErrorKind::Unauthorized,
                _ if *status == StatusCode::NOT_FOUND => NotionErrorKind::ObjectNotFound,
                _ if *status == StatusCode::UNAUTHORIZED || *status == StatusCode::FORBIDDEN => NotionErrorKind::Unauthorized,
                _ => NotionErrorKind::Other,
            },
            NotionError::BlocksAppend { source, .. } => source.kind(),
            _ => NotionErrorKind::Other,
        }
    }
}

impl std::fmt::Display for NotionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NotionError::MissingToken => write!(f, "NOTION_TOKEN is not set"),
            NotionError::MissingDatabaseId => write!(f, "NOTION_DATABASE_ID is not set"),
            NotionError::Http(err) => write!(f, "http error: {err}"),
            NotionError::Timeout => write!(f, "request timed out"),
            NotionError::Api { status, error } => {
                write!(f, "api error {status}: {}", error.message)
            }
            NotionError::Decode(err) => write!(f, "decode error: {err}"),
            NotionError::MissingPageId => write!(f, "page create response has no id"),
            NotionError::BlocksAppend { page_id, source } => {
                write!(f, "page {page_id} created but content append failed: {source}")
            }
            #[cfg(test)]
            NotionError::MockQueueEmpty => write!(f, "mock sink response queue is empty"),
        }
    }
}

impl std::error::Error for NotionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            NotionError::Http(err) => Some(err),
            NotionError::Decode(err) => Some(err),
            NotionError::BlocksAppend { source, .. } => Some(source.as_ref()),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default = "unknown_message")]
    pub message: String,
}

fn unknown_message() -> String { "unknown error".to_string() }

impl Default for ApiErrorBody {
    fn default() -> Self {
        Self { code: None, message: unknown_message() }
    }
}
