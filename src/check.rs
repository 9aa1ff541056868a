use anyhow::Result;
use clap::Args;
use serde::Serialize;

use crate::notion::{NotionClient, NotionClientConfig, PROPERTY_NAMES};
use crate::telemetry::{self};
use crate::telemetry::ops::check::Phase as CheckPhase;

/// Verify the Notion credentials and that the database carries the expected properties.
#[derive(Args, Debug)]
pub struct CheckCmd {}

#[derive(Serialize)]
struct CheckResult {
    database_id: String,
    title: String,
    properties: Vec<String>,
    missing: Vec<&'static str>,
}

pub async fn run(_args: CheckCmd) -> Result<()> {
    let log = telemetry::check();
    let _g = log.root_span().entered();

    let client = NotionClient::new(NotionClientConfig::from_env())?;
    let info = {
        let _s = log.span(&CheckPhase::Retrieve).entered();
        match client.retrieve_database().await {
            Ok(info) => info,
            Err(e) => {
                log.error_kv("❌ database retrieve failed", [("kind", e.kind().as_str().to_string()), ("error", e.to_string())]);
                return Err(e.into());
            }
        }
    };

    let missing = missing_properties(&info.properties);
    log.info_kv("📚 database", [("title", info.title.clone()), ("properties", info.properties.join(","))]);
    if missing.is_empty() {
        log.info("✅ all expected properties present");
    } else {
        log.warn_kv("⚠️ missing properties", [("names", missing.join(","))]);
    }

    if telemetry::config::json_mode() {
        let result = CheckResult { database_id: info.id, title: info.title, properties: info.properties, missing };
        log.result(&result)?;
    }
    Ok(())
}

fn missing_properties(present: &[String]) -> Vec<&'static str> {
    PROPERTY_NAMES
        .into_iter()
        .filter(|name| !present.iter().any(|p| p == name))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reports_absent_properties() {
        let present = vec!["企業名".to_string(), "所在地".to_string(), "メモ".to_string()];
        assert_eq!(missing_properties(&present), vec!["設立", "資本金", "従業員数"]);
    }
}
