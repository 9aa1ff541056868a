use serde::{Deserialize, Serialize};

/// Free-text content of a detail page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NarrativeContent {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub captions: Vec<String>,
    pub main_title: String,
    pub body_text: String,
}

/// Tabular company facts. Every field except the name is best-effort.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyFacts {
    pub company_name: String,
    pub establishment: Option<String>,
    pub capital_stock: Option<String>,
    pub worker: Option<String>,
    pub location: Option<String>,
}

/// A value in the intermediate label table. Only the history label holds a list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FactValue {
    Text(String),
    List(Vec<String>),
}

impl FactValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FactValue::Text(s) => Some(s),
            FactValue::List(_) => None,
        }
    }
}
