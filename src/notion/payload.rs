use serde_json::{json, Map, Value};

use crate::extractor::{CompanyFacts, NarrativeContent};

// Notion rejects text objects longer than this.
pub const MAX_TEXT_LEN: usize = 2000;

pub const PROP_COMPANY_NAME: &str = "企業名";
pub const PROP_ESTABLISHMENT: &str = "設立";
pub const PROP_CAPITAL_STOCK: &str = "資本金";
pub const PROP_WORKER: &str = "従業員数";
pub const PROP_LOCATION: &str = "所在地";

/// Every property a page write sets; the target database must define them all.
pub const PROPERTY_NAMES: [&str; 5] = [PROP_COMPANY_NAME, PROP_ESTABLISHMENT, PROP_CAPITAL_STOCK, PROP_WORKER, PROP_LOCATION];

/// Body of `POST /pages`: a new row in `database_id` carrying the facts.
pub fn page_create_body(database_id: &str, facts: &CompanyFacts) -> Value {
    let mut props = Map::new();
    props.insert(PROP_COMPANY_NAME.into(), json!({ "title": rich_text(&facts.company_name) }));
    let optional = [
        (PROP_ESTABLISHMENT, &facts.establishment),
        (PROP_CAPITAL_STOCK, &facts.capital_stock),
        (PROP_WORKER, &facts.worker),
        (PROP_LOCATION, &facts.location),
    ];
    for (name, value) in optional {
        let text = value.as_deref().unwrap_or("");
        props.insert(name.into(), json!({ "rich_text": rich_text(text) }));
    }
    json!({
        "parent": { "database_id": database_id },
        "properties": Value::Object(props),
    })
}

/// Body of `PATCH /blocks/{id}/children`: heading + paragraph per narrative field.
pub fn children_body(narrative: &NarrativeContent) -> Value {
    let sections = [
        ("MainTitle", narrative.main_title.clone()),
        ("Captions", narrative.captions.join("\n")),
        ("BodyText", narrative.body_text.clone()),
    ];
    let mut children = Vec::with_capacity(sections.len() * 2);
    for (heading, text) in sections {
        children.push(json!({
            "object": "block",
            "type": "heading_3",
            "heading_3": { "rich_text": rich_text(heading) },
        }));
        children.push(json!({
            "object": "block",
            "type": "paragraph",
            "paragraph": { "rich_text": rich_text(&text) },
        }));
    }
    json!({ "children": children })
}

/// Rich-text array for `text`, split into segments Notion accepts. Empty text → `[]`.
pub fn rich_text(text: &str) -> Value {
    let segments: Vec<Value> = split_chars(text, MAX_TEXT_LEN)
        .into_iter()
        .map(|s| json!({ "type": "text", "text": { "content": s } }))
        .collect();
    Value::Array(segments)
}

fn split_chars(text: &str, max: usize) -> Vec<String> {
    let mut out = Vec::new();
    let mut cur = String::new();
    let mut n = 0usize;
    for ch in text.chars() {
        if n == max {
            out.push(std::mem::take(&mut cur));
            n = 0;
        }
        cur.push(ch);
        n += 1;
    }
    if !cur.is_empty() { out.push(cur); }
    out
}
