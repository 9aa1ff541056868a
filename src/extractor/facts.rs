use std::collections::HashMap;

use scraper::{ElementRef, Html};

use super::text::{element_text, has_class, joined_text, select_all};
use super::types::{CompanyFacts, FactValue};

pub const LABEL_ESTABLISHMENT: &str = "設立";
pub const LABEL_CAPITAL_STOCK: &str = "資本金";
pub const LABEL_LOCATION: &str = "本社所在地";
pub const LABEL_HISTORY: &str = "沿革";
// both spellings occur in the wild; the short one wins
pub const WORKER_LABELS: [&str; 2] = ["従業員", "従業員数"];

/// Transient label -> value store. Later inserts replace earlier ones.
#[derive(Debug, Default)]
pub struct FactTable {
    entries: HashMap<String, FactValue>,
}

impl FactTable {
    /// Insert a text pair; skipped when either side is empty after normalization.
    pub fn insert_text(&mut self, key: &str, value: &str) {
        if key.is_empty() || value.is_empty() { return; }
        self.entries.insert(key.to_string(), FactValue::Text(value.to_string()));
    }

    pub fn insert_list(&mut self, key: &str, items: Vec<String>) {
        if items.is_empty() { return; }
        self.entries.insert(key.to_string(), FactValue::List(items));
    }

    pub fn text(&self, key: &str) -> Option<&str> {
        self.entries.get(key).and_then(FactValue::as_text)
    }

    #[cfg(test)]
    pub fn get(&self, key: &str) -> Option<&FactValue> {
        self.entries.get(key)
    }

    /// First candidate key present with a text value, in priority order.
    pub fn first_of(&self, candidates: &[&str]) -> Option<&str> {
        candidates.iter().find_map(|k| self.text(k))
    }

    #[cfg(test)]
    pub fn len(&self) -> usize { self.entries.len() }
}

pub fn extract_facts(doc: &Html, supplied_name: &str) -> CompanyFacts {
    let table = build_fact_table(doc);
    resolve_facts(&table, supplied_name)
}

/// Top region first, then bottom rows, then history. The order fixes the overwrite tie-break.
pub fn build_fact_table(doc: &Html) -> FactTable {
    let mut table = FactTable::default();
    scan_top_region(doc, &mut table);
    scan_bottom_region(doc, &mut table);
    let history = scan_history(doc);
    table.insert_list(LABEL_HISTORY, history);
    table
}

pub fn resolve_facts(table: &FactTable, supplied_name: &str) -> CompanyFacts {
    let owned = |s: Option<&str>| s.map(str::to_string);
    CompanyFacts {
        company_name: supplied_name.to_string(),
        establishment: owned(table.text(LABEL_ESTABLISHMENT)),
        capital_stock: owned(table.text(LABEL_CAPITAL_STOCK)),
        worker: owned(table.first_of(&WORKER_LABELS)),
        location: owned(table.text(LABEL_LOCATION)),
    }
}

// `.item` cells take their key from the nearest `.heading` before them in document order
fn scan_top_region(doc: &Html, table: &mut FactTable) {
    for region in select_all(doc, ".dataTableTop") {
        let mut label: Option<String> = None;
        for node in region.descendants().skip(1) {
            let Some(el) = ElementRef::wrap(node) else { continue };
            if has_class(el, "heading") {
                label = Some(element_text(el));
            } else if has_class(el, "item") {
                if let Some(key) = label.as_deref() {
                    table.insert_text(key, &element_text(el));
                }
            }
        }
    }
}

fn scan_bottom_region(doc: &Html, table: &mut FactTable) {
    for row in select_all(doc, ".dataTableBottom tr") {
        let key = joined_text(row, "th");
        let value = joined_text(row, "td");
        table.insert_text(&key, &value);
    }
}

fn scan_history(doc: &Html) -> Vec<String> {
    let mut out = Vec::new();
    for entry in select_all(doc, ".listHistory li") {
        let year = joined_text(entry, ".year");
        let details = joined_text(entry, "ul > li");
        if year.is_empty() || details.is_empty() { continue; }
        out.push(format!("{}: {}", year, details));
    }
    out
}
