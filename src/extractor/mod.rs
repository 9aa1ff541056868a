use scraper::Html;

mod facts;
mod narrative;
mod text;
pub mod types;

pub use facts::extract_facts;
pub use narrative::extract_narrative;
pub use types::{CompanyFacts, NarrativeContent};

pub(crate) use text::{element_text, select_all};

/// Both records of one detail page, extracted from a single parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedPage {
    pub narrative: NarrativeContent,
    pub facts: CompanyFacts,
}

pub fn extract(html: &str, company_name: &str) -> ExtractedPage {
    let doc = Html::parse_document(html);
    ExtractedPage {
        narrative: extract_narrative(&doc),
        facts: extract_facts(&doc, company_name),
    }
}
