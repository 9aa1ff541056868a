use scraper::Html;

use super::text::{element_text, first_text, select_all};
use super::types::NarrativeContent;

// left and right captions sit under the two illustrations
const CAPTION_SELECTOR: &str = "#advanceInfoCaptionLeft, #advanceInfoCaptionRight";
const TITLE_SELECTOR: &str = "#advanceInfoTitle";
const BODY_SELECTOR: &str = "#advanceInfoBody";

pub fn extract_narrative(doc: &Html) -> NarrativeContent {
    let captions = select_all(doc, CAPTION_SELECTOR)
        .into_iter()
        .map(element_text)
        .collect();

    NarrativeContent {
        captions,
        main_title: first_text(doc, TITLE_SELECTOR),
        body_text: first_text(doc, BODY_SELECTOR),
    }
}
