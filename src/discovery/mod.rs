use scraper::Html;
use serde::{Deserialize, Serialize};

use crate::extractor::{element_text, select_all};
use crate::fetch::PageFetcher;
use crate::telemetry;
use crate::telemetry::ops::crawl::Phase as CrawlPhase;

/// Anchors in the index listing that point at company pages.
pub const TARGET_ANCHOR_SELECTOR: &str = "a.js-add-examination-list-text";
/// Path fragment identifying a company detail page.
pub const DETAIL_PATH_SUFFIX: &str = "/outline.html";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscoveredTarget {
    pub url: String,
    pub page_name: String,
}

/// Fetch the index page and list its detail-page targets.
/// A failed fetch is logged and yields no targets.
pub async fn discover(fetcher: &dyn PageFetcher, index_url: &str) -> Vec<DiscoveredTarget> {
    let log = telemetry::crawl();
    let _s = log.span_kv(&CrawlPhase::Discover, [("index_url", index_url.to_string())]).entered();

    let html = match fetcher.fetch(index_url).await {
        Ok(html) => html,
        Err(e) => {
            log.error_kv("❌ index fetch failed", [("url", index_url.to_string()), ("error", format!("{:#}", e))]);
            return Vec::new();
        }
    };

    let targets = parse_targets(&html);
    log.info_kv("🔎 discovered", [("targets", targets.len().to_string())]);
    targets
}

pub fn parse_targets(html: &str) -> Vec<DiscoveredTarget> {
    let doc = Html::parse_document(html);
    select_all(&doc, TARGET_ANCHOR_SELECTOR)
        .into_iter()
        .filter_map(|a| {
            let href = a.value().attr("href")?;
            if !href.contains(DETAIL_PATH_SUFFIX) { return None; }
            Some(DiscoveredTarget { url: href.to_string(), page_name: element_text(a) })
        })
        .collect()
}
