use std::time::Duration;

use anyhow::Result;
use clap::Args;
use serde::Serialize;
use url::Url;

use crate::extractor::{self, CompanyFacts, NarrativeContent};
use crate::fetch::{HttpFetcher, PageFetcher, DEFAULT_TIMEOUT_SECS};
use crate::telemetry::{self};
use crate::telemetry::ops::extract::Phase as ExtractPhase;

/// Fetch one detail page and print what would be persisted for it.
#[derive(Args, Debug)]
pub struct InspectCmd {
    pub url: String,
    /// Company name to carry into the facts record
    #[arg(long, default_value = "")]
    pub name: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct InspectResult {
    url: String,
    facts: CompanyFacts,
    narrative: NarrativeContent,
}

pub async fn run(args: InspectCmd) -> Result<()> {
    let log = telemetry::extract();
    let _g = log.root_span_kv([("url", args.url.clone())]).entered();

    let url = Url::parse(&args.url)?;
    let fetcher = HttpFetcher::new(Duration::from_secs(DEFAULT_TIMEOUT_SECS))?;
    let html = { let _s = log.span(&ExtractPhase::Fetch).entered(); fetcher.fetch(url.as_str()).await? };
    let page = { let _s = log.span(&ExtractPhase::Parse).entered(); extractor::extract(&html, &args.name) };

    let missing: Vec<&str> = [
        ("establishment", page.facts.establishment.is_none()),
        ("capitalStock", page.facts.capital_stock.is_none()),
        ("worker", page.facts.worker.is_none()),
        ("location", page.facts.location.is_none()),
    ]
    .into_iter()
    .filter_map(|(field, absent)| absent.then_some(field))
    .collect();
    if !missing.is_empty() {
        log.warn_kv("⚠️ facts not found", [("fields", missing.join(","))]);
    }

    let result = InspectResult { url: args.url, facts: page.facts, narrative: page.narrative };
    log.result(&result)?;
    Ok(())
}
