use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Result};
use clap::Args;
use serde::Serialize;
use url::Url;

use crate::discovery::{self, DiscoveredTarget};
use crate::fetch::{HttpFetcher, DEFAULT_TIMEOUT_SECS};
use crate::notion::{NotionClient, NotionClientConfig};
use crate::telemetry::{self};

pub mod delay;
mod pipeline;
mod targets;

use pipeline::Orchestrator;

#[derive(Args)]
pub struct CrawlCmd {
    /// Index page listing the companies (falls back to CRAWL_INDEX_URL)
    #[arg(long)] pub index_url: Option<String>,
    /// Static JSON target list instead of discovery
    #[arg(long)] pub targets: Option<PathBuf>,
    /// Number of static-list entries to walk
    #[arg(long, default_value_t = targets::DEFAULT_STATIC_LIMIT)] pub limit: usize,
    /// Base for relative urls (falls back to CRAWL_URL_HEAD, then the index url)
    #[arg(long)] pub url_head: Option<String>,
    /// Pause between targets in ms (falls back to CRAWL_DELAY_MS)
    #[arg(long)] pub delay_ms: Option<u64>,
    #[arg(long)] pub timeout_secs: Option<u64>,
    /// Treat a cancelled pause (Ctrl-C) as the end of the run
    #[arg(long, default_value_t = false)] pub stop_on_cancel: bool,
    #[arg(long, default_value_t = false)] pub apply: bool,
    #[arg(long, default_value_t = 10)] pub plan_limit: usize,
}

#[derive(Serialize)]
struct CrawlPlan<'a> {
    mode: &'static str,
    source: String,
    targets: usize,
    delay_ms: u64,
    sample_targets: &'a [DiscoveredTarget],
}

pub async fn run(args: CrawlCmd) -> Result<()> {
    let log = telemetry::crawl();
    let _g = log.root_span_kv([
        ("apply", args.apply.to_string()),
        ("index_url", format!("{:?}", args.index_url)),
        ("targets", format!("{:?}", args.targets)),
        ("limit", args.limit.to_string()),
    ]).entered();

    let delay_ms = args.delay_ms.or_else(|| env_u64("CRAWL_DELAY_MS")).unwrap_or(delay::DEFAULT_DELAY_MS);
    let timeout = args.timeout_secs.or_else(|| env_u64("CRAWL_TIMEOUT_SECS")).unwrap_or(DEFAULT_TIMEOUT_SECS);
    let url_head = args.url_head.or_else(|| std::env::var("CRAWL_URL_HEAD").ok());
    let fetcher = HttpFetcher::new(Duration::from_secs(timeout))?;

    // static list is the legacy entry point; discovery is the default
    let (mode, source, base, list) = match &args.targets {
        Some(path) => {
            let list = targets::load_static(path, args.limit)?;
            let base = url_head.as_deref().map(Url::parse).transpose()?;
            ("static", path.display().to_string(), base, list)
        }
        None => {
            let Some(index_url) = args.index_url.or_else(|| std::env::var("CRAWL_INDEX_URL").ok()) else {
                bail!("Please provide --index-url, --targets, or set CRAWL_INDEX_URL");
            };
            let base = match url_head.as_deref() {
                Some(head) => Some(Url::parse(head)?),
                None => Url::parse(&index_url).ok(),
            };
            let list = discovery::discover(&fetcher, &index_url).await;
            ("discover", index_url, base, list)
        }
    };

    if list.is_empty() {
        log.info("Nothing to do: no targets.");
    }

    if !args.apply {
        let sample = &list[..list.len().min(args.plan_limit)];
        if telemetry::config::json_mode() {
            let plan = CrawlPlan { mode, source: source.clone(), targets: list.len(), delay_ms, sample_targets: sample };
            log.plan(&plan)?;
        } else {
            log.info(format!("📝 Crawl plan — mode={} source={} targets={} delay_ms={}", mode, source, list.len(), delay_ms));
            for t in sample { log.info(format!("  {} url={}", t.page_name, t.url)); }
            if list.len() > args.plan_limit { log.info(format!("  ... ({} more)", list.len() - args.plan_limit)); }
            log.info("   Use --apply to execute.");
        }
        return Ok(());
    }

    let sink = NotionClient::new(NotionClientConfig::from_env())?;
    let orch = Orchestrator::new(&fetcher, &sink)
        .with_base(base)
        .with_pace(Duration::from_millis(delay_ms))
        .stop_on_cancel(args.stop_on_cancel);

    let interrupt = tokio::spawn(watch_interrupts(orch.delay_handle()));
    let summary = orch.run(&list).await;
    interrupt.abort();

    if telemetry::config::json_mode() {
        log.result(&summary)?;
    }
    Ok(())
}

// first Ctrl-C cancels the pending pause, a second one exits
async fn watch_interrupts(handle: delay::DelayHandle) {
    let log = telemetry::crawl();
    let mut seen = 0u32;
    while tokio::signal::ctrl_c().await.is_ok() {
        seen += 1;
        if seen > 1 {
            log.warn("Interrupted twice, exiting.");
            std::process::exit(130);
        }
        let cancelled = handle.cancel();
        log.warn_kv("⏹️ interrupt", [("pending_delay_cancelled", cancelled.to_string())]);
    }
}

fn env_u64(key: &str) -> Option<u64> {
    std::env::var(key).ok().and_then(|v| v.parse().ok())
}
