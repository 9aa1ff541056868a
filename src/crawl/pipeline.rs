use std::time::Duration;

use serde::Serialize;
use url::Url;

use crate::discovery::DiscoveredTarget;
use crate::extractor;
use crate::fetch::PageFetcher;
use crate::notion::RecordSink;
use crate::telemetry;
use crate::telemetry::ops::crawl::Phase as CrawlPhase;

use super::delay::{delay, DelayHandle, DEFAULT_DELAY_MS};
use super::targets::resolve_url;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RunState { Done, Aborted }

impl RunState {
    pub fn as_str(&self) -> &'static str {
        match self { RunState::Done => "done", RunState::Aborted => "aborted" }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeStatus { Persisted, FetchFailed, SinkFailed }

#[derive(Debug, Clone, Serialize)]
pub struct TargetOutcome {
    pub url: String,
    pub page_name: String,
    pub status: OutcomeStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<&'static str>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CrawlSummary {
    pub state: RunState,
    pub targets: usize,
    pub persisted: usize,
    pub fetch_errors: usize,
    pub sink_errors: usize,
    pub outcomes: Vec<TargetOutcome>,
}

/// Walks targets one at a time: fetch, extract, persist, pause.
/// A failing target is recorded and skipped; nothing is retried.
pub struct Orchestrator<'a> {
    fetcher: &'a dyn PageFetcher,
    sink: &'a dyn RecordSink,
    base: Option<Url>,
    pace: Duration,
    handle: DelayHandle,
    stop_on_cancel: bool,
}

impl<'a> Orchestrator<'a> {
    pub fn new(fetcher: &'a dyn PageFetcher, sink: &'a dyn RecordSink) -> Self {
        Self {
            fetcher,
            sink,
            base: None,
            pace: Duration::from_millis(DEFAULT_DELAY_MS),
            handle: DelayHandle::new(),
            stop_on_cancel: false,
        }
    }

    /// Base for relative target urls.
    pub fn with_base(mut self, base: Option<Url>) -> Self { self.base = base; self }

    pub fn with_pace(mut self, pace: Duration) -> Self { self.pace = pace; self }

    /// End the run as `Aborted` when the pacing delay is cancelled.
    pub fn stop_on_cancel(mut self, stop: bool) -> Self { self.stop_on_cancel = stop; self }

    /// Handle that cancels the pending inter-target delay.
    pub fn delay_handle(&self) -> DelayHandle { self.handle.clone() }

    pub async fn run(&self, targets: &[DiscoveredTarget]) -> CrawlSummary {
        let log = telemetry::crawl();
        let total = targets.len();
        let mut summary = CrawlSummary {
            state: RunState::Done,
            targets: total,
            persisted: 0,
            fetch_errors: 0,
            sink_errors: 0,
            outcomes: Vec::with_capacity(total),
        };

        for (i, target) in targets.iter().enumerate() {
            let outcome = self.process(i + 1, total, target).await;
            match outcome.status {
                OutcomeStatus::Persisted => summary.persisted += 1,
                OutcomeStatus::FetchFailed => summary.fetch_errors += 1,
                OutcomeStatus::SinkFailed => summary.sink_errors += 1,
            }
            summary.outcomes.push(outcome);

            if i + 1 == total { break; }
            let _s = log.span_kv(&CrawlPhase::Delay, [("ms", self.pace.as_millis().to_string())]).entered();
            if let Err(e) = delay(self.pace, &self.handle).await {
                log.warn_kv("⏹️ pacing interrupted", [("reason", e.to_string()), ("after", target.url.clone())]);
                if self.stop_on_cancel {
                    summary.state = RunState::Aborted;
                    break;
                }
            }
        }

        log.totals(summary.state.as_str(), summary.targets, summary.persisted, summary.fetch_errors, summary.sink_errors);
        summary
    }

    async fn process(&self, index: usize, total: usize, target: &DiscoveredTarget) -> TargetOutcome {
        let log = telemetry::crawl();
        let _t = log.span_kv(&CrawlPhase::Target, [("index", index.to_string()), ("url", target.url.clone())]).entered();
        let mut outcome = TargetOutcome {
            url: target.url.clone(),
            page_name: target.page_name.clone(),
            status: OutcomeStatus::FetchFailed,
            record_id: None,
            error: None,
            error_kind: None,
        };

        let fetched = {
            let _s = log.span(&CrawlPhase::Fetch).entered();
            match resolve_url(self.base.as_ref(), &target.url) {
                Ok(url) => self.fetcher.fetch(url.as_str()).await,
                Err(e) => Err(e),
            }
        };
        let html = match fetched {
            Ok(html) => html,
            Err(e) => {
                log.error_kv("❌ fetch failed", [("url", target.url.clone()), ("error", format!("{:#}", e))]);
                outcome.error = Some(format!("{:#}", e));
                return outcome;
            }
        };

        let page = {
            let _s = log.span(&CrawlPhase::Extract).entered();
            extractor::extract(&html, &target.page_name)
        };

        let _s = log.span(&CrawlPhase::Persist).entered();
        match self.sink.create_record(&page.facts, &page.narrative).await {
            Ok(id) => {
                log.target_done(index, total, &target.page_name, &id);
                outcome.status = OutcomeStatus::Persisted;
                outcome.record_id = Some(id);
            }
            Err(e) => {
                let kind = e.kind().as_str();
                log.error_kv("❌ persist failed", [("page_name", target.page_name.clone()), ("kind", kind.to_string()), ("error", e.to_string())]);
                outcome.status = OutcomeStatus::SinkFailed;
                outcome.error = Some(e.to_string());
                outcome.error_kind = Some(kind);
            }
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::mock::MockFetcher;
    use crate::notion::mock::MockSink;
    use crate::notion::NotionError;

    const BASE: &str = "https://job.example.jp";

    fn page(title: &str) -> String {
        format!(r#"<div id="advanceInfoTitle">{}</div>
            <table class="dataTableBottom"><tr><th>従業員</th><td>10名</td></tr></table>"#, title)
    }

    fn target(path: &str, name: &str) -> DiscoveredTarget {
        DiscoveredTarget { url: path.to_string(), page_name: name.to_string() }
    }

    fn targets() -> Vec<DiscoveredTarget> {
        vec![target("/a/outline.html", "A"), target("/b/outline.html", "B"), target("/c/outline.html", "C")]
    }

    fn fetcher_without_b() -> MockFetcher {
        MockFetcher::new()
            .with_page(&format!("{BASE}/a/outline.html"), &page("Alpha"))
            .with_page(&format!("{BASE}/c/outline.html"), &page("Gamma"))
    }

    #[tokio::test]
    async fn fetch_failure_is_isolated() {
        let fetcher = fetcher_without_b();
        let sink = MockSink::new();
        sink.push_response(Ok("rec-a".into()));
        sink.push_response(Ok("rec-c".into()));

        let orch = Orchestrator::new(&fetcher, &sink)
            .with_base(Some(Url::parse(BASE).unwrap()))
            .with_pace(Duration::ZERO);
        let summary = orch.run(&targets()).await;

        assert_eq!(summary.state, RunState::Done);
        assert_eq!(summary.persisted, 2);
        assert_eq!(summary.fetch_errors, 1);
        assert_eq!(fetcher.calls().len(), 3);

        let calls = sink.calls();
        let names: Vec<&str> = calls.iter().map(|(f, _)| f.company_name.as_str()).collect();
        assert_eq!(names, vec!["A", "C"]);
        assert_eq!(calls[0].1.main_title, "Alpha");
        assert_eq!(calls[1].0.worker.as_deref(), Some("10名"));
        assert_eq!(summary.outcomes[1].status, OutcomeStatus::FetchFailed);
        assert_eq!(summary.outcomes[2].record_id.as_deref(), Some("rec-c"));
    }

    #[tokio::test]
    async fn sink_failure_does_not_abort() {
        let fetcher = MockFetcher::new()
            .with_page(&format!("{BASE}/a/outline.html"), &page("Alpha"))
            .with_page(&format!("{BASE}/b/outline.html"), &page("Beta"))
            .with_page(&format!("{BASE}/c/outline.html"), &page("Gamma"));
        let sink = MockSink::new();
        sink.push_response(Err(NotionError::Timeout));
        sink.push_response(Ok("rec-b".into()));
        sink.push_response(Ok("rec-c".into()));

        let orch = Orchestrator::new(&fetcher, &sink)
            .with_base(Some(Url::parse(BASE).unwrap()))
            .with_pace(Duration::ZERO);
        let summary = orch.run(&targets()).await;

        assert_eq!(summary.state, RunState::Done);
        assert_eq!(summary.sink_errors, 1);
        assert_eq!(summary.persisted, 2);
        assert_eq!(summary.outcomes[0].error_kind, Some("request_timeout"));
        assert_eq!(sink.calls().len(), 3);
    }

    #[tokio::test]
    async fn relative_url_without_base_counts_as_fetch_failure() {
        let fetcher = MockFetcher::new();
        let sink = MockSink::new();
        let orch = Orchestrator::new(&fetcher, &sink).with_pace(Duration::ZERO);
        let summary = orch.run(&[target("/a/outline.html", "A")]).await;

        assert_eq!(summary.fetch_errors, 1);
        assert!(fetcher.calls().is_empty());
        assert!(sink.calls().is_empty());
    }

    #[tokio::test]
    async fn empty_target_list_is_done() {
        let fetcher = MockFetcher::new();
        let sink = MockSink::new();
        let summary = Orchestrator::new(&fetcher, &sink).run(&[]).await;
        assert_eq!(summary.state, RunState::Done);
        assert_eq!(summary.targets, 0);
    }

    #[tokio::test]
    async fn cancelled_delay_aborts_when_asked() {
        let fetcher = fetcher_without_b();
        let sink = MockSink::new();
        sink.push_response(Ok("rec-a".into()));

        let orch = Orchestrator::new(&fetcher, &sink)
            .with_base(Some(Url::parse(BASE).unwrap()))
            .with_pace(Duration::from_secs(30))
            .stop_on_cancel(true);
        let handle = orch.delay_handle();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            handle.cancel();
        });

        let summary = orch.run(&targets()).await;
        assert_eq!(summary.state, RunState::Aborted);
        assert_eq!(summary.outcomes.len(), 1);
        assert_eq!(fetcher.calls().len(), 1);
    }

    #[tokio::test]
    async fn cancelled_delay_continues_by_default() {
        let fetcher = fetcher_without_b();
        let sink = MockSink::new();
        sink.push_response(Ok("rec-a".into()));
        sink.push_response(Ok("rec-c".into()));

        let orch = Orchestrator::new(&fetcher, &sink)
            .with_base(Some(Url::parse(BASE).unwrap()))
            .with_pace(Duration::from_secs(30));
        let handle = orch.delay_handle();
        let two = vec![target("/a/outline.html", "A"), target("/c/outline.html", "C")];
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            handle.cancel();
        });

        let summary = orch.run(&two).await;
        assert_eq!(summary.state, RunState::Done);
        assert_eq!(summary.persisted, 2);
    }
}
