use tracing::Span;
use tracing::info_span;

use crate::telemetry::ctx::{OpMarker, PhaseSpan};

#[derive(Copy, Clone, Debug)]
pub struct Crawl;

#[derive(Copy, Clone, Debug)]
pub enum Phase { Discover, Target, Fetch, Extract, Persist, Delay }

impl PhaseSpan for Phase {
    fn name(&self) -> &'static str { match self {
        Phase::Discover => "discover",
        Phase::Target => "target",
        Phase::Fetch => "fetch",
        Phase::Extract => "extract",
        Phase::Persist => "persist",
        Phase::Delay => "delay",
    }}
    fn span(&self) -> Span { match self {
        Phase::Discover => info_span!("discover"),
        Phase::Target => info_span!("target"),
        Phase::Fetch => info_span!("fetch"),
        Phase::Extract => info_span!("extract"),
        Phase::Persist => info_span!("persist"),
        Phase::Delay => info_span!("delay"),
    }}
}

impl OpMarker for Crawl {
    const NAME: &'static str = "crawl";
    type Phase = Phase;
    fn root_span() -> Span { info_span!("crawl") }
}
