use tracing::Span;
use tracing::info_span;

use crate::telemetry::ctx::{OpMarker, PhaseSpan};

#[derive(Copy, Clone, Debug)]
pub struct Check;

#[derive(Copy, Clone, Debug)]
pub enum Phase { Retrieve }

impl PhaseSpan for Phase {
    fn name(&self) -> &'static str { match self {
        Phase::Retrieve => "retrieve",
    }}
    fn span(&self) -> Span { match self {
        Phase::Retrieve => info_span!("retrieve"),
    }}
}

impl OpMarker for Check {
    const NAME: &'static str = "check";
    type Phase = Phase;
    fn root_span() -> Span { info_span!("check") }
}
