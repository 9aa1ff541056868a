use std::fmt;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio_util::sync::CancellationToken;

pub const DEFAULT_DELAY_MS: u64 = 1000;

/// The pending wait was cancelled through its [`DelayHandle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DelayCanceled;

impl fmt::Display for DelayCanceled {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "delay canceled")
    }
}

impl std::error::Error for DelayCanceled {}

/// Cancels whichever [`delay`] is currently pending on it.
///
/// Each call to [`delay`] arms a fresh token; cancelling while nothing is
/// pending is a no-op and does not affect later waits.
#[derive(Clone, Default)]
pub struct DelayHandle {
    pending: Arc<Mutex<Pending>>,
}

#[derive(Default)]
struct Pending {
    generation: u64,
    token: Option<CancellationToken>,
}

impl DelayHandle {
    pub fn new() -> Self { Self::default() }

    /// Returns true when a pending wait was cancelled.
    pub fn cancel(&self) -> bool {
        let token = self.pending.lock().ok().and_then(|mut p| p.token.take());
        match token {
            Some(t) => { t.cancel(); true }
            None => false,
        }
    }

    fn arm(&self) -> (u64, CancellationToken) {
        let token = CancellationToken::new();
        let Ok(mut p) = self.pending.lock() else { return (0, token) };
        p.generation += 1;
        p.token = Some(token.clone());
        (p.generation, token)
    }

    fn disarm(&self, generation: u64) {
        if let Ok(mut p) = self.pending.lock() {
            if p.generation == generation { p.token = None; }
        }
    }
}

/// Sleep for `dur` unless `handle` is cancelled first.
pub async fn delay(dur: Duration, handle: &DelayHandle) -> Result<(), DelayCanceled> {
    let (generation, token) = handle.arm();
    let out = tokio::select! {
        _ = token.cancelled() => Err(DelayCanceled),
        _ = tokio::time::sleep(dur) => Ok(()),
    };
    handle.disarm(generation);
    out
}
