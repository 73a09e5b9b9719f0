//! # LogWriter: renders runtime events through `tracing`
//!
//! A subscriber that turns incoming [`Event`]s into structured `tracing`
//! records. Install a `tracing` subscriber (the binary uses
//! `tracing-subscriber`'s fmt layer) to see them.
//!
//! ## Levels
//! - `warn`: sink write failures, deadline elapsed, shutdown requested, grace exceeded
//! - `error`: worker panics
//! - `info`: run start, exhaustion, drain outcome
//! - `debug`: per-worker start/stop and stream closure

use async_trait::async_trait;

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Event writer subscriber.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        let worker = e.worker_label();
        match e.kind {
            EventKind::RunStarting => {
                tracing::info!(workers = ?e.found, timeout_ms = ?e.timeout_ms, "run starting");
            }
            EventKind::WorkerStarting => {
                tracing::debug!(worker = ?worker, "worker starting");
            }
            EventKind::WorkerStopped => {
                tracing::debug!(
                    worker = ?worker,
                    found = ?e.found,
                    cancelled_at = ?e.prime,
                    outcome = ?e.reason,
                    "worker stopped"
                );
            }
            EventKind::WorkerPanicked => {
                tracing::error!(reason = ?e.reason, "worker panicked");
            }
            EventKind::SinkWriteFailed => {
                tracing::warn!(prime = ?e.prime, err = ?e.reason, "sink write failed");
            }
            EventKind::StreamClosed => {
                tracing::debug!("prime stream closed");
            }
            EventKind::AllRangesExhausted => {
                tracing::info!("all ranges exhausted before deadline");
            }
            EventKind::DeadlineElapsed => {
                tracing::warn!(timeout_ms = ?e.timeout_ms, "deadline elapsed, cancelling workers");
            }
            EventKind::ShutdownRequested => {
                tracing::warn!("shutdown requested, cancelling workers");
            }
            EventKind::AllStoppedWithin => {
                tracing::info!("all workers stopped within grace");
            }
            EventKind::GraceExceeded => {
                tracing::warn!(stuck = ?e.reason, "grace exceeded");
            }
        }
    }

    fn name(&self) -> &'static str {
        "LogWriter"
    }
}
