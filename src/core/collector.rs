//! # Fan-in collector: the single consumer of the prime stream.
//!
//! [`collect`] receives values from any number of workers in arrival order and
//! hands each to the [`Sink`]. It ends only when the stream is closed (every
//! sender dropped), never because the stream is momentarily empty.
//!
//! Cancelling the `stop` token closes the stream from the receiving side:
//! values already buffered are still delivered, senders still alive get an
//! error on their next send, and the collector ends once the buffer is empty.
//! The coordinator uses it when workers outlive the shutdown grace period.
//!
//! ## Rules
//! - Each received value is offered to the sink exactly once.
//! - A failed write is published as `SinkWriteFailed` and counted; the loop continues.
//! - The sink is flushed once, after the stream closes (by the tracker or by `stop`).

use crate::events::{Bus, Event, EventKind};
use crate::sink::Sink;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Outcome of a collector run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CollectorReport {
    /// Values the sink accepted.
    pub written: u64,
    /// Values (or the final flush) the sink rejected.
    pub failed: u64,
}

/// Drains `rx` into `sink` until the stream is closed or `stop` is cancelled
/// and the buffer is empty.
pub async fn collect<S: Sink>(
    mut rx: mpsc::Receiver<i64>,
    mut sink: S,
    bus: Bus,
    stop: CancellationToken,
) -> CollectorReport {
    let mut report = CollectorReport::default();
    let mut closed = false;

    loop {
        let next = tokio::select! {
            biased;
            _ = stop.cancelled(), if !closed => {
                rx.close();
                closed = true;
                continue;
            }
            next = rx.recv() => next,
        };
        let Some(prime) = next else {
            break;
        };
        match sink.accept(prime).await {
            Ok(()) => report.written += 1,
            Err(e) => {
                report.failed += 1;
                bus.publish(
                    Event::new(EventKind::SinkWriteFailed)
                        .with_prime(prime)
                        .with_reason(e.to_string()),
                );
            }
        }
    }

    if let Err(e) = sink.flush().await {
        report.failed += 1;
        bus.publish(Event::new(EventKind::SinkWriteFailed).with_reason(e.to_string()));
    }
    report
}
