//! # Runtime events emitted by the coordinator, workers and collector.
//!
//! The [`EventKind`] enum classifies event types across three categories:
//! - **Run events**: run start, deadline, early stop, drain outcome
//! - **Worker events**: per-range worker start and stop
//! - **Stream events**: sink write failures, stream closure
//!
//! The [`Event`] struct carries additional metadata such as timestamps, worker
//! id, range, prime value and reasons.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases
//! monotonically. Use `seq` to restore the order when events are delivered out
//! of order.
//!
//! ## Example
//! ```rust
//! use primescan::{Event, EventKind, PrimeRange};
//!
//! let ev = Event::new(EventKind::WorkerStopped)
//!     .with_worker(3)
//!     .with_range(PrimeRange::new(2, 10))
//!     .with_found(4);
//!
//! assert_eq!(ev.kind, EventKind::WorkerStopped);
//! assert_eq!(ev.worker, Some(3));
//! assert_eq!(ev.found, Some(4));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::{Duration, SystemTime};

use crate::range::PrimeRange;

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(1);

/// Classification of runtime events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Run events ===
    /// Workers are about to be spawned.
    ///
    /// Sets:
    /// - `found`: number of ranges (workers)
    /// - `timeout_ms`: run budget (ms)
    RunStarting,

    /// The deadline elapsed before all ranges were exhausted.
    ///
    /// Sets:
    /// - `timeout_ms`: run budget (ms)
    DeadlineElapsed,

    /// An OS termination signal stopped the run early.
    ShutdownRequested,

    /// Every worker finished and the stream was drained before the deadline.
    AllRangesExhausted,

    /// After cancellation, all workers stopped and the collector drained within grace.
    AllStoppedWithin,

    /// Grace period exceeded; some workers did not stop in time.
    ///
    /// Sets:
    /// - `reason`: stuck worker labels
    GraceExceeded,

    // === Worker events ===
    /// A worker is starting its scan.
    ///
    /// Sets:
    /// - `worker`: worker id
    /// - `range`: assigned range
    WorkerStarting,

    /// A worker finished its scan (exhausted, cancelled or disconnected).
    ///
    /// Sets:
    /// - `worker`: worker id
    /// - `range`: assigned range
    /// - `found`: primes forwarded by this worker
    /// - `prime`: candidate at which it was cancelled (only when cancelled)
    /// - `reason`: `"exhausted"`, `"cancelled"` or `"disconnected"`
    WorkerStopped,

    /// A worker panicked; its completion was still recorded.
    ///
    /// Sets:
    /// - `reason`: join error message
    WorkerPanicked,

    // === Stream events ===
    /// The sink rejected one value; the stream continues.
    ///
    /// Sets:
    /// - `prime`: the value that failed (absent for flush failures)
    /// - `reason`: error message
    SinkWriteFailed,

    /// The completion tracker closed the prime stream (last worker exited).
    StreamClosed,
}

/// Runtime event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,

    /// Worker id, if applicable.
    pub worker: Option<usize>,
    /// Range assigned to the worker, if applicable.
    pub range: Option<PrimeRange>,
    /// A candidate or prime value (failed write, cancellation point).
    pub prime: Option<i64>,
    /// A count (primes found by a worker, number of workers).
    pub found: Option<u64>,
    /// Run timeout in milliseconds (compact).
    pub timeout_ms: Option<u32>,
    /// Human-readable reason (errors, overflow details, etc.).
    pub reason: Option<Arc<str>>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            worker: None,
            range: None,
            prime: None,
            found: None,
            timeout_ms: None,
            reason: None,
        }
    }

    /// Attaches a worker id.
    #[inline]
    pub fn with_worker(mut self, id: usize) -> Self {
        self.worker = Some(id);
        self
    }

    /// Attaches a range.
    #[inline]
    pub fn with_range(mut self, range: PrimeRange) -> Self {
        self.range = Some(range);
        self
    }

    /// Attaches a candidate or prime value.
    #[inline]
    pub fn with_prime(mut self, n: i64) -> Self {
        self.prime = Some(n);
        self
    }

    /// Attaches a count.
    #[inline]
    pub fn with_found(mut self, n: u64) -> Self {
        self.found = Some(n);
        self
    }

    /// Attaches a timeout duration (stored as milliseconds).
    #[inline]
    pub fn with_timeout(mut self, d: Duration) -> Self {
        let ms = d.as_millis().min(u128::from(u32::MAX)) as u32;
        self.timeout_ms = Some(ms);
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Human-readable worker label: `worker-<id> [<start>:<finish>]`.
    pub fn worker_label(&self) -> Option<String> {
        match (self.worker, self.range) {
            (Some(id), Some(range)) => Some(format!("worker-{id} [{range}]")),
            (Some(id), None) => Some(format!("worker-{id}")),
            _ => None,
        }
    }
}
