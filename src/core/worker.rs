//! # Range worker: scans one range and forwards the primes it finds.
//!
//! A [`RangeWorker`] owns one [`PrimeRange`] and walks it in increasing order,
//! testing each candidate with [`is_prime`] and sending primes into the shared
//! stream. It is CPU-bound and synchronous; the coordinator runs it on the
//! blocking pool.
//!
//! ## Exit paths
//! ```text
//! candidates exhausted      ──► WorkerExit::Exhausted
//! token cancelled           ──► WorkerExit::Cancelled { at }   (checked before each candidate)
//! stream receiver dropped   ──► WorkerExit::Disconnected
//! ```
//!
//! ## Rules
//! - Publishes exactly one `WorkerStarting` and one `WorkerStopped`.
//! - Nothing is forwarded after the token is observed as cancelled.
//! - A value handed to the stream is never withdrawn.
//! - The worker's sender is dropped before its completion guard.

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::core::tracker::CompletionGuard;
use crate::events::{Bus, Event, EventKind};
use crate::oracle::is_prime;
use crate::range::PrimeRange;

/// How a worker's scan ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerExit {
    /// Every candidate in the range was tested.
    Exhausted {
        /// Primes forwarded.
        found: u64,
    },
    /// Cancellation was observed before candidate `at`.
    Cancelled {
        /// Primes forwarded.
        found: u64,
        /// First candidate that was not tested.
        at: i64,
    },
    /// The stream receiver went away.
    Disconnected {
        /// Primes forwarded.
        found: u64,
    },
}

impl WorkerExit {
    /// Primes forwarded before the worker stopped.
    pub fn found(&self) -> u64 {
        match *self {
            WorkerExit::Exhausted { found }
            | WorkerExit::Cancelled { found, .. }
            | WorkerExit::Disconnected { found } => found,
        }
    }

    /// Short stable label for events and logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            WorkerExit::Exhausted { .. } => "exhausted",
            WorkerExit::Cancelled { .. } => "cancelled",
            WorkerExit::Disconnected { .. } => "disconnected",
        }
    }
}

/// One scan of one range.
pub struct RangeWorker {
    id: usize,
    range: PrimeRange,
    stream: mpsc::Sender<i64>,
    token: CancellationToken,
    bus: Bus,
    guard: CompletionGuard,
}

impl RangeWorker {
    /// Creates a worker; `guard` must come from the run's completion tracker.
    pub fn new(
        id: usize,
        range: PrimeRange,
        stream: mpsc::Sender<i64>,
        token: CancellationToken,
        bus: Bus,
        guard: CompletionGuard,
    ) -> Self {
        Self {
            id,
            range,
            stream,
            token,
            bus,
            guard,
        }
    }

    /// Scans the range. Blocks the calling thread; do not call from async context.
    pub fn run(self) -> WorkerExit {
        let RangeWorker {
            id,
            range,
            stream,
            token,
            bus,
            guard,
        } = self;

        bus.publish(
            Event::new(EventKind::WorkerStarting)
                .with_worker(id)
                .with_range(range),
        );

        let exit = scan(range, &stream, &token);

        let mut stopped = Event::new(EventKind::WorkerStopped)
            .with_worker(id)
            .with_range(range)
            .with_found(exit.found())
            .with_reason(exit.as_label());
        if let WorkerExit::Cancelled { at, .. } = exit {
            stopped = stopped.with_prime(at);
        }
        bus.publish(stopped);

        drop(stream);
        drop(guard);
        exit
    }
}

fn scan(range: PrimeRange, stream: &mpsc::Sender<i64>, token: &CancellationToken) -> WorkerExit {
    let mut found = 0u64;
    for n in range.candidates() {
        if token.is_cancelled() {
            return WorkerExit::Cancelled { found, at: n };
        }
        if !is_prime(n) {
            continue;
        }
        if stream.blocking_send(n).is_err() {
            return WorkerExit::Disconnected { found };
        }
        found += 1;
    }
    WorkerExit::Exhausted { found }
}
