//! # primescan
//!
//! **primescan** searches a set of integer ranges for primes in parallel and
//! stops cleanly when a wall-clock deadline passes.
//!
//! Each range gets its own worker. Workers push primes into one bounded
//! stream; a single collector drains the stream into a [`Sink`]. A completion
//! tracker closes the stream after the last worker exits, and a cancellation
//! controller broadcasts the stop signal when the deadline fires.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!     │  PrimeRange  │   │  PrimeRange  │   │  PrimeRange  │
//!     │  "2:1000"    │   │ "1001:5000"  │   │  "-5:10"     │
//!     └──────┬───────┘   └──────┬───────┘   └──────┬───────┘
//!            ▼                  ▼                  ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Coordinator                                                      │
//! │  - CancelController (deadline → broadcast token)                  │
//! │  - CompletionTracker (live-worker count, closes the stream)       │
//! │  - Bus + AliveTracker + SubscriberSet (observability)             │
//! └──────┬──────────────────┬──────────────────┬───────────────┬──────┘
//!        ▼                  ▼                  ▼               │
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐   │
//!     │ RangeWorker  │   │ RangeWorker  │   │ RangeWorker  │   │
//!     │ (blocking)   │   │ (blocking)   │   │ (blocking)   │   │
//!     └┬─────────────┘   └┬─────────────┘   └┬─────────────┘   │
//!      │ is_prime(n)      │                  │                 │
//!      ▼                  ▼                  ▼                 ▼
//! ┌─────────────────────────────────────────────┐     ┌─────────────────┐
//! │        prime stream (bounded mpsc<i64>)     │     │ Bus (broadcast) │
//! └──────────────────────┬──────────────────────┘     └────────┬────────┘
//!                        ▼                                     ▼
//!                 ┌─────────────┐                     subscriber_listener
//!                 │  collect()  │ ──► Sink                ┌─────┴─────┐
//!                 └─────────────┘   (LineSink,            ▼           ▼
//!                                    MemorySink)    AliveTracker  SubscriberSet
//! ```
//!
//! ### Lifecycle
//! ```text
//! Idle ──► Running ──┬─► Completed     (all ranges exhausted, stream drained)
//!                    ├─► TimedOut      (deadline fired first)
//!                    └─► Interrupted   (OS signal, when Config::handle_signals)
//! ```
//!
//! ## Features
//! | Area              | Description                                              | Key types / traits                    |
//! |-------------------|----------------------------------------------------------|---------------------------------------|
//! | **Search**        | Bounded-time parallel scan of many ranges.               | [`Coordinator`], [`RunReport`]        |
//! | **Primality**     | Pure trial-division predicate.                           | [`is_prime`]                          |
//! | **Input**         | `start:finish` parsing with per-entry errors.            | [`PrimeRange`], [`parse_ranges`]      |
//! | **Output**        | Pluggable destinations for discovered primes.            | [`Sink`], [`LineSink`], [`MemorySink`]|
//! | **Subscriber API**| Hook into runtime events (logging, custom subscribers).  | [`Subscribe`], [`LogWriter`]          |
//! | **Errors**        | Typed errors for input, output and the runtime.          | [`RangeError`], [`RuntimeError`]      |
//! | **Configuration** | Centralize runtime settings.                             | [`Config`]                            |
//!
//! ## Optional features
//! - `cli` (default): the `primescan` binary and its argument parser.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use std::time::Duration;
//! use primescan::{Config, Coordinator, LogWriter, MemorySink, Subscribe, parse_ranges};
//!
//! #[tokio::main(flavor = "multi_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let (ranges, rejected) = parse_ranges(["2:100", "oops", "101:200"]);
//!     assert_eq!(rejected.len(), 1);
//!
//!     let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(LogWriter::new())];
//!     let coordinator = Coordinator::new(Config::with_timeout(Duration::from_secs(2)), subs);
//!
//!     let sink = MemorySink::new();
//!     let report = coordinator.run(ranges, sink.clone()).await?;
//!     coordinator.shutdown().await;
//!
//!     println!("{}", report.status_line());
//!     assert_eq!(sink.snapshot().await.len(), 46);
//!     Ok(())
//! }
//! ```
mod core;
mod error;
mod events;
mod oracle;
mod range;
mod sink;
mod subscribers;

#[cfg(feature = "cli")]
pub mod cli;

// ---- Public re-exports ----

pub use crate::core::{
    CancelCause, CancelController, CollectorReport, CompletionGuard, CompletionTracker, Config,
    Coordinator, RangeWorker, RunReport, RunStatus, WorkerExit, collect,
};
pub use error::{ConfigError, RangeError, RuntimeError, SinkError};
pub use events::{Bus, Event, EventKind};
pub use oracle::is_prime;
pub use range::{PrimeRange, parse_ranges};
pub use sink::{LineSink, MemorySink, Sink};
pub use subscribers::{LogWriter, Subscribe, SubscriberSet};
