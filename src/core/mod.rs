//! Runtime core: the concurrent search engine.
//!
//! The public entry point is [`Coordinator`], which runs one bounded-time
//! search over a list of ranges.
//!
//! Internal modules:
//! - [`worker`]: scans one range on the blocking pool and forwards primes;
//! - [`collector`]: single consumer that drains the prime stream into a sink;
//! - [`tracker`]: counts live workers and closes the stream after the last one;
//! - [`cancel`]: deadline-driven, first-cause-wins cancellation signal;
//! - [`coordinator`]: wires everything together and drives shutdown;
//! - [`alive`]: worker liveness for naming stuck workers;
//! - [`shutdown`]: cross-platform termination signal handling.

mod alive;
mod cancel;
mod collector;
mod config;
mod coordinator;
mod shutdown;
mod status;
mod tracker;
mod worker;

pub use cancel::{CancelCause, CancelController};
pub use collector::{CollectorReport, collect};
pub use config::Config;
pub use coordinator::Coordinator;
pub use status::{RunReport, RunStatus};
pub use tracker::{CompletionGuard, CompletionTracker};
pub use worker::{RangeWorker, WorkerExit};
