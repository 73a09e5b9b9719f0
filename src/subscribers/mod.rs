//! # Event subscribers for the primescan runtime.
//!
//! This module provides the [`Subscribe`] trait, the [`SubscriberSet`] fan-out
//! and built-in implementations for handling events broadcast through the
//! [`Bus`](crate::events::Bus).
//!
//! ## Architecture
//! ```text
//! Event flow:
//!   RangeWorker ── publish(Event) ──► Bus ──► Coordinator listener ──► SubscriberSet
//!                                                                        │
//!                                                          ┌─────────────┼──────────┐
//!                                                          ▼             ▼          ▼
//!                                                      LogWriter      Metrics     Custom
//! ```

mod embedded;
mod set;
mod subscriber;

pub use embedded::LogWriter;
pub use set::SubscriberSet;
pub use subscriber::Subscribe;
