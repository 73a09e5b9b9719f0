//! # Completion tracker: closes the prime stream after the last worker exits.
//!
//! The tracker counts live workers with an atomic counter and owns the
//! stream's root sender. When the count reaches zero it drops that sender,
//! which (once every worker has dropped its own clone) closes the stream. This
//! is the only way the collector learns that no more values are coming.
//!
//! ## Lifecycle
//! ```text
//! new()        live = 1   (registration hold)
//! register()   live += 1  ──► CompletionGuard   (once per worker, before it starts)
//! seal()       live -= 1  (hold released after all workers are spawned)
//! guard drop   live -= 1  (normal exit, cancellation or panic unwinding)
//!
//! live == 0 ──► drop root sender ──► publish StreamClosed   (exactly once)
//! ```
//!
//! ## Rules
//! - The hold keeps a fast worker from closing the stream before its siblings
//!   are registered.
//! - A worker must drop its sender **before** its guard, so that the stream is
//!   closed by the time the tracker announces it.
//! - The counter is never touched through a lock; the mutex only guards the
//!   one-time hand-off of the root sender.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::mpsc;

use crate::events::{Bus, Event, EventKind};

/// Counts live workers and closes the stream when the last one exits.
pub struct CompletionTracker {
    live: AtomicUsize,
    sealed: AtomicBool,
    stream: Mutex<Option<mpsc::Sender<i64>>>,
    bus: Bus,
}

impl CompletionTracker {
    /// Creates a tracker owning the stream's root sender, with the registration hold taken.
    pub fn new(stream: mpsc::Sender<i64>, bus: Bus) -> Arc<Self> {
        Arc::new(Self {
            live: AtomicUsize::new(1),
            sealed: AtomicBool::new(false),
            stream: Mutex::new(Some(stream)),
            bus,
        })
    }

    /// Registers one worker. Call before the worker starts.
    pub fn register(self: &Arc<Self>) -> CompletionGuard {
        self.live.fetch_add(1, Ordering::AcqRel);
        CompletionGuard {
            tracker: Arc::clone(self),
        }
    }

    /// Releases the registration hold. Idempotent.
    ///
    /// If every registered worker already exited (or none was registered),
    /// this closes the stream.
    pub fn seal(&self) {
        if !self.sealed.swap(true, Ordering::AcqRel) {
            self.release();
        }
    }

    /// Number of registered workers that have not exited yet.
    pub fn live(&self) -> usize {
        let n = self.live.load(Ordering::Acquire);
        if self.sealed.load(Ordering::Acquire) {
            n
        } else {
            n.saturating_sub(1)
        }
    }

    /// True once the tracker has released the root sender.
    pub fn is_closed(&self) -> bool {
        self.stream
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_none()
    }

    fn release(&self) {
        if self.live.fetch_sub(1, Ordering::AcqRel) == 1 {
            self.close();
        }
    }

    fn close(&self) {
        let root = self
            .stream
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(tx) = root {
            drop(tx);
            self.bus.publish(Event::new(EventKind::StreamClosed));
        }
    }
}

/// Marks one live worker; dropping it records the worker's exit.
pub struct CompletionGuard {
    tracker: Arc<CompletionTracker>,
}

impl Drop for CompletionGuard {
    fn drop(&mut self) {
        self.tracker.release();
    }
}
