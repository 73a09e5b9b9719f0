//! # Worker liveness tracker with sequence-based ordering.
//!
//! Maintains which workers are currently scanning, using event sequence
//! numbers to handle out-of-order delivery. The coordinator's listener feeds
//! it every bus event; the coordinator reads it to name stuck workers when the
//! shutdown grace period runs out.
//!
//! ## Rules
//! - Only `WorkerStarting` / `WorkerStopped` change alive state.
//! - Events with `seq <= last_seq` for the same worker are **rejected** (stale).
//! - Reads are eventually consistent with the bus.

use std::collections::HashMap;

use tokio::sync::RwLock;

use crate::events::{Event, EventKind};

#[derive(Debug, Clone)]
struct WorkerState {
    label: String,
    last_seq: u64,
    alive: bool,
}

/// Thread-safe tracker of alive workers, keyed by worker id.
#[derive(Default)]
pub struct AliveTracker {
    state: RwLock<HashMap<usize, WorkerState>>,
}

impl AliveTracker {
    /// Creates an empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies `ev` if it is newer than the last event seen for its worker.
    ///
    /// Returns `true` if the alive state changed.
    /// ```text
    /// update(WorkerStopped,  seq=100) → alive=false, last_seq=100
    /// update(WorkerStarting, seq=99)  → rejected (stale)
    /// ```
    pub async fn update(&self, ev: &Event) -> bool {
        let alive = match ev.kind {
            EventKind::WorkerStarting => true,
            EventKind::WorkerStopped => false,
            _ => return false,
        };
        let (Some(id), Some(label)) = (ev.worker, ev.worker_label()) else {
            return false;
        };

        let mut state = self.state.write().await;
        let entry = state.entry(id).or_insert(WorkerState {
            label,
            last_seq: 0,
            alive: false,
        });
        if ev.seq <= entry.last_seq {
            return false;
        }
        entry.last_seq = ev.seq;
        let changed = entry.alive != alive;
        entry.alive = alive;
        changed
    }

    /// Labels of workers currently alive, ordered by worker id.
    pub async fn snapshot(&self) -> Vec<String> {
        let state = self.state.read().await;
        let mut alive: Vec<(usize, String)> = state
            .iter()
            .filter(|(_, ws)| ws.alive)
            .map(|(id, ws)| (*id, ws.label.clone()))
            .collect();
        alive.sort_unstable_by_key(|(id, _)| *id);
        alive.into_iter().map(|(_, label)| label).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::range::PrimeRange;

    fn worker_event(kind: EventKind, id: usize) -> Event {
        Event::new(kind)
            .with_worker(id)
            .with_range(PrimeRange::new(1, 100))
    }

    #[tokio::test]
    async fn test_start_then_stop() {
        let alive = AliveTracker::new();
        assert!(alive.update(&worker_event(EventKind::WorkerStarting, 1)).await);
        assert_eq!(alive.snapshot().await, vec!["worker-1 [1:100]".to_string()]);

        assert!(alive.update(&worker_event(EventKind::WorkerStopped, 1)).await);
        assert!(alive.snapshot().await.is_empty());
    }

    #[tokio::test]
    async fn test_stale_event_is_rejected() {
        let alive = AliveTracker::new();
        let start = worker_event(EventKind::WorkerStarting, 0);
        let stop = worker_event(EventKind::WorkerStopped, 0);

        assert!(!alive.update(&stop).await);
        assert!(!alive.update(&start).await);
        assert!(alive.snapshot().await.is_empty());
    }

    #[tokio::test]
    async fn test_snapshot_ordered_by_id() {
        let alive = AliveTracker::new();
        for id in [10, 2, 7] {
            alive.update(&worker_event(EventKind::WorkerStarting, id)).await;
        }
        assert_eq!(
            alive.snapshot().await,
            vec![
                "worker-2 [1:100]".to_string(),
                "worker-7 [1:100]".to_string(),
                "worker-10 [1:100]".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_unrelated_events_ignored() {
        let alive = AliveTracker::new();
        assert!(!alive.update(&Event::new(EventKind::StreamClosed)).await);
        assert!(alive.snapshot().await.is_empty());
    }
}
