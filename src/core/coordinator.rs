//! # Coordinator: wires workers, collector, tracker and cancellation into one run.
//!
//! The [`Coordinator`] owns the event bus, a [`SubscriberSet`], the
//! [`AliveTracker`] and the immutable [`Config`]. Each call to
//! [`Coordinator::run`] scans a list of ranges into a sink until either every
//! range is exhausted or the cancellation signal fires.
//!
//! ## High-level architecture
//! ```text
//! Inputs to run():
//!   Vec<PrimeRange>, impl Sink  ──►  Coordinator::run()
//!
//! Preparation:
//!   - cfg.validate()
//!   - subscriber_listener(): Bus.subscribe() ─► AliveTracker::update + SubscriberSet::emit
//!   - CancelController::start(cfg.timeout)            (deadline watcher)
//!   - mpsc::channel(cfg.channel_capacity)             (prime stream)
//!   - CompletionTracker::new(root sender)             (registration hold taken)
//!   - tokio::spawn(collect(rx, sink))                 (fan-in collector)
//!
//! Spawn workers:
//!   range[0]   range[1]  ...  range[N-1]
//!      │          │               │
//!      └──► RangeWorker::new(id, range, tx.clone(), controller.worker_token(), tracker.register())
//!                 └──► set.spawn_blocking(worker.run())
//!   tracker.seal()                                    (hold released)
//!
//! Terminal race:
//!   collector finished  ──► controller.close()  ──► Completed    (publish AllRangesExhausted)
//!   deadline fired      ─────────────────────────► TimedOut     (publish DeadlineElapsed)
//!   OS signal fired     ─────────────────────────► Interrupted  (publish ShutdownRequested)
//!
//! After cancellation:
//!   wait_all_with_grace(cfg.grace):
//!      ├─ workers joined + collector drained  → publish AllStoppedWithin
//!      ├─ workers still running after grace   → publish GraceExceeded
//!      │                                        (AliveTracker.snapshot() for stuck workers)
//!      │                                        stop.cancel(): collector closes the stream,
//!      │                                        writes what is buffered, flushes the sink
//!      └─ collector still running after grace → RuntimeError::GraceExceeded (sink stalled)
//! ```
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use primescan::{Config, Coordinator, MemorySink, PrimeRange, RunStatus};
//!
//! #[tokio::main(flavor = "multi_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let coordinator = Coordinator::new(Config::with_timeout(Duration::from_secs(5)), Vec::new());
//!     let sink = MemorySink::new();
//!
//!     let report = coordinator
//!         .run(vec![PrimeRange::new(2, 10), PrimeRange::new(11, 20)], sink.clone())
//!         .await?;
//!     coordinator.shutdown().await;
//!
//!     assert_eq!(report.status, RunStatus::Completed);
//!     assert_eq!(sink.sorted().await, vec![2, 3, 5, 7, 11, 13, 17, 19]);
//!     Ok(())
//! }
//! ```

use std::sync::Arc;
use std::time::Instant;

use tokio::sync::broadcast::error::{RecvError, TryRecvError};
use tokio::sync::mpsc;
use tokio::task::{JoinError, JoinHandle, JoinSet};
use tokio_util::sync::CancellationToken;

use crate::core::alive::AliveTracker;
use crate::core::cancel::CancelController;
use crate::core::collector::{CollectorReport, collect};
use crate::core::config::Config;
use crate::core::status::{RunReport, RunStatus};
use crate::core::tracker::CompletionTracker;
use crate::core::worker::{RangeWorker, WorkerExit};
use crate::error::RuntimeError;
use crate::events::{Bus, Event, EventKind};
use crate::range::PrimeRange;
use crate::sink::Sink;
use crate::subscribers::{Subscribe, SubscriberSet};

/// Worker exits, stuck worker labels and the collector's outcome.
type Drained = (
    Vec<WorkerExit>,
    Vec<String>,
    Result<CollectorReport, JoinError>,
);

/// Coordinates range workers, the collector, event delivery and shutdown.
pub struct Coordinator {
    cfg: Config,
    bus: Bus,
    subs: Arc<SubscriberSet>,
    alive: Arc<AliveTracker>,
}

impl Coordinator {
    /// Creates a coordinator with the given config and subscribers.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn new(cfg: Config, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        let bus = Bus::new(cfg.bus_capacity_clamped());
        let subs = Arc::new(SubscriberSet::new(subscribers));
        Self {
            cfg,
            bus,
            subs,
            alive: Arc::new(AliveTracker::new()),
        }
    }

    /// The event bus; subscribe here for raw events.
    pub fn bus(&self) -> &Bus {
        &self.bus
    }

    /// The run configuration.
    pub fn config(&self) -> &Config {
        &self.cfg
    }

    /// Scans `ranges` into `sink` until all are exhausted or the signal fires.
    ///
    /// An empty `ranges` list completes immediately with nothing written.
    ///
    /// A deadline is not an error: the run ends as [`RunStatus::TimedOut`] and
    /// everything emitted before cancellation is written. Workers that outlive
    /// [`Config::grace`] are listed in [`RunReport::stuck`].
    ///
    /// # Errors
    /// - [`RuntimeError::Config`] if the configuration is invalid (nothing is started).
    /// - [`RuntimeError::GraceExceeded`] if, after cancellation, the collector
    ///   could not finish writing within [`Config::grace`] (the sink stalled).
    /// - [`RuntimeError::CollectorPanicked`] if the sink panicked.
    pub async fn run<S: Sink>(
        &self,
        ranges: Vec<PrimeRange>,
        sink: S,
    ) -> Result<RunReport, RuntimeError> {
        self.cfg.validate()?;
        let started = Instant::now();

        let (done, listener) = self.subscriber_listener();
        let res = self.drive(ranges, sink, started).await;
        done.cancel();
        let _ = listener.await;
        res
    }

    /// Closes subscriber queues and waits until every delivered event is processed.
    pub async fn shutdown(self) {
        match Arc::try_unwrap(self.subs) {
            Ok(set) => set.shutdown().await,
            Err(set) => tracing::warn!(
                subscribers = set.len(),
                "subscriber set still shared; queued events may be dropped"
            ),
        }
    }

    /// Forwards bus events to the alive tracker and the subscriber set.
    ///
    /// Cancelling the returned token makes the listener drain what is already
    /// buffered on the bus and exit.
    fn subscriber_listener(&self) -> (CancellationToken, JoinHandle<()>) {
        let mut rx = self.bus.subscribe();
        let set = Arc::clone(&self.subs);
        let alive = Arc::clone(&self.alive);
        let done = CancellationToken::new();
        let stop = done.clone();

        let handle = tokio::spawn(async move {
            loop {
                tokio::select! {
                    biased;
                    res = rx.recv() => match res {
                        Ok(ev) => {
                            alive.update(&ev).await;
                            set.emit(&ev);
                        }
                        Err(RecvError::Lagged(skipped)) => {
                            tracing::warn!(skipped, "event listener lagged behind the bus");
                        }
                        Err(RecvError::Closed) => break,
                    },
                    _ = stop.cancelled() => {
                        loop {
                            match rx.try_recv() {
                                Ok(ev) => {
                                    alive.update(&ev).await;
                                    set.emit(&ev);
                                }
                                Err(TryRecvError::Lagged(_)) => continue,
                                Err(_) => break,
                            }
                        }
                        break;
                    }
                }
            }
        });
        (done, handle)
    }

    async fn drive<S: Sink>(
        &self,
        ranges: Vec<PrimeRange>,
        sink: S,
        started: Instant,
    ) -> Result<RunReport, RuntimeError> {
        let controller = CancelController::start(self.cfg.timeout, self.cfg.handle_signals);
        let (tx, rx) = mpsc::channel(self.cfg.channel_capacity_clamped());
        let tracker = CompletionTracker::new(tx.clone(), self.bus.clone());
        let stop = CancellationToken::new();
        let mut collector = tokio::spawn(collect(rx, sink, self.bus.clone(), stop.clone()));

        let workers = ranges.len();
        self.bus.publish(
            Event::new(EventKind::RunStarting)
                .with_found(workers as u64)
                .with_timeout(self.cfg.timeout),
        );

        let mut set = JoinSet::new();
        for (id, range) in ranges.into_iter().enumerate() {
            let worker = RangeWorker::new(
                id,
                range,
                tx.clone(),
                controller.worker_token(),
                self.bus.clone(),
                tracker.register(),
            );
            set.spawn_blocking(move || worker.run());
        }
        drop(tx);
        tracker.seal();

        let finished = tokio::select! {
            res = &mut collector => Some(res),
            _ = controller.fired() => None,
        };
        if finished.is_some() {
            controller.close();
        }

        // Only close() records ScopeClosed, so Completed implies `finished`.
        let status = controller
            .cause()
            .map_or(RunStatus::Completed, RunStatus::from);
        let (exits, stuck, collected) = match status {
            RunStatus::Completed => {
                self.bus.publish(Event::new(EventKind::AllRangesExhausted));
                let mut exits = Vec::with_capacity(workers);
                self.join_workers(&mut set, &mut exits).await;
                let collected = match finished {
                    Some(res) => res,
                    None => collector.await,
                };
                (exits, Vec::new(), collected)
            }
            RunStatus::TimedOut | RunStatus::Interrupted => {
                let kind = if status == RunStatus::TimedOut {
                    EventKind::DeadlineElapsed
                } else {
                    EventKind::ShutdownRequested
                };
                self.bus
                    .publish(Event::new(kind).with_timeout(self.cfg.timeout));
                self.wait_all_with_grace(&mut set, &mut collector, finished, &stop)
                    .await?
            }
        };

        let report = collected.map_err(|e| RuntimeError::CollectorPanicked {
            reason: e.to_string(),
        })?;
        let cancelled = exits
            .iter()
            .filter(|e| matches!(e, WorkerExit::Cancelled { .. }))
            .count();

        Ok(RunReport {
            status,
            workers,
            cancelled,
            primes_written: report.written,
            write_failures: report.failed,
            timeout: self.cfg.timeout,
            elapsed: started.elapsed(),
            stuck,
        })
    }

    /// Joins workers into `exits`; a panicked worker is published as `WorkerPanicked`.
    ///
    /// Exits joined so far stay in `exits` if this future is dropped early.
    async fn join_workers(&self, set: &mut JoinSet<WorkerExit>, exits: &mut Vec<WorkerExit>) {
        while let Some(res) = set.join_next().await {
            match res {
                Ok(exit) => exits.push(exit),
                Err(e) => self
                    .bus
                    .publish(Event::new(EventKind::WorkerPanicked).with_reason(e.to_string())),
            }
        }
    }

    /// Waits for workers to stop and the collector to drain within the grace period.
    ///
    /// Workers still running when the grace period ends are abandoned: their
    /// labels are published with [`EventKind::GraceExceeded`], and `stop` makes
    /// the collector close the stream under them, write what is buffered and
    /// flush the sink. [`EventKind::AllStoppedWithin`] is published when no
    /// worker was abandoned.
    ///
    /// Returns [`RuntimeError::GraceExceeded`] only if the collector itself does
    /// not finish within a further grace period.
    async fn wait_all_with_grace(
        &self,
        set: &mut JoinSet<WorkerExit>,
        collector: &mut JoinHandle<CollectorReport>,
        finished: Option<Result<CollectorReport, JoinError>>,
        stop: &CancellationToken,
    ) -> Result<Drained, RuntimeError> {
        let grace = self.cfg.grace;
        let mut exits = Vec::with_capacity(set.len());
        let mut stuck = Vec::new();

        let joined = tokio::time::timeout(grace, self.join_workers(&mut *set, &mut exits))
            .await
            .is_ok();
        if !joined {
            stuck = self.alive.snapshot().await;
            self.bus
                .publish(Event::new(EventKind::GraceExceeded).with_reason(stuck.join(", ")));
            stop.cancel();
        }

        let collected = match finished {
            Some(res) => res,
            None => match tokio::time::timeout(grace, &mut *collector).await {
                Ok(res) => res,
                Err(_) => {
                    collector.abort();
                    stuck.push("collector".to_string());
                    self.bus.publish(
                        Event::new(EventKind::GraceExceeded).with_reason(stuck.join(", ")),
                    );
                    return Err(RuntimeError::GraceExceeded { grace, stuck });
                }
            },
        };

        if joined {
            self.bus.publish(Event::new(EventKind::AllStoppedWithin));
        }
        Ok((exits, stuck, collected))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ConfigError, SinkError};
    use crate::oracle::is_prime;
    use crate::range::parse_ranges;
    use crate::sink::{LineSink, MemorySink};
    use async_trait::async_trait;
    use std::collections::HashSet;
    use std::time::Duration;
    use tokio::sync::Mutex;

    fn config(timeout: Duration) -> Config {
        Config {
            timeout,
            grace: Duration::from_secs(5),
            ..Config::default()
        }
    }

    async fn scan(ranges: Vec<PrimeRange>, cfg: Config) -> (RunReport, Vec<i64>) {
        let coordinator = Coordinator::new(cfg, Vec::new());
        let sink = MemorySink::new();
        let report = coordinator.run(ranges, sink.clone()).await.unwrap();
        coordinator.shutdown().await;
        (report, sink.sorted().await)
    }

    fn reference(from: i64, to: i64) -> Vec<i64> {
        (from..=to).filter(|&n| is_prime(n)).collect()
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_small_range_completes() {
        let (report, primes) = scan(
            vec![PrimeRange::new(2, 10)],
            config(Duration::from_secs(10)),
        )
        .await;

        assert_eq!(primes, vec![2, 3, 5, 7]);
        assert_eq!(report.status, RunStatus::Completed);
        assert_eq!(report.workers, 1);
        assert_eq!(report.primes_written, 4);
        assert_eq!(report.cancelled, 0);
        assert!(report.elapsed < Duration::from_secs(10));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_reversed_range_writes_nothing() {
        let (report, primes) = scan(
            vec![PrimeRange::new(10, 2)],
            config(Duration::from_secs(10)),
        )
        .await;
        assert!(primes.is_empty());
        assert_eq!(report.status, RunStatus::Completed);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_no_ranges_completes_immediately() {
        let (report, primes) = scan(Vec::new(), config(Duration::from_secs(10))).await;
        assert!(primes.is_empty());
        assert_eq!(report.status, RunStatus::Completed);
        assert_eq!(report.workers, 0);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_disjoint_ranges_match_single_scan() {
        let (_, split) = scan(
            vec![
                PrimeRange::new(-20, 50),
                PrimeRange::new(51, 100),
                PrimeRange::new(101, 2_000),
            ],
            config(Duration::from_secs(10)),
        )
        .await;
        let (_, whole) = scan(
            vec![PrimeRange::new(-20, 2_000)],
            config(Duration::from_secs(10)),
        )
        .await;

        assert_eq!(split, whole);
        assert_eq!(split, reference(-20, 2_000));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_adjacent_ranges_deliver_each_prime_once() {
        let (report, primes) = scan(
            vec![PrimeRange::new(2, 5), PrimeRange::new(6, 10)],
            config(Duration::from_secs(10)),
        )
        .await;
        assert_eq!(primes, vec![2, 3, 5, 7]);
        assert_eq!(report.primes_written, 4);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_many_workers_with_tiny_stream() {
        let ranges: Vec<PrimeRange> = (0..32)
            .map(|i| PrimeRange::new(i * 100, i * 100 + 99))
            .collect();
        let cfg = Config {
            channel_capacity: 1,
            ..config(Duration::from_secs(10))
        };

        let (report, primes) = scan(ranges, cfg).await;
        assert_eq!(report.status, RunStatus::Completed);
        assert_eq!(report.workers, 32);
        assert_eq!(primes, reference(0, 3_199));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_deadline_stops_unbounded_scan() {
        let timeout = Duration::from_millis(300);
        let ranges = vec![
            PrimeRange::new(2, 999_999_999_999),
            PrimeRange::new(1_000_000_000_000, 1_000_001_000_000_000),
        ];

        let (report, primes) = scan(ranges, config(timeout)).await;

        assert_eq!(report.status, RunStatus::TimedOut);
        assert_eq!(report.cancelled, 2);
        assert!(report.elapsed >= timeout);
        assert!(report.elapsed < timeout + Duration::from_secs(3));
        assert!(!primes.is_empty());
        assert_eq!(primes.len() as u64, report.primes_written);
        assert!(primes.iter().all(|&p| is_prime(p)));

        let unique: HashSet<i64> = primes.iter().copied().collect();
        assert_eq!(unique.len(), primes.len());
        assert_eq!(
            report.status_line(),
            format!(
                "Finished: deadline exceeded after 0.300s ({} primes written)",
                primes.len()
            )
        );
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_malformed_entry_does_not_block_others() {
        let (ranges, errors) = parse_ranges(["2:10", "abc", "11:20", "5-9"]);
        assert_eq!(errors.len(), 2);

        let (report, primes) = scan(ranges, config(Duration::from_secs(10))).await;
        assert_eq!(report.workers, 2);
        assert_eq!(primes, vec![2, 3, 5, 7, 11, 13, 17, 19]);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_zero_timeout_is_rejected() {
        let coordinator = Coordinator::new(config(Duration::ZERO), Vec::new());
        let err = coordinator
            .run(vec![PrimeRange::new(2, 10)], MemorySink::new())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            RuntimeError::Config(ConfigError::ZeroTimeout)
        ));
    }

    struct RejectSeven {
        inner: MemorySink,
    }

    #[async_trait]
    impl Sink for RejectSeven {
        async fn accept(&mut self, prime: i64) -> Result<(), SinkError> {
            if prime == 7 {
                return Err(SinkError::Write {
                    prime,
                    source: std::io::Error::other("no space left"),
                });
            }
            self.inner.accept(prime).await
        }
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_write_failure_keeps_run_going() {
        let coordinator = Coordinator::new(config(Duration::from_secs(10)), Vec::new());
        let store = MemorySink::new();
        let report = coordinator
            .run(
                vec![PrimeRange::new(2, 20)],
                RejectSeven {
                    inner: store.clone(),
                },
            )
            .await
            .unwrap();
        coordinator.shutdown().await;

        assert_eq!(report.status, RunStatus::Completed);
        assert_eq!(report.write_failures, 1);
        assert_eq!(report.primes_written, 7);
        assert_eq!(store.sorted().await, vec![2, 3, 5, 11, 13, 17, 19]);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_file_sink_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("primes.txt");
        let sink = LineSink::create(&path).await.unwrap();

        let coordinator = Coordinator::new(config(Duration::from_secs(10)), Vec::new());
        let report = coordinator
            .run(vec![PrimeRange::new(1, 30), PrimeRange::new(90, 100)], sink)
            .await
            .unwrap();
        coordinator.shutdown().await;

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.ends_with('\n'));
        let mut lines: Vec<i64> = text.lines().map(|l| l.parse().unwrap()).collect();
        lines.sort_unstable();

        assert_eq!(lines, vec![2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 97]);
        assert_eq!(report.primes_written, 11);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_deadline_with_stuck_worker_still_flushes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("primes.txt");
        let sink = LineSink::create(&path).await.unwrap();
        let cfg = Config {
            timeout: Duration::from_millis(100),
            grace: Duration::from_millis(100),
            ..Config::default()
        };

        // 10^18 + 3 is prime; trial division on it outlives the grace period.
        let coordinator = Coordinator::new(cfg, Vec::new());
        let report = coordinator
            .run(
                vec![
                    PrimeRange::new(2, 100),
                    PrimeRange::new(1_000_000_000_000_000_000, 1_000_000_000_000_000_100),
                ],
                sink,
            )
            .await
            .unwrap();
        coordinator.shutdown().await;

        let text = std::fs::read_to_string(&path).unwrap();
        let mut lines: Vec<i64> = text.lines().map(|l| l.parse().unwrap()).collect();
        lines.sort_unstable();

        assert_eq!(report.status, RunStatus::TimedOut);
        assert_eq!(lines, reference(2, 100));
        assert_eq!(report.primes_written, 25);
        assert_eq!(
            report.stuck,
            vec!["worker-1 [1000000000000000000:1000000000000000100]".to_string()]
        );
        assert_eq!(
            report.status_line(),
            "Finished: deadline exceeded after 0.100s (25 primes written, 1 workers still running)"
        );
    }

    /// Never accepts a value.
    struct StallingSink;

    #[async_trait]
    impl Sink for StallingSink {
        async fn accept(&mut self, _prime: i64) -> Result<(), SinkError> {
            std::future::pending().await
        }
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_stalled_sink_fails_after_grace() {
        let cfg = Config {
            timeout: Duration::from_millis(100),
            grace: Duration::from_millis(100),
            channel_capacity: 1,
            ..Config::default()
        };
        let coordinator = Coordinator::new(cfg, Vec::new());
        let err = coordinator
            .run(vec![PrimeRange::new(2, 1_000)], StallingSink)
            .await
            .unwrap_err();
        coordinator.shutdown().await;

        match err {
            RuntimeError::GraceExceeded { grace, stuck } => {
                assert_eq!(grace, Duration::from_millis(100));
                assert_eq!(
                    stuck,
                    vec!["worker-0 [2:1000]".to_string(), "collector".to_string()]
                );
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[derive(Default)]
    struct Recorder {
        kinds: Mutex<Vec<EventKind>>,
    }

    #[async_trait]
    impl Subscribe for Recorder {
        async fn on_event(&self, ev: &Event) {
            self.kinds.lock().await.push(ev.kind);
        }
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_subscribers_see_run_lifecycle() {
        let rec = Arc::new(Recorder::default());
        let coordinator = Coordinator::new(
            config(Duration::from_secs(10)),
            vec![rec.clone() as Arc<dyn Subscribe>],
        );
        coordinator
            .run(
                vec![PrimeRange::new(2, 50), PrimeRange::new(51, 99)],
                MemorySink::new(),
            )
            .await
            .unwrap();
        coordinator.shutdown().await;

        let kinds = rec.kinds.lock().await;
        let count = |k: EventKind| kinds.iter().filter(|&&x| x == k).count();
        assert_eq!(kinds.first(), Some(&EventKind::RunStarting));
        assert_eq!(kinds.last(), Some(&EventKind::AllRangesExhausted));
        assert_eq!(count(EventKind::WorkerStarting), 2);
        assert_eq!(count(EventKind::WorkerStopped), 2);
        assert_eq!(count(EventKind::StreamClosed), 1);
    }
}
