//! Terminal outcome of a run.

use std::fmt;
use std::time::Duration;

use crate::core::cancel::CancelCause;

/// Terminal state of a run: `Idle → Running → {Completed | TimedOut | Interrupted}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    /// Every range was exhausted and the stream drained before the deadline.
    Completed,
    /// The deadline fired first.
    TimedOut,
    /// An OS termination signal fired first.
    Interrupted,
}

impl RunStatus {
    /// Short stable label for logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            RunStatus::Completed => "completed",
            RunStatus::TimedOut => "timed_out",
            RunStatus::Interrupted => "interrupted",
        }
    }
}

impl From<CancelCause> for RunStatus {
    fn from(cause: CancelCause) -> Self {
        match cause {
            CancelCause::ScopeClosed => RunStatus::Completed,
            CancelCause::Deadline => RunStatus::TimedOut,
            CancelCause::Interrupted => RunStatus::Interrupted,
        }
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_label())
    }
}

/// Summary returned by [`Coordinator::run`](crate::Coordinator::run).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    /// How the run ended.
    pub status: RunStatus,
    /// Workers spawned (one per range).
    pub workers: usize,
    /// Workers that stopped on the cancellation signal before exhausting their range.
    pub cancelled: usize,
    /// Values the sink accepted.
    pub primes_written: u64,
    /// Values (or flushes) the sink rejected.
    pub write_failures: u64,
    /// The configured timeout.
    pub timeout: Duration,
    /// Wall-clock time from start to return.
    pub elapsed: Duration,
    /// Workers that were still running when the grace period ran out.
    ///
    /// Their stream was closed under them; anything they had already
    /// emitted was written.
    pub stuck: Vec<String>,
}

impl RunReport {
    /// One-line human summary, e.g. `Finished: all ranges exhausted (12 primes written)`.
    pub fn status_line(&self) -> String {
        let written = self.primes_written;
        let mut notes = match self.write_failures {
            0 => String::new(),
            n => format!(", {n} write failures"),
        };
        if !self.stuck.is_empty() {
            notes.push_str(&format!(", {} workers still running", self.stuck.len()));
        }
        match self.status {
            RunStatus::Completed => {
                format!("Finished: all ranges exhausted ({written} primes written{notes})")
            }
            RunStatus::TimedOut => format!(
                "Finished: deadline exceeded after {} ({written} primes written{notes})",
                human_secs(self.timeout)
            ),
            RunStatus::Interrupted => format!(
                "Finished: interrupted after {} ({written} primes written{notes})",
                human_secs(self.elapsed)
            ),
        }
    }
}

fn human_secs(d: Duration) -> String {
    if d.subsec_millis() == 0 {
        format!("{}s", d.as_secs())
    } else {
        format!("{:.3}s", d.as_secs_f64())
    }
}
