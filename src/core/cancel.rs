//! # Cancellation controller: one deadline, one broadcast signal.
//!
//! [`CancelController`] owns the run's [`CancellationToken`] and its deadline.
//! The signal starts unset and becomes **permanently** set by the first of:
//!
//! ```text
//! deadline elapsed            ──► CancelCause::Deadline     (watcher task)
//! OS termination signal       ──► CancelCause::Interrupted  (watcher task, opt-in)
//! close() / controller dropped ──► CancelCause::ScopeClosed
//! ```
//!
//! ## Rules
//! - The first cause wins and is recorded exactly once; later causes are ignored.
//! - The cause is recorded **before** the token is cancelled, so any observer
//!   woken by cancellation reads a cause.
//! - Cancelling is idempotent and never reverts.
//! - Workers hold **child tokens**: they see the parent's cancellation but
//!   cannot cancel the run themselves.

use std::sync::{Arc, OnceLock};
use std::time::Duration;

use tokio::time::{Instant, sleep_until};
use tokio_util::sync::CancellationToken;

use crate::core::shutdown;

/// Roughly 30 years; used when `now + timeout` does not fit in an `Instant`.
const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365 * 30);

/// What set the cancellation signal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CancelCause {
    /// The configured deadline elapsed.
    Deadline,
    /// An OS termination signal was received.
    Interrupted,
    /// The owning scope was closed (all work finished, or the controller was dropped).
    ScopeClosed,
}

/// Owns the deadline and emits the shared cancellation signal.
pub struct CancelController {
    token: CancellationToken,
    cause: Arc<OnceLock<CancelCause>>,
    deadline: Instant,
}

impl CancelController {
    /// Starts the controller: the deadline is `now + timeout`.
    ///
    /// Spawns a watcher task that fires on the deadline (and on OS signals if
    /// `handle_signals` is set). The watcher exits as soon as the signal is set
    /// by any cause. Must be called from within a Tokio runtime.
    pub fn start(timeout: Duration, handle_signals: bool) -> Self {
        let now = Instant::now();
        let deadline = now
            .checked_add(timeout)
            .unwrap_or_else(|| now + FAR_FUTURE);

        let token = CancellationToken::new();
        let cause = Arc::new(OnceLock::new());

        let watch_token = token.clone();
        let watch_cause = Arc::clone(&cause);
        tokio::spawn(async move {
            let interrupted = async {
                if !handle_signals || shutdown::wait_for_termination().await.is_err() {
                    std::future::pending::<()>().await;
                }
            };

            tokio::select! {
                _ = sleep_until(deadline) => {
                    fire(&watch_token, &watch_cause, CancelCause::Deadline);
                }
                _ = interrupted => {
                    fire(&watch_token, &watch_cause, CancelCause::Interrupted);
                }
                _ = watch_token.cancelled() => {}
            }
        });

        Self {
            token,
            cause,
            deadline,
        }
    }

    /// Returns a child token for one worker.
    pub fn worker_token(&self) -> CancellationToken {
        self.token.child_token()
    }

    /// Closes the scope. Returns `true` if this call set the signal.
    pub fn close(&self) -> bool {
        fire(&self.token, &self.cause, CancelCause::ScopeClosed)
    }

    /// Completes once the signal is set, whatever the cause.
    pub async fn fired(&self) {
        self.token.cancelled().await;
    }

    /// True once the signal is set.
    pub fn is_fired(&self) -> bool {
        self.token.is_cancelled()
    }

    /// The cause that set the signal, if it is set.
    pub fn cause(&self) -> Option<CancelCause> {
        self.cause.get().copied()
    }

    /// The absolute deadline.
    pub fn deadline(&self) -> Instant {
        self.deadline
    }
}

impl Drop for CancelController {
    fn drop(&mut self) {
        self.close();
    }
}

/// Records `cause` if none is recorded yet, then cancels. Returns `true` if `cause` won.
fn fire(token: &CancellationToken, slot: &OnceLock<CancelCause>, cause: CancelCause) -> bool {
    let won = slot.set(cause).is_ok();
    token.cancel();
    won
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_deadline_fires_once() {
        let ctl = CancelController::start(Duration::from_millis(20), false);
        assert!(!ctl.is_fired());
        assert_eq!(ctl.cause(), None);

        ctl.fired().await;
        assert!(ctl.is_fired());
        assert_eq!(ctl.cause(), Some(CancelCause::Deadline));

        // Later causes are ignored; the signal stays set.
        assert!(!ctl.close());
        assert_eq!(ctl.cause(), Some(CancelCause::Deadline));
        assert!(ctl.is_fired());
    }

    #[tokio::test]
    async fn test_close_before_deadline() {
        let ctl = CancelController::start(Duration::from_secs(60), false);
        let worker = ctl.worker_token();

        assert!(ctl.close());
        assert!(!ctl.close());
        assert!(worker.is_cancelled());
        assert_eq!(ctl.cause(), Some(CancelCause::ScopeClosed));
    }

    #[tokio::test]
    async fn test_every_worker_token_observes_signal() {
        let ctl = CancelController::start(Duration::from_millis(10), false);
        let tokens: Vec<_> = (0..4).map(|_| ctl.worker_token()).collect();

        ctl.fired().await;
        assert!(tokens.iter().all(CancellationToken::is_cancelled));
    }

    #[tokio::test]
    async fn test_worker_token_cannot_cancel_run() {
        let ctl = CancelController::start(Duration::from_secs(60), false);
        ctl.worker_token().cancel();
        assert!(!ctl.is_fired());
    }

    #[tokio::test]
    async fn test_drop_closes_scope() {
        let ctl = CancelController::start(Duration::from_secs(60), false);
        let worker = ctl.worker_token();
        drop(ctl);
        assert!(worker.is_cancelled());
    }

    #[tokio::test]
    async fn test_huge_timeout_does_not_overflow() {
        let ctl = CancelController::start(Duration::MAX, false);
        assert!(ctl.deadline() > Instant::now());
        assert!(!ctl.is_fired());
    }
}
