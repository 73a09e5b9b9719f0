//! # Global runtime configuration.
//!
//! Provides [`Config`], the immutable settings passed once into the
//! [`Coordinator`](crate::Coordinator).
//!
//! ## Sentinel values
//! - `grace = 0s` → do not wait for stragglers after the deadline
//! - `channel_capacity` and `bus_capacity` are clamped to a minimum of 1

use std::time::Duration;

use crate::error::ConfigError;

/// Global configuration for one prime search run.
///
/// ## Field semantics
/// - `timeout`: wall-clock budget; the deadline is `start + timeout`
/// - `grace`: drain window after cancellation (`0s` = no wait)
/// - `channel_capacity`: bounded prime stream size (min 1)
/// - `bus_capacity`: event bus ring buffer size (min 1)
/// - `handle_signals`: treat SIGINT/SIGTERM/Ctrl-C as an early stop
#[derive(Clone, Debug)]
pub struct Config {
    /// Time budget for the whole run.
    ///
    /// When it elapses the cancellation signal fires and the run ends as
    /// [`RunStatus::TimedOut`](crate::RunStatus::TimedOut).
    pub timeout: Duration,

    /// Maximum time to wait, after cancellation, for workers to stop and for
    /// the collector to drain values already emitted.
    ///
    /// Workers still running when it ends are abandoned and listed in
    /// `RunReport::stuck`. If the collector itself cannot finish within a
    /// further grace period the run returns `RuntimeError::GraceExceeded`.
    pub grace: Duration,

    /// Capacity of the prime stream between workers and the collector.
    ///
    /// Workers block on a full stream until the collector catches up.
    pub channel_capacity: usize,

    /// Capacity of the event bus broadcast channel ring buffer.
    pub bus_capacity: usize,

    /// Listen for OS termination signals and stop early on receipt.
    pub handle_signals: bool,
}

impl Config {
    /// Creates a configuration with the given timeout and defaults elsewhere.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            timeout,
            ..Self::default()
        }
    }

    /// Checks invariants that make a run possible.
    ///
    /// # Errors
    /// [`ConfigError::ZeroTimeout`] if `timeout` is zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.timeout.is_zero() {
            return Err(ConfigError::ZeroTimeout);
        }
        Ok(())
    }

    /// Returns the prime stream capacity clamped to a minimum of 1.
    #[inline]
    pub fn channel_capacity_clamped(&self) -> usize {
        self.channel_capacity.max(1)
    }

    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - `timeout = 10s`
    /// - `grace = 5s`
    /// - `channel_capacity = 1024`
    /// - `bus_capacity = 1024`
    /// - `handle_signals = false`
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            grace: Duration::from_secs(5),
            channel_capacity: 1024,
            bus_capacity: 1024,
            handle_signals: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capacities_are_clamped() {
        let cfg = Config {
            channel_capacity: 0,
            bus_capacity: 0,
            ..Config::default()
        };
        assert_eq!(cfg.channel_capacity_clamped(), 1);
        assert_eq!(cfg.bus_capacity_clamped(), 1);
    }

    #[test]
    fn test_zero_timeout_is_rejected() {
        let cfg = Config::with_timeout(Duration::ZERO);
        assert_eq!(cfg.validate(), Err(ConfigError::ZeroTimeout));
        assert!(Config::with_timeout(Duration::from_secs(1)).validate().is_ok());
    }
}
