//! Error types used by the primescan runtime, its inputs and its sinks.
//!
//! This module defines four error enums:
//!
//! - [`RangeError`]: a single malformed `start:finish` entry (reported, skipped).
//! - [`ConfigError`]: input that makes the whole run impossible.
//! - [`SinkError`]: output failures; opening is fatal to the caller, writes are not.
//! - [`RuntimeError`]: failures of the coordination runtime itself.
//!
//! Each type provides `as_label` (stable snake_case, for logs); [`RuntimeError`]
//! also provides `as_message`.
//! Deadline expiry is **not** an error; it is the
//! [`RunStatus::TimedOut`](crate::RunStatus::TimedOut) outcome.

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// # Malformed range entry.
///
/// Produced while parsing `start:finish`. Affects only the offending entry.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RangeError {
    /// Entry is not exactly two colon-separated parts.
    #[error("incorrect range {input:?}: expected <start>:<finish>")]
    MissingSeparator {
        /// The raw entry.
        input: String,
    },

    /// One of the two bounds is not an integer.
    #[error("incorrect range {input:?}: bound {bound:?} is not an integer ({reason})")]
    InvalidBound {
        /// The raw entry.
        input: String,
        /// The offending bound.
        bound: String,
        /// Parser message.
        reason: String,
    },
}

impl RangeError {
    /// Returns a short stable label (snake_case) for use in logs.
    ///
    /// # Example
    /// ```
    /// use primescan::RangeError;
    ///
    /// let err = "5-10".parse::<primescan::PrimeRange>().unwrap_err();
    /// assert_eq!(err.as_label(), "range_missing_separator");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            RangeError::MissingSeparator { .. } => "range_missing_separator",
            RangeError::InvalidBound { .. } => "range_invalid_bound",
        }
    }

    /// Returns the raw entry that failed to parse.
    pub fn input(&self) -> &str {
        match self {
            RangeError::MissingSeparator { input } | RangeError::InvalidBound { input, .. } => {
                input
            }
        }
    }
}

/// # Input that cannot produce a run.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Every supplied range was malformed (or none was supplied).
    #[error("no valid range to scan")]
    NoValidRanges,

    /// A zero timeout would cancel the run before any work is scheduled.
    #[error("timeout must be positive")]
    ZeroTimeout,
}

impl ConfigError {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            ConfigError::NoValidRanges => "config_no_valid_ranges",
            ConfigError::ZeroTimeout => "config_zero_timeout",
        }
    }
}

/// # Output sink failures.
///
/// `Open` is fatal and stops the run before any worker starts.
/// `Write` and `Flush` are reported per occurrence and never abort the stream.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum SinkError {
    /// The destination could not be created.
    #[error("cannot create output {path:?}: {source}")]
    Open {
        /// Destination path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// A single value could not be written.
    #[error("cannot write prime {prime}: {source}")]
    Write {
        /// The value that was lost.
        prime: i64,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// Buffered output could not be flushed.
    #[error("cannot flush output: {source}")]
    Flush {
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
}

impl SinkError {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            SinkError::Open { .. } => "sink_open",
            SinkError::Write { .. } => "sink_write",
            SinkError::Flush { .. } => "sink_flush",
        }
    }

    /// Indicates whether the error must abort the run.
    ///
    /// Only [`SinkError::Open`] is fatal.
    pub fn is_fatal(&self) -> bool {
        matches!(self, SinkError::Open { .. })
    }
}

/// # Errors produced by the coordination runtime.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// Input rejected before the run started.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// After cancellation, the collector could not finish writing within the grace period.
    #[error("shutdown grace {grace:?} exceeded; stuck: {stuck:?}")]
    GraceExceeded {
        /// The configured grace duration.
        grace: Duration,
        /// Workers still alive when the grace period ran out, then `collector`.
        stuck: Vec<String>,
    },

    /// The collector task panicked; delivered output may be incomplete.
    #[error("collector terminated abnormally: {reason}")]
    CollectorPanicked {
        /// Join error message.
        reason: String,
    },
}

impl RuntimeError {
    /// Returns a short stable label (snake_case) for use in logs.
    ///
    /// # Example
    /// ```
    /// use primescan::RuntimeError;
    /// use std::time::Duration;
    ///
    /// let err = RuntimeError::GraceExceeded { grace: Duration::from_secs(5), stuck: vec![] };
    /// assert_eq!(err.as_label(), "runtime_grace_exceeded");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            RuntimeError::Config(e) => e.as_label(),
            RuntimeError::GraceExceeded { .. } => "runtime_grace_exceeded",
            RuntimeError::CollectorPanicked { .. } => "runtime_collector_panicked",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            RuntimeError::GraceExceeded { grace, stuck } => {
                format!("grace exceeded after {grace:?}; stuck workers={stuck:?}")
            }
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_open_is_fatal() {
        let open = SinkError::Open {
            path: "/nope".into(),
            source: io::Error::from(io::ErrorKind::PermissionDenied),
        };
        let write = SinkError::Write {
            prime: 7,
            source: io::Error::from(io::ErrorKind::WriteZero),
        };
        assert!(open.is_fatal());
        assert!(!write.is_fatal());
        assert_eq!(write.as_label(), "sink_write");
    }

    #[test]
    fn test_runtime_labels_delegate() {
        let err: RuntimeError = ConfigError::NoValidRanges.into();
        assert_eq!(err.as_label(), "config_no_valid_ranges");

        let err = RuntimeError::GraceExceeded {
            grace: Duration::from_millis(10),
            stuck: vec!["worker-0 [1:9]".into()],
        };
        assert!(err.as_message().contains("worker-0"));
    }

    #[test]
    fn test_range_error_keeps_input() {
        let err = RangeError::InvalidBound {
            input: "a:1".into(),
            bound: "a".into(),
            reason: "invalid digit found in string".into(),
        };
        assert_eq!(err.input(), "a:1");
        assert_eq!(err.as_label(), "range_invalid_bound");
    }
}
