//! Command-line front end for the `primescan` binary.
//!
//! [`CliArgs`] is parsed with clap (flags or environment variables, `.env`
//! supported by the binary) and turned into a validated [`RunPlan`].

use std::path::PathBuf;
use std::time::Duration;

use clap::{ArgAction, Parser};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::core::Config;
use crate::error::{ConfigError, RangeError};
use crate::range::{PrimeRange, parse_ranges};

/// Arguments of the `primescan` binary.
///
/// Every scan is bounded by `--timeout`. Ranges that fail to parse are
/// reported and skipped; the run only fails if none is left.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "primescan",
    version,
    about = "Search integer ranges for primes in parallel until a deadline"
)]
pub struct CliArgs {
    /// Time budget for the search, in seconds.
    ///
    /// Environment variable: `PRIMESCAN_TIMEOUT`
    #[arg(long, env = "PRIMESCAN_TIMEOUT", value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout: u64,

    /// Output file; created or truncated before the search starts.
    ///
    /// Environment variable: `PRIMESCAN_FILE`
    #[arg(long, env = "PRIMESCAN_FILE")]
    pub file: PathBuf,

    /// Inclusive range to scan, as `<start>:<finish>`. Repeat for more ranges.
    #[arg(
        long = "range",
        value_name = "START:FINISH",
        required = true,
        action = ArgAction::Append,
        allow_hyphen_values = true
    )]
    pub ranges: Vec<String>,

    /// Seconds to wait, after the deadline, for workers to stop and output to drain.
    #[arg(long, default_value_t = 5)]
    pub grace: u64,

    /// Capacity of the stream between workers and the writer.
    #[arg(long, default_value_t = 1024)]
    pub capacity: usize,
}

/// Validated inputs for one run.
#[derive(Debug, Clone)]
pub struct RunPlan {
    /// Runtime configuration (signals enabled).
    pub config: Config,
    /// Well-formed ranges, in argument order.
    pub ranges: Vec<PrimeRange>,
    /// Entries that were rejected.
    pub rejected: Vec<RangeError>,
    /// Output path.
    pub file: PathBuf,
}

impl TryFrom<CliArgs> for RunPlan {
    type Error = ConfigError;

    fn try_from(args: CliArgs) -> Result<Self, Self::Error> {
        let (ranges, rejected) = parse_ranges(&args.ranges);
        for err in &rejected {
            tracing::warn!(input = err.input(), label = err.as_label(), "{err}");
        }
        if ranges.is_empty() {
            return Err(ConfigError::NoValidRanges);
        }

        let config = Config {
            timeout: Duration::from_secs(args.timeout),
            grace: Duration::from_secs(args.grace),
            channel_capacity: args.capacity,
            handle_signals: true,
            ..Config::default()
        };
        config.validate()?;

        Ok(Self {
            config,
            ranges,
            rejected,
            file: args.file,
        })
    }
}

/// Installs the fmt subscriber on stderr, filtered by `RUST_LOG` (default `info`).
pub fn init_tracing() {
    let _ = tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .try_init();
}
