//! # Integer ranges assigned to workers.
//!
//! A [`PrimeRange`] is an inclusive interval `start..=finish`. It is parsed from
//! the textual form `start:finish` (exactly two colon-separated integers).
//!
//! ## Rules
//! - `start > finish` is **valid** and describes an empty scan.
//! - Negative bounds are legal; they simply never produce primes.
//! - Parsing is per-entry: [`parse_ranges`] keeps every well-formed entry and
//!   returns the malformed ones separately so the caller can report each.
//!
//! ## Example
//! ```
//! use primescan::{PrimeRange, parse_ranges};
//!
//! let r: PrimeRange = "2:10".parse().unwrap();
//! assert_eq!((r.start, r.finish), (2, 10));
//!
//! let (ok, bad) = parse_ranges(["1:5", "5-10", "20:30"]);
//! assert_eq!(ok.len(), 2);
//! assert_eq!(bad.len(), 1);
//! ```

use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

use crate::error::RangeError;

/// Inclusive interval of candidates scanned by one worker.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PrimeRange {
    /// First candidate (inclusive).
    pub start: i64,
    /// Last candidate (inclusive).
    pub finish: i64,
}

impl PrimeRange {
    /// Creates a new range. `start > finish` yields an empty range.
    #[must_use]
    pub const fn new(start: i64, finish: i64) -> Self {
        Self { start, finish }
    }

    /// True if the range contains no candidates.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.start > self.finish
    }

    /// Candidates in increasing order.
    #[inline]
    #[must_use]
    pub fn candidates(&self) -> RangeInclusive<i64> {
        self.start..=self.finish
    }
}

impl fmt::Display for PrimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.start, self.finish)
    }
}

impl FromStr for PrimeRange {
    type Err = RangeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split(':');
        let (Some(start), Some(finish), None) = (parts.next(), parts.next(), parts.next()) else {
            return Err(RangeError::MissingSeparator {
                input: s.to_string(),
            });
        };

        let bound = |raw: &str| {
            raw.parse::<i64>().map_err(|e| RangeError::InvalidBound {
                input: s.to_string(),
                bound: raw.to_string(),
                reason: e.to_string(),
            })
        };

        Ok(Self::new(bound(start)?, bound(finish)?))
    }
}

/// Parses every entry independently.
///
/// Returns the well-formed ranges in input order and the errors for the
/// malformed ones, also in input order. A malformed entry never affects the
/// others.
pub fn parse_ranges<I, S>(raw: I) -> (Vec<PrimeRange>, Vec<RangeError>)
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut ranges = Vec::new();
    let mut rejected = Vec::new();

    for entry in raw {
        match entry.as_ref().parse::<PrimeRange>() {
            Ok(r) => ranges.push(r),
            Err(e) => rejected.push(e),
        }
    }
    (ranges, rejected)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_well_formed() {
        assert_eq!("2:10".parse::<PrimeRange>().unwrap(), PrimeRange::new(2, 10));
        assert_eq!(
            "-5:+7".parse::<PrimeRange>().unwrap(),
            PrimeRange::new(-5, 7)
        );
        assert_eq!("10:2".parse::<PrimeRange>().unwrap(), PrimeRange::new(10, 2));
    }

    #[test]
    fn test_missing_colon_is_rejected() {
        let err = "5-10".parse::<PrimeRange>().unwrap_err();
        assert!(matches!(err, RangeError::MissingSeparator { .. }));
        assert_eq!(err.as_label(), "range_missing_separator");
    }

    #[test]
    fn test_too_many_parts_is_rejected() {
        let err = "1:2:3".parse::<PrimeRange>().unwrap_err();
        assert!(matches!(err, RangeError::MissingSeparator { .. }));
    }

    #[test]
    fn test_non_integer_bound_is_rejected() {
        let err = "1:ten".parse::<PrimeRange>().unwrap_err();
        match err {
            RangeError::InvalidBound { input, bound, .. } => {
                assert_eq!(input, "1:ten");
                assert_eq!(bound, "ten");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(":5".parse::<PrimeRange>().is_err());
        assert!(" 1:5".parse::<PrimeRange>().is_err());
    }

    #[test]
    fn test_parse_ranges_skips_only_malformed_entries() {
        let (ok, bad) = parse_ranges(["2:5", "5-10", "6:10", "x:y"]);
        assert_eq!(ok, vec![PrimeRange::new(2, 5), PrimeRange::new(6, 10)]);
        assert_eq!(bad.len(), 2);
        assert_eq!(bad[0].input(), "5-10");
        assert_eq!(bad[1].input(), "x:y");
    }

    #[test]
    fn test_empty_and_display() {
        assert!(PrimeRange::new(10, 2).is_empty());
        assert_eq!(PrimeRange::new(10, 2).candidates().count(), 0);
        assert!(!PrimeRange::new(3, 3).is_empty());
        assert_eq!(PrimeRange::new(-3, 4).to_string(), "-3:4");
    }

    #[test]
    fn test_candidates_reach_i64_max_without_overflow() {
        let r = PrimeRange::new(i64::MAX - 2, i64::MAX);
        assert_eq!(r.candidates().count(), 3);
    }
}
