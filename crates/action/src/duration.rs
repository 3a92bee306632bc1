//! Lock duration normalization and validation.
//!
//! Users pick a lock as a magnitude and a unit; the vault takes seconds.
//! A [`LockDuration`] can only be constructed from a valid pair, so deposit
//! actions never carry an out-of-range lock.

use std::{fmt, str::FromStr};
use thiserror::Error;

/// Shortest lock the vault accepts.
pub const MIN_LOCK_SECONDS: u64 = 60;

/// Longest lock the vault accepts (365 days).
pub const MAX_LOCK_SECONDS: u64 = 365 * 24 * 60 * 60;

/// Quick-pick lock durations.
pub const PRESETS: [(&str, u64, LockUnit); 6] = [
    ("1 min", 1, LockUnit::Minutes),
    ("5 min", 5, LockUnit::Minutes),
    ("1 hour", 1, LockUnit::Hours),
    ("1 day", 1, LockUnit::Days),
    ("7 days", 7, LockUnit::Days),
    ("30 days", 30, LockUnit::Days),
];

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LockDurationError {
    #[error("Minimum lock time is 60 seconds (1 minute)")]
    TooShort,

    #[error("Maximum lock time is 365 days (1 year)")]
    TooLong,

    #[error("Unknown lock unit {0:?}, expected seconds, minutes, hours or days")]
    UnknownUnit(String),
}

/// Unit of a user supplied lock duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LockUnit {
    Seconds,
    Minutes,
    Hours,
    Days,
}

impl LockUnit {
    /// Seconds per unit.
    pub const fn factor(self) -> u64 {
        match self {
            Self::Seconds => 1,
            Self::Minutes => 60,
            Self::Hours => 60 * 60,
            Self::Days => 24 * 60 * 60,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Seconds => "seconds",
            Self::Minutes => "minutes",
            Self::Hours => "hours",
            Self::Days => "days",
        }
    }
}

impl fmt::Display for LockUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LockUnit {
    type Err = LockDurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "s" | "sec" | "secs" | "second" | "seconds" => Ok(Self::Seconds),
            "m" | "min" | "mins" | "minute" | "minutes" => Ok(Self::Minutes),
            "h" | "hr" | "hour" | "hours" => Ok(Self::Hours),
            "d" | "day" | "days" => Ok(Self::Days),
            _ => Err(LockDurationError::UnknownUnit(s.to_string())),
        }
    }
}

/// Convert `magnitude` `unit`s to seconds. Saturates instead of overflowing.
pub const fn normalize(magnitude: u64, unit: LockUnit) -> u64 {
    magnitude.saturating_mul(unit.factor())
}

/// Check `seconds` against the range the vault accepts.
pub const fn validate(seconds: u64) -> Result<(), LockDurationError> {
    if seconds < MIN_LOCK_SECONDS {
        return Err(LockDurationError::TooShort);
    }
    if seconds > MAX_LOCK_SECONDS {
        return Err(LockDurationError::TooLong);
    }
    Ok(())
}

/// A validated lock duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockDuration {
    magnitude: u64,
    unit: LockUnit,
    seconds: u64,
}

impl LockDuration {
    /// Normalize and validate a magnitude/unit pair.
    pub fn new(magnitude: u64, unit: LockUnit) -> Result<Self, LockDurationError> {
        let seconds = normalize(magnitude, unit);
        validate(seconds)?;

        Ok(Self {
            magnitude,
            unit,
            seconds,
        })
    }

    /// Lock length in seconds.
    pub const fn seconds(&self) -> u64 {
        self.seconds
    }

    pub const fn unit(&self) -> LockUnit {
        self.unit
    }

    pub const fn magnitude(&self) -> u64 {
        self.magnitude
    }
}

impl fmt::Display for LockDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let unit = self.unit.as_str();
        if self.magnitude == 1 {
            write!(f, "1 {}", unit.trim_end_matches('s'))
        } else {
            write!(f, "{} {}", self.magnitude, unit)
        }
    }
}
