//! Logical timestamps and offsets.
//!
//! Chain timestamps are whole seconds since the Unix epoch. Offsets are
//! signed: a negative offset moves a timestamp into the past, and it is up
//! to the chain whether it accepts a block stamped there.

use std::fmt;
use std::ops::{Add, Mul};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};

const SECONDS_PER_DAY: i64 = 60 * 60 * 24;

/// One day in seconds.
pub const ONE_DAY: TimeOffset = TimeOffset::days(1);

/// One month in seconds, approximated as 30 days.
pub const ONE_MONTH: TimeOffset = TimeOffset::months(1);

/// One year in seconds, approximated as 365 days.
pub const ONE_YEAR: TimeOffset = TimeOffset::years(1);

/// A point in logical time, in seconds since the Unix epoch.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Timestamp(u64);

impl Timestamp {
    /// The Unix epoch.
    pub const EPOCH: Self = Self(0);

    /// Creates a timestamp from seconds since the Unix epoch.
    #[must_use]
    pub const fn from_secs(secs: u64) -> Self {
        Self(secs)
    }

    /// Returns the number of seconds since the Unix epoch.
    #[must_use]
    pub const fn as_secs(self) -> u64 {
        self.0
    }

    /// Truncates a wall-clock instant to whole seconds.
    ///
    /// Instants before the epoch clamp to [`Timestamp::EPOCH`].
    #[must_use]
    pub fn from_datetime(datetime: DateTime<Utc>) -> Self {
        Self(u64::try_from(datetime.timestamp()).unwrap_or(0))
    }

    /// Converts to a UTC date-time, if representable.
    #[must_use]
    pub fn to_datetime(self) -> Option<DateTime<Utc>> {
        i64::try_from(self.0)
            .ok()
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
    }

    /// Moves this timestamp by `offset`, in either direction.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::TimestampOutOfRange`] when the result falls
    /// before the epoch or past `u64::MAX` seconds.
    pub const fn advanced_by(self, offset: TimeOffset) -> DomainResult<Self> {
        match self.0.checked_add_signed(offset.as_secs()) {
            Some(secs) => Ok(Self(secs)),
            None => Err(DomainError::TimestampOutOfRange {
                timestamp: self.0,
                offset: offset.as_secs(),
            }),
        }
    }

    /// Returns the offset that separates `earlier` from `self`.
    ///
    /// Saturates at the bounds of [`TimeOffset`].
    #[must_use]
    pub fn offset_since(self, earlier: Self) -> TimeOffset {
        let diff = i128::from(self.0) - i128::from(earlier.0);
        let clamped = diff.clamp(i128::from(i64::MIN), i128::from(i64::MAX));
        TimeOffset::seconds(i64::try_from(clamped).unwrap_or_default())
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(datetime: DateTime<Utc>) -> Self {
        Self::from_datetime(datetime)
    }
}

/// A signed displacement in logical time, in seconds.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct TimeOffset(i64);

impl TimeOffset {
    /// No displacement.
    pub const ZERO: Self = Self(0);

    /// Creates an offset of `secs` seconds.
    #[must_use]
    pub const fn seconds(secs: i64) -> Self {
        Self(secs)
    }

    /// Creates an offset of `n` days.
    #[must_use]
    pub const fn days(n: i64) -> Self {
        Self(n.saturating_mul(SECONDS_PER_DAY))
    }

    /// Creates an offset of `n` 30-day months.
    #[must_use]
    pub const fn months(n: i64) -> Self {
        Self(n.saturating_mul(30 * SECONDS_PER_DAY))
    }

    /// Creates an offset of `n` 365-day years.
    #[must_use]
    pub const fn years(n: i64) -> Self {
        Self(n.saturating_mul(365 * SECONDS_PER_DAY))
    }

    /// Returns the offset in seconds.
    #[must_use]
    pub const fn as_secs(self) -> i64 {
        self.0
    }
}

impl Add for TimeOffset {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl Mul<i64> for TimeOffset {
    type Output = Self;

    fn mul(self, rhs: i64) -> Self {
        Self(self.0.saturating_mul(rhs))
    }
}

impl fmt::Display for TimeOffset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}s", self.0)
    }
}
