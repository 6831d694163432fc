//! Wall clock port

use chrono::{DateTime, Utc};

/// Port for reading wall-clock time.
///
/// The logical clock is seeded from this at construction, which lets tests
/// pin the starting instant.
pub trait Clock: Send + Sync {
    /// Returns the current UTC timestamp.
    fn now(&self) -> DateTime<Utc>;
}
