//! Domain error types

use thiserror::Error;

/// Domain-level errors raised while computing logical time.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Applying the offset leaves the representable timestamp range.
    #[error("timestamp out of range: {timestamp} + ({offset}) seconds")]
    TimestampOutOfRange {
        /// The starting timestamp in seconds.
        timestamp: u64,
        /// The offset that could not be applied.
        offset: i64,
    },
}

/// Result type alias for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
