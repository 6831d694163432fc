//! Application error types

use thiserror::Error;
use timewarp_domain::DomainError;

use crate::ports::ChainError;

/// Application-level errors.
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// A domain rule rejected the operation.
    #[error("domain error: {0}")]
    Domain(#[from] DomainError),

    /// The execution environment failed; carried through as-is.
    #[error(transparent)]
    Chain(#[from] ChainError),
}

/// Result type alias for application operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;
