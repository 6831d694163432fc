//! Committed block metadata reported by the execution environment.

use serde::{Deserialize, Serialize};

use crate::time::Timestamp;

/// The latest committed unit of work on the chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockInfo {
    /// Block height.
    pub number: u64,
    /// Timestamp the block was committed with.
    pub timestamp: Timestamp,
}

impl BlockInfo {
    /// Creates block metadata.
    #[must_use]
    pub const fn new(number: u64, timestamp: Timestamp) -> Self {
        Self { number, timestamp }
    }
}
