//! Execution environment control port
//!
//! Defines the test-control hooks a development chain exposes for steering
//! block timestamps.

use async_trait::async_trait;
use timewarp_domain::{BlockInfo, Timestamp};

/// Errors reported by the execution environment.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChainError {
    /// The node could not be reached or the request did not complete.
    #[error("transport error: {0}")]
    Transport(String),

    /// The node answered with a JSON-RPC error object.
    #[error("RPC error {code}: {message}")]
    Rpc {
        /// JSON-RPC error code.
        code: i64,
        /// Error message reported by the node.
        message: String,
    },

    /// The node answered with something that could not be decoded.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// The node refused the instruction.
    #[error("rejected: {0}")]
    Rejected(String),
}

/// Port for controlling a development chain's block production.
#[async_trait]
pub trait ChainControl: Send + Sync {
    /// Requires the next committed block to carry `timestamp`.
    ///
    /// # Errors
    /// Returns an error if the node rejects the timestamp or is unreachable.
    async fn set_next_block_timestamp(&self, timestamp: Timestamp) -> Result<(), ChainError>;

    /// Commits a new block immediately.
    ///
    /// The node assigns the timestamp: the pending one if set, otherwise its own.
    ///
    /// # Errors
    /// Returns an error if the node cannot mine.
    async fn mine(&self) -> Result<(), ChainError>;

    /// Returns the latest committed block.
    ///
    /// # Errors
    /// Returns an error if the node is unreachable or the block is malformed.
    async fn latest_block(&self) -> Result<BlockInfo, ChainError>;

    /// Returns the timestamp of the latest committed block.
    ///
    /// # Errors
    /// Same as [`ChainControl::latest_block`].
    async fn latest_timestamp(&self) -> Result<Timestamp, ChainError> {
        Ok(self.latest_block().await?.timestamp)
    }
}
