//! In-memory development chain.
//!
//! Mimics the timestamp rules of a local test node closely enough to run
//! clock-driven scenarios without one. Blocks carry no transactions.

use async_trait::async_trait;
use parking_lot::Mutex;
use timewarp_application::{ChainControl, ChainError};
use timewarp_domain::{BlockInfo, Timestamp};

#[derive(Debug)]
struct ChainState {
    blocks: Vec<BlockInfo>,
    head: BlockInfo,
    pending: Option<Timestamp>,
    mined: usize,
    scheduled: usize,
}

/// A chain that lives in memory.
///
/// Starts with a genesis block at the given timestamp. Like Hardhat, it
/// rejects a scheduled timestamp that is not strictly after the latest
/// block's. Mining without a scheduled timestamp advances by one second.
#[derive(Debug)]
pub struct SimulatedChain {
    state: Mutex<ChainState>,
}

impl SimulatedChain {
    /// Creates a chain whose genesis block is stamped `genesis`.
    #[must_use]
    pub fn new(genesis: Timestamp) -> Self {
        let genesis = BlockInfo::new(0, genesis);
        Self {
            state: Mutex::new(ChainState {
                blocks: vec![genesis],
                head: genesis,
                pending: None,
                mined: 0,
                scheduled: 0,
            }),
        }
    }

    /// Returns every block, genesis first.
    #[must_use]
    pub fn blocks(&self) -> Vec<BlockInfo> {
        self.state.lock().blocks.clone()
    }

    /// Returns the latest block without going through the port.
    #[must_use]
    pub fn head(&self) -> BlockInfo {
        self.state.lock().head
    }

    /// Returns the timestamp scheduled for the next block, if any.
    #[must_use]
    pub fn pending_timestamp(&self) -> Option<Timestamp> {
        self.state.lock().pending
    }

    /// Number of blocks mined through [`ChainControl::mine`].
    #[must_use]
    pub fn mine_count(&self) -> usize {
        self.state.lock().mined
    }

    /// Number of accepted `set_next_block_timestamp` calls.
    #[must_use]
    pub fn set_timestamp_count(&self) -> usize {
        self.state.lock().scheduled
    }
}

#[async_trait]
impl ChainControl for SimulatedChain {
    async fn set_next_block_timestamp(&self, timestamp: Timestamp) -> Result<(), ChainError> {
        let mut state = self.state.lock();
        let latest = state.head.timestamp;
        if timestamp <= latest {
            return Err(ChainError::Rejected(format!(
                "timestamp {timestamp} is lower than or equal to previous block's timestamp {latest}"
            )));
        }
        state.pending = Some(timestamp);
        state.scheduled += 1;
        drop(state);
        tracing::trace!(%timestamp, "simulated chain scheduled next block");
        Ok(())
    }

    async fn mine(&self) -> Result<(), ChainError> {
        let mut state = self.state.lock();
        let latest = state.head;
        let timestamp = match state.pending.take() {
            Some(timestamp) => timestamp,
            None => Timestamp::from_secs(latest.timestamp.as_secs().saturating_add(1)),
        };
        let block = BlockInfo::new(latest.number + 1, timestamp);
        state.blocks.push(block);
        state.head = block;
        state.mined += 1;
        drop(state);
        tracing::trace!(number = block.number, %timestamp, "simulated chain mined block");
        Ok(())
    }

    async fn latest_block(&self) -> Result<BlockInfo, ChainError> {
        Ok(self.head())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const GENESIS: u64 = 1_600_000_000;

    #[tokio::test]
    async fn test_genesis() {
        let chain = SimulatedChain::new(Timestamp::from_secs(GENESIS));
        let latest = chain.latest_block().await.unwrap();
        assert_eq!(latest, BlockInfo::new(0, Timestamp::from_secs(GENESIS)));
        assert_eq!(chain.mine_count(), 0);
    }

    #[tokio::test]
    async fn test_mine_uses_scheduled_timestamp() {
        let chain = SimulatedChain::new(Timestamp::from_secs(GENESIS));
        let next = Timestamp::from_secs(GENESIS + 1_000);

        chain.set_next_block_timestamp(next).await.unwrap();
        assert_eq!(chain.pending_timestamp(), Some(next));
        chain.mine().await.unwrap();

        assert_eq!(chain.head(), BlockInfo::new(1, next));
        assert_eq!(chain.pending_timestamp(), None);
    }

    #[tokio::test]
    async fn test_mine_without_schedule_ticks_one_second() {
        let chain = SimulatedChain::new(Timestamp::from_secs(GENESIS));

        chain.mine().await.unwrap();
        chain.mine().await.unwrap();

        let stamps: Vec<u64> = chain.blocks().iter().map(|b| b.timestamp.as_secs()).collect();
        assert_eq!(stamps, vec![GENESIS, GENESIS + 1, GENESIS + 2]);
        assert_eq!(chain.mine_count(), 2);
    }

    #[tokio::test]
    async fn test_rejects_timestamp_in_the_past() {
        let chain = SimulatedChain::new(Timestamp::from_secs(GENESIS));

        let err = chain
            .set_next_block_timestamp(Timestamp::from_secs(GENESIS - 1))
            .await
            .unwrap_err();

        assert!(matches!(err, ChainError::Rejected(_)));
        assert_eq!(chain.set_timestamp_count(), 0);
        assert_eq!(chain.pending_timestamp(), None);
    }

    #[tokio::test]
    async fn test_rejects_timestamp_equal_to_latest() {
        let chain = SimulatedChain::new(Timestamp::from_secs(GENESIS));

        let err = chain
            .set_next_block_timestamp(Timestamp::from_secs(GENESIS))
            .await
            .unwrap_err();

        assert!(matches!(err, ChainError::Rejected(_)));
        assert_eq!(chain.set_timestamp_count(), 0);
    }

    #[tokio::test]
    async fn test_head_follows_mined_blocks() {
        let chain = SimulatedChain::new(Timestamp::from_secs(GENESIS));
        let next = Timestamp::from_secs(GENESIS + 10);

        chain.set_next_block_timestamp(next).await.unwrap();
        chain.mine().await.unwrap();
        chain.mine().await.unwrap();

        let head = chain.head();
        assert_eq!(head, BlockInfo::new(2, Timestamp::from_secs(GENESIS + 11)));
        assert_eq!(chain.blocks().last().copied(), Some(head));
        assert_eq!(chain.latest_block().await.unwrap(), head);
    }
}
