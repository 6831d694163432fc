//! Logical clock
//!
//! Keeps a simulated "current time" and steers a development chain so that
//! its blocks catch up with it. Tests use this to jump past vault unlock
//! dates, staking periods and rental expirations without waiting.

use std::sync::Arc;

use timewarp_domain::{BlockInfo, TimeOffset, Timestamp};

use crate::ApplicationResult;
use crate::ports::{ChainControl, Clock};

/// Simulated clock bound to one execution environment.
///
/// Construct one per test context and pass it to whatever needs it. Every
/// operation that talks to the chain takes `&mut self`, so a clock handles
/// one request at a time.
///
/// # Example
///
/// ```ignore
/// let chain = Arc::new(JsonRpcChain::new(&settings)?);
/// let mut clock = LogicalClock::new(&SystemClock::new(), chain);
///
/// clock.advance(ONE_YEAR).await?;
/// clock.commit().await?;
/// ```
pub struct LogicalClock<C: ChainControl + ?Sized> {
    chain: Arc<C>,
    current: Timestamp,
}

impl<C: ChainControl + ?Sized> LogicalClock<C> {
    /// Creates a clock starting at the wall-clock time reported by `clock`.
    pub fn new(clock: &impl Clock, chain: Arc<C>) -> Self {
        Self::starting_at(Timestamp::from_datetime(clock.now()), chain)
    }

    /// Creates a clock that picks up where the chain left off.
    ///
    /// Starts at the later of the wall-clock time and the latest block's
    /// timestamp, so travel from an earlier session is not undone.
    ///
    /// # Errors
    ///
    /// Returns the chain's error if the latest block cannot be read.
    pub async fn resume(clock: &impl Clock, chain: Arc<C>) -> ApplicationResult<Self> {
        let wall = Timestamp::from_datetime(clock.now());
        let head = chain.latest_timestamp().await?;
        tracing::debug!(%wall, %head, "resuming logical clock");
        Ok(Self::starting_at(wall.max(head), chain))
    }

    /// Creates a clock starting at an explicit instant.
    pub const fn starting_at(start: Timestamp, chain: Arc<C>) -> Self {
        Self {
            chain,
            current: start,
        }
    }

    /// Returns the current logical time.
    #[must_use]
    pub const fn now(&self) -> Timestamp {
        self.current
    }

    /// Returns the chain this clock drives.
    #[must_use]
    pub fn chain(&self) -> &C {
        &self.chain
    }

    /// Moves logical time by `offset` and schedules the next block at the
    /// new time.
    ///
    /// Offsets are not validated: a negative one moves the clock back, and
    /// the chain decides whether a block that early is acceptable. One
    /// instruction is sent even when `offset` is zero. The clock only
    /// changes once the chain has accepted the timestamp.
    ///
    /// # Errors
    ///
    /// Returns a domain error if the result leaves the timestamp range
    /// (nothing is sent to the chain) and the chain's error if it rejects
    /// the timestamp.
    #[tracing::instrument(skip(self), fields(from = %self.current))]
    pub async fn advance(&mut self, offset: TimeOffset) -> ApplicationResult<Timestamp> {
        let target = self.current.advanced_by(offset)?;
        self.chain.set_next_block_timestamp(target).await?;
        self.current = target;
        tracing::debug!(%target, "next block timestamp scheduled");
        Ok(target)
    }

    /// Mines a block if logical time is ahead of the chain.
    ///
    /// The mined block takes whatever timestamp the chain assigns, which is
    /// the scheduled one after an [`advance`](Self::advance).
    ///
    /// # Errors
    ///
    /// Returns the chain's error if the query or the mine fails.
    #[tracing::instrument(skip(self), fields(now = %self.current))]
    pub async fn commit(&mut self) -> ApplicationResult<()> {
        let latest = self.chain.latest_timestamp().await?;
        if self.current > latest {
            self.chain.mine().await?;
            tracing::info!(%latest, "mined block to reach logical time");
        } else {
            tracing::debug!(%latest, "chain already at logical time");
        }
        Ok(())
    }

    /// Advances by `offset`, then commits.
    ///
    /// # Errors
    ///
    /// See [`advance`](Self::advance) and [`commit`](Self::commit).
    pub async fn advance_and_commit(&mut self, offset: TimeOffset) -> ApplicationResult<Timestamp> {
        let now = self.advance(offset).await?;
        self.commit().await?;
        Ok(now)
    }

    /// Advances to `target`, or by zero if `target` is not in the future.
    ///
    /// # Errors
    ///
    /// See [`advance`](Self::advance).
    pub async fn advance_to(&mut self, target: Timestamp) -> ApplicationResult<Timestamp> {
        let offset = target.offset_since(self.current).max(TimeOffset::ZERO);
        self.advance(offset).await
    }

    /// Returns the chain's latest committed block.
    ///
    /// # Errors
    ///
    /// Returns the chain's error if the query fails.
    pub async fn latest_block(&self) -> ApplicationResult<BlockInfo> {
        Ok(self.chain.latest_block().await?)
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::significant_drop_tightening
)]
mod tests {
    use super::*;
    use crate::{ApplicationError, ChainError};
    use async_trait::async_trait;
    use chrono::{DateTime, Utc};
    use pretty_assertions::assert_eq;
    use std::sync::Mutex;
    use timewarp_domain::{DomainError, ONE_DAY, ONE_YEAR};

    const T0: u64 = 1_700_000_000;

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Call {
        SetNext(Timestamp),
        Mine,
        Latest,
    }

    /// Mock chain that records every instruction it receives.
    struct RecordingChain {
        calls: Mutex<Vec<Call>>,
        latest: Mutex<BlockInfo>,
        pending: Mutex<Option<Timestamp>>,
        failure: Option<ChainError>,
    }

    impl RecordingChain {
        fn at(secs: u64) -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                latest: Mutex::new(BlockInfo::new(0, Timestamp::from_secs(secs))),
                pending: Mutex::new(None),
                failure: None,
            }
        }

        fn failing(err: ChainError) -> Self {
            Self {
                failure: Some(err),
                ..Self::at(T0)
            }
        }

        fn calls(&self) -> Vec<Call> {
            self.calls.lock().expect("Lock poisoned").clone()
        }

        fn count(&self, call: &Call) -> usize {
            self.calls().iter().filter(|c| *c == call).count()
        }

        fn record(&self, call: Call) -> Result<(), ChainError> {
            self.calls.lock().expect("Lock poisoned").push(call);
            self.failure.clone().map_or(Ok(()), Err)
        }
    }

    #[async_trait]
    impl ChainControl for RecordingChain {
        async fn set_next_block_timestamp(&self, timestamp: Timestamp) -> Result<(), ChainError> {
            self.record(Call::SetNext(timestamp))?;
            *self.pending.lock().expect("Lock poisoned") = Some(timestamp);
            Ok(())
        }

        async fn mine(&self) -> Result<(), ChainError> {
            self.record(Call::Mine)?;
            let next = self.pending.lock().expect("Lock poisoned").take();
            let mut latest = self.latest.lock().expect("Lock poisoned");
            let timestamp = next.unwrap_or_else(|| Timestamp::from_secs(latest.timestamp.as_secs() + 1));
            *latest = BlockInfo::new(latest.number + 1, timestamp);
            Ok(())
        }

        async fn latest_block(&self) -> Result<BlockInfo, ChainError> {
            self.record(Call::Latest)?;
            Ok(*self.latest.lock().expect("Lock poisoned"))
        }
    }

    struct FixedWallClock(DateTime<Utc>);

    impl Clock for FixedWallClock {
        fn now(&self) -> DateTime<Utc> {
            self.0
        }
    }

    fn clock_at(secs: u64) -> (Arc<RecordingChain>, LogicalClock<RecordingChain>) {
        let chain = Arc::new(RecordingChain::at(secs));
        let clock = LogicalClock::starting_at(Timestamp::from_secs(secs), Arc::clone(&chain));
        (chain, clock)
    }

    #[test]
    fn test_new_uses_wall_clock() {
        let wall = FixedWallClock(DateTime::from_timestamp(1_234_567_890, 500).unwrap());
        let clock = LogicalClock::new(&wall, Arc::new(RecordingChain::at(0)));
        assert_eq!(clock.now(), Timestamp::from_secs(1_234_567_890));
    }

    #[tokio::test]
    async fn test_resume_starts_at_chain_head_when_ahead() {
        let wall = FixedWallClock(DateTime::from_timestamp(1_700_000_000, 0).unwrap());
        let chain = Arc::new(RecordingChain::at(T0 + 500));

        let clock = LogicalClock::resume(&wall, chain).await.unwrap();

        assert_eq!(clock.now(), Timestamp::from_secs(T0 + 500));
    }

    #[tokio::test]
    async fn test_resume_starts_at_wall_clock_when_chain_behind() {
        let wall = FixedWallClock(DateTime::from_timestamp(1_700_000_000, 0).unwrap());
        let chain = Arc::new(RecordingChain::at(T0 - 500));

        let clock = LogicalClock::resume(&wall, Arc::clone(&chain)).await.unwrap();

        assert_eq!(clock.now(), Timestamp::from_secs(T0));
        assert_eq!(chain.calls(), vec![Call::Latest]);
    }

    #[tokio::test]
    async fn test_resumed_travels_accumulate() {
        let wall = FixedWallClock(DateTime::from_timestamp(1_700_000_000, 0).unwrap());
        let chain = Arc::new(RecordingChain::at(T0 - 60));

        for _ in 0..2 {
            let mut clock = LogicalClock::resume(&wall, Arc::clone(&chain)).await.unwrap();
            clock.advance_and_commit(ONE_DAY).await.unwrap();
        }

        let head = chain.latest_block().await.unwrap();
        assert_eq!(head.timestamp, Timestamp::from_secs(T0 + 2 * 86_400));
        assert_eq!(chain.count(&Call::Mine), 2);
    }

    #[tokio::test]
    async fn test_resume_propagates_chain_error() {
        let wall = FixedWallClock(DateTime::from_timestamp(1_700_000_000, 0).unwrap());
        let chain = Arc::new(RecordingChain::failing(ChainError::Transport(
            "connection refused".to_string(),
        )));

        let result = LogicalClock::resume(&wall, chain).await;

        assert!(matches!(result, Err(ApplicationError::Chain(ChainError::Transport(_)))));
    }

    #[tokio::test]
    async fn test_advance_returns_new_time() {
        let (chain, mut clock) = clock_at(T0);

        let now = clock.advance(TimeOffset::seconds(90)).await.unwrap();

        assert_eq!(now, Timestamp::from_secs(T0 + 90));
        assert_eq!(clock.now(), now);
        assert_eq!(chain.calls(), vec![Call::SetNext(now)]);
    }

    #[tokio::test]
    async fn test_advance_one_day() {
        let (_, mut clock) = clock_at(T0);
        let before = clock.now();

        clock.advance(ONE_DAY).await.unwrap();

        assert_eq!(clock.now().offset_since(before).as_secs(), 86_400);
    }

    #[tokio::test]
    async fn test_advance_zero_still_schedules() {
        let (chain, mut clock) = clock_at(T0);

        let now = clock.advance(TimeOffset::ZERO).await.unwrap();

        assert_eq!(now, Timestamp::from_secs(T0));
        assert_eq!(chain.calls(), vec![Call::SetNext(Timestamp::from_secs(T0))]);
    }

    #[tokio::test]
    async fn test_advance_accumulates() {
        let (chain, mut clock) = clock_at(T0);

        clock.advance(ONE_DAY).await.unwrap();
        clock.advance(ONE_DAY).await.unwrap();

        assert_eq!(clock.now(), Timestamp::from_secs(T0 + 2 * 86_400));
        assert_eq!(chain.count(&Call::SetNext(clock.now())), 1);
    }

    #[tokio::test]
    async fn test_advance_negative_offset_moves_back() {
        let (chain, mut clock) = clock_at(T0);

        let now = clock.advance(TimeOffset::seconds(-60)).await.unwrap();

        assert_eq!(now, Timestamp::from_secs(T0 - 60));
        assert_eq!(clock.now(), now);
        assert_eq!(chain.calls(), vec![Call::SetNext(now)]);
    }

    #[tokio::test]
    async fn test_advance_before_epoch_is_domain_error() {
        let (chain, mut clock) = clock_at(10);

        let err = clock.advance(TimeOffset::seconds(-11)).await.unwrap_err();

        assert!(matches!(
            err,
            ApplicationError::Domain(DomainError::TimestampOutOfRange { .. })
        ));
        assert_eq!(clock.now(), Timestamp::from_secs(10));
        assert!(chain.calls().is_empty());
    }

    #[tokio::test]
    async fn test_advance_propagates_chain_error() {
        let rejected = ChainError::Rpc {
            code: -32000,
            message: "Timestamp is lower than the previous block's timestamp".to_string(),
        };
        let chain = Arc::new(RecordingChain::failing(rejected.clone()));
        let mut clock = LogicalClock::starting_at(Timestamp::from_secs(T0), chain);

        let err = clock.advance(ONE_DAY).await.unwrap_err();

        match err {
            ApplicationError::Chain(inner) => assert_eq!(inner, rejected),
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(clock.now(), Timestamp::from_secs(T0));
    }

    #[tokio::test]
    async fn test_commit_mines_when_ahead() {
        let (chain, mut clock) = clock_at(T0);
        clock.advance(ONE_DAY).await.unwrap();

        clock.commit().await.unwrap();

        assert_eq!(chain.count(&Call::Mine), 1);
        let latest = clock.latest_block().await.unwrap();
        assert_eq!(latest.timestamp, clock.now());
        assert_eq!(latest.number, 1);
    }

    #[tokio::test]
    async fn test_commit_noop_when_chain_caught_up() {
        let (chain, mut clock) = clock_at(T0);

        clock.commit().await.unwrap();

        assert_eq!(chain.calls(), vec![Call::Latest]);
    }

    #[tokio::test]
    async fn test_commit_twice_mines_once() {
        let (chain, mut clock) = clock_at(T0);
        clock.advance(ONE_DAY).await.unwrap();

        clock.commit().await.unwrap();
        clock.commit().await.unwrap();

        assert_eq!(chain.count(&Call::Mine), 1);
    }

    #[tokio::test]
    async fn test_commit_propagates_chain_error() {
        let chain = Arc::new(RecordingChain::failing(ChainError::Transport(
            "connection refused".to_string(),
        )));
        let mut clock = LogicalClock::starting_at(Timestamp::from_secs(T0), chain);

        let err = clock.commit().await.unwrap_err();

        assert_eq!(err.to_string(), "transport error: connection refused");
    }

    #[tokio::test]
    async fn test_one_year_scenario() {
        let (chain, mut clock) = clock_at(T0);

        clock.advance(ONE_YEAR).await.unwrap();
        assert_eq!(clock.now(), Timestamp::from_secs(T0 + 31_536_000));

        clock.commit().await.unwrap();
        assert_eq!(chain.count(&Call::Mine), 1);
    }

    #[tokio::test]
    async fn test_advance_and_commit() {
        let (chain, mut clock) = clock_at(T0);

        let now = clock.advance_and_commit(ONE_DAY).await.unwrap();

        assert_eq!(
            chain.calls(),
            vec![Call::SetNext(now), Call::Latest, Call::Mine]
        );
    }

    #[tokio::test]
    async fn test_advance_to_future_target() {
        let (_, mut clock) = clock_at(T0);
        let unlock = Timestamp::from_secs(T0 + 500);

        let now = clock.advance_to(unlock).await.unwrap();

        assert_eq!(now, unlock);
    }

    #[tokio::test]
    async fn test_advance_to_past_target_stays_put() {
        let (chain, mut clock) = clock_at(T0);

        let now = clock.advance_to(Timestamp::from_secs(T0 - 500)).await.unwrap();

        assert_eq!(now, Timestamp::from_secs(T0));
        assert_eq!(chain.calls(), vec![Call::SetNext(Timestamp::from_secs(T0))]);
    }

    #[tokio::test]
    async fn test_works_behind_trait_object() {
        let chain: Arc<dyn ChainControl> = Arc::new(RecordingChain::at(T0));
        let mut clock = LogicalClock::starting_at(Timestamp::from_secs(T0), chain);

        clock.advance_and_commit(ONE_DAY).await.unwrap();

        assert_eq!(
            clock.chain().latest_timestamp().await.unwrap(),
            Timestamp::from_secs(T0 + 86_400)
        );
    }
}
