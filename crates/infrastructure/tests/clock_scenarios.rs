//! Logical clock scenarios against the in-memory chain.
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::sync::Arc;

use chrono::{DateTime, Utc};
use pretty_assertions::assert_eq;
use timewarp_application::{ApplicationError, ChainError, LogicalClock};
use timewarp_domain::{ONE_DAY, ONE_MONTH, ONE_YEAR, TimeOffset, Timestamp};
use timewarp_infrastructure::{FixedClock, SimulatedChain, SystemClock};

const T0: u64 = 1_700_000_000;

fn wall_at(secs: u64) -> FixedClock {
    let secs = i64::try_from(secs).expect("timestamp fits i64");
    FixedClock::new(DateTime::from_timestamp(secs, 0).expect("valid instant"))
}

/// Clock at `T0` driving a chain whose genesis is a minute older.
fn fixed_start() -> (Arc<SimulatedChain>, LogicalClock<SimulatedChain>) {
    let chain = Arc::new(SimulatedChain::new(Timestamp::from_secs(T0 - 60)));
    let clock = LogicalClock::new(&wall_at(T0), Arc::clone(&chain));
    (chain, clock)
}

#[test]
fn test_starts_near_wall_clock() {
    let chain = Arc::new(SimulatedChain::new(Timestamp::EPOCH));
    let clock = LogicalClock::new(&SystemClock::new(), chain);

    let wall = Timestamp::from(Utc::now());
    let drift = wall.offset_since(clock.now()).as_secs().abs();

    assert!(drift <= 2, "logical clock drifted {drift}s from wall time");
}

#[tokio::test]
async fn test_one_year_scenario() {
    let (chain, mut clock) = fixed_start();
    let t0 = clock.now();

    clock.advance(ONE_YEAR).await.unwrap();
    assert_eq!(clock.now(), Timestamp::from_secs(t0.as_secs() + 31_536_000));

    clock.commit().await.unwrap();
    assert_eq!(chain.mine_count(), 1);
    assert_eq!(chain.head().timestamp, clock.now());
}

#[tokio::test]
async fn test_vault_unlock_flow() {
    let (chain, mut clock) = fixed_start();
    let unlock_date = Timestamp::from_secs(T0).advanced_by(ONE_MONTH * 6).unwrap();

    // Before the unlock date nothing has been mined.
    assert!(chain.head().timestamp < unlock_date);

    clock.advance_to(unlock_date).await.unwrap();
    clock.commit().await.unwrap();

    assert_eq!(chain.head().timestamp, unlock_date);
    assert_eq!(chain.head().number, 1);
}

#[tokio::test]
async fn test_staking_period_in_daily_steps() {
    let (chain, mut clock) = fixed_start();

    for _ in 0..7 {
        clock.advance_and_commit(ONE_DAY).await.unwrap();
    }

    let stamps: Vec<u64> = chain
        .blocks()
        .iter()
        .skip(1)
        .map(|b| b.timestamp.as_secs())
        .collect();
    let expected: Vec<u64> = (1..=7).map(|d| T0 + d * 86_400).collect();
    assert_eq!(stamps, expected);
}

#[tokio::test]
async fn test_repeated_commit_mines_once() {
    let (chain, mut clock) = fixed_start();
    clock.advance(ONE_DAY).await.unwrap();

    clock.commit().await.unwrap();
    clock.commit().await.unwrap();

    assert_eq!(chain.mine_count(), 1);
}

#[tokio::test]
async fn test_zero_advance_schedules_without_moving() {
    let (chain, mut clock) = fixed_start();
    let before = clock.now();

    let after = clock.advance(TimeOffset::ZERO).await.unwrap();

    assert_eq!(after, before);
    assert_eq!(chain.set_timestamp_count(), 1);
    assert_eq!(chain.pending_timestamp(), Some(before));
}

#[tokio::test]
async fn test_commit_noop_when_chain_ahead() {
    let chain = Arc::new(SimulatedChain::new(Timestamp::from_secs(T0 + 3_600)));
    let mut clock = LogicalClock::new(&wall_at(T0), Arc::clone(&chain));

    clock.commit().await.unwrap();

    assert_eq!(chain.mine_count(), 0);
}

#[tokio::test]
async fn test_chain_rejection_propagates() {
    let chain = Arc::new(SimulatedChain::new(Timestamp::from_secs(T0 + 3_600)));
    let mut clock = LogicalClock::new(&wall_at(T0), Arc::clone(&chain));

    let err = clock.advance(TimeOffset::seconds(60)).await.unwrap_err();

    assert!(matches!(err, ApplicationError::Chain(ChainError::Rejected(_))));
    assert_eq!(clock.now(), Timestamp::from_secs(T0));
    assert_eq!(chain.set_timestamp_count(), 0);
}

#[tokio::test]
async fn test_negative_advance_moves_back() {
    let chain = Arc::new(SimulatedChain::new(Timestamp::from_secs(T0 - 1_000)));
    let mut clock = LogicalClock::new(&wall_at(T0), Arc::clone(&chain));

    let now = clock.advance(TimeOffset::seconds(-60)).await.unwrap();

    assert_eq!(now, Timestamp::from_secs(T0 - 60));
    assert_eq!(clock.now(), now);
    assert_eq!(chain.set_timestamp_count(), 1);
    assert_eq!(chain.pending_timestamp(), Some(now));
}

#[tokio::test]
async fn test_negative_advance_below_head_is_rejected() {
    let (chain, mut clock) = fixed_start();

    let err = clock.advance(TimeOffset::seconds(-120)).await.unwrap_err();

    assert!(matches!(err, ApplicationError::Chain(ChainError::Rejected(_))));
    assert_eq!(clock.now(), Timestamp::from_secs(T0));
    assert_eq!(chain.set_timestamp_count(), 0);
}

#[tokio::test]
async fn test_travels_from_separate_sessions_accumulate() {
    let chain = Arc::new(SimulatedChain::new(Timestamp::from_secs(T0 - 60)));

    for _ in 0..2 {
        let mut clock = LogicalClock::resume(&wall_at(T0), Arc::clone(&chain))
            .await
            .unwrap();
        clock.advance_and_commit(ONE_DAY).await.unwrap();
    }

    assert_eq!(chain.head().timestamp, Timestamp::from_secs(T0 + 2 * 86_400));
    assert_eq!(chain.mine_count(), 2);
}

#[tokio::test]
async fn test_resume_ignores_chain_behind_wall_clock() {
    let (chain, _) = fixed_start();

    let clock = LogicalClock::resume(&wall_at(T0), chain).await.unwrap();

    assert_eq!(clock.now(), Timestamp::from_secs(T0));
}
