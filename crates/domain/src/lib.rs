//! Timewarp Domain - Core time types
//!
//! This crate defines the time model used to drive time-dependent
//! contract tests. All types here are pure Rust with no I/O dependencies.

pub mod block;
pub mod error;
pub mod time;

pub use block::BlockInfo;
pub use error::{DomainError, DomainResult};
pub use time::{ONE_DAY, ONE_MONTH, ONE_YEAR, TimeOffset, Timestamp};
