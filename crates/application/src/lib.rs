//! Timewarp Application - Logical clock and ports
//!
//! This crate defines the application layer with:
//! - Port traits (wall clock and execution-environment control)
//! - The `LogicalClock` service that keeps a chain in step with simulated time
//! - Application-level error handling

pub mod error;
pub mod logical_clock;
pub mod ports;

pub use error::{ApplicationError, ApplicationResult};
pub use logical_clock::LogicalClock;
pub use ports::{ChainControl, ChainError, Clock};
