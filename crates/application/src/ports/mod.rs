//! Port definitions (interfaces)
//!
//! Ports define the boundaries between the logical clock and the outside
//! world. Each port is a trait implemented by adapters in the
//! infrastructure layer.

mod chain_control;
mod clock;

pub use chain_control::{ChainControl, ChainError};
pub use clock::Clock;
