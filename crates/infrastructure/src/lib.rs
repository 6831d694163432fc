//! Timewarp Infrastructure - Adapters and implementations
//!
//! This crate provides concrete implementations of the ports defined in
//! the application layer, the JSON-RPC wire format they speak, and the
//! settings used to reach a node.

pub mod adapters;
pub mod settings;
pub mod rpc;

pub use adapters::{FixedClock, JsonRpcChain, SimulatedChain, SystemClock};
pub use settings::{Settings, SettingsError, SettingsLoader};
