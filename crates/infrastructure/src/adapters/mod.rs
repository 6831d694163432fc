//! Infrastructure adapters

mod json_rpc_chain;
mod simulated_chain;
mod system_clock;

pub use json_rpc_chain::JsonRpcChain;
pub use simulated_chain::SimulatedChain;
pub use system_clock::{FixedClock, SystemClock};
