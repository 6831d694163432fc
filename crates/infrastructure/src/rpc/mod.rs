//! Ethereum JSON-RPC wire format.
//!
//! Envelope types and the hex quantity encoding used by development nodes
//! such as Hardhat and Anvil.

mod message;
mod quantity;

pub use message::{JSONRPC_VERSION, RpcErrorObject, RpcRequest, RpcResponse};
pub use quantity::{decode_block, format_quantity, parse_quantity};

/// JSON-RPC method names used by the chain adapter.
pub mod methods {
    /// Schedules the timestamp of the next mined block.
    pub const SET_NEXT_BLOCK_TIMESTAMP: &str = "evm_setNextBlockTimestamp";
    /// Mines a block immediately.
    pub const MINE: &str = "evm_mine";
    /// Fetches a block by number or tag.
    pub const GET_BLOCK_BY_NUMBER: &str = "eth_getBlockByNumber";
}
