//! JSON-RPC 2.0 request and response envelopes.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use timewarp_application::ChainError;

/// Protocol version tag sent with every request.
pub const JSONRPC_VERSION: &str = "2.0";

/// An outgoing JSON-RPC call.
#[derive(Debug, Clone, Serialize)]
pub struct RpcRequest<'a> {
    /// Always `"2.0"`.
    pub jsonrpc: &'static str,
    /// Correlation id echoed back by the node.
    pub id: u64,
    /// Method name, e.g. `evm_mine`.
    pub method: &'a str,
    /// Positional parameters.
    pub params: Value,
}

impl<'a> RpcRequest<'a> {
    /// Creates a request with positional `params`.
    #[must_use]
    pub const fn new(id: u64, method: &'a str, params: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            id,
            method,
            params,
        }
    }
}

/// Error object carried by a failed JSON-RPC response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcErrorObject {
    /// Numeric error code.
    pub code: i64,
    /// Human-readable message.
    pub message: String,
    /// Optional node-specific details.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

/// An incoming JSON-RPC response.
#[derive(Debug, Clone, Deserialize)]
pub struct RpcResponse {
    /// Correlation id of the request this answers.
    #[serde(default)]
    pub id: Option<Value>,
    /// Present on success. May be `null`.
    #[serde(default)]
    pub result: Option<Value>,
    /// Present on failure.
    #[serde(default)]
    pub error: Option<RpcErrorObject>,
}

impl RpcResponse {
    /// Splits the response into its result or a [`ChainError::Rpc`].
    ///
    /// A missing `result` member is treated as `null`.
    ///
    /// # Errors
    ///
    /// Returns the node's error object as [`ChainError::Rpc`].
    pub fn into_result(self) -> Result<Value, ChainError> {
        match self.error {
            Some(error) => Err(ChainError::Rpc {
                code: error.code,
                message: error.message,
            }),
            None => Ok(self.result.unwrap_or(Value::Null)),
        }
    }
}
