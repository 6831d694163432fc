//! Chain control over JSON-RPC using reqwest.
//!
//! This adapter implements the `ChainControl` port against a development
//! node's HTTP endpoint using the `evm_*` test-control methods.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Value, json};
use timewarp_application::{ChainControl, ChainError};
use timewarp_domain::{BlockInfo, Timestamp};
use url::Url;

use crate::rpc::{RpcRequest, RpcResponse, decode_block, methods};
use crate::settings::Settings;

/// JSON-RPC client for a development chain.
pub struct JsonRpcChain {
    client: Client,
    url: Url,
    timeout: Duration,
    next_id: AtomicU64,
}

impl JsonRpcChain {
    /// Creates a client for the node described by `settings`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(settings: &Settings) -> Result<Self, ChainError> {
        let client = Client::builder()
            .user_agent(concat!("timewarp/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ChainError::Transport(e.to_string()))?;

        Ok(Self::with_client(
            client,
            settings.rpc_url.clone(),
            settings.request_timeout(),
        ))
    }

    /// Creates a client with a custom reqwest client.
    #[must_use]
    pub const fn with_client(client: Client, url: Url, timeout: Duration) -> Self {
        Self {
            client,
            url,
            timeout,
            next_id: AtomicU64::new(1),
        }
    }

    /// Returns the node endpoint.
    #[must_use]
    pub const fn url(&self) -> &Url {
        &self.url
    }

    /// Sends one JSON-RPC call and returns its `result` member.
    async fn call(&self, method: &str, params: Value) -> Result<Value, ChainError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let request = RpcRequest::new(id, method, params);
        tracing::debug!(method, id, url = %self.url, "sending JSON-RPC request");

        let response = self
            .client
            .post(self.url.clone())
            .timeout(self.timeout)
            .json(&request)
            .send()
            .await
            .map_err(|e| self.map_error(&e))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| self.map_error(&e))?;

        let envelope: RpcResponse = serde_json::from_slice(&body)
            .map_err(|e| ChainError::InvalidResponse(format!("HTTP {status}: {e}")))?;
        envelope.into_result()
    }

    /// Maps reqwest errors to `ChainError`.
    fn map_error(&self, error: &reqwest::Error) -> ChainError {
        if error.is_timeout() {
            return ChainError::Transport(format!(
                "request to {} timed out after {}ms",
                self.url,
                self.timeout.as_millis()
            ));
        }
        if error.is_connect() {
            return ChainError::Transport(format!("cannot connect to {}: {error}", self.url));
        }
        ChainError::Transport(error.to_string())
    }
}

#[async_trait]
impl ChainControl for JsonRpcChain {
    async fn set_next_block_timestamp(&self, timestamp: Timestamp) -> Result<(), ChainError> {
        self.call(
            methods::SET_NEXT_BLOCK_TIMESTAMP,
            json!([timestamp.as_secs()]),
        )
        .await?;
        Ok(())
    }

    async fn mine(&self) -> Result<(), ChainError> {
        self.call(methods::MINE, json!([])).await?;
        Ok(())
    }

    async fn latest_block(&self) -> Result<BlockInfo, ChainError> {
        let result = self
            .call(methods::GET_BLOCK_BY_NUMBER, json!(["latest", false]))
            .await?;
        decode_block(result)
    }
}
