//! Hex quantity decoding for Ethereum JSON-RPC payloads.

use serde::Deserialize;
use serde_json::Value;
use timewarp_application::ChainError;
use timewarp_domain::{BlockInfo, Timestamp};

/// Decodes a `0x`-prefixed hex quantity such as `"0x65f1a2b0"`.
///
/// # Errors
///
/// Returns [`ChainError::InvalidResponse`] when the prefix is missing, the
/// digits are empty or not hex, or the value exceeds `u64`.
pub fn parse_quantity(raw: &str) -> Result<u64, ChainError> {
    let digits = raw
        .strip_prefix("0x")
        .or_else(|| raw.strip_prefix("0X"))
        .ok_or_else(|| ChainError::InvalidResponse(format!("quantity without 0x prefix: {raw}")))?;
    if digits.is_empty() {
        return Err(ChainError::InvalidResponse(format!("empty quantity: {raw}")));
    }
    u64::from_str_radix(digits, 16)
        .map_err(|e| ChainError::InvalidResponse(format!("bad quantity {raw}: {e}")))
}

/// Encodes a value as a minimal `0x`-prefixed hex quantity.
#[must_use]
pub fn format_quantity(value: u64) -> String {
    format!("{value:#x}")
}

/// The subset of an `eth_getBlockByNumber` block object the clock needs.
#[derive(Debug, Deserialize)]
struct RawBlock {
    number: String,
    timestamp: String,
}

/// Decodes an `eth_getBlockByNumber` result.
///
/// # Errors
///
/// Returns [`ChainError::InvalidResponse`] for a `null` block, a block
/// missing `number`/`timestamp`, or malformed quantities.
pub fn decode_block(result: Value) -> Result<BlockInfo, ChainError> {
    if result.is_null() {
        return Err(ChainError::InvalidResponse(
            "node returned no latest block".to_string(),
        ));
    }
    let raw: RawBlock = serde_json::from_value(result)
        .map_err(|e| ChainError::InvalidResponse(format!("malformed block: {e}")))?;
    Ok(BlockInfo::new(
        parse_quantity(&raw.number)?,
        Timestamp::from_secs(parse_quantity(&raw.timestamp)?),
    ))
}
