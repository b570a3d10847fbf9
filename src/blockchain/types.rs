//! Chain-specific types and error definitions.

use std::fmt;
use std::str::FromStr;

use alloy::primitives::U256;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::transaction::amount::format_units;

/// Supported network families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChainId {
    /// Account-model chain with counter nonces and secp256k1 keys.
    AccountChain,
    /// Sequence-model chain with recent-blockhash replay protection and Ed25519 keys.
    SequenceChain,
}

impl ChainId {
    pub const ALL: [ChainId; 2] = [ChainId::AccountChain, ChainId::SequenceChain];

    pub fn as_str(&self) -> &'static str {
        match self {
            ChainId::AccountChain => "account_chain",
            ChainId::SequenceChain => "sequence_chain",
        }
    }

    /// Decimals of the chain's native currency.
    pub fn native_decimals(&self) -> u8 {
        match self {
            ChainId::AccountChain => 18,
            ChainId::SequenceChain => 9,
        }
    }
}

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChainId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "account_chain" | "account" => Ok(ChainId::AccountChain),
            "sequence_chain" | "sequence" => Ok(ChainId::SequenceChain),
            other => Err(format!(
                "unknown chain '{}', expected account_chain or sequence_chain",
                other
            )),
        }
    }
}

/// Errors that can occur while talking to a chain node.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChainError {
    /// Transport failure (connection refused, HTTP error status).
    #[error("Network error: {0}")]
    Network(String),

    /// The node answered with a JSON-RPC error object.
    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    /// The requested object does not exist (yet).
    #[error("Not found: {0}")]
    NotFound(String),

    /// The node answered with something that cannot be interpreted.
    #[error("Invalid RPC response: {0}")]
    InvalidResponse(String),

    /// Query arguments rejected before hitting the network.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// RPC request timed out.
    #[error("RPC timeout after {0} seconds")]
    Timeout(u64),
}

/// Result type for chain client operations.
pub type ChainResult<T> = Result<T, ChainError>;

/// Integer base units plus the decimals needed to render them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Balance {
    pub raw: U256,
    pub decimals: u8,
}

impl Balance {
    pub fn new(raw: U256, decimals: u8) -> Self {
        Self { raw, decimals }
    }

    /// Human-readable decimal rendering, e.g. `1.5` for 1500000000 at 9 decimals.
    pub fn to_decimal_string(&self) -> String {
        format_units(self.raw, self.decimals)
    }
}

impl fmt::Display for Balance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_decimal_string())
    }
}

/// Replay-protection value returned by a chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SequenceNumber {
    /// Per-account transaction counter (AccountChain).
    Nonce(u64),
    /// Recent blockhash, base58 (SequenceChain).
    RecentBlockhash(String),
}

impl SequenceNumber {
    pub fn as_nonce(&self) -> Option<u64> {
        match self {
            SequenceNumber::Nonce(n) => Some(*n),
            SequenceNumber::RecentBlockhash(_) => None,
        }
    }

    pub fn as_blockhash(&self) -> Option<&str> {
        match self {
            SequenceNumber::Nonce(_) => None,
            SequenceNumber::RecentBlockhash(hash) => Some(hash),
        }
    }
}

/// On-chain status of a broadcast transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TxStatus {
    /// Not yet included (or unknown to the node).
    Pending,
    /// Included and successful.
    Confirmed,
    /// Included and reverted / errored.
    Failed,
}

/// Block height as reported by the node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BlockNumber {
    Height(u64),
    /// Unparsed node response, kept verbatim.
    Raw(serde_json::Value),
}

impl BlockNumber {
    pub fn height(&self) -> Option<u64> {
        match self {
            BlockNumber::Height(h) => Some(*h),
            BlockNumber::Raw(value) => value.as_u64(),
        }
    }
}

/// Latest block summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockInfo {
    pub hash: String,
    pub number: BlockNumber,
    /// Unix seconds; not every chain reports it with the block.
    pub timestamp: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chain_id_parse_and_display() {
        assert_eq!("account_chain".parse::<ChainId>(), Ok(ChainId::AccountChain));
        assert_eq!("Sequence".parse::<ChainId>(), Ok(ChainId::SequenceChain));
        assert!("bitcoin".parse::<ChainId>().is_err());
        assert_eq!(ChainId::SequenceChain.to_string(), "sequence_chain");
    }

    #[test]
    fn test_chain_id_serde() {
        let json = serde_json::to_string(&ChainId::AccountChain).unwrap();
        assert_eq!(json, "\"account_chain\"");
        let back: ChainId = serde_json::from_str("\"sequence_chain\"").unwrap();
        assert_eq!(back, ChainId::SequenceChain);
    }

    #[test]
    fn test_balance_rendering() {
        let balance = Balance::new(U256::from(1_500_000_000u64), 9);
        assert_eq!(balance.to_decimal_string(), "1.5");

        let balance = Balance::new(U256::ZERO, 18);
        assert_eq!(balance.to_string(), "0");
    }

    #[test]
    fn test_sequence_number_accessors() {
        assert_eq!(SequenceNumber::Nonce(7).as_nonce(), Some(7));
        assert_eq!(SequenceNumber::Nonce(7).as_blockhash(), None);
        let hash = SequenceNumber::RecentBlockhash("abc".into());
        assert_eq!(hash.as_blockhash(), Some("abc"));
        assert_eq!(hash.as_nonce(), None);
    }

    #[test]
    fn test_block_number_height() {
        assert_eq!(BlockNumber::Height(12).height(), Some(12));
        assert_eq!(BlockNumber::Raw(serde_json::json!(99)).height(), Some(99));
        assert_eq!(BlockNumber::Raw(serde_json::json!("x")).height(), None);
    }

    #[test]
    fn test_error_display() {
        let err = ChainError::Rpc {
            code: -32000,
            message: "nonce too low".into(),
        };
        assert_eq!(err.to_string(), "RPC error -32000: nonce too low");
    }
}
