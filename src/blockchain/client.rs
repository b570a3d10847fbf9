//! The uniform per-chain client interface.
//!
//! # Responsibilities
//! - Query chain state (balances, replay-protection value, latest block)
//! - Estimate fees
//! - Broadcast signed payloads
//! - Report transaction status and receipts

use async_trait::async_trait;
use serde_json::Value;

use crate::blockchain::types::{Balance, BlockInfo, ChainId, ChainResult, SequenceNumber, TxStatus};

/// One implementation per network family. Implementations are shared
/// across tasks behind `Arc<dyn ChainClient>`.
#[async_trait]
pub trait ChainClient: Send + Sync {
    fn chain(&self) -> ChainId;

    /// Native currency balance in base units.
    async fn get_balance(&self, address: &str) -> ChainResult<Balance>;

    /// Balance of `token` held by `address`.
    async fn get_token_balance(&self, token: &str, address: &str) -> ChainResult<Balance>;

    /// Nonce on the AccountChain, recent blockhash on the SequenceChain.
    async fn get_sequence_number(&self, address: &str) -> ChainResult<SequenceNumber>;

    /// Gas units on the AccountChain, lamports on the SequenceChain.
    async fn estimate_fee(&self, from: &str, to: &str, data: &[u8]) -> ChainResult<u64>;

    /// Submit a signed payload. `Ok(None)` means the node accepted the call
    /// but returned no hash.
    async fn broadcast(&self, signed_payload: &str) -> ChainResult<Option<String>>;

    async fn get_status(&self, tx_hash: &str) -> ChainResult<TxStatus>;

    /// Raw receipt / transaction record; `NotFound` while unknown to the node.
    async fn get_receipt(&self, tx_hash: &str) -> ChainResult<Value>;

    async fn get_latest_block(&self) -> ChainResult<BlockInfo>;

    fn is_valid_address(&self, address: &str) -> bool;
}

/// Normalise a broadcast result: `null` and blank strings carry no hash.
pub(crate) fn broadcast_hash(result: Value) -> ChainResult<Option<String>> {
    match result {
        Value::Null => Ok(None),
        Value::String(hash) if hash.trim().is_empty() => Ok(None),
        Value::String(hash) => Ok(Some(hash)),
        other => Err(crate::blockchain::types::ChainError::InvalidResponse(format!(
            "broadcast returned non-string result: {}",
            other
        ))),
    }
}
