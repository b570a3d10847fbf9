//! Scriptable in-memory [`ChainClient`] with call counting.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use alloy::primitives::U256;
use async_trait::async_trait;
use serde_json::{json, Value};

use crate::blockchain::client::ChainClient;
use crate::blockchain::types::{
    Balance, BlockInfo, BlockNumber, ChainError, ChainId, ChainResult, SequenceNumber, TxStatus,
};
use crate::crypto::encoding::{is_valid_account_address, is_valid_sequence_address};

struct MockState {
    sequence: ChainResult<SequenceNumber>,
    sequence_delay: Duration,
    broadcast: ChainResult<Option<String>>,
    status: TxStatus,
    balance: U256,
    fee: u64,
    latest_block: BlockInfo,
    calls: HashMap<&'static str, usize>,
    broadcasts: Vec<String>,
}

/// Client whose every answer is configured up front.
pub struct MockChainClient {
    chain: ChainId,
    state: Mutex<MockState>,
}

impl MockChainClient {
    pub fn new(chain: ChainId) -> Self {
        let sequence = match chain {
            ChainId::AccountChain => SequenceNumber::Nonce(0),
            ChainId::SequenceChain => {
                SequenceNumber::RecentBlockhash("11111111111111111111111111111111".to_string())
            }
        };
        Self {
            chain,
            state: Mutex::new(MockState {
                sequence: Ok(sequence),
                sequence_delay: Duration::ZERO,
                broadcast: Ok(None),
                status: TxStatus::Pending,
                balance: U256::ZERO,
                fee: 21_000,
                latest_block: BlockInfo {
                    hash: "0x00".to_string(),
                    number: BlockNumber::Height(0),
                    timestamp: Some(0),
                },
                calls: HashMap::new(),
                broadcasts: Vec::new(),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn record(&self, method: &'static str) -> MutexGuard<'_, MockState> {
        let mut state = self.lock();
        *state.calls.entry(method).or_default() += 1;
        state
    }

    pub fn with_nonce(self, nonce: u64) -> Self {
        self.set_nonce(nonce);
        self
    }

    pub fn with_blockhash(self, blockhash: impl Into<String>) -> Self {
        self.lock().sequence = Ok(SequenceNumber::RecentBlockhash(blockhash.into()));
        self
    }

    pub fn with_sequence_error(self, error: ChainError) -> Self {
        self.lock().sequence = Err(error);
        self
    }

    /// Delay every `get_sequence_number` reply.
    pub fn with_sequence_delay(self, delay: Duration) -> Self {
        self.lock().sequence_delay = delay;
        self
    }

    pub fn with_broadcast_hash(self, hash: impl Into<String>) -> Self {
        self.lock().broadcast = Ok(Some(hash.into()));
        self
    }

    pub fn with_broadcast_result(self, result: ChainResult<Option<String>>) -> Self {
        self.lock().broadcast = result;
        self
    }

    pub fn with_status(self, status: TxStatus) -> Self {
        self.lock().status = status;
        self
    }

    pub fn with_balance(self, balance: U256) -> Self {
        self.lock().balance = balance;
        self
    }

    pub fn with_fee(self, fee: u64) -> Self {
        self.lock().fee = fee;
        self
    }

    pub fn with_latest_block(self, block: BlockInfo) -> Self {
        self.lock().latest_block = block;
        self
    }

    /// Change the on-chain nonce after construction.
    pub fn set_nonce(&self, nonce: u64) {
        self.lock().sequence = Ok(SequenceNumber::Nonce(nonce));
    }

    pub fn call_count(&self, method: &str) -> usize {
        self.lock().calls.get(method).copied().unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        self.lock().calls.values().sum()
    }

    /// Payloads passed to `broadcast`, in order.
    pub fn broadcasts(&self) -> Vec<String> {
        self.lock().broadcasts.clone()
    }
}

#[async_trait]
impl ChainClient for MockChainClient {
    fn chain(&self) -> ChainId {
        self.chain
    }

    async fn get_balance(&self, _address: &str) -> ChainResult<Balance> {
        let state = self.record("get_balance");
        Ok(Balance::new(state.balance, self.chain.native_decimals()))
    }

    async fn get_token_balance(&self, _token: &str, _address: &str) -> ChainResult<Balance> {
        let state = self.record("get_token_balance");
        Ok(Balance::new(state.balance, self.chain.native_decimals()))
    }

    async fn get_sequence_number(&self, _address: &str) -> ChainResult<SequenceNumber> {
        let delay = self.record("get_sequence_number").sequence_delay;
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        self.lock().sequence.clone()
    }

    async fn estimate_fee(&self, _from: &str, _to: &str, _data: &[u8]) -> ChainResult<u64> {
        Ok(self.record("estimate_fee").fee)
    }

    async fn broadcast(&self, signed_payload: &str) -> ChainResult<Option<String>> {
        let mut state = self.record("broadcast");
        state.broadcasts.push(signed_payload.to_string());
        state.broadcast.clone()
    }

    async fn get_status(&self, _tx_hash: &str) -> ChainResult<TxStatus> {
        Ok(self.record("get_status").status)
    }

    async fn get_receipt(&self, tx_hash: &str) -> ChainResult<Value> {
        let state = self.record("get_receipt");
        match state.status {
            TxStatus::Pending => Err(ChainError::NotFound(format!("receipt for {}", tx_hash))),
            TxStatus::Confirmed => Ok(json!({ "transactionHash": tx_hash, "status": "0x1" })),
            TxStatus::Failed => Ok(json!({ "transactionHash": tx_hash, "status": "0x0" })),
        }
    }

    async fn get_latest_block(&self) -> ChainResult<BlockInfo> {
        Ok(self.record("get_latest_block").latest_block.clone())
    }

    fn is_valid_address(&self, address: &str) -> bool {
        match self.chain {
            ChainId::AccountChain => is_valid_account_address(address),
            ChainId::SequenceChain => is_valid_sequence_address(address),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_counts_calls() {
        let mock = MockChainClient::new(ChainId::AccountChain)
            .with_nonce(5)
            .with_broadcast_hash("0xabc");

        assert_eq!(
            mock.get_sequence_number("a").await.unwrap(),
            SequenceNumber::Nonce(5)
        );
        assert_eq!(mock.broadcast("0xf86c").await.unwrap(), Some("0xabc".into()));
        assert_eq!(mock.call_count("get_sequence_number"), 1);
        assert_eq!(mock.call_count("broadcast"), 1);
        assert_eq!(mock.total_calls(), 2);
        assert_eq!(mock.broadcasts(), vec!["0xf86c".to_string()]);
    }

    #[tokio::test]
    async fn test_scripted_errors() {
        let mock = MockChainClient::new(ChainId::SequenceChain)
            .with_sequence_error(ChainError::Timeout(3));
        assert_eq!(
            mock.get_sequence_number("a").await,
            Err(ChainError::Timeout(3))
        );
    }
}
