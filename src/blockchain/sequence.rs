//! SequenceChain (blockhash-style) client over JSON-RPC.

use alloy::primitives::U256;
use async_trait::async_trait;
use serde_json::{json, Value};

use crate::blockchain::client::{broadcast_hash, ChainClient};
use crate::blockchain::rpc::JsonRpcTransport;
use crate::blockchain::types::{
    Balance, BlockInfo, BlockNumber, ChainError, ChainId, ChainResult, SequenceNumber, TxStatus,
};
use crate::config::SequenceChainConfig;
use crate::crypto::encoding::{decode_base58, is_valid_sequence_address};

#[derive(Debug)]
pub struct SequenceChainClient {
    transport: JsonRpcTransport,
    config: SequenceChainConfig,
}

impl SequenceChainClient {
    pub fn new(config: SequenceChainConfig) -> ChainResult<Self> {
        let transport = JsonRpcTransport::new(
            ChainId::SequenceChain,
            &config.rpc_url,
            &config.failover_urls,
            config.rpc_timeout_secs,
        )?;
        Ok(Self { transport, config })
    }

    pub fn config(&self) -> &SequenceChainConfig {
        &self.config
    }

    fn ensure_address(&self, address: &str) -> ChainResult<()> {
        if is_valid_sequence_address(address) {
            Ok(())
        } else {
            Err(ChainError::InvalidRequest(format!(
                "invalid sequence address '{}'",
                address
            )))
        }
    }

    /// Signatures are 64 bytes, Base58 encoded.
    fn ensure_signature(&self, signature: &str) -> ChainResult<()> {
        match decode_base58(signature) {
            Ok(bytes) if bytes.len() == 64 => Ok(()),
            _ => Err(ChainError::InvalidRequest(format!(
                "invalid transaction signature '{}'",
                signature
            ))),
        }
    }

    fn commitment(&self) -> Value {
        json!({ "commitment": self.config.commitment })
    }

    async fn latest_blockhash(&self) -> ChainResult<String> {
        let result = self
            .transport
            .call("getLatestBlockhash", json!([self.commitment()]))
            .await?;
        result
            .pointer("/value/blockhash")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| ChainError::InvalidResponse("getLatestBlockhash without blockhash".into()))
    }
}

/// Sum `tokenAmount.amount` across parsed token accounts. Returns the
/// decimals reported by the first account, if any.
fn sum_token_accounts(result: &Value) -> ChainResult<(U256, Option<u8>)> {
    let accounts = result
        .get("value")
        .and_then(Value::as_array)
        .ok_or_else(|| ChainError::InvalidResponse("token accounts without value array".into()))?;

    let mut total = U256::ZERO;
    let mut decimals = None;
    for account in accounts {
        let token_amount = account
            .pointer("/account/data/parsed/info/tokenAmount")
            .ok_or_else(|| ChainError::InvalidResponse("token account without tokenAmount".into()))?;
        let amount = token_amount
            .get("amount")
            .and_then(Value::as_str)
            .ok_or_else(|| ChainError::InvalidResponse("tokenAmount without amount".into()))?;
        let amount = U256::from_str_radix(amount, 10)
            .map_err(|e| ChainError::InvalidResponse(format!("token amount '{}': {}", amount, e)))?;
        total = total.saturating_add(amount);

        if decimals.is_none() {
            decimals = token_amount
                .get("decimals")
                .and_then(Value::as_u64)
                .and_then(|d| u8::try_from(d).ok());
        }
    }
    Ok((total, decimals))
}

#[async_trait]
impl ChainClient for SequenceChainClient {
    fn chain(&self) -> ChainId {
        ChainId::SequenceChain
    }

    async fn get_balance(&self, address: &str) -> ChainResult<Balance> {
        self.ensure_address(address)?;
        let result = self
            .transport
            .call("getBalance", json!([address, self.commitment()]))
            .await?;
        let lamports = result
            .get("value")
            .and_then(Value::as_u64)
            .ok_or_else(|| ChainError::InvalidResponse(format!("getBalance: {}", result)))?;
        Ok(Balance::new(
            U256::from(lamports),
            ChainId::SequenceChain.native_decimals(),
        ))
    }

    async fn get_token_balance(&self, token: &str, address: &str) -> ChainResult<Balance> {
        self.ensure_address(token)?;
        self.ensure_address(address)?;
        let result = self
            .transport
            .call(
                "getTokenAccountsByOwner",
                json!([
                    address,
                    { "mint": token },
                    { "encoding": "jsonParsed", "commitment": self.config.commitment }
                ]),
            )
            .await?;
        let (raw, decimals) = sum_token_accounts(&result)?;
        Ok(Balance::new(raw, decimals.unwrap_or(self.config.token_decimals)))
    }

    async fn get_sequence_number(&self, address: &str) -> ChainResult<SequenceNumber> {
        self.ensure_address(address)?;
        Ok(SequenceNumber::RecentBlockhash(self.latest_blockhash().await?))
    }

    /// Flat per-signature fee; no network call.
    async fn estimate_fee(&self, from: &str, to: &str, _data: &[u8]) -> ChainResult<u64> {
        self.ensure_address(from)?;
        self.ensure_address(to)?;
        Ok(self.config.fee_lamports)
    }

    async fn broadcast(&self, signed_payload: &str) -> ChainResult<Option<String>> {
        let result = self
            .transport
            .call_once(
                "sendTransaction",
                json!([
                    signed_payload,
                    { "encoding": "base58", "preflightCommitment": self.config.commitment }
                ]),
            )
            .await?;
        broadcast_hash(result)
    }

    async fn get_status(&self, tx_hash: &str) -> ChainResult<TxStatus> {
        self.ensure_signature(tx_hash)?;
        let result = self
            .transport
            .call(
                "getSignatureStatuses",
                json!([[tx_hash], { "searchTransactionHistory": true }]),
            )
            .await?;
        let status = result.pointer("/value/0").unwrap_or(&Value::Null);
        if status.is_null() {
            return Ok(TxStatus::Pending);
        }
        if status.get("err").is_some_and(|err| !err.is_null()) {
            return Ok(TxStatus::Failed);
        }
        match status.get("confirmationStatus").and_then(Value::as_str) {
            Some("confirmed") | Some("finalized") => Ok(TxStatus::Confirmed),
            _ => Ok(TxStatus::Pending),
        }
    }

    async fn get_receipt(&self, tx_hash: &str) -> ChainResult<Value> {
        self.ensure_signature(tx_hash)?;
        let result = self
            .transport
            .call(
                "getTransaction",
                json!([
                    tx_hash,
                    {
                        "encoding": "json",
                        "commitment": self.config.commitment,
                        "maxSupportedTransactionVersion": 0
                    }
                ]),
            )
            .await?;
        if result.is_null() {
            return Err(ChainError::NotFound(format!("transaction {}", tx_hash)));
        }
        Ok(result)
    }

    /// Latest blockhash plus the current slot, kept verbatim.
    async fn get_latest_block(&self) -> ChainResult<BlockInfo> {
        let hash = self.latest_blockhash().await?;
        let slot = self
            .transport
            .call("getSlot", json!([self.commitment()]))
            .await?;
        Ok(BlockInfo {
            hash,
            number: BlockNumber::Raw(slot),
            timestamp: None,
        })
    }

    fn is_valid_address(&self, address: &str) -> bool {
        is_valid_sequence_address(address)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sum_token_accounts() {
        let result = json!({
            "context": { "slot": 1 },
            "value": [
                { "account": { "data": { "parsed": { "info": {
                    "tokenAmount": { "amount": "1500", "decimals": 6 }
                } } } } },
                { "account": { "data": { "parsed": { "info": {
                    "tokenAmount": { "amount": "500", "decimals": 6 }
                } } } } }
            ]
        });
        let (total, decimals) = sum_token_accounts(&result).unwrap();
        assert_eq!(total, U256::from(2000u64));
        assert_eq!(decimals, Some(6));
    }

    #[test]
    fn test_no_token_accounts_is_zero() {
        let (total, decimals) = sum_token_accounts(&json!({ "value": [] })).unwrap();
        assert_eq!(total, U256::ZERO);
        assert_eq!(decimals, None);
    }

    #[test]
    fn test_malformed_token_accounts() {
        assert!(sum_token_accounts(&json!({ "value": [{ "account": {} }] })).is_err());
        assert!(sum_token_accounts(&json!({})).is_err());
    }

    #[tokio::test]
    async fn test_fee_is_flat() {
        let client = SequenceChainClient::new(SequenceChainConfig::default()).unwrap();
        let fee = client
            .estimate_fee(
                "11111111111111111111111111111111",
                "TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA",
                &[],
            )
            .await
            .unwrap();
        assert_eq!(fee, 5_000);
    }
}
