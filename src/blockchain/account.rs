//! AccountChain (EVM-style) client over JSON-RPC.

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::blockchain::client::{broadcast_hash, ChainClient};
use crate::blockchain::rpc::{parse_hex_u256, parse_hex_u64, JsonRpcTransport};
use crate::blockchain::types::{
    Balance, BlockInfo, BlockNumber, ChainError, ChainId, ChainResult, SequenceNumber, TxStatus,
};
use crate::config::AccountChainConfig;
use crate::crypto::encoding::{encode_hex, is_valid_account_address, parse_account_address};
use crate::crypto::hash::function_selector;

/// `eth_*` client with failover for reads.
#[derive(Debug)]
pub struct AccountChainClient {
    transport: JsonRpcTransport,
    config: AccountChainConfig,
}

impl AccountChainClient {
    pub fn new(config: AccountChainConfig) -> ChainResult<Self> {
        let transport = JsonRpcTransport::new(
            ChainId::AccountChain,
            &config.rpc_url,
            &config.failover_urls,
            config.rpc_timeout_secs,
        )?;
        Ok(Self { transport, config })
    }

    pub fn config(&self) -> &AccountChainConfig {
        &self.config
    }

    /// Verify the node serves the configured EIP-155 chain id.
    pub async fn verify_chain_id(&self) -> ChainResult<()> {
        let result = self.transport.call("eth_chainId", json!([])).await?;
        let actual = parse_hex_u64(&result, "chain id")?;
        if actual != self.config.evm_chain_id {
            return Err(ChainError::InvalidResponse(format!(
                "chain id mismatch: expected {}, got {}",
                self.config.evm_chain_id, actual
            )));
        }
        Ok(())
    }

    fn ensure_address(&self, address: &str) -> ChainResult<()> {
        if is_valid_account_address(address) {
            Ok(())
        } else {
            Err(ChainError::InvalidRequest(format!(
                "invalid account address '{}'",
                address
            )))
        }
    }

    fn ensure_tx_hash(&self, tx_hash: &str) -> ChainResult<()> {
        let valid = tx_hash
            .strip_prefix("0x")
            .is_some_and(|h| h.len() == 64 && h.chars().all(|c| c.is_ascii_hexdigit()));
        if valid {
            Ok(())
        } else {
            Err(ChainError::InvalidRequest(format!(
                "invalid transaction hash '{}'",
                tx_hash
            )))
        }
    }

    async fn receipt(&self, tx_hash: &str) -> ChainResult<Value> {
        self.ensure_tx_hash(tx_hash)?;
        self.transport
            .call("eth_getTransactionReceipt", json!([tx_hash]))
            .await
    }
}

/// `balanceOf(address)` call data.
fn balance_of_calldata(owner: &str) -> ChainResult<String> {
    let owner = parse_account_address(owner)
        .ok_or_else(|| ChainError::InvalidRequest(format!("invalid account address '{}'", owner)))?;
    let mut data = Vec::with_capacity(36);
    data.extend_from_slice(&function_selector("balanceOf(address)"));
    data.extend_from_slice(owner.into_word().as_slice());
    Ok(encode_hex(data))
}

#[async_trait]
impl ChainClient for AccountChainClient {
    fn chain(&self) -> ChainId {
        ChainId::AccountChain
    }

    async fn get_balance(&self, address: &str) -> ChainResult<Balance> {
        self.ensure_address(address)?;
        let result = self
            .transport
            .call("eth_getBalance", json!([address, "latest"]))
            .await?;
        let raw = parse_hex_u256(&result, "balance")?;
        Ok(Balance::new(raw, ChainId::AccountChain.native_decimals()))
    }

    async fn get_token_balance(&self, token: &str, address: &str) -> ChainResult<Balance> {
        self.ensure_address(token)?;
        let data = balance_of_calldata(address)?;
        let result = self
            .transport
            .call("eth_call", json!([{ "to": token, "data": data }, "latest"]))
            .await?;
        let raw = parse_hex_u256(&result, "token balance")?;
        Ok(Balance::new(raw, self.config.token_decimals))
    }

    async fn get_sequence_number(&self, address: &str) -> ChainResult<SequenceNumber> {
        self.ensure_address(address)?;
        let result = self
            .transport
            .call("eth_getTransactionCount", json!([address, "pending"]))
            .await?;
        Ok(SequenceNumber::Nonce(parse_hex_u64(&result, "nonce")?))
    }

    async fn estimate_fee(&self, from: &str, to: &str, data: &[u8]) -> ChainResult<u64> {
        self.ensure_address(from)?;
        self.ensure_address(to)?;
        let result = self
            .transport
            .call(
                "eth_estimateGas",
                json!([{ "from": from, "to": to, "data": encode_hex(data) }]),
            )
            .await?;
        parse_hex_u64(&result, "gas estimate")
    }

    async fn broadcast(&self, signed_payload: &str) -> ChainResult<Option<String>> {
        let result = self
            .transport
            .call_once("eth_sendRawTransaction", json!([signed_payload]))
            .await?;
        broadcast_hash(result)
    }

    async fn get_status(&self, tx_hash: &str) -> ChainResult<TxStatus> {
        let receipt = self.receipt(tx_hash).await?;
        if receipt.is_null() {
            return Ok(TxStatus::Pending);
        }
        match receipt.get("status").and_then(Value::as_str) {
            Some("0x1") => Ok(TxStatus::Confirmed),
            Some("0x0") => Ok(TxStatus::Failed),
            // pre-Byzantium receipts carry a state root instead of a status
            None => Ok(TxStatus::Confirmed),
            Some(other) => Err(ChainError::InvalidResponse(format!(
                "unexpected receipt status '{}'",
                other
            ))),
        }
    }

    async fn get_receipt(&self, tx_hash: &str) -> ChainResult<Value> {
        let receipt = self.receipt(tx_hash).await?;
        if receipt.is_null() {
            return Err(ChainError::NotFound(format!("receipt for {}", tx_hash)));
        }
        Ok(receipt)
    }

    async fn get_latest_block(&self) -> ChainResult<BlockInfo> {
        let block = self
            .transport
            .call("eth_getBlockByNumber", json!(["latest", false]))
            .await?;
        if block.is_null() {
            return Err(ChainError::NotFound("latest block".to_string()));
        }

        let hash = block
            .get("hash")
            .and_then(Value::as_str)
            .ok_or_else(|| ChainError::InvalidResponse("block without hash".to_string()))?
            .to_string();
        let number = parse_hex_u64(block.get("number").unwrap_or(&Value::Null), "block number")?;
        let timestamp = block
            .get("timestamp")
            .map(|ts| parse_hex_u64(ts, "block timestamp"))
            .transpose()?;

        Ok(BlockInfo {
            hash,
            number: BlockNumber::Height(number),
            timestamp,
        })
    }

    fn is_valid_address(&self, address: &str) -> bool {
        is_valid_account_address(address)
    }
}
