//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the engine.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the transaction engine.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct EngineConfig {
    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// AccountChain (EVM-style) network.
    pub account_chain: AccountChainConfig,

    /// SequenceChain (blockhash-style) network.
    pub sequence_chain: SequenceChainConfig,

    /// Admin wallets and where their keys come from.
    pub admin: AdminConfig,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Default filter directive when `RUST_LOG` is unset.
    pub log_level: String,

    /// Emit logs as JSON lines.
    pub json_logs: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "multichain_tx=info".to_string(),
            json_logs: false,
        }
    }
}

/// AccountChain network settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AccountChainConfig {
    /// Register this chain with the orchestrator.
    pub enabled: bool,

    /// JSON-RPC endpoint URL.
    pub rpc_url: String,

    /// Failover JSON-RPC endpoint URLs, tried in order for reads.
    pub failover_urls: Vec<String>,

    /// EIP-155 chain id (11155111 for Sepolia).
    pub evm_chain_id: u64,

    /// RPC request timeout in seconds.
    pub rpc_timeout_secs: u64,

    /// Fixed gas price in wei.
    pub gas_price_wei: u64,

    /// Default gas limits per operation.
    pub gas_limits: GasLimits,

    /// Headroom added on top of `eth_estimateGas`, in percent.
    pub gas_estimate_margin_percent: u64,

    /// Decimals of the governance token.
    pub token_decimals: u8,

    /// Default token contract for mint/burn.
    pub token_contract: Option<String>,

    /// Governor contract for proposals and votes.
    pub governance_contract: Option<String>,

    /// Average block time, used to map voting timestamps to blocks.
    pub block_time_secs: u64,
}

impl Default for AccountChainConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            rpc_url: "http://localhost:8545".to_string(),
            failover_urls: Vec::new(),
            evm_chain_id: 11_155_111,
            rpc_timeout_secs: 10,
            gas_price_wei: 10_000_000_000,
            gas_limits: GasLimits::default(),
            gas_estimate_margin_percent: 20,
            token_decimals: 18,
            token_contract: None,
            governance_contract: None,
            block_time_secs: 12,
        }
    }
}

/// Gas limits used when no estimate is requested.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GasLimits {
    pub native_transfer: u64,
    pub token_transfer: u64,
    pub mint: u64,
    pub burn: u64,
    pub proposal: u64,
    pub vote: u64,
}

impl Default for GasLimits {
    fn default() -> Self {
        Self {
            native_transfer: 21_000,
            token_transfer: 300_000,
            mint: 150_000,
            burn: 150_000,
            proposal: 800_000,
            vote: 180_000,
        }
    }
}

/// SequenceChain network settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SequenceChainConfig {
    /// Register this chain with the orchestrator.
    pub enabled: bool,

    /// JSON-RPC endpoint URL.
    pub rpc_url: String,

    /// Failover JSON-RPC endpoint URLs, tried in order for reads.
    pub failover_urls: Vec<String>,

    /// RPC request timeout in seconds.
    pub rpc_timeout_secs: u64,

    /// Flat fee per signature in lamports.
    pub fee_lamports: u64,

    /// Decimals of the governance token mint.
    pub token_decimals: u8,

    /// Commitment level for reads (`processed`, `confirmed`, `finalized`).
    pub commitment: String,

    pub system_program: String,
    pub token_program: String,

    /// Governance program; proposals and votes are rejected without it.
    pub governance_program: Option<String>,

    /// Default token mint for mint/burn.
    pub token_mint: Option<String>,
}

impl Default for SequenceChainConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            rpc_url: "http://localhost:8899".to_string(),
            failover_urls: Vec::new(),
            rpc_timeout_secs: 10,
            fee_lamports: 5_000,
            token_decimals: 9,
            commitment: "confirmed".to_string(),
            system_program: "11111111111111111111111111111111".to_string(),
            token_program: "TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA".to_string(),
            governance_program: None,
            token_mint: None,
        }
    }
}

/// Admin wallet configuration.
///
/// Admin senders get their nonces from the shared nonce cache instead of a
/// fresh chain query per transaction. Keys are read from the named
/// environment variables at signing time.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AdminConfig {
    pub account_address: Option<String>,
    pub sequence_address: Option<String>,
    pub account_key_env: String,
    pub sequence_key_env: String,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            account_address: None,
            sequence_address: None,
            account_key_env: "MULTICHAIN_TX_ACCOUNT_ADMIN_KEY".to_string(),
            sequence_key_env: "MULTICHAIN_TX_SEQUENCE_ADMIN_KEY".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert!(!config.account_chain.enabled);
        assert!(!config.sequence_chain.enabled);
        assert_eq!(config.account_chain.evm_chain_id, 11_155_111);
        assert_eq!(config.account_chain.gas_price_wei, 10_000_000_000);
        assert_eq!(config.account_chain.gas_limits.token_transfer, 300_000);
        assert_eq!(config.sequence_chain.fee_lamports, 5_000);
        assert_eq!(config.sequence_chain.token_decimals, 9);
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: EngineConfig = toml::from_str(
            r#"
            [account_chain]
            enabled = true
            rpc_url = "https://rpc.sepolia.org"

            [account_chain.gas_limits]
            vote = 200000

            [admin]
            account_address = "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266"
            "#,
        )
        .unwrap();

        assert!(config.account_chain.enabled);
        assert_eq!(config.account_chain.gas_limits.vote, 200_000);
        assert_eq!(config.account_chain.gas_limits.proposal, 800_000);
        assert_eq!(config.account_chain.rpc_timeout_secs, 10);
        assert_eq!(config.admin.account_key_env, "MULTICHAIN_TX_ACCOUNT_ADMIN_KEY");
        assert!(!config.sequence_chain.enabled);
    }
}
