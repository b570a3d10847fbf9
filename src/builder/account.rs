//! AccountChain builder: legacy transactions with ABI-encoded call data.

use std::sync::Arc;

use alloy::primitives::{Address, Bytes, U256};
use async_trait::async_trait;

use crate::blockchain::client::ChainClient;
use crate::blockchain::types::{ChainError, ChainId};
use crate::builder::{abi, ensure_chain, TransactionBuilder};
use crate::config::AccountChainConfig;
use crate::crypto::encoding::parse_account_address;
use crate::error::{EngineResult, ValidationError};
use crate::nonce::NonceAllocator;
use crate::transaction::{
    AccountTxBody, ProposalPayload, TransactionRequest, TransactionType, UnsignedTransactionBody,
};

/// Gas charged per byte of memo data on plain transfers.
const GAS_PER_DATA_BYTE: u64 = 16;

/// Target, value, data and default gas limit of one call.
struct Call {
    to: Address,
    value: U256,
    data: Bytes,
    gas_limit: u64,
}

enum Plan<'a> {
    Ready(Call),
    /// Needs the latest block before the voting window can be encoded.
    Proposal {
        contract: Address,
        proposal: &'a ProposalPayload,
    },
}

pub struct AccountTxBuilder {
    client: Arc<dyn ChainClient>,
    nonces: Arc<dyn NonceAllocator>,
    config: AccountChainConfig,
    admin_address: Option<String>,
}

impl AccountTxBuilder {
    pub fn new(
        client: Arc<dyn ChainClient>,
        nonces: Arc<dyn NonceAllocator>,
        config: AccountChainConfig,
        admin_address: Option<String>,
    ) -> Self {
        Self {
            client,
            nonces,
            config,
            admin_address,
        }
    }

    fn is_admin(&self, address: &str) -> bool {
        self.admin_address
            .as_deref()
            .is_some_and(|admin| admin.eq_ignore_ascii_case(address))
    }

    fn address(&self, field: &'static str, value: &str) -> Result<Address, ValidationError> {
        parse_account_address(value).ok_or_else(|| ValidationError::InvalidAddress {
            chain: ChainId::AccountChain,
            field,
            value: value.to_string(),
        })
    }

    fn token_contract(&self, request: &TransactionRequest) -> Result<Address, ValidationError> {
        match request.token.as_deref().or(self.config.token_contract.as_deref()) {
            Some(token) => self.address("token", token),
            None => Err(ValidationError::NotConfigured("token contract")),
        }
    }

    fn governance_contract(&self) -> Result<Address, ValidationError> {
        match self.config.governance_contract.as_deref() {
            Some(contract) => self.address("governance_contract", contract),
            None => Err(ValidationError::NotConfigured("governance contract")),
        }
    }

    /// Everything that can be decided without the network.
    fn plan<'a>(&self, request: &'a TransactionRequest) -> Result<Plan<'a>, ValidationError> {
        let limits = &self.config.gas_limits;
        match request.tx_type {
            TransactionType::Transfer => {
                let to = self.address("to", request.require_to()?)?;
                let amount = request.require_amount()?;
                match request.token.as_deref() {
                    Some(token) => {
                        let token = self.address("token", token)?;
                        let units = amount.to_base_units(self.config.token_decimals)?;
                        Ok(Plan::Ready(Call {
                            to: token,
                            value: U256::ZERO,
                            data: abi::encode_transfer(to, units),
                            gas_limit: limits.token_transfer,
                        }))
                    }
                    None => {
                        let value = amount.to_base_units(ChainId::AccountChain.native_decimals())?;
                        let data = request
                            .memo()
                            .map(|memo| Bytes::copy_from_slice(memo.as_bytes()))
                            .unwrap_or_default();
                        let gas_limit = limits
                            .native_transfer
                            .saturating_add(GAS_PER_DATA_BYTE.saturating_mul(data.len() as u64));
                        Ok(Plan::Ready(Call {
                            to,
                            value,
                            data,
                            gas_limit,
                        }))
                    }
                }
            }
            TransactionType::Mint => {
                let to = self.address("to", request.require_to()?)?;
                let units = request.require_amount()?.to_base_units(self.config.token_decimals)?;
                Ok(Plan::Ready(Call {
                    to: self.token_contract(request)?,
                    value: U256::ZERO,
                    data: abi::encode_mint(to, units),
                    gas_limit: limits.mint,
                }))
            }
            TransactionType::Burn => {
                let units = request.require_amount()?.to_base_units(self.config.token_decimals)?;
                Ok(Plan::Ready(Call {
                    to: self.token_contract(request)?,
                    value: U256::ZERO,
                    data: abi::encode_burn(units),
                    gas_limit: limits.burn,
                }))
            }
            TransactionType::ProposalCreate => {
                let proposal = request.require_proposal()?;
                Ok(Plan::Proposal {
                    contract: self.governance_contract()?,
                    proposal,
                })
            }
            TransactionType::Vote => {
                let vote = request.require_vote()?;
                Ok(Plan::Ready(Call {
                    to: self.governance_contract()?,
                    value: U256::ZERO,
                    data: abi::encode_vote(vote.proposal_id, vote.choice, vote.reason.as_deref()),
                    gas_limit: limits.vote,
                }))
            }
        }
    }

    async fn proposal_call(&self, contract: Address, proposal: &ProposalPayload) -> EngineResult<Call> {
        let latest = self.client.get_latest_block().await?;
        let number = latest.number.height().ok_or_else(|| {
            ChainError::InvalidResponse("latest block has no numeric height".to_string())
        })?;
        let timestamp = latest
            .timestamp
            .ok_or_else(|| ChainError::InvalidResponse("latest block has no timestamp".to_string()))?;

        let block_time = self.config.block_time_secs;
        let start = block_at(proposal.voting_start, number, timestamp, block_time);
        let end = block_at(proposal.voting_end, number, timestamp, block_time).max(start.saturating_add(1));
        tracing::debug!(start_block = start, end_block = end, latest = number, "Mapped voting window to blocks");

        Ok(Call {
            to: contract,
            value: U256::ZERO,
            data: abi::encode_propose(&proposal.title, &proposal.description, start, end),
            gas_limit: self.config.gas_limits.proposal,
        })
    }

    async fn resolve_nonce(&self, request: &TransactionRequest) -> EngineResult<u64> {
        if let Some(nonce) = request.nonce {
            return Ok(nonce);
        }
        if self.is_admin(&request.from) {
            return self.nonces.allocate_next(&request.from, ChainId::AccountChain).await;
        }
        let sequence = self.client.get_sequence_number(&request.from).await?;
        Ok(sequence.as_nonce().ok_or_else(|| {
            ChainError::InvalidResponse("expected a nonce from the AccountChain".to_string())
        })?)
    }
}

/// Block expected at unix time `target`, never earlier than the latest block.
pub fn block_at(target: u64, latest_number: u64, latest_timestamp: u64, block_time_secs: u64) -> u64 {
    if target <= latest_timestamp || block_time_secs == 0 {
        return latest_number;
    }
    latest_number.saturating_add((target - latest_timestamp) / block_time_secs)
}

#[async_trait]
impl TransactionBuilder for AccountTxBuilder {
    fn chain(&self) -> ChainId {
        ChainId::AccountChain
    }

    async fn build(&self, request: &TransactionRequest) -> EngineResult<UnsignedTransactionBody> {
        ensure_chain(request, ChainId::AccountChain)?;
        let from = self.address("from", &request.from)?;

        let mut call = match self.plan(request)? {
            Plan::Ready(call) => call,
            Plan::Proposal { contract, proposal } => self.proposal_call(contract, proposal).await?,
        };

        if request.estimate_fee {
            let estimate = self
                .client
                .estimate_fee(&request.from, &call.to.to_checksum(None), &call.data)
                .await?;
            let margin = 100 + self.config.gas_estimate_margin_percent;
            call.gas_limit = estimate.saturating_mul(margin) / 100;
        }

        let nonce = self.resolve_nonce(request).await?;
        tracing::debug!(
            tx_type = %request.tx_type,
            nonce,
            gas_limit = call.gas_limit,
            to = %call.to,
            "Built AccountChain transaction"
        );

        Ok(UnsignedTransactionBody::Account(AccountTxBody {
            from,
            nonce,
            gas_price: u128::from(self.config.gas_price_wei),
            gas_limit: call.gas_limit,
            to: call.to,
            value: call.value,
            data: call.data,
        }))
    }
}
