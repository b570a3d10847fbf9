//! Unsigned, chain-specific transaction bodies produced by the builders.

use alloy::primitives::{Address, Bytes, U256};
use serde::{Deserialize, Serialize};

use crate::blockchain::types::ChainId;

/// Legacy EIP-155 transaction fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountTxBody {
    /// Sender whose nonce sequence `nonce` was taken from.
    pub from: Address,
    pub nonce: u64,
    /// Wei per gas unit.
    pub gas_price: u128,
    pub gas_limit: u64,
    /// Recipient, or the contract being called.
    pub to: Address,
    /// Native value in wei.
    pub value: U256,
    /// ABI-encoded call data; empty for plain transfers.
    pub data: Bytes,
}

/// Single-instruction SequenceChain transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequenceTxBody {
    /// Base58 blockhash that bounds the transaction's validity window.
    pub recent_blockhash: String,
    /// Fee in lamports. Informational: the network charges per signature.
    pub fee: u64,
    pub program_id: String,
    /// Fee payer and sole signer.
    pub from: String,
    pub to: Option<String>,
    pub token: Option<String>,
    /// Amount in base units.
    pub amount: u64,
    /// Instruction data.
    pub data: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "chain", rename_all = "snake_case")]
pub enum UnsignedTransactionBody {
    Account(AccountTxBody),
    Sequence(SequenceTxBody),
}

impl UnsignedTransactionBody {
    pub fn chain(&self) -> ChainId {
        match self {
            UnsignedTransactionBody::Account(_) => ChainId::AccountChain,
            UnsignedTransactionBody::Sequence(_) => ChainId::SequenceChain,
        }
    }

    /// Call data or instruction data.
    pub fn data(&self) -> &[u8] {
        match self {
            UnsignedTransactionBody::Account(body) => &body.data,
            UnsignedTransactionBody::Sequence(body) => &body.data,
        }
    }

    pub fn as_account(&self) -> Option<&AccountTxBody> {
        match self {
            UnsignedTransactionBody::Account(body) => Some(body),
            UnsignedTransactionBody::Sequence(_) => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&SequenceTxBody> {
        match self {
            UnsignedTransactionBody::Account(_) => None,
            UnsignedTransactionBody::Sequence(body) => Some(body),
        }
    }
}
