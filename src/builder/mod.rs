//! Unsigned transaction builders.
//!
//! # Data Flow
//! ```text
//! TransactionRequest
//!     → validate (addresses, amount, payload)    no network
//!     → encode call / instruction data            no network
//!     → chain reads (latest block, fee estimate)  ChainClient
//!     → replay protection (nonce or blockhash)    NonceAllocator | ChainClient
//!     → UnsignedTransactionBody
//! ```
//!
//! # Design Decisions
//! - Every validation error is raised before the first network call
//! - Admin nonces are allocated last so a failing chain read does not burn one
//! - Builders never mutate the request

pub mod abi;
pub mod account;
pub mod instruction;
pub mod sequence;

use async_trait::async_trait;

use crate::blockchain::types::ChainId;
use crate::error::{EngineResult, ValidationError};
use crate::transaction::{TransactionRequest, UnsignedTransactionBody};

pub use account::AccountTxBuilder;
pub use sequence::SequenceTxBuilder;

/// Turns a request into a chain-specific unsigned body.
#[async_trait]
pub trait TransactionBuilder: Send + Sync {
    fn chain(&self) -> ChainId;

    async fn build(&self, request: &TransactionRequest) -> EngineResult<UnsignedTransactionBody>;
}

/// Reject requests addressed to another chain.
pub(crate) fn ensure_chain(request: &TransactionRequest, builder: ChainId) -> Result<(), ValidationError> {
    if request.chain == builder {
        Ok(())
    } else {
        Err(ValidationError::WrongChain {
            request: request.chain,
            builder,
        })
    }
}
