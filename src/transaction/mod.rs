//! Transaction data model.
//!
//! # Data Flow
//! ```text
//! TransactionRequest (caller)
//!     → builder   → UnsignedTransactionBody
//!     → signer    → SignedTransaction (Signed)
//!     → broadcast → SignedTransaction (Pending | Failed)
//!     → TransactionResult (caller)
//! ```

pub mod amount;
pub mod body;
pub mod request;
pub mod result;
pub mod signed;

pub use amount::TokenAmount;
pub use body::{AccountTxBody, SequenceTxBody, UnsignedTransactionBody};
pub use request::{
    Payload, ProposalPayload, TransactionRequest, TransactionType, TransferPayload, VoteChoice,
    VotePayload,
};
pub use result::{TransactionResult, NO_HASH_RETURNED};
pub use signed::{SignatureMaterial, SignedTransaction, TransactionStatus};
