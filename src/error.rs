//! Error taxonomy for the transaction engine.
//!
//! Network failures live next to the clients in [`crate::blockchain::types`];
//! this module holds the validation, signing and umbrella engine errors that the
//! orchestrator folds into a [`crate::transaction::TransactionResult`].

use thiserror::Error;

use crate::blockchain::types::{ChainError, ChainId};
use crate::transaction::{TransactionStatus, TransactionType};

/// Malformed input, always raised before any network call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Address does not match the chain's format.
    #[error("Invalid {chain} address for '{field}': '{value}'")]
    InvalidAddress {
        chain: ChainId,
        field: &'static str,
        value: String,
    },

    /// Amount is not a non-negative decimal or does not fit the target unit.
    #[error("Invalid amount '{value}': {reason}")]
    InvalidAmount { value: String, reason: String },

    /// A field required by the transaction type is absent.
    #[error("{tx_type} requires '{field}'")]
    MissingField {
        tx_type: TransactionType,
        field: &'static str,
    },

    /// The payload variant does not belong to the transaction type.
    #[error("Payload does not match a {0} request")]
    PayloadMismatch(TransactionType),

    /// Request was routed to a builder of another chain.
    #[error("Request for {request} cannot be built by the {builder} builder")]
    WrongChain { request: ChainId, builder: ChainId },

    /// The chain has no counter-style nonce.
    #[error("Nonce allocation does not apply to {0}")]
    NonceNotApplicable(ChainId),

    /// A contract or program the operation needs is not configured.
    #[error("No {0} configured")]
    NotConfigured(&'static str),

    /// Any other semantic problem with the request.
    #[error("{0}")]
    Invalid(String),
}

/// Failures while turning an unsigned body into a signed transaction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SigningError {
    /// Key material has the wrong length or format.
    #[error("Invalid key: {0}")]
    InvalidKey(String),

    /// The body cannot be serialized into the chain's wire format.
    #[error("Encoding failure: {0}")]
    EncodingFailure(String),

    /// The body belongs to the other chain.
    #[error("{signer} signer cannot sign a {body} transaction body")]
    ChainMismatch { signer: ChainId, body: ChainId },
}

/// Rejected move in the signed-transaction state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Invalid status transition {from:?} -> {to:?}")]
pub struct StatusTransitionError {
    pub from: TransactionStatus,
    pub to: TransactionStatus,
}

/// Umbrella error raised by builders, signers and the nonce cache.
#[derive(Debug, Clone, Error)]
pub enum EngineError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Chain(#[from] ChainError),

    #[error(transparent)]
    Signing(#[from] SigningError),

    /// No client/builder/signer is registered for the chain.
    #[error("Unsupported chain: no client registered for {0}")]
    UnsupportedChain(ChainId),

    /// The key store could not produce a key for the signer.
    #[error("Key resolution failed: {0}")]
    KeyResolution(String),
}

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ValidationError::MissingField {
            tx_type: TransactionType::Transfer,
            field: "to",
        };
        assert_eq!(err.to_string(), "Transfer requires 'to'");

        let err = EngineError::from(ChainError::Timeout(10));
        assert_eq!(err.to_string(), "RPC timeout after 10 seconds");

        let err = EngineError::UnsupportedChain(ChainId::SequenceChain);
        assert!(err.to_string().contains("sequence_chain"));
    }

    #[test]
    fn test_signing_error_converts() {
        let err: EngineError = SigningError::InvalidKey("too short".into()).into();
        assert!(matches!(err, EngineError::Signing(SigningError::InvalidKey(_))));
    }
}
