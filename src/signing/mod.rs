//! Signing service.
//!
//! # Responsibilities
//! - Serialize unsigned bodies into each chain's signing payload
//! - Sign with the caller-supplied key and produce broadcastable wire strings
//! - Verify or recover signers of already signed transactions
//!
//! # Security
//! The signer address is always derived from the key and must equal the
//! sender recorded in the body. Keys are borrowed for the duration of one
//! call and never stored or logged.

pub mod account;
pub mod keys;
pub mod message;
pub mod sequence;

use crate::blockchain::types::ChainId;
use crate::error::SigningError;
use crate::transaction::{SignedTransaction, UnsignedTransactionBody};

pub use account::AccountSigner;
pub use keys::{EnvKeyResolver, KeyResolver, PrivateKey, StaticKeyResolver};
pub use sequence::SequenceSigner;

/// Turns an unsigned body into a [`SignedTransaction`] in the `Signed` state.
pub trait TransactionSigner: Send + Sync {
    fn chain(&self) -> ChainId;

    /// Fail unless `key` signs as `from`. Run before a body is built so that
    /// a wrong key never consumes a nonce.
    fn check_key(&self, from: &str, key: &PrivateKey) -> Result<(), SigningError>;

    /// Refuses keys that do not belong to the body's sender.
    fn sign(
        &self,
        body: &UnsignedTransactionBody,
        key: &PrivateKey,
    ) -> Result<SignedTransaction, SigningError>;
}
