//! Outcome reported to the caller for every execution.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::blockchain::types::ChainId;

/// Message used when a broadcast does not yield a hash.
pub const NO_HASH_RETURNED: &str = "No transaction hash returned from blockchain broadcast";

/// Terminal report of one execution. A successful result always carries a
/// non-empty hash; a failed one never does.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionResult {
    transaction_id: Uuid,
    success: bool,
    transaction_hash: Option<String>,
    signer: String,
    chain: ChainId,
    detail: String,
}

impl TransactionResult {
    /// Returns a failure instead when `hash` is blank.
    pub fn success(
        transaction_id: Uuid,
        hash: String,
        signer: String,
        chain: ChainId,
        detail: String,
    ) -> Self {
        if hash.trim().is_empty() {
            return Self::failure(transaction_id, signer, chain, NO_HASH_RETURNED.to_string());
        }
        Self {
            transaction_id,
            success: true,
            transaction_hash: Some(hash),
            signer,
            chain,
            detail,
        }
    }

    pub fn failure(transaction_id: Uuid, signer: String, chain: ChainId, detail: String) -> Self {
        Self {
            transaction_id,
            success: false,
            transaction_hash: None,
            signer,
            chain,
            detail,
        }
    }

    pub fn transaction_id(&self) -> Uuid {
        self.transaction_id
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    pub fn transaction_hash(&self) -> Option<&str> {
        self.transaction_hash.as_deref()
    }

    /// Derived signer address, or the requested sender when signing never happened.
    pub fn signer(&self) -> &str {
        &self.signer
    }

    pub fn chain(&self) -> ChainId {
        self.chain
    }

    /// Human-readable summary on success, `<type> failed: <cause>` on failure.
    pub fn detail(&self) -> &str {
        &self.detail
    }
}
