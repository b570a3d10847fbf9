//! Signed transactions and their lifecycle.

use std::time::{SystemTime, UNIX_EPOCH};

use alloy::primitives::U256;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::blockchain::types::ChainId;
use crate::error::StatusTransitionError;
use crate::transaction::body::UnsignedTransactionBody;

/// Lifecycle of a signed transaction.
///
/// ```text
/// Signed ──► Pending ──► Confirmed
///   │           │
///   └──► Failed ◄┘      (Signed | Pending) ──► Cancelled
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    Signed,
    Pending,
    Confirmed,
    Failed,
    Cancelled,
}

impl TransactionStatus {
    pub fn can_transition_to(self, next: TransactionStatus) -> bool {
        use TransactionStatus::*;
        matches!(
            (self, next),
            (Signed, Pending)
                | (Signed, Failed)
                | (Signed, Cancelled)
                | (Pending, Confirmed)
                | (Pending, Failed)
                | (Pending, Cancelled)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            TransactionStatus::Confirmed | TransactionStatus::Failed | TransactionStatus::Cancelled
        )
    }
}

/// Chain-specific signature material.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "scheme", rename_all = "snake_case")]
pub enum SignatureMaterial {
    /// secp256k1 with EIP-155 `v`.
    Ecdsa { v: u64, r: U256, s: U256 },
    /// Ed25519, 64 bytes.
    Raw { bytes: Vec<u8> },
}

/// Output of a signer. Produced in the `Signed` state; moves forward only.
#[derive(Debug, Clone, Serialize)]
pub struct SignedTransaction {
    id: Uuid,
    body: UnsignedTransactionBody,
    signature: SignatureMaterial,
    signer: String,
    signed_at: u64,
    raw: Vec<u8>,
    encoded: String,
    local_hash: Option<String>,
    transaction_hash: Option<String>,
    status: TransactionStatus,
}

impl SignedTransaction {
    /// `encoded` is what gets broadcast: `0x` hex on the AccountChain,
    /// Base58 on the SequenceChain.
    pub fn new(
        body: UnsignedTransactionBody,
        signature: SignatureMaterial,
        signer: String,
        raw: Vec<u8>,
        encoded: String,
        local_hash: Option<String>,
    ) -> Self {
        let signed_at = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default();
        Self {
            id: Uuid::new_v4(),
            body,
            signature,
            signer,
            signed_at,
            raw,
            encoded,
            local_hash,
            transaction_hash: None,
            status: TransactionStatus::Signed,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn chain(&self) -> ChainId {
        self.body.chain()
    }

    pub fn body(&self) -> &UnsignedTransactionBody {
        &self.body
    }

    pub fn signature(&self) -> &SignatureMaterial {
        &self.signature
    }

    /// Address derived from the signing key.
    pub fn signer(&self) -> &str {
        &self.signer
    }

    pub fn signed_at(&self) -> u64 {
        self.signed_at
    }

    /// Wire bytes.
    pub fn raw(&self) -> &[u8] {
        &self.raw
    }

    pub fn encoded(&self) -> &str {
        &self.encoded
    }

    /// Hash computed locally at signing time.
    pub fn local_hash(&self) -> Option<&str> {
        self.local_hash.as_deref()
    }

    /// Hash returned by the node on broadcast.
    pub fn transaction_hash(&self) -> Option<&str> {
        self.transaction_hash.as_deref()
    }

    pub fn status(&self) -> TransactionStatus {
        self.status
    }

    /// Record a successful broadcast.
    pub fn mark_pending(&mut self, hash: impl Into<String>) -> Result<(), StatusTransitionError> {
        self.transition(TransactionStatus::Pending)?;
        self.transaction_hash = Some(hash.into());
        Ok(())
    }

    pub fn mark_confirmed(&mut self) -> Result<(), StatusTransitionError> {
        self.transition(TransactionStatus::Confirmed)
    }

    pub fn mark_failed(&mut self) -> Result<(), StatusTransitionError> {
        self.transition(TransactionStatus::Failed)
    }

    pub fn cancel(&mut self) -> Result<(), StatusTransitionError> {
        self.transition(TransactionStatus::Cancelled)
    }

    fn transition(&mut self, next: TransactionStatus) -> Result<(), StatusTransitionError> {
        if !self.status.can_transition_to(next) {
            return Err(StatusTransitionError {
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transaction::body::SequenceTxBody;

    fn signed() -> SignedTransaction {
        let body = UnsignedTransactionBody::Sequence(SequenceTxBody {
            recent_blockhash: "11111111111111111111111111111111".into(),
            fee: 5000,
            program_id: "11111111111111111111111111111111".into(),
            from: "payer".into(),
            to: None,
            token: None,
            amount: 1,
            data: vec![2, 0, 0, 0],
        });
        SignedTransaction::new(
            body,
            SignatureMaterial::Raw { bytes: vec![0; 64] },
            "payer".into(),
            vec![1, 2, 3],
            "Ldp".into(),
            None,
        )
    }

    #[test]
    fn test_happy_path() {
        let mut tx = signed();
        assert_eq!(tx.status(), TransactionStatus::Signed);
        assert_eq!(tx.chain(), ChainId::SequenceChain);

        tx.mark_pending("sig").unwrap();
        assert_eq!(tx.transaction_hash(), Some("sig"));
        tx.mark_confirmed().unwrap();
        assert!(tx.status().is_terminal());
    }

    #[test]
    fn test_no_backwards_moves() {
        let mut tx = signed();
        tx.mark_failed().unwrap();
        let err = tx.mark_pending("late").unwrap_err();
        assert_eq!(err.from, TransactionStatus::Failed);
        assert_eq!(err.to, TransactionStatus::Pending);
        assert_eq!(tx.transaction_hash(), None);

        let mut tx = signed();
        assert!(tx.mark_confirmed().is_err());
    }

    #[test]
    fn test_cancel_from_pending() {
        let mut tx = signed();
        tx.mark_pending("sig").unwrap();
        tx.cancel().unwrap();
        assert_eq!(tx.status(), TransactionStatus::Cancelled);
        assert!(tx.cancel().is_err());
    }

    #[test]
    fn test_ids_are_unique() {
        assert_ne!(signed().id(), signed().id());
    }
}
