//! Ed25519 signing of SequenceChain messages.

use crate::blockchain::types::ChainId;
use crate::crypto::ed25519::{self, Ed25519Key};
use crate::crypto::encoding::encode_base58;
use crate::error::SigningError;
use crate::signing::keys::PrivateKey;
use crate::signing::message::{compile, put_compact_u16};
use crate::signing::TransactionSigner;
use crate::transaction::{SignatureMaterial, SignedTransaction, UnsignedTransactionBody};

#[derive(Debug, Default)]
pub struct SequenceSigner;

impl SequenceSigner {
    pub fn new() -> Self {
        Self
    }

    /// Check the stored signature against the fee payer and the recompiled message.
    pub fn verify(&self, signed: &SignedTransaction) -> Result<bool, SigningError> {
        let body = signed.body().as_sequence().ok_or(SigningError::ChainMismatch {
            signer: ChainId::SequenceChain,
            body: signed.chain(),
        })?;
        let SignatureMaterial::Raw { bytes } = signed.signature() else {
            return Err(SigningError::EncodingFailure(
                "expected an Ed25519 signature".to_string(),
            ));
        };
        ed25519::verify(&body.from, &compile(body)?, bytes)
    }
}

impl TransactionSigner for SequenceSigner {
    fn chain(&self) -> ChainId {
        ChainId::SequenceChain
    }

    fn check_key(&self, from: &str, key: &PrivateKey) -> Result<(), SigningError> {
        fee_payer_key(from, key).map(|_| ())
    }

    fn sign(
        &self,
        body: &UnsignedTransactionBody,
        key: &PrivateKey,
    ) -> Result<SignedTransaction, SigningError> {
        let sequence = body.as_sequence().ok_or(SigningError::ChainMismatch {
            signer: ChainId::SequenceChain,
            body: body.chain(),
        })?;
        let key = fee_payer_key(&sequence.from, key)?;
        let signer = key.address();

        let message = compile(sequence)?;
        let signature = key.sign(&message);

        let mut raw = Vec::with_capacity(1 + signature.len() + message.len());
        put_compact_u16(&mut raw, 1)?;
        raw.extend_from_slice(&signature);
        raw.extend_from_slice(&message);

        let local_hash = encode_base58(signature);
        tracing::debug!(signer = %signer, signature = %local_hash, "Signed SequenceChain transaction");

        Ok(SignedTransaction::new(
            body.clone(),
            SignatureMaterial::Raw {
                bytes: signature.to_vec(),
            },
            signer,
            raw.clone(),
            encode_base58(&raw),
            Some(local_hash),
        ))
    }
}

fn fee_payer_key(from: &str, key: &PrivateKey) -> Result<Ed25519Key, SigningError> {
    let key = Ed25519Key::from_hex(key.expose_secret())?;
    let signer = key.address();
    if signer != from {
        return Err(SigningError::InvalidKey(format!(
            "key for {} cannot sign for fee payer {}",
            signer, from
        )));
    }
    Ok(key)
}
