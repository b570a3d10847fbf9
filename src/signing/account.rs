//! EIP-155 legacy transaction signing.

use alloy::consensus::{SignableTransaction, TxEnvelope, TxLegacy};
use alloy::eips::eip2718::Encodable2718;
use alloy::primitives::{Address, Signature, TxKind, B256};

use crate::blockchain::types::ChainId;
use crate::crypto::ecdsa::{recover_address, EcdsaKey};
use crate::crypto::encoding::encode_hex;
use crate::error::SigningError;
use crate::signing::keys::PrivateKey;
use crate::signing::TransactionSigner;
use crate::transaction::{AccountTxBody, SignatureMaterial, SignedTransaction, UnsignedTransactionBody};

pub struct AccountSigner {
    evm_chain_id: u64,
}

impl AccountSigner {
    pub fn new(evm_chain_id: u64) -> Self {
        Self { evm_chain_id }
    }

    pub fn evm_chain_id(&self) -> u64 {
        self.evm_chain_id
    }

    fn legacy(&self, body: &AccountTxBody) -> TxLegacy {
        TxLegacy {
            chain_id: Some(self.evm_chain_id),
            nonce: body.nonce,
            gas_price: body.gas_price,
            gas_limit: body.gas_limit,
            to: TxKind::Call(body.to),
            value: body.value,
            input: body.data.clone(),
        }
    }

    /// Keccak-256 of the RLP list `[nonce, gasPrice, gas, to, value, data, chainId, 0, 0]`.
    pub fn signing_hash(&self, body: &AccountTxBody) -> B256 {
        self.legacy(body).signature_hash()
    }

    /// Recover the address that produced `signed`.
    pub fn recover_signer(&self, signed: &SignedTransaction) -> Result<Address, SigningError> {
        let body = signed.body().as_account().ok_or(SigningError::ChainMismatch {
            signer: ChainId::AccountChain,
            body: signed.chain(),
        })?;
        let SignatureMaterial::Ecdsa { v, r, s } = signed.signature() else {
            return Err(SigningError::EncodingFailure(
                "expected an ECDSA signature".to_string(),
            ));
        };

        let base = self.evm_chain_id.saturating_mul(2).saturating_add(35);
        let parity = match v.checked_sub(base) {
            Some(0) => false,
            Some(1) => true,
            _ => {
                return Err(SigningError::EncodingFailure(format!(
                    "v={} does not belong to chain id {}",
                    v, self.evm_chain_id
                )))
            }
        };
        let signature = Signature::new(*r, *s, parity);
        recover_address(&signature, &self.signing_hash(body))
    }
}

impl TransactionSigner for AccountSigner {
    fn chain(&self) -> ChainId {
        ChainId::AccountChain
    }

    fn check_key(&self, from: &str, key: &PrivateKey) -> Result<(), SigningError> {
        let from = from
            .parse::<Address>()
            .map_err(|e| SigningError::InvalidKey(format!("sender {} is not an address: {}", from, e)))?;
        sender_key(from, key).map(|_| ())
    }

    fn sign(
        &self,
        body: &UnsignedTransactionBody,
        key: &PrivateKey,
    ) -> Result<SignedTransaction, SigningError> {
        let account = body.as_account().ok_or(SigningError::ChainMismatch {
            signer: ChainId::AccountChain,
            body: body.chain(),
        })?;
        let key = sender_key(account.from, key)?;

        let tx = self.legacy(account);
        let signature = key.sign_prehash(&tx.signature_hash())?;
        let v = self
            .evm_chain_id
            .checked_mul(2)
            .and_then(|v| v.checked_add(35 + u64::from(signature.v())))
            .ok_or_else(|| {
                SigningError::EncodingFailure(format!(
                    "chain id {} does not fit an EIP-155 v value",
                    self.evm_chain_id
                ))
            })?;
        let material = SignatureMaterial::Ecdsa {
            v,
            r: signature.r(),
            s: signature.s(),
        };

        let envelope = TxEnvelope::from(tx.into_signed(signature));
        let raw = envelope.encoded_2718();
        let local_hash = encode_hex(envelope.tx_hash());
        let signer = key.address().to_checksum(None);

        tracing::debug!(
            signer = %signer,
            nonce = account.nonce,
            hash = %local_hash,
            "Signed AccountChain transaction"
        );

        Ok(SignedTransaction::new(
            body.clone(),
            material,
            signer,
            raw.clone(),
            encode_hex(&raw),
            Some(local_hash),
        ))
    }
}

fn sender_key(from: Address, key: &PrivateKey) -> Result<EcdsaKey, SigningError> {
    let key = EcdsaKey::from_hex(key.expose_secret())?;
    if key.address() != from {
        return Err(SigningError::InvalidKey(format!(
            "key for {} cannot sign for sender {}",
            key.address(),
            from
        )));
    }
    Ok(key)
}
