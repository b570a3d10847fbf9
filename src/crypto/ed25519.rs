//! Ed25519 keys for the SequenceChain.

use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};

use crate::crypto::encoding::{decode_base58_32, decode_hex, encode_base58};
use crate::error::SigningError;

/// An Ed25519 signing key. The address is the Base58 public key.
pub struct Ed25519Key {
    signing: SigningKey,
}

impl Ed25519Key {
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        Self {
            signing: SigningKey::from_bytes(seed),
        }
    }

    /// Accepts a 32-byte seed or a 64-byte keypair (seed ‖ public key) as hex.
    /// A keypair whose public half does not match the seed is rejected.
    pub fn from_hex(key_hex: &str) -> Result<Self, SigningError> {
        let bytes = decode_hex(key_hex)
            .map_err(|e| SigningError::InvalidKey(format!("Invalid private key format: {}", e)))?;

        match bytes.len() {
            32 => {
                let mut seed = [0u8; 32];
                seed.copy_from_slice(&bytes);
                Ok(Self::from_seed(&seed))
            }
            64 => {
                let mut pair = [0u8; 64];
                pair.copy_from_slice(&bytes);
                let signing = SigningKey::from_keypair_bytes(&pair)
                    .map_err(|e| SigningError::InvalidKey(format!("Inconsistent keypair: {}", e)))?;
                Ok(Self { signing })
            }
            n => Err(SigningError::InvalidKey(format!(
                "expected 32 or 64 bytes, got {}",
                n
            ))),
        }
    }

    pub fn public_key(&self) -> [u8; 32] {
        self.signing.verifying_key().to_bytes()
    }

    /// Base58 address.
    pub fn address(&self) -> String {
        encode_base58(self.public_key())
    }

    pub fn sign(&self, message: &[u8]) -> [u8; 64] {
        self.signing.sign(message).to_bytes()
    }
}

impl std::fmt::Debug for Ed25519Key {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ed25519Key")
            .field("address", &self.address())
            .finish_non_exhaustive()
    }
}

/// Check an Ed25519 signature against a Base58 address.
pub fn verify(address: &str, message: &[u8], signature: &[u8]) -> Result<bool, SigningError> {
    let public = decode_base58_32(address)
        .ok_or_else(|| SigningError::InvalidKey(format!("'{}' is not a 32-byte key", address)))?;
    let verifying = VerifyingKey::from_bytes(&public)
        .map_err(|e| SigningError::InvalidKey(format!("Invalid public key: {}", e)))?;

    let sig_bytes: [u8; 64] = signature.try_into().map_err(|_| {
        SigningError::EncodingFailure(format!(
            "signature must be 64 bytes, got {}",
            signature.len()
        ))
    })?;
    let signature = Signature::from_bytes(&sig_bytes);
    Ok(verifying.verify(message, &signature).is_ok())
}
