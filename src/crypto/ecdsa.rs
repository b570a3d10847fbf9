//! secp256k1 ECDSA keys for the AccountChain.

use alloy::primitives::{Address, Signature, B256};
use alloy::signers::local::PrivateKeySigner;
use alloy::signers::SignerSync;

use crate::error::SigningError;

/// A secp256k1 signing key. `Debug` only shows the derived address.
pub struct EcdsaKey {
    signer: PrivateKeySigner,
}

impl EcdsaKey {
    /// Parse a 32-byte private key given as hex (with or without `0x`).
    pub fn from_hex(private_key_hex: &str) -> Result<Self, SigningError> {
        let trimmed = private_key_hex.trim();
        let key_hex = trimmed.strip_prefix("0x").unwrap_or(trimmed);
        if key_hex.len() != 64 {
            return Err(SigningError::InvalidKey(format!(
                "expected 64 hex characters, got {}",
                key_hex.len()
            )));
        }

        let signer: PrivateKeySigner = key_hex
            .parse()
            .map_err(|e| SigningError::InvalidKey(format!("Invalid private key format: {}", e)))?;
        Ok(Self { signer })
    }

    pub fn address(&self) -> Address {
        self.signer.address()
    }

    /// Sign a 32-byte prehash. The returned signature carries the y-parity bit.
    pub fn sign_prehash(&self, hash: &B256) -> Result<Signature, SigningError> {
        self.signer
            .sign_hash_sync(hash)
            .map_err(|e| SigningError::EncodingFailure(format!("Signing failed: {}", e)))
    }
}

impl std::fmt::Debug for EcdsaKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EcdsaKey")
            .field("address", &self.address())
            .finish_non_exhaustive()
    }
}

/// Recover the signer address from a signature over `prehash`.
pub fn recover_address(signature: &Signature, prehash: &B256) -> Result<Address, SigningError> {
    signature
        .recover_address_from_prehash(prehash)
        .map_err(|e| SigningError::EncodingFailure(format!("Recovery failed: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::hash::keccak256;

    // Anvil's first default account
    const TEST_PRIVATE_KEY: &str =
        "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    #[test]
    fn test_key_from_hex() {
        let key = EcdsaKey::from_hex(TEST_PRIVATE_KEY).unwrap();
        assert_eq!(
            key.address().to_string().to_lowercase(),
            "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266"
        );

        let prefixed = EcdsaKey::from_hex(&format!("0x{}", TEST_PRIVATE_KEY)).unwrap();
        assert_eq!(prefixed.address(), key.address());
    }

    #[test]
    fn test_invalid_keys_rejected() {
        assert!(matches!(
            EcdsaKey::from_hex("deadbeef"),
            Err(SigningError::InvalidKey(_))
        ));
        let not_hex = "z".repeat(64);
        assert!(matches!(
            EcdsaKey::from_hex(&not_hex),
            Err(SigningError::InvalidKey(_))
        ));
    }

    #[test]
    fn test_sign_and_recover() {
        let key = EcdsaKey::from_hex(TEST_PRIVATE_KEY).unwrap();
        let hash = keccak256(b"multichain");
        let signature = key.sign_prehash(&hash).unwrap();
        assert_eq!(recover_address(&signature, &hash).unwrap(), key.address());
    }

    #[test]
    fn test_debug_hides_secret() {
        let key = EcdsaKey::from_hex(TEST_PRIVATE_KEY).unwrap();
        let debug = format!("{:?}", key);
        assert!(!debug.contains(TEST_PRIVATE_KEY));
        assert!(debug.contains("EcdsaKey"));
    }
}
