//! Keccak-256 hashing.

use alloy::primitives::B256;

/// Keccak-256 digest of arbitrary bytes.
pub fn keccak256(data: impl AsRef<[u8]>) -> B256 {
    alloy::primitives::keccak256(data)
}

/// First four bytes of the Keccak-256 hash of a canonical function signature,
/// e.g. `transfer(address,uint256)` yields `a9059cbb`.
pub fn function_selector(signature: &str) -> [u8; 4] {
    let digest = keccak256(signature.as_bytes());
    let mut selector = [0u8; 4];
    selector.copy_from_slice(&digest[..4]);
    selector
}
