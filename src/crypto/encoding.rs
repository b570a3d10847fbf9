//! Hex / Base58 codecs and address validation.

use alloy::primitives::{hex, Address};

/// Length range of a Base58-encoded 32-byte public key.
const SEQUENCE_ADDRESS_LEN: std::ops::RangeInclusive<usize> = 32..=44;

/// Hex-encode with a `0x` prefix.
pub fn encode_hex(bytes: impl AsRef<[u8]>) -> String {
    hex::encode_prefixed(bytes)
}

/// Decode hex, with or without a `0x` prefix.
pub fn decode_hex(input: &str) -> Result<Vec<u8>, hex::FromHexError> {
    let trimmed = input.trim();
    let body = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    hex::decode(body)
}

pub fn encode_base58(bytes: impl AsRef<[u8]>) -> String {
    bs58::encode(bytes).into_string()
}

pub fn decode_base58(input: &str) -> Result<Vec<u8>, bs58::decode::Error> {
    bs58::decode(input).into_vec()
}

/// Decode a Base58 string that must hold exactly 32 bytes.
pub fn decode_base58_32(input: &str) -> Option<[u8; 32]> {
    let bytes = decode_base58(input).ok()?;
    bytes.as_slice().try_into().ok()
}

/// `0x` followed by 40 hex digits. Mixed-case input must carry a valid
/// EIP-55 checksum; all-lower or all-upper input is accepted as is.
pub fn is_valid_account_address(address: &str) -> bool {
    let Some(body) = address.strip_prefix("0x") else {
        return false;
    };
    if body.len() != 40 || !body.chars().all(|c| c.is_ascii_hexdigit()) {
        return false;
    }

    let has_lower = body.chars().any(|c| c.is_ascii_lowercase());
    let has_upper = body.chars().any(|c| c.is_ascii_uppercase());
    if has_lower && has_upper {
        return Address::parse_checksummed(address, None).is_ok();
    }
    true
}

/// Parse an AccountChain address after validating its format.
pub fn parse_account_address(address: &str) -> Option<Address> {
    if !is_valid_account_address(address) {
        return None;
    }
    address.parse().ok()
}

/// 32..=44 Base58 characters decoding to a 32-byte public key.
pub fn is_valid_sequence_address(address: &str) -> bool {
    SEQUENCE_ADDRESS_LEN.contains(&address.len()) && decode_base58_32(address).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    const ANVIL_ADDRESS: &str = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266";

    #[test]
    fn test_hex_roundtrip_accepts_prefix() {
        assert_eq!(encode_hex([0xde, 0xad]), "0xdead");
        assert_eq!(decode_hex("0xdead").unwrap(), vec![0xde, 0xad]);
        assert_eq!(decode_hex("dead").unwrap(), vec![0xde, 0xad]);
        assert!(decode_hex("0xzz").is_err());
    }

    #[test]
    fn test_account_address_validation() {
        assert!(is_valid_account_address(ANVIL_ADDRESS));
        assert!(is_valid_account_address(&ANVIL_ADDRESS.to_lowercase()));
        assert!(is_valid_account_address(
            "0xF39FD6E51AAD88F6F4CE6AB8827279CFFFB92266"
        ));

        // broken checksum
        assert!(!is_valid_account_address(
            "0xF39fd6e51aad88F6F4ce6aB8827279cffFb92266"
        ));
        assert!(!is_valid_account_address("f39fd6e51aad88f6f4ce6ab8827279cfffb92266"));
        assert!(!is_valid_account_address("0x1234"));
        assert!(!is_valid_account_address(
            "0xg39fd6e51aad88f6f4ce6ab8827279cfffb92266"
        ));
    }

    #[test]
    fn test_sequence_address_validation() {
        assert!(is_valid_sequence_address("11111111111111111111111111111111"));
        assert!(is_valid_sequence_address(
            "TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA"
        ));
        // 0, O, I and l are not in the Base58 alphabet
        assert!(!is_valid_sequence_address(
            "0okenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA"
        ));
        assert!(!is_valid_sequence_address("abc"));
        assert!(!is_valid_sequence_address(ANVIL_ADDRESS));
    }

    #[test]
    fn test_decode_base58_32() {
        assert_eq!(
            decode_base58_32("11111111111111111111111111111111"),
            Some([0u8; 32])
        );
        assert_eq!(decode_base58_32("2g"), None);
    }
}
