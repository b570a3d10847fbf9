//! Cryptographic primitives shared by clients, builders and signers.
//!
//! # Responsibilities
//! - Keccak-256 hashing and ABI function selectors
//! - Hex and Base58 codecs
//! - secp256k1 ECDSA keys for the AccountChain
//! - Ed25519 keys for the SequenceChain
//! - Address format validation for both chains
//!
//! # Security Constraints
//! - Key types never print secret material through `Debug`
//! - Nothing in here logs

pub mod ecdsa;
pub mod ed25519;
pub mod encoding;
pub mod hash;

pub use ecdsa::EcdsaKey;
pub use ed25519::Ed25519Key;
pub use encoding::{is_valid_account_address, is_valid_sequence_address};
pub use hash::{function_selector, keccak256};
