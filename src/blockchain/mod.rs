//! Chain clients.
//!
//! # Data Flow
//! ```text
//! builder / orchestrator
//!     → ChainClient (trait, one impl per chain)
//!         → account.rs  (eth_* methods)
//!         → sequence.rs (getLatestBlockhash, sendTransaction, ...)
//!     → rpc.rs (JSON-RPC over HTTP, timeouts, failover)
//! ```
//!
//! # Design Decisions
//! - Both chains share one JSON-RPC transport so that a `null` broadcast
//!   result stays observable instead of being folded into an error
//! - Reads fail over across endpoints; broadcasts go to the primary only
//! - Address arguments are validated before any network call

pub mod account;
pub mod client;
pub mod confirm;
#[cfg(any(test, feature = "test-util"))]
pub mod mock;
pub mod rpc;
pub mod sequence;
pub mod types;

pub use account::AccountChainClient;
pub use client::ChainClient;
pub use confirm::wait_for_confirmation;
#[cfg(any(test, feature = "test-util"))]
pub use mock::MockChainClient;
pub use sequence::SequenceChainClient;
pub use types::{
    Balance, BlockInfo, BlockNumber, ChainError, ChainId, ChainResult, SequenceNumber, TxStatus,
};
