//! Multi-chain transaction engine.
//!
//! Builds, signs and broadcasts transfers, mints, burns and governance
//! transactions on an account-model chain (EVM-style) and a sequence-model
//! chain (blockhash-style) behind one `execute` call.
//!
//! ```text
//! TransactionRequest
//!     → orchestrator ── registry ──► builder ──► signer ──► client.broadcast
//!                                       │                       │
//!                                  nonce cache              JSON-RPC node
//!     ◄─────────────────── TransactionResult
//! ```

// Core pipeline
pub mod builder;
pub mod nonce;
pub mod orchestrator;
pub mod signing;
pub mod transaction;

// Chain access
pub mod blockchain;
pub mod crypto;

// Cross-cutting concerns
pub mod config;
pub mod error;
pub mod observability;

pub use blockchain::{ChainClient, ChainError, ChainId};
pub use config::EngineConfig;
pub use error::{EngineError, EngineResult, SigningError, ValidationError};
pub use orchestrator::TransactionOrchestrator;
pub use transaction::{TransactionRequest, TransactionResult};
