//! Admin nonce allocation.
//!
//! # Data Flow
//! ```text
//! AccountTxBuilder (sender == admin, no explicit nonce)
//!     → NonceAllocator::allocate_next(address, chain)
//!         → cache hit:  hand out `next`, store `next + 1`
//!         → cache miss: ChainClient::get_sequence_number, hand it out, store `+ 1`
//! Caller after a failed broadcast
//!     → force_reload (reseed from chain) or reset (drop the entry)
//! ```
//!
//! # Design Decisions
//! - One async mutex per (address, chain) key; allocations for different
//!   keys never wait on each other
//! - The seeding fetch happens while holding the key's lock, so concurrent
//!   first allocations see a single chain query
//! - A failed allocation leaves the entry untouched
//! - Coordination is per process; multiple processes sharing an admin key
//!   still race on chain

pub mod cache;

use async_trait::async_trait;

use crate::blockchain::types::ChainId;
use crate::error::EngineResult;

pub use cache::{AdminNonceCache, NonceRecord};

/// Hands out strictly increasing nonces per (address, chain).
#[async_trait]
pub trait NonceAllocator: Send + Sync {
    /// Next nonce to use. Seeds from the chain on first use.
    async fn allocate_next(&self, address: &str, chain: ChainId) -> EngineResult<u64>;

    /// Replace the cached value with the chain's current nonce and return it.
    async fn force_reload(&self, address: &str, chain: ChainId) -> EngineResult<u64>;

    /// Forget the entry; the next allocation reseeds from the chain.
    async fn reset(&self, address: &str, chain: ChainId);

    /// Pin the next allocation to 0. For freshly funded dev accounts only.
    async fn set_to_zero(&self, address: &str, chain: ChainId);

    /// Nonce the next allocation would return, if cached.
    async fn current(&self, address: &str, chain: ChainId) -> Option<u64>;

    /// Forget every entry.
    async fn clear_all(&self);
}
