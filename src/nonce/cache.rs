//! In-memory admin nonce cache.

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use dashmap::DashMap;
use tokio::sync::Mutex;

use crate::blockchain::client::ChainClient;
use crate::blockchain::types::{ChainError, ChainId};
use crate::error::{EngineError, EngineResult, ValidationError};
use crate::nonce::NonceAllocator;
use crate::observability::metrics;

/// Cached state for one (address, chain).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NonceRecord {
    /// Value the next allocation returns.
    pub next: u64,
    /// Unix seconds of the last chain sync.
    pub synced_at: u64,
}

type Slot = Arc<Mutex<Option<NonceRecord>>>;

/// Process-wide nonce cache for admin senders.
///
/// Only the AccountChain has counter nonces; requests for the SequenceChain
/// are rejected with [`ValidationError::NonceNotApplicable`].
pub struct AdminNonceCache {
    account_client: Arc<dyn ChainClient>,
    slots: DashMap<(String, ChainId), Slot>,
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

impl AdminNonceCache {
    pub fn new(account_client: Arc<dyn ChainClient>) -> Self {
        Self {
            account_client,
            slots: DashMap::new(),
        }
    }

    fn source(&self, chain: ChainId) -> EngineResult<&Arc<dyn ChainClient>> {
        match chain {
            ChainId::AccountChain => Ok(&self.account_client),
            ChainId::SequenceChain => Err(ValidationError::NonceNotApplicable(chain).into()),
        }
    }

    /// AccountChain addresses are case-insensitive hex.
    fn key(address: &str, chain: ChainId) -> (String, ChainId) {
        let address = match chain {
            ChainId::AccountChain => address.to_ascii_lowercase(),
            ChainId::SequenceChain => address.to_string(),
        };
        (address, chain)
    }

    fn slot(&self, address: &str, chain: ChainId) -> Slot {
        let entry = self.slots.entry(Self::key(address, chain)).or_default();
        Arc::clone(entry.value())
    }

    fn existing_slot(&self, address: &str, chain: ChainId) -> Option<Slot> {
        self.slots
            .get(&Self::key(address, chain))
            .map(|entry| Arc::clone(entry.value()))
    }

    async fn fetch_chain_nonce(client: &dyn ChainClient, address: &str) -> EngineResult<u64> {
        let sequence = client.get_sequence_number(address).await?;
        sequence.as_nonce().ok_or_else(|| {
            EngineError::Chain(ChainError::InvalidResponse(format!(
                "{} returned a blockhash where a nonce was expected",
                client.chain()
            )))
        })
    }

    /// Number of tracked (address, chain) keys.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

#[async_trait]
impl NonceAllocator for AdminNonceCache {
    async fn allocate_next(&self, address: &str, chain: ChainId) -> EngineResult<u64> {
        let client = self.source(chain)?;
        let slot = self.slot(address, chain);
        let mut guard = slot.lock().await;

        let (nonce, synced_at) = match *guard {
            Some(record) => (record.next, record.synced_at),
            None => {
                let fetched = Self::fetch_chain_nonce(client.as_ref(), address).await?;
                tracing::info!(%chain, address, nonce = fetched, "Seeded admin nonce from chain");
                metrics::record_nonce_reload(chain);
                (fetched, now_secs())
            }
        };
        let following = nonce.checked_add(1).ok_or_else(|| {
            EngineError::Chain(ChainError::InvalidResponse(format!(
                "nonce overflow for {}",
                address
            )))
        })?;

        *guard = Some(NonceRecord {
            next: following,
            synced_at,
        });
        metrics::record_nonce_allocation(chain);
        tracing::debug!(%chain, address, nonce, "Allocated admin nonce");
        Ok(nonce)
    }

    async fn force_reload(&self, address: &str, chain: ChainId) -> EngineResult<u64> {
        let client = self.source(chain)?;
        let slot = self.slot(address, chain);
        let mut guard = slot.lock().await;

        let fetched = Self::fetch_chain_nonce(client.as_ref(), address).await?;
        let previous = (*guard).map(|r| r.next);
        *guard = Some(NonceRecord {
            next: fetched,
            synced_at: now_secs(),
        });
        metrics::record_nonce_reload(chain);
        tracing::info!(%chain, address, nonce = fetched, ?previous, "Reloaded admin nonce from chain");
        Ok(fetched)
    }

    async fn reset(&self, address: &str, chain: ChainId) {
        if let Some(slot) = self.existing_slot(address, chain) {
            *slot.lock().await = None;
            tracing::info!(%chain, address, "Reset admin nonce");
        }
    }

    async fn set_to_zero(&self, address: &str, chain: ChainId) {
        let slot = self.slot(address, chain);
        *slot.lock().await = Some(NonceRecord {
            next: 0,
            synced_at: now_secs(),
        });
        tracing::warn!(%chain, address, "Admin nonce forced to zero");
    }

    async fn current(&self, address: &str, chain: ChainId) -> Option<u64> {
        let slot = self.existing_slot(address, chain)?;
        let record = *slot.lock().await;
        record.map(|r| r.next)
    }

    async fn clear_all(&self) {
        let slots: Vec<Slot> = self
            .slots
            .iter()
            .map(|entry| Arc::clone(entry.value()))
            .collect();
        for slot in &slots {
            *slot.lock().await = None;
        }
        tracing::info!(entries = slots.len(), "Cleared admin nonce cache");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blockchain::mock::MockChainClient;

    const ADMIN: &str = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266";

    fn cache_with(mock: &Arc<MockChainClient>) -> AdminNonceCache {
        AdminNonceCache::new(Arc::clone(mock) as Arc<dyn ChainClient>)
    }

    #[tokio::test]
    async fn test_first_allocation_seeds_from_chain() {
        let mock = Arc::new(MockChainClient::new(ChainId::AccountChain).with_nonce(5));
        let cache = cache_with(&mock);

        assert_eq!(cache.allocate_next(ADMIN, ChainId::AccountChain).await.unwrap(), 5);
        assert_eq!(cache.current(ADMIN, ChainId::AccountChain).await, Some(6));
        assert_eq!(cache.allocate_next(ADMIN, ChainId::AccountChain).await.unwrap(), 6);
        assert_eq!(mock.call_count("get_sequence_number"), 1);
    }

    #[tokio::test]
    async fn test_address_case_is_ignored() {
        let mock = Arc::new(MockChainClient::new(ChainId::AccountChain).with_nonce(1));
        let cache = cache_with(&mock);

        cache.allocate_next(ADMIN, ChainId::AccountChain).await.unwrap();
        let lower = ADMIN.to_lowercase();
        assert_eq!(cache.allocate_next(&lower, ChainId::AccountChain).await.unwrap(), 2);
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn test_force_reload_replaces_cached_value() {
        let mock = Arc::new(MockChainClient::new(ChainId::AccountChain).with_nonce(3));
        let cache = cache_with(&mock);

        cache.allocate_next(ADMIN, ChainId::AccountChain).await.unwrap();
        cache.allocate_next(ADMIN, ChainId::AccountChain).await.unwrap();
        assert_eq!(cache.current(ADMIN, ChainId::AccountChain).await, Some(5));

        mock.set_nonce(4);
        assert_eq!(cache.force_reload(ADMIN, ChainId::AccountChain).await.unwrap(), 4);
        assert_eq!(cache.allocate_next(ADMIN, ChainId::AccountChain).await.unwrap(), 4);
    }

    #[tokio::test]
    async fn test_reset_reseeds_on_next_allocation() {
        let mock = Arc::new(MockChainClient::new(ChainId::AccountChain).with_nonce(10));
        let cache = cache_with(&mock);

        cache.allocate_next(ADMIN, ChainId::AccountChain).await.unwrap();
        cache.reset(ADMIN, ChainId::AccountChain).await;
        assert_eq!(cache.current(ADMIN, ChainId::AccountChain).await, None);

        mock.set_nonce(12);
        assert_eq!(cache.allocate_next(ADMIN, ChainId::AccountChain).await.unwrap(), 12);
        assert_eq!(mock.call_count("get_sequence_number"), 2);
    }

    #[tokio::test]
    async fn test_set_to_zero_skips_chain() {
        let mock = Arc::new(MockChainClient::new(ChainId::AccountChain).with_nonce(99));
        let cache = cache_with(&mock);

        cache.set_to_zero(ADMIN, ChainId::AccountChain).await;
        assert_eq!(cache.allocate_next(ADMIN, ChainId::AccountChain).await.unwrap(), 0);
        assert_eq!(mock.call_count("get_sequence_number"), 0);
    }

    #[tokio::test]
    async fn test_clear_all() {
        let mock = Arc::new(MockChainClient::new(ChainId::AccountChain).with_nonce(1));
        let cache = cache_with(&mock);
        let other = "0x70997970c51812dc3a010c7d01b50e0d17dc79c8";

        cache.allocate_next(ADMIN, ChainId::AccountChain).await.unwrap();
        cache.allocate_next(other, ChainId::AccountChain).await.unwrap();
        cache.clear_all().await;

        assert_eq!(cache.current(ADMIN, ChainId::AccountChain).await, None);
        assert_eq!(cache.current(other, ChainId::AccountChain).await, None);
    }

    #[tokio::test]
    async fn test_sequence_chain_not_applicable() {
        let mock = Arc::new(MockChainClient::new(ChainId::AccountChain));
        let cache = cache_with(&mock);

        let err = cache
            .allocate_next("11111111111111111111111111111111", ChainId::SequenceChain)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            EngineError::Validation(ValidationError::NonceNotApplicable(ChainId::SequenceChain))
        ));
        assert_eq!(mock.total_calls(), 0);
    }

    #[tokio::test]
    async fn test_seed_failure_caches_nothing() {
        let mock = Arc::new(
            MockChainClient::new(ChainId::AccountChain).with_sequence_error(ChainError::Timeout(1)),
        );
        let cache = cache_with(&mock);

        let err = cache.allocate_next(ADMIN, ChainId::AccountChain).await.unwrap_err();
        assert!(matches!(err, EngineError::Chain(ChainError::Timeout(1))));
        assert_eq!(cache.current(ADMIN, ChainId::AccountChain).await, None);

        mock.set_nonce(8);
        assert_eq!(cache.allocate_next(ADMIN, ChainId::AccountChain).await.unwrap(), 8);
    }
}
