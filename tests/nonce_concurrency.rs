//! Concurrency behaviour of the admin nonce cache.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use multichain_tx::blockchain::{ChainClient, MockChainClient};
use multichain_tx::builder::{AccountTxBuilder, TransactionBuilder};
use multichain_tx::config::AccountChainConfig;
use multichain_tx::nonce::{AdminNonceCache, NonceAllocator};
use multichain_tx::transaction::UnsignedTransactionBody;
use multichain_tx::{ChainId, TransactionRequest};
use tokio::task::JoinSet;

const ADMIN: &str = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266";
const OTHER: &str = "0x70997970c51812dc3a010c7d01b50e0d17dc79c8";
const TOKEN: &str = "0x5fbdb2315678afecb367f032d93f642f64180aa3";

fn cache_over(mock: &Arc<MockChainClient>) -> Arc<AdminNonceCache> {
    Arc::new(AdminNonceCache::new(Arc::clone(mock) as Arc<dyn ChainClient>))
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_allocations_are_unique_and_contiguous() {
    let mock = Arc::new(
        MockChainClient::new(ChainId::AccountChain)
            .with_nonce(40)
            .with_sequence_delay(Duration::from_millis(20)),
    );
    let cache = cache_over(&mock);

    let mut tasks = JoinSet::new();
    for _ in 0..64 {
        let cache = cache.clone();
        tasks.spawn(async move { cache.allocate_next(ADMIN, ChainId::AccountChain).await });
    }

    let mut nonces = BTreeSet::new();
    while let Some(joined) = tasks.join_next().await {
        let nonce = joined.unwrap().unwrap();
        assert!(nonces.insert(nonce), "nonce {} handed out twice", nonce);
    }

    assert_eq!(nonces, (40..104).collect::<BTreeSet<u64>>());
    assert_eq!(mock.call_count("get_sequence_number"), 1);
    assert_eq!(cache.current(ADMIN, ChainId::AccountChain).await, Some(104));
}

#[tokio::test(start_paused = true)]
async fn test_keys_do_not_wait_on_each_other() {
    let mock = Arc::new(
        MockChainClient::new(ChainId::AccountChain)
            .with_nonce(1)
            .with_sequence_delay(Duration::from_secs(5)),
    );
    let cache = cache_over(&mock);

    let started = tokio::time::Instant::now();
    let (a, b) = tokio::join!(
        cache.allocate_next(ADMIN, ChainId::AccountChain),
        cache.allocate_next(OTHER, ChainId::AccountChain),
    );
    let elapsed = started.elapsed();

    assert_eq!(a.unwrap(), 1);
    assert_eq!(b.unwrap(), 1);
    assert_eq!(mock.call_count("get_sequence_number"), 2);
    // both seeds overlapped; serialised seeding would take 10s
    assert!(elapsed < Duration::from_secs(10), "elapsed {:?}", elapsed);
}

#[tokio::test(start_paused = true)]
async fn test_reset_during_allocation_waits_for_it() {
    let mock = Arc::new(
        MockChainClient::new(ChainId::AccountChain)
            .with_nonce(9)
            .with_sequence_delay(Duration::from_secs(1)),
    );
    let cache = cache_over(&mock);

    let allocating = {
        let cache = cache.clone();
        tokio::spawn(async move { cache.allocate_next(ADMIN, ChainId::AccountChain).await })
    };
    // let the allocation take the key's lock and start seeding
    tokio::time::sleep(Duration::from_millis(10)).await;
    cache.reset(ADMIN, ChainId::AccountChain).await;

    assert_eq!(allocating.await.unwrap().unwrap(), 9);
    assert_eq!(cache.current(ADMIN, ChainId::AccountChain).await, None);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_admin_builds_get_distinct_nonces() {
    let mock = Arc::new(MockChainClient::new(ChainId::AccountChain).with_nonce(7));
    let cache = cache_over(&mock);
    let builder = Arc::new(AccountTxBuilder::new(
        mock.clone(),
        cache.clone(),
        AccountChainConfig::default(),
        Some(ADMIN.to_string()),
    ));

    let mut tasks = JoinSet::new();
    for i in 0..16u64 {
        let builder = builder.clone();
        tasks.spawn(async move {
            let request = TransactionRequest::transfer(
                ChainId::AccountChain,
                ADMIN,
                OTHER,
                format!("{}.5", i).parse().unwrap(),
            )
            .with_token(TOKEN);
            builder.build(&request).await
        });
    }

    let mut nonces = BTreeSet::new();
    while let Some(joined) = tasks.join_next().await {
        match joined.unwrap().unwrap() {
            UnsignedTransactionBody::Account(body) => assert!(nonces.insert(body.nonce)),
            other => panic!("expected account body, got {:?}", other),
        }
    }

    assert_eq!(nonces, (7..23).collect::<BTreeSet<u64>>());
    assert_eq!(mock.call_count("get_sequence_number"), 1);
}

#[tokio::test]
async fn test_non_admin_builds_bypass_cache() {
    let mock = Arc::new(MockChainClient::new(ChainId::AccountChain).with_nonce(3));
    let cache = cache_over(&mock);
    let builder = AccountTxBuilder::new(
        mock.clone(),
        cache.clone(),
        AccountChainConfig::default(),
        Some(ADMIN.to_string()),
    );

    let request =
        TransactionRequest::transfer(ChainId::AccountChain, OTHER, ADMIN, "1".parse().unwrap());
    for _ in 0..3 {
        match builder.build(&request).await.unwrap() {
            UnsignedTransactionBody::Account(body) => assert_eq!(body.nonce, 3),
            other => panic!("expected account body, got {:?}", other),
        }
    }

    assert!(cache.is_empty());
    assert_eq!(mock.call_count("get_sequence_number"), 3);
}
