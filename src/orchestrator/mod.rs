//! Transaction orchestrator.
//!
//! # Data Flow
//! ```text
//! TransactionRequest
//!     → ChainRegistry::resolve(chain)        unsupported → failure, no calls
//!     → KeyResolver + check_key(from)        wrong or missing key → failure, no calls
//!     → Building:     TransactionBuilder     (nonce cache for admin senders)
//!     → Signing:      TransactionSigner      (key must sign as the body's sender)
//!     → Broadcasting: ChainClient::broadcast (exactly once)
//!     → Done:         TransactionResult
//! ```
//!
//! # Design Decisions
//! - `execute` never returns an error; every failure becomes a
//!   `TransactionResult` with detail `"<type> failed: <cause>"`
//! - Stages only move forward and none is re-entered
//! - No retries inside `execute`; `retry_with_reloaded_nonce` is an explicit
//!   caller decision

pub mod registry;

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use uuid::Uuid;

use crate::blockchain::types::ChainId;
use crate::blockchain::{AccountChainClient, ChainClient, SequenceChainClient};
use crate::builder::{AccountTxBuilder, SequenceTxBuilder};
use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::nonce::{AdminNonceCache, NonceAllocator};
use crate::observability::metrics;
use crate::signing::{AccountSigner, KeyResolver, SequenceSigner};
use crate::transaction::{TransactionRequest, TransactionResult, NO_HASH_RETURNED};

pub use registry::{ChainRegistry, ChainStack};

/// Position of one execution in the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionStage {
    Building,
    Signing,
    Broadcasting,
    Done,
}

impl fmt::Display for ExecutionStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ExecutionStage::Building => "building",
            ExecutionStage::Signing => "signing",
            ExecutionStage::Broadcasting => "broadcasting",
            ExecutionStage::Done => "done",
        };
        f.write_str(label)
    }
}

/// Single entry point for executing transactions on any registered chain.
pub struct TransactionOrchestrator {
    registry: ChainRegistry,
    keys: Arc<dyn KeyResolver>,
    nonces: Option<Arc<dyn NonceAllocator>>,
}

impl TransactionOrchestrator {
    pub fn new(registry: ChainRegistry, keys: Arc<dyn KeyResolver>) -> Self {
        Self {
            registry,
            keys,
            nonces: None,
        }
    }

    /// Nonce cache used by `retry_with_reloaded_nonce`. Should be the same
    /// instance the AccountChain builder allocates from.
    pub fn with_nonce_allocator(mut self, nonces: Arc<dyn NonceAllocator>) -> Self {
        self.nonces = Some(nonces);
        self
    }

    /// Wire up every enabled chain from configuration.
    pub fn from_config(config: &EngineConfig, keys: Arc<dyn KeyResolver>) -> EngineResult<Self> {
        let mut registry = ChainRegistry::new();
        let mut nonces: Option<Arc<dyn NonceAllocator>> = None;

        for chain in ChainId::ALL {
            match chain {
                ChainId::AccountChain if config.account_chain.enabled => {
                    let cfg = config.account_chain.clone();
                    let client: Arc<dyn ChainClient> =
                        Arc::new(AccountChainClient::new(cfg.clone())?);
                    let cache: Arc<dyn NonceAllocator> =
                        Arc::new(AdminNonceCache::new(client.clone()));
                    let builder = AccountTxBuilder::new(
                        client.clone(),
                        cache.clone(),
                        cfg.clone(),
                        config.admin.account_address.clone(),
                    );
                    registry.register(ChainStack::new(
                        client,
                        Arc::new(builder),
                        Arc::new(AccountSigner::new(cfg.evm_chain_id)),
                    ))?;
                    nonces = Some(cache);
                }
                ChainId::SequenceChain if config.sequence_chain.enabled => {
                    let cfg = config.sequence_chain.clone();
                    let client: Arc<dyn ChainClient> =
                        Arc::new(SequenceChainClient::new(cfg.clone())?);
                    registry.register(ChainStack::new(
                        client.clone(),
                        Arc::new(SequenceTxBuilder::new(client, cfg)),
                        Arc::new(SequenceSigner::new()),
                    ))?;
                }
                _ => tracing::debug!(%chain, "Chain disabled"),
            }
        }

        tracing::info!(chains = ?registry.chains(), "Transaction orchestrator ready");
        let orchestrator = Self::new(registry, keys);
        Ok(match nonces {
            Some(nonces) => orchestrator.with_nonce_allocator(nonces),
            None => orchestrator,
        })
    }

    pub fn registry(&self) -> &ChainRegistry {
        &self.registry
    }

    pub fn nonce_allocator(&self) -> Option<&Arc<dyn NonceAllocator>> {
        self.nonces.as_ref()
    }

    /// Build, sign and broadcast `request`. Always returns a result.
    #[tracing::instrument(
        name = "execute",
        skip(self, request),
        fields(chain = %request.chain, tx_type = %request.tx_type, from = %request.from)
    )]
    pub async fn execute(&self, request: &TransactionRequest) -> TransactionResult {
        let result = self.run(request).await;
        metrics::record_execution(request.chain, request.tx_type, result.is_success());
        if result.is_success() {
            tracing::info!(
                hash = result.transaction_hash().unwrap_or_default(),
                signer = result.signer(),
                "Transaction broadcast"
            );
        } else {
            tracing::warn!(detail = result.detail(), "Transaction failed");
        }
        result
    }

    async fn run(&self, request: &TransactionRequest) -> TransactionResult {
        let chain = request.chain;
        let failure = |id: Uuid, signer: &str, cause: &dyn fmt::Display| {
            TransactionResult::failure(
                id,
                signer.to_string(),
                chain,
                format!("{} failed: {}", request.tx_type, cause),
            )
        };
        let request_id = Uuid::new_v4();

        let stack = match self.registry.resolve(chain) {
            Ok(stack) => stack,
            Err(e) => return failure(request_id, &request.from, &e),
        };

        // key must belong to the sender before any nonce is allocated
        let key = match self.keys.resolve(chain, &request.from).await {
            Ok(key) => key,
            Err(e) => return failure(request_id, &request.from, &e),
        };
        if let Err(e) = stack.signer.check_key(&request.from, &key) {
            return failure(request_id, &request.from, &EngineError::from(e));
        }

        let mut stage = ExecutionStage::Building;
        tracing::debug!(%stage, "Stage entered");
        let body = match stack.builder.build(request).await {
            Ok(body) => body,
            Err(e) => return failure(request_id, &request.from, &e),
        };

        stage = ExecutionStage::Signing;
        tracing::debug!(%stage, "Stage entered");
        let mut signed = match stack.signer.sign(&body, &key) {
            Ok(signed) => signed,
            Err(e) => return failure(request_id, &request.from, &EngineError::from(e)),
        };

        stage = ExecutionStage::Broadcasting;
        tracing::debug!(%stage, "Stage entered");
        let signer = signed.signer().to_string();
        let broadcast = stack.client.broadcast(signed.encoded()).await;

        stage = ExecutionStage::Done;
        tracing::debug!(%stage, "Stage entered");
        match broadcast {
            Ok(Some(hash)) if !hash.trim().is_empty() => {
                if let Err(e) = signed.mark_pending(hash.clone()) {
                    tracing::warn!(error = %e, "Unexpected status transition");
                }
                TransactionResult::success(signed.id(), hash, signer, chain, request.summary())
            }
            Ok(_) => {
                let _ = signed.mark_failed();
                failure(signed.id(), &signer, &NO_HASH_RETURNED)
            }
            Err(e) => {
                let _ = signed.mark_failed();
                let cause = format!("{} ({})", NO_HASH_RETURNED, e);
                failure(signed.id(), &signer, &cause)
            }
        }
    }

    /// `execute` bounded by `limit`. A timeout is a failure; whatever was
    /// in flight is dropped.
    pub async fn execute_with_timeout(
        &self,
        request: &TransactionRequest,
        limit: Duration,
    ) -> TransactionResult {
        match tokio::time::timeout(limit, self.execute(request)).await {
            Ok(result) => result,
            Err(_) => {
                metrics::record_execution(request.chain, request.tx_type, false);
                tracing::warn!(chain = %request.chain, timeout_ms = limit.as_millis() as u64, "Execution timed out");
                TransactionResult::failure(
                    Uuid::new_v4(),
                    request.from.clone(),
                    request.chain,
                    format!(
                        "{} failed: timed out after {} ms",
                        request.tx_type,
                        limit.as_millis()
                    ),
                )
            }
        }
    }

    /// Reseed the sender's cached nonce from the chain, then execute again.
    ///
    /// For callers that suspect an earlier attempt left the cache ahead of or
    /// behind the chain. SequenceChain requests simply execute again with a
    /// fresh blockhash.
    pub async fn retry_with_reloaded_nonce(&self, request: &TransactionRequest) -> TransactionResult {
        match (request.chain, &self.nonces) {
            (ChainId::AccountChain, Some(nonces)) if request.nonce.is_none() => {
                match nonces.force_reload(&request.from, request.chain).await {
                    Ok(nonce) => tracing::info!(from = %request.from, nonce, "Retrying with reloaded nonce"),
                    Err(e) => {
                        return TransactionResult::failure(
                            Uuid::new_v4(),
                            request.from.clone(),
                            request.chain,
                            format!("{} failed: {}", request.tx_type, e),
                        )
                    }
                }
            }
            (ChainId::AccountChain, _) | (ChainId::SequenceChain, _) => {}
        }
        self.execute(request).await
    }
}
