//! Per-chain client, builder and signer lookup.

use std::sync::Arc;

use crate::blockchain::client::ChainClient;
use crate::blockchain::types::ChainId;
use crate::builder::TransactionBuilder;
use crate::error::{EngineError, EngineResult, ValidationError};
use crate::signing::TransactionSigner;

/// Everything needed to execute on one chain.
#[derive(Clone)]
pub struct ChainStack {
    pub client: Arc<dyn ChainClient>,
    pub builder: Arc<dyn TransactionBuilder>,
    pub signer: Arc<dyn TransactionSigner>,
}

impl ChainStack {
    pub fn new(
        client: Arc<dyn ChainClient>,
        builder: Arc<dyn TransactionBuilder>,
        signer: Arc<dyn TransactionSigner>,
    ) -> Self {
        Self {
            client,
            builder,
            signer,
        }
    }

    pub fn chain(&self) -> ChainId {
        self.client.chain()
    }
}

/// One optional slot per [`ChainId`]. Lookups are an exhaustive match, so a
/// new chain variant will not compile until it gets a slot here.
#[derive(Clone, Default)]
pub struct ChainRegistry {
    account: Option<ChainStack>,
    sequence: Option<ChainStack>,
}

impl ChainRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot_mut(&mut self, chain: ChainId) -> &mut Option<ChainStack> {
        match chain {
            ChainId::AccountChain => &mut self.account,
            ChainId::SequenceChain => &mut self.sequence,
        }
    }

    /// Register a stack under its client's chain. Builder and signer must
    /// serve the same chain.
    pub fn register(&mut self, stack: ChainStack) -> EngineResult<()> {
        let chain = stack.chain();
        for other in [stack.builder.chain(), stack.signer.chain()] {
            if other != chain {
                return Err(ValidationError::WrongChain {
                    request: chain,
                    builder: other,
                }
                .into());
            }
        }
        if self.slot_mut(chain).replace(stack).is_some() {
            tracing::warn!(%chain, "Replaced registered chain stack");
        }
        Ok(())
    }

    pub fn with(mut self, stack: ChainStack) -> EngineResult<Self> {
        self.register(stack)?;
        Ok(self)
    }

    pub fn resolve(&self, chain: ChainId) -> EngineResult<&ChainStack> {
        let slot = match chain {
            ChainId::AccountChain => self.account.as_ref(),
            ChainId::SequenceChain => self.sequence.as_ref(),
        };
        slot.ok_or(EngineError::UnsupportedChain(chain))
    }

    pub fn client(&self, chain: ChainId) -> EngineResult<&Arc<dyn ChainClient>> {
        Ok(&self.resolve(chain)?.client)
    }

    /// Registered chains, AccountChain first.
    pub fn chains(&self) -> Vec<ChainId> {
        ChainId::ALL
            .into_iter()
            .filter(|chain| self.resolve(*chain).is_ok())
            .collect()
    }
}
