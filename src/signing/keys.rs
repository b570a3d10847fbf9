//! Private key handling and key lookup.
//!
//! # Security
//! - Keys are held in [`PrivateKey`], which zeroizes on drop
//! - `Debug` output is redacted
//! - Nothing in here logs key material

use std::fmt;

use async_trait::async_trait;
use dashmap::DashMap;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::blockchain::types::ChainId;
use crate::config::AdminConfig;
use crate::error::{EngineError, EngineResult};

/// Hex-encoded private key, with or without `0x`.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct PrivateKey(String);

impl PrivateKey {
    pub fn new(hex: impl Into<String>) -> Self {
        Self(hex.into())
    }

    /// Raw key text. Callers must not log or persist it.
    pub fn expose_secret(&self) -> &str {
        self.0.trim()
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PrivateKey(<redacted>)")
    }
}

/// Boundary to whatever stores signing keys.
#[async_trait]
pub trait KeyResolver: Send + Sync {
    async fn resolve(&self, chain: ChainId, address: &str) -> EngineResult<PrivateKey>;
}

fn normalise(chain: ChainId, address: &str) -> String {
    match chain {
        ChainId::AccountChain => address.to_ascii_lowercase(),
        ChainId::SequenceChain => address.to_string(),
    }
}

/// In-memory key map, mostly for tests and embedding.
#[derive(Default)]
pub struct StaticKeyResolver {
    keys: DashMap<(ChainId, String), PrivateKey>,
}

impl StaticKeyResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_key(self, chain: ChainId, address: &str, key: PrivateKey) -> Self {
        self.insert(chain, address, key);
        self
    }

    pub fn insert(&self, chain: ChainId, address: &str, key: PrivateKey) {
        self.keys.insert((chain, normalise(chain, address)), key);
    }
}

#[async_trait]
impl KeyResolver for StaticKeyResolver {
    async fn resolve(&self, chain: ChainId, address: &str) -> EngineResult<PrivateKey> {
        self.keys
            .get(&(chain, normalise(chain, address)))
            .map(|entry| entry.value().clone())
            .ok_or_else(|| EngineError::KeyResolution(format!("no key for {} on {}", address, chain)))
    }
}

/// Admin keys read from environment variables at signing time.
pub struct EnvKeyResolver {
    admin: AdminConfig,
}

impl EnvKeyResolver {
    pub fn new(admin: AdminConfig) -> Self {
        Self { admin }
    }

    fn lookup(&self, chain: ChainId) -> (Option<&str>, &str) {
        match chain {
            ChainId::AccountChain => (self.admin.account_address.as_deref(), &self.admin.account_key_env),
            ChainId::SequenceChain => (self.admin.sequence_address.as_deref(), &self.admin.sequence_key_env),
        }
    }
}

#[async_trait]
impl KeyResolver for EnvKeyResolver {
    async fn resolve(&self, chain: ChainId, address: &str) -> EngineResult<PrivateKey> {
        let (admin, env_var) = self.lookup(chain);
        if let Some(admin) = admin {
            if normalise(chain, admin) != normalise(chain, address) {
                return Err(EngineError::KeyResolution(format!(
                    "{} is not the configured {} admin",
                    address, chain
                )));
            }
        }

        let key = std::env::var(env_var).map_err(|_| {
            EngineError::KeyResolution(format!("Environment variable {} not set", env_var))
        })?;
        Ok(PrivateKey::new(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ADMIN: &str = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266";

    #[test]
    fn test_debug_is_redacted() {
        let key = PrivateKey::new("0xdeadbeef");
        assert_eq!(format!("{:?}", key), "PrivateKey(<redacted>)");
        assert_eq!(key.expose_secret(), "0xdeadbeef");
    }

    #[tokio::test]
    async fn test_static_resolver_ignores_hex_case() {
        let resolver =
            StaticKeyResolver::new().with_key(ChainId::AccountChain, ADMIN, PrivateKey::new("aa"));

        let key = resolver
            .resolve(ChainId::AccountChain, &ADMIN.to_lowercase())
            .await
            .unwrap();
        assert_eq!(key.expose_secret(), "aa");

        assert!(matches!(
            resolver.resolve(ChainId::SequenceChain, ADMIN).await,
            Err(EngineError::KeyResolution(_))
        ));
    }

    #[tokio::test]
    async fn test_env_resolver_reads_variable() {
        let admin = AdminConfig {
            account_address: Some(ADMIN.to_string()),
            account_key_env: "MULTICHAIN_TX_TEST_ENV_RESOLVER_KEY".to_string(),
            ..AdminConfig::default()
        };
        std::env::set_var("MULTICHAIN_TX_TEST_ENV_RESOLVER_KEY", "0x01");
        let resolver = EnvKeyResolver::new(admin);

        let key = resolver.resolve(ChainId::AccountChain, ADMIN).await.unwrap();
        assert_eq!(key.expose_secret(), "0x01");

        let other = "0x70997970c51812dc3a010c7d01b50e0d17dc79c8";
        assert!(matches!(
            resolver.resolve(ChainId::AccountChain, other).await,
            Err(EngineError::KeyResolution(_))
        ));
    }

    #[tokio::test]
    async fn test_env_resolver_missing_variable() {
        let admin = AdminConfig {
            sequence_key_env: "MULTICHAIN_TX_TEST_UNSET_KEY".to_string(),
            ..AdminConfig::default()
        };
        let resolver = EnvKeyResolver::new(admin);
        let err = resolver
            .resolve(ChainId::SequenceChain, "anything")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("MULTICHAIN_TX_TEST_UNSET_KEY"));
    }
}
