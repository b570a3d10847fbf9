//! JSON-RPC transport with timeout and failover.
//!
//! # Responsibilities
//! - POST JSON-RPC 2.0 envelopes over HTTP
//! - Bound every call with a timeout
//! - Fail over to secondary endpoints for reads
//! - Map error objects and malformed replies onto [`ChainError`]

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use alloy::primitives::U256;
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::time::timeout;
use url::Url;

use crate::blockchain::types::{ChainError, ChainId, ChainResult};
use crate::observability::metrics;

/// HTTP JSON-RPC client bound to one chain.
pub struct JsonRpcTransport {
    chain: ChainId,
    http: reqwest::Client,
    primary: Url,
    failovers: Vec<Url>,
    timeout_duration: Duration,
    next_id: AtomicU64,
}

#[derive(Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcErrorObject>,
}

#[derive(Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
}

impl RpcResponse {
    fn into_result(self) -> ChainResult<Value> {
        match self.error {
            Some(err) => Err(ChainError::Rpc {
                code: err.code,
                message: err.message,
            }),
            None => Ok(self.result.unwrap_or(Value::Null)),
        }
    }
}

impl JsonRpcTransport {
    /// Create a transport. Invalid failover URLs are skipped with a warning;
    /// an invalid primary URL is an error.
    pub fn new(
        chain: ChainId,
        rpc_url: &str,
        failover_urls: &[String],
        timeout_secs: u64,
    ) -> ChainResult<Self> {
        let primary: Url = rpc_url
            .parse()
            .map_err(|e| ChainError::Network(format!("Invalid RPC URL '{}': {}", rpc_url, e)))?;

        let mut failovers = Vec::new();
        for url_str in failover_urls {
            match url_str.parse() {
                Ok(url) => failovers.push(url),
                Err(_) => tracing::warn!(%chain, url = %url_str, "Ignoring invalid failover RPC URL"),
            }
        }

        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| ChainError::Network(format!("HTTP client init failed: {}", e)))?;

        tracing::info!(
            %chain,
            rpc_url = %primary,
            failovers = failovers.len(),
            timeout_secs,
            "JSON-RPC transport initialized"
        );

        Ok(Self {
            chain,
            http,
            primary,
            failovers,
            timeout_duration: Duration::from_secs(timeout_secs),
            next_id: AtomicU64::new(1),
        })
    }

    pub fn chain(&self) -> ChainId {
        self.chain
    }

    /// Read call. Transport failures and timeouts move on to the next
    /// endpoint; a JSON-RPC error object is an answer and is returned as is.
    pub async fn call(&self, method: &'static str, params: Value) -> ChainResult<Value> {
        let endpoints = std::iter::once(&self.primary).chain(self.failovers.iter());
        let mut last_error = None;

        for (i, endpoint) in endpoints.enumerate() {
            match self.send(endpoint, method, params.clone()).await {
                Ok(value) => return Ok(value),
                Err(e @ (ChainError::Network(_) | ChainError::Timeout(_))) => {
                    tracing::warn!(
                        chain = %self.chain,
                        provider_idx = i,
                        method,
                        error = %e,
                        "RPC error, trying next provider"
                    );
                    last_error = Some(e);
                }
                Err(e) => return Err(e),
            }
        }

        match last_error {
            Some(ChainError::Timeout(secs)) => Err(ChainError::Timeout(secs)),
            Some(e) => Err(ChainError::Network(format!(
                "All RPC providers failed for {}: {}",
                method, e
            ))),
            None => Err(ChainError::Network("All RPC providers failed".to_string())),
        }
    }

    /// Single attempt against the primary endpoint. Used for broadcasts,
    /// which must not be replayed against another node.
    pub async fn call_once(&self, method: &'static str, params: Value) -> ChainResult<Value> {
        self.send(&self.primary, method, params).await
    }

    async fn send(&self, endpoint: &Url, method: &'static str, params: Value) -> ChainResult<Value> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });

        let request = async {
            let response = self
                .http
                .post(endpoint.clone())
                .json(&body)
                .send()
                .await
                .map_err(|e| ChainError::Network(e.to_string()))?;

            let status = response.status();
            if !status.is_success() {
                return Err(ChainError::Network(format!("HTTP {} from {}", status, endpoint)));
            }

            response
                .json::<RpcResponse>()
                .await
                .map_err(|e| ChainError::InvalidResponse(format!("{}: {}", method, e)))
        };

        let outcome = match timeout(self.timeout_duration, request).await {
            Ok(Ok(response)) => response.into_result(),
            Ok(Err(e)) => Err(e),
            Err(_) => Err(ChainError::Timeout(self.timeout_duration.as_secs())),
        };

        metrics::record_rpc_call(self.chain, method, outcome.is_ok());
        tracing::debug!(chain = %self.chain, method, id, ok = outcome.is_ok(), "RPC call");
        outcome
    }
}

impl std::fmt::Debug for JsonRpcTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonRpcTransport")
            .field("chain", &self.chain)
            .field("primary", &self.primary.as_str())
            .field("failovers", &self.failovers.len())
            .field("timeout_secs", &self.timeout_duration.as_secs())
            .finish()
    }
}

fn hex_digits<'a>(value: &'a Value, what: &str) -> ChainResult<&'a str> {
    let s = value
        .as_str()
        .ok_or_else(|| ChainError::InvalidResponse(format!("{} is not a hex string: {}", what, value)))?;
    let digits = s
        .strip_prefix("0x")
        .ok_or_else(|| ChainError::InvalidResponse(format!("{} lacks 0x prefix: {}", what, s)))?;
    Ok(if digits.is_empty() { "0" } else { digits })
}

/// Parse a `0x`-prefixed quantity into `u64`.
pub(crate) fn parse_hex_u64(value: &Value, what: &str) -> ChainResult<u64> {
    let digits = hex_digits(value, what)?;
    u64::from_str_radix(digits, 16)
        .map_err(|e| ChainError::InvalidResponse(format!("{} '{}': {}", what, digits, e)))
}

/// Parse a `0x`-prefixed quantity into `U256`.
pub(crate) fn parse_hex_u256(value: &Value, what: &str) -> ChainResult<U256> {
    let digits = hex_digits(value, what)?;
    U256::from_str_radix(digits, 16)
        .map_err(|e| ChainError::InvalidResponse(format!("{} '{}': {}", what, digits, e)))
}
