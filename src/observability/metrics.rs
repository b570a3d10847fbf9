//! Metrics collection.
//!
//! # Metrics
//! - `multichain_tx_executions_total` (counter): executions by chain, type, outcome
//! - `multichain_tx_rpc_calls_total` (counter): JSON-RPC calls by chain, method, outcome
//! - `multichain_tx_nonce_allocations_total` (counter): nonces handed out by the admin cache
//! - `multichain_tx_nonce_reloads_total` (counter): cache reseeds from chain state
//!
//! # Design Decisions
//! - Recording goes through the `metrics` facade; without an installed
//!   recorder every call is a no-op
//! - Labels are static strings only

use crate::blockchain::types::ChainId;
use crate::transaction::TransactionType;

fn outcome(ok: bool) -> &'static str {
    if ok {
        "success"
    } else {
        "failure"
    }
}

/// Register metric descriptions with the installed recorder.
pub fn describe_metrics() {
    ::metrics::describe_counter!(
        "multichain_tx_executions_total",
        "Transaction executions by chain, type and outcome"
    );
    ::metrics::describe_counter!(
        "multichain_tx_rpc_calls_total",
        "JSON-RPC calls by chain, method and outcome"
    );
    ::metrics::describe_counter!(
        "multichain_tx_nonce_allocations_total",
        "Nonces allocated from the admin nonce cache"
    );
    ::metrics::describe_counter!(
        "multichain_tx_nonce_reloads_total",
        "Admin nonce cache reseeds from chain state"
    );
}

pub fn record_execution(chain: ChainId, tx_type: TransactionType, success: bool) {
    ::metrics::counter!(
        "multichain_tx_executions_total",
        "chain" => chain.as_str(),
        "type" => tx_type.as_str(),
        "outcome" => outcome(success)
    )
    .increment(1);
}

pub fn record_rpc_call(chain: ChainId, method: &'static str, success: bool) {
    ::metrics::counter!(
        "multichain_tx_rpc_calls_total",
        "chain" => chain.as_str(),
        "method" => method,
        "outcome" => outcome(success)
    )
    .increment(1);
}

pub fn record_nonce_allocation(chain: ChainId) {
    ::metrics::counter!("multichain_tx_nonce_allocations_total", "chain" => chain.as_str())
        .increment(1);
}

pub fn record_nonce_reload(chain: ChainId) {
    ::metrics::counter!("multichain_tx_nonce_reloads_total", "chain" => chain.as_str())
        .increment(1);
}
