//! Confirmation polling on top of [`ChainClient::get_status`].

use std::time::Duration;

use tokio::time::{interval, timeout};

use crate::blockchain::client::ChainClient;
use crate::blockchain::types::{ChainError, ChainResult, TxStatus};

/// Poll `get_status` until the transaction leaves `Pending` or the deadline
/// passes. Transient RPC failures are logged and retried on the next tick.
pub async fn wait_for_confirmation(
    client: &dyn ChainClient,
    tx_hash: &str,
    poll_interval: Duration,
    deadline: Duration,
) -> ChainResult<TxStatus> {
    let result = timeout(deadline, async {
        let mut ticker = interval(poll_interval);
        loop {
            ticker.tick().await;

            match client.get_status(tx_hash).await {
                Ok(TxStatus::Pending) => {
                    tracing::debug!(chain = %client.chain(), tx_hash, "Transaction pending");
                }
                Ok(status) => return Ok(status),
                Err(e @ ChainError::InvalidRequest(_)) => return Err(e),
                Err(e) => {
                    tracing::warn!(chain = %client.chain(), tx_hash, error = %e, "Status poll failed");
                }
            }
        }
    })
    .await;

    match result {
        Ok(status) => status,
        Err(_) => Err(ChainError::Timeout(deadline.as_secs())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blockchain::mock::MockChainClient;
    use crate::blockchain::types::ChainId;

    #[tokio::test]
    async fn test_returns_terminal_status() {
        let mock = MockChainClient::new(ChainId::AccountChain).with_status(TxStatus::Confirmed);
        let status = wait_for_confirmation(
            &mock,
            "0xabc",
            Duration::from_millis(5),
            Duration::from_secs(1),
        )
        .await
        .unwrap();
        assert_eq!(status, TxStatus::Confirmed);
        assert_eq!(mock.call_count("get_status"), 1);
    }

    #[tokio::test]
    async fn test_times_out_while_pending() {
        let mock = MockChainClient::new(ChainId::SequenceChain);
        let err = wait_for_confirmation(
            &mock,
            "sig",
            Duration::from_millis(5),
            Duration::from_millis(50),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ChainError::Timeout(_)));
        assert!(mock.call_count("get_status") >= 2);
    }
}
