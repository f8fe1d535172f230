//! Event subscription.
//!
//! Keeps a `RaffleEnter` subscription alive and forwards every delivered log to the synchronizer.

use std::time::Duration;

use alloy::transports::{RpcError, TransportError};
use anyhow::Result;
use backoff::{future::retry, Error as BackoffError, ExponentialBackoff};
use futures::StreamExt;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use crate::{sync::RaffleUpdate, RaffleEvents};

const SUBSCRIBER_TAG: &str = "\x1b[35m[Subscriber]\x1b[0m";

/// The backoff used to (re-)establish the `RaffleEnter` subscription.
///
/// There is no overall deadline: the subscription is retried for as long as the client runs.
#[must_use]
pub fn subscription_backoff() -> ExponentialBackoff {
    ExponentialBackoff {
        initial_interval: Duration::from_secs(1),
        max_interval: Duration::from_secs(60),
        max_elapsed_time: None,
        ..Default::default()
    }
}

/// Execute an async operation with exponential backoff retries.
///
/// Transport failures are retried; anything else (e.g. an error response from the node) is
/// permanent.
pub async fn retry_operation<T, F, Fut>(
    operation: F,
    backoff: ExponentialBackoff,
    operation_name: &str,
) -> Result<T>
where
    F: Fn() -> Fut,
    Fut: std::future::Future<Output = Result<T>>,
{
    retry(backoff, || async {
        operation().await.map_err(|e| {
            if is_transient(&e) {
                warn!("Transient error when {}: {:#}, retrying...", operation_name, e);
                BackoffError::transient(e)
            } else {
                error!("Permanent error when {}: {:#}", operation_name, e);
                BackoffError::permanent(e)
            }
        })
    })
    .await
}

/// Returns whether an error is worth retrying.
fn is_transient(e: &anyhow::Error) -> bool {
    if let Some(rpc) = e.downcast_ref::<TransportError>() {
        return matches!(rpc, RpcError::Transport(_) | RpcError::NullResp);
    }

    // Check for common transport errors.
    let error_msg = e.to_string().to_lowercase();
    error_msg.contains("tls handshake")
        || error_msg.contains("dns error")
        || error_msg.contains("connection reset")
        || error_msg.contains("connection refused")
        || error_msg.contains("broken pipe")
        || error_msg.contains("transport error")
        || error_msg.contains("failed to lookup")
        || error_msg.contains("timeout")
        || error_msg.contains("deadline exceeded")
}

/// Subscribes to `RaffleEnter` and sends one [`RaffleUpdate::PlayerEntered`] per delivered log.
///
/// Logs are not deduplicated. When the subscription fails or its stream ends, it is re-established
/// with `backoff`. Returns once the synchronizer has stopped listening, or with an error if the
/// subscription fails permanently.
pub async fn forward_entries<E: RaffleEvents + ?Sized>(
    events: &E,
    updates: &mpsc::Sender<RaffleUpdate>,
    backoff: ExponentialBackoff,
) -> Result<()> {
    let pause = backoff.initial_interval;
    loop {
        let mut stream =
            retry_operation(|| events.subscribe(), backoff.clone(), "subscribing to RaffleEnter")
                .await?;
        info!("{SUBSCRIBER_TAG} Subscribed to RaffleEnter.");

        while let Some(delivery) = stream.next().await {
            match delivery {
                Ok(player) => {
                    if updates.send(RaffleUpdate::PlayerEntered { player }).await.is_err() {
                        info!("{SUBSCRIBER_TAG} Synchronizer stopped, closing subscription.");
                        return Ok(());
                    }
                }
                Err(e) => {
                    warn!(error = %e, "{SUBSCRIBER_TAG} Subscription failed.");
                    break;
                }
            }
        }

        if updates.is_closed() {
            return Ok(());
        }
        warn!(pause = ?pause, "{SUBSCRIBER_TAG} Subscription ended, resubscribing...");
        tokio::time::sleep(pause).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_errors_are_transient() {
        let e = anyhow::anyhow!("error sending request: connection refused");
        assert!(is_transient(&e));
        let e = anyhow::Error::from(<TransportError>::NullResp);
        assert!(is_transient(&e));
    }

    #[test]
    fn test_other_errors_are_permanent() {
        let e = anyhow::anyhow!("filter not found");
        assert!(!is_transient(&e));
    }
}
