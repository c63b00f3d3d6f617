//! Polling until a message reaches a status or gets relayed.
//!
//! Every wait polls at the configured interval and stops early on shutdown or
//! once the optional timeout elapses. Transient RPC failures back off
//! exponentially and only abort the wait after `max_poll_failures` in a row.

use std::future::Future;
use std::time::Duration;

use tokio::time::{sleep, Instant};

use crate::bridge::messenger::CrossChainMessenger;
use crate::bridge::status::MessageStatus;
use crate::bridge::types::{BridgeError, BridgeResult, CrossChainMessage, MessageReceipt};
use crate::resilience::backoff::calculate_backoff;

/// Longest pause between polls after repeated failures, in poll intervals.
const MAX_BACKOFF_INTERVALS: u64 = 8;

impl CrossChainMessenger {
    /// Poll until the message has reached `target`.
    ///
    /// Returns the status observed when the wait ended.
    pub async fn wait_for_message_status(
        &self,
        message: &CrossChainMessage,
        target: MessageStatus,
    ) -> BridgeResult<MessageStatus> {
        tracing::info!(message_hash = %message.hash, %target, "Waiting for message status");
        let what = format!("message {} to reach {}", message.hash, target);

        self.poll_until(&what, move || async move {
            let status = self.get_message_status(message).await?;
            if status.has_reached(target, message.direction) {
                Ok(Some(status))
            } else {
                tracing::debug!(message_hash = %message.hash, %status, %target, "Not there yet");
                Ok(None)
            }
        })
        .await
    }

    /// Poll until the message has a relay transaction on the destination chain.
    pub async fn wait_for_message_receipt(&self, message: &CrossChainMessage) -> BridgeResult<MessageReceipt> {
        tracing::info!(message_hash = %message.hash, "Waiting for relay receipt");
        let what = format!("relay of message {}", message.hash);

        self.poll_until(&what, move || async move { self.get_message_receipt(message).await })
            .await
    }

    async fn poll_until<T, F, Fut>(&self, what: &str, mut check: F) -> BridgeResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = BridgeResult<Option<T>>>,
    {
        let interval_ms = self.config.poll_interval_ms.max(1);
        let interval = Duration::from_millis(interval_ms);
        let max_backoff_ms = interval_ms.saturating_mul(MAX_BACKOFF_INTERVALS);
        let deadline = self
            .config
            .wait_timeout_secs
            .map(|secs| (Instant::now() + Duration::from_secs(secs), secs));
        let mut shutdown = self.shutdown.subscribe();
        let mut failures = 0u32;

        loop {
            let delay = match check().await {
                Ok(Some(value)) => return Ok(value),
                Ok(None) => {
                    failures = 0;
                    interval
                }
                Err(e) if e.is_transient() && failures < self.config.max_poll_failures => {
                    failures += 1;
                    let delay = calculate_backoff(failures, interval_ms, max_backoff_ms);
                    tracing::warn!(
                        what,
                        error = %e,
                        failures,
                        delay_ms = delay.as_millis() as u64,
                        "Poll failed, backing off"
                    );
                    delay
                }
                Err(e) => return Err(e),
            };

            if let Some((deadline, secs)) = deadline {
                if Instant::now() + delay > deadline {
                    return Err(BridgeError::WaitTimeout {
                        what: what.to_string(),
                        secs,
                    });
                }
            }

            tokio::select! {
                _ = sleep(delay) => {}
                _ = shutdown.recv() => {
                    tracing::info!(what, "Wait interrupted");
                    return Err(BridgeError::Interrupted);
                }
            }
        }
    }
}
