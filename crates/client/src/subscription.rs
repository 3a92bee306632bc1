//! Chain-change notifications.
//!
//! Wallets reached over plain JSON-RPC cannot push events, so the active
//! chain is polled on an interval and changes are published on a watch
//! channel. The polling task lives exactly as long as its
//! [`ChainSubscription`] handle.

use crate::wallet::Wallet;
use std::{sync::Arc, time::Duration};
use tokio::{sync::watch, task::JoinHandle, time};
use tracing::{debug, warn};

/// Handle to a running chain watcher.
///
/// Dropping the handle (or calling [`ChainSubscription::unsubscribe`]) stops
/// the watcher, so reconnecting never leaves a stale watcher behind.
pub struct ChainSubscription {
    receiver: watch::Receiver<Option<u64>>,
    handle: JoinHandle<()>,
}

impl ChainSubscription {
    /// Start watching the chain id reported by `wallet`.
    pub fn spawn<W>(wallet: Arc<W>, poll_interval: Duration) -> Self
    where
        W: Wallet + 'static,
    {
        let (sender, receiver) = watch::channel(None);

        let handle = tokio::spawn(async move {
            let mut interval = time::interval(poll_interval);

            loop {
                interval.tick().await;

                if sender.is_closed() {
                    debug!("Chain subscription has no receivers, stopping");
                    break;
                }

                match wallet.chain_id().await {
                    Ok(chain_id) => {
                        sender.send_if_modified(|current| {
                            if *current == Some(chain_id) {
                                return false;
                            }
                            debug!(previous = ?current, chain_id, "Chain changed");
                            *current = Some(chain_id);
                            true
                        });
                    }
                    Err(e) => warn!(error = %e, "Failed to poll wallet chain id"),
                }
            }
        });

        Self { receiver, handle }
    }

    /// Wait for the next chain change.
    ///
    /// Returns `None` once the watcher has stopped.
    pub async fn changed(&mut self) -> Option<u64> {
        self.receiver.changed().await.ok()?;
        *self.receiver.borrow_and_update()
    }

    /// Stop watching.
    pub fn unsubscribe(self) {
        self.handle.abort();
    }
}

impl Drop for ChainSubscription {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
