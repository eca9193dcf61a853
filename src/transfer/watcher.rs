// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Invest Hub Contributors

//! Confirmation tracking for submitted transfers.
//!
//! Every in-flight hash is polled until its receipt lands. The terminal
//! history transition (confirmed or failed) and the balance invalidation it
//! triggers are applied at most once per hash, no matter how many sweeps
//! observe the same receipt. Confirmed transfers stay watched a little
//! longer so their confirmation count keeps rising toward finality.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;

use alloy::primitives::{Address, TxHash};
use tokio_util::sync::CancellationToken;

use crate::balances::BalanceCache;
use crate::chain::{ChainReader, ReceiptStatus};
use crate::history::{HistoryStore, TransferUpdate};

/// How often the watcher polls for receipts.
pub const POLL_INTERVAL: Duration = Duration::from_secs(4);

/// Confirmation depth after which a confirmed transfer stops being watched.
pub const FINALITY_CONFIRMATIONS: u64 = 12;

/// Consecutive receipt-lookup errors before a watch is declared failed.
///
/// A single RPC hiccup must not finalize a transfer that may confirm on the
/// next block, so errors are retried and the counter resets on any
/// successful lookup.
pub const RECEIPT_ERROR_LIMIT: u32 = 5;

struct WatchEntry {
    chain_id: u64,
    sender: Address,
    /// Set once the sender nonce has been read off the pending transaction.
    nonce_recorded: bool,
    /// Set once the confirmed transition has been applied; the entry then
    /// only feeds confirmation-count updates.
    confirmed: bool,
    /// Consecutive receipt-lookup failures; reset whenever a lookup succeeds.
    receipt_errors: u32,
}

/// Background poller resolving in-flight transfers to a terminal status.
pub struct ConfirmationWatcher {
    reader: Arc<dyn ChainReader>,
    history: Arc<HistoryStore>,
    balances: Arc<BalanceCache>,
    watched: Mutex<HashMap<TxHash, WatchEntry>>,
}

impl ConfirmationWatcher {
    pub fn new(
        reader: Arc<dyn ChainReader>,
        history: Arc<HistoryStore>,
        balances: Arc<BalanceCache>,
    ) -> Self {
        Self {
            reader,
            history,
            balances,
            watched: Mutex::new(HashMap::new()),
        }
    }

    /// Start watching a freshly submitted hash.
    pub fn track(&self, hash: TxHash, chain_id: u64, sender: Address) {
        let mut watched = self.lock();
        if watched.contains_key(&hash) {
            tracing::warn!(%hash, "hash already being watched");
            return;
        }
        watched.insert(
            hash,
            WatchEntry {
                chain_id,
                sender,
                nonce_recorded: false,
                confirmed: false,
                receipt_errors: 0,
            },
        );
    }

    /// Number of hashes currently being watched.
    pub fn watched_count(&self) -> usize {
        self.lock().len()
    }

    /// Run the poll loop until the cancellation token is triggered.
    pub async fn run(self: Arc<Self>, shutdown: CancellationToken) {
        tracing::info!(
            interval_secs = POLL_INTERVAL.as_secs(),
            "confirmation watcher starting"
        );

        loop {
            if shutdown.is_cancelled() {
                tracing::info!("confirmation watcher shutting down");
                return;
            }

            self.sweep_once().await;

            tokio::select! {
                _ = tokio::time::sleep(POLL_INTERVAL) => {},
                _ = shutdown.cancelled() => {
                    tracing::info!("confirmation watcher shutting down");
                    return;
                }
            }
        }
    }

    /// Poll every watched hash once.
    pub(crate) async fn sweep_once(&self) {
        let hashes: Vec<TxHash> = self.lock().keys().copied().collect();
        if hashes.is_empty() {
            return;
        }

        // One height read per chain per sweep.
        let mut heights: HashMap<u64, u64> = HashMap::new();

        for hash in hashes {
            let Some((chain_id, sender, nonce_recorded, confirmed)) = self
                .lock()
                .get(&hash)
                .map(|e| (e.chain_id, e.sender, e.nonce_recorded, e.confirmed))
            else {
                continue;
            };

            if !nonce_recorded {
                self.record_nonce(hash, chain_id).await;
            }

            let receipt = match self.reader.transaction_receipt(chain_id, hash).await {
                Ok(receipt) => {
                    if let Some(entry) = self.lock().get_mut(&hash) {
                        entry.receipt_errors = 0;
                    }
                    receipt
                }
                Err(e) => {
                    let errors = match self.lock().get_mut(&hash) {
                        Some(entry) => {
                            entry.receipt_errors += 1;
                            entry.receipt_errors
                        }
                        None => continue,
                    };

                    if errors < RECEIPT_ERROR_LIMIT {
                        tracing::warn!(%hash, errors, error = %e, "receipt lookup failed, will retry");
                        continue;
                    }

                    tracing::warn!(%hash, errors, error = %e, "receipt watch gave up");
                    self.history.apply(
                        &hash.to_string(),
                        TransferUpdate::failed(format!("receipt watch failed: {e}")),
                    );
                    self.lock().remove(&hash);
                    continue;
                }
            };

            let Some(receipt) = receipt else {
                // Still in the mempool.
                continue;
            };

            match receipt.status {
                ReceiptStatus::Reverted => {
                    tracing::warn!(%hash, chain_id, "transfer reverted on-chain");
                    self.history.apply(
                        &hash.to_string(),
                        TransferUpdate::failed("transaction reverted on-chain"),
                    );
                    self.lock().remove(&hash);
                }
                ReceiptStatus::Success => {
                    let Some(inclusion_block) = receipt.block_number else {
                        continue;
                    };

                    let height = match heights.get(&chain_id) {
                        Some(height) => *height,
                        None => match self.reader.block_number(chain_id).await {
                            Ok(height) => {
                                heights.insert(chain_id, height);
                                height
                            }
                            Err(e) => {
                                tracing::warn!(chain_id, error = %e, "block height lookup failed");
                                continue;
                            }
                        },
                    };

                    let confirmations =
                        height.saturating_sub(inclusion_block).saturating_add(1).max(1);

                    if confirmed {
                        self.history
                            .apply(&hash.to_string(), TransferUpdate::confirmations(confirmations));
                    } else {
                        tracing::info!(%hash, chain_id, confirmations, "transfer confirmed");
                        self.history
                            .apply(&hash.to_string(), TransferUpdate::confirmed(confirmations));
                        self.balances.invalidate_all(sender, chain_id);
                        if let Some(entry) = self.lock().get_mut(&hash) {
                            entry.confirmed = true;
                        }
                    }

                    if confirmations >= FINALITY_CONFIRMATIONS {
                        self.lock().remove(&hash);
                    }
                }
            }
        }
    }

    async fn record_nonce(&self, hash: TxHash, chain_id: u64) {
        match self.reader.transaction_by_hash(chain_id, hash).await {
            Ok(Some(details)) => {
                self.history
                    .apply(&hash.to_string(), TransferUpdate::nonce(details.nonce));
                if let Some(entry) = self.lock().get_mut(&hash) {
                    entry.nonce_recorded = true;
                }
            }
            Ok(None) => {}
            Err(e) => {
                tracing::debug!(%hash, error = %e, "nonce lookup failed, will retry");
            }
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<TxHash, WatchEntry>> {
        self.watched
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
