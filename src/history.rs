// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Invest Hub Contributors

//! Session-local transaction history.
//!
//! An in-memory, newest-first log of submitted transfers, capped at the 20
//! most recent records. The store is the sole owner of its records; the
//! orchestrator and the confirmation watcher mutate them only through
//! [`HistoryStore::append`] and [`HistoryStore::apply`].
//!
//! Updates to one record arrive from three independent asynchronous sources
//! (receipt, block-height poll, transaction-detail fetch) in arbitrary
//! order. `apply` is therefore a field-level merge: each field is merged
//! independently, commutatively, with two guards — status moves only
//! forward (pending is never re-entered), and confirmations never decrease
//! outside the failed transition.

use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Most recent records kept per session.
pub const HISTORY_CAPACITY: usize = 20;

/// Transaction status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum TxStatus {
    /// Submitted but not yet confirmed
    Pending,
    /// Receipt reported success
    Confirmed,
    /// Receipt reported revert, or the receipt watch failed
    Failed,
}

impl TxStatus {
    /// Confirmed and failed are terminal; no record re-enters pending.
    pub fn is_terminal(self) -> bool {
        matches!(self, TxStatus::Confirmed | TxStatus::Failed)
    }
}

/// One submitted transfer as shown in the history card.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TransactionRecord {
    /// Transaction hash (0x prefixed); unique within the store
    pub hash: String,
    /// Chain the transfer was submitted on
    pub chain_id: u64,
    /// Symbol of the transferred token
    pub token_symbol: String,
    /// Amount exactly as entered in the form
    pub amount: String,
    /// Recipient address
    pub recipient: String,
    /// Current status
    pub status: TxStatus,
    /// When the transfer was submitted
    pub submitted_at: DateTime<Utc>,
    /// Number of confirmations observed so far
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confirmations: Option<u64>,
    /// Sender nonce, once the transaction detail has been fetched
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nonce: Option<u64>,
    /// Failure detail, present only on failed records
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    /// Block explorer URL for the hash
    pub explorer_url: String,
}

impl TransactionRecord {
    /// Create a new pending record at submission time.
    pub fn new_pending(
        hash: String,
        chain_id: u64,
        token_symbol: String,
        amount: String,
        recipient: String,
        explorer_url: String,
    ) -> Self {
        Self {
            hash,
            chain_id,
            token_symbol,
            amount,
            recipient,
            status: TxStatus::Pending,
            submitted_at: Utc::now(),
            confirmations: Some(0),
            nonce: None,
            error_message: None,
            explorer_url,
        }
    }
}

/// Partial update merged into a record by hash.
///
/// Absent fields are left untouched, which is what makes concurrent updates
/// from independent sources safe to apply in any order.
#[derive(Debug, Clone, Default)]
pub struct TransferUpdate {
    pub status: Option<TxStatus>,
    pub confirmations: Option<u64>,
    pub nonce: Option<u64>,
    pub error_message: Option<String>,
}

impl TransferUpdate {
    /// Terminal success: confirmed with the observed confirmation count.
    pub fn confirmed(confirmations: u64) -> Self {
        Self {
            status: Some(TxStatus::Confirmed),
            confirmations: Some(confirmations),
            ..Self::default()
        }
    }

    /// Terminal failure with a human-readable message.
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            status: Some(TxStatus::Failed),
            confirmations: Some(0),
            error_message: Some(message.into()),
            ..Self::default()
        }
    }

    /// Confirmation count only.
    pub fn confirmations(count: u64) -> Self {
        Self {
            confirmations: Some(count),
            ..Self::default()
        }
    }

    /// Nonce only.
    pub fn nonce(nonce: u64) -> Self {
        Self {
            nonce: Some(nonce),
            ..Self::default()
        }
    }
}

/// In-memory history store, injected as a shared handle.
///
/// Reset with the session; never persisted.
pub struct HistoryStore {
    records: Mutex<Vec<TransactionRecord>>,
}

impl HistoryStore {
    pub fn new() -> Self {
        Self {
            records: Mutex::new(Vec::new()),
        }
    }

    /// Prepend a record and truncate to [`HISTORY_CAPACITY`].
    ///
    /// A duplicate hash is a no-op: the hash is the identity of a record
    /// and is assigned exactly once per successful dispatch.
    pub fn append(&self, record: TransactionRecord) -> bool {
        let mut records = self.lock();
        if records.iter().any(|r| r.hash == record.hash) {
            tracing::warn!(hash = %record.hash, "duplicate history append ignored");
            return false;
        }
        records.insert(0, record);
        records.truncate(HISTORY_CAPACITY);
        true
    }

    /// Merge a partial update into the record with the given hash.
    ///
    /// No-op when the hash is absent. Returns whether anything changed, so
    /// duplicate signals are observable as no-ops.
    pub fn apply(&self, hash: &str, update: TransferUpdate) -> bool {
        let mut records = self.lock();
        let Some(record) = records.iter_mut().find(|r| r.hash == hash) else {
            return false;
        };

        let mut changed = false;

        if let Some(next) = update.status {
            if !record.status.is_terminal() && next != record.status {
                record.status = next;
                changed = true;
                match next {
                    TxStatus::Confirmed => {
                        // A confirmed record carries no failure detail.
                        record.error_message = None;
                    }
                    TxStatus::Failed => {
                        // The failed transition is the one place the
                        // confirmation count may reset.
                        record.confirmations = Some(update.confirmations.unwrap_or(0));
                        record.error_message = update.error_message.clone();
                        return true;
                    }
                    TxStatus::Pending => {}
                }
            }
        }

        if let Some(count) = update.confirmations {
            if record.status != TxStatus::Failed
                && record.confirmations.is_none_or(|current| count > current)
            {
                record.confirmations = Some(count);
                changed = true;
            }
        }

        if let Some(nonce) = update.nonce {
            if record.nonce != Some(nonce) {
                record.nonce = Some(nonce);
                changed = true;
            }
        }

        changed
    }

    /// Snapshot of all records, newest first.
    pub fn records(&self) -> Vec<TransactionRecord> {
        self.lock().clone()
    }

    /// Snapshot of one record by hash.
    pub fn get(&self, hash: &str) -> Option<TransactionRecord> {
        self.lock().iter().find(|r| r.hash == hash).cloned()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<TransactionRecord>> {
        self.records
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for HistoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(hash: &str) -> TransactionRecord {
        TransactionRecord::new_pending(
            hash.to_string(),
            1,
            "ETH".to_string(),
            "1.5".to_string(),
            "0x2222222222222222222222222222222222222222".to_string(),
            format!("https://etherscan.io/tx/{hash}"),
        )
    }

    #[test]
    fn append_prepends_newest_first() {
        let store = HistoryStore::new();
        assert!(store.append(record("0x1")));
        assert!(store.append(record("0x2")));

        let records = store.records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].hash, "0x2");
        assert_eq!(records[1].hash, "0x1");
    }

    #[test]
    fn append_caps_at_twenty() {
        let store = HistoryStore::new();
        for i in 0..30 {
            store.append(record(&format!("0x{i}")));
        }

        let records = store.records();
        assert_eq!(records.len(), HISTORY_CAPACITY);
        assert_eq!(records[0].hash, "0x29");
        assert_eq!(records[HISTORY_CAPACITY - 1].hash, "0x10");
    }

    #[test]
    fn append_ignores_duplicate_hash() {
        let store = HistoryStore::new();
        assert!(store.append(record("0x1")));
        assert!(!store.append(record("0x1")));
        assert_eq!(store.records().len(), 1);
    }

    #[test]
    fn apply_to_missing_hash_is_noop() {
        let store = HistoryStore::new();
        assert!(!store.apply("0xmissing", TransferUpdate::confirmed(1)));
    }

    #[test]
    fn confirm_sets_status_and_count() {
        let store = HistoryStore::new();
        store.append(record("0x1"));

        assert!(store.apply("0x1", TransferUpdate::confirmed(3)));

        let rec = store.get("0x1").unwrap();
        assert_eq!(rec.status, TxStatus::Confirmed);
        assert_eq!(rec.confirmations, Some(3));
        assert!(rec.error_message.is_none());
    }

    #[test]
    fn fail_attaches_message_and_resets_confirmations() {
        let store = HistoryStore::new();
        store.append(record("0x1"));
        store.apply("0x1", TransferUpdate::confirmations(2));

        assert!(store.apply("0x1", TransferUpdate::failed("reverted on chain")));

        let rec = store.get("0x1").unwrap();
        assert_eq!(rec.status, TxStatus::Failed);
        assert_eq!(rec.confirmations, Some(0));
        assert_eq!(rec.error_message.as_deref(), Some("reverted on chain"));
    }

    #[test]
    fn terminal_status_never_regresses() {
        let store = HistoryStore::new();
        store.append(record("0x1"));
        store.apply("0x1", TransferUpdate::failed("reverted"));

        // A late confirmation signal must not resurrect the record.
        store.apply("0x1", TransferUpdate::confirmed(5));

        let rec = store.get("0x1").unwrap();
        assert_eq!(rec.status, TxStatus::Failed);
        assert_eq!(rec.confirmations, Some(0));
        assert_eq!(rec.error_message.as_deref(), Some("reverted"));
    }

    #[test]
    fn confirmed_is_not_overwritten_by_late_failure() {
        let store = HistoryStore::new();
        store.append(record("0x1"));
        store.apply("0x1", TransferUpdate::confirmed(1));

        store.apply("0x1", TransferUpdate::failed("out of order"));

        let rec = store.get("0x1").unwrap();
        assert_eq!(rec.status, TxStatus::Confirmed);
        assert!(rec.error_message.is_none());
    }

    #[test]
    fn confirmations_are_monotone() {
        let store = HistoryStore::new();
        store.append(record("0x1"));

        assert!(store.apply("0x1", TransferUpdate::confirmations(3)));
        // Lower and equal counts are ignored.
        assert!(!store.apply("0x1", TransferUpdate::confirmations(2)));
        assert!(!store.apply("0x1", TransferUpdate::confirmations(3)));
        assert!(store.apply("0x1", TransferUpdate::confirmations(4)));

        assert_eq!(store.get("0x1").unwrap().confirmations, Some(4));
    }

    #[test]
    fn confirmation_updates_skip_failed_records() {
        let store = HistoryStore::new();
        store.append(record("0x1"));
        store.apply("0x1", TransferUpdate::failed("dropped"));

        assert!(!store.apply("0x1", TransferUpdate::confirmations(7)));
        assert_eq!(store.get("0x1").unwrap().confirmations, Some(0));
    }

    #[test]
    fn duplicate_terminal_signals_change_nothing() {
        let store = HistoryStore::new();
        store.append(record("0x1"));

        assert!(store.apply("0x1", TransferUpdate::confirmed(1)));
        assert!(!store.apply("0x1", TransferUpdate::confirmed(1)));

        store.append(record("0x2"));
        assert!(store.apply("0x2", TransferUpdate::failed("reverted")));
        assert!(!store.apply("0x2", TransferUpdate::failed("reverted")));
    }

    #[test]
    fn nonce_merges_independently_of_status() {
        let store = HistoryStore::new();
        store.append(record("0x1"));
        store.apply("0x1", TransferUpdate::confirmed(1));

        assert!(store.apply("0x1", TransferUpdate::nonce(42)));
        assert!(!store.apply("0x1", TransferUpdate::nonce(42)));

        let rec = store.get("0x1").unwrap();
        assert_eq!(rec.nonce, Some(42));
        assert_eq!(rec.status, TxStatus::Confirmed);
    }

    #[test]
    fn merge_order_does_not_matter_for_independent_fields() {
        // nonce then confirm vs confirm then nonce converge to the same record.
        let a = HistoryStore::new();
        a.append(record("0x1"));
        a.apply("0x1", TransferUpdate::nonce(7));
        a.apply("0x1", TransferUpdate::confirmed(2));

        let b = HistoryStore::new();
        b.append(record("0x1"));
        b.apply("0x1", TransferUpdate::confirmed(2));
        b.apply("0x1", TransferUpdate::nonce(7));

        let ra = a.get("0x1").unwrap();
        let rb = b.get("0x1").unwrap();
        assert_eq!(ra.status, rb.status);
        assert_eq!(ra.confirmations, rb.confirmations);
        assert_eq!(ra.nonce, rb.nonce);
    }
}
