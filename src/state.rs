// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Invest Hub Contributors

use std::sync::Arc;

use crate::balances::BalanceCache;
use crate::chain::{ChainReader, EvmReader, NoWalletGateway, WalletGateway};
use crate::history::HistoryStore;
use crate::session::WalletSession;
use crate::transfer::watcher::ConfirmationWatcher;
use crate::transfer::TransferService;

/// Shared handles wired together at startup and cloned into every handler.
#[derive(Clone)]
pub struct AppState {
    pub session: Arc<WalletSession>,
    pub history: Arc<HistoryStore>,
    pub balances: Arc<BalanceCache>,
    pub watcher: Arc<ConfirmationWatcher>,
    pub transfers: Arc<TransferService>,
    pub reader: Arc<dyn ChainReader>,
    pub gateway: Arc<dyn WalletGateway>,
    /// Chain selected when a connect request names none.
    pub default_chain_id: u64,
}

impl AppState {
    pub fn new(
        reader: Arc<dyn ChainReader>,
        gateway: Arc<dyn WalletGateway>,
        default_chain_id: u64,
    ) -> Self {
        let session = Arc::new(WalletSession::new());
        let history = Arc::new(HistoryStore::new());
        let balances = Arc::new(BalanceCache::new());
        let watcher = Arc::new(ConfirmationWatcher::new(
            Arc::clone(&reader),
            Arc::clone(&history),
            Arc::clone(&balances),
        ));
        let transfers = Arc::new(TransferService::new(
            Arc::clone(&session),
            Arc::clone(&gateway),
            Arc::clone(&history),
            Arc::clone(&watcher),
        ));

        Self {
            session,
            history,
            balances,
            watcher,
            transfers,
            reader,
            gateway,
            default_chain_id,
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(
            Arc::new(EvmReader::new()),
            Arc::new(NoWalletGateway),
            crate::registry::ETHEREUM_MAINNET_CHAIN_ID,
        )
    }
}
