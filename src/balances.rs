// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Invest Hub Contributors

//! Balance query layer.
//!
//! For the connected account and active chain the dashboard shows three
//! assets: the native currency, USDC, and USDT. Each is an independent read
//! keyed by (asset, account, chain), refreshed on a fixed interval while a
//! session is connected and suspended otherwise. A missing token
//! configuration renders as "unsupported", which is distinct from a failed
//! read.
//!
//! Writers never touch the cache directly to refresh it; they invalidate,
//! and the poller refetches on its next sweep (woken immediately via
//! [`tokio::sync::Notify`]).

use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;

use alloy::primitives::Address;
use serde::Serialize;
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;
use utoipa::ToSchema;

use crate::chain::{format_amount, ChainReader};
use crate::registry::{self, TokenKind, TokenSelector};
use crate::session::WalletSession;

/// Fixed refresh interval while a session is connected.
pub const REFRESH_INTERVAL: Duration = Duration::from_secs(20);

/// The assets shown on the balance card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum AssetKind {
    Native,
    Usdc,
    Usdt,
}

/// Display order of the balance rows.
pub const ASSETS: [AssetKind; 3] = [AssetKind::Native, AssetKind::Usdc, AssetKind::Usdt];

impl AssetKind {
    fn selector(self) -> TokenSelector {
        match self {
            AssetKind::Native => TokenSelector::Native,
            AssetKind::Usdc => TokenSelector::Usdc,
            AssetKind::Usdt => TokenSelector::Usdt,
        }
    }
}

/// Observable state of one balance read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BalanceState {
    /// The token is not configured on the active chain.
    Unsupported,
    /// No result yet (first read, or invalidated and refetching).
    Loading,
    /// The read failed; distinct from "unsupported".
    Errored(String),
    /// A successfully read balance.
    Value {
        /// Balance in base units
        raw: String,
        /// Balance formatted at the asset's declared decimals
        formatted: String,
        symbol: String,
        decimals: u8,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct AssetKey {
    account: Address,
    chain_id: u64,
    asset: AssetKind,
}

/// Shared balance cache.
pub struct BalanceCache {
    slots: Mutex<HashMap<AssetKey, BalanceState>>,
    refresh: Notify,
}

impl BalanceCache {
    pub fn new() -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
            refresh: Notify::new(),
        }
    }

    /// Current state of the three balance rows for an account on a chain.
    ///
    /// Entries the poller has not written yet report `Loading` when the
    /// token is configured and `Unsupported` when it is not.
    pub fn snapshot(&self, account: Address, chain_id: u64) -> Vec<(AssetKind, BalanceState)> {
        let slots = self.lock();
        ASSETS
            .iter()
            .map(|&asset| {
                let key = AssetKey {
                    account,
                    chain_id,
                    asset,
                };
                let state = slots.get(&key).cloned().unwrap_or_else(|| {
                    if registry::token(chain_id, asset.selector()).is_some() {
                        BalanceState::Loading
                    } else {
                        BalanceState::Unsupported
                    }
                });
                (asset, state)
            })
            .collect()
    }

    /// Drop all three cached reads for an account on a chain and wake the
    /// poller, so the next snapshot shows `Loading` until fresh values land.
    pub fn invalidate_all(&self, account: Address, chain_id: u64) {
        {
            let mut slots = self.lock();
            for asset in ASSETS {
                slots.remove(&AssetKey {
                    account,
                    chain_id,
                    asset,
                });
            }
        }
        self.refresh.notify_one();
    }

    /// Wake the poller without dropping any cached state.
    pub fn request_refresh(&self) {
        self.refresh.notify_one();
    }

    /// Wait until someone requests a refresh.
    pub(crate) async fn refresh_requested(&self) {
        self.refresh.notified().await;
    }

    fn set(&self, key: AssetKey, state: BalanceState) {
        self.lock().insert(key, state);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<AssetKey, BalanceState>> {
        self.slots
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for BalanceCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Background task refreshing the balance cache.
pub struct BalancePoller {
    reader: Arc<dyn ChainReader>,
    session: Arc<WalletSession>,
    cache: Arc<BalanceCache>,
    refresh_interval: Duration,
}

impl BalancePoller {
    pub fn new(
        reader: Arc<dyn ChainReader>,
        session: Arc<WalletSession>,
        cache: Arc<BalanceCache>,
    ) -> Self {
        Self {
            reader,
            session,
            cache,
            refresh_interval: REFRESH_INTERVAL,
        }
    }

    /// Run the poll loop until the cancellation token is triggered.
    ///
    /// Should be spawned as a background task:
    /// ```rust,ignore
    /// tokio::spawn(poller.run(shutdown.clone()));
    /// ```
    pub async fn run(self, shutdown: CancellationToken) {
        tracing::info!(
            interval_secs = self.refresh_interval.as_secs(),
            "balance poller starting"
        );

        loop {
            if shutdown.is_cancelled() {
                tracing::info!("balance poller shutting down");
                return;
            }

            self.sweep_once().await;

            tokio::select! {
                _ = tokio::time::sleep(self.refresh_interval) => {},
                _ = self.cache.refresh_requested() => {},
                _ = shutdown.cancelled() => {
                    tracing::info!("balance poller shutting down");
                    return;
                }
            }
        }
    }

    /// Execute one refresh sweep; suspended while no session is connected.
    pub(crate) async fn sweep_once(&self) {
        let Some(account) = self.session.current() else {
            return;
        };

        for asset in ASSETS {
            let key = AssetKey {
                account: account.address,
                chain_id: account.chain_id,
                asset,
            };

            let Some(descriptor) = registry::token(account.chain_id, asset.selector()) else {
                self.cache.set(key, BalanceState::Unsupported);
                continue;
            };

            let result = match descriptor.kind {
                TokenKind::Native => {
                    self.reader
                        .native_balance(account.chain_id, account.address)
                        .await
                }
                TokenKind::Erc20(contract) => match Address::from_str(contract) {
                    Ok(contract) => {
                        self.reader
                            .token_balance(account.chain_id, contract, account.address)
                            .await
                    }
                    Err(e) => {
                        self.cache.set(key, BalanceState::Errored(e.to_string()));
                        continue;
                    }
                },
            };

            match result {
                Ok(raw) => self.cache.set(
                    key,
                    BalanceState::Value {
                        raw: raw.to_string(),
                        formatted: format_amount(raw, descriptor.decimals),
                        symbol: descriptor.symbol.to_string(),
                        decimals: descriptor.decimals,
                    },
                ),
                Err(e) => {
                    tracing::warn!(
                        chain_id = account.chain_id,
                        asset = ?asset,
                        error = %e,
                        "balance read failed"
                    );
                    self.cache.set(key, BalanceState::Errored(e.to_string()));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::{TxHash, U256};
    use async_trait::async_trait;

    use crate::chain::{ChainError, ReceiptInfo, TxDetails};

    /// Reader with fixed balances; token reads can be forced to fail.
    struct FakeReader {
        native: U256,
        token: U256,
        fail_tokens: bool,
    }

    #[async_trait]
    impl ChainReader for FakeReader {
        async fn native_balance(
            &self,
            _chain_id: u64,
            _address: Address,
        ) -> Result<U256, ChainError> {
            Ok(self.native)
        }

        async fn token_balance(
            &self,
            _chain_id: u64,
            _contract: Address,
            _address: Address,
        ) -> Result<U256, ChainError> {
            if self.fail_tokens {
                Err(ChainError::Rpc("token read timed out".into()))
            } else {
                Ok(self.token)
            }
        }

        async fn block_number(&self, _chain_id: u64) -> Result<u64, ChainError> {
            Ok(0)
        }

        async fn transaction_receipt(
            &self,
            _chain_id: u64,
            _hash: TxHash,
        ) -> Result<Option<ReceiptInfo>, ChainError> {
            Ok(None)
        }

        async fn transaction_by_hash(
            &self,
            _chain_id: u64,
            _hash: TxHash,
        ) -> Result<Option<TxDetails>, ChainError> {
            Ok(None)
        }
    }

    fn poller(reader: FakeReader, chain_id: Option<u64>) -> (BalancePoller, Arc<BalanceCache>) {
        let session = Arc::new(WalletSession::new());
        if let Some(chain_id) = chain_id {
            session.connect(Address::ZERO, chain_id).unwrap();
        }
        let cache = Arc::new(BalanceCache::new());
        (
            BalancePoller::new(Arc::new(reader), session, Arc::clone(&cache)),
            cache,
        )
    }

    fn state_of(snapshot: &[(AssetKind, BalanceState)], asset: AssetKind) -> &BalanceState {
        &snapshot.iter().find(|(a, _)| *a == asset).unwrap().1
    }

    #[tokio::test]
    async fn sweep_fills_all_three_rows_on_mainnet() {
        let reader = FakeReader {
            native: U256::from(1_500_000_000_000_000_000u64),
            token: U256::from(2_500_000u64),
            fail_tokens: false,
        };
        let (poller, cache) = poller(reader, Some(1));

        poller.sweep_once().await;

        let snapshot = cache.snapshot(Address::ZERO, 1);
        match state_of(&snapshot, AssetKind::Native) {
            BalanceState::Value {
                formatted, symbol, ..
            } => {
                assert_eq!(formatted, "1.5");
                assert_eq!(symbol, "ETH");
            }
            other => panic!("unexpected native state: {other:?}"),
        }
        match state_of(&snapshot, AssetKind::Usdc) {
            BalanceState::Value {
                formatted, decimals, ..
            } => {
                assert_eq!(formatted, "2.5");
                assert_eq!(*decimals, 6);
            }
            other => panic!("unexpected usdc state: {other:?}"),
        }
    }

    #[tokio::test]
    async fn stablecoins_are_unsupported_on_sepolia() {
        let reader = FakeReader {
            native: U256::from(10u64),
            token: U256::ZERO,
            fail_tokens: false,
        };
        let (poller, cache) = poller(reader, Some(11155111));

        poller.sweep_once().await;

        let snapshot = cache.snapshot(Address::ZERO, 11155111);
        assert!(matches!(
            state_of(&snapshot, AssetKind::Native),
            BalanceState::Value { .. }
        ));
        assert_eq!(
            state_of(&snapshot, AssetKind::Usdc),
            &BalanceState::Unsupported
        );
        assert_eq!(
            state_of(&snapshot, AssetKind::Usdt),
            &BalanceState::Unsupported
        );
    }

    #[tokio::test]
    async fn failed_reads_are_errored_not_unsupported() {
        let reader = FakeReader {
            native: U256::from(10u64),
            token: U256::ZERO,
            fail_tokens: true,
        };
        let (poller, cache) = poller(reader, Some(1));

        poller.sweep_once().await;

        let snapshot = cache.snapshot(Address::ZERO, 1);
        assert!(matches!(
            state_of(&snapshot, AssetKind::Usdc),
            BalanceState::Errored(_)
        ));
        assert!(matches!(
            state_of(&snapshot, AssetKind::Native),
            BalanceState::Value { .. }
        ));
    }

    #[tokio::test]
    async fn sweep_is_suspended_while_disconnected() {
        let reader = FakeReader {
            native: U256::from(10u64),
            token: U256::ZERO,
            fail_tokens: false,
        };
        let (poller, cache) = poller(reader, None);

        poller.sweep_once().await;

        // Nothing was written; snapshot falls back to loading/unsupported.
        let snapshot = cache.snapshot(Address::ZERO, 1);
        assert_eq!(state_of(&snapshot, AssetKind::Native), &BalanceState::Loading);
    }

    #[tokio::test]
    async fn invalidate_resets_rows_to_loading() {
        let reader = FakeReader {
            native: U256::from(10u64),
            token: U256::from(10u64),
            fail_tokens: false,
        };
        let (poller, cache) = poller(reader, Some(1));

        poller.sweep_once().await;
        cache.invalidate_all(Address::ZERO, 1);

        let snapshot = cache.snapshot(Address::ZERO, 1);
        assert_eq!(state_of(&snapshot, AssetKind::Native), &BalanceState::Loading);
        assert_eq!(state_of(&snapshot, AssetKind::Usdc), &BalanceState::Loading);

        // The next sweep repopulates.
        poller.sweep_once().await;
        let snapshot = cache.snapshot(Address::ZERO, 1);
        assert!(matches!(
            state_of(&snapshot, AssetKind::Native),
            BalanceState::Value { .. }
        ));
    }
}
