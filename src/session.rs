// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Invest Hub Contributors

//! Wallet session state.
//!
//! At most one account is connected at a time. Connecting and chain
//! switching are driven by the API layer through the wallet gateway; this
//! module only holds the resulting (address, chain) pair that keys balance
//! reads and transfer dispatch.

use std::sync::Mutex;

use alloy::primitives::Address;

use crate::registry;

/// The connected account and its active chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectedAccount {
    pub address: Address,
    pub chain_id: u64,
}

/// Errors from session operations.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("wallet is not connected")]
    NotConnected,

    #[error("unsupported chain id {0}")]
    UnsupportedChain(u64),
}

/// Shared session handle.
pub struct WalletSession {
    inner: Mutex<Option<ConnectedAccount>>,
}

impl WalletSession {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(None),
        }
    }

    /// The connected account, if any.
    pub fn current(&self) -> Option<ConnectedAccount> {
        *self.lock()
    }

    /// Mark an account as connected on a chain.
    pub fn connect(&self, address: Address, chain_id: u64) -> Result<ConnectedAccount, SessionError> {
        if registry::chain(chain_id).is_none() {
            return Err(SessionError::UnsupportedChain(chain_id));
        }
        let account = ConnectedAccount { address, chain_id };
        *self.lock() = Some(account);
        Ok(account)
    }

    /// Drop the connected account.
    pub fn disconnect(&self) {
        *self.lock() = None;
    }

    /// Switch the active chain for the connected account.
    pub fn switch_chain(&self, chain_id: u64) -> Result<ConnectedAccount, SessionError> {
        if registry::chain(chain_id).is_none() {
            return Err(SessionError::UnsupportedChain(chain_id));
        }
        let mut inner = self.lock();
        let account = inner.as_mut().ok_or(SessionError::NotConnected)?;
        account.chain_id = chain_id;
        Ok(*account)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<ConnectedAccount>> {
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for WalletSession {
    fn default() -> Self {
        Self::new()
    }
}
