// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Invest Hub Contributors

//! Alloy-backed [`ChainReader`].
//!
//! One HTTP provider per configured chain, built lazily on first use and
//! cached for the life of the process.

use std::collections::HashMap;
use std::sync::Mutex;

use alloy::{
    consensus::Transaction as _,
    network::Ethereum,
    primitives::{Address, TxHash, U256},
    providers::{
        fillers::{BlobGasFiller, ChainIdFiller, FillProvider, GasFiller, JoinFill, NonceFiller},
        Identity, Provider, ProviderBuilder, RootProvider,
    },
};
use async_trait::async_trait;

use super::erc20::Erc20Contract;
use super::{ChainError, ChainReader, ReceiptInfo, ReceiptStatus, TxDetails};
use crate::registry;

/// HTTP provider type with all fillers.
type HttpProvider = FillProvider<
    JoinFill<
        Identity,
        JoinFill<GasFiller, JoinFill<BlobGasFiller, JoinFill<NonceFiller, ChainIdFiller>>>,
    >,
    RootProvider<Ethereum>,
>;

/// Read-only client over the registry's chains.
pub struct EvmReader {
    providers: Mutex<HashMap<u64, HttpProvider>>,
}

impl EvmReader {
    pub fn new() -> Self {
        Self {
            providers: Mutex::new(HashMap::new()),
        }
    }

    /// Get (or lazily build) the provider for a chain.
    fn provider(&self, chain_id: u64) -> Result<HttpProvider, ChainError> {
        let mut providers = self
            .providers
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        if let Some(provider) = providers.get(&chain_id) {
            return Ok(provider.clone());
        }

        let config = registry::chain(chain_id).ok_or(ChainError::UnsupportedChain(chain_id))?;
        let url: url::Url = config
            .rpc_url
            .parse()
            .map_err(|e: url::ParseError| ChainError::InvalidRpcUrl(e.to_string()))?;

        let provider = ProviderBuilder::new().connect_http(url);
        providers.insert(chain_id, provider.clone());
        Ok(provider)
    }
}

impl Default for EvmReader {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ChainReader for EvmReader {
    async fn native_balance(&self, chain_id: u64, address: Address) -> Result<U256, ChainError> {
        let provider = self.provider(chain_id)?;
        provider
            .get_balance(address)
            .await
            .map_err(|e| ChainError::Rpc(e.to_string()))
    }

    async fn token_balance(
        &self,
        chain_id: u64,
        contract: Address,
        address: Address,
    ) -> Result<U256, ChainError> {
        let provider = self.provider(chain_id)?;
        Erc20Contract::new(&provider, contract)
            .balance_of(address)
            .await
    }

    async fn block_number(&self, chain_id: u64) -> Result<u64, ChainError> {
        let provider = self.provider(chain_id)?;
        provider
            .get_block_number()
            .await
            .map_err(|e| ChainError::Rpc(e.to_string()))
    }

    async fn transaction_receipt(
        &self,
        chain_id: u64,
        hash: TxHash,
    ) -> Result<Option<ReceiptInfo>, ChainError> {
        let provider = self.provider(chain_id)?;
        let receipt = provider
            .get_transaction_receipt(hash)
            .await
            .map_err(|e| ChainError::Rpc(e.to_string()))?;

        Ok(receipt.map(|r| ReceiptInfo {
            status: if r.status() {
                ReceiptStatus::Success
            } else {
                ReceiptStatus::Reverted
            },
            block_number: r.block_number,
        }))
    }

    async fn transaction_by_hash(
        &self,
        chain_id: u64,
        hash: TxHash,
    ) -> Result<Option<TxDetails>, ChainError> {
        let provider = self.provider(chain_id)?;
        let tx = provider
            .get_transaction_by_hash(hash)
            .await
            .map_err(|e| ChainError::Rpc(e.to_string()))?;

        Ok(tx.map(|tx| TxDetails { nonce: tx.nonce() }))
    }
}
