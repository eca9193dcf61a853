// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Invest Hub Contributors

//! Alloy-backed [`WalletGateway`] over a locally held private key.
//!
//! A headless signer never shows a prompt, so this implementation never
//! produces [`ChainError::Rejected`]; that variant belongs to interactive
//! wallet gateways (and to the fakes in the orchestrator tests).

use std::collections::HashMap;
use std::sync::Mutex;

use alloy::{
    network::{Ethereum, EthereumWallet},
    primitives::{Address, TxHash, U256},
    providers::{
        fillers::{
            BlobGasFiller, ChainIdFiller, FillProvider, GasFiller, JoinFill, NonceFiller,
            WalletFiller,
        },
        Identity, Provider, ProviderBuilder, RootProvider,
    },
    rpc::types::TransactionRequest,
    signers::local::PrivateKeySigner,
    sol_types::SolCall,
};
use async_trait::async_trait;

use super::erc20::IERC20;
use super::{ChainError, WalletGateway};
use crate::registry;

/// HTTP provider type with signing and all fillers.
type SigningProvider = FillProvider<
    JoinFill<
        JoinFill<
            Identity,
            JoinFill<GasFiller, JoinFill<BlobGasFiller, JoinFill<NonceFiller, ChainIdFiller>>>,
        >,
        WalletFiller<EthereumWallet>,
    >,
    RootProvider<Ethereum>,
>;

/// Signing gateway backed by a local private key.
pub struct LocalKeyGateway {
    address: Address,
    wallet: EthereumWallet,
    providers: Mutex<HashMap<u64, SigningProvider>>,
}

impl LocalKeyGateway {
    /// Create a gateway from a hex-encoded private key (with or without a
    /// leading `0x`).
    pub fn from_hex(private_key_hex: &str) -> Result<Self, ChainError> {
        let stripped = private_key_hex
            .strip_prefix("0x")
            .unwrap_or(private_key_hex);
        let key_bytes = alloy::hex::decode(stripped)
            .map_err(|e| ChainError::InvalidAddress(format!("invalid private key: {e}")))?;
        let signer = PrivateKeySigner::from_slice(&key_bytes)
            .map_err(|e| ChainError::InvalidAddress(format!("invalid private key: {e}")))?;

        let address = signer.address();
        Ok(Self {
            address,
            wallet: EthereumWallet::from(signer),
            providers: Mutex::new(HashMap::new()),
        })
    }

    /// The account address this gateway signs for.
    pub fn address(&self) -> Address {
        self.address
    }

    /// Get (or lazily build) the signing provider for a chain.
    fn provider(&self, chain_id: u64) -> Result<SigningProvider, ChainError> {
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

        let provider = ProviderBuilder::new()
            .wallet(self.wallet.clone())
            .connect_http(url);
        providers.insert(chain_id, provider.clone());
        Ok(provider)
    }

    /// Broadcast a filled transaction request and return its hash.
    async fn submit(
        &self,
        chain_id: u64,
        tx: TransactionRequest,
    ) -> Result<TxHash, ChainError> {
        let provider = self.provider(chain_id)?;
        let pending = provider
            .send_transaction(tx)
            .await
            .map_err(|e| ChainError::Submit(e.to_string()))?;
        Ok(*pending.tx_hash())
    }
}

#[async_trait]
impl WalletGateway for LocalKeyGateway {
    async fn connect(&self) -> Result<Address, ChainError> {
        Ok(self.address)
    }

    async fn send_native(
        &self,
        chain_id: u64,
        to: Address,
        value: U256,
    ) -> Result<TxHash, ChainError> {
        let tx = TransactionRequest::default().to(to).value(value);
        self.submit(chain_id, tx).await
    }

    async fn send_token(
        &self,
        chain_id: u64,
        contract: Address,
        to: Address,
        value: U256,
    ) -> Result<TxHash, ChainError> {
        let call = IERC20::transferCall { to, amount: value };
        let data = call.abi_encode();

        let tx = TransactionRequest::default().to(contract).input(data.into());
        self.submit(chain_id, tx).await
    }
}
