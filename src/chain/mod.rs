// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Invest Hub Contributors

//! Chain access capabilities.
//!
//! The dashboard core never talks to a node or a signer directly. It goes
//! through two narrow traits: [`ChainReader`] for read-only chain state and
//! [`WalletGateway`] for signing and broadcasting. The live implementations
//! sit on alloy providers; tests substitute fakes.

use alloy::primitives::{Address, TxHash, U256};
use async_trait::async_trait;

pub mod amount;
pub mod erc20;
pub mod gateway;
pub mod reader;

pub use amount::{format_amount, parse_amount, AmountError};
pub use gateway::LocalKeyGateway;
pub use reader::EvmReader;

/// Inclusion outcome reported by a transaction receipt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReceiptStatus {
    Success,
    Reverted,
}

/// The slice of a receipt the confirmation tracker needs.
#[derive(Debug, Clone)]
pub struct ReceiptInfo {
    pub status: ReceiptStatus,
    /// Block the transaction was included in; absent until inclusion is
    /// visible to the queried node.
    pub block_number: Option<u64>,
}

/// The slice of a fetched transaction the tracker needs.
#[derive(Debug, Clone)]
pub struct TxDetails {
    /// Sender-scoped sequence number, displayed in history.
    pub nonce: u64,
}

/// Errors from chain access.
///
/// `Rejected` is the user declining the signing prompt; it is a distinct,
/// non-failure outcome and callers must not log it as an error.
#[derive(Debug, thiserror::Error)]
pub enum ChainError {
    #[error("transaction signing was rejected")]
    Rejected,

    #[error("no signing wallet is configured")]
    NotConfigured,

    #[error("unsupported chain id {0}")]
    UnsupportedChain(u64),

    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("invalid RPC URL: {0}")]
    InvalidRpcUrl(String),

    #[error("RPC error: {0}")]
    Rpc(String),

    #[error("contract error: {0}")]
    Contract(String),

    #[error("failed to submit transaction: {0}")]
    Submit(String),
}

/// Read-only chain state.
#[async_trait]
pub trait ChainReader: Send + Sync {
    /// Native balance of an address, in wei.
    async fn native_balance(&self, chain_id: u64, address: Address) -> Result<U256, ChainError>;

    /// ERC-20 `balanceOf`, in the token's base units.
    async fn token_balance(
        &self,
        chain_id: u64,
        contract: Address,
        address: Address,
    ) -> Result<U256, ChainError>;

    /// Current chain height.
    async fn block_number(&self, chain_id: u64) -> Result<u64, ChainError>;

    /// Receipt for a transaction, `None` while it is still pending.
    async fn transaction_receipt(
        &self,
        chain_id: u64,
        hash: TxHash,
    ) -> Result<Option<ReceiptInfo>, ChainError>;

    /// Transaction detail by hash, `None` when the node does not know it.
    async fn transaction_by_hash(
        &self,
        chain_id: u64,
        hash: TxHash,
    ) -> Result<Option<TxDetails>, ChainError>;
}

/// Signing and broadcasting.
///
/// Implementations must map a user declining the signing prompt to
/// [`ChainError::Rejected`] so the orchestrator can treat it as a
/// cancellation rather than a failure.
#[async_trait]
pub trait WalletGateway: Send + Sync {
    /// Establish the wallet session and return its account address.
    async fn connect(&self) -> Result<Address, ChainError>;

    /// Sign and broadcast a native-value transfer.
    async fn send_native(
        &self,
        chain_id: u64,
        to: Address,
        value: U256,
    ) -> Result<TxHash, ChainError>;

    /// Sign and broadcast an ERC-20 `transfer(recipient, amount)` call.
    async fn send_token(
        &self,
        chain_id: u64,
        contract: Address,
        to: Address,
        value: U256,
    ) -> Result<TxHash, ChainError>;
}

/// Gateway used when no signing key is configured.
///
/// Keeps the read paths of the service alive while every signing operation
/// reports `NotConfigured`.
pub struct NoWalletGateway;

#[async_trait]
impl WalletGateway for NoWalletGateway {
    async fn connect(&self) -> Result<Address, ChainError> {
        Err(ChainError::NotConfigured)
    }

    async fn send_native(
        &self,
        _chain_id: u64,
        _to: Address,
        _value: U256,
    ) -> Result<TxHash, ChainError> {
        Err(ChainError::NotConfigured)
    }

    async fn send_token(
        &self,
        _chain_id: u64,
        _contract: Address,
        _to: Address,
        _value: U256,
    ) -> Result<TxHash, ChainError> {
        Err(ChainError::NotConfigured)
    }
}
