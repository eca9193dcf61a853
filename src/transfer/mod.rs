// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Invest Hub Contributors

//! Transfer submission.
//!
//! [`TransferService::submit`] validates a request against the connected
//! session and the active chain's token registry, dispatches it through the
//! wallet gateway, and on success records a pending history entry and hands
//! the hash to the [`watcher::ConfirmationWatcher`]. A signer-side rejection
//! is a cancel, not a failure: no history entry is written.

pub mod watcher;

use std::str::FromStr;
use std::sync::Arc;

use alloy::primitives::{Address, TxHash};
use serde::Deserialize;
use thiserror::Error;
use utoipa::ToSchema;

use crate::chain::{parse_amount, AmountError, ChainError, WalletGateway};
use crate::history::{HistoryStore, TransactionRecord};
use crate::registry::{self, TokenKind, TokenSelector};
use crate::session::WalletSession;
use crate::transfer::watcher::ConfirmationWatcher;

#[derive(Debug, Error)]
pub enum TransferError {
    #[error("no wallet session connected")]
    NotConnected,
    #[error("selected token is not available on the active chain")]
    TokenUnavailable,
    #[error("recipient is not a valid address")]
    InvalidRecipient,
    #[error("invalid amount: {0}")]
    InvalidAmount(#[from] AmountError),
    #[error("amount must be greater than zero")]
    NonPositiveAmount,
    #[error("transaction submission failed: {0}")]
    Submission(String),
}

/// A transfer as requested by the dashboard.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct TransferRequest {
    /// Which of the active chain's assets to send
    pub token: TokenSelector,
    /// Recipient address, 0x-prefixed hex
    #[schema(example = "0x70997970C51812dc3A010C7d01b50e0d17dc79C8")]
    pub recipient: String,
    /// Decimal amount in display units, e.g. "1.5"
    #[schema(example = "1.5")]
    pub amount: String,
}

/// What a submission resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The transaction was handed to the network.
    Submitted {
        hash: TxHash,
        explorer_url: Option<String>,
    },
    /// The signer declined; nothing was sent and nothing was recorded.
    Cancelled,
}

/// Validates, dispatches, and records transfers.
pub struct TransferService {
    session: Arc<WalletSession>,
    gateway: Arc<dyn WalletGateway>,
    history: Arc<HistoryStore>,
    watcher: Arc<ConfirmationWatcher>,
}

impl TransferService {
    pub fn new(
        session: Arc<WalletSession>,
        gateway: Arc<dyn WalletGateway>,
        history: Arc<HistoryStore>,
        watcher: Arc<ConfirmationWatcher>,
    ) -> Self {
        Self {
            session,
            gateway,
            history,
            watcher,
        }
    }

    /// Submit a transfer on the active chain.
    ///
    /// Checks run in a fixed order: connected session, token available on
    /// chain, recipient parses, amount parses, amount positive. The first
    /// failure wins and nothing is dispatched.
    pub async fn submit(&self, request: TransferRequest) -> Result<SubmitOutcome, TransferError> {
        let account = self.session.current().ok_or(TransferError::NotConnected)?;

        let token = registry::token(account.chain_id, request.token)
            .ok_or(TransferError::TokenUnavailable)?;

        let recipient = Address::from_str(request.recipient.trim())
            .map_err(|_| TransferError::InvalidRecipient)?;

        let value = parse_amount(&request.amount, token.decimals)?;
        if value.is_zero() {
            return Err(TransferError::NonPositiveAmount);
        }

        let sent = match token.kind {
            TokenKind::Native => {
                self.gateway
                    .send_native(account.chain_id, recipient, value)
                    .await
            }
            TokenKind::Erc20(contract) => {
                let contract =
                    Address::from_str(contract).map_err(|_| TransferError::TokenUnavailable)?;
                self.gateway
                    .send_token(account.chain_id, contract, recipient, value)
                    .await
            }
        };

        let hash = match sent {
            Ok(hash) => hash,
            Err(ChainError::Rejected) => {
                tracing::info!(
                    chain_id = account.chain_id,
                    token = token.symbol,
                    "transfer cancelled by signer"
                );
                return Ok(SubmitOutcome::Cancelled);
            }
            Err(e) => return Err(TransferError::Submission(e.to_string())),
        };

        tracing::info!(
            %hash,
            chain_id = account.chain_id,
            token = token.symbol,
            amount = %request.amount,
            "transfer submitted"
        );

        let hash_str = hash.to_string();
        let explorer_url = registry::explorer_tx_url(account.chain_id, &hash_str);
        self.history.append(TransactionRecord::new_pending(
            hash_str,
            account.chain_id,
            token.symbol.to_string(),
            request.amount.trim().to_string(),
            recipient.to_string(),
            explorer_url.clone().unwrap_or_default(),
        ));
        self.watcher.track(hash, account.chain_id, account.address);

        Ok(SubmitOutcome::Submitted { hash, explorer_url })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use alloy::primitives::U256;
    use async_trait::async_trait;

    use crate::balances::BalanceCache;
    use crate::chain::{ChainReader, ReceiptInfo, ReceiptStatus, TxDetails};
    use crate::history::TxStatus;

    const RECIPIENT: &str = "0x70997970C51812dc3A010C7d01b50e0d17dc79C8";

    enum GatewayBehavior {
        Accept(TxHash),
        Reject,
        Fail,
    }

    struct FakeGateway {
        behavior: GatewayBehavior,
        sent: Mutex<Vec<(u64, Address, U256)>>,
    }

    impl FakeGateway {
        fn accepting(hash: TxHash) -> Self {
            Self {
                behavior: GatewayBehavior::Accept(hash),
                sent: Mutex::new(Vec::new()),
            }
        }

        fn outcome(&self, chain_id: u64, to: Address, value: U256) -> Result<TxHash, ChainError> {
            match self.behavior {
                GatewayBehavior::Accept(hash) => {
                    self.sent.lock().unwrap().push((chain_id, to, value));
                    Ok(hash)
                }
                GatewayBehavior::Reject => Err(ChainError::Rejected),
                GatewayBehavior::Fail => Err(ChainError::Submit("insufficient funds".into())),
            }
        }
    }

    #[async_trait]
    impl WalletGateway for FakeGateway {
        async fn connect(&self) -> Result<Address, ChainError> {
            Ok(Address::ZERO)
        }

        async fn send_native(
            &self,
            chain_id: u64,
            to: Address,
            value: U256,
        ) -> Result<TxHash, ChainError> {
            self.outcome(chain_id, to, value)
        }

        async fn send_token(
            &self,
            chain_id: u64,
            _contract: Address,
            to: Address,
            value: U256,
        ) -> Result<TxHash, ChainError> {
            self.outcome(chain_id, to, value)
        }
    }

    struct StubReader;

    #[async_trait]
    impl ChainReader for StubReader {
        async fn native_balance(
            &self,
            _chain_id: u64,
            _address: Address,
        ) -> Result<U256, ChainError> {
            Ok(U256::ZERO)
        }

        async fn token_balance(
            &self,
            _chain_id: u64,
            _contract: Address,
            _address: Address,
        ) -> Result<U256, ChainError> {
            Ok(U256::ZERO)
        }

        async fn block_number(&self, _chain_id: u64) -> Result<u64, ChainError> {
            Ok(0)
        }

        async fn transaction_receipt(
            &self,
            _chain_id: u64,
            _hash: TxHash,
        ) -> Result<Option<ReceiptInfo>, ChainError> {
            Ok(Some(ReceiptInfo {
                status: ReceiptStatus::Success,
                block_number: Some(0),
            }))
        }

        async fn transaction_by_hash(
            &self,
            _chain_id: u64,
            _hash: TxHash,
        ) -> Result<Option<TxDetails>, ChainError> {
            Ok(None)
        }
    }

    fn service(gateway: FakeGateway, chain_id: u64) -> (TransferService, Arc<HistoryStore>) {
        let session = Arc::new(WalletSession::new());
        session.connect(Address::ZERO, chain_id).unwrap();
        let history = Arc::new(HistoryStore::new());
        let watcher = Arc::new(ConfirmationWatcher::new(
            Arc::new(StubReader),
            Arc::clone(&history),
            Arc::new(BalanceCache::new()),
        ));
        (
            TransferService::new(session, Arc::new(gateway), Arc::clone(&history), watcher),
            history,
        )
    }

    fn request(token: TokenSelector, amount: &str) -> TransferRequest {
        TransferRequest {
            token,
            recipient: RECIPIENT.into(),
            amount: amount.into(),
        }
    }

    #[tokio::test]
    async fn native_transfer_is_recorded_pending() {
        let hash = TxHash::from([9u8; 32]);
        let (service, history) = service(FakeGateway::accepting(hash), 1);

        let outcome = service
            .submit(request(TokenSelector::Native, "1.5"))
            .await
            .unwrap();

        match outcome {
            SubmitOutcome::Submitted {
                hash: h,
                explorer_url,
            } => {
                assert_eq!(h, hash);
                assert_eq!(
                    explorer_url.unwrap(),
                    format!("https://etherscan.io/tx/{hash}")
                );
            }
            SubmitOutcome::Cancelled => panic!("expected submission"),
        }

        let record = history.get(&hash.to_string()).unwrap();
        assert_eq!(record.status, TxStatus::Pending);
        assert_eq!(record.token_symbol, "ETH");
        assert_eq!(record.amount, "1.5");
        assert_eq!(record.confirmations, Some(0));
    }

    #[tokio::test]
    async fn erc20_value_uses_six_decimals() {
        let hash = TxHash::from([10u8; 32]);
        let gateway = FakeGateway::accepting(hash);
        let session = Arc::new(WalletSession::new());
        session.connect(Address::ZERO, 1).unwrap();
        let history = Arc::new(HistoryStore::new());
        let watcher = Arc::new(ConfirmationWatcher::new(
            Arc::new(StubReader),
            Arc::clone(&history),
            Arc::new(BalanceCache::new()),
        ));
        let gateway = Arc::new(gateway);
        let service = TransferService::new(
            session,
            Arc::clone(&gateway) as Arc<dyn WalletGateway>,
            history,
            watcher,
        );

        service
            .submit(request(TokenSelector::Usdc, "2.5"))
            .await
            .unwrap();

        let sent = gateway.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].2, U256::from(2_500_000u64));
    }

    #[tokio::test]
    async fn zero_amount_is_rejected_before_dispatch() {
        let (service, history) = service(FakeGateway::accepting(TxHash::ZERO), 1);

        let err = service
            .submit(request(TokenSelector::Native, "0"))
            .await
            .unwrap_err();

        assert!(matches!(err, TransferError::NonPositiveAmount));
        assert!(history.records().is_empty());
    }

    #[tokio::test]
    async fn unavailable_token_is_rejected() {
        let (service, history) = service(FakeGateway::accepting(TxHash::ZERO), 11155111);

        let err = service
            .submit(request(TokenSelector::Usdc, "1"))
            .await
            .unwrap_err();

        assert!(matches!(err, TransferError::TokenUnavailable));
        assert!(history.records().is_empty());
    }

    #[tokio::test]
    async fn malformed_recipient_is_rejected() {
        let (service, _history) = service(FakeGateway::accepting(TxHash::ZERO), 1);

        let err = service
            .submit(TransferRequest {
                token: TokenSelector::Native,
                recipient: "not-an-address".into(),
                amount: "1".into(),
            })
            .await
            .unwrap_err();

        assert!(matches!(err, TransferError::InvalidRecipient));
    }

    #[tokio::test]
    async fn disconnected_session_is_rejected_first() {
        let session = Arc::new(WalletSession::new());
        let history = Arc::new(HistoryStore::new());
        let watcher = Arc::new(ConfirmationWatcher::new(
            Arc::new(StubReader),
            Arc::clone(&history),
            Arc::new(BalanceCache::new()),
        ));
        let service = TransferService::new(
            session,
            Arc::new(FakeGateway::accepting(TxHash::ZERO)),
            history,
            watcher,
        );

        let err = service
            .submit(request(TokenSelector::Native, "1"))
            .await
            .unwrap_err();

        assert!(matches!(err, TransferError::NotConnected));
    }

    #[tokio::test]
    async fn signer_rejection_is_a_cancel_with_no_record() {
        let gateway = FakeGateway {
            behavior: GatewayBehavior::Reject,
            sent: Mutex::new(Vec::new()),
        };
        let (service, history) = service(gateway, 1);

        let outcome = service
            .submit(request(TokenSelector::Native, "1"))
            .await
            .unwrap();

        assert_eq!(outcome, SubmitOutcome::Cancelled);
        assert!(history.records().is_empty());
    }

    #[tokio::test]
    async fn submission_failure_surfaces_the_rpc_message() {
        let gateway = FakeGateway {
            behavior: GatewayBehavior::Fail,
            sent: Mutex::new(Vec::new()),
        };
        let (service, history) = service(gateway, 1);

        let err = service
            .submit(request(TokenSelector::Native, "1"))
            .await
            .unwrap_err();

        match err {
            TransferError::Submission(msg) => assert!(msg.contains("insufficient funds")),
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(history.records().is_empty());
    }
}
