// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Invest Hub Contributors

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::balances::{AssetKind, BalanceState};
use crate::chain::ChainError;
use crate::error::ApiError;
use crate::registry;
use crate::session::{ConnectedAccount, SessionError};
use crate::state::AppState;

#[derive(Debug, Deserialize, ToSchema)]
pub struct ConnectRequest {
    /// Chain to connect on; defaults to the configured default chain.
    #[schema(example = 1)]
    pub chain_id: Option<u64>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SwitchChainRequest {
    #[schema(example = 8453)]
    pub chain_id: u64,
}

/// The connection panel: who is connected, where, and their native balance.
#[derive(Debug, Serialize, ToSchema)]
pub struct SessionResponse {
    pub connected: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chain_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chain_name: Option<String>,
    /// Cached native balance, formatted; absent until the first refresh lands.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub native_balance: Option<String>,
}

fn session_response(state: &AppState, account: Option<ConnectedAccount>) -> SessionResponse {
    let Some(account) = account else {
        return SessionResponse {
            connected: false,
            address: None,
            chain_id: None,
            chain_name: None,
            native_balance: None,
        };
    };

    let native_balance = state
        .balances
        .snapshot(account.address, account.chain_id)
        .into_iter()
        .find_map(|(asset, balance)| match (asset, balance) {
            (AssetKind::Native, BalanceState::Value { formatted, symbol, .. }) => {
                Some(format!("{formatted} {symbol}"))
            }
            _ => None,
        });

    SessionResponse {
        connected: true,
        address: Some(account.address.to_string()),
        chain_id: Some(account.chain_id),
        chain_name: registry::chain(account.chain_id).map(|c| c.name.to_string()),
        native_balance,
    }
}

impl From<SessionError> for ApiError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::NotConnected => ApiError::conflict(err.to_string()),
            SessionError::UnsupportedChain(_) => ApiError::bad_request(err.to_string()),
        }
    }
}

#[utoipa::path(
    get,
    path = "/v1/session",
    tag = "Session",
    responses((status = 200, body = SessionResponse))
)]
pub async fn get_session(State(state): State<AppState>) -> Json<SessionResponse> {
    let account = state.session.current();
    Json(session_response(&state, account))
}

#[utoipa::path(
    post,
    path = "/v1/session/connect",
    request_body = ConnectRequest,
    tag = "Session",
    responses(
        (status = 201, body = SessionResponse),
        (status = 409, description = "No wallet key configured")
    )
)]
pub async fn connect(
    State(state): State<AppState>,
    Json(request): Json<ConnectRequest>,
) -> Result<(StatusCode, Json<SessionResponse>), ApiError> {
    let address = state.gateway.connect().await.map_err(|e| match e {
        ChainError::NotConfigured => ApiError::conflict(e.to_string()),
        other => ApiError::service_unavailable(other.to_string()),
    })?;

    let chain_id = request.chain_id.unwrap_or(state.default_chain_id);
    let account = state.session.connect(address, chain_id)?;
    state.balances.request_refresh();

    tracing::info!(address = %account.address, chain_id, "wallet connected");
    Ok((
        StatusCode::CREATED,
        Json(session_response(&state, Some(account))),
    ))
}

#[utoipa::path(
    post,
    path = "/v1/session/disconnect",
    tag = "Session",
    responses((status = 204))
)]
pub async fn disconnect(State(state): State<AppState>) -> StatusCode {
    if let Some(account) = state.session.current() {
        state.balances.invalidate_all(account.address, account.chain_id);
        tracing::info!(address = %account.address, "wallet disconnected");
    }
    state.session.disconnect();
    StatusCode::NO_CONTENT
}

#[utoipa::path(
    put,
    path = "/v1/session/chain",
    request_body = SwitchChainRequest,
    tag = "Session",
    responses(
        (status = 200, body = SessionResponse),
        (status = 400, description = "Unsupported chain id"),
        (status = 409, description = "No session connected")
    )
)]
pub async fn switch_chain(
    State(state): State<AppState>,
    Json(request): Json<SwitchChainRequest>,
) -> Result<Json<SessionResponse>, ApiError> {
    let account = state.session.switch_chain(request.chain_id)?;
    state.balances.request_refresh();

    tracing::info!(chain_id = request.chain_id, "active chain switched");
    Ok(Json(session_response(&state, Some(account))))
}
