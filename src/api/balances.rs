// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Invest Hub Contributors

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::balances::{AssetKind, BalanceState};
use crate::error::ApiError;
use crate::state::AppState;

/// One row of the balance card.
#[derive(Debug, Serialize, ToSchema)]
pub struct BalanceRow {
    pub asset: AssetKind,
    /// "ok", "loading", "error", or "unsupported"
    pub state: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub formatted: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decimals: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl BalanceRow {
    fn from_state(asset: AssetKind, state: BalanceState) -> Self {
        let mut row = Self {
            asset,
            state: String::new(),
            raw: None,
            formatted: None,
            symbol: None,
            decimals: None,
            error: None,
        };

        match state {
            BalanceState::Unsupported => row.state = "unsupported".to_string(),
            BalanceState::Loading => row.state = "loading".to_string(),
            BalanceState::Errored(message) => {
                row.state = "error".to_string();
                row.error = Some(message);
            }
            BalanceState::Value {
                raw,
                formatted,
                symbol,
                decimals,
            } => {
                row.state = "ok".to_string();
                row.raw = Some(raw);
                row.formatted = Some(formatted);
                row.symbol = Some(symbol);
                row.decimals = Some(decimals);
            }
        }

        row
    }
}

#[utoipa::path(
    get,
    path = "/v1/balances",
    tag = "Balances",
    responses(
        (status = 200, body = [BalanceRow]),
        (status = 409, description = "No session connected")
    )
)]
pub async fn list_balances(
    State(state): State<AppState>,
) -> Result<Json<Vec<BalanceRow>>, ApiError> {
    let account = state
        .session
        .current()
        .ok_or_else(|| ApiError::conflict("no wallet session connected"))?;

    let rows = state
        .balances
        .snapshot(account.address, account.chain_id)
        .into_iter()
        .map(|(asset, balance)| BalanceRow::from_state(asset, balance))
        .collect();

    Ok(Json(rows))
}

#[utoipa::path(
    post,
    path = "/v1/balances/refresh",
    tag = "Balances",
    responses(
        (status = 202, description = "Refresh scheduled"),
        (status = 409, description = "No session connected")
    )
)]
pub async fn refresh_balances(State(state): State<AppState>) -> Result<StatusCode, ApiError> {
    if state.session.current().is_none() {
        return Err(ApiError::conflict("no wallet session connected"));
    }
    state.balances.request_refresh();
    Ok(StatusCode::ACCEPTED)
}
