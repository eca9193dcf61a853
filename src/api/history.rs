// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Invest Hub Contributors

use axum::{
    extract::{Path, State},
    Json,
};

use crate::error::ApiError;
use crate::history::TransactionRecord;
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/v1/history",
    tag = "History",
    responses((status = 200, body = [TransactionRecord]))
)]
pub async fn list_history(State(state): State<AppState>) -> Json<Vec<TransactionRecord>> {
    Json(state.history.records())
}

#[utoipa::path(
    get,
    path = "/v1/history/{hash}",
    params(
        ("hash" = String, Path, description = "Transaction hash, 0x-prefixed")
    ),
    tag = "History",
    responses(
        (status = 200, body = TransactionRecord),
        (status = 404, description = "Hash not in the session history")
    )
)]
pub async fn get_history_entry(
    Path(hash): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<TransactionRecord>, ApiError> {
    state
        .history
        .get(&hash)
        .map(Json)
        .ok_or_else(|| ApiError::not_found(format!("no transaction {hash} in history")))
}
