// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Invest Hub Contributors

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::error::ApiError;
use crate::state::AppState;
use crate::transfer::{SubmitOutcome, TransferRequest};

/// Outcome of a transfer submission.
#[derive(Debug, Serialize, ToSchema)]
pub struct TransferResponse {
    /// "submitted" or "cancelled"
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explorer_url: Option<String>,
}

#[utoipa::path(
    post,
    path = "/v1/transfers",
    request_body = TransferRequest,
    tag = "Transfers",
    responses(
        (status = 201, body = TransferResponse, description = "Transfer submitted"),
        (status = 200, body = TransferResponse, description = "Cancelled by the signer"),
        (status = 400, description = "Validation failed"),
        (status = 409, description = "No session connected"),
        (status = 422, description = "Submission failed")
    )
)]
pub async fn submit_transfer(
    State(state): State<AppState>,
    Json(request): Json<TransferRequest>,
) -> Result<(StatusCode, Json<TransferResponse>), ApiError> {
    match state.transfers.submit(request).await? {
        SubmitOutcome::Submitted { hash, explorer_url } => Ok((
            StatusCode::CREATED,
            Json(TransferResponse {
                status: "submitted".to_string(),
                hash: Some(hash.to_string()),
                explorer_url,
            }),
        )),
        SubmitOutcome::Cancelled => Ok((
            StatusCode::OK,
            Json(TransferResponse {
                status: "cancelled".to_string(),
                hash: None,
                explorer_url: None,
            }),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::TokenSelector;

    #[tokio::test]
    async fn submit_requires_a_session() {
        let err = submit_transfer(
            State(AppState::default()),
            Json(TransferRequest {
                token: TokenSelector::Native,
                recipient: "0x70997970C51812dc3A010C7d01b50e0d17dc79C8".into(),
                amount: "1".into(),
            }),
        )
        .await
        .unwrap_err();

        assert_eq!(err.status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn submit_rejects_bad_amount_with_bad_request() {
        use alloy::primitives::Address;

        let state = AppState::default();
        state.session.connect(Address::ZERO, 1).unwrap();

        let err = submit_transfer(
            State(state),
            Json(TransferRequest {
                token: TokenSelector::Native,
                recipient: "0x70997970C51812dc3A010C7d01b50e0d17dc79C8".into(),
                amount: "abc".into(),
            }),
        )
        .await
        .unwrap_err();

        assert_eq!(err.status, StatusCode::BAD_REQUEST);
    }
}
