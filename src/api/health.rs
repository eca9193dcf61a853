// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Invest Hub Contributors

use axum::{extract::State, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::state::AppState;

/// Simple health check response for liveness probes.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
}

/// Readiness response with individual component status.
#[derive(Debug, Serialize, ToSchema)]
pub struct ReadyResponse {
    /// Overall status ("ok")
    pub status: String,
    pub checks: ReadyChecks,
}

/// Individual readiness check results.
#[derive(Debug, Serialize, ToSchema)]
pub struct ReadyChecks {
    /// Whether the service process is running.
    pub service: String,
    /// "connected" or "disconnected"
    pub wallet_session: String,
    /// In-flight transfers currently being watched.
    pub watched_transfers: usize,
}

#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses((status = 200, body = HealthResponse))
)]
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

#[utoipa::path(
    get,
    path = "/ready",
    tag = "Health",
    responses((status = 200, body = ReadyResponse))
)]
pub async fn ready(State(state): State<AppState>) -> Json<ReadyResponse> {
    let wallet_session = if state.session.current().is_some() {
        "connected"
    } else {
        "disconnected"
    };

    Json(ReadyResponse {
        status: "ok".to_string(),
        checks: ReadyChecks {
            service: "ok".to_string(),
            wallet_session: wallet_session.to_string(),
            watched_transfers: state.watcher.watched_count(),
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn health_reports_ok() {
        let Json(response) = health().await;
        assert_eq!(response.status, "ok");
    }

    #[tokio::test]
    async fn ready_reports_disconnected_session() {
        let Json(response) = ready(State(AppState::default())).await;
        assert_eq!(response.status, "ok");
        assert_eq!(response.checks.wallet_session, "disconnected");
        assert_eq!(response.checks.watched_transfers, 0);
    }
}
