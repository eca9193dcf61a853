// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Invest Hub Contributors

use axum::{
    routing::{get, post, put},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    balances::AssetKind,
    history::{TransactionRecord, TxStatus},
    registry::TokenSelector,
    state::AppState,
    transfer::TransferRequest,
};

pub mod balances;
pub mod health;
pub mod history;
pub mod session;
pub mod transfers;

pub fn router(state: AppState) -> Router {
    let v1_routes = Router::new()
        .route("/session", get(session::get_session))
        .route("/session/connect", post(session::connect))
        .route("/session/disconnect", post(session::disconnect))
        .route("/session/chain", put(session::switch_chain))
        .route("/balances", get(balances::list_balances))
        .route("/balances/refresh", post(balances::refresh_balances))
        .route("/transfers", post(transfers::submit_transfer))
        .route("/history", get(history::list_history))
        .route("/history/{hash}", get(history::get_history_entry))
        .with_state(state.clone());

    Router::new()
        .route("/health", get(health::health))
        .route("/ready", get(health::ready))
        .with_state(state)
        .nest("/v1", v1_routes)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health,
        health::ready,
        session::get_session,
        session::connect,
        session::disconnect,
        session::switch_chain,
        balances::list_balances,
        balances::refresh_balances,
        transfers::submit_transfer,
        history::list_history,
        history::get_history_entry
    ),
    components(
        schemas(
            health::HealthResponse,
            health::ReadyResponse,
            health::ReadyChecks,
            session::SessionResponse,
            session::ConnectRequest,
            session::SwitchChainRequest,
            balances::BalanceRow,
            transfers::TransferResponse,
            AssetKind,
            TokenSelector,
            TransferRequest,
            TransactionRecord,
            TxStatus
        )
    ),
    tags(
        (name = "Health", description = "Liveness and readiness probes"),
        (name = "Session", description = "Wallet connection and active chain"),
        (name = "Balances", description = "Native and stablecoin balances"),
        (name = "Transfers", description = "Token transfer submission"),
        (name = "History", description = "Session-local transaction history")
    )
)]
struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn router_builds_with_all_routes() {
        let app = router(AppState::default());
        // Ensure the router can be converted into a service without panicking.
        let _ = app.into_make_service();
    }
}
