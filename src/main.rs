// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Invest Hub Contributors

use std::net::SocketAddr;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use invest_hub_server::api::router;
use invest_hub_server::balances::BalancePoller;
use invest_hub_server::chain::{
    ChainReader, EvmReader, LocalKeyGateway, NoWalletGateway, WalletGateway,
};
use invest_hub_server::config::{Config, LOG_FORMAT_ENV, WALLET_PRIVATE_KEY_ENV};
use invest_hub_server::state::AppState;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug"));

    let json = std::env::var(LOG_FORMAT_ENV)
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

#[tokio::main]
async fn main() {
    init_tracing();

    let config = Config::from_env();

    let gateway: Arc<dyn WalletGateway> = match config.wallet_private_key.as_deref() {
        Some(key) => match LocalKeyGateway::from_hex(key) {
            Ok(gateway) => {
                tracing::info!(address = %gateway.address(), "signing wallet loaded");
                Arc::new(gateway)
            }
            Err(e) => {
                tracing::error!(error = %e, "invalid {WALLET_PRIVATE_KEY_ENV}, starting read-only");
                Arc::new(NoWalletGateway)
            }
        },
        None => {
            tracing::warn!("{WALLET_PRIVATE_KEY_ENV} not set, starting read-only");
            Arc::new(NoWalletGateway)
        }
    };

    let reader: Arc<dyn ChainReader> = Arc::new(EvmReader::new());
    let state = AppState::new(Arc::clone(&reader), gateway, config.default_chain_id);

    let shutdown = CancellationToken::new();

    let poller = BalancePoller::new(
        reader,
        Arc::clone(&state.session),
        Arc::clone(&state.balances),
    );
    let poller_task = tokio::spawn(poller.run(shutdown.clone()));
    let watcher_task = tokio::spawn(Arc::clone(&state.watcher).run(shutdown.clone()));

    let app = router(state);

    let addr: SocketAddr = match format!("{}:{}", config.host, config.port).parse() {
        Ok(addr) => addr,
        Err(e) => {
            tracing::error!(host = %config.host, port = config.port, error = %e, "invalid bind address");
            return;
        }
    };

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(%addr, error = %e, "failed to bind");
            return;
        }
    };

    tracing::info!("invest-hub server listening on http://{addr} (docs at /docs)");

    let serve_shutdown = shutdown.clone();
    let result = axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("shutdown signal received");
                }
                _ = serve_shutdown.cancelled() => {}
            }
        })
        .await;

    if let Err(e) = result {
        tracing::error!(error = %e, "server exited with error");
    }

    shutdown.cancel();
    let _ = poller_task.await;
    let _ = watcher_task.await;
}
