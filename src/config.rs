// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Invest Hub Contributors

//! # Runtime Configuration
//!
//! Configuration is loaded from the environment at startup.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `WALLET_PRIVATE_KEY` | Hex private key for the signing wallet | None (read-only mode) |
//! | `WALLETCONNECT_PROJECT_ID` | WalletConnect project id for mobile pairing | None (warns) |
//! | `DEFAULT_CHAIN_ID` | Chain selected on connect | `1` (Ethereum mainnet) |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::env;

use crate::registry;

/// Environment variable name for the server bind address.
pub const HOST_ENV: &str = "HOST";

/// Environment variable name for the server bind port.
pub const PORT_ENV: &str = "PORT";

/// Environment variable name for the signing wallet's hex private key.
///
/// When absent the service starts in read-only mode: balances and history
/// still work, but session connect and transfer submission are refused.
pub const WALLET_PRIVATE_KEY_ENV: &str = "WALLET_PRIVATE_KEY";

/// Environment variable name for the WalletConnect project identifier.
///
/// Absence degrades mobile wallet pairing but never blocks the service.
pub const WALLETCONNECT_PROJECT_ID_ENV: &str = "WALLETCONNECT_PROJECT_ID";

/// Environment variable name for the chain selected when a session connects.
pub const DEFAULT_CHAIN_ID_ENV: &str = "DEFAULT_CHAIN_ID";

/// Environment variable name for the log output format.
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

/// Resolved runtime configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub wallet_private_key: Option<String>,
    pub walletconnect_project_id: Option<String>,
    pub default_chain_id: u64,
}

impl Config {
    /// Load configuration from the environment.
    ///
    /// Missing optional values degrade with a warning rather than failing
    /// startup; only malformed values fall back to defaults.
    pub fn from_env() -> Self {
        let host = env::var(HOST_ENV).unwrap_or_else(|_| "0.0.0.0".to_string());
        let port: u16 = env::var(PORT_ENV)
            .unwrap_or_else(|_| "8080".to_string())
            .parse()
            .unwrap_or(8080);

        let wallet_private_key = env::var(WALLET_PRIVATE_KEY_ENV).ok().filter(|v| !v.is_empty());

        let walletconnect_project_id = env::var(WALLETCONNECT_PROJECT_ID_ENV)
            .ok()
            .filter(|v| !v.is_empty());
        if walletconnect_project_id.is_none() {
            tracing::warn!(
                "{} is not set; mobile wallet pairing will be degraded",
                WALLETCONNECT_PROJECT_ID_ENV
            );
        }

        let mut default_chain_id: u64 = env::var(DEFAULT_CHAIN_ID_ENV)
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(registry::ETHEREUM_MAINNET_CHAIN_ID);
        if registry::chain(default_chain_id).is_none() {
            tracing::warn!(
                chain_id = default_chain_id,
                "unknown default chain id, falling back to Ethereum mainnet"
            );
            default_chain_id = registry::ETHEREUM_MAINNET_CHAIN_ID;
        }

        Self {
            host,
            port,
            wallet_private_key,
            walletconnect_project_id,
            default_chain_id,
        }
    }
}
