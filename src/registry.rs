// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Invest Hub Contributors

//! Static chain and token registry.
//!
//! Fixed tables describing the supported EVM chains and the stablecoin
//! contracts known on each of them. Lookups are pure; a missing entry means
//! "unsupported on this chain" and is rendered as such, never treated as an
//! error. Adding a chain or token is a table row, no consumer changes.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Chain id of Ethereum mainnet, the default chain on connect.
pub const ETHEREUM_MAINNET_CHAIN_ID: u64 = 1;

/// Configuration of one supported EVM chain.
#[derive(Debug, Clone)]
pub struct ChainConfig {
    /// Chain name for display
    pub name: &'static str,
    /// Chain ID
    pub chain_id: u64,
    /// RPC endpoint URL
    pub rpc_url: &'static str,
    /// Block explorer base URL
    pub explorer_url: &'static str,
    /// Native currency symbol
    pub native_symbol: &'static str,
    /// Native currency decimals
    pub native_decimals: u8,
}

/// Supported chains, mirroring the dashboard's wallet configuration.
pub const CHAINS: [ChainConfig; 5] = [
    ChainConfig {
        name: "Ethereum",
        chain_id: 1,
        rpc_url: "https://eth.llamarpc.com",
        explorer_url: "https://etherscan.io",
        native_symbol: "ETH",
        native_decimals: 18,
    },
    ChainConfig {
        name: "OP Mainnet",
        chain_id: 10,
        rpc_url: "https://mainnet.optimism.io",
        explorer_url: "https://optimistic.etherscan.io",
        native_symbol: "ETH",
        native_decimals: 18,
    },
    ChainConfig {
        name: "Arbitrum One",
        chain_id: 42161,
        rpc_url: "https://arb1.arbitrum.io/rpc",
        explorer_url: "https://arbiscan.io",
        native_symbol: "ETH",
        native_decimals: 18,
    },
    ChainConfig {
        name: "Base",
        chain_id: 8453,
        rpc_url: "https://mainnet.base.org",
        explorer_url: "https://basescan.org",
        native_symbol: "ETH",
        native_decimals: 18,
    },
    ChainConfig {
        name: "Sepolia",
        chain_id: 11155111,
        rpc_url: "https://rpc.sepolia.org",
        explorer_url: "https://sepolia.etherscan.io",
        native_symbol: "ETH",
        native_decimals: 18,
    },
];

/// The stablecoins this dashboard knows how to display and transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum StablecoinKind {
    Usdc,
    Usdt,
}

/// Token selection as it arrives from the transfer form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum TokenSelector {
    Native,
    Usdc,
    Usdt,
}

/// How a token is transferred on chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Value-bearing transaction in the chain's base currency.
    Native,
    /// ERC-20 contract call, `transfer(recipient, amount)`.
    Erc20(&'static str),
}

/// Everything a consumer needs to read or transfer one token on one chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenDescriptor {
    pub chain_id: u64,
    pub kind: TokenKind,
    pub decimals: u8,
    pub symbol: &'static str,
}

/// One stablecoin contract deployment.
#[derive(Debug, Clone)]
struct StablecoinConfig {
    chain_id: u64,
    address: &'static str,
    decimals: u8,
    symbol: &'static str,
}

/// USDC deployments per chain; chains without an entry display "unsupported".
const USDC_BY_CHAIN: &[StablecoinConfig] = &[
    StablecoinConfig {
        chain_id: 1,
        address: "0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48",
        decimals: 6,
        symbol: "USDC",
    },
    StablecoinConfig {
        chain_id: 10,
        address: "0x7F5c764cBc14f9669B88837ca1490cCa17c31607",
        decimals: 6,
        symbol: "USDC",
    },
    StablecoinConfig {
        chain_id: 42161,
        address: "0xaf88d065e77c8cC2239327C5EDb3A432268e5831",
        decimals: 6,
        symbol: "USDC",
    },
    StablecoinConfig {
        chain_id: 8453,
        address: "0x833589fCd6d999F251aF6CC12B9c8f0d094B6760",
        decimals: 6,
        symbol: "USDC",
    },
];

/// USDT deployments per chain.
const USDT_BY_CHAIN: &[StablecoinConfig] = &[
    StablecoinConfig {
        chain_id: 1,
        address: "0xdAC17F958D2ee523a2206206994597C13D831ec7",
        decimals: 6,
        symbol: "USDT",
    },
    StablecoinConfig {
        chain_id: 10,
        address: "0x94b008aa00579c1307b0ef2c499ad98a8ce58e58",
        decimals: 6,
        symbol: "USDT",
    },
    StablecoinConfig {
        chain_id: 42161,
        address: "0xfd086bc7cd5c481dcc9c85ebe478a1c0b69fcbb9",
        decimals: 6,
        symbol: "USDT",
    },
];

/// Look up a supported chain by id.
pub fn chain(chain_id: u64) -> Option<&'static ChainConfig> {
    CHAINS.iter().find(|c| c.chain_id == chain_id)
}

/// Look up a stablecoin deployment on a chain.
pub fn stablecoin(chain_id: u64, kind: StablecoinKind) -> Option<TokenDescriptor> {
    let table = match kind {
        StablecoinKind::Usdc => USDC_BY_CHAIN,
        StablecoinKind::Usdt => USDT_BY_CHAIN,
    };

    table
        .iter()
        .find(|entry| entry.chain_id == chain_id)
        .map(|entry| TokenDescriptor {
            chain_id,
            kind: TokenKind::Erc20(entry.address),
            decimals: entry.decimals,
            symbol: entry.symbol,
        })
}

/// Resolve a form token selection on a chain.
///
/// The native selector resolves whenever the chain itself is known.
pub fn token(chain_id: u64, selector: TokenSelector) -> Option<TokenDescriptor> {
    match selector {
        TokenSelector::Native => chain(chain_id).map(|c| TokenDescriptor {
            chain_id,
            kind: TokenKind::Native,
            decimals: c.native_decimals,
            symbol: c.native_symbol,
        }),
        TokenSelector::Usdc => stablecoin(chain_id, StablecoinKind::Usdc),
        TokenSelector::Usdt => stablecoin(chain_id, StablecoinKind::Usdt),
    }
}

/// Block explorer URL for a transaction hash, when the chain is known.
pub fn explorer_tx_url(chain_id: u64, tx_hash: &str) -> Option<String> {
    chain(chain_id).map(|c| format!("{}/tx/{}", c.explorer_url, tx_hash))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_chain_resolves_native() {
        for config in &CHAINS {
            let token = token(config.chain_id, TokenSelector::Native).unwrap();
            assert_eq!(token.kind, TokenKind::Native);
            assert_eq!(token.decimals, 18);
            assert_eq!(token.symbol, "ETH");
        }
    }

    #[test]
    fn usdc_configured_on_four_chains() {
        for chain_id in [1, 10, 42161, 8453] {
            let token = stablecoin(chain_id, StablecoinKind::Usdc).unwrap();
            assert_eq!(token.decimals, 6);
            assert_eq!(token.symbol, "USDC");
            assert!(matches!(token.kind, TokenKind::Erc20(_)));
        }
    }

    #[test]
    fn usdt_missing_on_base_and_sepolia() {
        assert!(stablecoin(8453, StablecoinKind::Usdt).is_none());
        assert!(stablecoin(11155111, StablecoinKind::Usdt).is_none());
    }

    #[test]
    fn sepolia_has_no_stablecoins() {
        assert!(token(11155111, TokenSelector::Usdc).is_none());
        assert!(token(11155111, TokenSelector::Usdt).is_none());
        assert!(token(11155111, TokenSelector::Native).is_some());
    }

    #[test]
    fn unknown_chain_resolves_nothing() {
        assert!(chain(999).is_none());
        assert!(token(999, TokenSelector::Native).is_none());
        assert!(token(999, TokenSelector::Usdc).is_none());
    }

    #[test]
    fn explorer_url_joins_hash() {
        let url = explorer_tx_url(1, "0xabc").unwrap();
        assert_eq!(url, "https://etherscan.io/tx/0xabc");
        assert!(explorer_tx_url(999, "0xabc").is_none());
    }
}
