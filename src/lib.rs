// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Invest Hub Contributors

//! Invest Hub server: a wallet dashboard backend for EVM chains.
//!
//! Exposes a small HTTP API for connecting a wallet session, reading native
//! and stablecoin balances across the supported chains, submitting
//! transfers, and following each transfer through confirmation in a
//! session-local history. Chain access goes through the [`chain`] traits so
//! every layer above them is testable without a node.

pub mod api;
pub mod balances;
pub mod chain;
pub mod config;
pub mod error;
pub mod history;
pub mod registry;
pub mod session;
pub mod state;
pub mod transfer;
