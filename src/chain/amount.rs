// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Invest Hub Contributors

//! Decimal amount parsing and formatting.
//!
//! Transfers and balances move through the system as base-unit integers
//! (`U256`); user-facing text is converted at the token's declared decimal
//! precision. Parsing is exact: any input it accepts equals
//! `round(amount * 10^decimals)`, and anything that would lose precision is
//! rejected instead of rounded.

use alloy::primitives::U256;

/// Rejections from [`parse_amount`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AmountError {
    #[error("amount is empty")]
    Empty,

    #[error("amount is not a decimal number")]
    Malformed,

    #[error("too many decimal places (max {0})")]
    TooManyDecimals(u8),

    #[error("amount is too large")]
    Overflow,
}

/// Parse a human-readable amount into base units.
///
/// # Arguments
/// * `amount` - Amount as entered in the form (e.g., "1.5")
/// * `decimals` - Declared precision of the token (18 for ETH, 6 for USDC)
pub fn parse_amount(amount: &str, decimals: u8) -> Result<U256, AmountError> {
    let trimmed = amount.trim();
    if trimmed.is_empty() {
        return Err(AmountError::Empty);
    }

    let parts: Vec<&str> = trimmed.split('.').collect();
    if parts.len() > 2 {
        return Err(AmountError::Malformed);
    }

    // u128::from_str tolerates a leading sign; only bare digits are a number.
    if parts
        .iter()
        .any(|part| !part.chars().all(|c| c.is_ascii_digit()))
    {
        return Err(AmountError::Malformed);
    }

    // ".5" is accepted as "0.5"; a bare "." is not a number.
    let whole = if parts[0].is_empty() {
        if parts.len() == 1 || parts[1].is_empty() {
            return Err(AmountError::Malformed);
        }
        0u128
    } else {
        parts[0].parse::<u128>().map_err(|_| AmountError::Malformed)?
    };

    let fractional = if parts.len() == 2 && !parts[1].is_empty() {
        let frac_str = parts[1];
        if frac_str.len() > decimals as usize {
            return Err(AmountError::TooManyDecimals(decimals));
        }
        // Pad with zeros to base-unit precision.
        let padded = format!("{:0<width$}", frac_str, width = decimals as usize);
        padded.parse::<u128>().map_err(|_| AmountError::Malformed)?
    } else {
        0u128
    };

    let multiplier = 10u128
        .checked_pow(decimals as u32)
        .ok_or(AmountError::Overflow)?;
    let total = whole
        .checked_mul(multiplier)
        .and_then(|w| w.checked_add(fractional))
        .ok_or(AmountError::Overflow)?;

    Ok(U256::from(total))
}

/// Format base units back to a human-readable amount.
pub fn format_amount(amount: U256, decimals: u8) -> String {
    if amount.is_zero() {
        return "0".to_string();
    }

    let divisor = U256::from(10u64).pow(U256::from(decimals));
    let whole = amount / divisor;
    let remainder = amount % divisor;

    if remainder.is_zero() {
        whole.to_string()
    } else {
        let decimal_str = format!("{:0>width$}", remainder, width = decimals as usize);
        let trimmed = decimal_str.trim_end_matches('0');
        if trimmed.is_empty() {
            whole.to_string()
        } else {
            format!("{}.{}", whole, trimmed)
        }
    }
}
