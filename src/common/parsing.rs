// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@mitander.dev>

use crate::domain::error::AppError;
use alloy::primitives::{Address, U256};
use std::str::FromStr;

pub fn strip_0x(s: &str) -> &str {
    s.strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s)
}

/// Hex address parsing is case-insensitive; checksums are not enforced.
pub fn parse_address_hex(s: &str) -> Option<Address> {
    let raw = strip_0x(s.trim());
    if raw.len() != 40 {
        return None;
    }
    Address::from_str(raw).ok()
}

pub fn parse_token_address(field: &str, s: &str) -> Result<Address, AppError> {
    parse_address_hex(s).ok_or_else(|| {
        tracing::debug!(target: "config", field, value = s, "Rejected malformed address");
        AppError::InvalidAddress(s.to_string())
    })
}

/// Decimal amount in the token's smallest unit.
pub fn parse_amount(s: &str) -> Result<U256, AppError> {
    let trimmed = s.trim();
    if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return Err(AppError::invalid_input(
            "amount_in",
            format!("expected a base-10 integer, got {trimmed:?}"),
        ));
    }
    U256::from_str_radix(trimmed, 10)
        .map_err(|e| AppError::invalid_input("amount_in", e.to_string()))
}
