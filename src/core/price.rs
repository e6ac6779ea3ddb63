//! Decimal price strings to integer cents, and back for display.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;

use crate::utils::error::ExtractionError;

/// Convert a decimal amount such as `"129.00"` into cents.
///
/// The multiply by 100 is exact in `Decimal`; rounding happens once, half-up,
/// straight after it.
pub fn parse_cents(raw: &str) -> Result<i64, ExtractionError> {
    let trimmed = raw.trim();
    let amount = Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .map_err(|_| ExtractionError::InvalidPrice(raw.to_string()))?;
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(ExtractionError::InvalidPrice(raw.to_string()));
    }

    amount
        .checked_mul(Decimal::from(100))
        .map(|cents| cents.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero))
        .and_then(|cents| cents.to_i64())
        .ok_or_else(|| ExtractionError::InvalidPrice(raw.to_string()))
}

/// Price fields arrive either as strings or as bare JSON numbers.
/// A missing price counts as zero.
pub fn cents_from_json(value: Option<&serde_json::Value>) -> Result<i64, ExtractionError> {
    match value {
        None | Some(serde_json::Value::Null) => Ok(0),
        Some(serde_json::Value::String(s)) if s.trim().is_empty() => Ok(0),
        Some(serde_json::Value::String(s)) => parse_cents(s),
        Some(serde_json::Value::Number(n)) => parse_cents(&n.to_string()),
        Some(other) => Err(ExtractionError::InvalidPrice(other.to_string())),
    }
}

/// `12900` -> `"$129.00"`.
pub fn format_cents(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    format!("{}${}.{:02}", sign, abs / 100, abs % 100)
}
