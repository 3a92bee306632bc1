//! Conversion between on-chain integer amounts and decimal strings.

use alloy_primitives::{
    utils::{format_units, parse_units, ParseUnits},
    U256,
};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AmountError {
    #[error("Invalid amount {amount:?}: {reason}")]
    Invalid { amount: String, reason: String },

    #[error("Amount must not be negative: {0}")]
    Negative(String),

    #[error("Unsupported decimals: {0}")]
    Decimals(u8),
}

/// Format `raw` with `decimals` fractional digits.
///
/// Trailing fractional zeros are dropped, keeping at least one digit:
/// `50000000000000000` with 18 decimals is `"0.05"`, one full unit is `"1.0"`.
pub fn format_amount(raw: U256, decimals: u8) -> Result<String, AmountError> {
    let formatted = format_units(raw, decimals).map_err(|_| AmountError::Decimals(decimals))?;

    let trimmed = match formatted.split_once('.') {
        Some((integer, fraction)) => {
            let fraction = fraction.trim_end_matches('0');
            if fraction.is_empty() {
                format!("{integer}.0")
            } else {
                format!("{integer}.{fraction}")
            }
        }
        None => format!("{formatted}.0"),
    };

    Ok(trimmed)
}

/// Parse a user supplied decimal amount into the asset's smallest unit.
pub fn parse_amount(amount: &str, decimals: u8) -> Result<U256, AmountError> {
    let amount = amount.trim();

    match parse_units(amount, decimals) {
        Ok(ParseUnits::U256(value)) => Ok(value),
        Ok(ParseUnits::I256(_)) => Err(AmountError::Negative(amount.to_string())),
        Err(e) => Err(AmountError::Invalid {
            amount: amount.to_string(),
            reason: e.to_string(),
        }),
    }
}
