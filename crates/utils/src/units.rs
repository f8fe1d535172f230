//! Ether unit conversion.

use alloy_primitives::{
    utils::{format_units, parse_units, UnitsError},
    U256,
};
use thiserror::Error;

/// The placeholder shown when a value cannot be converted for display.
pub const NOT_AVAILABLE: &str = "N/A";

/// An error raised while converting between wei and ether.
#[derive(Debug, Error)]
pub enum AmountError {
    /// The input was empty or only whitespace.
    #[error("amount is empty")]
    Empty,

    /// The input was negative.
    #[error("amount is negative: {0}")]
    Negative(String),

    /// The input could not be parsed as a decimal ether amount.
    #[error("invalid ether amount {input}: {source}")]
    Invalid {
        /// The rejected input.
        input: String,
        /// The underlying conversion error.
        #[source]
        source: UnitsError,
    },

    /// A wei value could not be formatted.
    #[error("failed to format wei value: {0}")]
    Format(#[from] UnitsError),
}

/// Formats a wei value as a decimal ether string.
///
/// Trailing zeros are trimmed but one fractional digit is always kept, so `10^16` wei becomes
/// `"0.01"` and `10^18` wei becomes `"1.0"`.
pub fn format_ether(wei: U256) -> Result<String, AmountError> {
    let formatted = format_units(wei, "ether")?;
    Ok(trim_fraction(&formatted))
}

/// Formats a wei value as ether, falling back to [`NOT_AVAILABLE`] if the conversion fails.
#[must_use]
pub fn format_ether_or_na(wei: U256) -> String {
    format_ether(wei).unwrap_or_else(|_| NOT_AVAILABLE.to_string())
}

/// Parses a decimal ether amount (e.g. `"0.01"`) into wei.
pub fn parse_ether(amount: &str) -> Result<U256, AmountError> {
    let amount = amount.trim();
    if amount.is_empty() {
        return Err(AmountError::Empty);
    }
    if amount.starts_with('-') {
        return Err(AmountError::Negative(amount.to_string()));
    }
    let parsed = parse_units(amount, "ether")
        .map_err(|source| AmountError::Invalid { input: amount.to_string(), source })?;
    Ok(parsed.into())
}

fn trim_fraction(formatted: &str) -> String {
    match formatted.split_once('.') {
        Some((whole, fraction)) => {
            let fraction = fraction.trim_end_matches('0');
            if fraction.is_empty() {
                format!("{whole}.0")
            } else {
                format!("{whole}.{fraction}")
            }
        }
        None => format!("{formatted}.0"),
    }
}
