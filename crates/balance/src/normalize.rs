//! Conversion of raw integer balances into decimal units.
//!
//! Native balances keep every significant digit of the 18-decimal value.
//! Token balances are rounded half-up to [`TOKEN_DISPLAY_DECIMALS`] places.
//! All arithmetic stays on integers; the decimal value used for comparisons
//! is parsed back from the rendered string.

use crate::{NormalizedBalance, QueryError};
use alloy_primitives::U256;
use bigdecimal::BigDecimal;
use std::str::FromStr;

/// Decimals of every native currency we watch.
pub const NATIVE_DECIMALS: u8 = 18;

/// Fractional digits kept for token balances.
pub const TOKEN_DISPLAY_DECIMALS: u8 = 4;

/// Largest decimals value accepted from a token contract.
pub const MAX_DECIMALS: u8 = 36;

/// Reject decimals values no sane token reports.
pub const fn validate_decimals(decimals: u8) -> Result<u8, QueryError> {
    if decimals > MAX_DECIMALS {
        return Err(QueryError::InvalidDecimals(decimals));
    }
    Ok(decimals)
}

pub fn native(raw: U256, symbol: &str) -> Result<NormalizedBalance, QueryError> {
    build(format_exact(raw, NATIVE_DECIMALS), symbol.to_string())
}

pub fn token(raw: U256, decimals: u8, symbol: String) -> Result<NormalizedBalance, QueryError> {
    let display = format_rounded(raw, validate_decimals(decimals)?, TOKEN_DISPLAY_DECIMALS)?;
    build(display, symbol)
}

fn build(display: String, symbol: String) -> Result<NormalizedBalance, QueryError> {
    let value = BigDecimal::from_str(&display).map_err(|_| QueryError::Malformed(display.clone()))?;
    Ok(NormalizedBalance {
        value,
        display,
        symbol,
    })
}

/// `raw / 10^decimals` with trailing fractional zeros removed.
pub fn format_exact(raw: U256, decimals: u8) -> String {
    let base = pow10(decimals);
    let integer = raw / base;
    let fraction = raw % base;

    if fraction.is_zero() {
        return integer.to_string();
    }

    let fraction = format!("{:0>width$}", fraction.to_string(), width = decimals as usize);
    format!("{}.{}", integer, fraction.trim_end_matches('0'))
}

/// `raw / 10^decimals` rounded half-up to exactly `places` fractional digits.
///
/// Zero renders as `0`.
pub fn format_rounded(raw: U256, decimals: u8, places: u8) -> Result<String, QueryError> {
    if raw.is_zero() {
        return Ok("0".to_string());
    }

    let scaled = if decimals >= places {
        let divisor = pow10(decimals - places);
        let quotient = raw / divisor;
        let remainder = raw % divisor;
        // remainder >= divisor / 2, written to avoid overflow
        if remainder >= divisor - remainder {
            quotient + U256::from(1u8)
        } else {
            quotient
        }
    } else {
        raw.checked_mul(pow10(places - decimals))
            .ok_or(QueryError::Overflow)?
    };

    if places == 0 {
        return Ok(scaled.to_string());
    }

    let base = pow10(places);
    let fraction = format!(
        "{:0>width$}",
        (scaled % base).to_string(),
        width = places as usize
    );
    Ok(format!("{}.{}", scaled / base, fraction))
}

fn pow10(exponent: u8) -> U256 {
    U256::from(10u8).pow(U256::from(exponent))
}
