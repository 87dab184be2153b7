//! Threshold evaluation.

use balance::NormalizedBalance;
use bigdecimal::BigDecimal;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("threshold `{value}` is not a decimal number")]
pub struct ParseError {
    pub value: String,
}

/// Minimum acceptable balance of a monitor item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Threshold(BigDecimal);

impl Threshold {
    pub fn parse(value: &str) -> Result<Self, ParseError> {
        BigDecimal::from_str(value.trim())
            .map(Self)
            .map_err(|_| ParseError {
                value: value.to_string(),
            })
    }

    /// Strictly below: a balance equal to the threshold is fine.
    pub fn is_breached_by(&self, balance: &NormalizedBalance) -> bool {
        balance.value < self.0
    }
}
