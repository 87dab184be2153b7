//! Balance queries for watched accounts.
//!
//! This crate provides the [`ChainQuery`] boundary to a chain endpoint, its
//! alloy implementation in [`monitor`], and the conversion of raw integer
//! balances into human-scale decimals in [`normalize`].

pub mod monitor;
pub mod normalize;

use alloy_primitives::{Address, U256};
use bigdecimal::BigDecimal;
use normalize::MAX_DECIMALS;
use serde::{Deserialize, Serialize};
use std::{fmt, future::Future, time::Duration};
use thiserror::Error;

/// Failure of a single balance or metadata query.
#[derive(Error, Debug)]
pub enum QueryError {
    #[error("invalid address `{value}`: {reason}")]
    InvalidAddress { value: String, reason: String },

    #[error("rpc error: {0}")]
    Rpc(String),

    #[error("contract call failed: {0}")]
    Contract(String),

    #[error("token reports {0} decimals, expected at most {max}", max = MAX_DECIMALS)]
    InvalidDecimals(u8),

    #[error("query timed out after {0:?}")]
    Timeout(Duration),

    #[error("balance out of representable range")]
    Overflow,

    #[error("malformed balance `{0}`")]
    Malformed(String),
}

/// Type of balance query to perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BalanceQuery {
    /// Query ERC20 token balance for an EOA or contract
    ERC20Balance {
        /// Token contract address
        token: Address,
        /// Holder address
        holder: Address,
    },
    /// Query native balance
    NativeBalance {
        /// Account address
        address: Address,
    },
}

/// A balance converted to decimal units.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedBalance {
    /// Comparable value
    pub value: BigDecimal,
    /// Rendering used in logs and alerts
    pub display: String,
    pub symbol: String,
}

impl fmt::Display for NormalizedBalance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.display, self.symbol)
    }
}

/// Read access to balances on one chain endpoint.
pub trait ChainQuery: Send + Sync {
    /// Native currency balance of `address`, in the chain's smallest unit.
    fn native_balance(
        &self,
        address: Address,
    ) -> impl Future<Output = Result<U256, QueryError>> + Send;

    /// Raw ERC20 balance of `owner`.
    fn token_balance(
        &self,
        token: Address,
        owner: Address,
    ) -> impl Future<Output = Result<U256, QueryError>> + Send;

    fn token_decimals(&self, token: Address) -> impl Future<Output = Result<u8, QueryError>> + Send;

    fn token_symbol(
        &self,
        token: Address,
    ) -> impl Future<Output = Result<String, QueryError>> + Send;
}

/// Parse an address from config.
pub fn parse_address(value: &str) -> Result<Address, QueryError> {
    value
        .trim()
        .parse()
        .map_err(|e| QueryError::InvalidAddress {
            value: value.to_string(),
            reason: format!("{}", e),
        })
}

/// Run `query` against `chain` and normalize the result.
///
/// Every call to the chain is bounded by `timeout`. The three reads of a
/// token query are issued concurrently; the first failure wins.
pub async fn query_normalized<Q>(
    chain: &Q,
    query: BalanceQuery,
    native_symbol: &str,
    timeout: Duration,
) -> Result<NormalizedBalance, QueryError>
where
    Q: ChainQuery,
{
    match query {
        BalanceQuery::NativeBalance { address } => {
            let raw = bounded(timeout, chain.native_balance(address)).await?;
            normalize::native(raw, native_symbol)
        }
        BalanceQuery::ERC20Balance { token, holder } => {
            let (raw, decimals, symbol) = tokio::try_join!(
                bounded(timeout, chain.token_balance(token, holder)),
                bounded(timeout, chain.token_decimals(token)),
                bounded(timeout, chain.token_symbol(token)),
            )?;
            normalize::token(raw, decimals, symbol)
        }
    }
}

async fn bounded<T>(
    timeout: Duration,
    query: impl Future<Output = Result<T, QueryError>>,
) -> Result<T, QueryError> {
    tokio::time::timeout(timeout, query)
        .await
        .map_err(|_| QueryError::Timeout(timeout))?
}
