//! RPC provider construction for watched chains.

use alloy_provider::{DynProvider, Provider, ProviderBuilder};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    /// Error parsing or validating URLs
    #[error("Invalid RPC URL: {0}")]
    InvalidUrl(String),
}

/// Convenience function to create an ethereum rpc provider from url.
///
/// The provider is type-erased so providers for different chains can live in
/// one map.
pub fn create_provider(rpc_url: &str) -> Result<DynProvider, ClientError> {
    let url = rpc_url
        .parse()
        .map_err(|e| ClientError::InvalidUrl(format!("{}", e)))?;
    let provider = ProviderBuilder::new().connect_http(url);

    Ok(provider.erased())
}
