//! Configuration types for the balance watcher.
//!
//! This crate provides:
//! - The chain table and monitor list read from the config file
//! - Configuration loading (TOML or JSON) and validation
//! - Per-item resolution of a monitor rule into the asset it watches

pub mod monitor;
pub mod settings;

pub use monitor::{Asset, InvalidMonitor, MonitorEntry, MonitorItem, TokenType};
pub use settings::{ChainInfo, Config, DEFAULT_NATIVE_SYMBOL, DEFAULT_QUERY_TIMEOUT_SECS};

use thiserror::Error;

/// Configuration problems.
///
/// Load-time variants are fatal at startup. Item-level variants only skip the
/// offending monitor item for the current sweep.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid TOML config: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("invalid JSON config: {0}")]
    Json(#[from] serde_json::Error),

    #[error("interval must be at least one second")]
    ZeroInterval,

    #[error("queryTimeout must be at least one second")]
    ZeroQueryTimeout,

    /// Monitor item references a chain id missing from the `rpc` table.
    #[error("no RPC configured for chain id {chain_id}")]
    UnknownChain { chain_id: u64 },

    /// Chain is configured but no provider could be built for it.
    #[error("chain {chain_id} is unavailable: {reason}")]
    ChainUnavailable { chain_id: u64, reason: String },

    #[error("erc20 monitor for {address} has no tokenAddress")]
    MissingTokenAddress { address: String },

    /// A `monitors` entry is missing a field or has a field of the wrong type.
    #[error("monitors[{index}] is invalid: {reason}")]
    InvalidMonitor { index: usize, reason: String },
}

impl ConfigError {
    /// Whether the error only concerns a single monitor item.
    pub const fn is_item_level(&self) -> bool {
        matches!(
            self,
            Self::UnknownChain { .. }
                | Self::ChainUnavailable { .. }
                | Self::MissingTokenAddress { .. }
                | Self::InvalidMonitor { .. }
        )
    }
}
