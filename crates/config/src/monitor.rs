//! Monitor rules.

use crate::ConfigError;
use serde::{Deserialize, Serialize};

/// Kind of balance a monitor item watches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Native,
    Erc20,
}

/// One watch rule as written in the config file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonitorItem {
    /// Account to watch
    pub address: String,
    /// Key into the chain table
    pub chain_id: u64,
    pub token_type: TokenType,
    /// Token contract, only meaningful for erc20 items
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_address: Option<String>,
    /// Minimum acceptable normalized balance, as a decimal string
    pub threshold: String,
}

/// Asset resolved from a [`MonitorItem`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Asset<'a> {
    Native,
    Erc20 { token_address: &'a str },
}

/// One entry of the `monitors` list.
///
/// Entries that do not describe a valid rule are kept so that each sweep can
/// report them; they never fail the whole config.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MonitorEntry {
    Valid(MonitorItem),
    Invalid(InvalidMonitor),
}

/// A `monitors` entry that could not be read as a [`MonitorItem`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidMonitor {
    /// Zero-based index in the `monitors` list
    pub index: usize,
    /// Best-effort `address` of the entry, for log context
    pub address: Option<String>,
    /// Best-effort `chainId` of the entry, for log context
    pub chain_id: Option<u64>,
    pub reason: String,
}

impl MonitorEntry {
    /// Read entry `index` from an already-parsed document value.
    pub fn from_value(index: usize, value: serde_json::Value) -> Self {
        let address = value
            .get("address")
            .and_then(serde_json::Value::as_str)
            .map(str::to_string);
        let chain_id = value.get("chainId").and_then(serde_json::Value::as_u64);

        match serde_json::from_value(value) {
            Ok(item) => Self::Valid(item),
            Err(e) => Self::Invalid(InvalidMonitor {
                index,
                address,
                chain_id,
                reason: e.to_string(),
            }),
        }
    }

    /// The watch rule, or the item-level error describing why there is none.
    pub fn item(&self) -> Result<&MonitorItem, ConfigError> {
        match self {
            Self::Valid(item) => Ok(item),
            Self::Invalid(invalid) => Err(ConfigError::InvalidMonitor {
                index: invalid.index,
                reason: invalid.reason.clone(),
            }),
        }
    }

    pub fn address(&self) -> &str {
        match self {
            Self::Valid(item) => &item.address,
            Self::Invalid(invalid) => invalid.address.as_deref().unwrap_or("<unknown>"),
        }
    }

    pub const fn chain_id(&self) -> Option<u64> {
        match self {
            Self::Valid(item) => Some(item.chain_id),
            Self::Invalid(invalid) => invalid.chain_id,
        }
    }
}

impl From<MonitorItem> for MonitorEntry {
    fn from(item: MonitorItem) -> Self {
        Self::Valid(item)
    }
}

impl MonitorItem {
    /// Resolve the asset this item watches.
    ///
    /// An erc20 item without a (non-blank) token address cannot be evaluated.
    pub fn asset(&self) -> Result<Asset<'_>, ConfigError> {
        match self.token_type {
            TokenType::Native => Ok(Asset::Native),
            TokenType::Erc20 => match self.token_address.as_deref().map(str::trim) {
                Some(token_address) if !token_address.is_empty() => {
                    Ok(Asset::Erc20 { token_address })
                }
                _ => Err(ConfigError::MissingTokenAddress {
                    address: self.address.clone(),
                }),
            },
        }
    }
}
