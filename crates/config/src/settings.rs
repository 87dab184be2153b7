//! Watcher configuration and its loading.
//!
//! The file format follows the extension: `.json` is parsed as JSON, anything
//! else as TOML. Keys are camelCase in both.

use crate::{ConfigError, MonitorEntry};
use eyre::WrapErr;
use serde::{Deserialize, Deserializer, Serialize};
use std::{collections::BTreeMap, path::Path, time::Duration};

/// Symbol reported for native balances when the chain does not set one.
pub const DEFAULT_NATIVE_SYMBOL: &str = "ETH";

/// Upper bound for a single chain query or alert delivery.
pub const DEFAULT_QUERY_TIMEOUT_SECS: u64 = 10;

/// Static data for one chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainInfo {
    /// RPC endpoint url
    pub rpc: String,
    /// Display name used in logs and alerts
    pub name: String,
    /// Symbol of the native currency
    #[serde(default = "default_native_symbol")]
    pub native_symbol: String,
}

/// Top-level watcher configuration, immutable once loaded.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Chain table keyed by chain id
    #[serde(deserialize_with = "deserialize_chain_table")]
    pub rpc: BTreeMap<u64, ChainInfo>,

    /// Alert webhook; unset or empty means alerts are only logged
    #[serde(default, alias = "alertWebhook")]
    pub slack_webhook: Option<String>,

    /// Seconds between sweep starts
    pub interval: u64,

    /// Seconds before a chain query or alert delivery is abandoned
    #[serde(default = "default_query_timeout")]
    pub query_timeout: u64,

    /// Monitor rules, checked in this order
    #[serde(default, deserialize_with = "deserialize_monitors")]
    pub monitors: Vec<MonitorEntry>,
}

impl Config {
    pub fn from_file(path: impl AsRef<Path>) -> eyre::Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .wrap_err_with(|| format!("failed to read config {}", path.display()))?;

        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        let config = if is_json {
            Self::from_json_str(&contents)
        } else {
            Self::from_toml_str(&contents)
        };

        config.wrap_err_with(|| format!("failed to load config {}", path.display()))
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(contents)?;
        config.validate()
    }

    pub fn from_json_str(contents: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(contents)?;
        config.validate()
    }

    fn validate(self) -> Result<Self, ConfigError> {
        if self.interval == 0 {
            return Err(ConfigError::ZeroInterval);
        }
        if self.query_timeout == 0 {
            return Err(ConfigError::ZeroQueryTimeout);
        }
        Ok(self)
    }

    pub const fn interval(&self) -> Duration {
        Duration::from_secs(self.interval)
    }

    pub const fn query_timeout(&self) -> Duration {
        Duration::from_secs(self.query_timeout)
    }

    /// Configured alert destination, if any.
    pub fn alert_target(&self) -> Option<&str> {
        self.slack_webhook
            .as_deref()
            .map(str::trim)
            .filter(|target| !target.is_empty())
    }

    /// Look up the chain an item points at.
    pub fn chain(&self, chain_id: u64) -> Result<&ChainInfo, ConfigError> {
        self.rpc
            .get(&chain_id)
            .ok_or(ConfigError::UnknownChain { chain_id })
    }
}

/// Read each monitor on its own so that one malformed entry is reported
/// per sweep instead of failing the load.
fn deserialize_monitors<'de, D>(deserializer: D) -> Result<Vec<MonitorEntry>, D::Error>
where
    D: Deserializer<'de>,
{
    let values = Vec::<serde_json::Value>::deserialize(deserializer)?;
    Ok(values
        .into_iter()
        .enumerate()
        .map(|(index, value)| MonitorEntry::from_value(index, value))
        .collect())
}

fn default_native_symbol() -> String {
    DEFAULT_NATIVE_SYMBOL.to_string()
}

const fn default_query_timeout() -> u64 {
    DEFAULT_QUERY_TIMEOUT_SECS
}

/// Chain ids are map keys, which both TOML and JSON only allow as strings.
fn deserialize_chain_table<'de, D>(deserializer: D) -> Result<BTreeMap<u64, ChainInfo>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = BTreeMap::<String, ChainInfo>::deserialize(deserializer)?;
    raw.into_iter()
        .map(|(key, chain)| {
            key.trim()
                .parse::<u64>()
                .map(|chain_id| (chain_id, chain))
                .map_err(|_| serde::de::Error::custom(format!("invalid chain id `{key}`")))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Asset, InvalidMonitor, TokenType};
    use std::io::Write;

    const TOML_CONFIG: &str = r#"
slackWebhook = "https://hooks.slack.com/services/T000/B000/XXXX"
interval = 60

[rpc.1]
rpc = "https://eth.example.org"
name = "Ethereum"

[rpc.137]
rpc = "https://polygon.example.org"
name = "Polygon"
nativeSymbol = "POL"

[[monitors]]
address = "0x00000000000000000000000000000000000000aa"
chainId = 1
tokenType = "native"
threshold = "0.5"

[[monitors]]
address = "0x00000000000000000000000000000000000000aa"
chainId = 137
tokenType = "erc20"
tokenAddress = "0x00000000000000000000000000000000000000bb"
threshold = "100"
"#;

    const JSON_CONFIG: &str = r#"{
  "rpc": {
    "1": { "rpc": "https://eth.example.org", "name": "Ethereum" }
  },
  "slackWebhook": "",
  "interval": 300,
  "monitors": [
    { "address": "0xA", "chainId": 1, "tokenType": "native", "threshold": "0.5" }
  ]
}"#;

    #[test]
    fn test_toml_config() {
        let config = Config::from_toml_str(TOML_CONFIG).unwrap();

        assert_eq!(config.interval(), Duration::from_secs(60));
        assert_eq!(
            config.query_timeout(),
            Duration::from_secs(DEFAULT_QUERY_TIMEOUT_SECS)
        );
        assert_eq!(config.rpc.len(), 2);
        assert_eq!(config.chain(1).unwrap().native_symbol, "ETH");
        assert_eq!(config.chain(137).unwrap().native_symbol, "POL");
        assert!(config.alert_target().is_some());

        assert_eq!(config.monitors.len(), 2);
        assert_eq!(
            config.monitors[0].item().unwrap().token_type,
            TokenType::Native
        );
        assert!(matches!(
            config.monitors[1].item().unwrap().asset().unwrap(),
            Asset::Erc20 { .. }
        ));
    }

    #[test]
    fn test_json_config() {
        let config = Config::from_json_str(JSON_CONFIG).unwrap();

        assert_eq!(config.interval, 300);
        assert_eq!(config.chain(1).unwrap().name, "Ethereum");
        assert_eq!(config.monitors[0].item().unwrap().threshold, "0.5");
    }

    #[test]
    fn test_toml_bad_monitor_keeps_the_rest() {
        let toml = r#"
interval = 60

[rpc.1]
rpc = "https://eth.example.org"
name = "Ethereum"

[[monitors]]
address = "0x00000000000000000000000000000000000000aa"
chainId = 1
tokenType = "native"

[[monitors]]
address = "0x00000000000000000000000000000000000000cc"
chainId = 1
tokenType = "native"
threshold = "2"
"#;
        let config = Config::from_toml_str(toml).unwrap();

        assert_eq!(config.monitors.len(), 2);
        let err = config.monitors[0].item().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidMonitor { index: 0, .. }));
        assert!(err.is_item_level());
        assert_eq!(
            config.monitors[0].address(),
            "0x00000000000000000000000000000000000000aa"
        );
        assert_eq!(config.monitors[1].item().unwrap().threshold, "2");
    }

    #[test]
    fn test_json_bad_monitors_keep_the_rest() {
        let json = r#"{
  "rpc": { "1": { "rpc": "https://eth.example.org", "name": "Ethereum" } },
  "interval": 300,
  "monitors": [
    { "address": "0xA", "chainId": 1, "tokenType": "native", "threshold": 0.5 },
    { "address": "0xB", "chainId": 1, "tokenType": "ERC20", "threshold": "1" },
    { "address": "0xC", "chainId": 1, "tokenType": "native", "threshold": "1" }
  ]
}"#;
        let config = Config::from_json_str(json).unwrap();

        assert!(matches!(
            config.monitors[0],
            MonitorEntry::Invalid(InvalidMonitor { index: 0, .. })
        ));
        assert!(matches!(
            config.monitors[1],
            MonitorEntry::Invalid(InvalidMonitor { index: 1, .. })
        ));
        assert_eq!(config.monitors[2].item().unwrap().address, "0xC");
    }

    #[test]
    fn test_monitors_must_be_a_list() {
        let json = r#"{"rpc": {}, "interval": 1, "monitors": {"address": "0xA"}}"#;
        let err = Config::from_json_str(json).unwrap_err();
        assert!(matches!(err, ConfigError::Json(_)));
    }

    #[test]
    fn test_empty_webhook_is_unset() {
        let config = Config::from_json_str(JSON_CONFIG).unwrap();
        assert_eq!(config.alert_target(), None);

        let config = Config::from_toml_str("interval = 5\n[rpc]\n").unwrap();
        assert_eq!(config.alert_target(), None);
        assert!(config.monitors.is_empty());
    }

    #[test]
    fn test_unknown_chain() {
        let config = Config::from_toml_str(TOML_CONFIG).unwrap();
        let err = config.chain(999).unwrap_err();

        assert!(matches!(err, ConfigError::UnknownChain { chain_id: 999 }));
        assert!(err.is_item_level());
    }

    #[test]
    fn test_non_numeric_chain_key() {
        let json = r#"{"rpc": {"mainnet": {"rpc": "x", "name": "y"}}, "interval": 1}"#;
        let err = Config::from_json_str(json).unwrap_err();

        assert!(matches!(err, ConfigError::Json(_)));
        assert!(err.to_string().contains("invalid chain id"));
    }

    #[test]
    fn test_zero_interval_rejected() {
        let err = Config::from_toml_str("interval = 0\n[rpc]\n").unwrap_err();
        assert!(matches!(err, ConfigError::ZeroInterval));
        assert!(!err.is_item_level());
    }

    #[test]
    fn test_zero_query_timeout_rejected() {
        let err = Config::from_toml_str("interval = 5\nqueryTimeout = 0\n[rpc]\n").unwrap_err();
        assert!(matches!(err, ConfigError::ZeroQueryTimeout));
    }

    #[test]
    fn test_from_file_by_extension() {
        let mut json = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        json.write_all(JSON_CONFIG.as_bytes()).unwrap();
        assert_eq!(Config::from_file(json.path()).unwrap().interval, 300);

        let mut toml = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        toml.write_all(TOML_CONFIG.as_bytes()).unwrap();
        assert_eq!(Config::from_file(toml.path()).unwrap().interval, 60);
    }

    #[test]
    fn test_from_file_missing() {
        let err = Config::from_file("/nonexistent/watcher.toml").unwrap_err();
        assert!(err.to_string().contains("failed to read config"));
    }
}
