//! Balance watcher.
//!
//! A [`Watcher`] checks every configured monitor item once per sweep: it
//! queries the item's balance, normalizes it, compares it against the item's
//! threshold and hands an alert to the dispatcher on breach. The
//! [`scheduler`] repeats sweeps at a fixed rate.

pub mod metrics;
pub mod scheduler;
pub mod threshold;

use crate::metrics::Metrics;
use alert::{AlertMessage, Delivery, DeliveryError, Dispatcher, Transport, WebhookTransport};
use alloy_provider::DynProvider;
use balance::{
    monitor::BalanceMonitor, parse_address, query_normalized, BalanceQuery, ChainQuery,
    NormalizedBalance, QueryError,
};
use config::{Asset, Config, ConfigError, MonitorEntry, MonitorItem};
use std::{collections::HashMap, sync::Arc, time::Instant};
use thiserror::Error;
use threshold::{ParseError, Threshold};
use tracing::{error, info};

pub use scheduler::{fixed_rate, Scheduler, Ticker};

/// Why a monitor item could not be evaluated this sweep.
#[derive(Error, Debug)]
pub enum CheckError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Query(#[from] QueryError),
}

impl CheckError {
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Config(_) => "config",
            Self::Parse(_) => "parse",
            Self::Query(_) => "query",
        }
    }
}

/// Result of evaluating one monitor item.
#[derive(Debug)]
pub enum ItemOutcome {
    /// Balance at or above the threshold.
    Healthy { balance: NormalizedBalance },
    /// Balance below the threshold; an alert was dispatched.
    ///
    /// A failed delivery does not undo the detection.
    Breach {
        balance: NormalizedBalance,
        alert: AlertMessage,
        delivery: Result<Delivery, DeliveryError>,
    },
}

impl ItemOutcome {
    pub const fn balance(&self) -> &NormalizedBalance {
        match self {
            Self::Healthy { balance } | Self::Breach { balance, .. } => balance,
        }
    }

    pub const fn is_breach(&self) -> bool {
        matches!(self, Self::Breach { .. })
    }

    const fn label(&self) -> &'static str {
        match self {
            Self::Healthy { .. } => "healthy",
            Self::Breach { .. } => "breach",
        }
    }
}

/// Per-item results of one sweep, in monitor order.
#[derive(Debug, Default)]
pub struct SweepReport {
    pub results: Vec<Result<ItemOutcome, CheckError>>,
}

impl SweepReport {
    pub fn breaches(&self) -> impl Iterator<Item = &ItemOutcome> {
        self.results
            .iter()
            .filter_map(|result| result.as_ref().ok())
            .filter(|outcome| outcome.is_breach())
    }

    pub fn failures(&self) -> impl Iterator<Item = &CheckError> {
        self.results.iter().filter_map(|result| result.as_ref().err())
    }
}

/// Checks monitor items against their chains and dispatches alerts.
pub struct Watcher<Q, T> {
    config: Arc<Config>,
    chains: HashMap<u64, Q>,
    /// Configured chains that have no query client, with the reason
    unavailable: HashMap<u64, String>,
    dispatcher: Dispatcher<T>,
    metrics: Metrics,
}

/// Build a watcher with one RPC provider per configured chain.
///
/// A chain whose RPC url cannot be used is logged and left out; its items
/// fail with [`ConfigError::ChainUnavailable`] on every sweep.
pub fn connect(
    config: Arc<Config>,
) -> eyre::Result<Watcher<BalanceMonitor<DynProvider>, WebhookTransport>> {
    let mut chains = HashMap::new();
    let mut unavailable = HashMap::new();

    for (&chain_id, chain) in &config.rpc {
        match client::create_provider(&chain.rpc) {
            Ok(provider) => {
                chains.insert(chain_id, BalanceMonitor::new(provider));
            }
            Err(e) => {
                error!(chain_id, chain = %chain.name, error = %e, "Chain disabled");
                unavailable.insert(chain_id, e.to_string());
            }
        }
    }

    let transport = WebhookTransport::new(config.query_timeout())?;
    let dispatcher = Dispatcher::new(transport, config.alert_target());

    Ok(Watcher::new(config, chains, dispatcher).with_unavailable(unavailable))
}

impl<Q, T> Watcher<Q, T>
where
    Q: ChainQuery,
    T: Transport,
{
    pub fn new(config: Arc<Config>, chains: HashMap<u64, Q>, dispatcher: Dispatcher<T>) -> Self {
        Self {
            config,
            chains,
            unavailable: HashMap::new(),
            dispatcher,
            metrics: Metrics::new(),
        }
    }

    /// Mark chains that are configured but could not be connected.
    pub fn with_unavailable(mut self, unavailable: HashMap<u64, String>) -> Self {
        self.unavailable = unavailable;
        self
    }

    /// Whether alerts go to a webhook rather than only to the log.
    pub fn has_alert_target(&self) -> bool {
        self.dispatcher.has_target()
    }

    /// Check every monitor item once, in configured order.
    ///
    /// A failing item is logged and recorded; it never stops the sweep.
    pub async fn sweep(&self) -> SweepReport {
        let started = Instant::now();
        info!("Checking all balances ({} monitors)", self.config.monitors.len());

        let mut report = SweepReport {
            results: Vec::with_capacity(self.config.monitors.len()),
        };

        for entry in &self.config.monitors {
            let result = self.check_entry(entry).await;
            match &result {
                Ok(outcome) => self.metrics.record_check(outcome.label()),
                Err(e) => {
                    error!(
                        address = %entry.address(),
                        chain_id = ?entry.chain_id(),
                        kind = e.kind(),
                        error = %e,
                        "Error checking balance for {}",
                        entry.address()
                    );
                    self.metrics.record_check(e.kind());
                }
            }
            report.results.push(result);
        }

        self.metrics.record_sweep(started.elapsed());
        report
    }

    async fn check_entry(&self, entry: &MonitorEntry) -> Result<ItemOutcome, CheckError> {
        let item = entry.item()?;
        self.check_item(item).await
    }

    /// Evaluate a single monitor item and alert on breach.
    pub async fn check_item(&self, item: &MonitorItem) -> Result<ItemOutcome, CheckError> {
        let chain = self.config.chain(item.chain_id)?;
        let query_chain = self.chain_query(item.chain_id)?;
        let asset = item.asset()?;
        let threshold = Threshold::parse(&item.threshold)?;

        let query = match asset {
            Asset::Native => BalanceQuery::NativeBalance {
                address: parse_address(&item.address)?,
            },
            Asset::Erc20 { token_address } => BalanceQuery::ERC20Balance {
                token: parse_address(token_address)?,
                holder: parse_address(&item.address)?,
            },
        };

        let balance = query_normalized(
            query_chain,
            query,
            &chain.native_symbol,
            self.config.query_timeout(),
        )
        .await?;

        info!(
            address = %item.address,
            chain_id = item.chain_id,
            balance = %balance.display,
            symbol = %balance.symbol,
            "Checking {} on {} ({}): {}",
            item.address,
            chain.name,
            item.chain_id,
            balance
        );
        if let Ok(value) = balance.display.parse::<f64>() {
            self.metrics
                .set_balance(&item.address, item.chain_id, &balance.symbol, value);
        }

        if !threshold.is_breached_by(&balance) {
            return Ok(ItemOutcome::Healthy { balance });
        }

        let alert = AlertMessage {
            address: item.address.clone(),
            chain_name: chain.name.clone(),
            chain_id: item.chain_id,
            symbol: balance.symbol.clone(),
            balance: balance.display.clone(),
            threshold: item.threshold.clone(),
        };

        let delivery = self.dispatcher.dispatch(&alert).await;
        match &delivery {
            Ok(delivery) => self.metrics.record_alert(delivery.as_str()),
            Err(e) => {
                error!(
                    address = %item.address,
                    chain_id = item.chain_id,
                    error = %e,
                    "Error sending alert for {} on {}",
                    item.address,
                    alert.chain_label()
                );
                self.metrics.record_alert("failed");
            }
        }

        Ok(ItemOutcome::Breach {
            balance,
            alert,
            delivery,
        })
    }

    fn chain_query(&self, chain_id: u64) -> Result<&Q, ConfigError> {
        self.chains
            .get(&chain_id)
            .ok_or_else(|| ConfigError::ChainUnavailable {
                chain_id,
                reason: self
                    .unavailable
                    .get(&chain_id)
                    .cloned()
                    .unwrap_or_else(|| "no query client".to_string()),
            })
    }
}
