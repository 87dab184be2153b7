//! Prometheus metrics for the watcher.
//!
//! All metrics are aggregated in the [`Metrics`] struct. Without an installed
//! exporter every call is a no-op.

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use std::time::Duration;

/// Aggregated metrics for the watcher.
#[derive(Debug, Clone)]
pub struct Metrics {
    _private: (),
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    /// Create a new metrics instance and register all metric descriptions.
    pub fn new() -> Self {
        Self::register_descriptions();
        Self { _private: () }
    }

    fn register_descriptions() {
        describe_counter!("watcher_sweeps_total", "Total number of completed sweeps");
        describe_histogram!(
            "watcher_sweep_duration_seconds",
            "Duration of each sweep in seconds"
        );
        describe_counter!(
            "watcher_checks_total",
            "Monitor item checks by outcome (healthy, breach, config, parse, query)"
        );
        describe_counter!(
            "watcher_alerts_total",
            "Alerts by delivery result (sent, logged, failed)"
        );
        describe_gauge!(
            "watcher_balance",
            "Last observed normalized balance per monitored address"
        );
    }

    /// Record a completed sweep.
    pub fn record_sweep(&self, duration: Duration) {
        counter!("watcher_sweeps_total").increment(1);
        histogram!("watcher_sweep_duration_seconds").record(duration.as_secs_f64());
    }

    /// Record the outcome of one item check.
    pub fn record_check(&self, outcome: &'static str) {
        counter!("watcher_checks_total", "outcome" => outcome).increment(1);
    }

    /// Record an alert leaving the dispatcher.
    pub fn record_alert(&self, delivery: &'static str) {
        counter!("watcher_alerts_total", "delivery" => delivery).increment(1);
    }

    /// Set the last observed balance of a monitored address.
    pub fn set_balance(&self, address: &str, chain_id: u64, symbol: &str, value: f64) {
        gauge!(
            "watcher_balance",
            "address" => address.to_string(),
            "chain_id" => chain_id.to_string(),
            "symbol" => symbol.to_string()
        )
        .set(value);
    }
}

/// Install the Prometheus metrics exporter and start the HTTP server.
///
/// Returns an error if the server fails to bind to the specified port.
pub fn install_prometheus_exporter(port: u16) -> eyre::Result<()> {
    use metrics_exporter_prometheus::PrometheusBuilder;
    use std::net::SocketAddr;

    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| eyre::eyre!("Failed to install Prometheus exporter: {}", e))?;

    Ok(())
}
