use clap::Parser;
use config::{Config, MonitorEntry};
use std::{path::PathBuf, sync::Arc};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use watcher::{fixed_rate, metrics::install_prometheus_exporter, Scheduler};

#[derive(Parser)]
#[command(name = "watcher")]
#[command(about = "Alert when watched account balances drop below their thresholds")]
struct Cli {
    /// Path to the configuration file (.toml or .json)
    #[arg(short, long, env = "WATCHER_CONFIG", default_value = "config.toml")]
    config: PathBuf,

    /// Serve Prometheus metrics on this port
    #[arg(long, env = "WATCHER_METRICS_PORT")]
    metrics_port: Option<u16>,

    /// Emit logs as JSON lines
    #[arg(long)]
    json_logs: bool,

    /// Run a single sweep and exit
    #[arg(long)]
    once: bool,
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    if json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.json_logs);

    info!("Starting balance watcher");
    info!("Loading config: {}", cli.config.display());

    let config = Arc::new(Config::from_file(&cli.config)?);

    info!("Loaded config:");
    info!("  Chains: {}", config.rpc.len());
    info!("  Monitors: {}", config.monitors.len());
    info!("  Interval: {}s", config.interval);
    info!("  Query timeout: {}s", config.query_timeout);

    for entry in &config.monitors {
        if let MonitorEntry::Invalid(invalid) = entry {
            warn!(
                index = invalid.index,
                address = %entry.address(),
                reason = %invalid.reason,
                "Monitor entry is invalid and will be reported every sweep"
            );
        }
    }

    if let Some(port) = cli.metrics_port {
        install_prometheus_exporter(port)?;
        info!("Serving metrics on port {}", port);
    }

    let watcher = Arc::new(watcher::connect(Arc::clone(&config))?);
    info!(
        "  Alerts: {}",
        if watcher.has_alert_target() {
            "webhook"
        } else {
            "log only"
        }
    );

    if cli.once {
        watcher.sweep().await;
        return Ok(());
    }

    let scheduler = Scheduler::new(watcher, fixed_rate(config.interval()));

    tokio::select! {
        () = scheduler.run() => {}
        signal = tokio::signal::ctrl_c() => {
            signal?;
            info!("Received shutdown signal, stopping");
        }
    }

    Ok(())
}
