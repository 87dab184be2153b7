//! Fixed-rate sweep scheduling.
//!
//! The first sweep starts as soon as the scheduler runs. Later sweeps start
//! one interval after the previous start, whether or not that sweep has
//! finished: each sweep runs in its own task, so slow sweeps may overlap.

use crate::Watcher;
use alert::Transport;
use balance::ChainQuery;
use std::{future::Future, sync::Arc, time::Duration};
use tokio::time::{Interval, MissedTickBehavior};
use tracing::{debug, info};

/// Shortest interval handed to tokio, which rejects a zero period.
const MIN_INTERVAL: Duration = Duration::from_millis(1);

/// Source of sweep start signals.
pub trait Ticker: Send {
    /// Resolve when the next sweep should start.
    fn tick(&mut self) -> impl Future<Output = ()> + Send;
}

impl Ticker for Interval {
    async fn tick(&mut self) {
        Self::tick(self).await;
    }
}

/// An interval whose first tick completes immediately and whose ticks keep a
/// fixed rate, catching up in a burst after a stall.
pub fn fixed_rate(period: Duration) -> Interval {
    let mut interval = tokio::time::interval(period.max(MIN_INTERVAL));
    interval.set_missed_tick_behavior(MissedTickBehavior::Burst);
    interval
}

pub struct Scheduler<Q, T, K> {
    watcher: Arc<Watcher<Q, T>>,
    ticker: K,
}

impl<Q, T, K> Scheduler<Q, T, K>
where
    Q: ChainQuery + 'static,
    T: Transport + 'static,
    K: Ticker,
{
    pub const fn new(watcher: Arc<Watcher<Q, T>>, ticker: K) -> Self {
        Self { watcher, ticker }
    }

    /// Run sweeps until the task is dropped. Never returns.
    pub async fn run(mut self) {
        info!("Starting balance monitor");

        let mut sweep_number: u64 = 0;
        loop {
            self.ticker.tick().await;
            sweep_number += 1;
            debug!(sweep = sweep_number, "Starting sweep");

            let watcher = Arc::clone(&self.watcher);
            tokio::spawn(async move {
                let report = watcher.sweep().await;
                debug!(
                    sweep = sweep_number,
                    checked = report.results.len(),
                    failed = report.failures().count(),
                    alerts = report.breaches().count(),
                    "Sweep finished"
                );
            });
        }
    }
}
