//! Concurrent snapshot fetch and the periodic refresh cycle.
//!
//! Provider calls are synchronous, so each one runs on the blocking pool under
//! a timeout while a semaphore bounds how many are in flight. The aggregation
//! itself stays in [`crate::domain::snapshot::assemble`] and sees the same
//! fail-soft outcomes as the sequential path.

use crate::domain::catalog::Catalog;
use crate::domain::dashboard::Dashboard;
use crate::domain::market_data::{Lookback, MarketData};
use crate::domain::snapshot::{assemble, SkipReason, SnapshotTable};
use crate::ports::market_data_port::MarketDataPort;
use log::{debug, info, warn};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Semaphore};
use tokio::time::{interval, timeout, MissedTickBehavior};

pub type SharedProvider = Arc<dyn MarketDataPort + Send + Sync>;

pub const DEFAULT_WORKERS: usize = 4;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(5000);
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchOptions {
    pub workers: usize,
    pub timeout: Duration,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

async fn fetch_one(
    provider: SharedProvider,
    semaphore: Arc<Semaphore>,
    symbol: String,
    lookback: Lookback,
    limit: Duration,
) -> Result<MarketData, SkipReason> {
    let _permit = semaphore
        .acquire_owned()
        .await
        .map_err(|e| SkipReason::ProviderError(e.to_string()))?;

    let task_symbol = symbol.clone();
    let call = tokio::task::spawn_blocking(move || provider.fetch(&task_symbol, lookback));

    // On timeout the blocking call is abandoned, not interrupted; its result
    // is dropped when it eventually returns.
    match timeout(limit, call).await {
        Err(_) => Err(SkipReason::Timeout),
        Ok(Err(join)) => Err(SkipReason::ProviderError(join.to_string())),
        Ok(Ok(Err(e))) => Err(SkipReason::ProviderError(e.to_string())),
        Ok(Ok(Ok(data))) => {
            debug!("{}: {} bars", symbol, data.bars.len());
            Ok(data)
        }
    }
}

/// Fetches every catalog instrument concurrently and assembles the table in
/// catalog order.
pub async fn fetch_all(
    catalog: &Catalog,
    provider: SharedProvider,
    lookback: Lookback,
    options: FetchOptions,
) -> SnapshotTable {
    let semaphore = Arc::new(Semaphore::new(options.workers.max(1)));

    let handles: Vec<_> = catalog
        .symbols()
        .map(|symbol| {
            let symbol = symbol.to_string();
            let task = fetch_one(
                Arc::clone(&provider),
                Arc::clone(&semaphore),
                symbol.clone(),
                lookback,
                options.timeout,
            );
            (symbol, tokio::spawn(task))
        })
        .collect();

    let mut outcomes = Vec::with_capacity(handles.len());
    for (symbol, handle) in handles {
        match handle.await {
            Ok(outcome) => outcomes.push((symbol, outcome)),
            Err(e) => warn!("fetch task for {} failed: {}", symbol, e),
        }
    }

    assemble(catalog, outcomes)
}

/// Periodic refresh of a [`Dashboard`].
///
/// Cycles never overlap: a cycle that overruns the interval delays the next
/// tick instead of bursting to catch up. The first cycle runs immediately.
pub struct RefreshTask {
    provider: SharedProvider,
    options: FetchOptions,
    period: Duration,
}

impl RefreshTask {
    pub fn new(provider: SharedProvider, options: FetchOptions, period: Duration) -> Self {
        Self {
            provider,
            options,
            period,
        }
    }

    /// Runs one refresh cycle.
    pub async fn cycle(&self, dashboard: &mut Dashboard) {
        self.provider.begin_cycle();
        let table = fetch_all(
            dashboard.catalog(),
            Arc::clone(&self.provider),
            Lookback::OneDay,
            self.options,
        )
        .await;
        dashboard.apply(table);
    }

    /// Refreshes until `shutdown` turns true or its sender is dropped, calling
    /// `on_cycle` after each completed cycle. Returns the final dashboard.
    pub async fn run<F>(
        &self,
        mut dashboard: Dashboard,
        mut shutdown: watch::Receiver<bool>,
        mut on_cycle: F,
    ) -> Dashboard
    where
        F: FnMut(&Dashboard),
    {
        let mut ticker = interval(self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.cycle(&mut dashboard).await;
                    on_cycle(&dashboard);
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        info!("refresh stopped after {} cycles", dashboard.cycles());
        dashboard
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::error::DashboardError;
    use crate::domain::ohlcv::HistoricalBar;
    use chrono::NaiveDate;
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    struct Probe {
        slow: HashSet<String>,
        failing: HashSet<String>,
        in_flight: AtomicUsize,
        peak: AtomicUsize,
        cycles: AtomicUsize,
        seen: Mutex<Vec<String>>,
    }

    impl MarketDataPort for Probe {
        fn fetch(&self, symbol: &str, _lookback: Lookback) -> Result<MarketData, DashboardError> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            self.seen.lock().unwrap().push(symbol.to_string());

            let pause = if self.slow.contains(symbol) { 300 } else { 5 };
            std::thread::sleep(Duration::from_millis(pause));
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            if self.failing.contains(symbol) {
                return Err(DashboardError::ProviderUnavailable {
                    symbol: symbol.to_string(),
                    reason: "down".into(),
                });
            }
            let close = 100.0 + self.cycles.load(Ordering::SeqCst) as f64;
            Ok(MarketData {
                bars: vec![HistoricalBar {
                    symbol: symbol.to_string(),
                    date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
                    open: 100.0,
                    high: close.max(100.0),
                    low: 99.0,
                    close,
                    volume: 10,
                }],
                fundamentals: None,
            })
        }

        fn begin_cycle(&self) {
            self.cycles.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn fetch_all_keeps_catalog_order_and_bounds_concurrency() {
        let catalog = Catalog::cac40();
        let probe = Arc::new(Probe::default());
        let options = FetchOptions {
            workers: 3,
            timeout: Duration::from_secs(5),
        };

        let table = fetch_all(&catalog, probe.clone(), Lookback::OneDay, options).await;

        assert_eq!(table.len(), catalog.len());
        let order: Vec<_> = table.rows.iter().map(|s| s.symbol.as_str()).collect();
        let expected: Vec<_> = catalog.symbols().collect();
        assert_eq!(order, expected);
        assert!(probe.peak.load(Ordering::SeqCst) <= 3);
        assert_eq!(probe.seen.lock().unwrap().len(), catalog.len());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn timeouts_and_errors_are_skipped() {
        let catalog = Catalog::cac40();
        let probe = Probe {
            slow: ["AIR.PA".to_string()].into(),
            failing: ["BNP.PA".to_string()].into(),
            ..Default::default()
        };
        let options = FetchOptions {
            workers: 8,
            timeout: Duration::from_millis(100),
        };

        let table = fetch_all(&catalog, Arc::new(probe), Lookback::OneDay, options).await;

        assert_eq!(table.len(), catalog.len() - 2);
        assert!(table.get("AIR.PA").is_none());
        assert!(table.get("BNP.PA").is_none());
        let air = table.skipped.iter().find(|s| s.symbol == "AIR.PA").unwrap();
        assert_eq!(air.reason, SkipReason::Timeout);
        let bnp = table.skipped.iter().find(|s| s.symbol == "BNP.PA").unwrap();
        assert!(matches!(&bnp.reason, SkipReason::ProviderError(e) if e.contains("down")));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn run_refreshes_until_shutdown() {
        let probe = Arc::new(Probe::default());
        let task = RefreshTask::new(
            probe.clone(),
            FetchOptions {
                workers: 15,
                timeout: Duration::from_secs(5),
            },
            Duration::from_millis(100),
        );
        let (tx, rx) = watch::channel(false);

        let mut prices = Vec::new();
        let handle = tokio::spawn(async move {
            task.run(Dashboard::new(Catalog::cac40()), rx, move |d| {
                prices.push(d.snapshots()[0].price);
                assert_eq!(prices.len() as u64, d.cycles());
            })
            .await
        });

        tokio::time::sleep(Duration::from_millis(250)).await;
        tx.send(true).unwrap();
        let dashboard = handle.await.unwrap();

        let cycles = dashboard.cycles();
        assert!(cycles >= 2, "expected at least two cycles, got {cycles}");
        assert_eq!(probe.cycles.load(Ordering::SeqCst) as u64, cycles);
        assert_eq!(dashboard.snapshots()[0].price, 100.0 + cycles as f64);
        assert!(dashboard.last_refresh().is_some());
    }

    #[tokio::test]
    async fn dropped_sender_stops_run() {
        let task = RefreshTask::new(
            Arc::new(Probe::default()),
            FetchOptions::default(),
            Duration::from_secs(3600),
        );
        let (tx, rx) = watch::channel(false);
        drop(tx);
        let dashboard = task.run(Dashboard::new(Catalog::cac40()), rx, |_| {}).await;
        assert!(dashboard.cycles() <= 1);
    }
}
