//! CLI definition and dispatch.
//!
//! Every subcommand follows the same stages: load and validate the config,
//! build the catalog and provider, refresh, then print. Tables go to stdout;
//! progress and warnings go to stderr.

use chrono::Local;
use clap::{Parser, Subcommand, ValueEnum};
use std::collections::BTreeSet;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::csv_catalog_adapter::load_catalog;
use crate::adapters::csv_export_adapter::CsvExportAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::synthetic_adapter::SyntheticAdapter;
use crate::domain::catalog::Catalog;
use crate::domain::config_validation::{parse_date, parse_index_list, validate_config};
use crate::domain::correlation::CorrelationMatrix;
use crate::domain::dashboard::Dashboard;
use crate::domain::error::DashboardError;
use crate::domain::indicator::returns::calculate_cumulative_returns;
use crate::domain::indicator::stddev::calculate_stddev;
use crate::domain::indicator::SHORT_WINDOW;
use crate::domain::market_data::Lookback;
use crate::domain::overview::{index_level, world_indices, IndexLevel, IndexQuote, KeyMetrics};
use crate::domain::screener::{
    top_gainers, top_losers, PerformanceFilter, ScreenerCriteria, SectorFilter, SortKey,
    TableQuery,
};
use crate::domain::sector::{sector_members, SectorSummary};
use crate::domain::snapshot::Snapshot;
use crate::domain::technical::{technical_view, MonthlyHeatmap, SectorMonthPoint, VolatilityProfile};
use crate::ports::config_port::ConfigPort;
use crate::ports::export_port::ExportPort;
use crate::refresh::{self, FetchOptions, RefreshTask, SharedProvider};

pub const DEFAULT_INDEX_SYMBOL: &str = "^FCHI";
pub const DEFAULT_WORLD_INDICES: &str = "S&P 500=^GSPC, NASDAQ=^IXIC, DAX=^GDAXI, FTSE 100=^FTSE";
const DEFAULT_SEED: i64 = 42;
const INDEX_BASE_PRICE: f64 = 7500.0;
/// Window for volatility profiles and the screener volatility limit.
pub const VOLATILITY_LOOKBACK: Lookback = Lookback::SixMonths;
const HEATMAP_INSTRUMENTS: usize = 10;

#[derive(Parser, Debug)]
#[command(name = "cac40dash", about = "CAC 40 market dashboard")]
pub struct Cli {
    /// INI config file; built-in defaults when omitted
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Latest session for every instrument
    Snapshot {
        #[arg(long)]
        sector: Option<String>,
        /// any, up, down or stable
        #[arg(long, default_value = "any")]
        performance: PerformanceFilter,
        /// change, volume, market_cap or weight
        #[arg(long, default_value = "change")]
        sort: SortKey,
    },
    /// Per-sector weight, market cap and mean change
    Sectors {
        /// Also print monthly mean close per sector over this lookback
        #[arg(long)]
        evolution: Option<Lookback>,
        /// Also list the reporting members of this sector
        #[arg(long)]
        detail: Option<String>,
    },
    /// Filter instruments by fundamentals, performance and volatility
    Screen {
        #[arg(long)]
        min_market_cap_bn: Option<f64>,
        #[arg(long)]
        min_dividend_yield: Option<f64>,
        #[arg(long, allow_hyphen_values = true)]
        min_change_pct: Option<f64>,
        #[arg(long)]
        max_volatility_pct: Option<f64>,
        /// Repeatable; replaces the configured sector list
        #[arg(long = "sector")]
        sectors: Vec<String>,
    },
    /// Price history with moving averages for one instrument
    Technical {
        #[arg(short, long)]
        symbol: String,
        #[arg(long, default_value = "1y")]
        lookback: Lookback,
    },
    /// Volatility profile for every instrument
    Volatility {
        #[arg(long, default_value = "6mo")]
        lookback: Lookback,
    },
    /// Correlation matrix of close prices
    Correlation {
        #[arg(long, default_value = "3mo")]
        lookback: Lookback,
        /// Number of catalog instruments to include
        #[arg(long, default_value_t = 15)]
        limit: usize,
    },
    /// Key metrics, index level, world indices and top movers
    Overview {
        #[arg(long, default_value_t = 5)]
        top: usize,
        /// Also print the mean monthly return heatmap of the first ten
        /// instruments over this lookback (2y when given without a value)
        #[arg(long, num_args = 0..=1, default_missing_value = "2y")]
        heatmap: Option<Lookback>,
    },
    /// Write a table to CSV
    Export {
        #[arg(value_enum)]
        table: ExportTable,
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Refresh periodically until Ctrl-C
    Watch {
        /// Overrides [refresh] interval_secs
        #[arg(long)]
        interval: Option<u64>,
    },
    /// Validate the configuration and catalog
    Validate,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExportTable {
    Snapshots,
    Sectors,
    Screen,
}

/// Config, catalog and provider shared by every subcommand.
pub struct Context {
    pub config: FileConfigAdapter,
    pub catalog: Catalog,
    pub provider: SharedProvider,
}

pub fn run(cli: Cli) -> ExitCode {
    let config_path = cli.config.as_deref();
    match cli.command {
        Command::Snapshot {
            sector,
            performance,
            sort,
        } => with_context(config_path, |ctx| run_snapshot(ctx, sector, performance, sort)),
        Command::Sectors { evolution, detail } => {
            with_context(config_path, |ctx| run_sectors(ctx, evolution, detail.as_deref()))
        }
        Command::Screen {
            min_market_cap_bn,
            min_dividend_yield,
            min_change_pct,
            max_volatility_pct,
            sectors,
        } => with_context(config_path, |ctx| {
            let mut criteria = build_screener_criteria(&ctx.config);
            if let Some(v) = min_market_cap_bn {
                criteria.min_market_cap = v * 1e9;
            }
            if let Some(v) = min_dividend_yield {
                criteria.min_dividend_yield = v;
            }
            if let Some(v) = min_change_pct {
                criteria.min_change_pct = v;
            }
            if max_volatility_pct.is_some() {
                criteria.max_volatility_pct = max_volatility_pct;
            }
            if !sectors.is_empty() {
                criteria.sectors = sectors.into_iter().collect();
            }
            run_screen(ctx, &criteria)
        }),
        Command::Technical { symbol, lookback } => {
            with_context(config_path, |ctx| run_technical(ctx, &symbol, lookback))
        }
        Command::Volatility { lookback } => with_context(config_path, |ctx| run_volatility(ctx, lookback)),
        Command::Correlation { lookback, limit } => {
            with_context(config_path, |ctx| run_correlation(ctx, lookback, limit))
        }
        Command::Overview { top, heatmap } => with_context(config_path, |ctx| run_overview(ctx, top, heatmap)),
        Command::Export { table, output } => with_context(config_path, |ctx| run_export(ctx, table, &output)),
        Command::Watch { interval } => match load_context(config_path) {
            Ok(ctx) => run_watch(ctx, interval),
            Err(code) => code,
        },
        Command::Validate => run_validate(config_path),
    }
}

fn with_context(path: Option<&Path>, f: impl FnOnce(&Context) -> ExitCode) -> ExitCode {
    match load_context(path) {
        Ok(ctx) => f(&ctx),
        Err(code) => code,
    }
}

fn fail(e: DashboardError) -> ExitCode {
    eprintln!("error: {e}");
    (&e).into()
}

pub fn load_config(path: Option<&Path>) -> Result<FileConfigAdapter, ExitCode> {
    let loaded = match path {
        Some(p) => {
            eprintln!("Loading config from {}", p.display());
            FileConfigAdapter::from_file(p)
        }
        None => FileConfigAdapter::from_string(""),
    };
    loaded.map_err(fail)
}

pub fn load_context(path: Option<&Path>) -> Result<Context, ExitCode> {
    // Stage 1: Load and validate config
    let config = load_config(path)?;
    validate_config(&config).map_err(fail)?;

    // Stage 2: Catalog
    let catalog = build_catalog(&config).map_err(fail)?;

    // Stage 3: Provider
    let provider = build_provider(&config, &catalog).map_err(fail)?;

    Ok(Context {
        config,
        catalog,
        provider,
    })
}

pub fn build_catalog(config: &dyn ConfigPort) -> Result<Catalog, DashboardError> {
    match config.get_string("catalog", "path") {
        Some(path) if !path.trim().is_empty() => load_catalog(path.trim()),
        _ => Ok(Catalog::cac40()),
    }
}

pub fn build_provider(
    config: &dyn ConfigPort,
    catalog: &Catalog,
) -> Result<SharedProvider, DashboardError> {
    let kind = config
        .get_string("provider", "kind")
        .unwrap_or_else(|| "synthetic".to_string());

    match kind.trim().to_lowercase().as_str() {
        "csv" => {
            let data_dir = config.get_string("provider", "data_dir").ok_or_else(|| {
                DashboardError::ConfigMissing {
                    section: "provider".into(),
                    key: "data_dir".into(),
                }
            })?;
            Ok(Arc::new(CsvAdapter::new(PathBuf::from(data_dir.trim()))))
        }
        "synthetic" => {
            let end_date = match config.get_string("provider", "end_date") {
                Some(s) => parse_date(&s, "provider", "end_date")?,
                None => Local::now().date_naive(),
            };
            let seed = config.get_int("provider", "seed", DEFAULT_SEED) as u64;
            let volatility = config.get_double("provider", "daily_volatility", 0.015);
            let index_symbol = build_index_symbol(config);
            Ok(Arc::new(
                SyntheticAdapter::new(seed, end_date, volatility)
                    .with_catalog(catalog)
                    .with_base_price(&index_symbol, INDEX_BASE_PRICE),
            ))
        }
        other => Err(DashboardError::ConfigInvalid {
            section: "provider".into(),
            key: "kind".into(),
            reason: format!("unknown provider '{}'", other),
        }),
    }
}

pub fn build_index_symbol(config: &dyn ConfigPort) -> String {
    config
        .get_string("provider", "index_symbol")
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| DEFAULT_INDEX_SYMBOL.to_string())
}

pub fn build_fetch_options(config: &dyn ConfigPort) -> FetchOptions {
    FetchOptions {
        workers: config.get_int("fetch", "workers", refresh::DEFAULT_WORKERS as i64).max(1) as usize,
        timeout: Duration::from_millis(config.get_int("fetch", "timeout_ms", 5000).max(1) as u64),
    }
}

pub fn build_refresh_interval(config: &dyn ConfigPort) -> Duration {
    let secs = config.get_int("refresh", "interval_secs", refresh::DEFAULT_INTERVAL.as_secs() as i64);
    Duration::from_secs(secs.max(1) as u64)
}

pub fn build_screener_criteria(config: &dyn ConfigPort) -> ScreenerCriteria {
    ScreenerCriteria {
        min_market_cap: config.get_double("screener", "min_market_cap_bn", 10.0) * 1e9,
        min_dividend_yield: config.get_double("screener", "min_dividend_yield", 2.0),
        min_change_pct: config.get_double("screener", "min_change_pct", 0.0),
        max_volatility_pct: config.get_opt_double("screener", "max_volatility_pct"),
        sectors: config.get_list("screener", "sectors").into_iter().collect::<BTreeSet<_>>(),
    }
}

pub fn build_world_indices(config: &dyn ConfigPort) -> Result<Vec<(String, String)>, DashboardError> {
    let list = config
        .get_string("overview", "world_indices")
        .unwrap_or_else(|| DEFAULT_WORLD_INDICES.to_string());
    parse_index_list(&list).map_err(|reason| DashboardError::ConfigInvalid {
        section: "overview".into(),
        key: "world_indices".into(),
        reason,
    })
}

fn runtime() -> Result<tokio::runtime::Runtime, ExitCode> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| fail(DashboardError::Io(e)))
}

/// One concurrent refresh of a fresh dashboard.
pub fn refresh_dashboard(ctx: &Context) -> Result<Dashboard, ExitCode> {
    eprintln!("Fetching {} instruments...", ctx.catalog.len());
    let rt = runtime()?;
    let mut dashboard = Dashboard::new(ctx.catalog.clone());
    let table = rt.block_on(refresh::fetch_all(
        &ctx.catalog,
        Arc::clone(&ctx.provider),
        Lookback::OneDay,
        build_fetch_options(&ctx.config),
    ));
    dashboard.apply(table);
    report_skipped(&dashboard);
    Ok(dashboard)
}

fn report_skipped(dashboard: &Dashboard) {
    let table = dashboard.snapshot_table();
    if !table.skipped.is_empty() {
        let symbols: Vec<&str> = table.skipped.iter().map(|s| s.symbol.as_str()).collect();
        eprintln!(
            "warning: {} of {} instruments without data: {}",
            symbols.len(),
            dashboard.catalog().len(),
            symbols.join(", ")
        );
    }
}

fn run_snapshot(
    ctx: &Context,
    sector: Option<String>,
    performance: PerformanceFilter,
    sort: SortKey,
) -> ExitCode {
    let dashboard = match refresh_dashboard(ctx) {
        Ok(d) => d,
        Err(code) => return code,
    };
    let query = TableQuery {
        sector: sector.map(SectorFilter::Only).unwrap_or_default(),
        performance,
        sort,
    };
    let rows = dashboard.query(&query);
    print!("{}", format_snapshot_table(&rows));
    eprintln!("{} rows", rows.len());
    ExitCode::SUCCESS
}

fn run_sectors(ctx: &Context, evolution: Option<Lookback>, detail: Option<&str>) -> ExitCode {
    let dashboard = match refresh_dashboard(ctx) {
        Ok(d) => d,
        Err(code) => return code,
    };
    print!("{}", format_sector_table(dashboard.sectors()));

    if let Some(sector) = detail {
        if !ctx.catalog.sectors().contains(&sector) {
            return fail(DashboardError::Catalog {
                reason: format!("unknown sector '{}'", sector),
            });
        }
        let members: Vec<Snapshot> = sector_members(dashboard.snapshots(), sector)
            .into_iter()
            .cloned()
            .collect();
        println!("\n{}", sector);
        print!("{}", format_snapshot_table(&members));
    }

    if let Some(lookback) = evolution {
        eprintln!("Computing sector evolution over {}...", lookback);
        let points = dashboard.sector_evolution(ctx.provider.as_ref(), lookback);
        println!();
        print!("{}", format_sector_evolution(&points));
    }
    ExitCode::SUCCESS
}

fn run_screen(ctx: &Context, criteria: &ScreenerCriteria) -> ExitCode {
    let mut dashboard = match refresh_dashboard(ctx) {
        Ok(d) => d,
        Err(code) => return code,
    };
    let rows = screen_dashboard(ctx, &mut dashboard, criteria);
    print!("{}", format_snapshot_table(&rows));
    eprintln!("{} of {} instruments match", rows.len(), dashboard.snapshots().len());
    ExitCode::SUCCESS
}

/// Screens `dashboard`, computing volatility first when the criteria limit it.
fn screen_dashboard(ctx: &Context, dashboard: &mut Dashboard, criteria: &ScreenerCriteria) -> Vec<Snapshot> {
    if criteria.max_volatility_pct.is_some() {
        eprintln!("Computing volatility over {}...", VOLATILITY_LOOKBACK);
    }
    dashboard.screen_with_volatility(ctx.provider.as_ref(), VOLATILITY_LOOKBACK, criteria)
}

fn run_technical(ctx: &Context, symbol: &str, lookback: Lookback) -> ExitCode {
    let dashboard = Dashboard::new(ctx.catalog.clone()).with_index(&build_index_symbol(&ctx.config));
    let bars = match dashboard.history(ctx.provider.as_ref(), symbol, lookback) {
        Ok(bars) => bars,
        Err(e) => return fail(e),
    };

    let view = technical_view(symbol, &bars);
    let rolling_std = calculate_stddev(&bars, SHORT_WINDOW);
    let cumulative = calculate_cumulative_returns(&bars);

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<12} {:>10} {:>12} {:>10} {:>10} {:>10} {:>9}",
        "date", "close", "volume", "sma20", "sma50", "std20", "cum%"
    );
    for i in 0..view.dates.len() {
        let _ = writeln!(
            out,
            "{:<12} {:>10.2} {:>12} {:>10} {:>10} {:>10} {:>9}",
            view.dates[i].to_string(),
            view.closes[i],
            view.volumes[i],
            opt(view.sma_short.value_at(i), 2),
            opt(view.sma_long.value_at(i), 2),
            opt(rolling_std.value_at(i), 2),
            opt(cumulative.value_at(i), 2),
        );
    }
    print!("{out}");
    eprintln!("{}: {} bars over {}", symbol, bars.len(), lookback);
    ExitCode::SUCCESS
}

fn run_volatility(ctx: &Context, lookback: Lookback) -> ExitCode {
    let dashboard = Dashboard::new(ctx.catalog.clone());
    eprintln!("Fetching {} histories over {}...", ctx.catalog.len(), lookback);
    let profiles = dashboard.volatility_profiles(ctx.provider.as_ref(), lookback);
    if profiles.is_empty() {
        return fail(DashboardError::NoData {
            symbol: "*".into(),
        });
    }
    print!("{}", format_volatility_table(&profiles));
    ExitCode::SUCCESS
}

fn run_correlation(ctx: &Context, lookback: Lookback, limit: usize) -> ExitCode {
    let dashboard = Dashboard::new(ctx.catalog.clone());
    eprintln!("Fetching {} histories over {}...", limit.min(ctx.catalog.len()), lookback);
    let matrix = dashboard.correlation(ctx.provider.as_ref(), lookback, limit);
    if matrix.is_empty() {
        return fail(DashboardError::NoData {
            symbol: "*".into(),
        });
    }
    print!("{}", format_correlation(&matrix));
    ExitCode::SUCCESS
}

fn run_overview(ctx: &Context, top: usize, heatmap: Option<Lookback>) -> ExitCode {
    let indices = match build_world_indices(&ctx.config) {
        Ok(i) => i,
        Err(e) => return fail(e),
    };
    let dashboard = match refresh_dashboard(ctx) {
        Ok(d) => d,
        Err(code) => return code,
    };
    let provider = ctx.provider.as_ref();

    let index_symbol = build_index_symbol(&ctx.config);
    let level = index_level(provider, &index_symbol, dashboard.snapshots());
    let quotes = world_indices(provider, &indices);
    print!(
        "{}",
        format_overview(&dashboard.key_metrics(), level, &quotes)
    );

    println!("\nTop gainers");
    print!("{}", format_snapshot_table(&top_gainers(dashboard.snapshots(), top)));
    println!("\nTop losers");
    print!("{}", format_snapshot_table(&top_losers(dashboard.snapshots(), top)));

    if let Some(lookback) = heatmap {
        eprintln!("Computing monthly returns over {}...", lookback);
        let map = dashboard.monthly_heatmap(provider, lookback, HEATMAP_INSTRUMENTS);
        println!("\nMonthly returns (%)");
        print!("{}", format_heatmap(&map));
    }
    if let Some(at) = dashboard.last_refresh() {
        eprintln!("Last refresh: {}", at.format("%H:%M:%S"));
    }
    ExitCode::SUCCESS
}

fn run_export(ctx: &Context, table: ExportTable, output: &Path) -> ExitCode {
    let mut dashboard = match refresh_dashboard(ctx) {
        Ok(d) => d,
        Err(code) => return code,
    };
    let exporter = CsvExportAdapter;
    let result = match table {
        ExportTable::Snapshots => exporter.write_snapshots(dashboard.snapshots(), output),
        ExportTable::Sectors => exporter.write_sectors(dashboard.sectors(), output),
        ExportTable::Screen => {
            let criteria = build_screener_criteria(&ctx.config);
            let rows = screen_dashboard(ctx, &mut dashboard, &criteria);
            exporter.write_screen(&rows, output)
        }
    };
    match result {
        Ok(()) => {
            eprintln!("Wrote {}", output.display());
            ExitCode::SUCCESS
        }
        Err(e) => fail(e),
    }
}

fn run_watch(ctx: Context, interval: Option<u64>) -> ExitCode {
    let period = match interval {
        Some(secs) if secs > 0 => Duration::from_secs(secs),
        Some(_) => {
            return fail(DashboardError::ConfigInvalid {
                section: "refresh".into(),
                key: "interval_secs".into(),
                reason: "interval must be positive".into(),
            });
        }
        None => build_refresh_interval(&ctx.config),
    };
    let rt = match runtime() {
        Ok(rt) => rt,
        Err(code) => return code,
    };

    eprintln!("Refreshing every {}s, Ctrl-C to stop", period.as_secs());
    let task = RefreshTask::new(
        Arc::clone(&ctx.provider),
        build_fetch_options(&ctx.config),
        period,
    );
    let (tx, rx) = tokio::sync::watch::channel(false);

    let dashboard = rt.block_on(async {
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                let _ = tx.send(true);
            }
        });
        task.run(Dashboard::new(ctx.catalog.clone()), rx, |d| {
            let m = d.key_metrics();
            println!(
                "[{}] #{} {} reporting, mean {:+.2}%, {} up / {} down / {} flat",
                d.last_refresh()
                    .map(|t| t.format("%H:%M:%S").to_string())
                    .unwrap_or_default(),
                d.cycles(),
                d.snapshots().len(),
                m.mean_change_pct,
                m.advancers,
                m.decliners,
                m.unchanged
            );
            report_skipped(d);
        })
        .await
    });

    eprintln!("Stopped after {} refreshes", dashboard.cycles());
    ExitCode::SUCCESS
}

fn run_validate(config_path: Option<&Path>) -> ExitCode {
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };
    if let Err(e) = validate_config(&config) {
        return fail(e);
    }

    let catalog = match build_catalog(&config) {
        Ok(c) => c,
        Err(e) => return fail(e),
    };
    if let Err(e) = build_world_indices(&config) {
        return fail(e);
    }

    eprintln!("\nCatalog: {} instruments", catalog.len());
    for sector in catalog.sectors() {
        let members: Vec<&str> = catalog.members_of(sector).map(|i| i.symbol.as_str()).collect();
        eprintln!("  {}: {}", sector, members.join(", "));
    }
    let total_weight: f64 = catalog.instruments().iter().map(|i| i.weight).sum();
    eprintln!("  total weight: {:.1}", total_weight);

    match missing_csv_files(&config, &catalog) {
        Ok(missing) if !missing.is_empty() => {
            eprintln!("  warning: no CSV file for {}", missing.join(", "));
        }
        Ok(_) => {}
        Err(e) => return fail(e),
    }

    let fetch = build_fetch_options(&config);
    eprintln!("\nProvider: {}", config.get_string("provider", "kind").unwrap_or_else(|| "synthetic".into()));
    eprintln!("  workers: {}, timeout: {}ms", fetch.workers, fetch.timeout.as_millis());
    eprintln!("  refresh: every {}s", build_refresh_interval(&config).as_secs());

    eprintln!("\nConfiguration is valid.");
    ExitCode::SUCCESS
}

/// Catalog symbols without a bar file, when the CSV provider is configured.
pub fn missing_csv_files(config: &dyn ConfigPort, catalog: &Catalog) -> Result<Vec<String>, DashboardError> {
    let kind = config.get_string("provider", "kind").unwrap_or_default();
    if kind.trim().to_lowercase() != "csv" {
        return Ok(Vec::new());
    }
    let Some(data_dir) = config.get_string("provider", "data_dir") else {
        return Err(DashboardError::ConfigMissing {
            section: "provider".into(),
            key: "data_dir".into(),
        });
    };
    let present = CsvAdapter::new(PathBuf::from(data_dir.trim())).list_symbols()?;
    Ok(catalog
        .symbols()
        .filter(|s| !present.iter().any(|p| p == s))
        .map(str::to_string)
        .collect())
}

fn opt(value: Option<f64>, decimals: usize) -> String {
    match value {
        Some(v) => format!("{:.*}", decimals, v),
        None => "-".to_string(),
    }
}

pub fn format_snapshot_table(rows: &[Snapshot]) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<9} {:<22} {:<13} {:>10} {:>8} {:>12} {:>9} {:>6} {:>6}",
        "symbol", "name", "sector", "price", "chg%", "volume", "cap(bn)", "yld%", "vol%"
    );
    for s in rows {
        let _ = writeln!(
            out,
            "{:<9} {:<22} {:<13} {:>10.2} {:>+8.2} {:>12} {:>9.1} {:>6.2} {:>6}",
            s.symbol,
            s.name,
            s.sector,
            s.price,
            s.change_pct,
            s.volume,
            s.market_cap / 1e9,
            s.dividend_yield,
            opt(s.volatility_pct, 2)
        );
    }
    out
}

pub fn format_sector_table(sectors: &[SectorSummary]) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<13} {:>7} {:>10} {:>14} {:>8} {:>8}",
        "sector", "weight", "cap(bn)", "volume", "members", "chg%"
    );
    for s in sectors {
        let _ = writeln!(
            out,
            "{:<13} {:>7.1} {:>10.1} {:>14} {:>5}/{:<2} {:>+8.2}",
            s.sector,
            s.total_weight,
            s.total_market_cap / 1e9,
            s.total_volume,
            s.reporting_count,
            s.member_count,
            s.mean_change_pct
        );
    }
    out
}

pub fn format_sector_evolution(points: &[SectorMonthPoint]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{:<8} {:<13} {:>10}", "month", "sector", "mean");
    for p in points {
        let _ = writeln!(
            out,
            "{:<8} {:<13} {:>10.2}",
            p.month.format("%Y-%m").to_string(),
            p.sector,
            p.mean_close
        );
    }
    out
}

pub fn format_volatility_table(profiles: &[VolatilityProfile]) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<9} {:>10} {:>10} {:>7} {:>14}",
        "symbol", "last", "std", "vol%", "avg volume"
    );
    for p in profiles {
        let _ = writeln!(
            out,
            "{:<9} {:>10.2} {:>10.2} {:>7.2} {:>14.0}",
            p.symbol, p.last_price, p.volatility, p.volatility_pct, p.mean_volume
        );
    }
    out
}

pub fn format_correlation(matrix: &CorrelationMatrix) -> String {
    let mut out = String::new();
    let _ = write!(out, "{:<9}", "");
    for s in &matrix.symbols {
        let _ = write!(out, " {:>8}", s);
    }
    out.push('\n');
    for (i, s) in matrix.symbols.iter().enumerate() {
        let _ = write!(out, "{:<9}", s);
        for v in matrix.row(i) {
            let _ = write!(out, " {:>8}", opt(*v, 2));
        }
        out.push('\n');
    }
    out
}

pub fn format_overview(
    metrics: &KeyMetrics,
    level: Option<IndexLevel>,
    quotes: &[IndexQuote],
) -> String {
    let mut out = String::new();
    match level {
        Some(IndexLevel::Quoted(v)) => {
            let _ = writeln!(out, "CAC 40          {:>12.2}", v);
        }
        Some(IndexLevel::Estimated(v)) => {
            let _ = writeln!(out, "CAC 40 (est.)   {:>12.2}", v);
        }
        None => {
            let _ = writeln!(out, "CAC 40          {:>12}", "-");
        }
    }
    let _ = writeln!(out, "Variation       {:>+12.2}%", metrics.mean_change_pct);
    let _ = writeln!(
        out,
        "Breadth         {:>4} up {:>4} down {:>4} flat",
        metrics.advancers, metrics.decliners, metrics.unchanged
    );
    let _ = writeln!(out, "Volume          {:>12}", metrics.total_volume);
    let _ = writeln!(out, "Market cap (bn) {:>12.1}", metrics.total_market_cap / 1e9);
    for q in quotes {
        let _ = writeln!(out, "{:<15} {:>12.2} {:>+8.2}%", q.name, q.value, q.change_pct);
    }
    out
}

pub fn format_heatmap(map: &MonthlyHeatmap) -> String {
    let mut out = String::new();
    let _ = write!(out, "{:<6}", "year");
    for month in 1..=12 {
        let _ = write!(out, " {:>6}", month);
    }
    out.push('\n');
    for year in map.years() {
        let _ = write!(out, "{:<6}", year);
        for month in 1..=12 {
            let _ = write!(out, " {:>6}", opt(map.get(year, month), 1));
        }
        out.push('\n');
    }
    out
}
