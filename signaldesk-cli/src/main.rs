//! SignalDesk CLI: backtest, performance and ledger commands.
//!
//! Commands:
//! - `backtest`: run the SMA crossover backtest for one or more symbols and
//!   save the artifact set
//! - `performance`: summarize the daily PnL ledger
//! - `pnl`: list daily PnL rows
//! - `bars`: print the bars the configured source returns

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use signaldesk_core::performance::{PerformanceSummary, TradeStats};
use signaldesk_core::DataStatus;
use signaldesk_runner::{
    build_source, init_logging, run_batch, save_artifacts, AppConfig, BacktestReport,
    BacktestRequest, PnlLedger, Timeframe,
};
use tracing::warn;

#[derive(Parser)]
#[command(
    name = "signaldesk",
    version,
    about = "SignalDesk CLI: SMA crossover backtests and account performance"
)]
struct Cli {
    /// Path to the TOML config file.
    #[arg(long, global = true, env = "SIGNALDESK_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the SMA crossover backtest.
    Backtest {
        /// Symbols to backtest (repeatable).
        #[arg(long = "symbol", required = true)]
        symbols: Vec<String>,

        /// Start date (YYYY-MM-DD).
        #[arg(long)]
        start: String,

        /// End date (YYYY-MM-DD).
        #[arg(long)]
        end: String,

        /// Bar timeframe. Only 1Day series can be backtested.
        #[arg(long, default_value = "1Day")]
        timeframe: Timeframe,

        /// Short window. Defaults to `engine.default_short_window`.
        #[arg(long)]
        short: Option<i64>,

        /// Long window. Defaults to `engine.default_long_window`.
        #[arg(long)]
        long: Option<i64>,

        /// Output directory for run artifacts.
        #[arg(long, default_value = "results")]
        output_dir: PathBuf,

        /// Print full reports as JSON instead of a summary table.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Summarize the daily PnL ledger.
    Performance {
        /// Ledger CSV. Defaults to `data.pnl_ledger`.
        #[arg(long)]
        ledger: Option<PathBuf>,
    },
    /// List daily PnL rows ordered by date.
    Pnl {
        /// Ledger CSV. Defaults to `data.pnl_ledger`.
        #[arg(long)]
        ledger: Option<PathBuf>,
    },
    /// Print bars from the configured data source.
    Bars {
        #[arg(long)]
        symbol: String,

        #[arg(long)]
        start: String,

        #[arg(long)]
        end: String,

        #[arg(long, default_value = "1Day")]
        timeframe: Timeframe,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::load(cli.config.as_deref()).context("loading config")?;
    init_logging(&config.logging);

    match cli.command {
        Commands::Backtest {
            symbols,
            start,
            end,
            timeframe,
            short,
            long,
            output_dir,
            json,
        } => run_backtest_cmd(
            &config,
            symbols,
            parse_date(&start)?,
            parse_date(&end)?,
            timeframe,
            (short, long),
            &output_dir,
            json,
        ),
        Commands::Performance { ledger } => {
            let path = ledger.unwrap_or_else(|| config.data.pnl_ledger.clone());
            run_performance(&path, config.engine.initial_equity)
        }
        Commands::Pnl { ledger } => {
            let path = ledger.unwrap_or_else(|| config.data.pnl_ledger.clone());
            run_pnl(&path)
        }
        Commands::Bars {
            symbol,
            start,
            end,
            timeframe,
        } => run_bars(&config, &symbol, parse_date(&start)?, parse_date(&end)?, timeframe),
    }
}

fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").with_context(|| format!("invalid date '{s}'"))
}

#[allow(clippy::too_many_arguments)]
fn run_backtest_cmd(
    config: &AppConfig,
    symbols: Vec<String>,
    start: NaiveDate,
    end: NaiveDate,
    timeframe: Timeframe,
    (short, long): (Option<i64>, Option<i64>),
    output_dir: &Path,
    json: bool,
) -> Result<()> {
    if start > end {
        bail!("--start {start} is after --end {end}");
    }

    let source = build_source(&config.data)?;
    let requests: Vec<BacktestRequest> = symbols
        .into_iter()
        .map(|symbol| BacktestRequest {
            symbol,
            timeframe,
            start,
            end,
            short_window: short,
            long_window: long,
        })
        .collect();

    let outcomes = run_batch(source.as_ref(), &requests, &config.engine);

    let mut failures = 0;
    for outcome in &outcomes {
        match &outcome.result {
            Ok(report) => {
                if json {
                    println!("{}", serde_json::to_string_pretty(report)?);
                } else {
                    print_summary(report);
                }
                let paths = save_artifacts(report, output_dir)?;
                println!("Artifacts saved to: {}", paths.run_dir.display());
            }
            Err(e) => {
                failures += 1;
                warn!(symbol = %outcome.symbol, kind = e.kind(), "backtest failed");
                eprintln!("Error for {}: {e}", outcome.symbol);
            }
        }
    }

    if failures > 0 {
        bail!("{failures} of {} backtests failed", outcomes.len());
    }
    Ok(())
}

fn print_summary(report: &BacktestReport) {
    let result = &report.result;
    let stats: &TradeStats = &report.trade_stats;

    println!();
    println!("=== {} ({}) ===", result.symbol, report.timeframe);
    println!(
        "Windows:        {} / {}",
        report.windows.short(),
        report.windows.long()
    );
    println!("Period:         {} to {}", result.start, result.end);
    println!("Bars:           {}", report.bar_count);
    if matches!(report.data_status, DataStatus::Insufficient { .. }) {
        println!("Data:           insufficient for the long window");
    }
    println!("Initial equity: {:.2}", result.initial_equity);
    println!("Final equity:   {:.2}", result.final_equity);
    println!("Total return:   {:.2}%", result.total_return_pct);
    match report.summary.cagr_pct {
        Some(cagr) => println!("CAGR:           {cagr:.2}%"),
        None => println!("CAGR:           n/a"),
    }
    println!("Max drawdown:   {:.2}%", result.max_drawdown_pct);
    println!(
        "Trades:         {} ({} won, {} lost, win rate {:.1}%)",
        stats.trade_count,
        stats.winners,
        stats.losers,
        stats.win_rate * 100.0
    );
    println!("Net PnL:        {:.2}", stats.net_pnl());
    if let Some(open) = &report.open_position {
        println!(
            "Open position:  entered {} at {:.2}",
            open.entry_date, open.entry_price
        );
    }
    println!("Run ID:         {}", &report.run_id[..16.min(report.run_id.len())]);
}

fn run_performance(ledger_path: &Path, initial_equity: f64) -> Result<()> {
    let ledger = PnlLedger::from_csv_path(ledger_path)?;
    let summary = ledger.summary(initial_equity);
    print_performance(ledger_path, ledger.len(), &summary);
    Ok(())
}

fn print_performance(path: &Path, rows: usize, s: &PerformanceSummary) {
    println!("Ledger:         {} ({rows} rows)", path.display());
    match (s.start_date, s.end_date) {
        (Some(start), Some(end)) => println!("Period:         {start} to {end}"),
        _ => println!("Period:         (empty)"),
    }
    println!("Initial equity: {:.2}", s.initial_equity);
    println!("Final equity:   {:.2}", s.final_equity);
    println!("Total return:   {:.2}%", s.total_return_pct);
    match s.cagr_pct {
        Some(cagr) => println!("CAGR:           {cagr:.2}%"),
        None => println!("CAGR:           n/a"),
    }
    println!("Max drawdown:   {:.2}%", s.max_drawdown_pct);
}

fn run_pnl(ledger_path: &Path) -> Result<()> {
    let ledger = PnlLedger::from_csv_path(ledger_path)?;
    if ledger.is_empty() {
        println!("Ledger is empty: {}", ledger_path.display());
        return Ok(());
    }

    println!("{:>6} {:<12} {:>14} {:>14}", "ID", "Date", "Realized", "Unrealized");
    println!("{}", "-".repeat(49));
    for row in ledger.sorted_rows() {
        println!(
            "{:>6} {:<12} {:>14.2} {:>14.2}",
            row.id,
            row.date.to_string(),
            row.realized,
            row.unrealized
        );
    }
    Ok(())
}

fn run_bars(
    config: &AppConfig,
    symbol: &str,
    start: NaiveDate,
    end: NaiveDate,
    timeframe: Timeframe,
) -> Result<()> {
    if start > end {
        bail!("--start {start} is after --end {end}");
    }
    if !timeframe.is_daily() {
        bail!("timeframe {timeframe} is not supported, bars are keyed by trading day (use 1Day)");
    }
    let source = build_source(&config.data)?;
    let bars = source
        .load(symbol, timeframe, start, end)
        .with_context(|| format!("loading {symbol} from {}", source.name()))?;

    if bars.is_empty() {
        println!("No bars for {symbol} between {start} and {end}");
        return Ok(());
    }

    println!(
        "{:<12} {:>10} {:>10} {:>10} {:>10} {:>12}",
        "Date", "Open", "High", "Low", "Close", "Volume"
    );
    println!("{}", "-".repeat(69));
    for bar in &bars {
        println!(
            "{:<12} {:>10.2} {:>10.2} {:>10.2} {:>10.2} {:>12.0}",
            bar.date.to_string(),
            bar.open,
            bar.high,
            bar.low,
            bar.close,
            bar.volume
        );
    }
    println!("{} bars", bars.len());
    Ok(())
}
