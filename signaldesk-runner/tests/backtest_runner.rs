//! Integration tests for the runner: CSV fixtures on disk through the full
//! load → engine → report → artifacts path.

use std::path::Path;

use chrono::NaiveDate;
use signaldesk_runner::artifacts::{import_json, save_artifacts};
use signaldesk_runner::config::{AppConfig, EngineConfig};
use signaldesk_runner::data_loader::{build_source, CsvBarSource};
use signaldesk_runner::ledger::PnlLedger;
use signaldesk_runner::runner::{run_backtest_report, run_batch, run_sma_backtest, BacktestRequest};

fn d(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

/// Write `{SYMBOL}_1Day.csv` with consecutive daily closes from 2024-01-01.
fn write_bars(dir: &Path, symbol: &str, closes: &[f64]) {
    let mut body = String::from("date,open,high,low,close,volume\n");
    for (i, close) in closes.iter().enumerate() {
        let date = d("2024-01-01") + chrono::Duration::days(i as i64);
        body.push_str(&format!("{date},{close},{close},{close},{close},1000\n"));
    }
    std::fs::write(dir.join(format!("{symbol}_1Day.csv")), body).unwrap();
}

const SCENARIO: [f64; 10] = [10.0, 10.0, 10.0, 10.0, 12.0, 14.0, 16.0, 14.0, 12.0, 10.0];

#[test]
fn csv_scenario_end_to_end() {
    let tmp = tempfile::tempdir().unwrap();
    write_bars(tmp.path(), "TEST", &SCENARIO);

    let source = CsvBarSource::new(tmp.path());
    let request = BacktestRequest::new("TEST", d("2024-01-01"), d("2024-01-31")).with_windows(2, 4);
    let result = run_sma_backtest(&source, &request, &EngineConfig::default()).unwrap();

    assert_eq!(result.symbol, "TEST");
    assert_eq!(result.trades.len(), 1);
    let trade = &result.trades[0];
    assert_eq!(trade.entry_date, d("2024-01-05"));
    assert_eq!(trade.exit_date, d("2024-01-09"));
    assert_eq!(trade.pnl, trade.exit_price - trade.entry_price);

    let json = serde_json::to_value(&result).unwrap();
    for key in [
        "symbol",
        "start",
        "end",
        "initial_equity",
        "final_equity",
        "total_return_pct",
        "max_drawdown_pct",
        "trades",
    ] {
        assert!(json.get(key).is_some(), "missing key {key}");
    }
    assert_eq!(json["start"], "2024-01-01");
}

#[test]
fn date_range_trims_the_series() {
    let tmp = tempfile::tempdir().unwrap();
    write_bars(tmp.path(), "TEST", &SCENARIO);

    let source = CsvBarSource::new(tmp.path());
    // Only the first five bars: not enough for the exit.
    let request = BacktestRequest::new("TEST", d("2024-01-01"), d("2024-01-05")).with_windows(2, 4);
    let report = run_backtest_report(&source, &request, &EngineConfig::default()).unwrap();

    assert_eq!(report.bar_count, 5);
    assert!(report.result.trades.is_empty());
    let open = report.open_position.expect("entry on the last bar stays open");
    assert_eq!(open.entry_date, d("2024-01-05"));
    assert_eq!(report.summary.end_date, Some(d("2024-01-05")));
}

#[test]
fn artifacts_are_written_and_reloadable() {
    let data = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    write_bars(data.path(), "TEST", &SCENARIO);

    let source = CsvBarSource::new(data.path());
    let request = BacktestRequest::new("TEST", d("2024-01-01"), d("2024-01-31")).with_windows(2, 4);
    let report = run_backtest_report(&source, &request, &EngineConfig::default()).unwrap();
    let paths = save_artifacts(&report, out.path()).unwrap();

    assert_eq!(paths.run_dir, out.path().join(&report.run_id));
    assert!(paths.manifest.is_file());

    let trades = std::fs::read_to_string(&paths.trades_csv).unwrap();
    assert_eq!(trades.lines().count(), 2);
    let equity = std::fs::read_to_string(&paths.equity_csv).unwrap();
    assert_eq!(equity.lines().count(), 11);

    let manifest = std::fs::read_to_string(&paths.manifest).unwrap();
    let reloaded = import_json(&manifest).unwrap();
    assert_eq!(reloaded.run_id, report.run_id);
    assert_eq!(reloaded.result, report.result);
}

#[test]
fn future_schema_version_is_rejected() {
    let data = tempfile::tempdir().unwrap();
    write_bars(data.path(), "TEST", &SCENARIO);
    let source = CsvBarSource::new(data.path());
    let request = BacktestRequest::new("TEST", d("2024-01-01"), d("2024-01-31")).with_windows(2, 4);
    let mut report = run_backtest_report(&source, &request, &EngineConfig::default()).unwrap();
    report.schema_version = 99;

    let json = serde_json::to_string(&report).unwrap();
    let err = import_json(&json).unwrap_err();
    assert!(err.to_string().contains("unsupported schema version"));
}

#[test]
fn configured_source_and_batch() {
    let data = tempfile::tempdir().unwrap();
    write_bars(data.path(), "AAA", &SCENARIO);
    write_bars(data.path(), "BBB", &[5.0; 30]);

    let toml = format!(
        "[data]\nsource = \"csv\"\nbars_dir = {:?}\n",
        data.path().display().to_string()
    );
    let config = AppConfig::from_toml(&toml).unwrap();
    let source = build_source(&config.data).unwrap();

    let requests: Vec<BacktestRequest> = ["AAA", "BBB", "MISSING"]
        .iter()
        .map(|s| BacktestRequest::new(*s, d("2024-01-01"), d("2024-03-31")).with_windows(2, 4))
        .collect();
    let outcomes = run_batch(source.as_ref(), &requests, &config.engine);

    assert_eq!(outcomes.len(), 3);
    let aaa = outcomes[0].result.as_ref().unwrap();
    assert_eq!(aaa.result.trades.len(), 1);
    let bbb = outcomes[1].result.as_ref().unwrap();
    assert!(bbb.result.trades.is_empty());
    let missing = outcomes[2].result.as_ref().unwrap();
    assert_eq!(missing.bar_count, 0);
    assert_eq!(missing.result.final_equity, config.engine.initial_equity);
}

#[test]
fn ledger_file_summary() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("pnl.csv");
    std::fs::write(
        &path,
        "id,date,realized,unrealized\n1,2024-01-02,0,0\n2,2024-01-03,500,-200\n3,2024-01-04,-100,0\n",
    )
    .unwrap();

    let ledger = PnlLedger::from_csv_path(&path).unwrap();
    let summary = ledger.summary(10_000.0);
    let values: Vec<f64> = summary.equity_curve.iter().map(|p| p.equity).collect();
    assert_eq!(values, vec![10_000.0, 10_300.0, 10_400.0]);
    assert_eq!(summary.start_date, Some(d("2024-01-02")));
    assert!((summary.total_return_pct - 4.0).abs() < 1e-10);
    assert_eq!(summary.max_drawdown_pct, 0.0);
}
