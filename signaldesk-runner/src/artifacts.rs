//! Artifact export for a backtest report.
//!
//! `save_artifacts` writes `{output_dir}/{run_id}/` containing:
//! - `manifest.json`: the full `BacktestReport`
//! - `trades.csv`: closed trades
//! - `equity.csv`: one row per bar date

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use signaldesk_core::domain::{EquityPoint, Trade};

use crate::runner::{BacktestReport, SCHEMA_VERSION};

/// Paths written by [`save_artifacts`].
#[derive(Debug, Clone)]
pub struct ArtifactPaths {
    pub run_dir: PathBuf,
    pub manifest: PathBuf,
    pub trades_csv: PathBuf,
    pub equity_csv: PathBuf,
}

pub fn export_json(report: &BacktestReport) -> Result<String> {
    serde_json::to_string_pretty(report).context("failed to serialize BacktestReport to JSON")
}

/// Deserialize a report, rejecting schema versions newer than this build.
pub fn import_json(json: &str) -> Result<BacktestReport> {
    let report: BacktestReport =
        serde_json::from_str(json).context("failed to deserialize BacktestReport from JSON")?;
    if report.schema_version > SCHEMA_VERSION {
        bail!(
            "unsupported schema version {} (max supported: {})",
            report.schema_version,
            SCHEMA_VERSION
        );
    }
    Ok(report)
}

/// Columns: entry_date, exit_date, entry_price, exit_price, pnl, return_pct
pub fn export_trades_csv(trades: &[Trade]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record([
        "entry_date",
        "exit_date",
        "entry_price",
        "exit_price",
        "pnl",
        "return_pct",
    ])?;
    for t in trades {
        wtr.write_record([
            &t.entry_date.to_string(),
            &t.exit_date.to_string(),
            &format!("{:.6}", t.entry_price),
            &format!("{:.6}", t.exit_price),
            &format!("{:.6}", t.pnl),
            &format!("{:.4}", t.return_pct() * 100.0),
        ])?;
    }
    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

/// Columns: date, equity
pub fn export_equity_csv(curve: &[EquityPoint]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(["date", "equity"])?;
    for p in curve {
        wtr.write_record([&p.date.to_string(), &format!("{:.2}", p.equity)])?;
    }
    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

/// Write the artifact set for one report. Existing files for the same run id
/// are overwritten.
pub fn save_artifacts(report: &BacktestReport, output_dir: &Path) -> Result<ArtifactPaths> {
    let run_dir = output_dir.join(&report.run_id);
    std::fs::create_dir_all(&run_dir)
        .with_context(|| format!("failed to create artifact directory {}", run_dir.display()))?;

    let manifest = run_dir.join("manifest.json");
    std::fs::write(&manifest, export_json(report)?)
        .with_context(|| format!("failed to write {}", manifest.display()))?;

    let trades_csv = run_dir.join("trades.csv");
    std::fs::write(&trades_csv, export_trades_csv(&report.result.trades)?)
        .with_context(|| format!("failed to write {}", trades_csv.display()))?;

    let equity_csv = run_dir.join("equity.csv");
    std::fs::write(&equity_csv, export_equity_csv(&report.summary.equity_curve)?)
        .with_context(|| format!("failed to write {}", equity_csv.display()))?;

    Ok(ArtifactPaths {
        run_dir,
        manifest,
        trades_csv,
        equity_csv,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    #[test]
    fn trades_csv_has_header_and_rows() {
        let trades = vec![Trade {
            entry_date: d(2),
            exit_date: d(5),
            entry_price: 10.0,
            exit_price: 12.0,
            pnl: 2.0,
        }];
        let csv = export_trades_csv(&trades).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "entry_date,exit_date,entry_price,exit_price,pnl,return_pct");
        assert_eq!(
            lines[1],
            "2024-01-02,2024-01-05,10.000000,12.000000,2.000000,20.0000"
        );
    }

    #[test]
    fn equity_csv_rows() {
        let csv = export_equity_csv(&[EquityPoint::new(d(2), 100.0), EquityPoint::new(d(3), 101.5)])
            .unwrap();
        assert_eq!(csv, "date,equity\n2024-01-02,100.00\n2024-01-03,101.50\n");
    }

    #[test]
    fn empty_exports_are_header_only() {
        assert_eq!(export_equity_csv(&[]).unwrap(), "date,equity\n");
        assert_eq!(export_trades_csv(&[]).unwrap().lines().count(), 1);
    }
}
