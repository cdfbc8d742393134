//! Daily PnL ledger read from CSV.
//!
//! Columns: `id,date,realized,unrealized`. `id` is optional and defaults to
//! the 1-based row number; `realized`/`unrealized` default to 0.0 when empty.
//! A missing file is an empty ledger.

use std::fs::File;
use std::path::Path;

use serde::{Deserialize, Serialize};
use signaldesk_core::domain::DailyPnlEntry;
use signaldesk_core::performance::PerformanceSummary;
use thiserror::Error;
use tracing::debug;

use crate::data_loader::parse_bar_date;

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("failed to read pnl ledger {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed pnl ledger {path} row {row}: {reason}")]
    Malformed {
        path: String,
        row: usize,
        reason: String,
    },
}

/// One ledger row as served by `GET /metrics/pnl/daily`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PnlRow {
    pub id: i64,
    pub date: chrono::NaiveDate,
    pub realized: f64,
    pub unrealized: f64,
}

impl From<PnlRow> for DailyPnlEntry {
    fn from(row: PnlRow) -> Self {
        DailyPnlEntry {
            date: row.date,
            realized: row.realized,
            unrealized: row.unrealized,
        }
    }
}

#[derive(Debug, Deserialize)]
struct CsvPnlRow {
    #[serde(default)]
    id: Option<i64>,
    date: String,
    #[serde(default)]
    realized: Option<f64>,
    #[serde(default)]
    unrealized: Option<f64>,
}

/// Rows in file order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PnlLedger {
    rows: Vec<PnlRow>,
}

impl PnlLedger {
    pub fn from_rows(rows: Vec<PnlRow>) -> Self {
        Self { rows }
    }

    pub fn from_csv_path(path: &Path) -> Result<Self, LedgerError> {
        let label = path.display().to_string();
        let file = match File::open(path) {
            Ok(f) => f,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %label, "pnl ledger not found, using empty ledger");
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(LedgerError::Io {
                    path: label,
                    source,
                })
            }
        };
        Self::from_reader(file, &label)
    }

    /// Parse CSV from any reader. `label` names the source in errors.
    pub fn from_reader<R: std::io::Read>(reader: R, label: &str) -> Result<Self, LedgerError> {
        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut rows = Vec::new();
        for (i, record) in rdr.deserialize::<CsvPnlRow>().enumerate() {
            let row_no = i + 1;
            let malformed = |reason: String| LedgerError::Malformed {
                path: label.to_string(),
                row: row_no,
                reason,
            };
            let raw = record.map_err(|e| malformed(e.to_string()))?;
            let date =
                parse_bar_date(&raw.date).ok_or_else(|| malformed(format!("bad date '{}'", raw.date)))?;
            let realized = raw.realized.unwrap_or(0.0);
            let unrealized = raw.unrealized.unwrap_or(0.0);
            if !realized.is_finite() || !unrealized.is_finite() {
                return Err(malformed("non-finite pnl value".into()));
            }
            rows.push(PnlRow {
                id: raw.id.unwrap_or(row_no as i64),
                date,
                realized,
                unrealized,
            });
        }
        Ok(Self { rows })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows sorted by date, then id.
    pub fn sorted_rows(&self) -> Vec<PnlRow> {
        let mut rows = self.rows.clone();
        rows.sort_by(|a, b| a.date.cmp(&b.date).then(a.id.cmp(&b.id)));
        rows
    }

    /// Entries in file order, so later duplicates win when summarized.
    pub fn entries(&self) -> Vec<DailyPnlEntry> {
        self.rows.iter().copied().map(DailyPnlEntry::from).collect()
    }

    pub fn summary(&self, initial_equity: f64) -> PerformanceSummary {
        PerformanceSummary::from_daily_pnl(&self.entries(), initial_equity)
    }
}
