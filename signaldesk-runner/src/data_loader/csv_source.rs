//! CSV bar files: `{bars_dir}/{SYMBOL}_{timeframe}.csv`, falling back to
//! `{bars_dir}/{SYMBOL}.csv`.
//!
//! Header: `date,open,high,low,close,volume` (`ts`/`timestamp` accepted for
//! the date column, `volume` optional).

use std::fs::File;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::Deserialize;
use signaldesk_core::domain::PriceBar;
use tracing::debug;

use super::{finalize_bars, parse_bar_date, BarSource, LoadError, Timeframe};

#[derive(Debug, Deserialize)]
struct CsvRow {
    #[serde(alias = "ts", alias = "timestamp")]
    date: String,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    #[serde(default)]
    volume: f64,
}

#[derive(Debug, Clone)]
pub struct CsvBarSource {
    dir: PathBuf,
}

impl CsvBarSource {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    /// First existing candidate file for the symbol, if any.
    pub fn resolve_path(&self, symbol: &str, timeframe: Timeframe) -> Option<PathBuf> {
        let symbol = symbol.to_ascii_uppercase();
        [
            self.dir.join(format!("{symbol}_{timeframe}.csv")),
            self.dir.join(format!("{symbol}.csv")),
        ]
        .into_iter()
        .find(|p| p.is_file())
    }

    fn read_rows(symbol: &str, path: &Path) -> Result<Vec<PriceBar>, LoadError> {
        let file = File::open(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(file);

        let mut bars = Vec::new();
        for (i, record) in reader.deserialize::<CsvRow>().enumerate() {
            let row = record.map_err(|e| LoadError::Malformed {
                symbol: symbol.to_string(),
                reason: format!("{}: {e}", path.display()),
            })?;
            let date = parse_bar_date(&row.date).ok_or_else(|| LoadError::Malformed {
                symbol: symbol.to_string(),
                reason: format!("{} row {}: bad date '{}'", path.display(), i + 1, row.date),
            })?;
            bars.push(PriceBar {
                date,
                open: row.open,
                high: row.high,
                low: row.low,
                close: row.close,
                volume: row.volume,
            });
        }
        Ok(bars)
    }
}

impl BarSource for CsvBarSource {
    fn name(&self) -> &str {
        "csv"
    }

    fn load(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<PriceBar>, LoadError> {
        let path = self
            .resolve_path(symbol, timeframe)
            .ok_or_else(|| LoadError::NotFound {
                symbol: symbol.to_string(),
                timeframe,
            })?;
        debug!(symbol, path = %path.display(), "reading bar file");
        let raw = Self::read_rows(symbol, &path)?;
        finalize_bars(symbol, raw, start, end)
    }
}
