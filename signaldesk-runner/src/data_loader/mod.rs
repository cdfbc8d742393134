//! Bar loading for the runner.
//!
//! A [`BarSource`] returns the bars for one symbol, timeframe and inclusive
//! date range. Three implementations are provided:
//! 1. [`CsvBarSource`]: one CSV file per symbol under a directory
//! 2. [`HttpBarSource`]: a JSON bar endpoint over blocking HTTP
//! 3. [`SyntheticBarSource`]: deterministic random walk for development
//!
//! Every source funnels its raw rows through [`finalize_bars`], so the engine
//! always receives an ascending series with unique dates and finite closes.

mod csv_source;
mod http_source;
mod synthetic;
mod timeframe;

pub use csv_source::CsvBarSource;
pub use http_source::HttpBarSource;
pub use synthetic::SyntheticBarSource;
pub use timeframe::{Timeframe, UnknownTimeframe};

use std::path::PathBuf;
use std::sync::Arc;

use chrono::NaiveDate;
use signaldesk_core::domain::{validate_series, PriceBar};
use thiserror::Error;

use crate::config::{DataConfig, DataSourceKind};

/// Errors from the data loading layer.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("no bar data for '{symbol}' ({timeframe})")]
    NotFound { symbol: String, timeframe: Timeframe },

    #[error("malformed bar data for '{symbol}': {reason}")]
    Malformed { symbol: String, reason: String },

    #[error("upstream bar request for '{symbol}' failed: {reason}")]
    Upstream { symbol: String, reason: String },

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl LoadError {
    /// A missing symbol is an empty series, not a failure.
    pub fn is_not_found(&self) -> bool {
        matches!(self, LoadError::NotFound { .. })
    }
}

/// Supplier of historical bars.
pub trait BarSource: Send + Sync {
    /// Human-readable name of this source.
    fn name(&self) -> &str;

    /// Bars for `symbol` with `start <= date <= end`, ascending, one per date.
    fn load(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<PriceBar>, LoadError>;
}

/// Build the configured source.
pub fn build_source(config: &DataConfig) -> Result<Arc<dyn BarSource>, LoadError> {
    let source: Arc<dyn BarSource> = match config.source {
        DataSourceKind::Csv => Arc::new(CsvBarSource::new(&config.bars_dir)),
        DataSourceKind::Http => Arc::new(HttpBarSource::new(
            &config.base_url,
            std::time::Duration::from_secs(config.timeout_secs),
        )?),
        DataSourceKind::Synthetic => Arc::new(SyntheticBarSource::new()),
    };
    Ok(source)
}

/// Restrict to `start..=end`, sort ascending and validate.
///
/// Duplicate dates and non-finite closes are rejected rather than repaired.
pub fn finalize_bars(
    symbol: &str,
    mut bars: Vec<PriceBar>,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<PriceBar>, LoadError> {
    bars.retain(|b| b.date >= start && b.date <= end);
    bars.sort_by_key(|b| b.date);
    validate_series(&bars).map_err(|e| LoadError::Malformed {
        symbol: symbol.to_string(),
        reason: e.to_string(),
    })?;
    Ok(bars)
}

/// Deterministic BLAKE3 hash over a bar series.
///
/// Covers the symbol, every date and every OHLCV value, so any change in the
/// input data changes the hash.
pub fn dataset_hash(symbol: &str, bars: &[PriceBar]) -> String {
    let mut hasher = blake3::Hasher::new();
    hasher.update(symbol.as_bytes());
    for bar in bars {
        hasher.update(bar.date.to_string().as_bytes());
        hasher.update(&bar.open.to_le_bytes());
        hasher.update(&bar.high.to_le_bytes());
        hasher.update(&bar.low.to_le_bytes());
        hasher.update(&bar.close.to_le_bytes());
        hasher.update(&bar.volume.to_le_bytes());
    }
    hasher.finalize().to_hex().to_string()
}

/// Parse a bar date. Accepts `YYYY-MM-DD` or an RFC 3339 timestamp, of which
/// only the calendar date is kept.
pub(crate) fn parse_bar_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    let day = raw.get(..10).unwrap_or(raw);
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}


#[cfg(test)]
mod tests {
    use super::test_support::{bar, d};
    use super::*;

    #[test]
    fn finalize_filters_and_sorts() {
        let bars = vec![
            bar("2024-01-05", 3.0),
            bar("2024-01-01", 0.0),
            bar("2024-01-03", 2.0),
            bar("2024-01-02", 1.0),
            bar("2024-01-09", 9.0),
        ];
        let out = finalize_bars("SPY", bars, d("2024-01-02"), d("2024-01-05")).unwrap();
        let closes: Vec<f64> = out.iter().map(|b| b.close).collect();
        assert_eq!(closes, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn finalize_rejects_duplicates() {
        let bars = vec![bar("2024-01-02", 1.0), bar("2024-01-02", 2.0)];
        let err = finalize_bars("SPY", bars, d("2024-01-01"), d("2024-01-31")).unwrap_err();
        assert!(matches!(err, LoadError::Malformed { .. }));
        assert!(err.to_string().contains("duplicate"));
    }

    #[test]
    fn finalize_rejects_non_finite_close() {
        let bars = vec![bar("2024-01-02", f64::NAN)];
        let err = finalize_bars("SPY", bars, d("2024-01-01"), d("2024-01-31")).unwrap_err();
        assert!(matches!(err, LoadError::Malformed { .. }));
    }

    #[test]
    fn finalize_ignores_bad_rows_outside_range() {
        let bars = vec![bar("2023-12-01", f64::NAN), bar("2024-01-02", 1.0)];
        let out = finalize_bars("SPY", bars, d("2024-01-01"), d("2024-01-31")).unwrap();
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn dataset_hash_is_deterministic_and_sensitive() {
        let a = vec![bar("2024-01-02", 1.0), bar("2024-01-03", 2.0)];
        let mut b = a.clone();
        assert_eq!(dataset_hash("SPY", &a), dataset_hash("SPY", &b));
        b[1].close = 2.5;
        assert_ne!(dataset_hash("SPY", &a), dataset_hash("SPY", &b));
        assert_ne!(dataset_hash("SPY", &a), dataset_hash("QQQ", &a));
        assert_eq!(dataset_hash("SPY", &a).len(), 64);
    }

    #[test]
    fn parses_plain_and_timestamp_dates() {
        assert_eq!(parse_bar_date("2024-01-02"), Some(d("2024-01-02")));
        assert_eq!(
            parse_bar_date("2024-01-02T05:00:00+00:00"),
            Some(d("2024-01-02"))
        );
        assert_eq!(parse_bar_date("01/02/2024"), None);
        assert_eq!(parse_bar_date(""), None);
    }
}
