//! PriceBar: the fundamental market data unit.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// OHLCV bar for a single symbol on a single trading day.
///
/// Volume is kept as `f64` because upstream feeds report fractional volume for
/// some instruments; nothing in the engine reads it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    #[serde(default)]
    pub volume: f64,
}

/// Structural problems in a bar series.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BarError {
    #[error("duplicate bar for {date}")]
    DuplicateDate { date: NaiveDate },

    #[error("bar dates out of order: {previous} is followed by {next}")]
    OutOfOrder { previous: NaiveDate, next: NaiveDate },

    #[error("non-finite close on {date}")]
    NonFiniteClose { date: NaiveDate },
}

/// Check the series invariant: dates strictly increasing, closes finite.
///
/// Only the close participates in the averages, so open/high/low are not
/// checked here.
pub fn validate_series(bars: &[PriceBar]) -> Result<(), BarError> {
    for bar in bars {
        if !bar.close.is_finite() {
            return Err(BarError::NonFiniteClose { date: bar.date });
        }
    }
    for pair in bars.windows(2) {
        let (previous, next) = (pair[0].date, pair[1].date);
        if next == previous {
            return Err(BarError::DuplicateDate { date: next });
        }
        if next < previous {
            return Err(BarError::OutOfOrder { previous, next });
        }
    }
    Ok(())
}
