//! Simple Moving Average (SMA) and the short/long pair the crossover runs on.
//!
//! Lookback: period - 1 (first valid value at index period-1).
//!
//! Each window is averaged from scratch as deviations from its oldest close
//! rather than rolled forward. A flat stretch of closes therefore yields
//! averages exactly equal to that close for every window length, and exact
//! ties between the short and long average stay ties.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::Indicator;
use crate::domain::PriceBar;
use crate::error::EngineError;

#[derive(Debug, Clone)]
pub struct Sma {
    period: usize,
    name: String,
}

impl Sma {
    /// # Panics
    /// If `period` is zero. Use [`SmaWindows::new`] to validate user input.
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "SMA period must be >= 1");
        Self {
            period,
            name: format!("sma_{period}"),
        }
    }

    pub fn period(&self) -> usize {
        self.period
    }
}

impl Indicator for Sma {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period.saturating_sub(1)
    }

    fn compute(&self, bars: &[PriceBar]) -> Vec<f64> {
        let n = bars.len();
        let mut result = vec![f64::NAN; n];

        for i in self.lookback()..n {
            let window = &bars[(i + 1 - self.period)..=i];
            let anchor = window[0].close;
            let deviation: f64 = window.iter().map(|b| b.close - anchor).sum();
            result[i] = anchor + deviation / self.period as f64;
        }

        result
    }
}

/// A validated `(short, long)` window pair with `0 < short < long`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SmaWindows {
    short: usize,
    long: usize,
}

impl SmaWindows {
    /// Validate raw (possibly negative) window sizes from a request.
    pub fn new(short: i64, long: i64) -> Result<Self, EngineError> {
        if short <= 0 || long <= 0 || short >= long {
            return Err(EngineError::InvalidWindow { short, long });
        }
        Ok(Self {
            short: short as usize,
            long: long as usize,
        })
    }

    pub fn short(&self) -> usize {
        self.short
    }

    pub fn long(&self) -> usize {
        self.long
    }

    /// Index of the first bar where both averages exist.
    pub fn warmup_bars(&self) -> usize {
        self.long - 1
    }
}

/// Both averages on one date. Only produced where both windows are full.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SmaPoint {
    pub date: NaiveDate,
    pub short_avg: f64,
    pub long_avg: f64,
}

impl SmaPoint {
    /// `short_avg - long_avg`; its sign drives the crossover detector.
    pub fn spread(&self) -> f64 {
        self.short_avg - self.long_avg
    }
}

/// Compute the short/long SMA pair for every bar at index `long - 1` or later.
///
/// Returns `InsufficientData` when the series is shorter than the long window.
pub fn compute_sma_pair(
    bars: &[PriceBar],
    windows: SmaWindows,
) -> Result<Vec<SmaPoint>, EngineError> {
    if bars.len() < windows.long() {
        return Err(EngineError::InsufficientData {
            bars: bars.len(),
            required: windows.long(),
        });
    }

    let short = Sma::new(windows.short()).compute(bars);
    let long = Sma::new(windows.long()).compute(bars);

    Ok((windows.warmup_bars()..bars.len())
        .map(|i| SmaPoint {
            date: bars[i].date,
            short_avg: short[i],
            long_avg: long[i],
        })
        .collect())
}
