//! Synthetic bars for development.
//!
//! A random walk from 100.0 seeded by the BLAKE3 hash of the symbol, so the
//! same symbol always yields the same series. Weekends are skipped.

use chrono::{Datelike, NaiveDate, Weekday};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use signaldesk_core::domain::PriceBar;

use super::{finalize_bars, BarSource, LoadError, Timeframe};

#[derive(Debug, Clone, Default)]
pub struct SyntheticBarSource;

impl SyntheticBarSource {
    pub fn new() -> Self {
        Self
    }
}

impl BarSource for SyntheticBarSource {
    fn name(&self) -> &str {
        "synthetic"
    }

    fn load(
        &self,
        symbol: &str,
        _timeframe: Timeframe,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<PriceBar>, LoadError> {
        finalize_bars(symbol, generate_synthetic_bars(symbol, start, end), start, end)
    }
}

/// One bar per weekday in `start..=end`.
pub fn generate_synthetic_bars(symbol: &str, start: NaiveDate, end: NaiveDate) -> Vec<PriceBar> {
    let seed: [u8; 32] = *blake3::hash(symbol.to_ascii_uppercase().as_bytes()).as_bytes();
    let mut rng = StdRng::from_seed(seed);

    let mut bars = Vec::new();
    let mut price = 100.0_f64;
    let mut current = start;

    while current <= end {
        if matches!(current.weekday(), Weekday::Sat | Weekday::Sun) {
            current += chrono::Duration::days(1);
            continue;
        }

        let daily_return: f64 = rng.gen_range(-0.03..0.03);
        let open = price;
        let close = price * (1.0 + daily_return);
        let high = open.max(close) * (1.0 + rng.gen_range(0.0..0.01));
        let low = open.min(close) * (1.0 - rng.gen_range(0.0..0.01));
        let volume = rng.gen_range(500_000..5_000_000u64) as f64;

        bars.push(PriceBar {
            date: current,
            open,
            high,
            low,
            close,
            volume,
        });

        price = close;
        current += chrono::Duration::days(1);
    }

    bars
}
