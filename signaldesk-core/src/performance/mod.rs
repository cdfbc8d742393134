//! Performance summarizer.
//!
//! Two entry points produce the same [`PerformanceSummary`]: a dated equity
//! trace (the backtest path) or a daily PnL ledger (the live-account path).
//! Neither raises on empty or zero input; undefined ratios resolve to the
//! sentinels documented on each field.

pub mod metrics;
pub mod stats;

pub use metrics::{cagr_pct, max_drawdown_pct, total_return_pct, DAYS_PER_YEAR};
pub use stats::TradeStats;

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::{DailyPnlEntry, EquityPoint};

/// Summary statistics over one equity curve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceSummary {
    /// First curve date, `null` when the curve is empty.
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    /// Configured starting capital.
    pub initial_equity: f64,
    /// Last curve value, or `initial_equity` when the curve is empty.
    pub final_equity: f64,
    /// Measured from the first curve value; 0.0 when undefined.
    pub total_return_pct: f64,
    /// `null` for a zero-day span or when either the first curve value or
    /// `initial_equity` is not positive.
    pub cagr_pct: Option<f64>,
    pub max_drawdown_pct: f64,
    pub equity_curve: Vec<EquityPoint>,
}

impl PerformanceSummary {
    pub fn empty(initial_equity: f64) -> Self {
        Self::from_equity_curve(Vec::new(), initial_equity)
    }

    /// Summarize a dated equity trace.
    ///
    /// The trace is sorted ascending by date; if a date appears more than once
    /// the later point in input order is kept.
    pub fn from_equity_curve(points: Vec<EquityPoint>, initial_equity: f64) -> Self {
        let curve = normalize_curve(points);
        let values: Vec<f64> = curve.iter().map(|p| p.equity).collect();

        let (start_date, end_date) = match (curve.first(), curve.last()) {
            (Some(first), Some(last)) => (Some(first.date), Some(last.date)),
            _ => (None, None),
        };
        // Growth is not annualized against a non-positive starting capital.
        let cagr = match (curve.first(), curve.last()) {
            (Some(first), Some(last)) if initial_equity > 0.0 => {
                cagr_pct(first.date, last.date, first.equity, last.equity)
            }
            _ => None,
        };

        Self {
            start_date,
            end_date,
            initial_equity,
            final_equity: values.last().copied().unwrap_or(initial_equity),
            total_return_pct: total_return_pct(&values).unwrap_or(0.0),
            cagr_pct: cagr,
            max_drawdown_pct: max_drawdown_pct(&values),
            equity_curve: curve,
        }
    }

    /// Summarize a daily PnL ledger. See [`equity_from_daily_pnl`].
    pub fn from_daily_pnl(entries: &[DailyPnlEntry], initial_equity: f64) -> Self {
        Self::from_equity_curve(equity_from_daily_pnl(entries, initial_equity), initial_equity)
    }
}

/// Build an equity trace from daily PnL rows.
///
/// Equity on each distinct date, ascending, is
/// `initial_equity + cumulative realized + that date's unrealized`.
/// When a date repeats, the later row replaces the earlier one entirely.
pub fn equity_from_daily_pnl(entries: &[DailyPnlEntry], initial_equity: f64) -> Vec<EquityPoint> {
    let mut by_date: BTreeMap<NaiveDate, DailyPnlEntry> = BTreeMap::new();
    for entry in entries {
        if let Some(replaced) = by_date.insert(entry.date, *entry) {
            debug!(
                date = %entry.date,
                replaced_realized = replaced.realized,
                replaced_unrealized = replaced.unrealized,
                "duplicate pnl date, keeping later row"
            );
        }
    }

    let mut cumulative_realized = 0.0;
    by_date
        .into_values()
        .map(|e| {
            cumulative_realized += e.realized;
            EquityPoint::new(e.date, initial_equity + cumulative_realized + e.unrealized)
        })
        .collect()
}

fn normalize_curve(mut points: Vec<EquityPoint>) -> Vec<EquityPoint> {
    // Stable sort keeps input order among equal dates.
    points.sort_by_key(|p| p.date);
    let mut out: Vec<EquityPoint> = Vec::with_capacity(points.len());
    for p in points {
        match out.last_mut() {
            Some(last) if last.date == p.date => *last = p,
            _ => out.push(p),
        }
    }
    out
}
