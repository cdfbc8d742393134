//! Return and risk metrics: pure functions over an equity trace.
//!
//! All percentages are linear: `12.5` means +12.5 %.

use chrono::NaiveDate;

/// Calendar days per year used to annualize CAGR.
pub const DAYS_PER_YEAR: f64 = 365.25;

/// `(last / first - 1) * 100`.
///
/// `None` when there are fewer than two points or the first value is zero.
pub fn total_return_pct(equity: &[f64]) -> Option<f64> {
    if equity.len() < 2 {
        return None;
    }
    let first = equity[0];
    let last = equity[equity.len() - 1];
    if first == 0.0 {
        return None;
    }
    Some((last / first - 1.0) * 100.0)
}

/// Compound annual growth rate between two dated equity values.
///
/// `None` when the range spans zero (or negative) days, the starting equity
/// is not positive, or the growth ratio is not positive.
pub fn cagr_pct(
    start: NaiveDate,
    end: NaiveDate,
    start_equity: f64,
    end_equity: f64,
) -> Option<f64> {
    let days = (end - start).num_days();
    if days <= 0 || start_equity <= 0.0 {
        return None;
    }
    let ratio = end_equity / start_equity;
    if ratio <= 0.0 || !ratio.is_finite() {
        return None;
    }
    Some((ratio.powf(DAYS_PER_YEAR / days as f64) - 1.0) * 100.0)
}

/// Maximum drawdown as a non-positive percentage.
///
/// The running peak starts at the first value; points are only measured while
/// the peak is positive. Returns 0.0 for empty or non-decreasing traces.
pub fn max_drawdown_pct(equity: &[f64]) -> f64 {
    let Some(&first) = equity.first() else {
        return 0.0;
    };
    let mut peak = first;
    let mut max_dd = 0.0_f64;

    for &eq in equity {
        if eq > peak {
            peak = eq;
        }
        if peak > 0.0 {
            let dd = (eq - peak) / peak * 100.0;
            if dd < max_dd {
                max_dd = dd;
            }
        }
    }
    max_dd
}
