//! Property tests for engine invariants.
//!
//! Uses proptest to verify:
//! 1. Trade alternation: entries and exits strictly alternate, no overlap
//! 2. Drawdown sign: never positive, zero exactly for non-decreasing traces
//! 3. Idempotence: the same input always yields the same output
//! 4. Short series: fewer bars than the long window never trades
//! 5. CAGR gate: no annualized figure without positive starting capital

use chrono::NaiveDate;
use proptest::prelude::*;
use signaldesk_core::domain::{DailyPnlEntry, PriceBar};
use signaldesk_core::indicators::SmaWindows;
use signaldesk_core::performance::{max_drawdown_pct, PerformanceSummary};
use signaldesk_core::run_sma_backtest;

// ── Strategies (proptest) ────────────────────────────────────────────

fn arb_close() -> impl Strategy<Value = f64> {
    (1.0..500.0_f64).prop_map(|p| (p * 100.0).round() / 100.0)
}

fn arb_closes(max_len: usize) -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(arb_close(), 0..max_len)
}

fn arb_windows() -> impl Strategy<Value = SmaWindows> {
    (1_i64..10, 1_i64..20).prop_map(|(short, extra)| {
        SmaWindows::new(short, short + extra).expect("short < long by construction")
    })
}

fn bars_from(closes: &[f64]) -> Vec<PriceBar> {
    let base = NaiveDate::from_ymd_opt(2023, 1, 2).unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| PriceBar {
            date: base + chrono::Duration::days(i as i64),
            open: close,
            high: close,
            low: close,
            close,
            volume: 0.0,
        })
        .collect()
}

// ── 1. Trade alternation ─────────────────────────────────────────────

proptest! {
    #[test]
    fn trades_alternate_without_overlap(
        closes in arb_closes(200),
        windows in arb_windows(),
    ) {
        let bars = bars_from(&closes);
        let bt = run_sma_backtest(&bars, windows, 10_000.0).unwrap();
        let trades = &bt.simulation.trades;

        for t in trades {
            prop_assert!(t.exit_date > t.entry_date);
            prop_assert_eq!(t.pnl, t.exit_price - t.entry_price);
        }
        for pair in trades.windows(2) {
            prop_assert!(pair[1].entry_date > pair[0].exit_date);
        }
        if let (Some(open), Some(last)) = (bt.simulation.open_position, trades.last()) {
            prop_assert!(open.entry_date > last.exit_date);
        }
    }

    #[test]
    fn equity_curve_covers_every_bar(
        closes in arb_closes(120),
        windows in arb_windows(),
    ) {
        let bars = bars_from(&closes);
        let bt = run_sma_backtest(&bars, windows, 1_000.0).unwrap();
        prop_assert_eq!(bt.summary.equity_curve.len(), bars.len());
        for (point, bar) in bt.summary.equity_curve.iter().zip(&bars) {
            prop_assert_eq!(point.date, bar.date);
        }
    }
}

// ── 2. Drawdown sign ─────────────────────────────────────────────────

proptest! {
    #[test]
    fn drawdown_is_never_positive(values in prop::collection::vec(1.0..1e6_f64, 0..100)) {
        prop_assert!(max_drawdown_pct(&values) <= 0.0);
    }

    #[test]
    fn drawdown_zero_iff_non_decreasing(values in prop::collection::vec(1.0..1e6_f64, 1..60)) {
        let non_decreasing = values.windows(2).all(|w| w[1] >= w[0]);
        let dd = max_drawdown_pct(&values);
        prop_assert_eq!(dd == 0.0, non_decreasing);
    }

    #[test]
    fn sorted_values_have_no_drawdown(mut values in prop::collection::vec(1.0..1e6_f64, 0..60)) {
        values.sort_by(|a, b| a.partial_cmp(b).unwrap());
        prop_assert_eq!(max_drawdown_pct(&values), 0.0);
    }
}

// ── 3. Idempotence ───────────────────────────────────────────────────

proptest! {
    #[test]
    fn backtest_is_idempotent(closes in arb_closes(150), windows in arb_windows()) {
        let bars = bars_from(&closes);
        let a = run_sma_backtest(&bars, windows, 50_000.0).unwrap();
        let b = run_sma_backtest(&bars, windows, 50_000.0).unwrap();
        let ja = serde_json::to_string(&a).unwrap();
        let jb = serde_json::to_string(&b).unwrap();
        prop_assert_eq!(ja, jb);
    }

    #[test]
    fn ledger_summary_is_order_insensitive_for_distinct_dates(
        rows in prop::collection::vec((-500.0..500.0_f64, -100.0..100.0_f64), 0..40),
    ) {
        let base = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let entries: Vec<DailyPnlEntry> = rows
            .iter()
            .enumerate()
            .map(|(i, &(realized, unrealized))| DailyPnlEntry {
                date: base + chrono::Duration::days(i as i64),
                realized,
                unrealized,
            })
            .collect();
        let mut reversed = entries.clone();
        reversed.reverse();

        let a = PerformanceSummary::from_daily_pnl(&entries, 100_000.0);
        let b = PerformanceSummary::from_daily_pnl(&reversed, 100_000.0);
        prop_assert_eq!(a, b);
    }
}

// ── 4. Short series ──────────────────────────────────────────────────

proptest! {
    #[test]
    fn short_series_never_trades(windows in arb_windows(), seed in arb_closes(30)) {
        let n = seed.len().min(windows.long() - 1);
        let bars = bars_from(&seed[..n]);
        let bt = run_sma_backtest(&bars, windows, 25_000.0).unwrap();

        prop_assert!(bt.is_insufficient());
        prop_assert!(bt.simulation.trades.is_empty());
        prop_assert!(bt.simulation.open_position.is_none());
        prop_assert_eq!(bt.summary.final_equity, 25_000.0);
        prop_assert!(bt.summary.equity_curve.iter().all(|p| p.equity == 25_000.0));
    }
}

// ── 5. CAGR gate ─────────────────────────────────────────────────────

proptest! {
    #[test]
    fn cagr_is_null_without_positive_capital(
        initial in -1_000.0..=0.0_f64,
        rows in prop::collection::vec((0.0..500.0_f64, 0.0..100.0_f64), 0..40),
    ) {
        let base = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let entries: Vec<DailyPnlEntry> = rows
            .iter()
            .enumerate()
            .map(|(i, &(realized, unrealized))| DailyPnlEntry {
                date: base + chrono::Duration::days(7 * i as i64),
                realized,
                unrealized,
            })
            .collect();

        let summary = PerformanceSummary::from_daily_pnl(&entries, initial);
        prop_assert_eq!(summary.cagr_pct, None);
    }
}
