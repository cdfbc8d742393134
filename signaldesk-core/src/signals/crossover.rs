//! Moving average crossover signal: golden cross and death cross detection.
//!
//! Emits `LongEntry` when the short SMA crosses above the long SMA and
//! `LongExit` when it crosses back below. Zero spread counts as "not above"
//! on the entry side and "not below" on the exit side, so touching without
//! crossing never fires.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::indicators::SmaPoint;

/// Discrete signal on one date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Signal {
    LongEntry,
    LongExit,
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SignalPoint {
    pub date: NaiveDate,
    pub signal: Signal,
}

/// Classify the move of `short - long` between two consecutive points.
///
/// - previous <= 0 and current > 0 → `LongEntry`
/// - previous >= 0 and current < 0 → `LongExit`
/// - anything else → `None`
pub fn classify_crossing(previous_spread: f64, current_spread: f64) -> Signal {
    if previous_spread <= 0.0 && current_spread > 0.0 {
        Signal::LongEntry
    } else if previous_spread >= 0.0 && current_spread < 0.0 {
        Signal::LongExit
    } else {
        Signal::None
    }
}

/// One signal per SMA point, in the same order. The first point has no
/// predecessor and is always `None`.
pub fn detect_crossovers(points: &[SmaPoint]) -> Vec<SignalPoint> {
    let mut out = Vec::with_capacity(points.len());
    let mut previous: Option<f64> = None;

    for point in points {
        let spread = point.spread();
        let signal = match previous {
            Some(prev) => classify_crossing(prev, spread),
            None => Signal::None,
        };
        out.push(SignalPoint {
            date: point.date,
            signal,
        });
        previous = Some(spread);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 2).unwrap()
    }

    fn points(spreads: &[(f64, f64)]) -> Vec<SmaPoint> {
        spreads
            .iter()
            .enumerate()
            .map(|(i, &(short_avg, long_avg))| SmaPoint {
                date: base_date() + chrono::Duration::days(i as i64),
                short_avg,
                long_avg,
            })
            .collect()
    }

    fn signals_of(pts: &[SmaPoint]) -> Vec<Signal> {
        detect_crossovers(pts).into_iter().map(|s| s.signal).collect()
    }

    #[test]
    fn fires_entry_on_golden_cross() {
        let pts = points(&[(95.0, 100.0), (95.0, 100.0), (105.0, 100.0)]);
        assert_eq!(
            signals_of(&pts),
            vec![Signal::None, Signal::None, Signal::LongEntry]
        );
    }

    #[test]
    fn fires_exit_on_death_cross() {
        let pts = points(&[(105.0, 100.0), (95.0, 100.0)]);
        assert_eq!(signals_of(&pts), vec![Signal::None, Signal::LongExit]);
    }

    #[test]
    fn no_fire_when_trend_continues() {
        let pts = points(&[(105.0, 100.0); 5]);
        assert!(signals_of(&pts).iter().all(|s| *s == Signal::None));
    }

    #[test]
    fn first_point_is_always_none() {
        // Even a point that is already above has no predecessor to cross from.
        let pts = points(&[(110.0, 100.0)]);
        assert_eq!(signals_of(&pts), vec![Signal::None]);
        assert!(detect_crossovers(&[]).is_empty());
    }

    #[test]
    fn from_zero_to_positive_is_entry() {
        assert_eq!(classify_crossing(0.0, 0.5), Signal::LongEntry);
    }

    #[test]
    fn from_zero_to_negative_is_exit() {
        assert_eq!(classify_crossing(0.0, -0.5), Signal::LongExit);
    }

    #[test]
    fn touching_zero_is_not_a_cross() {
        assert_eq!(classify_crossing(0.5, 0.0), Signal::None);
        assert_eq!(classify_crossing(-0.5, 0.0), Signal::None);
        assert_eq!(classify_crossing(0.0, 0.0), Signal::None);
    }

    #[test]
    fn same_sign_is_none() {
        assert_eq!(classify_crossing(1.0, 2.0), Signal::None);
        assert_eq!(classify_crossing(-1.0, -2.0), Signal::None);
    }

    #[test]
    fn dates_follow_points() {
        let pts = points(&[(1.0, 2.0), (3.0, 2.0)]);
        let sig = detect_crossovers(&pts);
        assert_eq!(sig[0].date, pts[0].date);
        assert_eq!(sig[1].date, pts[1].date);
    }

    #[test]
    fn signal_serializes_screaming_snake_case() {
        assert_eq!(
            serde_json::to_string(&Signal::LongEntry).unwrap(),
            "\"LONG_ENTRY\""
        );
        assert_eq!(serde_json::to_string(&Signal::None).unwrap(), "\"NONE\"");
    }
}
