//! Daily PnL rows supplied by the persistence layer.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Realized and unrealized PnL booked for one calendar day.
///
/// `realized` is the PnL closed out on that day; `unrealized` is the open
/// mark at the end of that day (not a delta).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailyPnlEntry {
    pub date: NaiveDate,
    #[serde(default)]
    pub realized: f64,
    #[serde(default)]
    pub unrealized: f64,
}
