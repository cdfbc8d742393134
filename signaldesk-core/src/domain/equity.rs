use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Account value at the close of one trading day.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EquityPoint {
    pub date: NaiveDate,
    pub equity: f64,
}

impl EquityPoint {
    pub fn new(date: NaiveDate, equity: f64) -> Self {
        Self { date, equity }
    }
}
