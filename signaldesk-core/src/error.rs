//! Engine error taxonomy.

use thiserror::Error;

use crate::domain::BarError;

/// Errors produced by the engine.
///
/// `InsufficientData` is a reportable outcome rather than a failure: the
/// backtest pipeline converts it into an empty ledger with flat equity. Only
/// the indicator layer surfaces it as an `Err`.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    #[error("invalid SMA windows: short={short}, long={long} (need 0 < short < long)")]
    InvalidWindow { short: i64, long: i64 },

    #[error("insufficient data: {bars} bars, long window needs {required}")]
    InsufficientData { bars: usize, required: usize },

    #[error("malformed bar series: {0}")]
    MalformedSeries(#[from] BarError),
}

impl EngineError {
    /// Stable machine-readable kind, used in API error bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            EngineError::InvalidWindow { .. } => "InvalidWindow",
            EngineError::InsufficientData { .. } => "InsufficientData",
            EngineError::MalformedSeries(_) => "MalformedSeries",
        }
    }
}
