//! SMA crossover backtest pipeline: bars → SMA pair → signals → simulation →
//! summary.

use serde::{Deserialize, Serialize};

use crate::domain::{validate_series, PriceBar};
use crate::error::EngineError;
use crate::indicators::{compute_sma_pair, SmaPoint, SmaWindows};
use crate::performance::PerformanceSummary;
use crate::signals::{detect_crossovers, SignalPoint};
use crate::simulator::{flat_equity, simulate, Simulation};

/// Whether the series was long enough to evaluate the strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DataStatus {
    Complete,
    Insufficient { bars: usize, required: usize },
}

/// Everything one backtest run produces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SmaBacktest {
    pub windows: SmaWindows,
    pub sma: Vec<SmaPoint>,
    pub signals: Vec<SignalPoint>,
    pub simulation: Simulation,
    pub summary: PerformanceSummary,
    pub data_status: DataStatus,
}

impl SmaBacktest {
    pub fn is_insufficient(&self) -> bool {
        matches!(self.data_status, DataStatus::Insufficient { .. })
    }
}

/// Run the crossover strategy over a validated, ascending bar series.
///
/// Errors on an unordered or malformed series. A series shorter than the long
/// window is not an error: it yields no trades, flat equity and
/// [`DataStatus::Insufficient`].
pub fn run_sma_backtest(
    bars: &[PriceBar],
    windows: SmaWindows,
    initial_equity: f64,
) -> Result<SmaBacktest, EngineError> {
    validate_series(bars)?;

    let (sma, signals, simulation, data_status) = match compute_sma_pair(bars, windows) {
        Ok(sma) => {
            let signals = detect_crossovers(&sma);
            let simulation = simulate(bars, &signals, initial_equity);
            (sma, signals, simulation, DataStatus::Complete)
        }
        Err(EngineError::InsufficientData { bars: n, required }) => {
            let simulation = Simulation {
                equity_curve: flat_equity(bars, initial_equity),
                ..Default::default()
            };
            (
                Vec::new(),
                Vec::new(),
                simulation,
                DataStatus::Insufficient { bars: n, required },
            )
        }
        Err(e) => return Err(e),
    };

    let summary =
        PerformanceSummary::from_equity_curve(simulation.equity_curve.clone(), initial_equity);

    Ok(SmaBacktest {
        windows,
        sma,
        signals,
        simulation,
        summary,
        data_status,
    })
}
