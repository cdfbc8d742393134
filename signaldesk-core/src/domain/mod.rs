//! Domain types for SignalDesk

pub mod bar;
pub mod equity;
pub mod pnl;
pub mod trade;

pub use bar::{validate_series, BarError, PriceBar};
pub use equity::EquityPoint;
pub use pnl::DailyPnlEntry;
pub use trade::{OpenPosition, Trade};
