//! Signal generation from indicator output.

pub mod crossover;

pub use crossover::{classify_crossing, detect_crossovers, Signal, SignalPoint};
