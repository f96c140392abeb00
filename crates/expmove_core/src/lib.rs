//! Monte-Carlo expected-move estimation for daily price series.
//!
//! This crate bootstrap-resamples historical daily returns into simulated
//! forward paths, reduces them to empirical quantile bands (the "expected
//! move" at a given tail probability), and backtests how often the band
//! actually contained the realized price. It supports:
//! - i.i.d. bootstrap resampling with seedable reproducibility
//! - per-day and terminal-only quantile bands with linear interpolation
//!   between order statistics
//! - sliding-cutoff reliability backtests (lower / upper / two-sided) with
//!   data-parallel execution over cutoffs
//!
//! Data retrieval, charting, and report generation live in separate layers;
//! the core consumes plain in-memory series and hands back plain results.
//!
//! ```ignore
//! use expmove_core::{EstimateConfig, PriceSeries, FirstChangeMode, expected_move};
//!
//! let prices = PriceSeries::new(closes);
//! let returns = prices.daily_returns(FirstChangeMode::Drop);
//! let band = expected_move(&returns, &EstimateConfig::default())?;
//! let (lower, upper) = band.price_bounds(prices.last().unwrap());
//! ```

#![warn(clippy::all)]

// ============================================================================
// Core modules
// ============================================================================

pub mod backtest;
pub mod band;
pub mod config;
pub mod error;
pub mod resample;
pub mod series;

// ============================================================================
// Test modules
// ============================================================================

#[cfg(test)]
mod tests;

// ============================================================================
// Public re-exports for convenience
// ============================================================================

pub use backtest::{BacktestOutcomes, ThresholdMode, backtest};
pub use band::{
    QuantileBand, TerminalBand, estimate_band, estimate_terminal_band, expected_move,
    quantile_sorted,
};
pub use config::{BacktestConfig, EstimateConfig};
pub use error::{InvalidArgument, Result};
pub use resample::{CumulativeReturnMatrix, SimulationMatrix, simulate, simulate_with_rng};
pub use series::{FirstChangeMode, PriceSeries, ReturnSeries, SeriesStatistics};
