//! Empirical quantile bands over simulated cumulative returns.
//!
//! The estimator works purely in return space. Converting bounds into
//! absolute price levels (`(bound + 1) * last_price`) is offered as a
//! helper for the charting layer but never applied internally.

use jiff::ToSpan;
use jiff::civil::Date;
use serde::{Deserialize, Serialize};

use crate::config::EstimateConfig;
use crate::error::{InvalidArgument, Result};
use crate::resample::{SimulationMatrix, simulate};
use crate::series::ReturnSeries;

/// Lower and upper expected-move bounds, one entry per day offset, in
/// return space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuantileBand {
    pub lower: Vec<f64>,
    pub upper: Vec<f64>,
}

impl QuantileBand {
    /// Number of day offsets covered.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lower.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lower.is_empty()
    }

    /// Band width per day offset.
    #[must_use]
    pub fn widths(&self) -> Vec<f64> {
        self.lower
            .iter()
            .zip(&self.upper)
            .map(|(lo, hi)| hi - lo)
            .collect()
    }

    /// Bounds at the last day of the horizon.
    #[must_use]
    pub fn terminal(&self) -> Option<TerminalBand> {
        Some(TerminalBand {
            lower: *self.lower.last()?,
            upper: *self.upper.last()?,
        })
    }

    /// Absolute price bounds anchored at the last known price.
    #[must_use]
    pub fn price_bounds(&self, last_price: f64) -> (Vec<f64>, Vec<f64>) {
        let to_price = |bound: &f64| (bound + 1.0) * last_price;
        (
            self.lower.iter().map(to_price).collect(),
            self.upper.iter().map(to_price).collect(),
        )
    }

    /// Calendar dates the band extends over, one per day offset, starting
    /// the day after the last observation.
    #[must_use]
    pub fn projection_dates(&self, last_date: Date) -> Vec<Date> {
        (0..self.len())
            .map(|offset| last_date.saturating_add((offset as i64 + 1).days()))
            .collect()
    }
}

/// Terminal-day expected-move bounds, in return space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TerminalBand {
    pub lower: f64,
    pub upper: f64,
}

impl TerminalBand {
    #[must_use]
    pub fn width(&self) -> f64 {
        self.upper - self.lower
    }

    /// Absolute price bounds anchored at the last known price.
    #[must_use]
    pub fn price_bounds(&self, last_price: f64) -> (f64, f64) {
        (
            (self.lower + 1.0) * last_price,
            (self.upper + 1.0) * last_price,
        )
    }
}

/// Empirical quantile of already-sorted values, linearly interpolating
/// between order statistics: probability `q` over `n` values reads at
/// fractional index `q * (n - 1)`.
#[must_use]
pub fn quantile_sorted(sorted: &[f64], q: f64) -> f64 {
    debug_assert!(!sorted.is_empty());
    let n = sorted.len();
    if n == 1 {
        return sorted[0];
    }
    let position = q * (n - 1) as f64;
    let index = position.floor() as usize;
    if index + 1 >= n {
        return sorted[n - 1];
    }
    let fraction = position - index as f64;
    sorted[index] + fraction * (sorted[index + 1] - sorted[index])
}

pub(crate) fn validate_probability(probability: f64) -> Result<()> {
    if probability > 0.0 && probability < 0.5 {
        Ok(())
    } else {
        Err(InvalidArgument::ProbabilityOutOfRange(probability))
    }
}

fn sort_values(values: &mut [f64]) {
    values.sort_unstable_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
}

/// Quantile band over every day offset of the compounded matrix: per
/// column, the empirical quantile at `probability` and `1 - probability`.
pub fn estimate_band(matrix: &SimulationMatrix, probability: f64) -> Result<QuantileBand> {
    validate_probability(probability)?;

    let cumulative = matrix.compound();
    let mut lower = Vec::with_capacity(matrix.horizon_days());
    let mut upper = Vec::with_capacity(matrix.horizon_days());
    for day in 0..matrix.horizon_days() {
        let mut column = cumulative.column(day);
        sort_values(&mut column);
        lower.push(quantile_sorted(&column, probability));
        upper.push(quantile_sorted(&column, 1.0 - probability));
    }
    Ok(QuantileBand { lower, upper })
}

/// Terminal-only variant of [`estimate_band`]: quantiles of the last
/// column's cumulative returns.
pub fn estimate_terminal_band(matrix: &SimulationMatrix, probability: f64) -> Result<TerminalBand> {
    validate_probability(probability)?;
    Ok(terminal_band_of(matrix, probability))
}

/// Unchecked terminal band, shared with the backtester's validated loop.
pub(crate) fn terminal_band_of(matrix: &SimulationMatrix, probability: f64) -> TerminalBand {
    let mut terminal = matrix.compound_terminal();
    sort_values(&mut terminal);
    TerminalBand {
        lower: quantile_sorted(&terminal, probability),
        upper: quantile_sorted(&terminal, 1.0 - probability),
    }
}

/// Full expected-move pipeline: resample `returns` and reduce the simulated
/// paths to a quantile band.
pub fn expected_move(returns: &ReturnSeries, config: &EstimateConfig) -> Result<QuantileBand> {
    tracing::debug!(
        horizon_days = config.horizon_days,
        num_samples = config.num_samples,
        probability = config.probability,
        "estimating expected move"
    );
    let matrix = simulate(
        returns,
        config.horizon_days,
        config.num_samples,
        config.seed,
    )?;
    estimate_band(&matrix, config.probability)
}
