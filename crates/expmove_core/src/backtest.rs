//! Sliding-cutoff reliability backtest of the expected-move band.
//!
//! For every cutoff the band is rebuilt from the returns strictly before
//! it (no look-ahead) and compared against the realized price one horizon
//! later. Each cutoff's computation is independent of every other's, so
//! the loop is a plain data-parallel map with no shared mutable state.

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use rand::SeedableRng;
use rand::rngs::SmallRng;
use serde::{Deserialize, Serialize};

use crate::band::{terminal_band_of, validate_probability};
use crate::config::BacktestConfig;
use crate::error::{InvalidArgument, Result};
use crate::resample::resample_from;
use crate::series::{PriceSeries, ReturnSeries};

/// Which side of the band the realized price is tested against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ThresholdMode {
    /// Realized price stayed above the lower bound.
    Lower,
    /// Realized price stayed below the upper bound.
    Upper,
    /// Realized price stayed strictly inside the band.
    #[default]
    Both,
}

impl ThresholdMode {
    /// Probability mass the band should capture under this test:
    /// `1 - 2p` when both tails are excluded, `1 - p` for a single tail.
    #[must_use]
    pub fn theoretical_coverage(self, probability: f64) -> f64 {
        match self {
            ThresholdMode::Both => 1.0 - 2.0 * probability,
            ThresholdMode::Lower | ThresholdMode::Upper => 1.0 - probability,
        }
    }

    fn evaluate(self, lower: f64, upper: f64, realized: f64) -> bool {
        match self {
            ThresholdMode::Lower => realized > lower,
            ThresholdMode::Upper => realized < upper,
            ThresholdMode::Both => lower < realized && realized < upper,
        }
    }
}

/// Per-cutoff outcomes of a reliability backtest, ordered by ascending
/// cutoff.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestOutcomes {
    start_index: usize,
    outcomes: Vec<bool>,
}

impl BacktestOutcomes {
    #[must_use]
    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    /// Cutoff index of the first outcome.
    #[must_use]
    pub fn start_index(&self) -> usize {
        self.start_index
    }

    #[must_use]
    pub fn as_slice(&self) -> &[bool] {
        &self.outcomes
    }

    /// Iterate `(cutoff, outcome)` pairs in ascending cutoff order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, bool)> + '_ {
        self.outcomes
            .iter()
            .enumerate()
            .map(|(k, &hit)| (self.start_index + k, hit))
    }

    /// Number of cutoffs where the realized price passed the test.
    #[must_use]
    pub fn hits(&self) -> usize {
        self.outcomes.iter().filter(|&&hit| hit).count()
    }

    /// Running empirical probability: at position `k`, the fraction of
    /// hits among the first `k + 1` outcomes. Plotted against
    /// [`ThresholdMode::theoretical_coverage`] by the charting layer.
    #[must_use]
    pub fn running_probability(&self) -> Vec<f64> {
        let mut hits = 0usize;
        self.outcomes
            .iter()
            .enumerate()
            .map(|(k, &hit)| {
                if hit {
                    hits += 1;
                }
                hits as f64 / (k + 1) as f64
            })
            .collect()
    }
}

/// Backtest the expected-move band over every cutoff in
/// `[start_index, returns.len() - horizon_days)`.
///
/// The whole window is validated up front so that no in-range cutoff can
/// starve for data mid-run; after validation the per-cutoff loop is
/// infallible. Pure function of its inputs: a repeated call with the same
/// arguments (and a fixed seed) reproduces the same outcomes.
pub fn backtest(
    returns: &ReturnSeries,
    prices: &PriceSeries,
    config: &BacktestConfig,
) -> Result<BacktestOutcomes> {
    if returns.is_empty() {
        return Err(InvalidArgument::EmptyReturns);
    }
    if config.horizon_days == 0 {
        return Err(InvalidArgument::ZeroHorizon);
    }
    if config.num_samples == 0 {
        return Err(InvalidArgument::ZeroSamples);
    }
    validate_probability(config.probability)?;
    if prices.len() != returns.len() + 1 {
        return Err(InvalidArgument::SeriesMisaligned {
            prices: prices.len(),
            returns: returns.len(),
        });
    }
    // start_index == 0 would leave the first cutoff with no history to
    // resample; a window overrunning the series would starve the last.
    if config.start_index == 0 || config.start_index + config.horizon_days > returns.len() {
        return Err(InvalidArgument::InsufficientHistory {
            start_index: config.start_index,
            horizon_days: config.horizon_days,
            len: returns.len(),
        });
    }

    let cutoffs = config.start_index..returns.len() - config.horizon_days;
    tracing::debug!(
        cutoffs = cutoffs.len(),
        horizon_days = config.horizon_days,
        mode = ?config.mode,
        "running reliability backtest"
    );

    let returns = returns.as_slice();
    let prices = prices.as_slice();
    let outcomes = parallel_map(cutoffs, |cutoff| {
        outcome_at(returns, prices, cutoff, config)
    });

    let result = BacktestOutcomes {
        start_index: config.start_index,
        outcomes,
    };
    tracing::debug!(hits = result.hits(), total = result.len(), "backtest done");
    Ok(result)
}

/// One cutoff's outcome: simulate from the returns before `cutoff`, anchor
/// the terminal band at `prices[cutoff]`, compare with the realized price
/// one horizon later.
fn outcome_at(returns: &[f64], prices: &[f64], cutoff: usize, config: &BacktestConfig) -> bool {
    let mut rng = match config.seed {
        Some(seed) => SmallRng::seed_from_u64(seed.wrapping_add(cutoff as u64)),
        None => SmallRng::from_rng(&mut rand::rng()),
    };
    let matrix = resample_from(
        &returns[..cutoff],
        config.horizon_days,
        config.num_samples,
        &mut rng,
    );
    let band = terminal_band_of(&matrix, config.probability);
    let (lower, upper) = band.price_bounds(prices[cutoff]);
    let realized = prices[cutoff + config.horizon_days];
    config.mode.evaluate(lower, upper, realized)
}

/// Data-parallel map of a pure function over an index range, collected in
/// index order. Runs on the rayon worker pool sized to available
/// hardware concurrency; single-threaded without the `parallel` feature.
#[cfg(feature = "parallel")]
fn parallel_map<T, F>(range: std::ops::Range<usize>, f: F) -> Vec<T>
where
    T: Send,
    F: Fn(usize) -> T + Sync + Send,
{
    range.into_par_iter().map(f).collect()
}

#[cfg(not(feature = "parallel"))]
fn parallel_map<T, F>(range: std::ops::Range<usize>, f: F) -> Vec<T>
where
    T: Send,
    F: Fn(usize) -> T + Sync + Send,
{
    range.map(f).collect()
}
