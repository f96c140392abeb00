//! Estimation and backtest configuration.
//!
//! The original analysis notebooks drove everything from module-level
//! globals (`TICKER`, `DTE`, `P_ITM`, sample counts). Here every tunable is
//! an explicit struct passed into the component that needs it; nothing is
//! read from process-wide state.

use serde::{Deserialize, Serialize};

use crate::backtest::ThresholdMode;

fn default_horizon_days() -> usize {
    22
}

fn default_probability() -> f64 {
    0.3
}

fn default_estimate_samples() -> usize {
    100_000
}

fn default_backtest_samples() -> usize {
    2_500
}

/// Tunables for a single expected-move estimate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EstimateConfig {
    /// Days to expiration: how many trading days forward to project.
    #[serde(default = "default_horizon_days")]
    pub horizon_days: usize,

    /// Number of bootstrap sample paths to draw.
    #[serde(default = "default_estimate_samples")]
    pub num_samples: usize,

    /// Tail probability mass excluded on each side of the band.
    /// Must lie strictly inside (0, 0.5).
    #[serde(default = "default_probability")]
    pub probability: f64,

    /// Fixed seed for reproducible simulation; `None` draws from the
    /// process-wide generator.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for EstimateConfig {
    fn default() -> Self {
        Self {
            horizon_days: default_horizon_days(),
            num_samples: default_estimate_samples(),
            probability: default_probability(),
            seed: None,
        }
    }
}

/// Tunables for a reliability backtest.
///
/// `start_index` must be at least 1 (each cutoff resamples from the returns
/// strictly before it) and leave room for at least the horizon; `backtest`
/// validates the whole window up front so no cutoff can starve mid-run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestConfig {
    #[serde(default = "default_horizon_days")]
    pub horizon_days: usize,

    /// Bootstrap sample paths per cutoff. Smaller than the estimate default
    /// since the work repeats for every cutoff.
    #[serde(default = "default_backtest_samples")]
    pub num_samples: usize,

    #[serde(default = "default_probability")]
    pub probability: f64,

    /// First cutoff to test.
    pub start_index: usize,

    /// Which side of the band the realized price is tested against.
    #[serde(default)]
    pub mode: ThresholdMode,

    /// Base seed; each cutoff derives its own generator from it so results
    /// do not depend on worker scheduling. `None` seeds each cutoff from
    /// the process-wide generator.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl BacktestConfig {
    /// Backtest over a history of `len` returns, starting after the
    /// customary one-fifth warm-up.
    #[must_use]
    pub fn with_warmup(len: usize) -> Self {
        Self {
            horizon_days: default_horizon_days(),
            num_samples: default_backtest_samples(),
            probability: default_probability(),
            start_index: len / 5,
            mode: ThresholdMode::default(),
            seed: None,
        }
    }
}
