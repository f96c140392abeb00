//! Bootstrap resampling of historical daily returns into simulated paths.
//!
//! Sampling is i.i.d. with replacement across both samples and days: no
//! autocorrelation modeling, every simulated one-day return is an actual
//! historical observation.

use rand::Rng;
use rand::SeedableRng;
use rand::rngs::SmallRng;

use crate::error::{InvalidArgument, Result};
use crate::series::ReturnSeries;

/// Matrix of independently resampled return paths, one row per sample path
/// and one column per day of the horizon. Row-major flat storage.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationMatrix {
    num_samples: usize,
    horizon_days: usize,
    data: Vec<f64>,
}

impl SimulationMatrix {
    #[must_use]
    pub fn num_samples(&self) -> usize {
        self.num_samples
    }

    #[must_use]
    pub fn horizon_days(&self) -> usize {
        self.horizon_days
    }

    /// One sample path of daily returns.
    #[must_use]
    pub fn row(&self, sample: usize) -> &[f64] {
        let start = sample * self.horizon_days;
        &self.data[start..start + self.horizon_days]
    }

    #[must_use]
    pub fn get(&self, sample: usize, day: usize) -> Option<f64> {
        if sample >= self.num_samples || day >= self.horizon_days {
            return None;
        }
        Some(self.data[sample * self.horizon_days + day])
    }

    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    /// Compound every path into cumulative returns since day zero:
    /// entry `(s, d)` becomes the product of `(1 + r)` over the first
    /// `d + 1` days of path `s`, minus 1.
    #[must_use]
    pub fn compound(&self) -> CumulativeReturnMatrix {
        let mut data = Vec::with_capacity(self.data.len());
        for sample in 0..self.num_samples {
            let mut factor = 1.0;
            for &r in self.row(sample) {
                factor *= 1.0 + r;
                data.push(factor - 1.0);
            }
        }
        CumulativeReturnMatrix {
            num_samples: self.num_samples,
            horizon_days: self.horizon_days,
            data,
        }
    }

    /// Compound every path down to its terminal cumulative return only.
    #[must_use]
    pub fn compound_terminal(&self) -> Vec<f64> {
        (0..self.num_samples)
            .map(|sample| {
                self.row(sample)
                    .iter()
                    .fold(1.0, |factor, r| factor * (1.0 + r))
                    - 1.0
            })
            .collect()
    }
}

/// Cumulative returns since day zero, per sample path and day offset.
#[derive(Debug, Clone, PartialEq)]
pub struct CumulativeReturnMatrix {
    num_samples: usize,
    horizon_days: usize,
    data: Vec<f64>,
}

impl CumulativeReturnMatrix {
    #[must_use]
    pub fn num_samples(&self) -> usize {
        self.num_samples
    }

    #[must_use]
    pub fn horizon_days(&self) -> usize {
        self.horizon_days
    }

    #[must_use]
    pub fn row(&self, sample: usize) -> &[f64] {
        let start = sample * self.horizon_days;
        &self.data[start..start + self.horizon_days]
    }

    /// All samples' cumulative returns at one day offset.
    #[must_use]
    pub fn column(&self, day: usize) -> Vec<f64> {
        (0..self.num_samples)
            .map(|sample| self.data[sample * self.horizon_days + day])
            .collect()
    }

    /// The last day's column: one terminal cumulative return per path.
    #[must_use]
    pub fn terminal(&self) -> Vec<f64> {
        self.column(self.horizon_days - 1)
    }
}

/// Draw `num_samples` bootstrap paths of `horizon_days` daily returns each,
/// i.i.d. with replacement from `returns`.
///
/// A fixed `seed` makes the simulation reproducible bit-for-bit; `None`
/// draws from the process-wide generator instead.
pub fn simulate(
    returns: &ReturnSeries,
    horizon_days: usize,
    num_samples: usize,
    seed: Option<u64>,
) -> Result<SimulationMatrix> {
    match seed {
        Some(seed) => {
            let mut rng = SmallRng::seed_from_u64(seed);
            simulate_with_rng(returns, horizon_days, num_samples, &mut rng)
        }
        None => simulate_with_rng(returns, horizon_days, num_samples, &mut rand::rng()),
    }
}

/// [`simulate`] with a caller-owned generator.
pub fn simulate_with_rng<R: Rng + ?Sized>(
    returns: &ReturnSeries,
    horizon_days: usize,
    num_samples: usize,
    rng: &mut R,
) -> Result<SimulationMatrix> {
    if returns.is_empty() {
        return Err(InvalidArgument::EmptyReturns);
    }
    if horizon_days == 0 {
        return Err(InvalidArgument::ZeroHorizon);
    }
    if num_samples == 0 {
        return Err(InvalidArgument::ZeroSamples);
    }
    Ok(resample_from(
        returns.as_slice(),
        horizon_days,
        num_samples,
        rng,
    ))
}

/// Unchecked sampling core shared with the backtester, which validates the
/// whole cutoff window once up front.
pub(crate) fn resample_from<R: Rng + ?Sized>(
    history: &[f64],
    horizon_days: usize,
    num_samples: usize,
    rng: &mut R,
) -> SimulationMatrix {
    debug_assert!(!history.is_empty());
    let len = num_samples * horizon_days;
    let mut data = Vec::with_capacity(len);
    for _ in 0..len {
        data.push(history[rng.random_range(0..history.len())]);
    }
    SimulationMatrix {
        num_samples,
        horizon_days,
        data,
    }
}
