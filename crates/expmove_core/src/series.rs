//! Price and return series handed over by the data-retrieval layer.
//!
//! The core never fetches or cleans data itself: it receives an ordered
//! close-price series (or an already-derived return series) and works purely
//! in memory. Missing or non-finite values are the caller's responsibility.

use serde::{Deserialize, Serialize};

/// How the undefined first change is handled when deriving returns from
/// prices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FirstChangeMode {
    /// Drop the first observation, leaving the return series one entry
    /// shorter than the price series.
    #[default]
    Drop,
    /// Keep the first observation as a zero return, leaving both series the
    /// same length.
    Zero,
}

/// Ordered daily close prices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSeries(Vec<f64>);

impl PriceSeries {
    #[must_use]
    pub fn new(closes: Vec<f64>) -> Self {
        Self(closes)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<f64> {
        self.0.get(index).copied()
    }

    /// Last known close, the anchor for converting return-space bounds into
    /// price levels.
    #[must_use]
    pub fn last(&self) -> Option<f64> {
        self.0.last().copied()
    }

    /// Daily percentage changes of the series.
    ///
    /// `returns[i]` is the change from `closes[i]` to `closes[i + 1]` under
    /// [`FirstChangeMode::Drop`]; [`FirstChangeMode::Zero`] additionally
    /// keeps a leading zero so the result stays index-aligned with the
    /// prices.
    #[must_use]
    pub fn daily_returns(&self, mode: FirstChangeMode) -> ReturnSeries {
        let changes = self.0.windows(2).map(|w| w[1] / w[0] - 1.0);
        let values = match mode {
            FirstChangeMode::Drop => changes.collect(),
            FirstChangeMode::Zero => {
                if self.0.is_empty() {
                    Vec::new()
                } else {
                    let mut values = Vec::with_capacity(self.0.len());
                    values.push(0.0);
                    values.extend(changes);
                    values
                }
            }
        };
        ReturnSeries(values)
    }
}

impl From<Vec<f64>> for PriceSeries {
    fn from(closes: Vec<f64>) -> Self {
        Self(closes)
    }
}

/// Ordered daily percentage returns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReturnSeries(Vec<f64>);

impl ReturnSeries {
    #[must_use]
    pub fn new(returns: Vec<f64>) -> Self {
        Self(returns)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<f64> {
        self.0.get(index).copied()
    }

    /// Compute basic statistics of the return series.
    #[must_use]
    pub fn statistics(&self) -> Option<SeriesStatistics> {
        if self.0.is_empty() {
            return None;
        }
        let n = self.0.len() as f64;
        let arithmetic_mean = self.0.iter().sum::<f64>() / n;

        // Geometric mean: (product of (1+r))^(1/n) - 1
        let product: f64 = self.0.iter().map(|r| 1.0 + r).product();
        let geometric_mean = product.powf(1.0 / n) - 1.0;

        let variance = self
            .0
            .iter()
            .map(|r| (r - arithmetic_mean).powi(2))
            .sum::<f64>()
            / n;
        let std_dev = variance.sqrt();

        let min = self.0.iter().copied().fold(f64::INFINITY, f64::min);
        let max = self.0.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        Some(SeriesStatistics {
            arithmetic_mean,
            geometric_mean,
            std_dev,
            min,
            max,
            count: self.0.len(),
        })
    }
}

impl From<Vec<f64>> for ReturnSeries {
    fn from(returns: Vec<f64>) -> Self {
        Self(returns)
    }
}

/// Basic statistics for a return series.
#[derive(Debug, Clone, Copy)]
pub struct SeriesStatistics {
    pub arithmetic_mean: f64,
    pub geometric_mean: f64,
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
    pub count: usize,
}
