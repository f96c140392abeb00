//! Tests for sliding-cutoff reliability backtests

use rand::SeedableRng;
use rand::rngs::SmallRng;
use rand_distr::{Distribution, Normal};

use crate::backtest::{ThresholdMode, backtest};
use crate::config::BacktestConfig;
use crate::error::InvalidArgument;
use crate::series::{FirstChangeMode, PriceSeries, ReturnSeries};

/// Build an aligned price series by compounding returns from a base price.
fn prices_from_returns(returns: &[f64], base: f64) -> PriceSeries {
    let mut closes = Vec::with_capacity(returns.len() + 1);
    closes.push(base);
    let mut price = base;
    for r in returns {
        price *= 1.0 + r;
        closes.push(price);
    }
    PriceSeries::new(closes)
}

/// Deterministic but varied return series for structural tests.
fn varied_returns(len: usize) -> ReturnSeries {
    ReturnSeries::new(
        (0..len)
            .map(|i| match i % 4 {
                0 => 0.01,
                1 => -0.008,
                2 => 0.015,
                _ => -0.012,
            })
            .collect(),
    )
}

fn config(horizon_days: usize, start_index: usize, mode: ThresholdMode) -> BacktestConfig {
    BacktestConfig {
        horizon_days,
        num_samples: 200,
        probability: 0.3,
        start_index,
        mode,
        seed: Some(99),
    }
}

#[test]
fn test_outcome_count_and_order() {
    let returns = varied_returns(60);
    let prices = prices_from_returns(returns.as_slice(), 100.0);
    let outcomes = backtest(&returns, &prices, &config(5, 10, ThresholdMode::Both)).unwrap();

    // One outcome per cutoff in [start_index, len - horizon).
    assert_eq!(outcomes.len(), 60 - 5 - 10);
    assert_eq!(outcomes.start_index(), 10);

    let cutoffs: Vec<usize> = outcomes.iter().map(|(cutoff, _)| cutoff).collect();
    assert_eq!(cutoffs.first(), Some(&10));
    assert_eq!(cutoffs.last(), Some(&54));
    assert!(cutoffs.windows(2).all(|w| w[1] == w[0] + 1));
}

#[test]
fn test_backtest_restartable() {
    let returns = varied_returns(50);
    let prices = prices_from_returns(returns.as_slice(), 50.0);
    let cfg = config(3, 8, ThresholdMode::Both);

    // Pure function of its inputs: a second call reproduces the first.
    assert_eq!(
        backtest(&returns, &prices, &cfg).unwrap(),
        backtest(&returns, &prices, &cfg).unwrap()
    );
}

#[test]
fn test_boundary_single_cutoff() {
    let returns = varied_returns(30);
    let prices = prices_from_returns(returns.as_slice(), 100.0);

    // Horizon exactly equal to the remaining history after start_index - 1
    // leaves one valid cutoff.
    let outcomes = backtest(&returns, &prices, &config(20, 9, ThresholdMode::Both)).unwrap();
    assert_eq!(outcomes.len(), 1);
    assert_eq!(outcomes.start_index(), 9);

    // One step further and the window has no cutoff at all.
    let empty = backtest(&returns, &prices, &config(20, 10, ThresholdMode::Both)).unwrap();
    assert!(empty.is_empty());
}

#[test]
fn test_window_validation() {
    let returns = varied_returns(30);
    let prices = prices_from_returns(returns.as_slice(), 100.0);

    // start_index 0 would resample from an empty history.
    assert_eq!(
        backtest(&returns, &prices, &config(5, 0, ThresholdMode::Both)),
        Err(InvalidArgument::InsufficientHistory {
            start_index: 0,
            horizon_days: 5,
            len: 30,
        })
    );

    // Window overrunning the series.
    assert_eq!(
        backtest(&returns, &prices, &config(20, 11, ThresholdMode::Both)),
        Err(InvalidArgument::InsufficientHistory {
            start_index: 11,
            horizon_days: 20,
            len: 30,
        })
    );

    // Prices must be exactly one entry longer than returns.
    let misaligned = PriceSeries::new(prices.as_slice()[..30].to_vec());
    assert_eq!(
        backtest(&returns, &misaligned, &config(5, 10, ThresholdMode::Both)),
        Err(InvalidArgument::SeriesMisaligned {
            prices: 30,
            returns: 30,
        })
    );

    assert_eq!(
        backtest(
            &ReturnSeries::new(vec![]),
            &PriceSeries::new(vec![100.0]),
            &config(5, 1, ThresholdMode::Both)
        ),
        Err(InvalidArgument::EmptyReturns)
    );
}

#[test]
fn test_derived_returns_align_with_prices() {
    let prices = prices_from_returns(varied_returns(40).as_slice(), 80.0);
    let returns = prices.daily_returns(FirstChangeMode::Drop);

    assert_eq!(prices.len(), returns.len() + 1);
    assert!(backtest(&returns, &prices, &config(5, 8, ThresholdMode::Both)).is_ok());
}

#[test]
fn test_flat_history_never_strictly_inside() {
    // An all-zero history collapses the band onto the anchor price, so the
    // strict comparisons fail at every cutoff in every mode.
    let returns = ReturnSeries::new(vec![0.0; 40]);
    let prices = prices_from_returns(returns.as_slice(), 100.0);

    for mode in [ThresholdMode::Lower, ThresholdMode::Upper, ThresholdMode::Both] {
        let outcomes = backtest(&returns, &prices, &config(4, 10, mode)).unwrap();
        assert_eq!(outcomes.hits(), 0);
        assert!(outcomes.running_probability().iter().all(|&p| p == 0.0));
    }
}

#[test]
fn test_single_tail_hits_at_least_two_sided() {
    let returns = varied_returns(80);
    let prices = prices_from_returns(returns.as_slice(), 100.0);

    // With a fixed seed every mode sees the same per-cutoff band, and a
    // price strictly inside the band passes both single-tail tests.
    let both = backtest(&returns, &prices, &config(5, 16, ThresholdMode::Both)).unwrap();
    let upper = backtest(&returns, &prices, &config(5, 16, ThresholdMode::Upper)).unwrap();
    let lower = backtest(&returns, &prices, &config(5, 16, ThresholdMode::Lower)).unwrap();

    for ((&b, &u), &l) in both
        .as_slice()
        .iter()
        .zip(upper.as_slice())
        .zip(lower.as_slice())
    {
        assert!(!b || (u && l));
    }
}

#[test]
fn test_theoretical_coverage() {
    assert!((ThresholdMode::Both.theoretical_coverage(0.3) - 0.4).abs() < 1e-12);
    assert!((ThresholdMode::Upper.theoretical_coverage(0.3) - 0.7).abs() < 1e-12);
    assert!((ThresholdMode::Lower.theoretical_coverage(0.1) - 0.9).abs() < 1e-12);
}

#[test]
fn test_running_probability_definition() {
    let returns = varied_returns(60);
    let prices = prices_from_returns(returns.as_slice(), 100.0);
    let outcomes = backtest(&returns, &prices, &config(5, 10, ThresholdMode::Upper)).unwrap();

    let running = outcomes.running_probability();
    assert_eq!(running.len(), outcomes.len());

    let mut hits = 0;
    for (k, &hit) in outcomes.as_slice().iter().enumerate() {
        if hit {
            hits += 1;
        }
        assert!((running[k] - hits as f64 / (k + 1) as f64).abs() < 1e-12);
    }
    assert!(
        (running.last().unwrap() - outcomes.hits() as f64 / outcomes.len() as f64).abs() < 1e-12
    );
}

#[test]
fn test_empirical_coverage_converges_to_theoretical() {
    // Synthetic i.i.d. returns with a known distribution; over 1000+
    // cutoffs the running probability should settle near the theoretical
    // coverage 1 - 2p = 0.4.
    let normal = Normal::new(0.0005, 0.01).unwrap();
    let mut rng = SmallRng::seed_from_u64(2024);
    let returns =
        ReturnSeries::new((0..1_300).map(|_| normal.sample(&mut rng)).collect());
    let prices = prices_from_returns(returns.as_slice(), 100.0);

    let cfg = BacktestConfig {
        horizon_days: 1,
        num_samples: 1_000,
        probability: 0.3,
        start_index: 260,
        mode: ThresholdMode::Both,
        seed: Some(7),
    };
    let outcomes = backtest(&returns, &prices, &cfg).unwrap();
    assert!(outcomes.len() >= 1_000);

    let empirical = *outcomes.running_probability().last().unwrap();
    let theoretical = cfg.mode.theoretical_coverage(cfg.probability);
    assert!(
        (empirical - theoretical).abs() < 0.05,
        "empirical coverage {empirical} drifted from theoretical {theoretical}"
    );
}

#[test]
fn test_with_warmup_defaults() {
    let cfg = BacktestConfig::with_warmup(1_000);

    assert_eq!(cfg.start_index, 200);
    assert_eq!(cfg.horizon_days, 22);
    assert_eq!(cfg.num_samples, 2_500);
    assert!((cfg.probability - 0.3).abs() < 1e-12);
    assert_eq!(cfg.mode, ThresholdMode::Both);
}
