use std::fmt;

/// Errors raised when estimator inputs fail validation.
///
/// Every variant is fatal to the call that raised it; there is no retry and
/// no degraded mode anywhere in the crate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InvalidArgument {
    /// The return series has no observations to resample from.
    EmptyReturns,
    /// The simulation horizon must cover at least one day.
    ZeroHorizon,
    /// At least one sample path is required.
    ZeroSamples,
    /// Tail probability must lie strictly inside (0, 0.5).
    ProbabilityOutOfRange(f64),
    /// The price series must be exactly one entry longer than the returns.
    SeriesMisaligned { prices: usize, returns: usize },
    /// The backtest window would leave some in-range cutoff without usable
    /// trailing history.
    InsufficientHistory {
        start_index: usize,
        horizon_days: usize,
        len: usize,
    },
}

impl fmt::Display for InvalidArgument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvalidArgument::EmptyReturns => write!(f, "return series is empty"),
            InvalidArgument::ZeroHorizon => write!(f, "horizon must be at least one day"),
            InvalidArgument::ZeroSamples => write!(f, "at least one sample path is required"),
            InvalidArgument::ProbabilityOutOfRange(p) => {
                write!(f, "probability {p} must lie strictly inside (0, 0.5)")
            }
            InvalidArgument::SeriesMisaligned { prices, returns } => {
                write!(
                    f,
                    "price series ({prices} entries) must be exactly one entry longer \
                     than the return series ({returns} entries)"
                )
            }
            InvalidArgument::InsufficientHistory {
                start_index,
                horizon_days,
                len,
            } => {
                write!(
                    f,
                    "backtest window (start_index={start_index}, horizon_days={horizon_days}) \
                     starves a cutoff over {len} returns"
                )
            }
        }
    }
}

impl std::error::Error for InvalidArgument {}

pub type Result<T> = std::result::Result<T, InvalidArgument>;
