use thiserror::Error;

/// Precondition failures for peak sequences handed to the correction core.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PeakError {
    #[error("Too few peaks: need at least {needed}, have {available}")]
    TooFewPeaks { needed: usize, available: usize },

    #[error("Peaks must be strictly increasing: peaks[{index}] = {current} follows {previous}")]
    NotStrictlyIncreasing {
        index: usize,
        previous: usize,
        current: usize,
    },

    #[error("Sampling rate must be positive and finite, got {0}")]
    InvalidSamplingRate(f64),
}

pub type Result<T> = std::result::Result<T, PeakError>;
