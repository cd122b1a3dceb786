use crate::error::{PeakError, Result};
use serde::{Deserialize, Serialize};

/// Smallest peak sequence the artifact classifier can reason about.
pub const MIN_PEAKS: usize = 3;

/// Basic typed time series.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeSeries {
    /// Uniform sampling frequency in Hz
    pub fs: f64,
    /// Samples
    pub data: Vec<f64>,
}

impl TimeSeries {
    pub fn len(&self) -> usize {
        self.data.len()
    }
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
    pub fn duration(&self) -> f64 {
        self.data.len() as f64 / self.fs
    }
}

/// Point events on a timeline (e.g., R-peaks indices)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Events {
    pub indices: Vec<usize>,
}

impl Events {
    pub fn from_indices(indices: Vec<usize>) -> Self {
        Self { indices }
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

/// RR intervals (seconds)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RRSeries {
    pub rr: Vec<f64>,
}

impl RRSeries {
    pub fn from_events(events: &Events, fs: f64) -> Self {
        Self::from_peaks(&events.indices, fs)
    }

    pub fn from_peaks(peaks: &[usize], fs: f64) -> Self {
        let rr = peaks
            .windows(2)
            .map(|w| (w[1] as f64 - w[0] as f64) / fs)
            .collect();
        Self { rr }
    }
}

/// Check the detector → core contract: at least [`MIN_PEAKS`] strictly
/// increasing indices and a positive, finite sampling rate.
pub fn validate_peaks(peaks: &[usize], sfreq: f64) -> Result<()> {
    if !(sfreq.is_finite() && sfreq > 0.0) {
        return Err(PeakError::InvalidSamplingRate(sfreq));
    }
    if peaks.len() < MIN_PEAKS {
        return Err(PeakError::TooFewPeaks {
            needed: MIN_PEAKS,
            available: peaks.len(),
        });
    }
    for (offset, w) in peaks.windows(2).enumerate() {
        if w[1] <= w[0] {
            return Err(PeakError::NotStrictlyIncreasing {
                index: offset + 1,
                previous: w[0],
                current: w[1],
            });
        }
    }
    Ok(())
}
