use super::filters::{argmax, bandpass, derivative, moving_average};
use crate::signal::{Events, TimeSeries};
use serde::{Deserialize, Serialize};

/// Configurable parameters for R-peak detection.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct EcgDetectorConfig {
    /// Lower cutoff for the single-pole high-pass filter (Hz).
    pub lowcut_hz: f64,
    /// Upper cutoff for the single-pole low-pass filter (Hz).
    pub highcut_hz: f64,
    /// Moving window integration length (seconds).
    pub integration_window_s: f64,
    /// Minimum physiological RR distance / refractory period (seconds).
    pub min_rr_s: f64,
    /// Scale between noise and signal envelopes for the adaptive threshold.
    pub threshold_scale: f64,
    /// How far back to search (seconds) for the precise R-peak after a detection.
    pub search_back_s: f64,
}

impl Default for EcgDetectorConfig {
    fn default() -> Self {
        Self {
            lowcut_hz: 5.0,
            highcut_hz: 15.0,
            integration_window_s: 0.150,
            min_rr_s: 0.300,
            threshold_scale: 0.6,
            search_back_s: 0.150,
        }
    }
}

/// Detect R-peaks with the gradient/envelope pipeline: band-pass,
/// derivative, squaring, moving-window integration and an adaptive threshold
/// that tracks signal and noise levels.
pub fn detect_r_peaks(ts: &TimeSeries, cfg: &EcgDetectorConfig) -> Events {
    if ts.is_empty() {
        return Events::from_indices(Vec::new());
    }

    let fs = ts.fs.max(1.0);
    let bandpassed = bandpass(&ts.data, fs, cfg.lowcut_hz, cfg.highcut_hz);
    let squared: Vec<f64> = derivative(&bandpassed).iter().map(|x| x * x).collect();
    let win = ((cfg.integration_window_s * fs).round() as usize).max(1);
    let envelope = moving_average(&squared, win);

    Events::from_indices(pick_peaks(&bandpassed, &envelope, fs, cfg))
}

fn pick_peaks(bandpassed: &[f64], envelope: &[f64], fs: f64, cfg: &EcgDetectorConfig) -> Vec<usize> {
    let refractory = ((cfg.min_rr_s * fs).round() as usize).max(1);
    let search = ((cfg.search_back_s * fs).round() as usize).max(1);

    // Seed the levels from the first second of envelope.
    let init = envelope.len().min((fs as usize).max(1));
    let avg = envelope[..init].iter().sum::<f64>() / init as f64;
    let mut signal_level = avg;
    let mut noise_level = avg * 0.5;
    let mut threshold = noise_level + cfg.threshold_scale * (signal_level - noise_level).max(0.0);
    let mut last_detection: Option<usize> = None;
    let mut peaks = Vec::new();

    for (i, &sample) in envelope.iter().enumerate() {
        let refractory_ok = last_detection.map_or(true, |last| i - last >= refractory);
        if sample > threshold && refractory_ok {
            let start = i.saturating_sub(search);
            let end = (i + 1).min(bandpassed.len());
            peaks.push(argmax(bandpassed, start, end));
            last_detection = Some(i);
            signal_level = 0.125 * sample + 0.875 * signal_level;
        } else {
            noise_level = 0.125 * sample + 0.875 * noise_level;
        }

        threshold = noise_level + cfg.threshold_scale * (signal_level - noise_level).max(0.0);
    }

    peaks.sort_unstable();
    peaks.dedup();
    peaks
}
