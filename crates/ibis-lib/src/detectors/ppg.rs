use super::filters::{argmax, bandpass, centered_moving_average};
use crate::signal::{Events, TimeSeries};
use serde::{Deserialize, Serialize};

/// Parameters of the two-moving-average systolic peak detector.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct PpgDetectorConfig {
    pub lowcut_hz: f64,
    pub highcut_hz: f64,
    /// Width of the short moving average, about one systolic peak (seconds).
    pub peak_window_s: f64,
    /// Width of the long moving average, about one beat (seconds).
    pub beat_window_s: f64,
    /// Offset added to the long average, as a fraction of the mean energy.
    pub beat_offset: f64,
    /// Smallest allowed distance between consecutive peaks (seconds).
    pub min_delay_s: f64,
}

impl Default for PpgDetectorConfig {
    fn default() -> Self {
        Self {
            lowcut_hz: 0.5,
            highcut_hz: 8.0,
            peak_window_s: 0.111,
            beat_window_s: 0.667,
            beat_offset: 0.02,
            min_delay_s: 0.3,
        }
    }
}

/// Detect systolic peaks in a PPG signal.
///
/// The band-passed signal is clipped at zero and squared. Blocks of interest
/// are runs where the short moving average exceeds the long one plus an
/// offset; each block at least one peak-window wide contributes its maximum.
/// Of two peaks closer than the minimum delay only the taller survives.
pub fn detect_systolic_peaks(ts: &TimeSeries, cfg: &PpgDetectorConfig) -> Events {
    if ts.is_empty() {
        return Events::from_indices(Vec::new());
    }

    let fs = ts.fs.max(1.0);
    let filtered = bandpass(&ts.data, fs, cfg.lowcut_hz, cfg.highcut_hz);
    let energy: Vec<f64> = filtered.iter().map(|x| x.max(0.0).powi(2)).collect();

    let peak_width = ((cfg.peak_window_s * fs).round() as usize).max(1);
    let beat_width = ((cfg.beat_window_s * fs).round() as usize).max(1);
    let ma_peak = centered_moving_average(&energy, peak_width);
    let ma_beat = centered_moving_average(&energy, beat_width);
    let offset = cfg.beat_offset * energy.iter().sum::<f64>() / energy.len() as f64;
    let min_delay = (cfg.min_delay_s * fs).round() as usize;

    let mut peaks: Vec<usize> = Vec::new();
    let mut block_start = None;
    for i in 0..=energy.len() {
        let inside = i < energy.len() && ma_peak[i] > ma_beat[i] + offset;
        match (inside, block_start) {
            (true, None) => block_start = Some(i),
            (false, Some(start)) => {
                block_start = None;
                if i - start < peak_width {
                    continue;
                }
                let candidate = argmax(&filtered, start, i);
                match peaks.last_mut() {
                    Some(last) if candidate - *last < min_delay => {
                        if filtered[candidate] > filtered[*last] {
                            *last = candidate;
                        }
                    }
                    _ => peaks.push(candidate),
                }
            }
            _ => {}
        }
    }

    Events::from_indices(peaks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    /// Systolic pulse followed by a smaller diastolic wave for every beat.
    fn synthetic_ppg(fs: f64, beats: &[f64], duration: f64) -> TimeSeries {
        let samples = (duration * fs) as usize;
        let data = (0..samples)
            .map(|i| {
                let t = i as f64 / fs;
                let mut v = 0.1 * (2.0 * PI * 0.2 * t).sin();
                for &bt in beats {
                    v += (-0.5 * ((t - bt) / 0.08).powi(2)).exp();
                    v += 0.3 * (-0.5 * ((t - bt - 0.3) / 0.1).powi(2)).exp();
                }
                v
            })
            .collect();
        TimeSeries { fs, data }
    }

    #[test]
    fn finds_one_peak_per_pulse() {
        let fs = 100.0;
        let beats: Vec<f64> = (0..12).map(|k| 1.0 + 0.85 * k as f64 + 0.03 * (k % 3) as f64).collect();
        let ts = synthetic_ppg(fs, &beats, 12.0);
        let events = detect_systolic_peaks(&ts, &PpgDetectorConfig::default());
        assert_eq!(events.len(), beats.len(), "{:?}", events.indices);
        for (&detected, &beat) in events.indices.iter().zip(&beats) {
            let expected = beat * fs;
            assert!(
                (detected as f64 - expected).abs() <= 0.1 * fs,
                "peak at {detected}, pulse at {expected}"
            );
        }
        assert!(events.indices.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn flat_signal_has_no_peaks() {
        let ts = TimeSeries {
            fs: 100.0,
            data: vec![1.0; 500],
        };
        assert!(detect_systolic_peaks(&ts, &PpgDetectorConfig::default()).is_empty());
    }
}
