use super::filters::{argmax, argmin, single_pole_lowpass};
use crate::signal::{Events, TimeSeries};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct RespDetectorConfig {
    /// Low-pass cutoff applied before looking for zero crossings (Hz).
    pub highcut_hz: f64,
    /// Breaths shallower than this fraction of the median depth are dropped.
    pub amplitude_ratio: f64,
}

impl Default for RespDetectorConfig {
    fn default() -> Self {
        Self {
            highcut_hz: 0.5,
            amplitude_ratio: 0.3,
        }
    }
}

/// Inhalation peaks and exhalation troughs of a breathing signal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RespExtrema {
    pub peaks: Vec<usize>,
    pub troughs: Vec<usize>,
}

/// Breathing peaks only.
pub fn detect_breaths(ts: &TimeSeries, cfg: &RespDetectorConfig) -> Events {
    Events::from_indices(detect_extrema(ts, cfg).peaks)
}

/// Locate peaks and troughs from the zero crossings of the smoothed,
/// mean-removed signal. Each peak sits between a rising crossing and the next
/// falling one; each trough between a falling crossing and the next rising
/// one. Extrema are taken on the unfiltered signal so the low-pass lag does
/// not shift them.
pub fn detect_extrema(ts: &TimeSeries, cfg: &RespDetectorConfig) -> RespExtrema {
    if ts.data.len() < 2 {
        return RespExtrema::default();
    }
    let fs = ts.fs.max(1.0);
    let mean = ts.data.iter().sum::<f64>() / ts.data.len() as f64;
    let centered: Vec<f64> = ts.data.iter().map(|x| x - mean).collect();
    let smooth = if cfg.highcut_hz > 0.0 && cfg.highcut_hz < fs * 0.5 {
        single_pole_lowpass(&centered, fs, cfg.highcut_hz)
    } else {
        centered.clone()
    };

    let crossings: Vec<(usize, bool)> = smooth
        .windows(2)
        .enumerate()
        .filter_map(|(i, w)| match (w[0] < 0.0, w[1] < 0.0) {
            (true, false) => Some((i + 1, true)),
            (false, true) => Some((i + 1, false)),
            _ => None,
        })
        .collect();

    let mut extrema = RespExtrema::default();
    for pair in crossings.windows(2) {
        let ((start, rising), (end, _)) = (pair[0], pair[1]);
        if rising {
            extrema.peaks.push(argmax(&centered, start, end));
        } else {
            extrema.troughs.push(argmin(&centered, start, end));
        }
    }

    drop_shallow_breaths(&centered, &mut extrema, cfg.amplitude_ratio);
    extrema
}

/// A peak's depth is its rise above the higher of its neighbouring troughs.
fn drop_shallow_breaths(signal: &[f64], extrema: &mut RespExtrema, ratio: f64) {
    if extrema.peaks.is_empty() || extrema.troughs.is_empty() {
        return;
    }
    let troughs = &extrema.troughs;
    let depths: Vec<f64> = extrema
        .peaks
        .iter()
        .map(|&p| {
            let next = troughs.partition_point(|&t| t < p);
            let floor = [next.checked_sub(1), Some(next)]
                .into_iter()
                .flatten()
                .filter_map(|k| troughs.get(k))
                .map(|&t| signal[t])
                .fold(f64::NEG_INFINITY, f64::max);
            signal[p] - floor
        })
        .collect();

    let mut sorted = depths.clone();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let mid = sorted.len() / 2;
    let median = if sorted.len() % 2 == 0 {
        0.5 * (sorted[mid - 1] + sorted[mid])
    } else {
        sorted[mid]
    };
    let cutoff = ratio * median;

    let before = extrema.peaks.len();
    extrema.peaks = extrema
        .peaks
        .iter()
        .zip(&depths)
        .filter(|&(_, &depth)| depth >= cutoff)
        .map(|(&p, _)| p)
        .collect();
    let dropped = before - extrema.peaks.len();
    if dropped > 0 {
        log::debug!("dropped {dropped} shallow breath(s) below depth {cutoff:.4}");
    }
}
