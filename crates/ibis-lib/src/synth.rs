//! Seeded synthetic beat sequences and artifact injectors.
//!
//! Used by the test-suite and the `ibis simulate` command to produce clean
//! rhythms with known, reproducible defects.

use crate::metrics::hrv::rmssd;
use anyhow::{Context, Result};
use rand::{rngs::StdRng, SeedableRng};
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Sinusoidally modulated IBI sequence with Gaussian jitter.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct CleanRhythm {
    pub n_beats: usize,
    pub mean_ibi_ms: f64,
    /// Peak deviation of the sinusoid around the mean.
    pub amplitude_ms: f64,
    /// Length of one sinusoid cycle, in beats.
    pub period_beats: f64,
    pub noise_sd_ms: f64,
}

impl Default for CleanRhythm {
    fn default() -> Self {
        Self {
            n_beats: 1000,
            mean_ibi_ms: 1000.0,
            amplitude_ms: 125.0,
            period_beats: 100.0,
            noise_sd_ms: 10.0,
        }
    }
}

impl CleanRhythm {
    /// Generate `n_beats` IBIs in milliseconds.
    pub fn generate(&self, seed: u64) -> Result<Vec<f64>> {
        let mut rng = StdRng::seed_from_u64(seed);
        let noise = Normal::new(0.0, self.noise_sd_ms)
            .with_context(|| format!("invalid IBI noise sd {}", self.noise_sd_ms))?;
        let period = self.period_beats.max(1.0);
        Ok((0..self.n_beats)
            .map(|k| {
                let phase = 2.0 * PI * k as f64 / period;
                let ibi = self.mean_ibi_ms + self.amplitude_ms * phase.sin() + noise.sample(&mut rng);
                ibi.max(1.0)
            })
            .collect())
    }
}

/// Accumulate IBIs (milliseconds) into peak sample indices at `fs` Hz.
pub fn peaks_from_ibis(ibis_ms: &[f64], fs: f64) -> Vec<usize> {
    let mut t_ms = 0.0;
    let mut peaks: Vec<usize> = ibis_ms
        .iter()
        .map(|ibi| {
            t_ms += ibi;
            (t_ms / 1000.0 * fs).round() as usize
        })
        .collect();
    peaks.dedup();
    peaks
}

/// Delay the peaks at `offset`, `offset + every`, ... by `shift` samples.
/// A peak is left alone when the shift would reach its successor.
pub fn misalign(peaks: &[usize], every: usize, offset: usize, shift: usize) -> Vec<usize> {
    let mut out = peaks.to_vec();
    for i in (offset..out.len()).step_by(every.max(1)) {
        let moved = out[i] + shift;
        if out.get(i + 1).map_or(true, |&next| moved < next) {
            out[i] = moved;
        }
    }
    out
}

/// Insert a spurious beat at `fraction` of the gap before the peaks at
/// `offset`, `offset + every`, ...
pub fn insert_extra(peaks: &[usize], every: usize, offset: usize, fraction: f64) -> Vec<usize> {
    let every = every.max(1);
    let mut out = Vec::with_capacity(peaks.len() + peaks.len() / every + 1);
    for (i, &p) in peaks.iter().enumerate() {
        if i >= offset.max(1) && (i - offset) % every == 0 {
            let prev = peaks[i - 1];
            let extra = prev + ((p - prev) as f64 * fraction) as usize;
            if prev < extra && extra < p {
                out.push(extra);
            }
        }
        out.push(p);
    }
    out
}

/// Drop the peaks at `offset`, `offset + every`, ...
pub fn remove_every(peaks: &[usize], every: usize, offset: usize) -> Vec<usize> {
    let every = every.max(1);
    peaks
        .iter()
        .enumerate()
        .filter(|(i, _)| *i < offset || (i - offset) % every != 0)
        .map(|(_, &p)| p)
        .collect()
}

/// RMSSD of the intervals between `peaks`, in samples.
pub fn rmssd_of_peaks(peaks: &[usize]) -> f64 {
    let ibis: Vec<f64> = peaks.windows(2).map(|w| (w[1] - w[0]) as f64).collect();
    rmssd(&ibis)
}
