//! First-order filters and smoothing shared by the extrema detectors.

use std::f64::consts::PI;

/// Cascade of a single-pole high-pass and low-pass. A non-positive `low`
/// skips the high-pass; a `high` at or above Nyquist skips the low-pass.
pub fn bandpass(data: &[f64], fs: f64, low: f64, high: f64) -> Vec<f64> {
    if data.is_empty() {
        return Vec::new();
    }
    let hp = if low > 0.0 {
        single_pole_highpass(data, fs, low)
    } else {
        data.to_vec()
    };
    if high <= 0.0 || high >= fs * 0.5 {
        hp
    } else {
        single_pole_lowpass(&hp, fs, high)
    }
}

pub fn single_pole_highpass(data: &[f64], fs: f64, cutoff: f64) -> Vec<f64> {
    if data.is_empty() {
        return Vec::new();
    }
    let dt = 1.0 / fs;
    let rc = 1.0 / (2.0 * PI * cutoff.max(0.01));
    let alpha = rc / (rc + dt);
    let mut out = Vec::with_capacity(data.len());
    let mut prev_y = 0.0;
    let mut prev_x = data[0];
    for &x in data {
        let y = alpha * (prev_y + x - prev_x);
        out.push(y);
        prev_y = y;
        prev_x = x;
    }
    out
}

pub fn single_pole_lowpass(data: &[f64], fs: f64, cutoff: f64) -> Vec<f64> {
    if data.is_empty() {
        return Vec::new();
    }
    let dt = 1.0 / fs;
    let rc = 1.0 / (2.0 * PI * cutoff.max(0.01));
    let alpha = dt / (rc + dt);
    let mut out = Vec::with_capacity(data.len());
    let mut prev = data[0];
    for &x in data {
        prev += alpha * (x - prev);
        out.push(prev);
    }
    out
}

pub fn derivative(data: &[f64]) -> Vec<f64> {
    let mut out = vec![0.0; data.len()];
    for i in 1..data.len() {
        out[i] = data[i] - data[i - 1];
    }
    out
}

/// Trailing moving average over `win` samples.
pub fn moving_average(data: &[f64], win: usize) -> Vec<f64> {
    if win <= 1 {
        return data.to_vec();
    }
    let mut out = vec![0.0; data.len()];
    let mut acc = 0.0;
    for (i, &sample) in data.iter().enumerate() {
        acc += sample;
        if i >= win {
            acc -= data[i - win];
        }
        out[i] = acc / win as f64;
    }
    out
}

/// Moving average centred on each sample; edge windows average whatever
/// samples they cover.
pub fn centered_moving_average(data: &[f64], win: usize) -> Vec<f64> {
    let n = data.len();
    if win <= 1 || n == 0 {
        return data.to_vec();
    }
    let mut prefix = Vec::with_capacity(n + 1);
    prefix.push(0.0);
    for &x in data {
        prefix.push(prefix[prefix.len() - 1] + x);
    }
    let before = win / 2;
    let after = (win - 1) / 2;
    (0..n)
        .map(|i| {
            let start = i.saturating_sub(before);
            let end = (i + after + 1).min(n);
            (prefix[end] - prefix[start]) / (end - start) as f64
        })
        .collect()
}

/// Index of the largest value in `data[start..end]`.
pub fn argmax(data: &[f64], start: usize, end: usize) -> usize {
    let mut best = start;
    for i in start..end {
        if data[i] > data[best] {
            best = i;
        }
    }
    best
}

/// Index of the smallest value in `data[start..end]`.
pub fn argmin(data: &[f64], start: usize, end: usize) -> usize {
    let mut best = start;
    for i in start..end {
        if data[i] < data[best] {
            best = i;
        }
    }
    best
}
