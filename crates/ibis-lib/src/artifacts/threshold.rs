//! Robust rolling statistics used to normalize the difference series.

/// Centered rolling dispersion threshold: `alpha * IQR(|series|) / 2`.
///
/// The window for sample `i` spans `width / 2` samples before and
/// `(width - 1) / 2` samples after it. Near the edges the window is truncated
/// to the samples that exist; nothing is padded.
pub fn rolling_threshold(series: &[f64], alpha: f64, window_width: usize) -> Vec<f64> {
    let n = series.len();
    let width = window_width.max(1);
    let before = width / 2;
    let after = (width - 1) / 2;
    let magnitudes: Vec<f64> = series.iter().map(|x| x.abs()).collect();

    let mut window = Vec::with_capacity(width);
    (0..n)
        .map(|i| {
            let start = i.saturating_sub(before);
            let end = (i + after + 1).min(n);
            window.clear();
            window.extend_from_slice(&magnitudes[start..end]);
            window.sort_by(f64::total_cmp);
            let iqr = quantile_sorted(&window, 0.75) - quantile_sorted(&window, 0.25);
            alpha * iqr / 2.0
        })
        .collect()
}

/// Divide each value by its threshold. A zero (or otherwise unusable)
/// threshold counts as infinite, so the normalized value is 0.
pub fn normalize(values: &[f64], thresholds: &[f64]) -> Vec<f64> {
    values
        .iter()
        .zip(thresholds)
        .map(|(&v, &th)| if th > 0.0 && th.is_finite() { v / th } else { 0.0 })
        .collect()
}

/// Median filter with an odd kernel, zero-padded at both ends.
pub fn median_filter(series: &[f64], order: usize) -> Vec<f64> {
    let n = series.len() as isize;
    let order = order.max(1);
    let half = (order / 2) as isize;
    let mut window = Vec::with_capacity(order);
    (0..n)
        .map(|i| {
            window.clear();
            window.extend((i - half..=i + half).map(|k| {
                if (0..n).contains(&k) {
                    series[k as usize]
                } else {
                    0.0
                }
            }));
            window.sort_by(f64::total_cmp);
            window[window.len() / 2]
        })
        .collect()
}

/// Linear-interpolated quantile of an already sorted slice.
fn quantile_sorted(sorted: &[f64], q: f64) -> f64 {
    match sorted.len() {
        0 => 0.0,
        1 => sorted[0],
        len => {
            let pos = q.clamp(0.0, 1.0) * (len - 1) as f64;
            let lo = pos.floor() as usize;
            let hi = pos.ceil() as usize;
            sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
        }
    }
}
