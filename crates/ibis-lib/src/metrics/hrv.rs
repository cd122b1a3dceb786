use crate::signal::RRSeries;
use serde::{Deserialize, Serialize};

/// Time-domain summary of an RR series (seconds).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct HRVTime {
    pub n: usize,
    pub avnn: f64,
    pub sdnn: f64,
    pub rmssd: f64,
    pub pnn50: f64,
    /// Mean heart rate in beats per minute.
    pub mean_hr: f64,
}

pub fn hrv_time(rr: &RRSeries) -> HRVTime {
    let n = rr.rr.len();
    let avnn = if n > 0 {
        rr.rr.iter().sum::<f64>() / n as f64
    } else {
        0.0
    };
    let sdnn = if n > 1 {
        let mean = avnn;
        (rr.rr.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n as f64 - 1.0)).sqrt()
    } else {
        0.0
    };
    let pnn50 = if n > 1 {
        let count = rr
            .rr
            .windows(2)
            .filter(|w| (w[1] - w[0]).abs() > 0.050)
            .count();
        (count as f64) / (n as f64 - 1.0)
    } else {
        0.0
    };
    let mean_hr = if avnn > 0.0 { 60.0 / avnn } else { 0.0 };

    HRVTime {
        n,
        avnn,
        sdnn,
        rmssd: rmssd(&rr.rr),
        pnn50,
        mean_hr,
    }
}

/// Root mean square of successive differences. Zero for fewer than two values.
pub fn rmssd(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let sum: f64 = values.windows(2).map(|w| (w[1] - w[0]).powi(2)).sum();
    (sum / (values.len() as f64 - 1.0)).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: f64, expected: f64, tol: f64) {
        let diff = (actual - expected).abs();
        assert!(
            diff <= tol,
            "expected {expected}, got {actual} (diff {diff} > tol {tol})"
        );
    }

    #[test]
    fn time_domain_summary() {
        let rr = RRSeries {
            rr: vec![0.8, 0.9, 0.8, 0.7],
        };
        let m = hrv_time(&rr);
        assert_eq!(m.n, 4);
        assert_close(m.avnn, 0.8, 1e-12);
        assert_close(m.sdnn, (0.02f64 / 3.0).sqrt(), 1e-12);
        assert_close(m.rmssd, 0.1, 1e-12);
        assert_close(m.pnn50, 1.0, 1e-12);
        assert_close(m.mean_hr, 75.0, 1e-9);
    }

    #[test]
    fn degenerate_series_are_zero() {
        let m = hrv_time(&RRSeries { rr: vec![] });
        assert_eq!(m.n, 0);
        assert_eq!(m.rmssd, 0.0);
        assert_eq!(m.mean_hr, 0.0);
        assert_eq!(rmssd(&[1.0]), 0.0);
    }
}
