use super::{
    classify::{classify, features_unchecked},
    correct::correct_artifacts,
    ArtifactSet,
};
use crate::{
    config::CorrectionConfig,
    error::Result,
    signal::{validate_peaks, MIN_PEAKS},
};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Result of a full correction run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorrectionOutcome {
    /// Corrected, strictly increasing peaks.
    pub peaks: Vec<usize>,
    /// Classification of the caller's peaks (before any correction).
    pub initial: ArtifactSet,
    /// Number of correction passes applied.
    pub passes: usize,
    /// False when the pass limit stopped the loop before a classification
    /// repeated.
    pub converged: bool,
}

/// Detect and correct artifacts in `peaks` (sample indices at `sfreq` Hz).
///
/// With `iterative` set, passes repeat until the classification of the
/// current peaks matches one already seen during this call; the peaks at that
/// point are returned without a further correction.
pub fn correct_peaks(peaks: &[usize], sfreq: f64, iterative: bool) -> Result<Vec<usize>> {
    let config = CorrectionConfig {
        iterative,
        ..CorrectionConfig::default()
    };
    correct_peaks_with_config(peaks, sfreq, &config)
}

pub fn correct_peaks_with_config(
    peaks: &[usize],
    sfreq: f64,
    config: &CorrectionConfig,
) -> Result<Vec<usize>> {
    run_correction(peaks, sfreq, config).map(|outcome| outcome.peaks)
}

/// Like [`correct_peaks_with_config`], but also reports how the run went.
pub fn run_correction(
    peaks: &[usize],
    sfreq: f64,
    config: &CorrectionConfig,
) -> Result<CorrectionOutcome> {
    validate_peaks(peaks, sfreq)?;

    let initial = classify(&features_unchecked(peaks, sfreq));
    log_pass(0, peaks.len(), &initial);
    let mut current = correct_artifacts(&initial, peaks);
    let mut passes = 1;

    if !config.iterative {
        return Ok(CorrectionOutcome {
            peaks: current,
            initial,
            passes,
            converged: true,
        });
    }

    let mut seen = HashSet::new();
    seen.insert(initial.clone());
    let mut converged = true;

    while current.len() >= MIN_PEAKS {
        let artifacts = classify(&features_unchecked(&current, sfreq));
        log_pass(passes, current.len(), &artifacts);
        if seen.contains(&artifacts) {
            break;
        }
        if passes > config.max_iterations {
            warn!(
                "stopping artifact correction after {} passes without a repeated classification",
                passes
            );
            converged = false;
            break;
        }
        current = correct_artifacts(&artifacts, &current);
        seen.insert(artifacts);
        passes += 1;
    }

    debug!(
        "artifact correction finished after {} pass(es), {} distinct classification(s), {} -> {} peaks",
        passes,
        seen.len(),
        peaks.len(),
        current.len()
    );
    Ok(CorrectionOutcome {
        peaks: current,
        initial,
        passes,
        converged,
    })
}

fn log_pass(pass: usize, n_peaks: usize, artifacts: &ArtifactSet) {
    debug!(
        "pass {}: {} peaks, ectopic={} missed={} extra={} longshort={}",
        pass,
        n_peaks,
        artifacts.ectopic.len(),
        artifacts.missed.len(),
        artifacts.extra.len(),
        artifacts.longshort.len()
    );
}
