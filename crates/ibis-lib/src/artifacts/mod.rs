//! Detection and correction of artifacts in cardiac extrema (R-peaks, PPG
//! systolic peaks).
//!
//! A pass computes the IBI series of the current peaks, normalizes its first
//! difference (`drrs`) and its deviation from a running median (`mrrs`) by a
//! robust rolling threshold, and classifies suspicious beats as ectopic,
//! missed, extra or long/short. The corrector then deletes, inserts or
//! re-centres peaks in that order, rebasing the pending index lists after
//! every change in cardinality. [`correct_peaks`] repeats the pass until a
//! classification repeats.

pub mod classify;
pub mod convergence;
pub mod correct;
pub mod rebase;
pub mod subspace;
pub mod threshold;

pub use classify::{compute_features, find_artifacts, ArtifactFeatures};
pub use convergence::{correct_peaks, correct_peaks_with_config, run_correction, CorrectionOutcome};
pub use correct::correct_artifacts;
pub use rebase::rebase;

use serde::{Deserialize, Serialize};
use std::fmt;

/// Ectopic decision boundary slope.
pub const C1: f64 = 0.13;
/// Ectopic decision boundary intercept.
pub const C2: f64 = 0.17;
/// Scale applied to the rolling IQR.
pub const ALPHA: f64 = 5.2;
/// Rolling window for the `drrs` threshold.
pub const DRRS_WINDOW: usize = 91;
/// Rolling window for the `mrrs` threshold.
pub const MRRS_WINDOW: usize = 91;
/// Kernel of the running median over the IBI series.
pub const MEDFILT_ORDER: usize = 11;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactKind {
    Ectopic,
    Missed,
    Extra,
    LongShort,
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ArtifactKind::Ectopic => "ectopic",
            ArtifactKind::Missed => "missed",
            ArtifactKind::Extra => "extra",
            ArtifactKind::LongShort => "longshort",
        };
        f.write_str(name)
    }
}

/// One classification pass: sorted, de-duplicated positions into the peak
/// array the pass was computed on.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ArtifactSet {
    pub ectopic: Vec<usize>,
    pub missed: Vec<usize>,
    pub extra: Vec<usize>,
    pub longshort: Vec<usize>,
}

impl ArtifactSet {
    pub fn push(&mut self, kind: ArtifactKind, index: usize) {
        self.list_mut(kind).push(index);
    }

    pub fn list(&self, kind: ArtifactKind) -> &[usize] {
        match kind {
            ArtifactKind::Ectopic => &self.ectopic,
            ArtifactKind::Missed => &self.missed,
            ArtifactKind::Extra => &self.extra,
            ArtifactKind::LongShort => &self.longshort,
        }
    }

    fn list_mut(&mut self, kind: ArtifactKind) -> &mut Vec<usize> {
        match kind {
            ArtifactKind::Ectopic => &mut self.ectopic,
            ArtifactKind::Missed => &mut self.missed,
            ArtifactKind::Extra => &mut self.extra,
            ArtifactKind::LongShort => &mut self.longshort,
        }
    }

    pub fn total(&self) -> usize {
        self.ectopic.len() + self.missed.len() + self.extra.len() + self.longshort.len()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// Sort and de-duplicate every list.
    pub(crate) fn canonicalize(&mut self) {
        for list in [
            &mut self.ectopic,
            &mut self.missed,
            &mut self.extra,
            &mut self.longshort,
        ] {
            list.sort_unstable();
            list.dedup();
        }
    }
}
