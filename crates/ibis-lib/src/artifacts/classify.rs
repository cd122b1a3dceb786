use super::{
    subspace::{project, Subspaces},
    threshold::{median_filter, normalize, rolling_threshold},
    ArtifactKind, ArtifactSet, ALPHA, C1, C2, DRRS_WINDOW, MEDFILT_ORDER, MRRS_WINDOW,
};
use crate::{error::Result, signal::validate_peaks};
use serde::{Deserialize, Serialize};

/// Per-beat series the classifier decides on. All vectors have one entry per
/// peak.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactFeatures {
    /// IBI series in seconds; `rr[0]` is the mean of the remaining intervals.
    pub rr: Vec<f64>,
    /// Normalized successive differences of `rr`.
    pub drrs: Vec<f64>,
    /// Normalized, asymmetrically scaled deviation of `rr` from its running median.
    pub mrrs: Vec<f64>,
    /// Running median of `rr`.
    pub medrr: Vec<f64>,
    /// Raw (un-normalized) threshold of the median deviation.
    pub th2: Vec<f64>,
    pub s12: Vec<f64>,
    pub s22: Vec<f64>,
}

/// Derive the decision features for a validated peak array.
pub fn compute_features(peaks: &[usize], sfreq: f64) -> Result<ArtifactFeatures> {
    validate_peaks(peaks, sfreq)?;
    Ok(features_unchecked(peaks, sfreq))
}

pub(crate) fn features_unchecked(peaks: &[usize], sfreq: f64) -> ArtifactFeatures {
    let mut rr: Vec<f64> = std::iter::once(0.0)
        .chain(peaks.windows(2).map(|w| (w[1] - w[0]) as f64 / sfreq))
        .collect();
    rr[0] = mean(&rr[1..]);

    let mut drrs: Vec<f64> = std::iter::once(0.0)
        .chain(rr.windows(2).map(|w| w[1] - w[0]))
        .collect();
    drrs[0] = mean(&drrs[1..]);
    let th1 = rolling_threshold(&drrs, ALPHA, DRRS_WINDOW);
    let drrs = normalize(&drrs, &th1);

    let Subspaces { s12, s22 } = project(&drrs);

    let medrr = median_filter(&rr, MEDFILT_ORDER);
    let deviation: Vec<f64> = rr
        .iter()
        .zip(&medrr)
        .map(|(r, m)| {
            let d = r - m;
            if d < 0.0 {
                2.0 * d
            } else {
                d
            }
        })
        .collect();
    let th2 = rolling_threshold(&deviation, ALPHA, MRRS_WINDOW);
    let mrrs = normalize(&deviation, &th2);

    ArtifactFeatures {
        rr,
        drrs,
        mrrs,
        medrr,
        th2,
        s12,
        s22,
    }
}

/// Classify every beat of `peaks` into at most one artifact class.
pub fn find_artifacts(peaks: &[usize], sfreq: f64) -> Result<ArtifactSet> {
    let features = compute_features(peaks, sfreq)?;
    Ok(classify(&features))
}

pub(crate) fn classify(features: &ArtifactFeatures) -> ArtifactSet {
    let ArtifactFeatures {
        drrs, mrrs, s12, ..
    } = features;
    let n = drrs.len();
    let mut artifacts = ArtifactSet::default();

    // The last two beats lack the lookahead the decision rules need.
    for i in 0..n.saturating_sub(2) {
        let d = drrs[i];
        if d.abs() <= 1.0 {
            continue;
        }

        let ectopic_up = d > 1.0 && s12[i] < -C1 * d - C2;
        let ectopic_down = d < -1.0 && s12[i] > -C1 * d + C2;
        if ectopic_up || ectopic_down {
            artifacts.push(ArtifactKind::Ectopic, i);
            continue;
        }

        if !(d.abs() > 1.0 || mrrs[i].abs() > 3.0) {
            continue;
        }

        // Re-check the following beat when the difference after it is the
        // more distorted one.
        let follow = match (drrs.get(i + 1), drrs.get(i + 2)) {
            (Some(next), Some(after)) if next.abs() < after.abs() => Some(i + 1),
            _ => None,
        };
        for j in std::iter::once(i).chain(follow) {
            label_candidate(features, j, &mut artifacts);
        }
    }

    artifacts.canonicalize();
    artifacts
}

/// Label beat `j`. The long and short decisions are made independently, so a
/// beat that is both deviant and short can land in two lists.
fn label_candidate(features: &ArtifactFeatures, j: usize, artifacts: &mut ArtifactSet) {
    let ArtifactFeatures {
        rr,
        drrs,
        mrrs,
        medrr,
        th2,
        s22,
        ..
    } = features;

    let long = drrs[j] > 1.0 && s22[j] < -1.0;
    let deviant = mrrs[j].abs() > 3.0;
    let short = drrs[j] < -1.0 && s22[j] > 1.0;
    if !(long || deviant || short) {
        return;
    }

    let missing = (rr[j] / 2.0 - medrr[j]).abs() < th2[j];
    let extra = rr
        .get(j + 1)
        .is_some_and(|next| (rr[j] + next - medrr[j]).abs() < th2[j]);

    if long || deviant {
        let kind = if extra {
            ArtifactKind::Extra
        } else {
            ArtifactKind::LongShort
        };
        artifacts.push(kind, j);
    }
    if short {
        let kind = if missing {
            ArtifactKind::Missed
        } else {
            ArtifactKind::LongShort
        };
        artifacts.push(kind, j);
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PeakError;

    fn regular_peaks(n: usize, ibi: usize) -> Vec<usize> {
        (1..=n).map(|k| k * ibi).collect()
    }

    fn features_with(drrs: Vec<f64>, s22: Vec<f64>, mrrs: Vec<f64>) -> ArtifactFeatures {
        let n = drrs.len();
        ArtifactFeatures {
            rr: vec![1.0; n],
            drrs,
            mrrs,
            medrr: vec![1.0; n],
            th2: vec![0.05; n],
            s12: vec![0.0; n],
            s22,
        }
    }

    #[test]
    fn rr_head_is_mean_of_remaining_intervals() {
        let features = compute_features(&[0, 100, 300, 400], 100.0).unwrap();
        assert_eq!(features.rr.len(), 4);
        assert!((features.rr[0] - 4.0 / 3.0).abs() < 1e-12);
        assert_eq!(&features.rr[1..], &[1.0, 2.0, 1.0]);
        assert_eq!(features.drrs.len(), 4);
        assert_eq!(features.s12.len(), 4);
    }

    #[test]
    fn regular_rhythm_has_no_artifacts() {
        let peaks = regular_peaks(200, 800);
        let artifacts = find_artifacts(&peaks, 1000.0).unwrap();
        assert!(artifacts.is_empty(), "{artifacts:?}");
    }

    #[test]
    fn invalid_input_fails_fast() {
        assert!(matches!(
            find_artifacts(&[10, 20], 100.0),
            Err(PeakError::TooFewPeaks { .. })
        ));
        assert!(matches!(
            find_artifacts(&[10, 30, 20, 40], 100.0),
            Err(PeakError::NotStrictlyIncreasing { index: 2, .. })
        ));
    }

    #[test]
    fn ectopic_boundary_flags_short_long_pair() {
        let mut features = features_with(vec![0.0, 2.0, 0.0, 0.0, 0.0], vec![0.0; 5], vec![0.0; 5]);
        // -c1 * 2 - c2 = -0.43
        features.s12[1] = -0.5;
        let artifacts = classify(&features);
        assert_eq!(artifacts.ectopic, vec![1]);
        assert_eq!(artifacts.total(), 1);
    }

    #[test]
    fn long_beat_without_extra_evidence_is_longshort() {
        let features = features_with(
            vec![0.0, 2.0, 0.0, 0.0, 0.0],
            vec![0.0, -2.0, 0.0, 0.0, 0.0],
            vec![0.0; 5],
        );
        let artifacts = classify(&features);
        assert_eq!(artifacts.longshort, vec![1]);
        assert!(artifacts.extra.is_empty());
    }

    #[test]
    fn deviant_beat_with_extra_evidence_is_extra() {
        let mut features = features_with(
            vec![0.0, -2.0, 0.0, 0.0, 0.0],
            vec![0.0; 5],
            vec![0.0, -4.0, 0.0, 0.0, 0.0],
        );
        // rr[1] + rr[2] lands on the running median.
        features.rr = vec![1.0, 0.3, 0.7, 1.0, 1.0];
        let artifacts = classify(&features);
        assert_eq!(artifacts.extra, vec![1]);
        assert_eq!(artifacts.total(), 1);
    }

    #[test]
    fn short_beat_with_missing_evidence_is_missed() {
        let mut features = features_with(
            vec![0.0, -2.0, 0.0, 0.0, 0.0],
            vec![0.0, 2.0, 0.0, 0.0, 0.0],
            vec![0.0; 5],
        );
        features.rr = vec![1.0, 2.0, 1.0, 1.0, 1.0];
        let artifacts = classify(&features);
        assert_eq!(artifacts.missed, vec![1]);

        features.rr[1] = 1.2;
        let artifacts = classify(&features);
        assert_eq!(artifacts.longshort, vec![1]);
        assert!(artifacts.missed.is_empty());
    }

    #[test]
    fn deviant_short_beat_gets_both_labels() {
        let mut features = features_with(
            vec![0.0, -2.0, 0.0, 0.0, 0.0],
            vec![0.0, 2.0, 0.0, 0.0, 0.0],
            vec![0.0, 4.0, 0.0, 0.0, 0.0],
        );
        // Half of rr[1] sits on the median; rr[1] + rr[2] does not.
        features.rr = vec![1.0, 2.0, 1.0, 1.0, 1.0];
        let artifacts = classify(&features);
        assert_eq!(artifacts.longshort, vec![1]);
        assert_eq!(artifacts.missed, vec![1]);
        assert!(artifacts.extra.is_empty());
        assert!(artifacts.ectopic.is_empty());
    }

    #[test]
    fn lookahead_adds_following_beat() {
        // |drrs[2]| < |drrs[3]| so beat 2 is evaluated alongside beat 1.
        let features = features_with(
            vec![0.0, 2.0, 0.5, 3.0, 0.0, 0.0],
            vec![0.0, -2.0, 0.0, 0.0, 0.0, 0.0],
            vec![0.0, 0.0, 4.0, 0.0, 0.0, 0.0],
        );
        let artifacts = classify(&features);
        // Beat 3 clears |drrs| > 1 but matches none of the boundaries.
        assert_eq!(artifacts.longshort, vec![1, 2]);
    }

    #[test]
    fn last_two_beats_are_never_candidates() {
        let features = features_with(
            vec![0.0, 0.0, 0.0, 5.0, 5.0],
            vec![0.0, 0.0, 0.0, -5.0, -5.0],
            vec![0.0, 0.0, 0.0, 9.0, 9.0],
        );
        assert!(classify(&features).is_empty());
    }
}
