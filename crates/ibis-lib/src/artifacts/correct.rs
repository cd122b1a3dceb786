use super::{rebase::rebase, ArtifactSet};
use log::trace;

/// Apply one classification pass to a copy of `peaks`.
///
/// Operators run in a fixed order: delete extra beats, insert missed beats,
/// then re-centre ectopic and long/short beats between their neighbours.
/// After each change in cardinality the lists still pending are rebased onto
/// the new array. Indices too close to either end for an operator are skipped.
pub fn correct_artifacts(artifacts: &ArtifactSet, peaks: &[usize]) -> Vec<usize> {
    let mut peaks = peaks.to_vec();
    let mut missed = artifacts.missed.clone();
    let mut ectopic = artifacts.ectopic.clone();
    let mut longshort = artifacts.longshort.clone();

    if !artifacts.extra.is_empty() {
        let (kept, removed) = remove_extra(&artifacts.extra, &peaks);
        peaks = kept;
        missed = rebase(&removed, &missed, -1);
        ectopic = rebase(&removed, &ectopic, -1);
        longshort = rebase(&removed, &longshort, -1);
    }

    if !missed.is_empty() {
        let (filled, inserted) = insert_missed(&missed, &peaks);
        peaks = filled;
        ectopic = rebase(&inserted, &ectopic, 1);
        longshort = rebase(&inserted, &longshort, 1);
    }

    if !ectopic.is_empty() {
        peaks = realign(&ectopic, &peaks);
    }
    if !longshort.is_empty() {
        peaks = realign(&longshort, &peaks);
    }

    peaks
}

/// Drop the peaks at `extra`. Returns the new array and the positions that
/// were actually removed.
fn remove_extra(extra: &[usize], peaks: &[usize]) -> (Vec<usize>, Vec<usize>) {
    let mut removed: Vec<usize> = extra.iter().copied().filter(|&i| i < peaks.len()).collect();
    removed.sort_unstable();
    removed.dedup();

    let kept = peaks
        .iter()
        .enumerate()
        .filter(|(i, _)| removed.binary_search(i).is_err())
        .map(|(_, &p)| p)
        .collect();
    (kept, removed)
}

/// Insert a beat halfway between `peaks[j - 1]` and `peaks[j]` for every
/// missed index `j`. Insertion points refer to the array before any
/// insertion. Returns the new array and the positions that received a beat.
fn insert_missed(missed: &[usize], peaks: &[usize]) -> (Vec<usize>, Vec<usize>) {
    let mut inserted: Vec<usize> = missed
        .iter()
        .copied()
        .filter(|&j| j > 1 && j < peaks.len())
        .collect();
    inserted.sort_unstable();
    inserted.dedup();

    let mut out = Vec::with_capacity(peaks.len() + inserted.len());
    let mut pending = inserted.iter().peekable();
    for (i, &p) in peaks.iter().enumerate() {
        if pending.next_if_eq(&&i).is_some() {
            out.push(midpoint(peaks[i - 1], p));
        }
        out.push(p);
    }
    dedup_sorted(&mut out);
    (out, inserted)
}

/// Move every beat at `misaligned` to the midpoint of its neighbours. The
/// neighbours are read from the array as it was before this operator ran.
fn realign(misaligned: &[usize], peaks: &[usize]) -> Vec<usize> {
    let mut shifted: Vec<usize> = misaligned
        .iter()
        .copied()
        .filter(|&k| k > 1 && k + 1 < peaks.len())
        .collect();
    shifted.sort_unstable();
    shifted.dedup();

    let mut out: Vec<usize> = peaks
        .iter()
        .enumerate()
        .filter(|(i, _)| shifted.binary_search(i).is_err())
        .map(|(_, &p)| p)
        .collect();
    out.extend(shifted.iter().map(|&k| midpoint(peaks[k - 1], peaks[k + 1])));
    out.sort();
    dedup_sorted(&mut out);
    out
}

fn midpoint(prev: usize, next: usize) -> usize {
    prev + (next - prev) / 2
}

fn dedup_sorted(peaks: &mut Vec<usize>) {
    let before = peaks.len();
    peaks.dedup();
    if peaks.len() != before {
        trace!("dropped {} coinciding peak(s)", before - peaks.len());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_strictly_increasing(peaks: &[usize]) -> bool {
        peaks.windows(2).all(|w| w[0] < w[1])
    }

    #[test]
    fn no_artifacts_returns_copy() {
        let peaks = vec![100, 200, 300, 400];
        assert_eq!(correct_artifacts(&ArtifactSet::default(), &peaks), peaks);
    }

    #[test]
    fn extra_beats_are_deleted() {
        let peaks = vec![0, 100, 150, 200, 300, 400];
        let artifacts = ArtifactSet {
            extra: vec![2],
            ..Default::default()
        };
        assert_eq!(
            correct_artifacts(&artifacts, &peaks),
            vec![0, 100, 200, 300, 400]
        );
    }

    #[test]
    fn missed_beats_are_inserted_before_index() {
        let peaks = vec![0, 100, 200, 400, 500, 700, 800];
        let artifacts = ArtifactSet {
            missed: vec![3, 5],
            ..Default::default()
        };
        assert_eq!(
            correct_artifacts(&artifacts, &peaks),
            vec![0, 100, 200, 300, 400, 500, 600, 700, 800]
        );
    }

    #[test]
    fn missed_indices_near_start_are_skipped() {
        let peaks = vec![0, 200, 300, 400];
        let artifacts = ArtifactSet {
            missed: vec![0, 1],
            ..Default::default()
        };
        assert_eq!(correct_artifacts(&artifacts, &peaks), peaks);
    }

    #[test]
    fn misaligned_beats_are_recentred() {
        let peaks = vec![0, 100, 200, 340, 400, 500];
        let artifacts = ArtifactSet {
            longshort: vec![3],
            ..Default::default()
        };
        assert_eq!(
            correct_artifacts(&artifacts, &peaks),
            vec![0, 100, 200, 300, 400, 500]
        );
    }

    #[test]
    fn realignment_skips_edges() {
        let peaks = vec![0, 130, 200, 300, 420];
        let artifacts = ArtifactSet {
            ectopic: vec![0, 1, 4],
            ..Default::default()
        };
        assert_eq!(correct_artifacts(&artifacts, &peaks), peaks);
    }

    #[test]
    fn pending_lists_follow_deletions_and_insertions() {
        // extra at 2 shifts the missed beat (6 -> 5) and the misaligned beat
        // (8 -> 7); the insertion at 5 shifts it back to 8.
        let peaks = vec![0, 100, 120, 200, 300, 400, 600, 700, 830, 900, 1000];
        let artifacts = ArtifactSet {
            extra: vec![2],
            missed: vec![6],
            longshort: vec![8],
            ..Default::default()
        };
        let corrected = correct_artifacts(&artifacts, &peaks);
        assert_eq!(
            corrected,
            vec![0, 100, 200, 300, 400, 500, 600, 700, 800, 900, 1000]
        );
        assert_eq!(
            corrected.len(),
            peaks.len() - artifacts.extra.len() + artifacts.missed.len()
        );
    }

    #[test]
    fn coinciding_midpoints_stay_unique() {
        // Gap of one sample: the inserted midpoint would equal its predecessor.
        let peaks = vec![0, 10, 20, 21, 40];
        let artifacts = ArtifactSet {
            missed: vec![3],
            ectopic: vec![2],
            ..Default::default()
        };
        let corrected = correct_artifacts(&artifacts, &peaks);
        assert!(is_strictly_increasing(&corrected), "{corrected:?}");
    }
}
