/// Keep `target` pointing at the same beats after the peak array changed at
/// the `source` positions.
///
/// Every target index strictly greater than a source pivot moves by `delta`,
/// once per distinct pivot, so an index above `k` pivots moves by
/// `k * delta`. Pivots are compared against the original target values. The
/// result is sorted and de-duplicated.
pub fn rebase(source: &[usize], target: &[usize], delta: isize) -> Vec<usize> {
    let mut pivots = source.to_vec();
    pivots.sort_unstable();
    pivots.dedup();

    let mut rebased: Vec<usize> = target
        .iter()
        .filter_map(|&t| {
            let below = pivots.partition_point(|&s| s < t) as isize;
            usize::try_from(t as isize + below * delta).ok()
        })
        .collect();
    rebased.sort_unstable();
    rebased.dedup();
    rebased
}
