/// Decision-boundary features derived from the normalized dRR series.
#[derive(Debug, Clone, PartialEq)]
pub struct Subspaces {
    pub s12: Vec<f64>,
    pub s22: Vec<f64>,
}

/// Cast normalized dRRs into the `s12` / `s22` subspaces.
///
/// Neighbours outside the series are read from a mirror-reflected view, so
/// `i - 1`, `i + 1` and `i + 2` always resolve. Samples with `drrs[i] == 0`
/// keep zero in both subspaces.
pub fn project(drrs: &[f64]) -> Subspaces {
    let n = drrs.len();
    let mut s12 = vec![0.0; n];
    let mut s22 = vec![0.0; n];
    for (i, &d) in drrs.iter().enumerate() {
        let i = i as isize;
        let prev = reflect(drrs, i - 1);
        let next = reflect(drrs, i + 1);
        let after = reflect(drrs, i + 2);
        if d > 0.0 {
            s12[i as usize] = prev.max(next);
            s22[i as usize] = next.min(after);
        } else if d < 0.0 {
            s12[i as usize] = prev.min(next);
            s22[i as usize] = next.max(after);
        }
    }
    Subspaces { s12, s22 }
}

/// Reflect an out-of-range index back into `data` without repeating the edge
/// sample (`[a, b, c]` extends to `c b | a b c | b a`).
fn reflect(data: &[f64], idx: isize) -> f64 {
    let n = data.len() as isize;
    if n == 1 {
        return data[0];
    }
    let period = 2 * (n - 1);
    let mut k = idx.rem_euclid(period);
    if k >= n {
        k = period - k;
    }
    data[k as usize]
}
