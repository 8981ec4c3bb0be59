//! Small numeric helpers shared by [`crate::Clusterer`] and
//! [`crate::Classifier`].

/// Population mean and standard deviation of `xs`.
///
/// Returns `(0.0, 0.0)` for an empty slice. Uses the full sample — the
/// statistic this is grounded on truncated the last two elements of the
/// sum, which looks like an off-by-two rather than intended behavior.
pub fn mean_stddev(xs: &[f64]) -> (f64, f64) {
    if xs.is_empty() {
        return (0.0, 0.0);
    }
    let n = xs.len() as f64;
    let mean = xs.iter().sum::<f64>() / n;
    let variance = xs.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n;
    (mean, variance.sqrt())
}

/// Minimum and maximum of `xs`. Returns `(0.0, 0.0)` for an empty slice.
pub fn minmax(xs: &[f64]) -> (f64, f64) {
    if xs.is_empty() {
        return (0.0, 0.0);
    }
    let mut min = xs[0];
    let mut max = xs[0];
    for &x in &xs[1..] {
        if x < min {
            min = x;
        }
        if x > max {
            max = x;
        }
    }
    (min, max)
}
