//! Sampling a point on or within an n-sphere around a centre.

use rand::Rng;

use crate::distance::Distance;

/// Draw a point at distance `r` from `centre` under `distance`'s norm.
///
/// Each coordinate of the direction vector is drawn uniformly from
/// `[0, 1)` and then normalized so `centre + r * direction` lies exactly
/// `r` away from `centre` under the active metric: the L2 norm for
/// [`Distance::Euclidean`], the L1 norm otherwise. Because coordinates are
/// never negative, only the orthant of the sphere with all-positive
/// offsets from `centre` is reachable; callers that need full coverage
/// should flip signs per coordinate themselves.
pub fn n_sphere(rng: &mut impl Rng, centre: &[f64], r: f64, distance: &Distance) -> Vec<f64> {
    let mut direction: Vec<f64> = (0..centre.len()).map(|_| rng.random::<f64>()).collect();
    let norm = if distance.is_euclidean() {
        direction.iter().map(|x| x * x).sum::<f64>().sqrt()
    } else {
        direction.iter().map(|x| x.abs()).sum::<f64>()
    };
    if norm > 0.0 {
        for x in direction.iter_mut() {
            *x /= norm;
        }
    }
    centre
        .iter()
        .zip(direction)
        .map(|(c, d)| c + r * d)
        .collect()
}
