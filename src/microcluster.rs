//! A single bounded spherical micro-cluster.

use rand::Rng;

use crate::distance::Distance;
use crate::sphere::n_sphere;

/// One micro-cluster: a centre, an integer weight, and a radial histogram
/// of `zones` shells between the origin and the owning clusterer's radius.
///
/// Invariant: `weight == zones.iter().sum()` always holds outside of a
/// method call.
#[derive(Debug, Clone)]
pub struct MicroCluster {
    centre: Vec<f64>,
    weight: u64,
    zones: Vec<u64>,
}

impl MicroCluster {
    /// Create a new micro-cluster seeded by its first point. Weight is 1
    /// and the entire mass sits in zone 0.
    pub fn create(point: &[f64], zones: usize) -> Self {
        let mut z = vec![0u64; zones.max(1)];
        z[0] = 1;
        MicroCluster {
            centre: point.to_vec(),
            weight: 1,
            zones: z,
        }
    }

    pub fn centre(&self) -> &[f64] {
        &self.centre
    }

    pub fn weight(&self) -> u64 {
        self.weight
    }

    pub fn zones(&self) -> &[u64] {
        &self.zones
    }

    /// Rebuild a micro-cluster from its raw parts (used by [`crate::view`]
    /// deserialization).
    pub(crate) fn from_parts(centre: Vec<f64>, weight: u64, zones: Vec<u64>) -> Self {
        MicroCluster {
            centre,
            weight,
            zones,
        }
    }

    /// Absorb `point`, already known to be at distance `d <= radius` from
    /// the current centre. Updates the centre as the exact running mean
    /// and increments the weight and the zone its distance falls into.
    pub fn add(&mut self, point: &[f64], d: f64, radius: f64) {
        debug_assert_eq!(point.len(), self.centre.len());
        let w = self.weight as f64;
        for (c, p) in self.centre.iter_mut().zip(point) {
            *c = (w * *c + p) / (w + 1.0);
        }
        let z = self.zones.len();
        let shell_width = radius / z as f64;
        // Smallest z such that d <= (z+1)*R/Z: zones are the half-open,
        // upper-inclusive interval (z*R/Z, (z+1)*R/Z], so a point sitting
        // exactly on an internal boundary belongs to the lower zone.
        let shell = (0..z)
            .find(|&i| d <= (i + 1) as f64 * shell_width)
            .unwrap_or(z - 1);
        self.zones[shell] += 1;
        self.weight += 1;
    }

    /// Remove one point credit from a randomly chosen non-empty zone.
    /// Returns `false` (and does nothing) if the micro-cluster is already
    /// empty.
    pub(crate) fn forget_one(&mut self, rng: &mut impl Rng) -> bool {
        if self.weight == 0 {
            return false;
        }
        let nonempty: Vec<usize> = self
            .zones
            .iter()
            .enumerate()
            .filter(|(_, &c)| c > 0)
            .map(|(i, _)| i)
            .collect();
        if nonempty.is_empty() {
            return false;
        }
        let pick = nonempty[rng.random_range(0..nonempty.len())];
        self.zones[pick] -= 1;
        self.weight -= 1;
        true
    }

    /// Emit approximately `n` synthetic points, distributed across zones
    /// proportionally to this micro-cluster's zoned histogram, with any
    /// rounding shortfall filled by uniform sampling over `[0, radius)`.
    pub fn generate(&self, rng: &mut impl Rng, n: usize, radius: f64, distance: &Distance) -> Vec<Vec<f64>> {
        if self.weight == 0 || n == 0 {
            return Vec::new();
        }
        let z = self.zones.len();
        let shell_width = radius / z as f64;
        let mut points = Vec::with_capacity(n);
        for (i, &count) in self.zones.iter().enumerate() {
            let nz = ((count as f64) * (n as f64) / (self.weight as f64)).round() as usize;
            let lo = i as f64 * shell_width;
            let hi = (i as f64 + 1.0) * shell_width;
            for _ in 0..nz {
                let r = if hi > lo { rng.random_range(lo..hi) } else { lo };
                points.push(n_sphere(rng, &self.centre, r, distance));
            }
        }
        while points.len() < n {
            let r = rng.random_range(0.0..radius);
            points.push(n_sphere(rng, &self.centre, r, distance));
        }
        points
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    #[test]
    fn create_sets_weight_one_and_zone_zero() {
        let mc = MicroCluster::create(&[1.0, 2.0], 3);
        assert_eq!(mc.weight(), 1);
        assert_eq!(mc.zones(), &[1, 0, 0]);
    }

    #[test]
    fn add_updates_running_mean() {
        let mut mc = MicroCluster::create(&[0.0, 0.0], 1);
        mc.add(&[2.0, 2.0], 2.0_f64.hypot(2.0), 5.0);
        assert_eq!(mc.weight(), 2);
        assert_eq!(mc.centre(), &[1.0, 1.0]);
    }

    #[test]
    fn weight_equals_sum_of_zones() {
        let mut mc = MicroCluster::create(&[0.0], 2);
        for i in 1..10 {
            let p = vec![i as f64 * 0.1];
            let d = (p[0] - mc.centre()[0]).abs();
            mc.add(&p, d, 1.0);
        }
        assert_eq!(mc.weight(), mc.zones().iter().sum::<u64>());
    }

    #[test]
    fn forget_one_decrements_weight() {
        let mut mc = MicroCluster::create(&[0.0], 1);
        mc.add(&[0.1], 0.1, 1.0);
        let mut rng = SmallRng::seed_from_u64(1);
        assert!(mc.forget_one(&mut rng));
        assert_eq!(mc.weight(), 1);
        assert_eq!(mc.zones().iter().sum::<u64>(), 1);
    }

    #[test]
    fn forget_one_on_empty_returns_false() {
        let mut mc = MicroCluster::create(&[0.0], 1);
        let mut rng = SmallRng::seed_from_u64(2);
        mc.forget_one(&mut rng);
        assert!(!mc.forget_one(&mut rng));
    }

    #[test]
    fn generate_returns_at_least_n_points() {
        let mut mc = MicroCluster::create(&[0.0, 0.0], 3);
        let mut rng = SmallRng::seed_from_u64(42);
        for i in 0..20 {
            let p = vec![i as f64 * 0.05, 0.0];
            let d = Distance::Euclidean.eval(mc.centre(), &p);
            mc.add(&p, d.min(0.9), 1.0);
        }
        let out = mc.generate(&mut rng, 50, 1.0, &Distance::Euclidean);
        assert!(out.len() >= 50);
    }
}
