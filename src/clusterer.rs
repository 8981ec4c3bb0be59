//! A growing population of micro-clusters for one stream of vectors.

use rand::Rng;
use rayon::prelude::*;

use crate::distance::Distance;
use crate::error::ValidationError;
use crate::microcluster::MicroCluster;
use crate::stats::{mean_stddev, minmax};

/// Owns an unordered, append-only collection of [`MicroCluster`] and
/// implements the single-pass assignment, forgetting, synthetic
/// generation, k-NN, and outlier-testing operations over it.
#[derive(Debug, Clone)]
pub struct Clusterer {
    radius: f64,
    min_size: u64,
    zones: usize,
    outlier_threshold: f64,
    distance: Distance,
    vector_size: Option<usize>,
    medium_size: f64,
    sigma_size: f64,
    micro_clusters: Vec<MicroCluster>,
}

impl Clusterer {
    /// Build an empty clusterer. Panics if `radius` is not strictly
    /// positive or `zones` is zero — both are programmer failures, not
    /// recoverable input errors.
    pub fn new(radius: f64, min_size: u64, zones: usize, outlier_threshold: f64, distance: Distance) -> Self {
        assert!(radius > 0.0, "radius must be positive");
        assert!(zones >= 1, "zones must be at least 1");
        Clusterer {
            radius,
            min_size,
            zones,
            outlier_threshold,
            distance,
            vector_size: None,
            medium_size: 0.0,
            sigma_size: 0.0,
            micro_clusters: Vec::new(),
        }
    }

    #[allow(clippy::too_many_arguments)]
    pub(crate) fn from_parts(
        radius: f64,
        min_size: u64,
        zones: usize,
        outlier_threshold: f64,
        distance: Distance,
        vector_size: Option<usize>,
        medium_size: f64,
        sigma_size: f64,
        micro_clusters: Vec<MicroCluster>,
    ) -> Self {
        Clusterer {
            radius,
            min_size,
            zones,
            outlier_threshold,
            distance,
            vector_size,
            medium_size,
            sigma_size,
            micro_clusters,
        }
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }
    pub fn min_size(&self) -> u64 {
        self.min_size
    }
    pub fn zones(&self) -> usize {
        self.zones
    }
    pub fn outlier_threshold(&self) -> f64 {
        self.outlier_threshold
    }
    pub fn distance(&self) -> &Distance {
        &self.distance
    }
    pub fn vector_size(&self) -> Option<usize> {
        self.vector_size
    }
    pub fn medium_size(&self) -> f64 {
        self.medium_size
    }
    pub fn sigma_size(&self) -> f64 {
        self.sigma_size
    }
    pub fn micro_clusters(&self) -> &[MicroCluster] {
        &self.micro_clusters
    }

    /// Number of micro-clusters currently tracked, including non-
    /// representative ones.
    pub fn count_mc(&self) -> usize {
        self.micro_clusters.len()
    }

    /// Total weight across *representative* micro-clusters only, i.e.
    /// those with `weight >= min_size`.
    pub fn size(&self) -> u64 {
        self.micro_clusters
            .iter()
            .filter(|mc| mc.weight() >= self.min_size)
            .map(|mc| mc.weight())
            .sum()
    }

    /// Absorb a batch of points, one at a time, in order. The first point
    /// ever added fixes this clusterer's vector dimension; later points of
    /// a different dimension are rejected with a [`ValidationError`] and
    /// the batch stops at that point (already-absorbed points remain
    /// absorbed).
    pub fn add(&mut self, points: &[Vec<f64>]) -> Result<(), ValidationError> {
        for point in points {
            match self.vector_size {
                None => self.vector_size = Some(point.len()),
                Some(expected) if expected != point.len() => {
                    return Err(ValidationError::DimensionMismatch {
                        expected,
                        found: point.len(),
                    });
                }
                _ => {}
            }
            self.add_one(point);
        }
        Ok(())
    }

    fn add_one(&mut self, point: &[f64]) {
        for mc in self.micro_clusters.iter_mut() {
            let d = self.distance.eval(mc.centre(), point);
            if d <= self.radius {
                mc.add(point, d, self.radius);
                return;
            }
        }
        log::debug!("creating micro-cluster #{}", self.micro_clusters.len());
        self.micro_clusters.push(MicroCluster::create(point, self.zones));
    }

    /// Forget roughly `pct` of the total attributed weight, targeting
    /// `floor(pct * total_weight)` individual point credits.
    ///
    /// Each pass makes one Bernoulli draw with probability `p` per
    /// non-empty micro-cluster; a hit removes one point credit from a
    /// randomly chosen non-empty zone. Passes repeat until the target is
    /// met or a full pass removes nothing (guarding against termination
    /// when `p` is small and the target is unreachable). Micro-clusters
    /// left at weight zero are pruned afterward.
    pub fn random_delete(&mut self, rng: &mut impl Rng, pct: f64, p: f64) {
        let total: u64 = self.micro_clusters.iter().map(|mc| mc.weight()).sum();
        let mut target = ((pct * total as f64).floor() as i64).max(0) as u64;
        let before = self.micro_clusters.len();
        while target > 0 {
            let mut removed_this_pass = 0u64;
            for mc in self.micro_clusters.iter_mut() {
                if target == 0 {
                    break;
                }
                if rng.random::<f64>() < p && mc.forget_one(rng) {
                    target -= 1;
                    removed_this_pass += 1;
                }
            }
            if removed_this_pass == 0 {
                break;
            }
        }
        self.micro_clusters.retain(|mc| mc.weight() > 0);
        log::info!(
            "{:<32}{:<32}",
            "forgetting credits",
            format!("pruned {} of {} micro-clusters", before - self.micro_clusters.len(), before)
        );
    }

    /// Emit approximately `n` synthetic points, distributed across
    /// representative micro-clusters proportionally to their weight.
    pub fn generate(&self, rng: &mut impl Rng, n: usize) -> Vec<Vec<f64>> {
        let representative: Vec<&MicroCluster> = self
            .micro_clusters
            .iter()
            .filter(|mc| mc.weight() >= self.min_size)
            .collect();
        if representative.is_empty() || n == 0 {
            return Vec::new();
        }
        let total: u64 = representative.iter().map(|mc| mc.weight()).sum();
        let mut out = Vec::with_capacity(n);
        for mc in &representative {
            let share = ((mc.weight() as f64 / total as f64) * n as f64).floor() as usize;
            let share = share.max(1);
            out.extend(mc.generate(rng, share, self.radius, &self.distance));
        }
        while out.len() < n {
            let mc = representative[rng.random_range(0..representative.len())];
            out.extend(mc.generate(rng, 1, self.radius, &self.distance));
        }
        out
    }

    /// The `k` distinct-distance nearest micro-clusters to `x`, scored by
    /// `distance(x, centre) / weight` so heavier micro-clusters win ties.
    /// Returns `(scaled_distance, weight)` pairs. If fewer than `k`
    /// distinct scaled-distance values exist, returns all of them.
    pub fn knn(&self, x: &[f64], k: usize) -> Vec<(f64, u64)> {
        let mut scored: Vec<(f64, u64)> = self
            .micro_clusters
            .par_iter()
            .map(|mc| {
                let d = self.distance.eval(mc.centre(), x);
                (d / mc.weight() as f64, mc.weight())
            })
            .collect();
        scored.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap());

        let mut out = Vec::new();
        let mut distinct = 0usize;
        let mut last: Option<f64> = None;
        for entry in scored {
            if last != Some(entry.0) {
                distinct += 1;
                last = Some(entry.0);
                if distinct > k {
                    break;
                }
            }
            out.push(entry);
        }
        out
    }

    /// Whether `x` is far from every sufficiently large micro-cluster.
    ///
    /// A micro-cluster counts as "sufficiently large" when its weight
    /// exceeds `medium_size - outlier_threshold * sigma_size`. Before
    /// [`Clusterer::stats`] has ever been called, `medium_size` and
    /// `sigma_size` are both `0.0`, so `tau == 0.0` and any non-empty
    /// micro-cluster still counts as sufficiently large: this falls
    /// straight out of the formula, not from a special-cased default.
    /// The benign default of `true` only applies when there is no
    /// micro-cluster within `radius` of `x` that clears the threshold,
    /// e.g. an empty clusterer.
    pub fn is_outlier(&self, x: &[f64]) -> bool {
        let tau = self.medium_size - self.outlier_threshold * self.sigma_size;
        !self
            .micro_clusters
            .par_iter()
            .any(|mc| mc.weight() as f64 > tau && self.distance.eval(mc.centre(), x) <= self.radius)
    }

    /// Recompute `medium_size`/`sigma_size` from the current weights. This
    /// is the only place those two fields change.
    pub fn stats(&mut self) {
        let weights: Vec<f64> = self.micro_clusters.iter().map(|mc| mc.weight() as f64).collect();
        let (mean, sigma) = mean_stddev(&weights);
        let (min, max) = minmax(&weights);
        self.medium_size = mean;
        self.sigma_size = sigma;
        log::debug!(
            "{:<32}{:<32}",
            "refreshed micro-cluster stats",
            format!("mean={mean:.3} sigma={sigma:.3} min={min:.3} max={max:.3}")
        );
        if mean > 0.0 && min > 0.0 {
            log::debug!(
                "weighted radius diagnostics: mean={:.3} max={:.3} min={:.3}",
                self.radius * mean.ln(),
                self.radius * max.ln(),
                self.radius * min.ln(),
            );
        }
    }
}

impl std::fmt::Display for Clusterer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "clusterer: radius={} zones={} micro-clusters={}", self.radius, self.zones, self.micro_clusters.len())?;
        for (i, mc) in self.micro_clusters.iter().enumerate() {
            writeln!(f, "  #{i}: weight={} zones={:?}", mc.weight(), mc.zones())?;
        }
        Ok(())
    }
}
