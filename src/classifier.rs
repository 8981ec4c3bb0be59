//! Supervised k-NN classification built on a per-class [`Clusterer`].

use std::collections::BTreeMap;

use rand::Rng;

use crate::clusterer::Clusterer;
use crate::distance::Distance;
use crate::error::ValidationError;
use crate::stats::mean_stddev;

/// One [`Clusterer`] per class label, sharing a single automatically
/// estimated radius.
#[derive(Debug, Clone)]
pub struct Classifier {
    check_outliers: bool,
    radius: f64,
    verbose: bool,
    label_id: Option<usize>,
    outlier: f64,
    threshold: u64,
    zones: usize,
    distance: Distance,
    classes: BTreeMap<i32, Clusterer>,
}

impl Classifier {
    /// Build an empty classifier. `radius == 0.0` requests automatic
    /// estimation on the first [`Classifier::fit`] call (see §4.6.1).
    pub fn new(radius: f64, threshold: u64, zones: usize, outlier: f64, distance: Distance) -> Self {
        assert!(zones >= 1, "zones must be at least 1");
        Classifier {
            check_outliers: false,
            radius,
            verbose: false,
            label_id: None,
            outlier,
            threshold,
            zones,
            distance,
            classes: BTreeMap::new(),
        }
    }

    pub fn with_check_outliers(mut self, check: bool) -> Self {
        self.check_outliers = check;
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    #[allow(clippy::too_many_arguments)]
    pub(crate) fn from_parts(
        check_outliers: bool,
        radius: f64,
        verbose: bool,
        label_id: Option<usize>,
        outlier: f64,
        threshold: u64,
        zones: usize,
        classes: BTreeMap<i32, Clusterer>,
    ) -> Self {
        let distance = classes
            .values()
            .next()
            .map(|c| c.distance().clone())
            .unwrap_or_default();
        Classifier {
            check_outliers,
            radius,
            verbose,
            label_id,
            outlier,
            threshold,
            zones,
            distance,
            classes,
        }
    }

    pub fn check_outliers(&self) -> bool {
        self.check_outliers
    }
    pub fn radius(&self) -> f64 {
        self.radius
    }
    pub fn verbose(&self) -> bool {
        self.verbose
    }
    pub fn label_id(&self) -> Option<usize> {
        self.label_id
    }
    pub fn outlier(&self) -> f64 {
        self.outlier
    }
    pub fn threshold(&self) -> u64 {
        self.threshold
    }
    pub fn zones(&self) -> usize {
        self.zones
    }
    pub fn classes(&self) -> &BTreeMap<i32, Clusterer> {
        &self.classes
    }

    /// Fit on `(features..., label)` rows: split the trailing coordinate
    /// off as the label, forward to [`Classifier::fit`].
    pub fn fit_xy(&mut self, rng: &mut impl Rng, x: &[Vec<f64>], y: &[i32]) -> Result<(), ValidationError> {
        if x.len() != y.len() {
            return Err(ValidationError::LengthMismatch {
                features: x.len(),
                labels: y.len(),
            });
        }
        self.label_id = Some(x.first().map(|row| row.len()).unwrap_or(0));
        let rows: Vec<Vec<f64>> = x
            .iter()
            .zip(y)
            .map(|(features, label)| {
                let mut row = features.clone();
                row.push(*label as f64);
                row
            })
            .collect();
        self.fit(rng, &rows)
    }

    /// Fit on rows whose last coordinate (index `label_id`, fixed at the
    /// feature width of the first row if not already set) is the integer
    /// class label.
    pub fn fit(&mut self, rng: &mut impl Rng, rows: &[Vec<f64>]) -> Result<(), ValidationError> {
        if rows.is_empty() {
            return Ok(());
        }
        let label_id = self.label_id.unwrap_or(rows[0].len() - 1);
        self.label_id = Some(label_id);

        let mut sorted: Vec<&Vec<f64>> = rows.iter().collect();
        sorted.sort_by(|a, b| a[label_id].partial_cmp(&b[label_id]).unwrap());

        let mut runs: Vec<(i32, Vec<Vec<f64>>)> = Vec::new();
        for row in sorted {
            let label = row[label_id].round() as i32;
            let features: Vec<f64> = row
                .iter()
                .enumerate()
                .filter(|(i, _)| *i != label_id)
                .map(|(_, v)| *v)
                .collect();
            match runs.last_mut() {
                Some((last_label, bucket)) if *last_label == label => bucket.push(features),
                _ => runs.push((label, vec![features])),
            }
        }

        if self.radius == 0.0 {
            self.radius = estimate_radius(rng, &runs, &self.distance);
        }

        for (label, points) in &runs {
            let clusterer = self.classes.entry(*label).or_insert_with(|| {
                Clusterer::new(self.radius, self.threshold, self.zones, self.outlier, self.distance.clone())
            });
            clusterer.add(points)?;
        }

        log::info!(
            "{:<32}{:<32}",
            "fit complete",
            format!("radius={:.4} classes={}", self.radius, self.classes.len())
        );
        for (label, clusterer) in &self.classes {
            log::debug!("class {label}: {} micro-clusters", clusterer.count_mc());
        }
        Ok(())
    }

    /// Predict a label for each row of `x` by merging the k-NN lists of
    /// every class's clusterer and taking a majority vote over the
    /// distinct-distance prefix. Ties favour the lowest class label.
    pub fn knn(&self, x: &[Vec<f64>], k: usize) -> Vec<Option<i32>> {
        x.iter().map(|row| self.knn_one(row, k)).collect()
    }

    fn knn_one(&self, x: &[f64], k: usize) -> Option<i32> {
        let mut merged: Vec<(f64, i32)> = Vec::new();
        for (label, clusterer) in &self.classes {
            for (scaled_distance, _weight) in clusterer.knn(x, k) {
                merged.push((scaled_distance, *label));
            }
        }
        if merged.is_empty() {
            return None;
        }
        merged.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap());

        let mut prefix = Vec::new();
        let mut distinct = 0usize;
        let mut last: Option<f64> = None;
        for entry in merged {
            if last != Some(entry.0) {
                distinct += 1;
                last = Some(entry.0);
                if distinct > k {
                    break;
                }
            }
            prefix.push(entry);
        }

        let mut counts: BTreeMap<i32, usize> = BTreeMap::new();
        for (_, label) in prefix {
            *counts.entry(label).or_insert(0) += 1;
        }
        counts.into_iter().max_by_key(|(label, count)| (*count, -*label)).map(|(label, _)| label)
    }
}

/// Estimate a shared radius from per-class nearest-neighbour statistics:
/// sample up to 100 points per class, find each sample's nearest other
/// point in the same class, and combine the per-class mean/stddev of
/// those distances into `mean_of_means + 2 * max_stddev`.
fn estimate_radius(rng: &mut impl Rng, runs: &[(i32, Vec<Vec<f64>>)], distance: &Distance) -> f64 {
    let mut class_means = Vec::new();
    let mut class_sigmas: Vec<f64> = Vec::new();
    for (_, points) in runs {
        if points.len() < 2 {
            continue;
        }
        let sample_size = points.len().min(100);
        let mut indices: Vec<usize> = (0..points.len()).collect();
        for i in (1..indices.len()).rev() {
            let j = rng.random_range(0..=i);
            indices.swap(i, j);
        }
        let sample = &indices[..sample_size];

        let mut nearest = Vec::with_capacity(sample.len());
        for &i in sample {
            let mut best = f64::INFINITY;
            for (j, other) in points.iter().enumerate() {
                if i == j {
                    continue;
                }
                let d = distance.eval(&points[i], other);
                if d < best {
                    best = d;
                }
            }
            if best.is_finite() {
                nearest.push(best);
            }
        }
        let (mean, sigma) = mean_stddev(&nearest);
        class_means.push(mean);
        class_sigmas.push(sigma);
    }
    if class_means.is_empty() {
        return 1.0;
    }
    let mean_of_means = class_means.iter().sum::<f64>() / class_means.len() as f64;
    let max_sigma = class_sigmas.iter().cloned().fold(0.0_f64, f64::max);
    mean_of_means + 2.0 * max_sigma
}
