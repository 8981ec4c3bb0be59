//! An online micro-clustering engine for unbounded streams of numeric
//! vectors.
//!
//! Incoming points are partitioned, one at a time, into bounded spherical
//! regions ("micro-clusters") without ever revisiting earlier points. The
//! resulting micro-cluster population is a compressed summary of the
//! stream, used for three downstream tasks:
//!
//! 1. synthetic data regeneration that preserves the empirical
//!    distribution (via the zoned radial histogram on each micro-cluster)
//! 2. supervised k-nearest-neighbour classification over a population of
//!    per-class micro-cluster sets
//! 3. forgetting-based adaptation to concept drift, by stochastically
//!    decaying micro-cluster weights and pruning empty ones
//!
//! ## Core Types
//!
//! - [`Distance`] — the family of vector distance functions, captured by
//!   value rather than read from global state.
//! - [`MicroCluster`] — one bounded spherical region: a centre, an
//!   integer weight, and a radial zone histogram.
//! - [`Clusterer`] — owns a growing population of micro-clusters for one
//!   stream; implements add, forgetting, generation, k-NN, and outlier
//!   testing.
//! - [`Classifier`] — owns one [`Clusterer`] per class label and performs
//!   multi-class k-NN voting with automatic radius estimation.
//!
//! ## Persistence
//!
//! Serialization lives outside this crate. [`view::ClustererView`] and
//! [`view::ClassifierView`] are lossless value-object projections a
//! caller can feed to any serialization format; enable the `serde`
//! feature to derive `Serialize`/`Deserialize` on them.

mod classifier;
mod clusterer;
mod distance;
mod error;
mod microcluster;
mod sphere;
mod stats;
pub mod view;

pub use classifier::Classifier;
pub use clusterer::Clusterer;
pub use distance::Distance;
pub use error::ValidationError;
pub use microcluster::MicroCluster;

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    #[test]
    fn end_to_end_add_generate_knn() {
        let mut rng = SmallRng::seed_from_u64(123);
        let mut c = Clusterer::new(3.0, 2, 2, 2.0, Distance::Euclidean);
        let points: Vec<Vec<f64>> = (0..50)
            .map(|i| vec![(i % 5) as f64, (i % 3) as f64])
            .collect();
        c.add(&points).unwrap();
        assert!(c.count_mc() > 0);

        let generated = c.generate(&mut rng, 30);
        assert!(generated.len() >= 30);

        let neighbours = c.knn(&[0.0, 0.0], 2);
        assert!(!neighbours.is_empty());
    }

    #[test]
    fn view_round_trips_clusterer() {
        let mut c = Clusterer::new(2.0, 1, 2, 1.5, Distance::Manhattan);
        c.add(&[vec![1.0, 1.0], vec![1.5, 1.5], vec![9.0, 9.0]]).unwrap();
        c.stats();

        let view = view::ClustererView::from(&c);
        let restored = Clusterer::try_from(view.clone()).unwrap();
        let restored_view = view::ClustererView::from(&restored);
        assert_eq!(view, restored_view);
    }
}
