//! Lossless value-object projections of [`crate::Clusterer`] and
//! [`crate::Classifier`], for external serialization.
//!
//! The core never serializes anything itself; these are plain structs a
//! caller can feed to whatever serialization format it likes (JSON, a
//! database row, …). Field names mirror the Go original's persistence
//! DTOs so a port can round-trip against reference fixtures byte-for-byte.

use std::collections::BTreeMap;

use crate::classifier::Classifier;
use crate::clusterer::Clusterer;
use crate::distance::Distance;
use crate::error::ValidationError;
use crate::microcluster::MicroCluster;

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct MicroClusterView {
    pub centre: Vec<f64>,
    pub weight: u64,
    pub zones: Vec<u64>,
}

impl From<&MicroCluster> for MicroClusterView {
    fn from(mc: &MicroCluster) -> Self {
        MicroClusterView {
            centre: mc.centre().to_vec(),
            weight: mc.weight(),
            zones: mc.zones().to_vec(),
        }
    }
}

impl From<MicroClusterView> for MicroCluster {
    fn from(v: MicroClusterView) -> Self {
        MicroCluster::from_parts(v.centre, v.weight, v.zones)
    }
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct ClustererView {
    pub radius: f64,
    pub min_size: u64,
    pub zones: usize,
    pub medium_size: f64,
    pub sigma_size: f64,
    pub outlier_threshold: f64,
    pub vector_size: Option<usize>,
    pub distance_name: String,
    pub micro_clusters: Vec<MicroClusterView>,
}

impl From<&Clusterer> for ClustererView {
    fn from(c: &Clusterer) -> Self {
        ClustererView {
            radius: c.radius(),
            min_size: c.min_size(),
            zones: c.zones(),
            medium_size: c.medium_size(),
            sigma_size: c.sigma_size(),
            outlier_threshold: c.outlier_threshold(),
            vector_size: c.vector_size(),
            distance_name: c.distance().name(),
            micro_clusters: c.micro_clusters().iter().map(MicroClusterView::from).collect(),
        }
    }
}

impl TryFrom<ClustererView> for Clusterer {
    type Error = ValidationError;

    fn try_from(v: ClustererView) -> Result<Self, Self::Error> {
        let distance = distance_from_name(&v.distance_name);
        Ok(Clusterer::from_parts(
            v.radius,
            v.min_size,
            v.zones,
            v.outlier_threshold,
            distance,
            v.vector_size,
            v.medium_size,
            v.sigma_size,
            v.micro_clusters.into_iter().map(MicroCluster::from).collect(),
        ))
    }
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifierView {
    pub check_outliers: bool,
    pub radius: f64,
    pub verbose: bool,
    pub label_id: Option<usize>,
    pub outlier: f64,
    pub threshold: u64,
    pub zones: usize,
    pub classes: BTreeMap<i32, ClustererView>,
}

impl From<&Classifier> for ClassifierView {
    fn from(c: &Classifier) -> Self {
        ClassifierView {
            check_outliers: c.check_outliers(),
            radius: c.radius(),
            verbose: c.verbose(),
            label_id: c.label_id(),
            outlier: c.outlier(),
            threshold: c.threshold(),
            zones: c.zones(),
            classes: c
                .classes()
                .iter()
                .map(|(k, v)| (*k, ClustererView::from(v)))
                .collect(),
        }
    }
}

impl TryFrom<ClassifierView> for Classifier {
    type Error = ValidationError;

    fn try_from(v: ClassifierView) -> Result<Self, Self::Error> {
        let mut classes = BTreeMap::new();
        for (label, cv) in v.classes {
            classes.insert(label, Clusterer::try_from(cv)?);
        }
        Ok(Classifier::from_parts(
            v.check_outliers,
            v.radius,
            v.verbose,
            v.label_id,
            v.outlier,
            v.threshold,
            v.zones,
            classes,
        ))
    }
}

/// Restore a [`Distance`] from the name produced by [`Distance::name`].
///
/// Unknown names are a programmer failure: the set of valid names is
/// fixed and closed, so a mismatch means stored state came from an
/// incompatible version.
fn distance_from_name(name: &str) -> Distance {
    match name {
        "euclidean" => Distance::Euclidean,
        "manhattan" => Distance::Manhattan,
        "chebyshev" => Distance::Chebyshev,
        "eisen" => Distance::Eisen,
        "cosine" => Distance::Cosine,
        other => {
            if let Some(p) = other.strip_prefix("minkowski(").and_then(|s| s.strip_suffix(')')) {
                let p: f64 = p.parse().expect("minkowski name carries a valid order");
                Distance::Minkowski(p)
            } else {
                panic!("unknown distance name: {other}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_name_round_trips() {
        for d in [
            Distance::Euclidean,
            Distance::Manhattan,
            Distance::Chebyshev,
            Distance::Minkowski(3.0),
            Distance::Eisen,
            Distance::Cosine,
        ] {
            let name = d.name();
            let restored = distance_from_name(&name);
            assert_eq!(restored.name(), name);
        }
    }
}
