use std::fmt;

/// Validation failures surfaced by public entry points.
///
/// These are distinct from usage failures (which return benign defaults,
/// see [`crate::Clusterer::is_outlier`]) and from programmer failures
/// (which panic, e.g. constructing a [`crate::Clusterer`] with a
/// non-positive radius).
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// `FitXY` was called with feature and label slices of different length.
    LengthMismatch { features: usize, labels: usize },
    /// `Add` received a vector whose dimension differs from the one fixed
    /// by the first point ever added to this clusterer.
    DimensionMismatch { expected: usize, found: usize },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::LengthMismatch { features, labels } => write!(
                f,
                "feature rows ({features}) and labels ({labels}) have different lengths"
            ),
            ValidationError::DimensionMismatch { expected, found } => write!(
                f,
                "vector has dimension {found}, expected {expected}"
            ),
        }
    }
}

impl std::error::Error for ValidationError {}
