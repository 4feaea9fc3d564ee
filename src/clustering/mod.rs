//! Pluggable density-based clustering
//!
//! The pipeline treats clustering as an opaque capability behind the
//! [`ClusterBackend`] trait: group points whose local density forms a stable
//! connected region of at least `min_cluster_size` into a cluster, label
//! everything else noise. Two backends ship, a hierarchical
//! mutual-reachability clusterer and a plain DBSCAN variant.

mod dbscan;
mod hdbscan;

pub use dbscan::DbscanClusterer;
pub use hdbscan::HdbscanClusterer;

use crate::config::{ClusterAlgorithm, ClusteringConfig, DistanceMetric};
use crate::types::Embedding;
use std::fmt::Debug;

/// Label marking a point assigned to no cluster
pub const NOISE_LABEL: i32 = -1;

/// Per-point cluster assignment; non-negative cluster id or [`NOISE_LABEL`]
pub type ClusterLabels = Vec<i32>;

/// Errors a clustering backend can raise.
///
/// The pipeline catches these and falls back to a single global centroid,
/// so a backend failure degrades the profile instead of aborting the run.
#[derive(Debug, thiserror::Error)]
pub enum ClusterError {
    /// Fewer points than the backend can form a cluster from
    #[error("insufficient data: need at least {required} points, got {actual}")]
    InsufficientData { required: usize, actual: usize },

    /// Input vectors disagree on dimensionality
    #[error("dimension mismatch: vector {index} has {got} components, expected {expected}")]
    DimensionMismatch {
        index: usize,
        got: usize,
        expected: usize,
    },

    /// Parameters the backend cannot work with
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
}

/// Result type for clustering operations
pub type ClusterResult<T> = Result<T, ClusterError>;

/// Core trait for density-based clustering backends.
///
/// Object-safe so the pipeline can hold a `Box<dyn ClusterBackend>` chosen
/// from configuration or swapped for a deterministic stub in tests.
pub trait ClusterBackend: Send + Sync + Debug {
    /// Partition `vectors` into clusters and noise.
    ///
    /// Returns one label per input vector: a non-negative cluster id, dense
    /// and ascending from 0 in first-member order, or [`NOISE_LABEL`].
    fn cluster(&self, vectors: &[Embedding]) -> ClusterResult<ClusterLabels>;

    /// Backend name for logs (e.g., "hdbscan", "dbscan")
    fn name(&self) -> &'static str;
}

/// Build the configured backend.
pub fn create_backend(config: &ClusteringConfig) -> Box<dyn ClusterBackend> {
    match config.backend {
        ClusterAlgorithm::Hdbscan => Box::new(HdbscanClusterer::new(config.clone())),
        ClusterAlgorithm::Dbscan => Box::new(DbscanClusterer::new(config.clone())),
    }
}

/// Distance between two points under the configured metric
pub(crate) fn point_distance(metric: DistanceMetric, a: &[f32], b: &[f32]) -> f32 {
    match metric {
        DistanceMetric::Euclidean => a
            .iter()
            .zip(b.iter())
            .map(|(x, y)| (x - y) * (x - y))
            .sum::<f32>()
            .sqrt(),
        DistanceMetric::Cosine => 1.0 - crate::centroid::cosine_similarity(a, b),
    }
}

/// Check every vector against the dimensionality of the first one.
pub(crate) fn check_dimensions(vectors: &[Embedding]) -> ClusterResult<()> {
    let Some(first) = vectors.first() else {
        return Ok(());
    };
    let expected = first.len();
    for (index, vector) in vectors.iter().enumerate() {
        if vector.len() != expected {
            return Err(ClusterError::DimensionMismatch {
                index,
                got: vector.len(),
                expected,
            });
        }
    }
    Ok(())
}

/// Relabel raw component assignments into dense cluster ids.
///
/// Ids are assigned 0, 1, 2, ... in order of each cluster's first member
/// index, keeping label assignment deterministic for identical input.
pub(crate) fn compact_labels(raw: &[i64]) -> ClusterLabels {
    let mut next_id = 0i32;
    let mut mapping: std::collections::HashMap<i64, i32> = std::collections::HashMap::new();
    raw.iter()
        .map(|&component| {
            if component < 0 {
                NOISE_LABEL
            } else {
                *mapping.entry(component).or_insert_with(|| {
                    let id = next_id;
                    next_id += 1;
                    id
                })
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn point_distance_euclidean() {
        let a = vec![0.0, 0.0];
        let b = vec![3.0, 4.0];
        assert!((point_distance(DistanceMetric::Euclidean, &a, &b) - 5.0).abs() < 1e-6);
    }

    #[test]
    fn point_distance_cosine_orthogonal() {
        let a = vec![1.0, 0.0];
        let b = vec![0.0, 1.0];
        assert!((point_distance(DistanceMetric::Cosine, &a, &b) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn check_dimensions_flags_mismatch() {
        let vectors = vec![vec![0.0; 4], vec![0.0; 3]];
        let err = check_dimensions(&vectors).unwrap_err();
        assert!(matches!(err, ClusterError::DimensionMismatch { index: 1, got: 3, expected: 4 }));
    }

    #[test]
    fn compact_labels_assigns_first_member_order() {
        // Raw component roots in arbitrary numbering
        let raw = vec![7, 7, -1, 3, 3, 7];
        let labels = compact_labels(&raw);
        assert_eq!(labels, vec![0, 0, NOISE_LABEL, 1, 1, 0]);
    }

    #[test]
    fn create_backend_honors_config() {
        let mut config = crate::config::ClusteringConfig::default();
        assert_eq!(create_backend(&config).name(), "hdbscan");
        config.backend = ClusterAlgorithm::Dbscan;
        assert_eq!(create_backend(&config).name(), "dbscan");
    }
}
