//! Density clustering configuration

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which density-based backend partitions the vectors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ClusterAlgorithm {
    /// Hierarchical mutual-reachability clustering (default)
    #[default]
    Hdbscan,
    /// Plain DBSCAN with a data-derived epsilon, for smaller deployments
    Dbscan,
}

impl fmt::Display for ClusterAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Hdbscan => f.write_str("hdbscan"),
            Self::Dbscan => f.write_str("dbscan"),
        }
    }
}

/// Distance function over the raw embedding space
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DistanceMetric {
    /// Euclidean distance (default; matches the embedding snapshot contract)
    #[default]
    Euclidean,
    /// Cosine distance (1 - cosine similarity)
    Cosine,
}

/// Flat-cluster extraction strategy for the hierarchical backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SelectionMethod {
    /// Excess-of-mass style: cut at the largest density gap, keeping the
    /// most stable large-scale structure
    #[default]
    Eom,
    /// Leaf style: cut at the first significant density gap, yielding more
    /// granular clusters
    Leaf,
}

/// Parameters for the pluggable density clusterer.
///
/// These are named configuration options rather than hardcoded literals so a
/// deployment can tune clustering sensitivity without a code change.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusteringConfig {
    /// Backend algorithm
    #[serde(default)]
    pub backend: ClusterAlgorithm,
    /// Minimum number of points that can form a cluster (clustering sensitivity)
    #[serde(default = "default_min_cluster_size")]
    pub min_cluster_size: usize,
    /// Density-neighborhood size: neighbors required for a point to count as core
    #[serde(default = "default_min_samples")]
    pub min_samples: usize,
    /// Distance function
    #[serde(default)]
    pub metric: DistanceMetric,
    /// Flat-cluster extraction strategy
    #[serde(default)]
    pub selection_method: SelectionMethod,
}

fn default_min_cluster_size() -> usize {
    5
}

fn default_min_samples() -> usize {
    2
}

impl Default for ClusteringConfig {
    fn default() -> Self {
        Self {
            backend: ClusterAlgorithm::default(),
            min_cluster_size: default_min_cluster_size(),
            min_samples: default_min_samples(),
            metric: DistanceMetric::default(),
            selection_method: SelectionMethod::default(),
        }
    }
}

impl ClusteringConfig {
    /// Override the clustering sensitivity, leaving everything else as-is.
    #[must_use]
    pub fn with_min_cluster_size(mut self, size: usize) -> Self {
        self.min_cluster_size = size;
        self
    }
}
