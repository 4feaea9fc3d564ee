//! Profile shape configuration

use serde::{Deserialize, Serialize};

/// Controls the shape of the emitted profile and the pipeline's
/// degenerate-case thresholds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileConfig {
    /// Expected embedding dimensionality; records with any other length are dropped
    #[serde(default = "default_dimensions")]
    pub dimensions: usize,
    /// Maximum number of centroids in the finished profile
    #[serde(default = "default_max_centroids")]
    pub max_centroids: usize,
    /// Below this many valid vectors the pipeline skips clustering entirely
    /// and emits a single global centroid
    #[serde(default = "default_min_points_for_clustering")]
    pub min_points_for_clustering: usize,
    /// Minimum number of noise points promoted into a "miscellaneous"
    /// cluster; fewer are discarded
    #[serde(default = "default_min_noise_cluster_size")]
    pub min_noise_cluster_size: usize,
}

fn default_dimensions() -> usize {
    512
}

fn default_max_centroids() -> usize {
    5
}

fn default_min_points_for_clustering() -> usize {
    10
}

fn default_min_noise_cluster_size() -> usize {
    3
}

impl Default for ProfileConfig {
    fn default() -> Self {
        Self {
            dimensions: default_dimensions(),
            max_centroids: default_max_centroids(),
            min_points_for_clustering: default_min_points_for_clustering(),
            min_noise_cluster_size: default_min_noise_cluster_size(),
        }
    }
}
