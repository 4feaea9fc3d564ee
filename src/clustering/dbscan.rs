//! DBSCAN density clustering
//!
//! The simpler backend for smaller-scale deployments. Epsilon is not a
//! configuration knob: it is derived from the data as a multiple of the
//! median k-distance (distance to the min_samples-th nearest neighbor), so
//! the backend satisfies the same parameter contract as the hierarchical
//! clusterer. Clusters smaller than min_cluster_size are demoted to noise.

use super::{
    check_dimensions, compact_labels, point_distance, ClusterBackend, ClusterError,
    ClusterLabels, ClusterResult,
};
use crate::config::ClusteringConfig;
use crate::types::Embedding;
use std::collections::VecDeque;
use tracing::debug;

/// Epsilon is this multiple of the median k-distance.
const EPSILON_FACTOR: f32 = 2.0;

/// Plain DBSCAN clusterer with data-derived epsilon
#[derive(Debug)]
pub struct DbscanClusterer {
    config: ClusteringConfig,
}

impl DbscanClusterer {
    pub fn new(config: ClusteringConfig) -> Self {
        Self { config }
    }

    /// Median distance to the min_samples-th nearest neighbor, scaled.
    fn derive_epsilon(&self, vectors: &[Embedding]) -> f32 {
        let n = vectors.len();
        let k = self.config.min_samples;
        let mut kdist: Vec<f32> = (0..n)
            .map(|i| {
                let mut distances: Vec<f32> = (0..n)
                    .filter(|&j| j != i)
                    .map(|j| point_distance(self.config.metric, &vectors[i], &vectors[j]))
                    .collect();
                distances.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
                if k <= distances.len() {
                    distances[k - 1]
                } else {
                    distances.last().copied().unwrap_or(0.0)
                }
            })
            .collect();
        kdist.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        EPSILON_FACTOR * kdist[n / 2]
    }
}

impl ClusterBackend for DbscanClusterer {
    fn cluster(&self, vectors: &[Embedding]) -> ClusterResult<ClusterLabels> {
        let n = vectors.len();
        if n < self.config.min_cluster_size {
            return Err(ClusterError::InsufficientData {
                required: self.config.min_cluster_size,
                actual: n,
            });
        }
        check_dimensions(vectors)?;

        let epsilon = self.derive_epsilon(vectors);

        // Neighborhoods within epsilon (excluding the point itself)
        let neighbors: Vec<Vec<usize>> = (0..n)
            .map(|i| {
                (0..n)
                    .filter(|&j| {
                        j != i
                            && point_distance(self.config.metric, &vectors[i], &vectors[j])
                                <= epsilon
                    })
                    .collect()
            })
            .collect();
        let is_core: Vec<bool> = neighbors
            .iter()
            .map(|nb| nb.len() >= self.config.min_samples)
            .collect();

        debug!(
            points = n,
            epsilon,
            core_points = is_core.iter().filter(|&&c| c).count(),
            "Derived DBSCAN neighborhood"
        );

        // Expand clusters from core points in index order
        let mut raw = vec![-1i64; n];
        let mut next_cluster = 0i64;
        for seed in 0..n {
            if raw[seed] >= 0 || !is_core[seed] {
                continue;
            }
            let cluster = next_cluster;
            next_cluster += 1;
            raw[seed] = cluster;

            let mut queue: VecDeque<usize> = VecDeque::from([seed]);
            while let Some(point) = queue.pop_front() {
                for &neighbor in &neighbors[point] {
                    if raw[neighbor] >= 0 {
                        continue;
                    }
                    raw[neighbor] = cluster;
                    // Only core points extend the cluster; border points
                    // join but stop the expansion
                    if is_core[neighbor] {
                        queue.push_back(neighbor);
                    }
                }
            }
        }

        // Demote undersized clusters to noise
        let mut sizes = std::collections::HashMap::new();
        for &label in &raw {
            if label >= 0 {
                *sizes.entry(label).or_insert(0usize) += 1;
            }
        }
        for label in raw.iter_mut() {
            if *label >= 0 && sizes[&*label] < self.config.min_cluster_size {
                *label = -1;
            }
        }

        Ok(compact_labels(&raw))
    }

    fn name(&self) -> &'static str {
        "dbscan"
    }
}
