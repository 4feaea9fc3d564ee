//! Profile building pipeline
//!
//! Orchestrates the strictly sequential pass: weighting preprocessor →
//! density clustering → per-cluster centroid synthesis → finalization
//! (normalize, cap, re-normalize). Stateless: one invocation consumes one
//! interaction snapshot and emits one profile.

use crate::centroid::weighted_centroid;
use crate::clustering::{ClusterBackend, ClusterLabels, NOISE_LABEL};
use crate::config::Config;
use crate::types::{CentroidProfile, InteractionRecord};
use crate::weighting::{resolve_weights, WeightedVectors};
use tracing::{debug, info, warn};

/// A cluster after synthesis, before weight normalization
struct SynthesizedCluster {
    cluster_id: i32,
    centroid: Vec<f32>,
    weight_sum: f32,
    post_count: usize,
}

/// Builds centroid profiles from interaction snapshots.
///
/// The clustering backend is pluggable; [`ProfileBuilder::new`] picks the
/// configured one, tests inject stubs via [`ProfileBuilder::with_backend`].
pub struct ProfileBuilder<'a> {
    config: &'a Config,
    backend: Box<dyn ClusterBackend>,
}

impl<'a> ProfileBuilder<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self {
            backend: crate::clustering::create_backend(&config.clustering),
            config,
        }
    }

    pub fn with_backend(config: &'a Config, backend: Box<dyn ClusterBackend>) -> Self {
        Self { config, backend }
    }

    /// Run the full pipeline over one snapshot of interaction records.
    ///
    /// Always succeeds: degenerate inputs produce an empty profile or a
    /// single global centroid, and a clustering backend failure degrades to
    /// the same single-centroid path as "no structure found".
    pub fn build(&self, records: Vec<InteractionRecord>) -> Vec<CentroidProfile> {
        let weighted = resolve_weights(
            records,
            &self.config.weights,
            self.config.profile.dimensions,
        );
        if weighted.is_empty() {
            info!("No valid interaction vectors, emitting empty profile");
            return Vec::new();
        }

        info!(vectors = weighted.len(), dropped = weighted.dropped, "Processing interaction vectors");

        if weighted.len() < self.config.profile.min_points_for_clustering {
            info!(
                vectors = weighted.len(),
                threshold = self.config.profile.min_points_for_clustering,
                "Too few data points for clustering, using single weighted average"
            );
            return self.fallback(&weighted);
        }

        let labels = match self.backend.cluster(&weighted.vectors) {
            Ok(labels) => labels,
            Err(e) => {
                warn!(backend = self.backend.name(), error = %e, "Clustering failed, falling back to single centroid");
                return self.fallback(&weighted);
            }
        };

        if labels.iter().all(|&label| label == NOISE_LABEL) {
            info!("No cluster structure found, using single weighted average");
            return self.fallback(&weighted);
        }

        let clusters = self.synthesize(&weighted, &labels);
        let profiles = self.finalize(clusters);

        info!(clusters = profiles.len(), "Built interest profile");
        for profile in &profiles {
            debug!(
                cluster_id = profile.cluster_id,
                posts = profile.post_count,
                weight = %format!("{:.3}", profile.weight),
                "Profile centroid"
            );
        }
        profiles
    }

    /// Single global centroid over every valid point, weight 1.0.
    ///
    /// The designed behavior for sparse users and structureless histories,
    /// not an error path.
    fn fallback(&self, weighted: &WeightedVectors) -> Vec<CentroidProfile> {
        vec![CentroidProfile {
            cluster_id: 0,
            centroid: weighted_centroid(
                &weighted.vectors,
                &weighted.weights,
                self.config.profile.dimensions,
            ),
            weight: 1.0,
            post_count: weighted.len(),
        }]
    }

    /// One centroid per cluster in ascending id order, plus a
    /// "miscellaneous" cluster over the noise points when enough exist.
    fn synthesize(
        &self,
        weighted: &WeightedVectors,
        labels: &ClusterLabels,
    ) -> Vec<SynthesizedCluster> {
        let dimensions = self.config.profile.dimensions;
        let max_label = labels.iter().copied().max().unwrap_or(NOISE_LABEL);
        let mut clusters = Vec::new();

        for cluster_id in 0..=max_label {
            let member_indices: Vec<usize> = labels
                .iter()
                .enumerate()
                .filter(|&(_, &label)| label == cluster_id)
                .map(|(index, _)| index)
                .collect();
            if member_indices.is_empty() {
                continue;
            }
            clusters.push(self.synthesize_one(weighted, &member_indices, cluster_id, dimensions));
        }

        let noise_indices: Vec<usize> = labels
            .iter()
            .enumerate()
            .filter(|&(_, &label)| label == NOISE_LABEL)
            .map(|(index, _)| index)
            .collect();

        if noise_indices.len() >= self.config.profile.min_noise_cluster_size {
            let misc_id = clusters.iter().map(|c| c.cluster_id).max().unwrap_or(-1) + 1;
            debug!(points = noise_indices.len(), cluster_id = misc_id, "Promoting noise points to miscellaneous cluster");
            clusters.push(self.synthesize_one(weighted, &noise_indices, misc_id, dimensions));
        } else if !noise_indices.is_empty() {
            debug!(points = noise_indices.len(), "Discarding noise points below miscellaneous threshold");
        }

        clusters
    }

    fn synthesize_one(
        &self,
        weighted: &WeightedVectors,
        member_indices: &[usize],
        cluster_id: i32,
        dimensions: usize,
    ) -> SynthesizedCluster {
        let vectors: Vec<Vec<f32>> = member_indices
            .iter()
            .map(|&i| weighted.vectors[i].clone())
            .collect();
        let weights: Vec<f32> = member_indices.iter().map(|&i| weighted.weights[i]).collect();

        SynthesizedCluster {
            cluster_id,
            centroid: weighted_centroid(&vectors, &weights, dimensions),
            weight_sum: weights.iter().sum(),
            post_count: member_indices.len(),
        }
    }

    /// Normalize weights, cap to the configured maximum, re-normalize.
    ///
    /// Ties at the cap boundary break on ascending cluster id so repeated
    /// runs over the same snapshot emit identical profiles. A zero total
    /// weight distributes uniformly instead of leaving weights undefined.
    fn finalize(&self, clusters: Vec<SynthesizedCluster>) -> Vec<CentroidProfile> {
        let total_weight: f32 = clusters.iter().map(|c| c.weight_sum).sum();
        let count = clusters.len();

        let mut profiles: Vec<CentroidProfile> = clusters
            .into_iter()
            .map(|cluster| CentroidProfile {
                cluster_id: cluster.cluster_id,
                centroid: cluster.centroid,
                weight: if total_weight > 0.0 {
                    cluster.weight_sum / total_weight
                } else {
                    1.0 / count as f32
                },
                post_count: cluster.post_count,
            })
            .collect();

        profiles.sort_by(|a, b| {
            b.weight
                .partial_cmp(&a.weight)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.cluster_id.cmp(&b.cluster_id))
        });
        profiles.truncate(self.config.profile.max_centroids);

        let retained: f32 = profiles.iter().map(|p| p.weight).sum();
        if retained > 0.0 {
            for profile in profiles.iter_mut() {
                profile.weight /= retained;
            }
        }

        profiles
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clustering::{ClusterError, ClusterResult};
    use crate::types::{Embedding, InteractionKind};

    const EPS: f32 = 1e-6;

    /// Backend returning a canned label vector
    #[derive(Debug)]
    struct FixedLabels(Vec<i32>);

    impl ClusterBackend for FixedLabels {
        fn cluster(&self, _vectors: &[Embedding]) -> ClusterResult<ClusterLabels> {
            Ok(self.0.clone())
        }

        fn name(&self) -> &'static str {
            "fixed"
        }
    }

    /// Backend that always fails
    #[derive(Debug)]
    struct FailingBackend;

    impl ClusterBackend for FailingBackend {
        fn cluster(&self, _vectors: &[Embedding]) -> ClusterResult<ClusterLabels> {
            Err(ClusterError::InvalidParameter("induced failure".into()))
        }

        fn name(&self) -> &'static str {
            "failing"
        }
    }

    fn test_config() -> Config {
        let mut config = Config::default();
        config.profile.dimensions = 8;
        config
    }

    fn axis_record(axis: usize) -> InteractionRecord {
        let mut v = vec![0.0; 8];
        v[axis] = 1.0;
        InteractionRecord::from_vector(v)
    }

    fn records(count: usize, axis: usize) -> Vec<InteractionRecord> {
        (0..count).map(|_| axis_record(axis)).collect()
    }

    fn weight_sum(profiles: &[CentroidProfile]) -> f32 {
        profiles.iter().map(|p| p.weight).sum()
    }

    #[test]
    fn empty_input_yields_empty_profile() {
        let config = test_config();
        let builder = ProfileBuilder::new(&config);
        assert!(builder.build(Vec::new()).is_empty());
    }

    #[test]
    fn all_invalid_records_yield_empty_profile() {
        let config = test_config();
        let builder = ProfileBuilder::new(&config);
        let records = vec![
            InteractionRecord {
                vector: None,
                weight: None,
                interaction_type: InteractionKind::Like,
            },
            InteractionRecord::from_vector(vec![1.0; 3]),
        ];
        assert!(builder.build(records).is_empty());
    }

    #[test]
    fn sparse_history_uses_single_weighted_average() {
        let config = test_config();
        let builder = ProfileBuilder::new(&config);
        let profiles = builder.build(records(3, 0));

        assert_eq!(profiles.len(), 1);
        assert_eq!(profiles[0].cluster_id, 0);
        assert_eq!(profiles[0].weight, 1.0);
        assert_eq!(profiles[0].post_count, 3);
        assert!((profiles[0].centroid[0] - 1.0).abs() < EPS);
    }

    #[test]
    fn sign_inversion_flips_fallback_centroid() {
        let config = test_config();
        let builder = ProfileBuilder::new(&config);
        let profiles = builder.build(vec![axis_record(7).with_kind(InteractionKind::RequestLess)]);

        assert_eq!(profiles.len(), 1);
        assert_eq!(profiles[0].weight, 1.0);
        assert_eq!(profiles[0].post_count, 1);
        assert!((profiles[0].centroid[7] + 1.0).abs() < EPS, "centroid should point away");
    }

    #[test]
    fn backend_failure_degrades_to_single_centroid() {
        let config = test_config();
        let builder = ProfileBuilder::with_backend(&config, Box::new(FailingBackend));
        let profiles = builder.build(records(12, 1));

        assert_eq!(profiles.len(), 1);
        assert_eq!(profiles[0].weight, 1.0);
        assert_eq!(profiles[0].post_count, 12);
    }

    #[test]
    fn all_noise_labels_mean_no_structure() {
        let config = test_config();
        // Zero clusters with two points flagged noise: structureless
        let labels = vec![NOISE_LABEL; 10];
        let builder = ProfileBuilder::with_backend(&config, Box::new(FixedLabels(labels)));
        let profiles = builder.build(records(10, 2));

        assert_eq!(profiles.len(), 1);
        assert_eq!(profiles[0].weight, 1.0);
        assert_eq!(profiles[0].post_count, 10);
    }

    #[test]
    fn small_noise_set_is_discarded() {
        let config = test_config();
        // One cluster of 8 plus 2 noise points: below the miscellaneous
        // threshold, the noise contributes nothing
        let mut labels = vec![0; 8];
        labels.extend([NOISE_LABEL; 2]);
        let builder = ProfileBuilder::with_backend(&config, Box::new(FixedLabels(labels)));

        let mut input = records(8, 0);
        input.extend(records(2, 1));
        let profiles = builder.build(input);

        assert_eq!(profiles.len(), 1);
        assert_eq!(profiles[0].post_count, 8);
        assert!((profiles[0].weight - 1.0).abs() < EPS);
        assert!((profiles[0].centroid[0] - 1.0).abs() < EPS);
    }

    #[test]
    fn noise_points_promote_to_miscellaneous_cluster() {
        let config = test_config();
        let mut labels = vec![0; 9];
        labels.extend([NOISE_LABEL; 3]);
        let builder = ProfileBuilder::with_backend(&config, Box::new(FixedLabels(labels)));

        let mut input = records(9, 0);
        input.extend(records(3, 1));
        let profiles = builder.build(input);

        assert_eq!(profiles.len(), 2);
        // Heavier cluster first, miscellaneous id is max + 1
        assert_eq!(profiles[0].cluster_id, 0);
        assert_eq!(profiles[0].post_count, 9);
        assert!((profiles[0].weight - 0.75).abs() < EPS);
        assert_eq!(profiles[1].cluster_id, 1);
        assert_eq!(profiles[1].post_count, 3);
        assert!((profiles[1].weight - 0.25).abs() < EPS);
        assert!((weight_sum(&profiles) - 1.0).abs() < EPS);
    }

    #[test]
    fn profile_caps_at_max_centroids_and_renormalizes() {
        let config = test_config();
        // Seven clusters with sizes 7, 6, ..., 1 over 28 points
        let mut labels = Vec::new();
        for cluster_id in 0..7 {
            for _ in 0..(7 - cluster_id) {
                labels.push(cluster_id);
            }
        }
        let count = labels.len();
        let builder = ProfileBuilder::with_backend(&config, Box::new(FixedLabels(labels)));
        let profiles = builder.build(records(count, 3));

        assert_eq!(profiles.len(), 5);
        // Descending by weight: cluster 0 (7 posts) first
        assert_eq!(profiles[0].cluster_id, 0);
        assert_eq!(profiles[0].post_count, 7);
        assert_eq!(profiles[4].cluster_id, 4);
        assert!((weight_sum(&profiles) - 1.0).abs() < EPS);
        // Renormalized shares: 7/25, 6/25, ...
        assert!((profiles[0].weight - 7.0 / 25.0).abs() < EPS);
        assert!((profiles[4].weight - 3.0 / 25.0).abs() < EPS);
    }

    #[test]
    fn equal_weights_break_ties_on_ascending_cluster_id() {
        let config = test_config();
        // Six clusters of two points each: all weights tied
        let labels: Vec<i32> = (0..6).flat_map(|id| [id, id]).collect();
        let builder = ProfileBuilder::with_backend(&config, Box::new(FixedLabels(labels)));
        let profiles = builder.build(records(12, 4));

        assert_eq!(profiles.len(), 5);
        let ids: Vec<i32> = profiles.iter().map(|p| p.cluster_id).collect();
        assert_eq!(ids, vec![0, 1, 2, 3, 4]);
        assert!((weight_sum(&profiles) - 1.0).abs() < EPS);
    }

    #[test]
    fn zero_total_weight_distributes_uniformly() {
        let config = test_config();
        let labels: Vec<i32> = [vec![0; 5], vec![1; 5]].concat();
        let builder = ProfileBuilder::with_backend(&config, Box::new(FixedLabels(labels)));

        let input: Vec<InteractionRecord> =
            (0..10).map(|i| axis_record(i % 8).with_weight(0.0)).collect();
        let profiles = builder.build(input);

        assert_eq!(profiles.len(), 2);
        assert!((profiles[0].weight - 0.5).abs() < EPS);
        assert!((profiles[1].weight - 0.5).abs() < EPS);
        // Degenerate all-cancelling centroids are exact zero vectors
        assert!(profiles.iter().all(|p| p.centroid.iter().all(|&c| c == 0.0)));
    }

    #[test]
    fn weights_scale_with_interaction_kind() {
        let config = test_config();
        let labels: Vec<i32> = [vec![0; 5], vec![1; 5]].concat();
        let builder = ProfileBuilder::with_backend(&config, Box::new(FixedLabels(labels)));

        // Cluster 0: five likes (5.0); cluster 1: five requestMore (15.0)
        let mut input = records(5, 0);
        input.extend((0..5).map(|_| axis_record(1).with_kind(InteractionKind::RequestMore)));
        let profiles = builder.build(input);

        assert_eq!(profiles.len(), 2);
        assert_eq!(profiles[0].cluster_id, 1, "requestMore cluster should lead");
        assert!((profiles[0].weight - 0.75).abs() < EPS);
        assert!((profiles[1].weight - 0.25).abs() < EPS);
    }
}
