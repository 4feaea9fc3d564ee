//! Hierarchical mutual-reachability clustering
//!
//! The default density backend. Follows the HDBSCAN recipe:
//! 1. Core distances (distance to the min_samples-th nearest neighbor)
//! 2. Mutual reachability: MR(a,b) = max(core(a), core(b), dist(a,b))
//! 3. Minimum spanning tree over mutual reachability (Prim)
//! 4. Flat extraction by replaying MST edges in ascending order as a
//!    condensed hierarchy: components become clusters once they reach
//!    min_cluster_size, points connecting far outside a cluster's density
//!    scale fall out as noise, and merges of two live clusters either
//!    finalize the children (stable separation) or coalesce them into one,
//!    depending on the selection method.
//!
//! A component's density scale is the largest core distance among its member
//! points, i.e. the core radius of its least dense member. Excess-of-mass
//! selection keeps two merging clusters separate only when the merge
//! distance clearly exceeds that scale; leaf selection keeps them separate
//! at every cluster-cluster merge, yielding more granular output. Fully
//! deterministic for identical input.

use super::{
    check_dimensions, compact_labels, point_distance, ClusterBackend, ClusterError,
    ClusterLabels, ClusterResult,
};
use crate::config::{ClusteringConfig, SelectionMethod};
use crate::types::Embedding;
use tracing::debug;

/// A connection counts as crossing a density boundary when its distance
/// exceeds this multiple of the cluster's density scale.
const SEPARATION_FACTOR: f32 = 2.0;

/// Hierarchical mutual-reachability clusterer
#[derive(Debug)]
pub struct HdbscanClusterer {
    config: ClusteringConfig,
}

impl HdbscanClusterer {
    pub fn new(config: ClusteringConfig) -> Self {
        Self { config }
    }

    /// Distance to the min_samples-th nearest neighbor, per point.
    fn core_distances(&self, vectors: &[Embedding]) -> Vec<f32> {
        let n = vectors.len();
        let k = self.config.min_samples;
        let mut core = Vec::with_capacity(n);

        for i in 0..n {
            let mut distances: Vec<f32> = (0..n)
                .filter(|&j| j != i)
                .map(|j| point_distance(self.config.metric, &vectors[i], &vectors[j]))
                .collect();
            distances.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

            let core_dist = if k <= distances.len() {
                distances[k - 1]
            } else {
                distances.last().copied().unwrap_or(0.0)
            };
            core.push(core_dist);
        }

        core
    }

    /// Minimum spanning tree over mutual reachability distances.
    ///
    /// Returns edges `(a, b, weight)` sorted ascending by weight.
    fn build_mst(&self, vectors: &[Embedding], core: &[f32]) -> Vec<(usize, usize, f32)> {
        let n = vectors.len();
        let mut in_tree = vec![false; n];
        let mut min_dist = vec![f32::MAX; n];
        let mut min_edge = vec![0usize; n];
        let mut edges = Vec::with_capacity(n.saturating_sub(1));

        let reach = |i: usize, j: usize| -> f32 {
            point_distance(self.config.metric, &vectors[i], &vectors[j])
                .max(core[i])
                .max(core[j])
        };

        in_tree[0] = true;
        for j in 1..n {
            min_dist[j] = reach(0, j);
        }

        for _ in 1..n {
            let mut best = f32::MAX;
            let mut best_idx = 0;
            for j in 0..n {
                if !in_tree[j] && min_dist[j] < best {
                    best = min_dist[j];
                    best_idx = j;
                }
            }

            in_tree[best_idx] = true;
            edges.push((min_edge[best_idx], best_idx, best));

            for j in 0..n {
                if !in_tree[j] {
                    let d = reach(best_idx, j);
                    if d < min_dist[j] {
                        min_dist[j] = d;
                        min_edge[j] = best_idx;
                    }
                }
            }
        }

        edges.sort_by(|a, b| a.2.partial_cmp(&b.2).unwrap_or(std::cmp::Ordering::Equal));
        edges
    }

    /// Replay MST edges ascending, maintaining a forest of components and
    /// extracting a flat clustering as member index lists.
    fn extract(&self, mst: &[(usize, usize, f32)], core: &[f32]) -> Vec<Vec<usize>> {
        let n = core.len();
        let min_size = self.config.min_cluster_size;
        let mut forest = Forest::new(core);
        let mut finalized: Vec<Vec<usize>> = Vec::new();

        for &(a, b, weight) in mst {
            let ra = forest.find(a);
            let rb = forest.find(b);
            if ra == rb {
                continue;
            }

            let a_live = forest.is_cluster(ra);
            let b_live = forest.is_cluster(rb);

            if a_live && b_live {
                let separated = match self.config.selection_method {
                    SelectionMethod::Leaf => true,
                    SelectionMethod::Eom => {
                        let scale = forest.scale(ra).max(forest.scale(rb));
                        weight > SEPARATION_FACTOR * scale
                    }
                };
                if separated {
                    // Stable separation: both children survive as flat
                    // clusters, the merged region above them is dead space
                    finalized.push(forest.take_members(ra));
                    finalized.push(forest.take_members(rb));
                    forest.merge_dead(ra, rb);
                } else {
                    forest.merge_live(ra, rb, min_size);
                }
            } else if a_live || b_live {
                let (cluster, other) = if a_live { (ra, rb) } else { (rb, ra) };
                if forest.is_dead(other) {
                    // The cluster's extent ends against already-dead space
                    finalized.push(forest.take_members(cluster));
                    forest.merge_dead(cluster, other);
                } else if weight <= SEPARATION_FACTOR * forest.scale(cluster) {
                    // Density-reachable points absorb into the cluster
                    forest.merge_live(cluster, other, min_size);
                } else {
                    // Beyond the cluster's density scale: fall out as noise
                    forest.merge_noise(cluster, other);
                }
            } else if forest.is_dead(ra) || forest.is_dead(rb) {
                forest.merge_dead(ra, rb);
            } else {
                forest.merge_live(ra, rb, min_size);
            }
        }

        // Whatever is still live and big enough is a cluster
        let mut seen = std::collections::HashSet::new();
        for i in 0..n {
            let root = forest.find(i);
            if seen.insert(root) && forest.is_cluster(root) {
                finalized.push(forest.take_members(root));
            }
        }

        finalized
    }
}

impl ClusterBackend for HdbscanClusterer {
    fn cluster(&self, vectors: &[Embedding]) -> ClusterResult<ClusterLabels> {
        let n = vectors.len();
        if n < self.config.min_cluster_size {
            return Err(ClusterError::InsufficientData {
                required: self.config.min_cluster_size,
                actual: n,
            });
        }
        check_dimensions(vectors)?;

        let core = self.core_distances(vectors);
        let mst = self.build_mst(vectors, &core);
        let clusters = self.extract(&mst, &core);

        debug!(
            points = n,
            clusters = clusters.len(),
            noise = n - clusters.iter().map(Vec::len).sum::<usize>(),
            "Hierarchical extraction complete"
        );

        // Map member lists to dense labels in first-member order
        let mut raw = vec![-1i64; n];
        for (id, members) in clusters.iter().enumerate() {
            for &point in members {
                raw[point] = id as i64;
            }
        }
        Ok(compact_labels(&raw))
    }

    fn name(&self) -> &'static str {
        "hdbscan"
    }
}

/// Union-find forest carrying per-component cluster state.
///
/// Each root tracks the accepted member points, the component's density
/// scale (largest member core distance), and whether the component is a
/// live cluster, still sub-minimum, or dead space above finalized clusters.
struct Forest {
    parent: Vec<usize>,
    members: Vec<Vec<usize>>,
    scale: Vec<f32>,
    cluster: Vec<bool>,
    dead: Vec<bool>,
}

impl Forest {
    fn new(core: &[f32]) -> Self {
        let n = core.len();
        Self {
            parent: (0..n).collect(),
            members: (0..n).map(|i| vec![i]).collect(),
            scale: core.to_vec(),
            cluster: vec![false; n],
            dead: vec![false; n],
        }
    }

    fn find(&mut self, mut i: usize) -> usize {
        while self.parent[i] != i {
            self.parent[i] = self.parent[self.parent[i]];
            i = self.parent[i];
        }
        i
    }

    fn is_cluster(&self, root: usize) -> bool {
        self.cluster[root]
    }

    fn is_dead(&self, root: usize) -> bool {
        self.dead[root]
    }

    fn scale(&self, root: usize) -> f32 {
        self.scale[root]
    }

    fn take_members(&mut self, root: usize) -> Vec<usize> {
        self.cluster[root] = false;
        std::mem::take(&mut self.members[root])
    }

    /// Union keeping both sides' members; the result becomes (or stays) a
    /// cluster once it reaches `min_size`.
    fn merge_live(&mut self, a: usize, b: usize, min_size: usize) {
        let (root, absorbed) = self.link(a, b);
        let mut absorbed_members = std::mem::take(&mut self.members[absorbed]);
        self.members[root].append(&mut absorbed_members);
        self.scale[root] = self.scale[root].max(self.scale[absorbed]);
        if self.members[root].len() >= min_size {
            self.cluster[root] = true;
        }
    }

    /// Union discarding the non-cluster side's members as noise; the
    /// cluster side's state is preserved.
    fn merge_noise(&mut self, cluster: usize, other: usize) {
        let keep_members = std::mem::take(&mut self.members[cluster]);
        let keep_scale = self.scale[cluster];
        self.cluster[cluster] = false;
        self.members[other].clear();
        let (root, _) = self.link(cluster, other);
        self.members[root] = keep_members;
        self.scale[root] = keep_scale;
        self.cluster[root] = true;
    }

    /// Union into dead space; everything inside is already finalized or noise.
    fn merge_dead(&mut self, a: usize, b: usize) {
        let (root, absorbed) = self.link(a, b);
        self.members[root].clear();
        self.members[absorbed].clear();
        self.cluster[root] = false;
        self.dead[root] = true;
    }

    /// Raw union; returns (new_root, absorbed_root). Attaches the smaller
    /// member list under the larger one.
    fn link(&mut self, a: usize, b: usize) -> (usize, usize) {
        let ra = self.find(a);
        let rb = self.find(b);
        debug_assert_ne!(ra, rb);
        let (root, absorbed) = if self.members[ra].len() >= self.members[rb].len() {
            (ra, rb)
        } else {
            (rb, ra)
        };
        self.parent[absorbed] = root;
        (root, absorbed)
    }
}
