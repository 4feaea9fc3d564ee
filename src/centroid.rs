//! Weighted centroid computation
//!
//! The reusable primitive shared by the low-data fallback and per-cluster
//! synthesis: weighted arithmetic mean of a set of embeddings, scaled to unit
//! L2 norm. Knows nothing about clustering.

use crate::types::Embedding;

/// Compute the weighted mean of `vectors`, L2-normalized.
///
/// Returns the exact zero vector of length `dimensions` when the input is
/// empty, when all weights are zero, or when the weighted contributions
/// cancel to zero norm (the degenerate all-cancelling case). Otherwise the
/// result has unit L2 norm.
pub fn weighted_centroid(vectors: &[Embedding], weights: &[f32], dimensions: usize) -> Embedding {
    debug_assert_eq!(vectors.len(), weights.len());

    if vectors.is_empty() {
        return vec![0.0; dimensions];
    }

    let total: f32 = weights.iter().sum();
    let mut mean = vec![0.0f32; dimensions];
    if total <= 0.0 {
        // All-zero weights leave the mean undefined; fold into the same
        // degenerate zero-vector branch as a cancelling sum
        return mean;
    }

    for (vector, &weight) in vectors.iter().zip(weights.iter()) {
        for (acc, &component) in mean.iter_mut().zip(vector.iter()) {
            *acc += component * weight;
        }
    }
    for component in mean.iter_mut() {
        *component /= total;
    }

    normalize_in_place(&mut mean);
    mean
}

/// L2 norm of a vector
pub fn l2_norm(v: &[f32]) -> f32 {
    v.iter().map(|x| x * x).sum::<f32>().sqrt()
}

/// Scale a vector to unit L2 norm in place; leaves zero-norm vectors untouched
pub fn normalize_in_place(v: &mut [f32]) {
    let norm = l2_norm(v);
    if norm > 0.0 {
        for component in v.iter_mut() {
            *component /= norm;
        }
    }
}

/// Cosine similarity between two vectors.
///
/// This is the scoring semantics the downstream consumer applies against
/// each profile centroid.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a = l2_norm(a);
    let norm_b = l2_norm(b);

    if norm_a > 0.0 && norm_b > 0.0 {
        dot / (norm_a * norm_b)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-6;

    #[test]
    fn centroid_of_identical_vectors_is_that_vector() {
        let v = vec![0.6, 0.8, 0.0];
        let vectors = vec![v.clone(), v.clone(), v.clone()];
        let weights = vec![1.0, 1.0, 1.0];
        let centroid = weighted_centroid(&vectors, &weights, 3);
        for (got, want) in centroid.iter().zip(v.iter()) {
            assert!((got - want).abs() < EPS, "expected {:?}, got {:?}", v, centroid);
        }
    }

    #[test]
    fn centroid_is_unit_norm() {
        let vectors = vec![vec![1.0, 0.0, 0.0], vec![0.0, 1.0, 0.0]];
        let weights = vec![2.0, 1.0];
        let centroid = weighted_centroid(&vectors, &weights, 3);
        assert!((l2_norm(&centroid) - 1.0).abs() < EPS);
    }

    #[test]
    fn heavier_weight_pulls_centroid_direction() {
        let vectors = vec![vec![1.0, 0.0], vec![0.0, 1.0]];
        let weights = vec![3.0, 1.0];
        let centroid = weighted_centroid(&vectors, &weights, 2);
        assert!(centroid[0] > centroid[1]);
    }

    #[test]
    fn empty_input_yields_zero_vector() {
        let centroid = weighted_centroid(&[], &[], 4);
        assert_eq!(centroid, vec![0.0; 4]);
    }

    #[test]
    fn cancelling_vectors_yield_exact_zero() {
        let vectors = vec![vec![1.0, 0.0], vec![-1.0, 0.0]];
        let weights = vec![1.0, 1.0];
        let centroid = weighted_centroid(&vectors, &weights, 2);
        assert_eq!(centroid, vec![0.0, 0.0]);
    }

    #[test]
    fn all_zero_weights_yield_zero_vector() {
        let vectors = vec![vec![1.0, 0.0], vec![0.0, 1.0]];
        let weights = vec![0.0, 0.0];
        let centroid = weighted_centroid(&vectors, &weights, 2);
        assert_eq!(centroid, vec![0.0, 0.0]);
    }

    #[test]
    fn cosine_similarity_basics() {
        let a = vec![1.0, 0.0];
        let b = vec![0.0, 1.0];
        assert!((cosine_similarity(&a, &a) - 1.0).abs() < EPS);
        assert!(cosine_similarity(&a, &b).abs() < EPS);
        assert!((cosine_similarity(&a, &[0.0, 0.0])).abs() < EPS);
    }

    #[test]
    fn normalize_leaves_zero_vector_untouched() {
        let mut v = vec![0.0, 0.0, 0.0];
        normalize_in_place(&mut v);
        assert_eq!(v, vec![0.0, 0.0, 0.0]);
    }
}
