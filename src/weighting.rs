//! Vector weighting preprocessor
//!
//! Turns raw interaction records into (vector, weight) pairs. Sign is
//! resolved here: a negative base weight flips the vector direction and
//! contributes its magnitude, so every downstream weight is non-negative and
//! repulsive interactions pull the centroid away from disliked content.

use crate::config::InteractionWeights;
use crate::types::{Embedding, InteractionRecord};
use tracing::debug;

/// Preprocessed interactions: parallel vectors and non-negative weights.
///
/// Order carries no downstream meaning; `dropped` counts records removed by
/// the data-quality filter.
#[derive(Debug, Clone, Default)]
pub struct WeightedVectors {
    pub vectors: Vec<Embedding>,
    pub weights: Vec<f32>,
    pub dropped: usize,
}

impl WeightedVectors {
    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }
}

/// Resolve records into weighted vectors.
///
/// Records whose vector is absent or not exactly `dimensions` long are
/// silently dropped (data-quality filter, not an error). Combined weight is
/// `|base| * custom`, custom defaulting to 1.0.
pub fn resolve_weights(
    records: Vec<InteractionRecord>,
    table: &InteractionWeights,
    dimensions: usize,
) -> WeightedVectors {
    let mut out = WeightedVectors::default();

    for record in records {
        let Some(mut vector) = record.vector else {
            out.dropped += 1;
            continue;
        };
        if vector.len() != dimensions {
            debug!(
                got = vector.len(),
                expected = dimensions,
                "Dropping record with wrong-dimension vector"
            );
            out.dropped += 1;
            continue;
        }

        let base = table.base_for(record.interaction_type);
        let custom = record.weight.unwrap_or(1.0);

        if base < 0.0 {
            for component in vector.iter_mut() {
                *component = -*component;
            }
        }

        out.vectors.push(vector);
        out.weights.push(base.abs() * custom);
    }

    if out.dropped > 0 {
        debug!(dropped = out.dropped, kept = out.len(), "Filtered interaction records");
    }

    out
}
