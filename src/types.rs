//! Core types for the UProfile pipeline

use serde::{Deserialize, Deserializer, Serialize};

/// Embedding vector type
pub type Embedding = Vec<f32>;

/// Kind of user interaction that produced an embedding.
///
/// Unknown interaction types deserialize to `Other` and receive the default
/// base weight, so new interaction kinds upstream never break a profile run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum InteractionKind {
    /// The user liked the content
    #[default]
    Like,
    /// The user reposted the content
    Repost,
    /// The user explicitly asked for more of this
    RequestMore,
    /// The user explicitly asked for less of this
    RequestLess,
    /// Any interaction type this version does not know about
    Other,
}

// Hand-written so unrecognized wire values map to Other instead of erroring
impl<'de> Deserialize<'de> for InteractionKind {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        Ok(match value.as_str() {
            "like" => Self::Like,
            "repost" => Self::Repost,
            "requestMore" => Self::RequestMore,
            "requestLess" => Self::RequestLess,
            _ => Self::Other,
        })
    }
}

/// One raw interaction as read from the input snapshot.
///
/// Ephemeral: read once per run, consumed by the weighting preprocessor.
/// The `vector` field is optional on the wire; records without a vector (or
/// with one of the wrong dimensionality) are dropped as a data-quality
/// filter, not an error.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InteractionRecord {
    /// Semantic embedding of the content interacted with
    #[serde(default)]
    pub vector: Option<Embedding>,
    /// Caller-supplied weight multiplier (defaults to 1.0)
    #[serde(default)]
    pub weight: Option<f32>,
    /// What the user did (defaults to `like`)
    #[serde(default)]
    pub interaction_type: InteractionKind,
}

impl InteractionRecord {
    /// Build a record from a vector with default weight and interaction type.
    pub fn from_vector(vector: Embedding) -> Self {
        Self {
            vector: Some(vector),
            weight: None,
            interaction_type: InteractionKind::default(),
        }
    }

    pub fn with_weight(mut self, weight: f32) -> Self {
        self.weight = Some(weight);
        self
    }

    pub fn with_kind(mut self, kind: InteractionKind) -> Self {
        self.interaction_type = kind;
        self
    }
}

/// One area of interest in the finished profile.
///
/// Invariants: `centroid` has unit L2 norm (or is the exact zero vector in
/// the degenerate all-cancelling case), `weight` is in [0, 1], and across the
/// emitted sequence the weights sum to 1.0 whenever any contributing weight
/// was positive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CentroidProfile {
    /// Cluster id assigned during synthesis (ascending, noise cluster last)
    pub cluster_id: i32,
    /// Unit-length direction representing this interest area
    pub centroid: Embedding,
    /// Normalized share of the user's total interaction mass
    pub weight: f32,
    /// Number of interactions that contributed to this centroid
    pub post_count: usize,
}
