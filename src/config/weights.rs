//! Interaction base-weight table

use crate::types::InteractionKind;
use serde::{Deserialize, Serialize};

/// Base weight per interaction type.
///
/// An immutable configuration mapping passed into the weighting
/// preprocessor, enabling per-deployment tuning without code change. A
/// negative base weight marks a repulsive interaction: its magnitude becomes
/// the weight and the vector direction is flipped instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractionWeights {
    #[serde(default = "default_like")]
    pub like: f32,
    #[serde(default = "default_repost")]
    pub repost: f32,
    #[serde(default = "default_request_more")]
    pub request_more: f32,
    #[serde(default = "default_request_less")]
    pub request_less: f32,
    /// Applied to interaction types this version does not know about
    #[serde(default = "default_unknown")]
    pub default: f32,
}

fn default_like() -> f32 {
    1.0
}

fn default_repost() -> f32 {
    1.5
}

fn default_request_more() -> f32 {
    3.0
}

fn default_request_less() -> f32 {
    -2.0
}

fn default_unknown() -> f32 {
    1.0
}

impl Default for InteractionWeights {
    fn default() -> Self {
        Self {
            like: default_like(),
            repost: default_repost(),
            request_more: default_request_more(),
            request_less: default_request_less(),
            default: default_unknown(),
        }
    }
}

impl InteractionWeights {
    /// Signed base weight for an interaction kind.
    pub fn base_for(&self, kind: InteractionKind) -> f32 {
        match kind {
            InteractionKind::Like => self.like,
            InteractionKind::Repost => self.repost,
            InteractionKind::RequestMore => self.request_more,
            InteractionKind::RequestLess => self.request_less,
            InteractionKind::Other => self.default,
        }
    }
}
