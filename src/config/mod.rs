//! Configuration for UProfile

mod clustering;
mod logging;
mod profile;
mod weights;

pub use clustering::{ClusterAlgorithm, ClusteringConfig, DistanceMetric, SelectionMethod};
pub use logging::{LogFormat, LogLevel, LoggingConfig};
pub use profile::ProfileConfig;
pub use weights::InteractionWeights;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration for a profile build
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Profile shape configuration
    #[serde(default)]
    pub profile: ProfileConfig,
    /// Density clustering configuration
    #[serde(default)]
    pub clustering: ClusteringConfig,
    /// Interaction base-weight table
    #[serde(default)]
    pub weights: InteractionWeights,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file and validate it.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read config file '{}': {}", path.display(), e))?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse config file '{}': {}", path.display(), e))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate all configuration fields.
    ///
    /// Collects all validation errors and reports them together so the user
    /// can fix everything in one pass.
    pub fn validate(&self) -> Result<()> {
        let mut errors: Vec<String> = Vec::new();

        // Profile validation
        if self.profile.dimensions == 0 {
            errors.push("dimensions must be positive".to_string());
        }
        if self.profile.dimensions > 4096 {
            errors.push("dimensions must be <= 4096".to_string());
        }
        if self.profile.max_centroids == 0 {
            errors.push("max_centroids must be positive".to_string());
        }
        if self.profile.min_points_for_clustering < 2 {
            errors.push("min_points_for_clustering must be >= 2".to_string());
        }

        // Clustering validation
        if self.clustering.min_cluster_size < 2 {
            errors.push("min_cluster_size must be >= 2".to_string());
        }
        if self.clustering.min_samples == 0 {
            errors.push("min_samples must be positive".to_string());
        }
        if self.clustering.min_samples > self.clustering.min_cluster_size {
            errors.push(format!(
                "min_samples ({}) must be <= min_cluster_size ({})",
                self.clustering.min_samples, self.clustering.min_cluster_size
            ));
        }

        // Weight table validation: combined weights must resolve to a
        // magnitude, so every base weight has to be finite
        for (name, value) in [
            ("like", self.weights.like),
            ("repost", self.weights.repost),
            ("request_more", self.weights.request_more),
            ("request_less", self.weights.request_less),
            ("default", self.weights.default),
        ] {
            if !value.is_finite() {
                errors.push(format!("weights.{} must be finite, got {}", name, value));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            anyhow::bail!(
                "Configuration validation failed:\n  - {}",
                errors.join("\n  - ")
            );
        }
    }
}
