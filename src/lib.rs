//! UProfile: Multi-Centroid User Interest Profiles
//!
//! Turns a user's raw interaction history (weighted 512-dimensional semantic
//! embeddings tagged with an interaction type) into a compact profile of at
//! most five unit-vector centroids with normalized weights, featuring:
//! - Signed interaction weighting (negative feedback flips vector direction)
//! - Pluggable density-based clustering (hierarchical mutual-reachability or DBSCAN)
//! - Low-data and no-structure fallbacks to a single global centroid
//! - Deterministic cap-and-renormalize finishing pass

pub mod centroid;
pub mod clustering;
pub mod config;
pub mod io;
pub mod profile;
pub mod types;
pub mod weighting;

pub use config::Config;
pub use types::*;
