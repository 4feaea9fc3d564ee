//! Snapshot input and profile output
//!
//! The invocation surface contract: an unreadable or unparseable input file
//! is fatal and nothing is written; an empty input array is a success and
//! writes an empty profile.

use crate::types::{CentroidProfile, InteractionRecord};
use anyhow::{Context, Result};
use std::path::Path;

/// Read an interaction snapshot (JSON array of records).
pub fn read_records(path: &Path) -> Result<Vec<InteractionRecord>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read input file '{}'", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse input file '{}'", path.display()))
}

/// Write the finished profile (JSON array of centroids).
pub fn write_profiles(path: &Path, profiles: &[CentroidProfile]) -> Result<()> {
    let json = serde_json::to_string(profiles).context("Failed to serialize profile")?;
    std::fs::write(path, json)
        .with_context(|| format!("Failed to write output file '{}'", path.display()))
}

/// Read a previously written profile back, for inspection.
pub fn read_profiles(path: &Path) -> Result<Vec<CentroidProfile>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read profile file '{}'", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse profile file '{}'", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::InteractionKind;

    #[test]
    fn read_records_parses_wire_format() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("input.json");
        std::fs::write(
            &path,
            r#"[{"vector": [0.0, 1.0], "weight": 2.0, "interactionType": "repost"},
                {"interactionType": "requestLess"}]"#,
        )
        .unwrap();

        let records = read_records(&path).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].vector.as_deref(), Some(&[0.0, 1.0][..]));
        assert_eq!(records[0].weight, Some(2.0));
        assert_eq!(records[0].interaction_type, InteractionKind::Repost);
        assert!(records[1].vector.is_none());
        assert_eq!(records[1].interaction_type, InteractionKind::RequestLess);
    }

    #[test]
    fn read_records_missing_file_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_records(&dir.path().join("absent.json")).unwrap_err();
        assert!(err.to_string().contains("Failed to read input file"));
    }

    #[test]
    fn read_records_malformed_json_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{not json").unwrap();
        let err = read_records(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse input file"));
    }

    #[test]
    fn profiles_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("profile.json");
        let profiles = vec![CentroidProfile {
            cluster_id: 0,
            centroid: vec![1.0, 0.0],
            weight: 1.0,
            post_count: 4,
        }];

        write_profiles(&path, &profiles).unwrap();
        let loaded = read_profiles(&path).unwrap();
        assert_eq!(loaded, profiles);
    }

    #[test]
    fn empty_profile_writes_empty_array() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.json");
        write_profiles(&path, &[]).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "[]");
    }
}
