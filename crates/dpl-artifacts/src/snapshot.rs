//! Batch snapshot: the working set handed between independent invocations.
//!
//! An entry is a reference, not a copy. Consumers re-resolve each
//! `(service, version)` against the store.

use dpl_schemas::{DeploymentCandidate, PipelineError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotEntry {
    #[serde(alias = "Service")]
    pub service: String,
    #[serde(alias = "Version")]
    pub version: String,
}

impl SnapshotEntry {
    pub fn new(service: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            version: version.into(),
        }
    }
}

impl From<&DeploymentCandidate> for SnapshotEntry {
    fn from(c: &DeploymentCandidate) -> Self {
        Self::new(&c.service_name, &c.version)
    }
}

/// Entries for the candidates still awaiting validation, in input order.
///
/// An empty input is `EmptyInput`. A non-empty input whose candidates are all
/// validated or finalized yields an empty list.
pub fn snapshot_entries(candidates: &[DeploymentCandidate]) -> Result<Vec<SnapshotEntry>> {
    if candidates.is_empty() {
        return Err(PipelineError::EmptyInput("snapshot"));
    }
    Ok(candidates
        .iter()
        .filter(|c| c.awaiting_validation())
        .map(SnapshotEntry::from)
        .collect())
}

pub fn encode_snapshot(entries: &[SnapshotEntry]) -> Result<Vec<u8>> {
    let mut out = serde_json::to_vec_pretty(entries)
        .map_err(|e| PipelineError::Serialization(format!("encode snapshot: {e}")))?;
    out.push(b'\n');
    Ok(out)
}

/// A literal `null` document decodes as an empty snapshot.
pub fn decode_snapshot(bytes: &[u8]) -> Result<Vec<SnapshotEntry>> {
    let entries: Option<Vec<SnapshotEntry>> = serde_json::from_slice(bytes)
        .map_err(|e| PipelineError::Serialization(format!("decode snapshot: {e}")))?;
    Ok(entries.unwrap_or_default())
}

/// Load and decode the snapshot at `path`. `MissingArtifact` when absent.
pub fn read_snapshot(path: &Path) -> Result<Vec<SnapshotEntry>> {
    let bytes = crate::read_artifact(path)?;
    decode_snapshot(&bytes)
}
