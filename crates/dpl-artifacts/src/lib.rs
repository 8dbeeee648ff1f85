//! File-resident pipeline artifacts: the batch snapshot and the rendered
//! compose manifest.

pub mod compose;
pub mod snapshot;

pub use compose::{ComposeRenderer, Renderer};
pub use snapshot::{decode_snapshot, encode_snapshot, read_snapshot, snapshot_entries, SnapshotEntry};

use dpl_schemas::{PipelineError, Result};
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::debug;

/// Where the batch artifacts live for one pipeline invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub snapshot: PathBuf,
    pub compose: PathBuf,
}

impl ArtifactPaths {
    pub fn new(snapshot: impl Into<PathBuf>, compose: impl Into<PathBuf>) -> Self {
        Self {
            snapshot: snapshot.into(),
            compose: compose.into(),
        }
    }
}

/// Write `bytes` to `path`, creating parent directories. Overwrites.
pub fn write_artifact(path: &Path, bytes: &[u8]) -> Result<()> {
    write_artifacts_together(&[(path, bytes)])
}

/// Replace several artifacts as a set.
///
/// Every content is first staged in a temp file beside its target; targets are
/// renamed into place only once all of them are staged. A failure while
/// staging leaves every target as it was.
pub fn write_artifacts_together(files: &[(&Path, &[u8])]) -> Result<()> {
    let mut staged = Vec::with_capacity(files.len());
    for (path, bytes) in files {
        staged.push((*path, stage_artifact(path, bytes)?));
    }

    for (path, tmp) in staged {
        tmp.persist(path)
            .map_err(|e| PipelineError::io(path, e.error))?;
        debug!(path = %path.display(), "artifact written");
    }
    Ok(())
}

fn stage_artifact(path: &Path, bytes: &[u8]) -> Result<NamedTempFile> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir).map_err(|e| PipelineError::io(dir, e))?;

    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| PipelineError::io(dir, e))?;
    tmp.write_all(bytes)
        .map_err(|e| PipelineError::io(tmp.path(), e))?;
    Ok(tmp)
}

/// Read a required artifact. A missing file is `MissingArtifact`, any other
/// failure is `Io`.
pub fn read_artifact(path: &Path) -> Result<Vec<u8>> {
    match fs::read(path) {
        Ok(bytes) => Ok(bytes),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            Err(PipelineError::MissingArtifact(path.to_path_buf()))
        }
        Err(e) => Err(PipelineError::io(path, e)),
    }
}
