//! Error kinds surfaced by the pipeline core.
//!
//! Nothing in the core recovers from these; they travel unchanged to the
//! command boundary.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// No candidate matches `(service, version)`.
    #[error("no candidate found for service={service} version={version}")]
    NotFound { service: String, version: String },

    /// Stage name outside the fixed vocabulary. Carries the caller's input verbatim.
    #[error("{0} is not a valid stage")]
    InvalidStage(String),

    /// `(service, version)` is already registered.
    #[error("candidate already registered for service={service} version={version}")]
    DuplicateVersion { service: String, version: String },

    /// A required artifact file does not exist.
    #[error("{} doesn't exist", .0.display())]
    MissingArtifact(PathBuf),

    /// The remote deployment backend rejected or failed the request.
    #[error("remote deploy failed: {0}")]
    RemoteDeploy(String),

    /// Snapshot, render or descriptor content could not be encoded/decoded.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// An operation that needs at least one candidate was given none.
    #[error("no candidates found: {0}")]
    EmptyInput(&'static str),

    /// Persistent store failure not covered by a more specific kind.
    #[error("storage error: {0}")]
    Storage(String),

    #[error("i/o error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl PipelineError {
    pub fn not_found(service: &str, version: &str) -> Self {
        PipelineError::NotFound {
            service: service.to_string(),
            version: version.to_string(),
        }
    }

    pub fn duplicate_version(service: &str, version: &str) -> Self {
        PipelineError::DuplicateVersion {
            service: service.to_string(),
            version: version.to_string(),
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        PipelineError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Convenience alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_stage_keeps_original_input() {
        let err = PipelineError::InvalidStage("Mwahaha".to_string());
        assert_eq!(err.to_string(), "Mwahaha is not a valid stage");
    }

    #[test]
    fn missing_artifact_names_the_path() {
        let err = PipelineError::MissingArtifact(PathBuf::from("candidateSnapper.json"));
        assert_eq!(err.to_string(), "candidateSnapper.json doesn't exist");
    }

    #[test]
    fn not_found_and_duplicate_name_the_pair() {
        let err = PipelineError::not_found("cans", "v5");
        assert_eq!(err.to_string(), "no candidate found for service=cans version=v5");

        let err = PipelineError::duplicate_version("bottles", "loo");
        assert!(err.to_string().contains("service=bottles"));
        assert!(err.to_string().contains("version=loo"));
    }

    #[test]
    fn io_error_exposes_source() {
        let inner = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = PipelineError::io("docker-compose.yml", inner);
        assert!(err.to_string().contains("docker-compose.yml"));
        assert!(std::error::Error::source(&err).is_some());
    }
}
