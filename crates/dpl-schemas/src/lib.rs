//! Shared model types for the deployment candidate pipeline.
//!
//! Every other crate in the workspace speaks in these types: the store
//! persists [`DeploymentCandidate`] rows, the snapshot protocol references
//! them by `(service, version)`, and the controller moves them through
//! [`Stage`]s.

pub mod candidate;
pub mod error;
pub mod stage;

pub use candidate::{DeploymentCandidate, NewCandidate, TrackedService};
pub use error::{PipelineError, Result};
pub use stage::Stage;
