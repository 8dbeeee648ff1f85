//! Storage contract for deployment candidates.

use async_trait::async_trait;
use dpl_schemas::{DeploymentCandidate, NewCandidate, Result, Stage, TrackedService};

use crate::selection;

/// Candidate storage partitioned by service name.
///
/// Implementations supply the primitives; the stage-validating mutation path,
/// the `Completed` shorthand and the e2e selection policy are provided here
/// once so every backend behaves the same.
///
/// Implementations must be `Send + Sync` so a controller can hold one behind
/// a reference across `.await` points.
#[async_trait]
pub trait CandidateStore: Send + Sync {
    /// Insert a fresh candidate (all stage flags false, `started_at_utc = now`).
    ///
    /// Fails with `DuplicateVersion` when `(service, version)` already exists;
    /// the stored candidate is left untouched.
    async fn register_candidate(&self, new: &NewCandidate) -> Result<DeploymentCandidate>;

    /// Point lookup. `NotFound` when absent.
    async fn find_candidate(&self, service: &str, version: &str) -> Result<DeploymentCandidate>;

    /// Set one stage flag to true. `NotFound` when absent.
    async fn set_stage(&self, service: &str, version: &str, stage: Stage) -> Result<()>;

    /// Replace the descriptor blob (last write wins). `NotFound` when absent.
    async fn assign_spec(&self, service: &str, version: &str, content: &str) -> Result<()>;

    /// Registry entries in registry order.
    async fn tracked_services(&self) -> Result<Vec<TrackedService>>;

    /// One partition's candidates with `unit == true` and a non-empty
    /// descriptor, oldest `started_at_utc` first.
    async fn eligible_for_e2e(&self, service: &str) -> Result<Vec<DeploymentCandidate>>;

    /// Validate `stage` and mark it complete. Returns the canonical stage.
    ///
    /// The name is checked before the store is touched, so an unknown stage
    /// fails with `InvalidStage` whether or not the candidate exists.
    async fn complete_stage(&self, service: &str, version: &str, stage: &str) -> Result<Stage> {
        let stage = Stage::parse(stage)?;
        self.set_stage(service, version, stage).await?;
        Ok(stage)
    }

    /// Shorthand for completing the `Completed` stage.
    async fn mark_as_succeeded(&self, service: &str, version: &str) -> Result<()> {
        self.complete_stage(service, version, Stage::Completed.as_str())
            .await
            .map(|_| ())
    }

    /// Candidates ready for end-to-end testing across all tracked services.
    async fn select_for_e2e(&self) -> Result<Vec<DeploymentCandidate>> {
        selection::select_for_e2e(self).await
    }

    /// Release the underlying connection. Called once, at the end of the
    /// owning controller's lifetime.
    async fn close(&self) -> Result<()> {
        Ok(())
    }
}
