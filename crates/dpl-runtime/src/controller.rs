use std::path::Path;

use dpl_artifacts::{
    encode_snapshot, read_artifact, read_snapshot, snapshot_entries, write_artifacts_together,
    ArtifactPaths, Renderer, SnapshotEntry,
};
use dpl_db::CandidateStore;
use dpl_deployer::{Deployer, DeploymentReceipt};
use dpl_schemas::{DeploymentCandidate, NewCandidate, PipelineError, Result, Stage};
use tracing::{info, warn};

use crate::batch::{run_sequential, BatchError, BatchReport};

/// Outcome of [`PipelineController::produce_batch_artifacts`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProducedArtifacts {
    /// Candidates returned by the one selection both artifacts came from.
    pub selected: usize,
    pub entries: Vec<SnapshotEntry>,
    pub paths: ArtifactPaths,
}

/// Pipeline commands over one store, one deployer and one renderer.
///
/// The controller owns its collaborators for the length of an invocation;
/// [`dispose`](Self::dispose) releases the store.
pub struct PipelineController<S, D, R> {
    store: S,
    deployer: D,
    renderer: R,
    paths: ArtifactPaths,
}

impl<S, D, R> PipelineController<S, D, R>
where
    S: CandidateStore,
    D: Deployer,
    R: Renderer,
{
    pub fn new(store: S, deployer: D, renderer: R, paths: ArtifactPaths) -> Self {
        Self {
            store,
            deployer,
            renderer,
            paths,
        }
    }

    pub fn paths(&self) -> &ArtifactPaths {
        &self.paths
    }

    pub async fn register_candidate(&self, new: &NewCandidate) -> Result<DeploymentCandidate> {
        let c = self.store.register_candidate(new).await?;
        info!(service = %c.service_name, version = %c.version, image = %c.image, "candidate registered");
        Ok(c)
    }

    pub async fn complete_stage(&self, service: &str, version: &str, stage: &str) -> Result<Stage> {
        let stage = self.store.complete_stage(service, version, stage).await?;
        info!(service, version, stage = %stage, "stage completed");
        Ok(stage)
    }

    pub async fn find_candidate(&self, service: &str, version: &str) -> Result<DeploymentCandidate> {
        self.store.find_candidate(service, version).await
    }

    /// Store the file at `path` as the candidate's deployment descriptor.
    pub async fn attach_descriptor(&self, service: &str, version: &str, path: &Path) -> Result<()> {
        let bytes = read_artifact(path)?;
        let content = String::from_utf8(bytes).map_err(|e| {
            PipelineError::Serialization(format!("descriptor {}: {e}", path.display()))
        })?;
        self.store.assign_spec(service, version, &content).await?;
        info!(service, version, path = %path.display(), "descriptor attached");
        Ok(())
    }

    /// Write the render artifact and the snapshot for the current e2e selection.
    ///
    /// Precondition: both artifacts are derived from a single
    /// `select_for_e2e` result, so they describe the same working set. Both
    /// contents are built before either file is touched, and the two files are
    /// replaced as a set: if either cannot be staged, neither changes. An
    /// empty selection fails with `EmptyInput` and writes nothing.
    pub async fn produce_batch_artifacts(&self) -> Result<ProducedArtifacts> {
        let selected = self.store.select_for_e2e().await?;

        let compose = self.renderer.render(&selected)?;
        let entries = snapshot_entries(&selected)?;
        let snapshot = encode_snapshot(&entries)?;

        write_artifacts_together(&[
            (self.paths.compose.as_path(), compose.as_slice()),
            (self.paths.snapshot.as_path(), snapshot.as_slice()),
        ])?;

        info!(
            selected = selected.len(),
            snapshot_entries = entries.len(),
            compose = %self.paths.compose.display(),
            snapshot = %self.paths.snapshot.display(),
            "batch artifacts produced"
        );

        Ok(ProducedArtifacts {
            selected: selected.len(),
            entries,
            paths: self.paths.clone(),
        })
    }

    /// Hand the candidate's descriptor to the deployer and, once accepted,
    /// mark it `Deployed`. No retry.
    pub async fn trigger_deployment(&self, service: &str, version: &str) -> Result<DeploymentReceipt> {
        let candidate = self.store.find_candidate(service, version).await?;

        let receipt = match self.deployer.deploy(candidate.marathon_spec.as_bytes()).await {
            Ok(r) => r,
            Err(e) => {
                warn!(service, version, backend = self.deployer.backend_name(), error = %e, "deploy failed");
                return Err(e);
            }
        };

        self.store.set_stage(service, version, Stage::Deployed).await?;
        info!(
            service,
            version,
            app_id = %receipt.application_id,
            new = receipt.is_new_deployment,
            "Deployed {} with version {}",
            receipt.application_id,
            version
        );
        Ok(receipt)
    }

    /// Deploy every snapshot entry in order.
    pub async fn deploy_snapshot(&self) -> std::result::Result<BatchReport, BatchError> {
        let entries = read_snapshot(&self.paths.snapshot)?;
        info!(entries = entries.len(), "deploying snapshot");

        let out = run_sequential("deploy", entries, |e| async move {
            self.trigger_deployment(&e.service, &e.version).await.map(|_| ())
        })
        .await;
        log_batch("deploy", &out);
        out
    }

    /// Complete `stage` for every snapshot entry in order.
    ///
    /// The stage name is validated before the snapshot is read.
    pub async fn apply_stage_to_snapshot(
        &self,
        stage: &str,
    ) -> std::result::Result<BatchReport, BatchError> {
        let stage = Stage::parse(stage)?;
        let entries = read_snapshot(&self.paths.snapshot)?;
        info!(entries = entries.len(), stage = %stage, "applying stage to snapshot");

        let out = run_sequential(stage.as_str(), entries, |e| async move {
            self.store.set_stage(&e.service, &e.version, stage).await
        })
        .await;
        log_batch(stage.as_str(), &out);
        out
    }

    pub async fn accept_snapshot(&self) -> std::result::Result<BatchReport, BatchError> {
        self.apply_stage_to_snapshot(Stage::Succeeded.as_str()).await
    }

    /// `Completed` over the whole snapshot, then `Deployed` over the whole
    /// snapshot. The second pass runs only if the first applied every entry,
    /// so a halt whose [`BatchError::pass`] is `Deployed` means every entry is
    /// already `Completed`.
    pub async fn complete_snapshot(&self) -> std::result::Result<BatchReport, BatchError> {
        self.apply_stage_to_snapshot(Stage::Completed.as_str()).await?;
        self.apply_stage_to_snapshot(Stage::Deployed.as_str()).await
    }

    /// Release the store. Consumes the controller.
    pub async fn dispose(self) -> Result<()> {
        self.store.close().await
    }
}

fn log_batch(op: &str, out: &std::result::Result<BatchReport, BatchError>) {
    match out {
        Ok(report) => info!(op, applied = report.applied.len(), "batch finished"),
        Err(e) => warn!(op, applied = e.applied().len(), error = %e, "batch stopped"),
    }
}
