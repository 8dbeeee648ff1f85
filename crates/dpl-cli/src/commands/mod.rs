//! Command handlers for `dpl`.
//!
//! Every handler validates what it can locally (stage names, input files)
//! before opening the database, so operator mistakes fail fast and without
//! touching the store.

pub mod batch;
pub mod candidate;
pub mod db;
pub mod service;

use anyhow::{Context, Result};
use dpl_artifacts::{ArtifactPaths, ComposeRenderer, SnapshotEntry};
use dpl_config::PipelineConfig;
use dpl_db::PgCandidateStore;
use dpl_deployer::MarathonDeployer;
use dpl_runtime::PipelineController;
use dpl_schemas::{DeploymentCandidate, PipelineError};
use std::path::Path;

pub type Controller = PipelineController<PgCandidateStore, MarathonDeployer, ComposeRenderer>;

// ---------------------------------------------------------------------------
// Wiring
// ---------------------------------------------------------------------------

pub async fn open_store(cfg: &PipelineConfig) -> Result<PgCandidateStore> {
    PgCandidateStore::connect_from_env(&cfg.catalog, cfg.max_connections)
        .await
        .context("open candidate store failed")
}

pub async fn open_controller(cfg: &PipelineConfig) -> Result<Controller> {
    let store = open_store(cfg).await?;
    Ok(PipelineController::new(
        store,
        MarathonDeployer::new_with_base_url(cfg.marathon_url.clone()),
        ComposeRenderer,
        ArtifactPaths::new(cfg.snapshot_path.clone(), cfg.compose_path.clone()),
    ))
}

/// Release the controller's store, then hand back the command's outcome.
/// A command error wins over a close error.
pub async fn finish<T>(ctl: Controller, outcome: Result<T>) -> Result<T> {
    let closed = ctl.dispose().await;
    let value = outcome?;
    closed.context("close candidate store failed")?;
    Ok(value)
}

// ---------------------------------------------------------------------------
// Preflight
// ---------------------------------------------------------------------------

pub fn require_file(path: &Path) -> Result<()> {
    if !path.is_file() {
        return Err(PipelineError::MissingArtifact(path.to_path_buf()).into());
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

pub fn print_candidate(c: &DeploymentCandidate) {
    println!("service={}", c.service_name);
    println!("version={}", c.version);
    println!("image={}", c.image);
    println!("started_at_utc={}", c.started_at_utc.to_rfc3339());
    println!("has_descriptor={}", c.has_spec());
    println!("unit={}", c.unit);
    println!("e2e={}", c.e2e);
    println!("completed={}", c.completed);
    println!("succeeded={}", c.succeeded);
    println!("deployed={}", c.deployed);
}

pub fn print_entries(key: &str, entries: &[SnapshotEntry]) {
    for e in entries {
        println!("{key}={}@{}", e.service, e.version);
    }
}
