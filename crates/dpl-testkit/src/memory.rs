use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;
use dpl_db::CandidateStore;
use dpl_schemas::{
    DeploymentCandidate, NewCandidate, PipelineError, Result, Stage, TrackedService,
};

#[derive(Debug, Default)]
struct State {
    services: Vec<TrackedService>,
    // (insertion seq, candidate)
    rows: Vec<(u64, DeploymentCandidate)>,
    next_seq: u64,
    // set_stage fails for these
    refused: Vec<Stage>,
    closed: bool,
}

impl State {
    fn row_mut(&mut self, service: &str, version: &str) -> Result<&mut DeploymentCandidate> {
        self.rows
            .iter_mut()
            .map(|(_, c)| c)
            .find(|c| c.service_name == service && c.version == version)
            .ok_or_else(|| PipelineError::not_found(service, version))
    }

    fn push(&mut self, c: DeploymentCandidate) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.rows.push((seq, c));
    }
}

/// `CandidateStore` kept in process memory.
///
/// Clones share state, so a test can keep a handle after moving one into a
/// controller and inspect the result once the controller is disposed.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCandidateStore {
    inner: Arc<Mutex<State>>,
}

impl InMemoryCandidateStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> Result<MutexGuard<'_, State>> {
        let guard = self
            .inner
            .lock()
            .map_err(|_| PipelineError::Storage("in-memory store lock poisoned".to_string()))?;
        if guard.closed {
            return Err(PipelineError::Storage("store is closed".to_string()));
        }
        Ok(guard)
    }

    /// Make every later `set_stage(.., stage)` fail with `Storage`.
    pub fn refuse_stage(&self, stage: Stage) -> Result<()> {
        self.state()?.refused.push(stage);
        Ok(())
    }

    /// Append a service to the registry.
    pub fn track(&self, name: &str) -> Result<()> {
        let mut st = self.state()?;
        if !st.services.iter().any(|s| s.name == name) {
            st.services.push(TrackedService::new(name));
        }
        Ok(())
    }

    /// Seed a candidate as-is, bypassing registration (explicit timestamps
    /// and flags). Still rejects duplicates.
    pub fn insert(&self, candidate: DeploymentCandidate) -> Result<()> {
        let mut st = self.state()?;
        if st
            .rows
            .iter()
            .any(|(_, c)| c.service_name == candidate.service_name && c.version == candidate.version)
        {
            return Err(PipelineError::duplicate_version(
                &candidate.service_name,
                &candidate.version,
            ));
        }
        st.push(candidate);
        Ok(())
    }

    pub fn is_closed(&self) -> bool {
        self.inner.lock().map(|st| st.closed).unwrap_or(true)
    }

    /// Candidate count across all partitions.
    pub fn len(&self) -> usize {
        self.inner.lock().map(|st| st.rows.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl CandidateStore for InMemoryCandidateStore {
    async fn register_candidate(&self, new: &NewCandidate) -> Result<DeploymentCandidate> {
        let c = DeploymentCandidate::registered(new, Utc::now());
        self.insert(c.clone())?;
        Ok(c)
    }

    async fn find_candidate(&self, service: &str, version: &str) -> Result<DeploymentCandidate> {
        let mut st = self.state()?;
        st.row_mut(service, version).map(|c| c.clone())
    }

    async fn set_stage(&self, service: &str, version: &str, stage: Stage) -> Result<()> {
        let mut st = self.state()?;
        if st.refused.contains(&stage) {
            return Err(PipelineError::Storage(format!("{} flag is read-only", stage.column())));
        }
        st.row_mut(service, version)?.mark(stage);
        Ok(())
    }

    async fn assign_spec(&self, service: &str, version: &str, content: &str) -> Result<()> {
        let mut st = self.state()?;
        st.row_mut(service, version)?.marathon_spec = content.to_string();
        Ok(())
    }

    async fn tracked_services(&self) -> Result<Vec<TrackedService>> {
        Ok(self.state()?.services.clone())
    }

    async fn eligible_for_e2e(&self, service: &str) -> Result<Vec<DeploymentCandidate>> {
        let st = self.state()?;
        let mut found: Vec<&(u64, DeploymentCandidate)> = st
            .rows
            .iter()
            .filter(|(_, c)| c.service_name == service && c.is_e2e_eligible())
            .collect();
        found.sort_by_key(|(seq, c)| (c.started_at_utc, *seq));
        Ok(found.into_iter().map(|(_, c)| c.clone()).collect())
    }

    async fn close(&self) -> Result<()> {
        let mut st = self
            .inner
            .lock()
            .map_err(|_| PipelineError::Storage("in-memory store lock poisoned".to_string()))?;
        st.closed = true;
        Ok(())
    }
}
