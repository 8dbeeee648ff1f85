use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use dpl_artifacts::Renderer;
use dpl_deployer::{Deployer, DeploymentReceipt};
use dpl_schemas::{DeploymentCandidate, PipelineError, Result};

#[derive(Debug, Default)]
struct Calls {
    descriptors: Vec<Vec<u8>>,
}

/// Deployer that records every descriptor it is handed.
///
/// `failing_from(n)` makes call `n` (0-based) and every later call fail with
/// `RemoteDeploy`; failed calls are recorded too.
#[derive(Debug, Clone, Default)]
pub struct RecordingDeployer {
    calls: Arc<Mutex<Calls>>,
    fail_from: Option<usize>,
}

impl RecordingDeployer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_from(call: usize) -> Self {
        Self {
            fail_from: Some(call),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.lock().map(|c| c.descriptors.len()).unwrap_or(0)
    }

    pub fn descriptors(&self) -> Vec<Vec<u8>> {
        self.calls
            .lock()
            .map(|c| c.descriptors.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl Deployer for RecordingDeployer {
    fn backend_name(&self) -> &'static str {
        "recording"
    }

    async fn deploy(&self, descriptor: &[u8]) -> Result<DeploymentReceipt> {
        let call = {
            let mut calls = self
                .calls
                .lock()
                .map_err(|_| PipelineError::RemoteDeploy("recorder lock poisoned".to_string()))?;
            calls.descriptors.push(descriptor.to_vec());
            calls.descriptors.len() - 1
        };

        if self.fail_from.is_some_and(|n| call >= n) {
            return Err(PipelineError::RemoteDeploy(format!("scripted failure on call {call}")));
        }

        let app_id = serde_json::from_slice::<serde_json::Value>(descriptor)
            .ok()
            .and_then(|v| v.get("id").and_then(|id| id.as_str()).map(str::to_string))
            .unwrap_or_else(|| format!("/recorded-{call}"));

        Ok(DeploymentReceipt {
            application_id: app_id,
            is_new_deployment: true,
            deployment_ids: vec![format!("dep-{call}")],
        })
    }
}

/// Renderer returning fixed bytes. Still refuses an empty candidate list.
#[derive(Debug, Clone)]
pub struct StaticRenderer {
    body: Vec<u8>,
}

impl StaticRenderer {
    pub fn new(body: impl Into<Vec<u8>>) -> Self {
        Self { body: body.into() }
    }
}

impl Renderer for StaticRenderer {
    fn render(&self, candidates: &[DeploymentCandidate]) -> Result<Vec<u8>> {
        if candidates.is_empty() {
            return Err(PipelineError::EmptyInput("static render"));
        }
        Ok(self.body.clone())
    }
}
