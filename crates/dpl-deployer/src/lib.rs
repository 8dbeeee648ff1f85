//! Remote deployment boundary.
//!
//! The pipeline hands a candidate's descriptor bytes to a [`Deployer`] and
//! gets back a [`DeploymentReceipt`]. Nothing here retries.

mod marathon;

pub use marathon::MarathonDeployer;

use async_trait::async_trait;
use dpl_schemas::Result;
use serde::{Deserialize, Serialize};

/// What the backend reported after accepting a descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentReceipt {
    pub application_id: String,
    /// `true` when the application did not exist before this call.
    pub is_new_deployment: bool,
    pub deployment_ids: Vec<String>,
}

#[async_trait]
pub trait Deployer: Send + Sync {
    fn backend_name(&self) -> &'static str;

    /// Submit an opaque application descriptor. Backend failures surface as
    /// `RemoteDeploy`; a descriptor the backend cannot interpret is
    /// `Serialization`.
    async fn deploy(&self, descriptor: &[u8]) -> Result<DeploymentReceipt>;
}
