//! Marathon REST deployer: create the app when absent, update it otherwise.

use async_trait::async_trait;
use dpl_schemas::{PipelineError, Result};
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info};

use crate::{Deployer, DeploymentReceipt};

#[derive(Debug, Clone)]
pub struct MarathonDeployer {
    http: reqwest::Client,
    base_url: String,
}

impl MarathonDeployer {
    pub fn new_with_base_url(base_url: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url,
        }
    }

    fn apps_url(&self) -> String {
        format!("{}/v2/apps", self.base_url.trim_end_matches('/'))
    }

    fn app_url(&self, app_id: &str) -> String {
        format!("{}/{}", self.apps_url(), app_id.trim_start_matches('/'))
    }

    async fn has_application(&self, app_id: &str) -> Result<bool> {
        let resp = self
            .http
            .get(self.app_url(app_id))
            .send()
            .await
            .map_err(|e| remote(format!("lookup {app_id}: {e}")))?;

        match resp.status() {
            StatusCode::OK => Ok(true),
            StatusCode::NOT_FOUND => Ok(false),
            other => Err(remote(format!(
                "lookup {app_id}: http status={}",
                other.as_u16()
            ))),
        }
    }

    async fn create_application(&self, app_id: String, app: &Value) -> Result<DeploymentReceipt> {
        let resp = self
            .http
            .post(self.apps_url())
            .json(app)
            .send()
            .await
            .map_err(|e| remote(format!("create {app_id}: {e}")))?;

        let body: CreatedApp = decode_success(resp, "create", &app_id).await?;
        Ok(DeploymentReceipt {
            application_id: body.id.unwrap_or(app_id),
            is_new_deployment: true,
            deployment_ids: body.deployments.into_iter().map(|d| d.id).collect(),
        })
    }

    async fn update_application(&self, app_id: String, app: &Value) -> Result<DeploymentReceipt> {
        let resp = self
            .http
            .put(self.app_url(&app_id))
            .json(app)
            .send()
            .await
            .map_err(|e| remote(format!("update {app_id}: {e}")))?;

        let body: UpdatedApp = decode_success(resp, "update", &app_id).await?;
        Ok(DeploymentReceipt {
            application_id: app_id,
            is_new_deployment: false,
            deployment_ids: body.deployment_id.into_iter().collect(),
        })
    }
}

#[async_trait]
impl Deployer for MarathonDeployer {
    fn backend_name(&self) -> &'static str {
        "marathon"
    }

    async fn deploy(&self, descriptor: &[u8]) -> Result<DeploymentReceipt> {
        let (app_id, app) = parse_descriptor(descriptor)?;

        let receipt = if self.has_application(&app_id).await? {
            debug!(app_id = %app_id, "application exists; updating");
            self.update_application(app_id, &app).await?
        } else {
            debug!(app_id = %app_id, "application absent; creating");
            self.create_application(app_id, &app).await?
        };

        info!(
            app_id = %receipt.application_id,
            new = receipt.is_new_deployment,
            deployments = receipt.deployment_ids.len(),
            "marathon accepted application"
        );
        Ok(receipt)
    }
}

/// The descriptor must be a JSON object with a non-empty string `id`.
/// The rest of the document is forwarded untouched.
fn parse_descriptor(descriptor: &[u8]) -> Result<(String, Value)> {
    let app: Value = serde_json::from_slice(descriptor)
        .map_err(|e| PipelineError::Serialization(format!("marathon descriptor: {e}")))?;

    let id = app
        .as_object()
        .ok_or_else(|| {
            PipelineError::Serialization("marathon descriptor is not a JSON object".to_string())
        })?
        .get("id")
        .and_then(Value::as_str)
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| {
            PipelineError::Serialization("marathon descriptor has no application id".to_string())
        })?
        .to_string();

    Ok((id, app))
}

async fn decode_success<T>(resp: reqwest::Response, op: &str, app_id: &str) -> Result<T>
where
    T: for<'de> Deserialize<'de>,
{
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(remote(format!(
            "{op} {app_id}: http status={} body={}",
            status.as_u16(),
            body.trim()
        )));
    }
    resp.json::<T>()
        .await
        .map_err(|e| remote(format!("{op} {app_id}: response decode failed: {e}")))
}

fn remote(msg: String) -> PipelineError {
    PipelineError::RemoteDeploy(msg)
}

#[derive(Debug, Deserialize)]
struct CreatedApp {
    id: Option<String>,
    #[serde(default)]
    deployments: Vec<DeploymentRef>,
}

#[derive(Debug, Deserialize)]
struct DeploymentRef {
    id: String,
}

#[derive(Debug, Deserialize)]
struct UpdatedApp {
    #[serde(rename = "deploymentId")]
    deployment_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    const EL_APP: &str = r#"{
        "id": "elApp",
        "cmd": "env && sleep 300",
        "cpus": 1.5,
        "mem": 256.0,
        "instances": 3,
        "container": {
            "type": "DOCKER",
            "docker": { "image": "group/image", "network": "BRIDGE" }
        }
    }"#;

    #[test]
    fn parses_id_and_keeps_the_document() {
        let (id, app) = parse_descriptor(EL_APP.as_bytes()).unwrap();
        assert_eq!(id, "elApp");
        assert_eq!(app["instances"], 3);
        assert_eq!(app["container"]["docker"]["image"], "group/image");
    }

    #[test]
    fn rejects_descriptors_without_an_id() {
        for raw in ["[]", "{}", r#"{"id": ""}"#, r#"{"id": 7}"#, "not json"] {
            let err = parse_descriptor(raw.as_bytes()).unwrap_err();
            assert!(matches!(err, PipelineError::Serialization(_)), "{raw}: {err:?}");
        }
    }

    #[test]
    fn app_url_normalises_slashes() {
        let d = MarathonDeployer::new_with_base_url("http://marathon:8080/".to_string());
        assert_eq!(d.app_url("/group/elApp"), "http://marathon:8080/v2/apps/group/elApp");
        assert_eq!(d.app_url("elApp"), "http://marathon:8080/v2/apps/elApp");
    }
}
