//! Typed view over the merged config document.
//!
//! Recognised keys (all optional):
//!
//! ```yaml
//! store:
//!   catalog: fire            # tracked-service registry to scan
//!   max_connections: 5
//! deployer:
//!   marathon_url: http://marathon.mesos:8080
//! artifacts:
//!   snapshot_path: candidateSnapper.json
//!   compose_path: docker-compose.yml
//! ```
//!
//! There is no database URL key; it only comes from
//! `DPL_DATABASE_URL`.

use anyhow::{bail, Result};
use serde::Serialize;
use serde_json::Value;
use std::path::PathBuf;
use tracing::debug;

pub const ENV_CATALOG: &str = "DPL_CATALOG";
pub const ENV_MARATHON_URL: &str = "DPL_MARATHON_URL";

pub const DEFAULT_CATALOG: &str = "default";
pub const DEFAULT_MARATHON_URL: &str = "http://localhost:8080";
pub const DEFAULT_SNAPSHOT_PATH: &str = "candidateSnapper.json";
pub const DEFAULT_COMPOSE_PATH: &str = "docker-compose.yml";
const DEFAULT_MAX_CONNECTIONS: u32 = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PipelineConfig {
    pub catalog: String,
    pub max_connections: u32,
    pub marathon_url: String,
    pub snapshot_path: PathBuf,
    pub compose_path: PathBuf,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            catalog: DEFAULT_CATALOG.to_string(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            marathon_url: DEFAULT_MARATHON_URL.to_string(),
            snapshot_path: PathBuf::from(DEFAULT_SNAPSHOT_PATH),
            compose_path: PathBuf::from(DEFAULT_COMPOSE_PATH),
        }
    }
}

impl PipelineConfig {
    pub fn from_config_json(config_json: &Value) -> Result<Self> {
        let mut cfg = PipelineConfig::default();

        if let Some(s) = str_at(config_json, "/store/catalog")? {
            cfg.catalog = s;
        }
        if let Some(v) = config_json.pointer("/store/max_connections") {
            match v.as_u64() {
                Some(n) if n > 0 && n <= u32::MAX as u64 => cfg.max_connections = n as u32,
                _ => bail!("/store/max_connections must be a positive integer, got {v}"),
            }
        }
        if let Some(s) = str_at(config_json, "/deployer/marathon_url")? {
            cfg.marathon_url = s;
        }
        if let Some(s) = str_at(config_json, "/artifacts/snapshot_path")? {
            cfg.snapshot_path = PathBuf::from(s);
        }
        if let Some(s) = str_at(config_json, "/artifacts/compose_path")? {
            cfg.compose_path = PathBuf::from(s);
        }

        if cfg.catalog.trim().is_empty() {
            bail!("/store/catalog must not be empty");
        }
        Ok(cfg)
    }

    /// Apply `DPL_CATALOG` / `DPL_MARATHON_URL` from the process environment.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(|k| std::env::var(k).ok())
    }

    /// Same as [`with_env_overrides`](Self::with_env_overrides) with an
    /// injectable lookup. Empty values are ignored.
    pub fn with_overrides_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(v) = lookup(ENV_CATALOG).filter(|v| !v.trim().is_empty()) {
            debug!(var = ENV_CATALOG, "env override");
            self.catalog = v;
        }
        if let Some(v) = lookup(ENV_MARATHON_URL).filter(|v| !v.trim().is_empty()) {
            debug!(var = ENV_MARATHON_URL, "env override");
            self.marathon_url = v;
        }
        self
    }
}

fn str_at(v: &Value, pointer: &str) -> Result<Option<String>> {
    match v.pointer(pointer) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(other) => bail!("{pointer} must be a string, got {other}"),
    }
}
