use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::stage::Stage;

/// A service partition the pipeline is allowed to operate on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackedService {
    pub name: String,
    pub description: String,
}

impl TrackedService {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
        }
    }
}

/// Registration input. Everything else about a new candidate is defaulted
/// by the store (flags false, `started_at_utc = now`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCandidate {
    pub service_name: String,
    pub version: String,
    pub image: String,
}

/// One build of one service moving through the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentCandidate {
    pub service_name: String,
    pub version: String,
    pub image: String,
    pub started_at_utc: DateTime<Utc>,
    /// Opaque Marathon application descriptor; empty until attached.
    pub marathon_spec: String,
    /// Reserved. Never read by pipeline logic.
    pub marathon_version: String,
    pub unit: bool,
    pub e2e: bool,
    pub completed: bool,
    pub succeeded: bool,
    pub deployed: bool,
}

impl DeploymentCandidate {
    /// Fresh candidate as registration creates it.
    pub fn registered(new: &NewCandidate, started_at_utc: DateTime<Utc>) -> Self {
        Self {
            service_name: new.service_name.clone(),
            version: new.version.clone(),
            image: new.image.clone(),
            started_at_utc,
            marathon_spec: String::new(),
            marathon_version: String::new(),
            unit: false,
            e2e: false,
            completed: false,
            succeeded: false,
            deployed: false,
        }
    }

    pub fn stage(&self, stage: Stage) -> bool {
        match stage {
            Stage::Unit => self.unit,
            Stage::E2E => self.e2e,
            Stage::Completed => self.completed,
            Stage::Succeeded => self.succeeded,
            Stage::Deployed => self.deployed,
        }
    }

    /// Set one flag. Flags only ever move to `true`.
    pub fn mark(&mut self, stage: Stage) {
        match stage {
            Stage::Unit => self.unit = true,
            Stage::E2E => self.e2e = true,
            Stage::Completed => self.completed = true,
            Stage::Succeeded => self.succeeded = true,
            Stage::Deployed => self.deployed = true,
        }
    }

    pub fn has_spec(&self) -> bool {
        !self.marathon_spec.is_empty()
    }

    /// Passed unit tests and carries a descriptor.
    pub fn is_e2e_eligible(&self) -> bool {
        self.unit && self.has_spec()
    }

    /// Neither validated end-to-end nor finalized.
    pub fn awaiting_validation(&self) -> bool {
        !self.e2e && !self.completed
    }
}
