//! In-process stand-ins for the pipeline's capability traits, plus helpers
//! shared by the scenario tests under `tests/`.

mod deployer;
mod memory;

pub use deployer::{RecordingDeployer, StaticRenderer};
pub use memory::InMemoryCandidateStore;

use chrono::{DateTime, Duration, TimeZone, Utc};
use dpl_schemas::{DeploymentCandidate, NewCandidate};

/// Minimal valid Marathon descriptor for `app_id`.
pub fn marathon_descriptor(app_id: &str, image: &str) -> String {
    serde_json::json!({
        "id": app_id,
        "instances": 1,
        "cpus": 0.5,
        "mem": 128.0,
        "container": { "type": "DOCKER", "docker": { "image": image } }
    })
    .to_string()
}

pub fn new_candidate(service: &str, version: &str) -> NewCandidate {
    NewCandidate {
        service_name: service.to_string(),
        version: version.to_string(),
        image: format!("registry.local/{service}:{version}"),
    }
}

/// Fixed base instant for seeded candidates.
pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0)
        .single()
        .unwrap_or_else(Utc::now)
}

/// A registered candidate started `minutes` after [`t0`].
pub fn candidate_at(service: &str, version: &str, minutes: i64) -> DeploymentCandidate {
    DeploymentCandidate::registered(&new_candidate(service, version), t0() + Duration::minutes(minutes))
}

/// Unit-tested, descriptor-carrying candidate: eligible for e2e selection.
pub fn eligible_at(service: &str, version: &str, minutes: i64) -> DeploymentCandidate {
    let mut c = candidate_at(service, version, minutes);
    c.unit = true;
    c.marathon_spec = marathon_descriptor(&format!("/{service}"), &c.image);
    c
}
