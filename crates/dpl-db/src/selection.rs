//! E2E selection policy.
//!
//! Order is per-partition FIFO, partitions concatenated in registry order.
//! No global re-sort by timestamp: the registry's listing order decides
//! which service goes first.

use dpl_schemas::{DeploymentCandidate, Result};
use tracing::debug;

use crate::store::CandidateStore;

pub async fn select_for_e2e<S>(store: &S) -> Result<Vec<DeploymentCandidate>>
where
    S: CandidateStore + ?Sized,
{
    let services = store.tracked_services().await?;

    let mut out = Vec::new();
    for service in &services {
        let found = store.eligible_for_e2e(&service.name).await?;
        debug!(service = %service.name, eligible = found.len(), "e2e partition scanned");
        out.extend(found);
    }

    debug!(services = services.len(), selected = out.len(), "e2e selection complete");
    Ok(out)
}
