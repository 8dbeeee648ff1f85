use dpl_artifacts::SnapshotEntry;
use dpl_schemas::PipelineError;
use std::future::Future;

/// Entries a snapshot-consuming command processed, in snapshot order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub applied: Vec<SnapshotEntry>,
}

/// Why a snapshot-consuming command stopped.
///
/// Processing is sequential and halts at the first failing entry. Entries
/// already applied stay applied.
#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    /// The batch never started (snapshot unreadable, bad stage name).
    #[error("batch not started: {0}")]
    Precondition(#[from] PipelineError),

    /// `pass` names the sweep that stopped: a stage name, or `deploy`.
    #[error(
        "{pass} batch halted at service={} version={} after {} applied: {source}",
        .failed.service,
        .failed.version,
        .applied.len()
    )]
    Halted {
        pass: &'static str,
        applied: Vec<SnapshotEntry>,
        failed: SnapshotEntry,
        source: PipelineError,
    },
}

impl BatchError {
    /// The underlying pipeline error, whichever way the batch stopped.
    pub fn cause(&self) -> &PipelineError {
        match self {
            BatchError::Precondition(e) => e,
            BatchError::Halted { source, .. } => source,
        }
    }

    /// Sweep that halted; `None` when the batch never started.
    pub fn pass(&self) -> Option<&'static str> {
        match self {
            BatchError::Precondition(_) => None,
            BatchError::Halted { pass, .. } => Some(pass),
        }
    }

    /// Entries processed before the failure.
    pub fn applied(&self) -> &[SnapshotEntry] {
        match self {
            BatchError::Precondition(_) => &[],
            BatchError::Halted { applied, .. } => applied,
        }
    }
}

/// Run `step` over `entries` in order, stopping at the first error.
pub(crate) async fn run_sequential<F, Fut>(
    pass: &'static str,
    entries: Vec<SnapshotEntry>,
    mut step: F,
) -> Result<BatchReport, BatchError>
where
    F: FnMut(SnapshotEntry) -> Fut,
    Fut: Future<Output = dpl_schemas::Result<()>>,
{
    let mut applied = Vec::with_capacity(entries.len());
    for entry in entries {
        if let Err(source) = step(entry.clone()).await {
            return Err(BatchError::Halted {
                pass,
                applied,
                failed: entry,
                source,
            });
        }
        applied.push(entry);
    }
    Ok(BatchReport { applied })
}
