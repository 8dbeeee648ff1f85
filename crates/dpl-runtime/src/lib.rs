//! Pipeline command layer: one controller that wires a candidate store, a
//! deployer and a renderer to the batch artifacts on disk.

mod batch;
mod controller;

pub use batch::{BatchError, BatchReport};
pub use controller::{PipelineController, ProducedArtifacts};
