//! Configuration for the `dpl` pipeline tool.
//!
//! Two layers:
//! - [`layered`]: merge YAML files in order into one canonical JSON document
//!   and hash it, so every invocation can log exactly which config it ran with.
//! - [`settings`]: read the typed [`PipelineConfig`] out of that document,
//!   then apply environment overrides.

pub mod layered;
pub mod settings;

pub use layered::{load_layered_yaml, load_layered_yaml_from_strings, LoadedConfig};
pub use settings::{
    PipelineConfig, DEFAULT_CATALOG, DEFAULT_COMPOSE_PATH, DEFAULT_MARATHON_URL,
    DEFAULT_SNAPSHOT_PATH, ENV_CATALOG, ENV_MARATHON_URL,
};
