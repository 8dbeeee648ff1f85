//! Stage vocabulary and validation.
//!
//! Callers name stages with free text (CLI flags, batch commands). The only
//! way from that text to a stored column is [`Stage::parse`], so the mutation
//! path can never be pointed at an arbitrary field.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::PipelineError;

/// Deserializes through [`Stage::parse`], so serialized stage names get the
/// same case-insensitive check as CLI input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub enum Stage {
    Unit,
    E2E,
    Completed,
    Succeeded,
    Deployed,
}

impl Stage {
    pub const ALL: [Stage; 5] = [
        Stage::Unit,
        Stage::E2E,
        Stage::Completed,
        Stage::Succeeded,
        Stage::Deployed,
    ];

    /// Canonical display name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Unit => "Unit",
            Stage::E2E => "E2E",
            Stage::Completed => "Completed",
            Stage::Succeeded => "Succeeded",
            Stage::Deployed => "Deployed",
        }
    }

    /// Storage column backing this flag.
    pub fn column(&self) -> &'static str {
        match self {
            Stage::Unit => "unit",
            Stage::E2E => "e2e",
            Stage::Completed => "completed",
            Stage::Succeeded => "succeeded",
            Stage::Deployed => "deployed",
        }
    }

    /// Case-insensitive lookup against the fixed vocabulary.
    ///
    /// No trimming: `" unit"` is rejected just like `"Mwahaha"`.
    pub fn parse(s: &str) -> Result<Self, PipelineError> {
        Stage::ALL
            .into_iter()
            .find(|stage| stage.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| PipelineError::InvalidStage(s.to_string()))
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Stage {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Stage::parse(s)
    }
}

impl TryFrom<String> for Stage {
    type Error = PipelineError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Stage::parse(&s)
    }
}
