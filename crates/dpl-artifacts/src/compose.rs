//! Render artifact: a compose-style manifest of the selected images.

use dpl_schemas::{DeploymentCandidate, PipelineError, Result};
use serde::Serialize;
use std::collections::BTreeMap;

/// Turns a candidate set into the bytes of a render artifact.
pub trait Renderer: Send + Sync {
    /// `EmptyInput` when `candidates` is empty.
    fn render(&self, candidates: &[DeploymentCandidate]) -> Result<Vec<u8>>;
}

#[derive(Debug, Serialize)]
struct ComposeService<'a> {
    image: &'a str,
}

/// YAML mapping of `service_name -> { image }`, keys sorted.
///
/// Several candidates of one service collapse to a single entry; the last one
/// in the input wins.
#[derive(Debug, Clone, Copy, Default)]
pub struct ComposeRenderer;

impl Renderer for ComposeRenderer {
    fn render(&self, candidates: &[DeploymentCandidate]) -> Result<Vec<u8>> {
        if candidates.is_empty() {
            return Err(PipelineError::EmptyInput("compose"));
        }

        let services: BTreeMap<&str, ComposeService<'_>> = candidates
            .iter()
            .map(|c| (c.service_name.as_str(), ComposeService { image: &c.image }))
            .collect();

        let yaml = serde_yaml::to_string(&services)
            .map_err(|e| PipelineError::Serialization(format!("render compose: {e}")))?;
        Ok(yaml.into_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use dpl_schemas::NewCandidate;

    fn cand(service: &str, image: &str) -> DeploymentCandidate {
        let new = NewCandidate {
            service_name: service.to_string(),
            version: "1".to_string(),
            image: image.to_string(),
        };
        DeploymentCandidate::registered(&new, Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap())
    }

    #[test]
    fn renders_sorted_service_map() {
        let out = ComposeRenderer
            .render(&[cand("web", "reg/web:2"), cand("api", "reg/api:7")])
            .unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.find("api:").unwrap() < text.find("web:").unwrap());

        let parsed: serde_yaml::Value = serde_yaml::from_str(&text).unwrap();
        assert_eq!(parsed["api"]["image"], "reg/api:7");
        assert_eq!(parsed["web"]["image"], "reg/web:2");
    }

    #[test]
    fn later_candidate_of_same_service_wins() {
        let out = ComposeRenderer
            .render(&[cand("web", "reg/web:1"), cand("web", "reg/web:2")])
            .unwrap();
        let parsed: serde_yaml::Value = serde_yaml::from_slice(&out).unwrap();
        assert_eq!(parsed["web"]["image"], "reg/web:2");
    }

    #[test]
    fn empty_input_is_rejected() {
        let err = ComposeRenderer.render(&[]).unwrap_err();
        assert!(matches!(err, PipelineError::EmptyInput("compose")));
    }
}
