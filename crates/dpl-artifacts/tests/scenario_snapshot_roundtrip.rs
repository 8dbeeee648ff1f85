//! Snapshot produce -> file -> consume, and the empty-input guard.

use chrono::{Duration, TimeZone, Utc};
use dpl_artifacts::{
    encode_snapshot, read_snapshot, snapshot_entries, write_artifact, ComposeRenderer, Renderer,
    SnapshotEntry,
};
use dpl_schemas::{DeploymentCandidate, NewCandidate, PipelineError};

fn cand(service: &str, version: &str, minute: i64) -> DeploymentCandidate {
    let t0 = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
    DeploymentCandidate::registered(
        &NewCandidate {
            service_name: service.to_string(),
            version: version.to_string(),
            image: format!("reg/{service}:{version}"),
        },
        t0 + Duration::minutes(minute),
    )
}

#[test]
fn only_awaiting_candidates_survive_the_round_trip() -> anyhow::Result<()> {
    let a = cand("alpha", "1", 0);
    let mut b = cand("bravo", "1", 1);
    b.e2e = true;
    let mut c = cand("charlie", "1", 2);
    c.completed = true;
    let d = cand("delta", "1", 3);

    let entries = snapshot_entries(&[a, b, c, d])?;
    assert_eq!(
        entries,
        vec![SnapshotEntry::new("alpha", "1"), SnapshotEntry::new("delta", "1")]
    );

    let dir = tempfile::tempdir()?;
    let path = dir.path().join("candidateSnapper.json");
    write_artifact(&path, &encode_snapshot(&entries)?)?;

    assert_eq!(read_snapshot(&path)?, entries);
    Ok(())
}

#[test]
fn all_filtered_out_is_an_empty_snapshot_not_an_error() -> anyhow::Result<()> {
    let mut done = cand("alpha", "1", 0);
    done.completed = true;
    assert!(snapshot_entries(&[done])?.is_empty());
    Ok(())
}

#[test]
fn empty_input_fails_for_both_artifacts() {
    let err = snapshot_entries(&[]).unwrap_err();
    assert!(matches!(err, PipelineError::EmptyInput(_)));
    assert!(err.to_string().starts_with("no candidates found"));

    let err = ComposeRenderer.render(&[]).unwrap_err();
    assert!(matches!(err, PipelineError::EmptyInput(_)));
}

#[test]
fn reading_an_absent_snapshot_is_missing_artifact() {
    let dir = tempfile::tempdir().unwrap();
    let err = read_snapshot(&dir.path().join("candidateSnapper.json")).unwrap_err();
    assert!(matches!(err, PipelineError::MissingArtifact(_)));
}
