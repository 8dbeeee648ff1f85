use anyhow::Result;
use dpl_config::PipelineConfig;
use dpl_runtime::{BatchError, BatchReport};

use super::{finish, open_controller, print_entries, require_file, Controller};
use crate::BatchCmd;

pub async fn run(cmd: BatchCmd, cfg: &PipelineConfig) -> Result<()> {
    if !matches!(cmd, BatchCmd::Produce) {
        require_file(&cfg.snapshot_path)?;
    }

    let ctl = open_controller(cfg).await?;
    let outcome = dispatch(&ctl, cmd).await;
    finish(ctl, outcome).await
}

async fn dispatch(ctl: &Controller, cmd: BatchCmd) -> Result<()> {
    match cmd {
        BatchCmd::Produce => {
            let produced = ctl.produce_batch_artifacts().await?;
            println!("selected={}", produced.selected);
            println!("snapshot_entries={}", produced.entries.len());
            println!("snapshot_path={}", produced.paths.snapshot.display());
            println!("compose_path={}", produced.paths.compose.display());
            print_entries("entry", &produced.entries);
            Ok(())
        }
        BatchCmd::Deploy => report("deploy", ctl.deploy_snapshot().await),
        BatchCmd::Accept => report("accept", ctl.accept_snapshot().await),
        BatchCmd::Complete => report("complete", ctl.complete_snapshot().await),
    }
}

/// Print what was applied; on a halted batch also name the failing entry.
fn report(op: &str, outcome: std::result::Result<BatchReport, BatchError>) -> Result<()> {
    println!("batch={op}");
    match outcome {
        Ok(r) => {
            println!("applied_count={}", r.applied.len());
            print_entries("applied", &r.applied);
            Ok(())
        }
        Err(e) => {
            println!("applied_count={}", e.applied().len());
            print_entries("applied", e.applied());
            if let BatchError::Halted { pass, failed, .. } = &e {
                println!("halted_pass={pass}");
                println!("failed={}@{}", failed.service, failed.version);
            }
            Err(e.into())
        }
    }
}
