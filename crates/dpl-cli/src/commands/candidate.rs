use anyhow::Result;
use dpl_config::PipelineConfig;
use dpl_schemas::{NewCandidate, Stage};

use super::{finish, open_controller, print_candidate, require_file, Controller};
use crate::CandidateCmd;

pub async fn run(cmd: CandidateCmd, cfg: &PipelineConfig) -> Result<()> {
    // Preflight before connecting.
    match &cmd {
        CandidateCmd::CompleteStage { stage, .. } => {
            Stage::parse(stage)?;
        }
        CandidateCmd::AttachDescriptor { file, .. } => require_file(file)?,
        _ => {}
    }

    let ctl = open_controller(cfg).await?;
    let outcome = dispatch(&ctl, cmd).await;
    finish(ctl, outcome).await
}

async fn dispatch(ctl: &Controller, cmd: CandidateCmd) -> Result<()> {
    match cmd {
        CandidateCmd::Register {
            service,
            version,
            image,
        } => {
            let c = ctl
                .register_candidate(&NewCandidate {
                    service_name: service,
                    version,
                    image,
                })
                .await?;
            println!("registered=true");
            print_candidate(&c);
        }

        CandidateCmd::CompleteStage {
            service,
            version,
            stage,
        } => {
            let stage = ctl.complete_stage(&service, &version, &stage).await?;
            println!("service={service}");
            println!("version={version}");
            println!("stage_completed={stage}");
        }

        CandidateCmd::AttachDescriptor {
            service,
            version,
            file,
        } => {
            ctl.attach_descriptor(&service, &version, &file).await?;
            println!("descriptor_attached={}", file.display());
        }

        CandidateCmd::Deploy { service, version } => {
            let receipt = ctl.trigger_deployment(&service, &version).await?;
            println!("deployed_app_id={}", receipt.application_id);
            println!("version={version}");
            println!("new_deployment={}", receipt.is_new_deployment);
            println!("deployment_ids={}", receipt.deployment_ids.join(","));
        }

        CandidateCmd::Show { service, version } => {
            let c = ctl.find_candidate(&service, &version).await?;
            print_candidate(&c);
        }
    }
    Ok(())
}
