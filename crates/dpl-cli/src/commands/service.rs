use anyhow::Result;
use dpl_config::PipelineConfig;
use dpl_db::CandidateStore;
use tracing::info;

use super::open_store;
use crate::ServiceCmd;

pub async fn run(cmd: ServiceCmd, cfg: &PipelineConfig) -> Result<()> {
    let store = open_store(cfg).await?;

    let outcome = match cmd {
        ServiceCmd::Track { name, description } => {
            let r = dpl_db::track_service(store.pool(), store.catalog(), &name, &description).await;
            if r.is_ok() {
                info!(catalog = store.catalog(), service = %name, "service tracked");
                println!("catalog={}", store.catalog());
                println!("tracked={name}");
            }
            r
        }
        ServiceCmd::List => store.tracked_services().await.map(|services| {
            println!("catalog={}", store.catalog());
            println!("services={}", services.len());
            for s in services {
                println!("service={} description={}", s.name, s.description);
            }
        }),
    };

    let closed = store.close().await;
    outcome?;
    closed?;
    Ok(())
}
