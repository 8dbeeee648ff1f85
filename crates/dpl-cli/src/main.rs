use anyhow::Result;
use clap::{Parser, Subcommand};
use dpl_config::{load_layered_yaml, LoadedConfig, PipelineConfig};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "dpl")]
#[command(about = "Deployment candidate pipeline CLI", long_about = None)]
struct Cli {
    /// Layered config paths in merge order (later files override earlier ones)
    #[arg(long = "config", global = true)]
    config_paths: Vec<String>,

    /// Tracked-service catalog to select from (overrides config and DPL_CATALOG)
    #[arg(long, global = true)]
    catalog: Option<String>,

    /// Marathon base URL (overrides config and DPL_MARATHON_URL)
    #[arg(long, global = true)]
    marathon: Option<String>,

    /// Snapshot artifact path
    #[arg(long, global = true)]
    snapshot: Option<PathBuf>,

    /// Compose artifact path
    #[arg(long, global = true)]
    compose: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Single-candidate commands
    Candidate {
        #[command(subcommand)]
        cmd: CandidateCmd,
    },

    /// Snapshot batch commands
    Batch {
        #[command(subcommand)]
        cmd: BatchCmd,
    },

    /// Tracked-service registry
    Service {
        #[command(subcommand)]
        cmd: ServiceCmd,
    },

    /// Database commands
    Db {
        #[command(subcommand)]
        cmd: DbCmd,
    },
}

#[derive(Subcommand)]
pub(crate) enum CandidateCmd {
    /// Register a new build as a candidate (all stages pending)
    Register {
        #[arg(long)]
        service: String,
        #[arg(long)]
        version: String,
        /// Container image reference
        #[arg(long)]
        image: String,
    },

    /// Mark one stage complete (Unit | E2E | Completed | Succeeded | Deployed, any case)
    CompleteStage {
        #[arg(long)]
        service: String,
        #[arg(long)]
        version: String,
        #[arg(long)]
        stage: String,
    },

    /// Store a Marathon app descriptor file on the candidate
    AttachDescriptor {
        #[arg(long)]
        service: String,
        #[arg(long)]
        version: String,
        #[arg(long)]
        file: PathBuf,
    },

    /// Deploy one candidate through Marathon and mark it Deployed
    Deploy {
        #[arg(long)]
        service: String,
        #[arg(long)]
        version: String,
    },

    /// Print a candidate
    Show {
        #[arg(long)]
        service: String,
        #[arg(long)]
        version: String,
    },
}

#[derive(Subcommand)]
pub(crate) enum BatchCmd {
    /// Select e2e candidates and write the compose file and snapshot
    Produce,
    /// Deploy every snapshot entry
    Deploy,
    /// Mark every snapshot entry Succeeded
    Accept,
    /// Mark every snapshot entry Completed, then Deployed
    Complete,
}

#[derive(Subcommand)]
pub(crate) enum ServiceCmd {
    /// Add a service to the catalog (or update its description)
    Track {
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "")]
        description: String,
    },
    /// List tracked services in selection order
    List,
}

#[derive(Subcommand)]
pub(crate) enum DbCmd {
    Status,
    /// Apply SQL migrations
    Migrate,
}

fn init_tracing() {
    // stdout carries key=value results; logs go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();
}

fn resolve_settings(cli: &Cli) -> Result<PipelineConfig> {
    let loaded = if cli.config_paths.is_empty() {
        LoadedConfig::empty()?
    } else {
        let path_refs: Vec<&str> = cli.config_paths.iter().map(|s| s.as_str()).collect();
        load_layered_yaml(&path_refs)?
    };
    info!(config_hash = %loaded.config_hash, layers = ?loaded.sources, "config loaded");

    let mut cfg = PipelineConfig::from_config_json(&loaded.config_json)?.with_env_overrides();
    if let Some(v) = &cli.catalog {
        cfg.catalog = v.clone();
    }
    if let Some(v) = &cli.marathon {
        cfg.marathon_url = v.clone();
    }
    if let Some(v) = &cli.snapshot {
        cfg.snapshot_path = v.clone();
    }
    if let Some(v) = &cli.compose {
        cfg.compose_path = v.clone();
    }
    Ok(cfg)
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    init_tracing();

    let cli = Cli::parse();
    let cfg = resolve_settings(&cli)?;

    match cli.cmd {
        Commands::Candidate { cmd } => commands::candidate::run(cmd, &cfg).await,
        Commands::Batch { cmd } => commands::batch::run(cmd, &cfg).await,
        Commands::Service { cmd } => commands::service::run(cmd, &cfg).await,
        Commands::Db { cmd } => commands::db::run(cmd, &cfg).await,
    }
}
