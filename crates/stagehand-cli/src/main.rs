use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use stagehand_core::config::EngineConfig;
use stagehand_core::domain::options::{dry_run, stage};
use stagehand_core::domain::{Experiment, Stage};
use stagehand_core::engine::{AppRegistry, Orchestrator, cancel_pair};
use stagehand_core::impls::ConsoleStatusSink;
use stagehand_core::ports::CommandFinder;

#[derive(Debug, Parser)]
#[command(author, version, about = "Apply lifecycle apps to an experiment", long_about = None)]
struct Cli {
    /// Engine settings (TOML)
    #[arg(long, global = true, env = "STAGEHAND_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Apply default and scenario apps for one stage
    Apply {
        #[arg(long)]
        stage: Stage,

        /// Experiment JSON to read
        #[arg(long)]
        experiment: PathBuf,

        #[arg(long)]
        dry_run: bool,

        /// Where to write the updated experiment (stdout if omitted)
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// List app names a scenario can select
    List,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => EngineConfig::load(path).with_context(|| format!("loading {}", path.display()))?,
        None => EngineConfig::default(),
    };

    match cli.command {
        Commands::Apply {
            stage,
            experiment,
            dry_run,
            output,
        } => apply(config, stage, &experiment, dry_run, output.as_deref()).await,
        Commands::List => list(&config),
    }
}

fn build_registry(config: &EngineConfig, finder: Arc<dyn CommandFinder>) -> Result<AppRegistry> {
    let registry = config
        .registry_builder(finder)
        .context("setting up default apps")?
        .build()
        .context("building app registry")?;
    Ok(registry)
}

async fn apply(
    mut config: EngineConfig,
    stage_: Stage,
    experiment: &Path,
    dry_run_: bool,
    output: Option<&Path>,
) -> Result<()> {
    config.dry_run |= dry_run_;

    let input = std::fs::read(experiment).with_context(|| format!("reading {}", experiment.display()))?;
    let mut exp: Experiment =
        serde_json::from_slice(&input).with_context(|| format!("parsing {}", experiment.display()))?;

    let registry = build_registry(&config, Arc::new(config.command_finder()))?;
    let orchestrator = Orchestrator::new(Arc::new(registry))
        .with_sink(Arc::new(ConsoleStatusSink::stderr()))
        .with_hook_timeout(config.hook_timeout());

    let (handle, token) = cancel_pair();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupt received, cancelling");
            handle.cancel();
        }
    });

    orchestrator
        .apply_apps_with_cancel(&mut exp, [stage(stage_), dry_run(config.dry_run)], token)
        .await?;

    let rendered = serde_json::to_string_pretty(&exp).context("serializing experiment")?;
    match output {
        Some(path) => std::fs::write(path, rendered + "\n").with_context(|| format!("writing {}", path.display()))?,
        None => println!("{rendered}"),
    }
    Ok(())
}

fn list(config: &EngineConfig) -> Result<()> {
    let finder = config.command_finder();
    let registry = build_registry(config, Arc::new(finder.clone()))?;
    for name in registry.names(&finder) {
        println!("{name}");
    }
    Ok(())
}
