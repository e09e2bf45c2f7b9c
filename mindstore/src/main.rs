mod cli;

use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;

use cli::{Cli, Commands};
use mindstore_core::action::{ResultStatus, ToolAction};
use mindstore_core::config::{self, Config};
use mindstore_core::observability;
use mindstore_executor::{
    ActionSequencer, Executor, FilePersistence, JsonlActionLogger, Persistence,
};
use mindstore_tools::BuiltinHandlers;

/// Wire the engine against a data directory: file-backed documents, JSONL
/// audit log, built-in handlers.
fn build_executor(data_dir: &Path) -> Result<(Executor, Arc<FilePersistence>)> {
    let config = Config::load(data_dir)
        .with_context(|| format!("Failed to load config from {}", data_dir.display()))?;
    let persistence = Arc::new(FilePersistence::new(data_dir));
    let executor = Executor::new(
        ActionSequencer::new(),
        Arc::new(BuiltinHandlers),
        persistence.clone(),
        Arc::new(JsonlActionLogger::new(data_dir.join("actions.jsonl"))),
        config,
    );
    Ok((executor, persistence))
}

#[tokio::main]
async fn main() -> Result<()> {
    observability::init_tracing();
    let cli = Cli::parse();

    let data_dir = cli
        .data_dir
        .map(PathBuf::from)
        .unwrap_or_else(config::data_root);
    let (executor, persistence) = build_executor(&data_dir)?;

    match cli.command {
        Commands::Run { actions_json } => {
            let content = if actions_json == "-" {
                let mut s = String::new();
                std::io::stdin().read_to_string(&mut s)?;
                s
            } else {
                std::fs::read_to_string(&actions_json)
                    .with_context(|| format!("Failed to read actions file: {actions_json}"))?
            };
            let actions: Vec<ToolAction> =
                serde_json::from_str(&content).context("Actions file must be a JSON array")?;
            let report = executor.execute(&actions).await?;

            let working_memory = persistence.load_working_memory().await?;
            for diag in &report.actions {
                let line = working_memory
                    .result_at(diag.action_index)
                    .map(|r| r.to_string())
                    .unwrap_or_default();
                println!("{line}");
            }
            let failed = report
                .actions
                .iter()
                .filter(|d| d.status == ResultStatus::Error)
                .count();
            tracing::info!(
                "Batch complete: {} actions, {} failed",
                report.actions.len(),
                failed
            );
        }
        Commands::ClearResults => {
            executor.clear_action_results().await?;
        }
        Commands::Stats => {
            let working_memory = persistence.load_working_memory().await?;
            match working_memory.system_info.system_stat {
                Some(stat) => println!("{}", serde_json::to_string_pretty(&stat)?),
                None => println!("No statistics recorded yet"),
            }
        }
        Commands::PeekIndex => {
            println!("{}", executor.peek_next_index());
        }
    }

    Ok(())
}
