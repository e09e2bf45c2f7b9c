//! Action audit trail. Failures here are non-fatal to the batch.

use async_trait::async_trait;
use serde_json::json;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

use mindstore_core::action::{now_millis, ActionResult, ToolAction};

/// Logging collaborator invoked once per (action, result) pair. May suspend,
/// may fail; the execution loop captures failures without aborting.
#[async_trait]
pub trait ActionLogger: Send + Sync {
    async fn log_action(&self, action: &ToolAction, result: &ActionResult) -> anyhow::Result<()>;
}

/// Append-only JSONL audit log: one `{timestamp, action, result}` line per
/// action.
#[derive(Debug, Clone)]
pub struct JsonlActionLogger {
    path: PathBuf,
}

impl JsonlActionLogger {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl ActionLogger for JsonlActionLogger {
    async fn log_action(&self, action: &ToolAction, result: &ActionResult) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        let line = serde_json::to_string(&json!({
            "timestamp": now_millis(),
            "action": action,
            "result": result,
        }))?;
        writeln!(file, "{line}")?;
        Ok(())
    }
}

/// Discards everything. For tests and embedded use without an audit trail.
#[derive(Debug, Clone, Default)]
pub struct NullActionLogger;

#[async_trait]
impl ActionLogger for NullActionLogger {
    async fn log_action(
        &self,
        _action: &ToolAction,
        _result: &ActionResult,
    ) -> anyhow::Result<()> {
        Ok(())
    }
}
