//! Result annotation and capture into working memory.
//!
//! The engine is authoritative for a result's identity fields: after
//! dispatch, `kind`, `target_path`, and `source_path` are overwritten with
//! the action's own values, whatever the handler set. Handler-specific data
//! belongs in the payload.

use mindstore_core::action::{ActionResult, ToolAction};
use mindstore_core::document::WorkingMemory;

/// Outcome of one best-effort side effect (result capture, logging).
/// Failures are observable here without being conflated with the action's
/// own status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SideEffectOutcome {
    Ok,
    Failed(String),
}

impl SideEffectOutcome {
    pub fn is_ok(&self) -> bool {
        matches!(self, SideEffectOutcome::Ok)
    }
}

/// Stamp the engine-assigned identity fields onto a result.
pub fn annotate(result: &mut ActionResult, action: &ToolAction) {
    result.kind = action.kind.clone();
    result.target_path = action.target_path.clone();
    if action.source_path.is_some() {
        result.source_path = action.source_path.clone();
    }
}

/// Write a result into `action_result` under the string form of its index.
/// A failure here is captured, never propagated.
pub fn record(
    working_memory: &mut WorkingMemory,
    index: u64,
    result: &ActionResult,
) -> SideEffectOutcome {
    match working_memory.record_result(index, result) {
        Ok(()) => SideEffectOutcome::Ok,
        Err(e) => SideEffectOutcome::Failed(e.to_string()),
    }
}
