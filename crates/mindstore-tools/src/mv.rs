//! mv: move a node from source_path to target_path.

use mindstore_core::action::{ActionResult, ToolAction};
use mindstore_core::document::{Storage, WorkingMemory};

use crate::error::ToolError;

pub fn handle_mv_action(
    action: &ToolAction,
    _working_memory: &mut WorkingMemory,
    storage: &mut Storage,
    index: u64,
) -> Result<ActionResult, ToolError> {
    let source = action.source_path.as_deref().ok_or(ToolError::MissingField {
        kind: "mv",
        field: "source_path",
    })?;
    let value = storage.remove(source)?;
    storage.set(&action.target_path, value)?;
    Ok(ActionResult::success(index, action))
}
