//! set: write a value into storage, creating intermediate containers.

use mindstore_core::action::{ActionResult, ToolAction};
use mindstore_core::document::{Storage, WorkingMemory};

use crate::error::ToolError;

pub fn handle_set_action(
    action: &ToolAction,
    _working_memory: &mut WorkingMemory,
    storage: &mut Storage,
    index: u64,
) -> Result<ActionResult, ToolError> {
    let value = action.value.clone().ok_or(ToolError::MissingField {
        kind: "set",
        field: "value",
    })?;
    storage.set(&action.target_path, value)?;
    Ok(ActionResult::success(index, action))
}
