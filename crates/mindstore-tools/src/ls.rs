//! ls: list immediate child names at a storage path.

use serde_json::json;

use mindstore_core::action::{ActionResult, ToolAction};
use mindstore_core::document::{Storage, WorkingMemory};

use crate::error::ToolError;

pub fn handle_ls_action(
    action: &ToolAction,
    _working_memory: &mut WorkingMemory,
    storage: &mut Storage,
    index: u64,
) -> Result<ActionResult, ToolError> {
    let entries = storage.list(&action.target_path)?;
    Ok(ActionResult::success(index, action).with_payload("entries", json!(entries)))
}
