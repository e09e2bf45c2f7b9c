//! search: case-insensitive substring search over storage keys and string
//! leaves.

use serde_json::json;

use mindstore_core::action::{ActionResult, ToolAction};
use mindstore_core::document::{Storage, WorkingMemory};

use crate::error::ToolError;

pub fn handle_search_action(
    action: &ToolAction,
    _working_memory: &mut WorkingMemory,
    storage: &mut Storage,
    index: u64,
) -> Result<ActionResult, ToolError> {
    let query = action.query.as_deref().ok_or(ToolError::MissingField {
        kind: "search",
        field: "query",
    })?;
    if query.trim().is_empty() {
        return Err(ToolError::EmptyQuery);
    }
    let matches = storage.search(query);
    Ok(ActionResult::success(index, action).with_payload("matches", json!(matches)))
}
