//! get: read the value at a storage path into the result payload.

use mindstore_core::action::{ActionResult, ToolAction};
use mindstore_core::document::{PathError, Storage, WorkingMemory};

use crate::error::ToolError;

pub fn handle_get_action(
    action: &ToolAction,
    _working_memory: &mut WorkingMemory,
    storage: &mut Storage,
    index: u64,
) -> Result<ActionResult, ToolError> {
    let value = storage
        .get(&action.target_path)
        .cloned()
        .ok_or_else(|| PathError::NotFound(action.target_path.clone()))?;
    Ok(ActionResult::success(index, action).with_payload("value", value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_get_reads_value_into_payload() {
        let mut wm = WorkingMemory::default();
        let mut storage = Storage::default();
        storage.set("/a", json!([1, 2])).unwrap();
        let action = ToolAction::new("get", "/a");
        let result = handle_get_action(&action, &mut wm, &mut storage, 1).unwrap();
        assert_eq!(result.payload["value"], json!([1, 2]));
    }

    #[test]
    fn test_get_missing_path_fails() {
        let mut wm = WorkingMemory::default();
        let mut storage = Storage::default();
        let action = ToolAction::new("get", "/nope");
        let err = handle_get_action(&action, &mut wm, &mut storage, 1).unwrap_err();
        assert!(matches!(err, ToolError::Path(PathError::NotFound(_))));
    }
}
