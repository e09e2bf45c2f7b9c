//! The two shared documents: transient working memory and the persistent
//! storage namespace tree.
//!
//! Both are JSON documents with typed accessors for the fields the engine
//! depends on and a flattened map escape hatch for everything else.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::action::ActionResult;

/// Errors from `/`-path navigation over the storage tree.
#[derive(Debug, Clone, Error)]
pub enum PathError {
    #[error("Path not found: {0}")]
    NotFound(String),

    #[error("Not a container: {0}")]
    NotAContainer(String),

    #[error("Invalid path: {0}")]
    Invalid(String),
}

/// Per-batch size accounting, overwritten every batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemStat {
    pub working_memory_size: u64,
    pub working_memory_size_hard_limit: u64,
    pub working_memory_children_max: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SystemInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_stat: Option<SystemStat>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Transient per-session document: action results and session statistics
/// accumulate here. Loaded at batch start, mutated in place, saved at end.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorkingMemory {
    /// Index-string -> serialized [`ActionResult`].
    #[serde(default)]
    pub action_result: Map<String, Value>,
    #[serde(default)]
    pub system_info: SystemInfo,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl WorkingMemory {
    /// Store a result under the string form of its index. Last write wins.
    pub fn record_result(
        &mut self,
        index: u64,
        result: &ActionResult,
    ) -> Result<(), serde_json::Error> {
        let value = serde_json::to_value(result)?;
        self.action_result.insert(index.to_string(), value);
        Ok(())
    }

    /// Look up the recorded result for an index.
    pub fn result_at(&self, index: u64) -> Option<&Value> {
        self.action_result.get(&index.to_string())
    }

    /// Drop every recorded result. Nothing else is altered.
    pub fn clear_action_results(&mut self) {
        self.action_result = Map::new();
    }
}

fn split_path(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

/// The agent's persistent namespace: a JSON tree addressed by `/`-separated
/// paths. Object nodes are containers; arrays are addressed by index.
///
/// Arrays are read-only through paths: `get` and `list` accept index
/// segments, but `set` and `remove` treat an array ancestor as a
/// non-container. To mutate an element, rewrite the whole array at its
/// parent path.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Storage {
    pub root: Map<String, Value>,
}

impl Storage {
    /// Read the node at `path`. `None` when any segment is missing.
    pub fn get(&self, path: &str) -> Option<&Value> {
        let segments = split_path(path);
        let (first, rest) = segments.split_first()?;
        let mut current = self.root.get(*first)?;
        for segment in rest {
            current = match current {
                Value::Object(map) => map.get(*segment)?,
                Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
                _ => return None,
            };
        }
        Some(current)
    }

    /// Write `value` at `path`, creating intermediate objects. Fails when an
    /// existing intermediate node is not a container, or the path is empty.
    pub fn set(&mut self, path: &str, value: Value) -> Result<(), PathError> {
        let segments = split_path(path);
        let Some((last, parents)) = segments.split_last() else {
            return Err(PathError::Invalid(path.to_string()));
        };
        let mut node = &mut self.root;
        for (depth, segment) in parents.iter().enumerate() {
            let child = node
                .entry(segment.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            node = match child {
                Value::Object(map) => map,
                _ => {
                    return Err(PathError::NotAContainer(format!(
                        "/{}",
                        parents[..=depth].join("/")
                    )))
                }
            };
        }
        node.insert(last.to_string(), value);
        Ok(())
    }

    /// Remove and return the node at `path`.
    pub fn remove(&mut self, path: &str) -> Result<Value, PathError> {
        let segments = split_path(path);
        let Some((last, parents)) = segments.split_last() else {
            return Err(PathError::Invalid(path.to_string()));
        };
        let mut node = &mut self.root;
        for segment in parents {
            node = match node.get_mut(*segment) {
                Some(Value::Object(map)) => map,
                Some(_) => return Err(PathError::NotAContainer(path.to_string())),
                None => return Err(PathError::NotFound(path.to_string())),
            };
        }
        node.remove(*last)
            .ok_or_else(|| PathError::NotFound(path.to_string()))
    }

    /// Sorted immediate child names at `path`. The root lists top-level keys;
    /// arrays list their index strings.
    pub fn list(&self, path: &str) -> Result<Vec<String>, PathError> {
        if split_path(path).is_empty() {
            let mut keys: Vec<String> = self.root.keys().cloned().collect();
            keys.sort();
            return Ok(keys);
        }
        match self.get(path) {
            Some(Value::Object(map)) => {
                let mut keys: Vec<String> = map.keys().cloned().collect();
                keys.sort();
                Ok(keys)
            }
            Some(Value::Array(items)) => Ok((0..items.len()).map(|i| i.to_string()).collect()),
            Some(_) => Err(PathError::NotAContainer(path.to_string())),
            None => Err(PathError::NotFound(path.to_string())),
        }
    }

    /// Create an empty container at `path`. Returns `false` when a container
    /// already exists there; fails when a non-container node occupies it.
    pub fn make_dir(&mut self, path: &str) -> Result<bool, PathError> {
        if split_path(path).is_empty() {
            return Ok(false);
        }
        match self.get(path) {
            Some(Value::Object(_)) => Ok(false),
            Some(_) => Err(PathError::NotAContainer(path.to_string())),
            None => {
                self.set(path, Value::Object(Map::new()))?;
                Ok(true)
            }
        }
    }

    /// Case-insensitive substring search over key names and string leaves.
    /// Returns sorted, deduplicated paths.
    pub fn search(&self, query: &str) -> Vec<String> {
        let needle = query.to_lowercase();
        let mut hits = Vec::new();
        for (key, value) in &self.root {
            let path = format!("/{key}");
            if key.to_lowercase().contains(&needle) {
                hits.push(path.clone());
            }
            search_value(&path, value, &needle, &mut hits);
        }
        hits.sort();
        hits.dedup();
        hits
    }
}

fn search_value(path: &str, value: &Value, needle: &str, hits: &mut Vec<String>) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                let child_path = format!("{path}/{key}");
                if key.to_lowercase().contains(needle) {
                    hits.push(child_path.clone());
                }
                search_value(&child_path, child, needle, hits);
            }
        }
        Value::Array(items) => {
            for (i, child) in items.iter().enumerate() {
                let child_path = format!("{path}/{i}");
                search_value(&child_path, child, needle, hits);
            }
        }
        Value::String(s) => {
            if s.to_lowercase().contains(needle) {
                hits.push(path.to_string());
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::ToolAction;
    use serde_json::json;

    #[test]
    fn test_set_creates_intermediate_objects() {
        let mut storage = Storage::default();
        storage.set("/a/b/c", json!("x")).unwrap();
        assert_eq!(storage.get("/a/b/c"), Some(&json!("x")));
    }

    #[test]
    fn test_set_through_leaf_fails() {
        let mut storage = Storage::default();
        storage.set("/a", json!(1)).unwrap();
        let err = storage.set("/a/b", json!(2)).unwrap_err();
        assert!(matches!(err, PathError::NotAContainer(_)));
    }

    #[test]
    fn test_remove_missing_is_not_found() {
        let mut storage = Storage::default();
        let err = storage.remove("/nope").unwrap_err();
        assert!(matches!(err, PathError::NotFound(_)));
    }

    #[test]
    fn test_list_root_and_nested() {
        let mut storage = Storage::default();
        storage.set("/b", json!(1)).unwrap();
        storage.set("/a/y", json!(2)).unwrap();
        storage.set("/a/x", json!(3)).unwrap();
        assert_eq!(storage.list("/").unwrap(), vec!["a", "b"]);
        assert_eq!(storage.list("/a").unwrap(), vec!["x", "y"]);
    }

    #[test]
    fn test_list_leaf_is_not_a_container() {
        let mut storage = Storage::default();
        storage.set("/a", json!("leaf")).unwrap();
        assert!(matches!(
            storage.list("/a"),
            Err(PathError::NotAContainer(_))
        ));
    }

    #[test]
    fn test_array_indexing() {
        let mut storage = Storage::default();
        storage.set("/items", json!(["p", "q"])).unwrap();
        assert_eq!(storage.get("/items/1"), Some(&json!("q")));
        assert_eq!(storage.list("/items").unwrap(), vec!["0", "1"]);
    }

    #[test]
    fn test_array_elements_are_readable_but_not_mutable() {
        let mut storage = Storage::default();
        storage.set("/items", json!(["p", "q"])).unwrap();
        assert_eq!(storage.get("/items/0"), Some(&json!("p")));
        assert!(matches!(
            storage.set("/items/0", json!("r")),
            Err(PathError::NotAContainer(_))
        ));
        assert!(matches!(
            storage.remove("/items/0"),
            Err(PathError::NotAContainer(_))
        ));
        // The array itself mutates at its parent path.
        storage.set("/items", json!(["r"])).unwrap();
        assert_eq!(storage.get("/items/0"), Some(&json!("r")));
    }

    #[test]
    fn test_make_dir_idempotent_on_containers() {
        let mut storage = Storage::default();
        assert!(storage.make_dir("/notes").unwrap());
        assert!(!storage.make_dir("/notes").unwrap());
        storage.set("/leaf", json!(1)).unwrap();
        assert!(matches!(
            storage.make_dir("/leaf"),
            Err(PathError::NotAContainer(_))
        ));
    }

    #[test]
    fn test_search_matches_keys_and_string_leaves() {
        let mut storage = Storage::default();
        storage.set("/notes/todo", json!("buy milk")).unwrap();
        storage.set("/misc/x", json!("TODO later")).unwrap();
        let hits = storage.search("todo");
        assert_eq!(hits, vec!["/misc/x", "/notes/todo"]);
    }

    #[test]
    fn test_working_memory_record_and_clear() {
        let mut wm = WorkingMemory::default();
        let action = ToolAction::new("set", "/a");
        let result = ActionResult::success(3, &action);
        wm.record_result(3, &result).unwrap();
        assert!(wm.result_at(3).is_some());
        wm.extra.insert("scratch".to_string(), json!("keep"));
        wm.clear_action_results();
        assert!(wm.action_result.is_empty());
        assert_eq!(wm.extra["scratch"], json!("keep"));
    }

    #[test]
    fn test_working_memory_roundtrips_extra_fields() {
        let raw = json!({
            "action_result": {},
            "system_info": {},
            "scratchpad": {"note": "hi"}
        });
        let wm: WorkingMemory = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(wm.extra["scratchpad"]["note"], json!("hi"));
        let back = serde_json::to_value(&wm).unwrap();
        assert_eq!(back["scratchpad"], raw["scratchpad"]);
    }
}
