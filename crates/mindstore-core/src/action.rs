//! Action model: the tool action wire type, the closed kind enum, and the
//! per-action result record.
//!
//! `ToolAction.kind` stays a raw string because actions arrive from an
//! untyped boundary (JSON batches, model output). The dispatcher parses it
//! into [`ActionKind`] with `FromStr`; that parse is the only place an
//! unknown kind can surface.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// The seven recognized action kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    Set,
    Get,
    Rm,
    Mv,
    Ls,
    Search,
    Mkdir,
}

impl ActionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::Set => "set",
            ActionKind::Get => "get",
            ActionKind::Rm => "rm",
            ActionKind::Mv => "mv",
            ActionKind::Ls => "ls",
            ActionKind::Search => "search",
            ActionKind::Mkdir => "mkdir",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raised when a raw kind string is none of the seven recognized kinds.
#[derive(Debug, Clone, Error)]
#[error("Unknown action kind: {0}")]
pub struct UnknownKind(pub String);

impl FromStr for ActionKind {
    type Err = UnknownKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "set" => Ok(ActionKind::Set),
            "get" => Ok(ActionKind::Get),
            "rm" => Ok(ActionKind::Rm),
            "mv" => Ok(ActionKind::Mv),
            "ls" => Ok(ActionKind::Ls),
            "search" => Ok(ActionKind::Search),
            "mkdir" => Ok(ActionKind::Mkdir),
            other => Err(UnknownKind(other.to_string())),
        }
    }
}

/// One validated tool action. Immutable for the duration of a batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolAction {
    /// Raw kind string from the wire; parsed at dispatch time.
    pub kind: String,
    pub target_path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_path: Option<String>,
    /// Value to write (set).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    /// Search query (search).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    /// Kind-specific fields the engine does not interpret.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ToolAction {
    pub fn new(kind: impl Into<String>, target_path: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            target_path: target_path.into(),
            source_path: None,
            value: None,
            query: None,
            extra: Map::new(),
        }
    }
}

/// Outcome discriminator for an action result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultStatus {
    Ok,
    Error,
}

impl fmt::Display for ResultStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResultStatus::Ok => f.write_str("ok"),
            ResultStatus::Error => f.write_str("error"),
        }
    }
}

/// The record produced exactly once per executed action.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionResult {
    pub action_index: u64,
    /// Epoch milliseconds.
    pub timestamp: i64,
    pub kind: String,
    pub target_path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_path: Option<String>,
    pub status: ResultStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Handler-specific payload (read value, listing entries, matches, ...).
    #[serde(flatten)]
    pub payload: Map<String, Value>,
}

impl ActionResult {
    /// Successful result carrying the action's identity fields.
    pub fn success(action_index: u64, action: &ToolAction) -> Self {
        Self {
            action_index,
            timestamp: now_millis(),
            kind: action.kind.clone(),
            target_path: action.target_path.clone(),
            source_path: action.source_path.clone(),
            status: ResultStatus::Ok,
            error: None,
            payload: Map::new(),
        }
    }

    /// Error-status result carrying the action's identity fields.
    pub fn failure(action_index: u64, action: &ToolAction, error: impl Into<String>) -> Self {
        Self {
            action_index,
            timestamp: now_millis(),
            kind: action.kind.clone(),
            target_path: action.target_path.clone(),
            source_path: action.source_path.clone(),
            status: ResultStatus::Error,
            error: Some(error.into()),
            payload: Map::new(),
        }
    }

    /// Attach a handler-specific payload field.
    #[must_use]
    pub fn with_payload(mut self, key: impl Into<String>, value: Value) -> Self {
        self.payload.insert(key.into(), value);
        self
    }
}

/// Current time as epoch milliseconds.
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
