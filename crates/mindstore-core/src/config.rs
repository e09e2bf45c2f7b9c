//! Configuration: data root resolution and working-memory limits.
//!
//! Limits come from `<data_dir>/config.json` when present; env vars
//! (`MINDSTORE_WORKING_MEMORY_CHARACTER_MAX`, `MINDSTORE_WORKING_MEMORY_CHILDREN_MAX`)
//! override the file. A limit that is absent or zero falls back to the
//! default.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

pub const DEFAULT_CHARACTER_MAX: u64 = 4096;
pub const DEFAULT_CHILDREN_MAX: u64 = 4;

const CONFIG_FILENAME: &str = "config.json";

pub const ENV_DATA_DIR: &str = "MINDSTORE_DATA_DIR";
pub const ENV_CHARACTER_MAX: &str = "MINDSTORE_WORKING_MEMORY_CHARACTER_MAX";
pub const ENV_CHILDREN_MAX: &str = "MINDSTORE_WORKING_MEMORY_CHILDREN_MAX";

/// Resolve the mindstore data root (~/.mindstore, or MINDSTORE_DATA_DIR).
pub fn data_root() -> PathBuf {
    if let Ok(dir) = std::env::var(ENV_DATA_DIR) {
        if !dir.is_empty() {
            return PathBuf::from(dir);
        }
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".mindstore")
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub working_memory_character_max: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub working_memory_children_max: Option<u64>,
    /// Collaborator-owned settings the engine does not interpret.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Config {
    /// Load from `<data_dir>/config.json` (missing file = defaults), then
    /// apply env overrides. A malformed file falls back to defaults, with
    /// the parse error reported on the warn channel.
    pub fn load(data_dir: &Path) -> Result<Self, std::io::Error> {
        let path = data_dir.join(CONFIG_FILENAME);
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            match serde_json::from_str(&content) {
                Ok(config) => config,
                Err(e) => {
                    tracing::warn!(
                        "Malformed config {}: {} - falling back to defaults",
                        path.display(),
                        e
                    );
                    Config::default()
                }
            }
        } else {
            Config::default()
        };
        config.apply_env_overrides();
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if let Some(n) = env_u64(ENV_CHARACTER_MAX) {
            self.working_memory_character_max = Some(n);
        }
        if let Some(n) = env_u64(ENV_CHILDREN_MAX) {
            self.working_memory_children_max = Some(n);
        }
    }

    /// Hard limit on working memory's canonical-text size. Zero counts as
    /// unset.
    pub fn character_max(&self) -> u64 {
        match self.working_memory_character_max {
            Some(n) if n > 0 => n,
            _ => DEFAULT_CHARACTER_MAX,
        }
    }

    /// Maximum child count advisory limit. Zero counts as unset.
    pub fn children_max(&self) -> u64 {
        match self.working_memory_children_max {
            Some(n) if n > 0 => n,
            _ => DEFAULT_CHILDREN_MAX,
        }
    }
}

fn env_u64(key: &str) -> Option<u64> {
    std::env::var(key).ok()?.trim().parse().ok()
}
