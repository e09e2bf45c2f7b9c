//! Post-batch size accounting for working memory.
//!
//! Advisory only: the engine records the comparison, it never enforces the
//! limit by rejecting actions. Enforcement is a collaborator's concern.

use mindstore_core::canonical;
use mindstore_core::config::Config;
use mindstore_core::document::{SystemStat, WorkingMemory};
use serde_json::Value;

const ROOT_LABEL: &str = "working_memory";

/// Measure working memory's trimmed canonical-text char length and pair it
/// with the configured limits (defaults 4096 / 4 when unset or zero).
pub fn compute_stats(working_memory: &WorkingMemory, config: &Config) -> SystemStat {
    let value = serde_json::to_value(working_memory).unwrap_or(Value::Null);
    SystemStat {
        working_memory_size: canonical::document_size(&value, ROOT_LABEL) as u64,
        working_memory_size_hard_limit: config.character_max(),
        working_memory_children_max: config.children_max(),
    }
}

/// Compute and write the stat record into `system_info.system_stat`,
/// overwriting any prior value.
pub fn apply_stats(working_memory: &mut WorkingMemory, config: &Config) {
    let stat = compute_stats(working_memory, config);
    working_memory.system_info.system_stat = Some(stat);
}
