//! Built-in handlers for the seven action kinds, operating on the storage
//! namespace tree.
//!
//! Each handler is a plain function returning `Result<ActionResult,
//! ToolError>`; [`BuiltinHandlers`] adapts them to the engine's
//! [`ToolHandlers`] seam. The engine converts `Err` into error-status
//! results, so handlers report failures by returning them, not by building
//! error results themselves.

pub mod error;
pub mod get;
pub mod ls;
pub mod mkdir;
pub mod mv;
pub mod rm;
pub mod search;
pub mod set;

use anyhow::Result;
use async_trait::async_trait;

use mindstore_core::action::{ActionResult, ToolAction};
use mindstore_core::document::{Storage, WorkingMemory};
use mindstore_executor::ToolHandlers;

pub use error::ToolError;

/// The default handler set wiring every kind to its built-in function.
#[derive(Debug, Clone, Default)]
pub struct BuiltinHandlers;

#[async_trait]
impl ToolHandlers for BuiltinHandlers {
    async fn handle_set(
        &self,
        action: &ToolAction,
        working_memory: &mut WorkingMemory,
        storage: &mut Storage,
        index: u64,
    ) -> Result<ActionResult> {
        Ok(set::handle_set_action(action, working_memory, storage, index)?)
    }

    async fn handle_get(
        &self,
        action: &ToolAction,
        working_memory: &mut WorkingMemory,
        storage: &mut Storage,
        index: u64,
    ) -> Result<ActionResult> {
        Ok(get::handle_get_action(action, working_memory, storage, index)?)
    }

    async fn handle_rm(
        &self,
        action: &ToolAction,
        working_memory: &mut WorkingMemory,
        storage: &mut Storage,
        index: u64,
    ) -> Result<ActionResult> {
        Ok(rm::handle_rm_action(action, working_memory, storage, index)?)
    }

    async fn handle_mv(
        &self,
        action: &ToolAction,
        working_memory: &mut WorkingMemory,
        storage: &mut Storage,
        index: u64,
    ) -> Result<ActionResult> {
        Ok(mv::handle_mv_action(action, working_memory, storage, index)?)
    }

    async fn handle_ls(
        &self,
        action: &ToolAction,
        working_memory: &mut WorkingMemory,
        storage: &mut Storage,
        index: u64,
    ) -> Result<ActionResult> {
        Ok(ls::handle_ls_action(action, working_memory, storage, index)?)
    }

    async fn handle_search(
        &self,
        action: &ToolAction,
        working_memory: &mut WorkingMemory,
        storage: &mut Storage,
        index: u64,
    ) -> Result<ActionResult> {
        Ok(search::handle_search_action(action, working_memory, storage, index)?)
    }

    async fn handle_mkdir(
        &self,
        action: &ToolAction,
        working_memory: &mut WorkingMemory,
        storage: &mut Storage,
        index: u64,
    ) -> Result<ActionResult> {
        Ok(mkdir::handle_mkdir_action(action, working_memory, storage, index)?)
    }
}
