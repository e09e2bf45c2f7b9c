//! Pure routing from an action's declared kind to the handler capability.
//!
//! The dispatcher holds no business logic. The raw kind string is parsed
//! into the closed [`ActionKind`] enum here; a parse failure is the one
//! place "unknown kind" exists, and it produces an error result without
//! invoking any handler or touching either document.

use anyhow::Result;
use async_trait::async_trait;

use mindstore_core::action::{ActionKind, ActionResult, ToolAction};
use mindstore_core::document::{Storage, WorkingMemory};

/// The handler capabilities the engine dispatches to, one per kind.
///
/// Handlers may suspend, may mutate either document in place, and may fail;
/// the execution loop converts failures into error-status results.
#[async_trait]
pub trait ToolHandlers: Send + Sync {
    async fn handle_set(
        &self,
        action: &ToolAction,
        working_memory: &mut WorkingMemory,
        storage: &mut Storage,
        index: u64,
    ) -> Result<ActionResult>;

    async fn handle_get(
        &self,
        action: &ToolAction,
        working_memory: &mut WorkingMemory,
        storage: &mut Storage,
        index: u64,
    ) -> Result<ActionResult>;

    async fn handle_rm(
        &self,
        action: &ToolAction,
        working_memory: &mut WorkingMemory,
        storage: &mut Storage,
        index: u64,
    ) -> Result<ActionResult>;

    async fn handle_mv(
        &self,
        action: &ToolAction,
        working_memory: &mut WorkingMemory,
        storage: &mut Storage,
        index: u64,
    ) -> Result<ActionResult>;

    async fn handle_ls(
        &self,
        action: &ToolAction,
        working_memory: &mut WorkingMemory,
        storage: &mut Storage,
        index: u64,
    ) -> Result<ActionResult>;

    async fn handle_search(
        &self,
        action: &ToolAction,
        working_memory: &mut WorkingMemory,
        storage: &mut Storage,
        index: u64,
    ) -> Result<ActionResult>;

    async fn handle_mkdir(
        &self,
        action: &ToolAction,
        working_memory: &mut WorkingMemory,
        storage: &mut Storage,
        index: u64,
    ) -> Result<ActionResult>;
}

/// Route one action to its handler. An unrecognized kind yields an
/// error-status result (`Unknown action kind: <kind>`) with no handler
/// invoked.
pub async fn dispatch(
    handlers: &dyn ToolHandlers,
    action: &ToolAction,
    working_memory: &mut WorkingMemory,
    storage: &mut Storage,
    index: u64,
) -> Result<ActionResult> {
    let kind = match action.kind.parse::<ActionKind>() {
        Ok(kind) => kind,
        Err(unknown) => return Ok(ActionResult::failure(index, action, unknown.to_string())),
    };
    match kind {
        ActionKind::Set => handlers.handle_set(action, working_memory, storage, index).await,
        ActionKind::Get => handlers.handle_get(action, working_memory, storage, index).await,
        ActionKind::Rm => handlers.handle_rm(action, working_memory, storage, index).await,
        ActionKind::Mv => handlers.handle_mv(action, working_memory, storage, index).await,
        ActionKind::Ls => handlers.handle_ls(action, working_memory, storage, index).await,
        ActionKind::Search => {
            handlers.handle_search(action, working_memory, storage, index).await
        }
        ActionKind::Mkdir => handlers.handle_mkdir(action, working_memory, storage, index).await,
    }
}
