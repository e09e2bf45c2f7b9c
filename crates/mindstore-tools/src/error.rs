//! Errors shared by the built-in handlers.

use thiserror::Error;

use mindstore_core::document::PathError;

#[derive(Debug, Error)]
pub enum ToolError {
    #[error(transparent)]
    Path(#[from] PathError),

    #[error("Missing required field '{field}' for {kind} action")]
    MissingField {
        kind: &'static str,
        field: &'static str,
    },

    #[error("Empty query for search action")]
    EmptyQuery,
}
