//! Persistence gateway: load/save primitives for the two documents.
//!
//! Implementations own durability. The engine treats each call as an atomic
//! single-document read or write; there is no locking or versioning at this
//! layer, so callers must serialize batches that touch the same documents.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use thiserror::Error;

use mindstore_core::document::{Storage, WorkingMemory};

const WORKING_MEMORY_FILENAME: &str = "working_memory.json";
const STORAGE_FILENAME: &str = "storage.json";

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("Failed to write {path}: {source}")]
    Write {
        path: String,
        source: std::io::Error,
    },

    #[error("Failed to decode {path}: {source}")]
    Decode {
        path: String,
        source: serde_json::Error,
    },

    #[error("Failed to encode document: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Load/save for working memory and storage. Idempotent single-document
/// primitives; implementations may suspend.
#[async_trait]
pub trait Persistence: Send + Sync {
    async fn load_working_memory(&self) -> Result<WorkingMemory, PersistError>;
    async fn save_working_memory(&self, working_memory: &WorkingMemory)
        -> Result<(), PersistError>;
    async fn load_storage(&self) -> Result<Storage, PersistError>;
    async fn save_storage(&self, storage: &Storage) -> Result<(), PersistError>;
}

/// JSON documents under a data directory. A missing file loads as the empty
/// document.
#[derive(Debug, Clone)]
pub struct FilePersistence {
    dir: PathBuf,
}

impl FilePersistence {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn working_memory_path(&self) -> PathBuf {
        self.dir.join(WORKING_MEMORY_FILENAME)
    }

    pub fn storage_path(&self) -> PathBuf {
        self.dir.join(STORAGE_FILENAME)
    }
}

fn load_doc<T: DeserializeOwned + Default>(path: &Path) -> Result<T, PersistError> {
    if !path.exists() {
        return Ok(T::default());
    }
    let content = std::fs::read_to_string(path).map_err(|source| PersistError::Read {
        path: path.display().to_string(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| PersistError::Decode {
        path: path.display().to_string(),
        source,
    })
}

fn save_doc<T: Serialize>(path: &Path, doc: &T) -> Result<(), PersistError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|source| PersistError::Write {
            path: path.display().to_string(),
            source,
        })?;
    }
    let content = serde_json::to_string_pretty(doc)?;
    std::fs::write(path, content).map_err(|source| PersistError::Write {
        path: path.display().to_string(),
        source,
    })
}

#[async_trait]
impl Persistence for FilePersistence {
    async fn load_working_memory(&self) -> Result<WorkingMemory, PersistError> {
        load_doc(&self.working_memory_path())
    }

    async fn save_working_memory(
        &self,
        working_memory: &WorkingMemory,
    ) -> Result<(), PersistError> {
        save_doc(&self.working_memory_path(), working_memory)
    }

    async fn load_storage(&self) -> Result<Storage, PersistError> {
        load_doc(&self.storage_path())
    }

    async fn save_storage(&self, storage: &Storage) -> Result<(), PersistError> {
        save_doc(&self.storage_path(), storage)
    }
}

/// In-process documents behind mutexes. Test double and embedded-use
/// gateway.
#[derive(Debug, Default)]
pub struct MemoryPersistence {
    working_memory: Mutex<WorkingMemory>,
    storage: Mutex<Storage>,
}

impl MemoryPersistence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the current working memory document.
    pub fn working_memory_snapshot(&self) -> WorkingMemory {
        self.working_memory
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Snapshot of the current storage document.
    pub fn storage_snapshot(&self) -> Storage {
        self.storage
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

#[async_trait]
impl Persistence for MemoryPersistence {
    async fn load_working_memory(&self) -> Result<WorkingMemory, PersistError> {
        Ok(self.working_memory_snapshot())
    }

    async fn save_working_memory(
        &self,
        working_memory: &WorkingMemory,
    ) -> Result<(), PersistError> {
        *self
            .working_memory
            .lock()
            .unwrap_or_else(|e| e.into_inner()) = working_memory.clone();
        Ok(())
    }

    async fn load_storage(&self) -> Result<Storage, PersistError> {
        Ok(self.storage_snapshot())
    }

    async fn save_storage(&self, storage: &Storage) -> Result<(), PersistError> {
        *self.storage.lock().unwrap_or_else(|e| e.into_inner()) = storage.clone();
        Ok(())
    }
}
