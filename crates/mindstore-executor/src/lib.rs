pub mod dispatch;
pub mod executor;
pub mod logger;
pub mod persistence;
pub mod recorder;
pub mod sequence;
pub mod stats;

pub use dispatch::ToolHandlers;
pub use executor::{ActionDiagnostics, BatchReport, Executor};
pub use logger::{ActionLogger, JsonlActionLogger, NullActionLogger};
pub use persistence::{FilePersistence, MemoryPersistence, PersistError, Persistence};
pub use recorder::SideEffectOutcome;
pub use sequence::ActionSequencer;
