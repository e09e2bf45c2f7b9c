//! Global action index as an explicit handle.
//!
//! Replaces a process-wide mutable counter with a cloneable sequencer owned
//! by the execution context. Clones share one atomic sequence, so every
//! executor holding a clone issues unique, strictly increasing indices,
//! including across concurrent batches. Not persisted across process
//! restarts.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

#[derive(Debug, Clone, Default)]
pub struct ActionSequencer {
    /// Last issued index; 0 means nothing issued yet.
    last: Arc<AtomicU64>,
}

impl ActionSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sequencer whose first issued index will be `first`. For deterministic
    /// tests.
    pub fn starting_at(first: u64) -> Self {
        Self {
            last: Arc::new(AtomicU64::new(first.saturating_sub(1))),
        }
    }

    /// Issue the next index. Never reused, never decreasing.
    pub fn next(&self) -> u64 {
        self.last.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Most recently issued index (0 before the first `next`).
    pub fn current(&self) -> u64 {
        self.last.load(Ordering::SeqCst)
    }

    /// Index the next `next()` call would issue, without issuing it.
    pub fn peek_next(&self) -> u64 {
        self.current() + 1
    }

    /// Test-support: rewind to the initial state. Does not touch persisted
    /// documents.
    pub fn reset(&self) {
        self.last.store(0, Ordering::SeqCst);
    }
}
