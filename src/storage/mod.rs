//! Persisted program stores
//!
//! This module provides the store abstraction the reconciler writes to,
//! decoupling the diff/merge engine from any persistence layer:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                 SyncOrchestrator / Reconciler               │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      ProgramStore trait                     │
//! │   query_persisted_programs · apply_batch · purge_ended_before│
//! └─────────────────────────────────────────────────────────────┘
//!                  │                               │
//!                  ▼                               ▼
//!        ┌─────────────────┐             ┌─────────────────┐
//!        │     SQLite      │             │    In-memory    │
//!        │  Implementation │             │  Implementation │
//!        └─────────────────┘             └─────────────────┘
//! ```
//!
//! Every `apply_batch` call is atomic: either all operations of the batch
//! are applied or none are.

pub mod error;
pub mod memory;
pub mod sqlite;

use std::sync::Arc;

use async_trait::async_trait;

use crate::models::{EpochMillis, Program, ProgramOperation};

pub use error::{StoreError, StoreResult};
pub use memory::MemoryProgramStore;
pub use sqlite::SqliteProgramStore;

/// Store holding the materialized programs of every channel
#[async_trait]
pub trait ProgramStore: Send + Sync {
    /// Programs of `channel_id`, sorted ascending by start time, with ids
    async fn query_persisted_programs(&self, channel_id: i64) -> StoreResult<Vec<Program>>;

    /// Apply `ops` in order as one atomic unit
    async fn apply_batch(&self, ops: &[ProgramOperation]) -> StoreResult<()>;

    /// Retention: delete every program with `end <= cutoff`, returning the count
    async fn purge_ended_before(&self, cutoff: EpochMillis) -> StoreResult<usize>;
}

/// Thread-safe shared store
pub type SharedProgramStore = Arc<dyn ProgramStore>;

/// Open a shared SQLite store
pub fn create_sqlite_store(path: impl AsRef<std::path::Path>) -> StoreResult<SharedProgramStore> {
    Ok(Arc::new(SqliteProgramStore::new(path)?))
}

/// Create a shared in-memory store
pub fn create_memory_store() -> SharedProgramStore {
    Arc::new(MemoryProgramStore::new())
}
