//! Error types for reconciliation

use thiserror::Error;

use crate::storage::StoreError;

/// Result type for reconciliation
pub type ReconcileResult<T> = Result<T, ReconcileError>;

/// Reconciliation errors
#[derive(Error, Debug)]
pub enum ReconcileError {
    /// Batch size must allow at least one operation per flush
    #[error("Batch size must be greater than 0")]
    InvalidBatchSize,

    /// A persisted program was handed over without its store id
    #[error("Persisted program '{title}' at {start_ms} has no store id")]
    MissingStoreId { title: String, start_ms: i64 },

    /// A batch failed to apply; earlier batches stay committed
    #[error("Batch failed after {batches_applied} applied batches: {source}")]
    BatchFailed {
        batches_applied: usize,
        #[source]
        source: StoreError,
    },
}
