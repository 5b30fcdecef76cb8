//! Error types for program stores

use thiserror::Error;

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors raised by a [`ProgramStore`](super::ProgramStore)
#[derive(Error, Debug)]
pub enum StoreError {
    /// A batch could not be applied; nothing from that batch was kept
    #[error("Failed to apply batch: {reason}")]
    Write { reason: String },

    /// Persisted programs could not be read
    #[error("Failed to query programs for channel {channel_id}: {reason}")]
    Read { channel_id: i64, reason: String },

    /// Underlying SQLite failure
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Filesystem failure preparing the database location
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Column (de)serialization failure
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A previous panic poisoned the store lock
    #[error("Store lock poisoned")]
    Poisoned,

    /// The blocking task running the statement panicked or was cancelled
    #[error("Store task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl StoreError {
    pub fn write(reason: impl Into<String>) -> Self {
        Self::Write {
            reason: reason.into(),
        }
    }

    pub fn read(channel_id: i64, reason: impl Into<String>) -> Self {
        Self::Read {
            channel_id,
            reason: reason.into(),
        }
    }

    /// Transient failures worth retrying on the next sync
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::Write { .. } | Self::Read { .. } | Self::Sqlite(_)
        )
    }
}

impl<T> From<std::sync::PoisonError<T>> for StoreError {
    fn from(_: std::sync::PoisonError<T>) -> Self {
        Self::Poisoned
    }
}
