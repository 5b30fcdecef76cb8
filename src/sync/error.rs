//! Error types for sync passes

use thiserror::Error;

use crate::listing::ListingError;
use crate::reconcile::ReconcileError;
use crate::schedule::ScheduleError;
use crate::storage::StoreError;

/// Result type for sync operations
pub type SyncResult<T> = Result<T, SyncError>;

/// Errors raised while syncing a channel or a whole pass
#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Listing error: {0}")]
    Listing(#[from] ListingError),

    #[error("Schedule error: {0}")]
    Schedule(#[from] ScheduleError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Reconcile error: {0}")]
    Reconcile(#[from] ReconcileError),
}

impl SyncError {
    /// Precondition-level failures skip the channel rather than fail it
    pub fn is_precondition(&self) -> bool {
        matches!(self, Self::Schedule(e) if e.is_precondition())
    }

    /// Whether a later sync is likely to succeed without intervention
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Listing(ListingError::Io { .. }) => true,
            Self::Store(e) => e.is_recoverable(),
            Self::Reconcile(ReconcileError::BatchFailed { source, .. }) => source.is_recoverable(),
            _ => false,
        }
    }
}
