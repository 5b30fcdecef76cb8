//! Unified error handling for the reelsync crate
//!
//! Every module keeps its own error enum. This module folds them into a
//! single [`Error`] for callers that cross module boundaries (the CLI, mostly).
//!
//! # Usage
//!
//! ```rust,ignore
//! use reelsync::error::{Error, ErrorCategory};
//!
//! fn handle_error(err: Error) {
//!     if err.is_recoverable() {
//!         println!("Retrying next pass: {err}");
//!     } else {
//!         eprintln!("Fatal error ({:?}): {err}", err.category());
//!     }
//! }
//! ```

use serde::Serialize;
use thiserror::Error;

pub use crate::listing::ListingError;
pub use crate::models::ProviderDataError;
pub use crate::reconcile::ReconcileError;
pub use crate::schedule::ScheduleError;
pub use crate::storage::StoreError;
pub use crate::sync::SyncError;

/// Classification of errors for handling strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Bad input: empty or zero-length reel, inverted window, bad batch size
    Precondition,
    /// Listing document could not be read or parsed
    Listing,
    /// Provider data blob could not be decoded or encoded
    Parsing,
    /// Store reads and writes
    Storage,
    /// Configuration and validation errors
    Config,
    /// Other/unknown errors
    Other,
}

impl ErrorCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Precondition => "precondition",
            Self::Listing => "listing",
            Self::Parsing => "parsing",
            Self::Storage => "storage",
            Self::Config => "config",
            Self::Other => "other",
        }
    }
}

/// Unified error type for the reelsync crate
#[derive(Error, Debug)]
pub enum Error {
    #[error("Schedule error: {0}")]
    Schedule(#[from] ScheduleError),

    #[error("Reconcile error: {0}")]
    Reconcile(#[from] ReconcileError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Listing error: {0}")]
    Listing(#[from] ListingError),

    #[error("Sync error: {0}")]
    Sync(#[from] SyncError),

    #[error("Provider data error: {0}")]
    ProviderData(#[from] ProviderDataError),

    /// Configuration errors
    #[error("Config error: {0}")]
    Config(String),

    /// Generic error with context
    #[error("{context}")]
    Other {
        context: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl Error {
    /// Check if this error is likely to go away on a later pass
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Store(e) => e.is_recoverable(),
            Self::Sync(e) => e.is_recoverable(),
            Self::Reconcile(ReconcileError::BatchFailed { source, .. }) => source.is_recoverable(),
            Self::Listing(ListingError::Io { .. }) => true,
            Self::Schedule(_)
            | Self::Reconcile(_)
            | Self::Listing(_)
            | Self::ProviderData(_)
            | Self::Config(_)
            | Self::Other { .. } => false,
        }
    }

    /// Get the error category for handling strategies
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Schedule(e) if e.is_precondition() => ErrorCategory::Precondition,
            Self::Schedule(_) | Self::ProviderData(_) => ErrorCategory::Parsing,
            Self::Reconcile(ReconcileError::BatchFailed { .. }) => ErrorCategory::Storage,
            Self::Reconcile(_) => ErrorCategory::Precondition,
            Self::Store(_) => ErrorCategory::Storage,
            Self::Listing(_) => ErrorCategory::Listing,
            Self::Sync(e) => match e {
                SyncError::Listing(_) => ErrorCategory::Listing,
                SyncError::Store(_) => ErrorCategory::Storage,
                SyncError::Reconcile(ReconcileError::BatchFailed { .. }) => ErrorCategory::Storage,
                SyncError::Schedule(s) if !s.is_precondition() => ErrorCategory::Parsing,
                SyncError::Schedule(_) | SyncError::Reconcile(_) => ErrorCategory::Precondition,
            },
            Self::Config(_) => ErrorCategory::Config,
            Self::Other { .. } => ErrorCategory::Other,
        }
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a generic error with context
    pub fn other(context: impl Into<String>) -> Self {
        Self::Other {
            context: context.into(),
            source: None,
        }
    }

    /// Create a generic error with context and source
    pub fn with_source(
        context: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Other {
            context: context.into(),
            source: Some(Box::new(source)),
        }
    }
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Other {
            context: format!("{err:#}"),
            source: None,
        }
    }
}

/// Result type alias using the unified Error type
pub type Result<T> = std::result::Result<T, Error>;
