//! reelsync - Program schedule materializer for TV-style channel listings
//!
//! Turns each channel's template reel into concrete, time-stamped programs
//! over a time window and keeps a persistent program store in step with it.
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - [`config`] - Configuration management and settings
//! - [`models`] - Channels, programs, advertisements and store operations
//! - [`schedule`] - Window materialization of template reels
//! - [`reconcile`] - Diffing materialized programs against the store
//! - [`storage`] - Program stores (SQLite, in-memory)
//! - [`listing`] - Where channels and reels come from
//! - [`sync`] - Per-channel sync passes, periodic runner, progress events
//! - [`metrics`] - Prometheus metrics
//! - [`utils`] - Cancellation
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use reelsync::config::Config;
//! use reelsync::listing::StaticListingSource;
//! use reelsync::reconcile::ProgramReconciler;
//! use reelsync::schedule::TimeWindow;
//! use reelsync::storage::create_sqlite_store;
//! use reelsync::sync::SyncOrchestrator;
//! use reelsync::utils::CancelToken;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env()?;
//!     let listing = Arc::new(StaticListingSource::from_json_file(&config.listing.path)?);
//!     let store = create_sqlite_store(&config.storage.sqlite_path)?;
//!     let reconciler = ProgramReconciler::new(config.sync.batch_size)?;
//!
//!     let orchestrator = SyncOrchestrator::new(listing, store, reconciler);
//!     let now = chrono::Utc::now().timestamp_millis();
//!     let window = TimeWindow::starting_at(now, 60 * 60 * 1000)?;
//!     let report = orchestrator.sync(window, &CancelToken::never()).await?;
//!     println!("{} channels synced", report.synced());
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod listing;
pub mod metrics;
pub mod models;
pub mod reconcile;
pub mod schedule;
pub mod storage;
pub mod sync;
pub mod utils;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::Config;
    pub use crate::error::{Error, ErrorCategory, Result};
    pub use crate::listing::{ListingSource, StaticListingSource};
    pub use crate::models::{Advertisement, Channel, Program, ProgramOperation, ProviderData};
    pub use crate::reconcile::{ProgramReconciler, ReconcileSummary};
    pub use crate::schedule::{ScheduleWindowGenerator, TimeWindow};
    pub use crate::storage::{ProgramStore, SharedProgramStore};
    pub use crate::sync::{PeriodicSync, SyncOrchestrator, SyncReport};
    pub use crate::utils::{cancellation, CancelHandle, CancelToken};
}

// Direct re-exports for convenience
pub use models::{Channel, Program, ProgramOperation};
