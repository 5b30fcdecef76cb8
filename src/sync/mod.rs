//! Sync orchestration
//!
//! Ties the pieces together for a set of channels and a time window:
//!
//! ```text
//! ListingSource ──▶ ScheduleWindowGenerator ──▶ ProgramReconciler ──▶ ProgramStore
//!   (reel)             (materialized list)         (batched ops)        (apply_batch)
//! ```
//!
//! # Modules
//!
//! - [`orchestrator`] - sequential per-channel pass with cooperative cancellation
//! - [`periodic`] - interval-driven passes over a rolling window
//! - [`report`] - per-channel outcomes and progress events
//! - [`error`] - sync error taxonomy
//!
//! # Cancellation
//!
//! The token is checked before each channel and before each batch flush.
//! Work already applied stays applied; cancellation only stops forward
//! progress.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use reelsync::listing::StaticListingSource;
//! use reelsync::reconcile::ProgramReconciler;
//! use reelsync::schedule::TimeWindow;
//! use reelsync::storage::MemoryProgramStore;
//! use reelsync::sync::SyncOrchestrator;
//! use reelsync::utils::cancellation;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let listing = StaticListingSource::from_json_file("listing.json")?;
//! let orchestrator = SyncOrchestrator::new(
//!     Arc::new(listing),
//!     Arc::new(MemoryProgramStore::new()),
//!     ProgramReconciler::default(),
//! );
//!
//! let (_handle, token) = cancellation();
//! let report = orchestrator.sync(TimeWindow::new(0, 3_600_000)?, &token).await?;
//! println!("applied {} operations", report.operations_applied());
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod orchestrator;
pub mod periodic;
pub mod report;

pub use error::{SyncError, SyncResult};
pub use orchestrator::SyncOrchestrator;
pub use periodic::PeriodicSync;
pub use report::{ChannelOutcome, ChannelReport, SyncEvent, SyncReport};
