pub mod inspect;
pub mod purge;
pub mod sync;

use std::sync::Arc;

use anyhow::{Context, Result};

use reelsync::config::Config;
use reelsync::listing::StaticListingSource;
use reelsync::reconcile::ProgramReconciler;
use reelsync::storage::create_sqlite_store;
use reelsync::sync::SyncOrchestrator;

// Re-export command functions for convenience
pub use inspect::{generate, now_playing, GenerateParams};
pub use purge::purge;
pub use sync::{sync, watch};

/// Wire listing, store and reconciler from configuration
pub(crate) fn build_orchestrator(config: &Config) -> Result<SyncOrchestrator> {
    let listing = StaticListingSource::from_json_file(&config.listing.path)
        .context("Failed to load listing")?;
    let store = create_sqlite_store(&config.storage.sqlite_path).with_context(|| {
        format!(
            "Failed to open program store at {}",
            config.storage.sqlite_path.display()
        )
    })?;
    let reconciler = ProgramReconciler::new(config.sync.batch_size)?;

    Ok(SyncOrchestrator::new(Arc::new(listing), store, reconciler))
}

pub(crate) fn duration_ms(duration: std::time::Duration) -> i64 {
    i64::try_from(duration.as_millis()).unwrap_or(i64::MAX)
}

/// Whole hours from the command line as milliseconds, saturating at `i64::MAX`
pub(crate) fn hours_ms(hours: u64) -> i64 {
    i64::try_from(hours)
        .unwrap_or(i64::MAX)
        .saturating_mul(60 * 60 * 1000)
}
