use anyhow::{Context, Result};
use chrono::Utc;

use reelsync::config::Config;
use reelsync::storage::create_sqlite_store;

use super::hours_ms;

/// Drop programs that ended more than `older_than_hours` ago
pub async fn purge(config: Config, older_than_hours: u64) -> Result<()> {
    let store = create_sqlite_store(&config.storage.sqlite_path).with_context(|| {
        format!(
            "Failed to open program store at {}",
            config.storage.sqlite_path.display()
        )
    })?;

    let cutoff = Utc::now()
        .timestamp_millis()
        .saturating_sub(hours_ms(older_than_hours));

    let removed = store
        .purge_ended_before(cutoff)
        .await
        .context("Purge failed")?;

    println!("Removed {removed} program(s) that ended before {cutoff}");
    Ok(())
}
