//! Per-channel sync driver
//!
//! For every channel: fetch the reel, materialize it for the window, read
//! what the store already holds, and reconcile. Channels run one after the
//! other so store writes keep a predictable order.

use std::sync::Arc;

use tokio::sync::{broadcast, Mutex};

use super::error::{SyncError, SyncResult};
use super::report::{ChannelOutcome, ChannelReport, SyncEvent, SyncReport};
use crate::error::Error;
use crate::listing::SharedListingSource;
use crate::metrics;
use crate::models::Channel;
use crate::reconcile::{ProgramReconciler, ReconcileSummary};
use crate::schedule::{ScheduleWindowGenerator, TimeWindow};
use crate::storage::SharedProgramStore;
use crate::utils::CancelToken;

/// Capacity of the progress event channel
const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Drives listing → generator → reconciler → store for a set of channels
pub struct SyncOrchestrator {
    listing: SharedListingSource,
    store: SharedProgramStore,
    generator: ScheduleWindowGenerator,
    reconciler: ProgramReconciler,
    events: broadcast::Sender<SyncEvent>,
    /// Serializes passes so no two reconcile the same channel at once
    in_flight: Mutex<()>,
}

impl SyncOrchestrator {
    pub fn new(
        listing: SharedListingSource,
        store: SharedProgramStore,
        reconciler: ProgramReconciler,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            listing,
            store,
            generator: ScheduleWindowGenerator::new(),
            reconciler,
            events,
            in_flight: Mutex::new(()),
        }
    }

    /// Wrap in an `Arc` for sharing with background tasks
    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// Subscribe to progress events of subsequent passes
    pub fn subscribe(&self) -> broadcast::Receiver<SyncEvent> {
        self.events.subscribe()
    }

    pub fn store(&self) -> &SharedProgramStore {
        &self.store
    }

    /// Sync every channel the listing source announces
    pub async fn sync(&self, window: TimeWindow, cancel: &CancelToken) -> SyncResult<SyncReport> {
        self.run(None, window, cancel).await
    }

    /// Sync only the channels whose ids are in `channel_ids`
    pub async fn sync_channels(
        &self,
        channel_ids: &[i64],
        window: TimeWindow,
        cancel: &CancelToken,
    ) -> SyncResult<SyncReport> {
        self.run(Some(channel_ids), window, cancel).await
    }

    async fn run(
        &self,
        filter: Option<&[i64]>,
        window: TimeWindow,
        cancel: &CancelToken,
    ) -> SyncResult<SyncReport> {
        let _guard = self.in_flight.lock().await;
        let _timer = metrics::start_sync_timer();

        let mut channels = match self.listing.channels().await {
            Ok(channels) => channels,
            Err(e) => {
                tracing::error!(error = %e, "Failed to list channels");
                self.emit(SyncEvent::Failed {
                    reason: e.to_string(),
                });
                return Err(e.into());
            }
        };

        if let Some(ids) = filter {
            for id in ids.iter().filter(|id| !channels.iter().any(|c| c.id == **id)) {
                tracing::warn!(channel_id = id, "Requested channel not in listing");
            }
            channels.retain(|c| ids.contains(&c.id));
        }

        let total = channels.len();
        tracing::info!(channels = total, window = %window, "Starting sync pass");
        self.emit(SyncEvent::Started {
            total_channels: total,
        });

        let mut report = SyncReport::new(window);
        for (index, channel) in channels.iter().enumerate() {
            if cancel.is_cancelled() {
                report.cancelled = true;
                report.not_reached = total - index;
                tracing::info!(remaining = report.not_reached, "Sync pass cancelled");
                break;
            }

            let channel_report = self.sync_channel(channel, window, cancel).await;
            metrics::record_channel_outcome(channel_report.outcome.label());
            self.emit(SyncEvent::ChannelScanned {
                index,
                total,
                channel_id: channel.id,
                status: channel_report.outcome.label(),
            });

            let cancelled = matches!(channel_report.outcome, ChannelOutcome::Cancelled(_));
            report.channels.push(channel_report);
            if cancelled {
                report.cancelled = true;
                report.not_reached = total - index - 1;
                break;
            }
        }

        tracing::info!(
            synced = report.synced(),
            skipped = report.skipped(),
            failed = report.failed(),
            operations = report.operations_applied(),
            cancelled = report.cancelled,
            "Sync pass finished"
        );
        self.emit(SyncEvent::Finished {
            synced: report.synced(),
            skipped: report.skipped(),
            failed: report.failed(),
            cancelled: report.cancelled,
        });

        Ok(report)
    }

    /// Sync one channel, folding its errors into the outcome
    async fn sync_channel(
        &self,
        channel: &Channel,
        window: TimeWindow,
        cancel: &CancelToken,
    ) -> ChannelReport {
        let mut generated = 0;
        let result = self
            .try_sync_channel(channel, window, cancel, &mut generated)
            .await;

        let outcome = match result {
            Ok(summary) if summary.cancelled => ChannelOutcome::Cancelled(summary),
            Ok(summary) => {
                tracing::debug!(
                    channel_id = channel.id,
                    inserted = summary.inserted,
                    updated = summary.updated,
                    deleted = summary.deleted,
                    unchanged = summary.unchanged,
                    "Channel synced"
                );
                ChannelOutcome::Synced(summary)
            }
            Err(e) if e.is_precondition() => {
                tracing::warn!(channel_id = channel.id, reason = %e, "Channel skipped");
                ChannelOutcome::Skipped {
                    reason: e.to_string(),
                }
            }
            Err(e) => {
                let error = e.to_string();
                let err = Error::from(e);
                let category = err.category();
                tracing::error!(
                    channel_id = channel.id,
                    error = %error,
                    category = category.as_str(),
                    "Channel sync failed"
                );
                ChannelOutcome::Failed {
                    error,
                    recoverable: err.is_recoverable(),
                    category,
                }
            }
        };

        ChannelReport {
            channel_id: channel.id,
            display_name: channel.display_name.clone(),
            generated,
            outcome,
        }
    }

    async fn try_sync_channel(
        &self,
        channel: &Channel,
        window: TimeWindow,
        cancel: &CancelToken,
        generated: &mut usize,
    ) -> Result<ReconcileSummary, SyncError> {
        let reel = self.listing.programs_for_channel(channel, window).await?;
        let incoming = self
            .generator
            .generate(channel.id, &reel, channel.repeatable, window)?;
        *generated = incoming.len();

        let existing = self.store.query_persisted_programs(channel.id).await?;
        let summary = self
            .reconciler
            .reconcile(self.store.as_ref(), &existing, &incoming, cancel)
            .await?;

        Ok(summary)
    }

    fn emit(&self, event: SyncEvent) {
        // no subscribers is fine
        let _ = self.events.send(event);
    }
}
