//! Periodic sync runner
//!
//! Runs a pass every `period` over `[now, now + lookahead]` until shut down.
//! Shutting down cancels the pass in flight at its next safe point.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::time::{interval, MissedTickBehavior};

use super::orchestrator::SyncOrchestrator;
use crate::schedule::TimeWindow;
use crate::utils::CancelToken;

/// Background driver for [`SyncOrchestrator`]
pub struct PeriodicSync {
    orchestrator: Arc<SyncOrchestrator>,
    period: Duration,
    lookahead_ms: i64,
}

impl PeriodicSync {
    pub fn new(orchestrator: Arc<SyncOrchestrator>, period: Duration, lookahead: Duration) -> Self {
        Self {
            orchestrator,
            period,
            lookahead_ms: i64::try_from(lookahead.as_millis()).unwrap_or(i64::MAX),
        }
    }

    /// Run until `shutdown` fires; returns the number of passes started
    pub async fn run(self, shutdown: CancelToken) -> usize {
        let mut ticker = interval(self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut passes = 0;

        tracing::info!(
            period_secs = self.period.as_secs(),
            lookahead_ms = self.lookahead_ms,
            "Periodic sync started"
        );

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if shutdown.is_cancelled() {
                        break;
                    }
                    passes += 1;
                    self.run_once(&shutdown).await;
                }
                _ = shutdown.cancelled() => {
                    break;
                }
            }
        }

        tracing::info!(passes, "Periodic sync shutting down");
        passes
    }

    async fn run_once(&self, shutdown: &CancelToken) {
        let now = Utc::now().timestamp_millis();
        let window = match TimeWindow::starting_at(now, self.lookahead_ms) {
            Ok(window) => window,
            Err(e) => {
                tracing::error!(error = %e, "Invalid periodic sync window");
                return;
            }
        };

        match self.orchestrator.sync(window, shutdown).await {
            Ok(report) if report.is_success() => {
                tracing::info!(
                    operations = report.operations_applied(),
                    "Periodic sync pass completed"
                );
            }
            Ok(report) => {
                tracing::warn!(
                    failed = report.failed(),
                    cancelled = report.cancelled,
                    "Periodic sync pass completed with problems"
                );
            }
            Err(e) => {
                tracing::error!(error = %e, "Periodic sync pass failed");
            }
        }
    }
}
