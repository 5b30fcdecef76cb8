//! Sync reports and progress events

use serde::Serialize;

use crate::error::ErrorCategory;
use crate::reconcile::ReconcileSummary;
use crate::schedule::TimeWindow;

/// What happened to one channel during a pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ChannelOutcome {
    Synced(ReconcileSummary),
    /// Precondition failure; the channel cannot be scheduled as listed
    Skipped { reason: String },
    Failed {
        error: String,
        recoverable: bool,
        category: ErrorCategory,
    },
    /// Pass was cancelled while this channel was being reconciled
    Cancelled(ReconcileSummary),
}

impl ChannelOutcome {
    /// Label used in logs and metrics
    pub fn label(&self) -> &'static str {
        match self {
            Self::Synced(_) => "synced",
            Self::Skipped { .. } => "skipped",
            Self::Failed { .. } => "failed",
            Self::Cancelled(_) => "cancelled",
        }
    }

    pub fn summary(&self) -> Option<&ReconcileSummary> {
        match self {
            Self::Synced(s) | Self::Cancelled(s) => Some(s),
            _ => None,
        }
    }
}

/// Per-channel entry of a [`SyncReport`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChannelReport {
    pub channel_id: i64,
    pub display_name: String,
    /// Programs materialized for the window
    pub generated: usize,
    pub outcome: ChannelOutcome,
}

/// Result of a whole sync pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    pub window: TimeWindow,
    pub channels: Vec<ChannelReport>,
    /// Channels announced but not reached because of cancellation
    pub not_reached: usize,
    pub cancelled: bool,
}

impl SyncReport {
    pub(crate) fn new(window: TimeWindow) -> Self {
        Self {
            window,
            channels: Vec::new(),
            not_reached: 0,
            cancelled: false,
        }
    }

    fn count(&self, label: &str) -> usize {
        self.channels
            .iter()
            .filter(|c| c.outcome.label() == label)
            .count()
    }

    pub fn synced(&self) -> usize {
        self.count("synced")
    }

    pub fn skipped(&self) -> usize {
        self.count("skipped")
    }

    pub fn failed(&self) -> usize {
        self.count("failed")
    }

    /// Operations applied across all channels
    pub fn operations_applied(&self) -> usize {
        self.channels
            .iter()
            .filter_map(|c| c.outcome.summary())
            .map(ReconcileSummary::applied)
            .sum()
    }

    pub fn is_success(&self) -> bool {
        self.failed() == 0 && !self.cancelled
    }
}

/// Progress events broadcast while a pass runs
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SyncEvent {
    Started {
        total_channels: usize,
    },
    ChannelScanned {
        index: usize,
        total: usize,
        channel_id: i64,
        status: &'static str,
    },
    Finished {
        synced: usize,
        skipped: usize,
        failed: usize,
        cancelled: bool,
    },
    /// The pass could not start (e.g. the channel list was unavailable)
    Failed {
        reason: String,
    },
}
