//! Error types for the schedule module

use thiserror::Error;

use crate::models::{EpochMillis, ProviderDataError};

/// Result type for schedule operations
pub type ScheduleResult<T> = Result<T, ScheduleError>;

/// Schedule-specific errors
#[derive(Error, Debug)]
pub enum ScheduleError {
    /// Window start lies after window end
    #[error("Invalid window range: start {start} is after end {end}")]
    InvalidRange {
        start: EpochMillis,
        end: EpochMillis,
    },

    /// Repeatable reel whose programs sum to no airtime
    #[error("Repeatable reel has non-positive total duration ({total_ms} ms)")]
    ZeroOrNegativeDuration { total_ms: i64 },

    /// Embedded advertisement data could not be decoded
    #[error("Provider data error in '{title}': {source}")]
    ProviderData {
        title: String,
        #[source]
        source: ProviderDataError,
    },
}

impl ScheduleError {
    pub fn invalid_range(start: EpochMillis, end: EpochMillis) -> Self {
        Self::InvalidRange { start, end }
    }

    pub fn provider_data(title: impl Into<String>, source: ProviderDataError) -> Self {
        Self::ProviderData {
            title: title.into(),
            source,
        }
    }

    /// Precondition failures skip the channel instead of failing it
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            Self::InvalidRange { .. } | Self::ZeroOrNegativeDuration { .. }
        )
    }
}
