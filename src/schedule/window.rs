//! Time windows over the absolute (epoch) timeline

use serde::{Deserialize, Serialize};
use std::fmt;

use super::error::{ScheduleError, ScheduleResult};
use crate::models::{to_datetime, EpochMillis};

/// A validated `[start, end]` window in epoch milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeWindow {
    start_ms: EpochMillis,
    end_ms: EpochMillis,
}

impl TimeWindow {
    /// Create a window, rejecting `start > end`
    pub fn new(start_ms: EpochMillis, end_ms: EpochMillis) -> ScheduleResult<Self> {
        if start_ms > end_ms {
            return Err(ScheduleError::invalid_range(start_ms, end_ms));
        }
        Ok(Self { start_ms, end_ms })
    }

    /// Window of `duration_ms` beginning at `now_ms`
    pub fn starting_at(now_ms: EpochMillis, duration_ms: i64) -> ScheduleResult<Self> {
        Self::new(now_ms, now_ms.saturating_add(duration_ms))
    }

    pub fn start_ms(&self) -> EpochMillis {
        self.start_ms
    }

    pub fn end_ms(&self) -> EpochMillis {
        self.end_ms
    }

    pub fn duration_ms(&self) -> i64 {
        self.end_ms.saturating_sub(self.start_ms)
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (to_datetime(self.start_ms), to_datetime(self.end_ms)) {
            (Some(start), Some(end)) => write!(f, "[{}, {})", start.to_rfc3339(), end.to_rfc3339()),
            _ => write!(f, "[{}, {})", self.start_ms, self.end_ms),
        }
    }
}
