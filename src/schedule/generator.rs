//! Window materialization for channel reels
//!
//! A one-shot reel is filtered to the programs overlapping the window. A
//! repeatable reel is walked cyclically from an anchor derived from the Unix
//! epoch, so every reader computing the same window gets identical output:
//!
//! ```text
//!   epoch                          window_start          window_end
//!     |--- reel ---|--- reel ---|----+---- reel ---|--- reel --+-|
//!                               ^ cursor = start - (start mod total)
//! ```

use super::ads::shift_program_ads;
use super::error::{ScheduleError, ScheduleResult};
use super::window::TimeWindow;
use crate::models::{EpochMillis, Program};

/// Expands template reels into concrete, time-bounded program instances
#[derive(Debug, Clone, Copy, Default)]
pub struct ScheduleWindowGenerator;

impl ScheduleWindowGenerator {
    pub fn new() -> Self {
        Self
    }

    /// Materialize `reel` for `window`, binding every instance to `channel_id`
    ///
    /// The output is sorted by start time and depends only on the arguments.
    pub fn generate(
        &self,
        channel_id: i64,
        reel: &[Program],
        repeatable: bool,
        window: TimeWindow,
    ) -> ScheduleResult<Vec<Program>> {
        if reel.is_empty() {
            return Ok(Vec::new());
        }

        if repeatable {
            self.generate_repeating(channel_id, reel, window)
        } else {
            Ok(self.generate_one_shot(channel_id, reel, window))
        }
    }

    /// Instance airing at `at_ms` (`start <= at < end`), if any
    pub fn program_at(
        &self,
        channel_id: i64,
        reel: &[Program],
        repeatable: bool,
        at_ms: EpochMillis,
    ) -> ScheduleResult<Option<Program>> {
        // one past `at` so an instance starting exactly at `at` is materialized
        let window = TimeWindow::new(at_ms, at_ms.saturating_add(1))?;
        let instances = self.generate(channel_id, reel, repeatable, window)?;

        Ok(instances
            .into_iter()
            .find(|p| p.start_time_ms <= at_ms && at_ms < p.end_time_ms))
    }

    fn generate_one_shot(&self, channel_id: i64, reel: &[Program], window: TimeWindow) -> Vec<Program> {
        reel.iter()
            .filter(|template| template.overlaps(window.start_ms(), window.end_ms()))
            .map(|template| Program {
                id: None,
                channel_id,
                ..template.clone()
            })
            .collect()
    }

    fn generate_repeating(
        &self,
        channel_id: i64,
        reel: &[Program],
        window: TimeWindow,
    ) -> ScheduleResult<Vec<Program>> {
        let total_ms = reel
            .iter()
            .map(Program::duration_ms)
            .fold(0i64, i64::saturating_add);
        if total_ms <= 0 {
            return Err(ScheduleError::ZeroOrNegativeDuration { total_ms });
        }

        let window_start = window.start_ms();
        let window_end = window.end_ms();

        let mut instances = Vec::new();
        // Instants past either end of the i64 range are clamped to it.
        let mut cursor = window_start.saturating_sub(window_start.rem_euclid(total_ms));
        let mut index = 0usize;

        while cursor < window_end {
            let template = &reel[index];
            index = (index + 1) % reel.len();

            let instance_end = cursor.saturating_add(template.duration_ms());
            if instance_end < window_start {
                cursor = instance_end;
                continue;
            }

            let provider_data = shift_program_ads(template, template.start_time_ms, cursor)
                .map_err(|e| ScheduleError::provider_data(&template.title, e))?;

            instances.push(Program {
                id: None,
                channel_id,
                start_time_ms: cursor,
                end_time_ms: instance_end,
                provider_data,
                ..template.clone()
            });
            cursor = instance_end;
        }

        tracing::trace!(
            channel_id,
            total_ms,
            instances = instances.len(),
            "Materialized repeating reel"
        );

        Ok(instances)
    }
}
