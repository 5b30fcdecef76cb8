//! In-memory program store
//!
//! Useful for tests and dry runs without a database.

use std::collections::BTreeMap;
use std::sync::RwLock;

use async_trait::async_trait;

use super::error::{StoreError, StoreResult};
use super::ProgramStore;
use crate::models::{EpochMillis, Program, ProgramOperation};

#[derive(Debug, Default)]
struct Inner {
    programs: BTreeMap<i64, Program>,
    next_id: i64,
}

impl Inner {
    fn apply(&mut self, op: &ProgramOperation) -> StoreResult<()> {
        match op {
            ProgramOperation::Insert(program) => {
                self.next_id += 1;
                let id = self.next_id;
                self.programs.insert(
                    id,
                    Program {
                        id: Some(id),
                        ..program.clone()
                    },
                );
            }
            ProgramOperation::Update { id, program } => {
                let slot = self
                    .programs
                    .get_mut(id)
                    .ok_or_else(|| StoreError::write(format!("no program with id {id}")))?;
                *slot = Program {
                    id: Some(*id),
                    ..program.clone()
                };
            }
            ProgramOperation::Delete { id } => {
                self.programs
                    .remove(id)
                    .ok_or_else(|| StoreError::write(format!("no program with id {id}")))?;
            }
        }
        Ok(())
    }
}

/// In-memory implementation of [`ProgramStore`]
///
/// Ids are assigned monotonically starting at 1 and never reused.
#[derive(Debug, Default)]
pub struct MemoryProgramStore {
    inner: RwLock<Inner>,
}

impl MemoryProgramStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of programs across all channels
    pub fn len(&self) -> usize {
        self.inner.read().map(|i| i.programs.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Seed programs directly, assigning fresh ids
    pub fn seed(&self, programs: impl IntoIterator<Item = Program>) -> StoreResult<Vec<i64>> {
        let mut inner = self.inner.write()?;
        let mut ids = Vec::new();
        for program in programs {
            inner.apply(&ProgramOperation::Insert(program))?;
            ids.push(inner.next_id);
        }
        Ok(ids)
    }
}

#[async_trait]
impl ProgramStore for MemoryProgramStore {
    async fn query_persisted_programs(&self, channel_id: i64) -> StoreResult<Vec<Program>> {
        let inner = self.inner.read()?;
        let mut programs: Vec<Program> = inner
            .programs
            .values()
            .filter(|p| p.channel_id == channel_id)
            .cloned()
            .collect();
        programs.sort_by_key(|p| (p.start_time_ms, p.id));
        Ok(programs)
    }

    async fn apply_batch(&self, ops: &[ProgramOperation]) -> StoreResult<()> {
        let mut inner = self.inner.write()?;

        // Apply to a scratch copy so a failing op leaves the store untouched
        let mut scratch = Inner {
            programs: inner.programs.clone(),
            next_id: inner.next_id,
        };
        for op in ops {
            scratch.apply(op)?;
        }
        *inner = scratch;
        Ok(())
    }

    async fn purge_ended_before(&self, cutoff: EpochMillis) -> StoreResult<usize> {
        let mut inner = self.inner.write()?;
        let before = inner.programs.len();
        inner.programs.retain(|_, p| p.end_time_ms > cutoff);
        Ok(before - inner.programs.len())
    }
}
