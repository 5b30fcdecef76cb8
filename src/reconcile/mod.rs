//! Program reconciliation
//!
//! Diffs a freshly generated, start-sorted program list against the
//! start-sorted list already persisted for the same channel, and applies the
//! resulting insert/update/delete operations to a store in bounded batches.
//!
//! # Algorithm
//!
//! Persisted programs ending at or before the first incoming start are
//! historical and left to the store's retention. The rest are merged with a
//! two-pointer walk:
//!
//! | Condition | Operation | Advance |
//! |-----------|-----------|---------|
//! | persisted list exhausted | `Insert(new)` | new |
//! | identical content (ignoring id) | none | both |
//! | [`needs_update`] | `Update(old.id, new)` | both |
//! | `old.end < new.end` | `Delete(old.id)` | old |
//! | otherwise | `Insert(new)` | new |
//!
//! The walk stops once the incoming list is exhausted; persisted programs
//! beyond that point are not touched. Both inputs must be sorted by start
//! time, which keeps the pass linear.
//!
//! # Failure and cancellation
//!
//! Each batch is applied atomically. A failed batch aborts the pass with
//! [`ReconcileError::BatchFailed`]; batches committed before it stay
//! applied. Cancellation is checked before every flush and ends the pass
//! early without rolling anything back.

pub mod batch;
pub mod error;

use serde::Serialize;

use crate::metrics;
use crate::models::{Program, ProgramOperation};
use crate::storage::ProgramStore;
use crate::utils::CancelToken;

pub use batch::OperationBatcher;
pub use error::{ReconcileError, ReconcileResult};

/// Same title and overlapping interval: update in place, keeping the store id
///
/// Two distinct broadcasts sharing a title and overlapping in time also
/// match, and are updated in place rather than replaced.
pub fn needs_update(old: &Program, new: &Program) -> bool {
    old.title == new.title
        && old.start_time_ms <= new.end_time_ms
        && new.start_time_ms <= old.end_time_ms
}

/// Ordered operations for one channel, plus the no-op tallies
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcilePlan {
    pub operations: Vec<ProgramOperation>,
    pub unchanged: usize,
    pub skipped_historical: usize,
}

/// Outcome of one reconciliation pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileSummary {
    pub inserted: usize,
    pub updated: usize,
    pub deleted: usize,
    pub unchanged: usize,
    pub skipped_historical: usize,
    pub batches: usize,
    pub cancelled: bool,
}

impl ReconcileSummary {
    /// Operations actually applied to the store
    pub fn applied(&self) -> usize {
        self.inserted + self.updated + self.deleted
    }

    fn record(&mut self, batch: &[ProgramOperation]) {
        for op in batch {
            match op {
                ProgramOperation::Insert(_) => self.inserted += 1,
                ProgramOperation::Update { .. } => self.updated += 1,
                ProgramOperation::Delete { .. } => self.deleted += 1,
            }
        }
        self.batches += 1;
    }
}

/// Diff/merge engine with batched application
#[derive(Debug, Clone)]
pub struct ProgramReconciler {
    batch_size: usize,
}

impl Default for ProgramReconciler {
    fn default() -> Self {
        Self {
            batch_size: Self::DEFAULT_BATCH_SIZE,
        }
    }
}

impl ProgramReconciler {
    /// Operations per atomic store apply
    pub const DEFAULT_BATCH_SIZE: usize = 100;

    pub fn new(batch_size: usize) -> ReconcileResult<Self> {
        if batch_size == 0 {
            return Err(ReconcileError::InvalidBatchSize);
        }
        Ok(Self { batch_size })
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Compute the ordered operations turning `existing` into `incoming`
    pub fn plan(&self, existing: &[Program], incoming: &[Program]) -> ReconcileResult<ReconcilePlan> {
        let mut plan = ReconcilePlan::default();
        let Some(first) = incoming.first() else {
            return Ok(plan);
        };

        plan.skipped_historical = existing
            .iter()
            .take_while(|p| p.end_time_ms <= first.start_time_ms)
            .count();
        let existing = &existing[plan.skipped_historical..];

        let mut old_idx = 0;
        let mut new_idx = 0;

        while new_idx < incoming.len() {
            let new = &incoming[new_idx];

            let Some(old) = existing.get(old_idx) else {
                plan.operations.push(ProgramOperation::Insert(new.clone()));
                new_idx += 1;
                continue;
            };

            if old.same_content(new) {
                plan.unchanged += 1;
                old_idx += 1;
                new_idx += 1;
            } else if needs_update(old, new) {
                plan.operations.push(ProgramOperation::Update {
                    id: store_id(old)?,
                    program: new.clone(),
                });
                old_idx += 1;
                new_idx += 1;
            } else if old.end_time_ms < new.end_time_ms {
                plan.operations
                    .push(ProgramOperation::Delete { id: store_id(old)? });
                old_idx += 1;
            } else {
                plan.operations.push(ProgramOperation::Insert(new.clone()));
                new_idx += 1;
            }
        }

        Ok(plan)
    }

    /// Plan and apply the diff to `store`
    ///
    /// Returns early with `cancelled = true` when `cancel` fires before a
    /// flush.
    pub async fn reconcile(
        &self,
        store: &dyn ProgramStore,
        existing: &[Program],
        incoming: &[Program],
        cancel: &CancelToken,
    ) -> ReconcileResult<ReconcileSummary> {
        let plan = self.plan(existing, incoming)?;
        let mut summary = ReconcileSummary {
            unchanged: plan.unchanged,
            skipped_historical: plan.skipped_historical,
            ..Default::default()
        };

        let mut batcher = OperationBatcher::new(self.batch_size);
        for op in plan.operations {
            if let Some(batch) = batcher.push(op) {
                if !flush(store, &batch, &mut summary, cancel).await? {
                    return Ok(summary);
                }
            }
        }
        if let Some(batch) = batcher.finish() {
            flush(store, &batch, &mut summary, cancel).await?;
        }

        Ok(summary)
    }
}

fn store_id(program: &Program) -> ReconcileResult<i64> {
    program.id.ok_or_else(|| ReconcileError::MissingStoreId {
        title: program.title.clone(),
        start_ms: program.start_time_ms,
    })
}

/// Apply one batch; `Ok(false)` means the pass was cancelled first
async fn flush(
    store: &dyn ProgramStore,
    batch: &[ProgramOperation],
    summary: &mut ReconcileSummary,
    cancel: &CancelToken,
) -> ReconcileResult<bool> {
    if cancel.is_cancelled() {
        tracing::info!(
            batches_applied = summary.batches,
            dropped_ops = batch.len(),
            "Reconciliation cancelled before flush"
        );
        summary.cancelled = true;
        return Ok(false);
    }

    store
        .apply_batch(batch)
        .await
        .map_err(|source| ReconcileError::BatchFailed {
            batches_applied: summary.batches,
            source,
        })?;

    summary.record(batch);
    metrics::record_batch(batch);
    tracing::debug!(
        batch = summary.batches,
        ops = batch.len(),
        "Applied reconciliation batch"
    );
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryProgramStore;
    use crate::utils::cancellation;

    fn persisted(id: i64, title: &str, start: i64, end: i64) -> Program {
        Program {
            id: Some(id),
            ..Program::new(title, start, end)
        }
    }

    #[test]
    fn test_needs_update_requires_title_and_overlap() {
        let old = Program::new("A", 0, 1000);
        assert!(needs_update(&old, &Program::new("A", 1000, 2000)));
        assert!(!needs_update(&old, &Program::new("A", 1001, 2000)));
        assert!(!needs_update(&old, &Program::new("B", 0, 1000)));
    }

    #[test]
    fn test_plan_identity_is_empty() {
        let list = vec![persisted(1, "A", 0, 100), persisted(2, "B", 100, 200)];
        let incoming: Vec<_> = list
            .iter()
            .map(|p| Program { id: None, ..p.clone() })
            .collect();

        let plan = ProgramReconciler::default().plan(&list, &incoming).unwrap();
        assert!(plan.operations.is_empty());
        assert_eq!(plan.unchanged, 2);
    }

    #[test]
    fn test_plan_delete_then_insert() {
        let existing = vec![persisted(5, "A", 0, 1000)];
        let incoming = vec![Program::new("B", 500, 1500)];

        let plan = ProgramReconciler::default().plan(&existing, &incoming).unwrap();
        assert_eq!(
            plan.operations,
            vec![
                ProgramOperation::Delete { id: 5 },
                ProgramOperation::Insert(Program::new("B", 500, 1500)),
            ]
        );
    }

    #[test]
    fn test_plan_update_keeps_id() {
        let existing = vec![persisted(9, "A", 0, 1000)];
        let incoming = vec![Program::new("A", 0, 1200)];

        let plan = ProgramReconciler::default().plan(&existing, &incoming).unwrap();
        assert_eq!(
            plan.operations,
            vec![ProgramOperation::Update {
                id: 9,
                program: Program::new("A", 0, 1200),
            }]
        );
    }

    #[test]
    fn test_plan_insert_before_longer_existing() {
        let existing = vec![persisted(1, "Long", 0, 5000)];
        let incoming = vec![Program::new("Short", 0, 1000), Program::new("Long", 1000, 5000)];

        let plan = ProgramReconciler::default().plan(&existing, &incoming).unwrap();
        assert_eq!(plan.operations.len(), 2);
        assert!(matches!(plan.operations[0], ProgramOperation::Insert(ref p) if p.title == "Short"));
        assert!(matches!(plan.operations[1], ProgramOperation::Update { id: 1, .. }));
    }

    #[test]
    fn test_plan_skips_historical_prefix() {
        let existing = vec![
            persisted(1, "Old", 0, 100),
            persisted(2, "Edge", 100, 200),
            persisted(3, "Current", 200, 300),
        ];
        let incoming = vec![Program::new("Current", 200, 300)];

        let plan = ProgramReconciler::default().plan(&existing, &incoming).unwrap();
        assert_eq!(plan.skipped_historical, 2);
        assert!(plan.operations.is_empty());
        assert_eq!(plan.unchanged, 1);
    }

    #[test]
    fn test_plan_leaves_trailing_existing() {
        let existing = vec![persisted(1, "A", 0, 100), persisted(2, "B", 100, 200)];
        let incoming = vec![Program::new("A", 0, 100)];

        let plan = ProgramReconciler::default().plan(&existing, &incoming).unwrap();
        assert!(plan.operations.is_empty());
    }

    #[test]
    fn test_plan_empty_incoming() {
        let existing = vec![persisted(1, "A", 0, 100)];
        let plan = ProgramReconciler::default().plan(&existing, &[]).unwrap();
        assert_eq!(plan, ReconcilePlan::default());
    }

    #[test]
    fn test_plan_missing_store_id() {
        let existing = vec![Program::new("A", 0, 1000)];
        let incoming = vec![Program::new("B", 500, 1500)];
        let err = ProgramReconciler::default()
            .plan(&existing, &incoming)
            .unwrap_err();
        assert!(matches!(err, ReconcileError::MissingStoreId { .. }));
    }

    #[test]
    fn test_zero_batch_size_rejected() {
        assert!(matches!(
            ProgramReconciler::new(0),
            Err(ReconcileError::InvalidBatchSize)
        ));
    }

    #[tokio::test]
    async fn test_reconcile_applies_in_batches() {
        let store = MemoryProgramStore::new();
        let incoming: Vec<_> = (0..5)
            .map(|i| Program::new(format!("P{i}"), i * 100, (i + 1) * 100))
            .collect();

        let summary = ProgramReconciler::new(2)
            .unwrap()
            .reconcile(&store, &[], &incoming, &CancelToken::never())
            .await
            .unwrap();

        assert_eq!(summary.inserted, 5);
        assert_eq!(summary.batches, 3);
        assert!(!summary.cancelled);
        assert_eq!(store.query_persisted_programs(0).await.unwrap().len(), 5);
    }

    #[tokio::test]
    async fn test_reconcile_cancelled_before_first_flush() {
        let store = MemoryProgramStore::new();
        let (handle, token) = cancellation();
        handle.cancel();

        let summary = ProgramReconciler::default()
            .reconcile(&store, &[], &[Program::new("A", 0, 100)], &token)
            .await
            .unwrap();

        assert!(summary.cancelled);
        assert_eq!(summary.applied(), 0);
        assert!(store.is_empty());
    }
}
