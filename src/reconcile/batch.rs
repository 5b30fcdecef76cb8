//! Bounded batching of store operations

use std::mem;

use crate::models::ProgramOperation;

/// Accumulates operations and hands them out in batches of at most
/// `batch_size`, preserving generation order
#[derive(Debug)]
pub struct OperationBatcher {
    batch_size: usize,
    pending: Vec<ProgramOperation>,
}

impl OperationBatcher {
    /// `batch_size` is clamped to at least 1
    pub fn new(batch_size: usize) -> Self {
        let batch_size = batch_size.max(1);
        Self {
            batch_size,
            pending: Vec::with_capacity(batch_size),
        }
    }

    /// Queue `op`; returns a full batch once `batch_size` operations are pending
    pub fn push(&mut self, op: ProgramOperation) -> Option<Vec<ProgramOperation>> {
        self.pending.push(op);
        if self.pending.len() >= self.batch_size {
            Some(mem::replace(
                &mut self.pending,
                Vec::with_capacity(self.batch_size),
            ))
        } else {
            None
        }
    }

    /// Remaining partial batch, if any
    pub fn finish(self) -> Option<Vec<ProgramOperation>> {
        if self.pending.is_empty() {
            None
        } else {
            Some(self.pending)
        }
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }
}
