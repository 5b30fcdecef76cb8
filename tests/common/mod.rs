//! Common test utilities

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use reelsync::models::{Advertisement, Channel, Program, ProgramOperation, ProviderData};
use reelsync::storage::{MemoryProgramStore, ProgramStore, StoreError, StoreResult};
use reelsync::utils::CancelHandle;

/// Template program with a fixed title and interval
pub fn template(title: &str, start: i64, end: i64) -> Program {
    Program::new(title, start, end)
}

/// Template carrying ads in its provider data
pub fn template_with_ads(title: &str, start: i64, end: i64, ads: Vec<Advertisement>) -> Program {
    let data = ProviderData {
        ads,
        repeatable: true,
        ..Default::default()
    };
    Program {
        provider_data: Some(data.encode().unwrap()),
        ..Program::new(title, start, end)
    }
}

/// The three-program reel `P1 [0,1000)`, `P2 [1000,2500)`, `P3 [2500,3000)`
pub fn three_program_reel() -> Vec<Program> {
    vec![
        template("P1", 0, 1000),
        template("P2", 1000, 2500),
        template("P3", 2500, 3000),
    ]
}

pub fn channel(id: i64, name: &str, repeatable: bool) -> Channel {
    Channel {
        id,
        display_name: name.to_string(),
        display_number: id.to_string(),
        repeatable,
        provider_data: None,
    }
}

/// Materialized program bound to a channel
pub fn program(channel_id: i64, title: &str, start: i64, end: i64) -> Program {
    Program {
        channel_id,
        ..Program::new(title, start, end)
    }
}

/// Store wrapper that records every batch and can inject failures
pub struct RecordingStore {
    inner: MemoryProgramStore,
    batches: Mutex<Vec<Vec<ProgramOperation>>>,
    calls: AtomicUsize,
    /// Zero-based index of the `apply_batch` call that fails
    fail_on: Option<usize>,
    /// Cancel after this many successful batches
    cancel_after: Option<(usize, CancelHandle)>,
}

impl RecordingStore {
    pub fn new() -> Self {
        Self {
            inner: MemoryProgramStore::new(),
            batches: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
            fail_on: None,
            cancel_after: None,
        }
    }

    pub fn failing_on(call: usize) -> Self {
        Self {
            fail_on: Some(call),
            ..Self::new()
        }
    }

    pub fn cancelling_after(batches: usize, handle: CancelHandle) -> Self {
        Self {
            cancel_after: Some((batches, handle)),
            ..Self::new()
        }
    }

    pub fn seed(&self, programs: Vec<Program>) -> Vec<i64> {
        self.inner.seed(programs).unwrap()
    }

    pub fn batches(&self) -> Vec<Vec<ProgramOperation>> {
        self.batches.lock().unwrap().clone()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }
}

#[async_trait]
impl ProgramStore for RecordingStore {
    async fn query_persisted_programs(&self, channel_id: i64) -> StoreResult<Vec<Program>> {
        self.inner.query_persisted_programs(channel_id).await
    }

    async fn apply_batch(&self, ops: &[ProgramOperation]) -> StoreResult<()> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_on == Some(call) {
            return Err(StoreError::write("injected failure"));
        }

        self.inner.apply_batch(ops).await?;
        let applied = {
            let mut batches = self.batches.lock().unwrap();
            batches.push(ops.to_vec());
            batches.len()
        };

        if let Some((after, handle)) = &self.cancel_after {
            if applied >= *after {
                handle.cancel();
            }
        }
        Ok(())
    }

    async fn purge_ended_before(&self, cutoff: i64) -> StoreResult<usize> {
        self.inner.purge_ended_before(cutoff).await
    }
}
