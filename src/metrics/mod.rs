//! Prometheus metrics for sync passes
//!
//! This module tracks:
//! - Store operations applied, by kind
//! - Batches flushed
//! - Per-channel outcomes (synced, skipped, failed, cancelled)
//! - Duration of whole sync passes
//!
//! # Usage
//!
//! Call `init_metrics()` at application startup to register all metrics.
//! If initialization never happens (tests, library embedding), every
//! recording function is a no-op.

use prometheus::{
    register_counter, register_counter_vec, register_gauge, register_histogram, Counter,
    CounterVec, Encoder, Gauge, Histogram, TextEncoder,
};
use std::sync::OnceLock;

use crate::models::ProgramOperation;

// ============================================================================
// Metrics Storage
// ============================================================================

struct SyncMetrics {
    operations: CounterVec,
    batches: Counter,
    channel_outcomes: CounterVec,
    sync_duration: Histogram,
    is_syncing: Gauge,
}

static SYNC_METRICS: OnceLock<SyncMetrics> = OnceLock::new();

/// Flag to track if initialization was attempted
static METRICS_INIT_ATTEMPTED: OnceLock<bool> = OnceLock::new();

// ============================================================================
// Initialization
// ============================================================================

/// Initialize all Prometheus metrics
///
/// Safe to call more than once; only the first call registers.
pub fn init_metrics() -> Result<(), Box<dyn std::error::Error>> {
    if METRICS_INIT_ATTEMPTED.get().is_some() {
        return Ok(());
    }
    METRICS_INIT_ATTEMPTED.set(true).ok();

    let metrics = SyncMetrics {
        operations: register_counter_vec!(
            "reelsync_operations_total",
            "Store operations applied by reconciliation",
            &["kind"]
        )?,
        batches: register_counter!(
            "reelsync_batches_total",
            "Operation batches applied to the store"
        )?,
        channel_outcomes: register_counter_vec!(
            "reelsync_channel_syncs_total",
            "Channel sync results by outcome",
            &["outcome"]
        )?,
        sync_duration: register_histogram!(
            "reelsync_sync_duration_seconds",
            "Duration of a full sync pass in seconds",
            vec![0.01, 0.05, 0.1, 0.5, 1.0, 5.0, 10.0, 30.0, 60.0, 300.0]
        )?,
        is_syncing: register_gauge!(
            "reelsync_is_syncing",
            "Whether a sync pass is running (1 = yes, 0 = no)"
        )?,
    };

    SYNC_METRICS
        .set(metrics)
        .map_err(|_| "Sync metrics already initialized")?;

    tracing::info!("Prometheus metrics initialized successfully");
    Ok(())
}

pub fn metrics_initialized() -> bool {
    SYNC_METRICS.get().is_some()
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Encode all metrics to Prometheus text format
pub fn encode_metrics() -> Result<String, Box<dyn std::error::Error>> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    Ok(String::from_utf8(buffer)?)
}

/// Record an applied batch
pub fn record_batch(batch: &[ProgramOperation]) {
    let Some(m) = SYNC_METRICS.get() else {
        return;
    };

    m.batches.inc();
    for op in batch {
        m.operations.with_label_values(&[op.kind()]).inc();
    }
}

/// Record the outcome of one channel
pub fn record_channel_outcome(outcome: &str) {
    if let Some(m) = SYNC_METRICS.get() {
        m.channel_outcomes.with_label_values(&[outcome]).inc();
    }
}

/// Histogram timer guard that records duration on drop
pub struct MetricsTimer {
    timer: Option<prometheus::HistogramTimer>,
}

impl Drop for MetricsTimer {
    fn drop(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.stop_and_record();
        }
        if let Some(m) = SYNC_METRICS.get() {
            m.is_syncing.set(0.0);
        }
    }
}

/// Mark a sync pass as running until the returned guard drops
pub fn start_sync_timer() -> MetricsTimer {
    match SYNC_METRICS.get() {
        Some(m) => {
            m.is_syncing.set(1.0);
            MetricsTimer {
                timer: Some(m.sync_duration.start_timer()),
            }
        }
        None => MetricsTimer { timer: None },
    }
}
