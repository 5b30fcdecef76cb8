use anyhow::{Context, Result};
use chrono::Utc;
use tokio::sync::broadcast::error::RecvError;

use reelsync::config::Config;
use reelsync::schedule::TimeWindow;
use reelsync::sync::{ChannelOutcome, PeriodicSync, SyncEvent, SyncReport};
use reelsync::utils::{cancellation, CancelHandle};

use super::{build_orchestrator, duration_ms, hours_ms};

/// One on-demand pass over `[now, now + lookahead]`
pub async fn sync(
    config: Config,
    channels: Vec<i64>,
    lookahead_hours: Option<u64>,
    json: bool,
) -> Result<()> {
    let orchestrator = build_orchestrator(&config)?;

    let lookahead_ms = match lookahead_hours {
        Some(hours) => hours_ms(hours),
        None => duration_ms(config.immediate_lookahead()),
    };
    let window = TimeWindow::starting_at(Utc::now().timestamp_millis(), lookahead_ms)?;

    let (handle, token) = cancellation();
    spawn_ctrl_c(handle);

    if !json {
        println!("Syncing programs for {window}");
        println!("================================");
        let mut events = orchestrator.subscribe();
        tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(event) => print_event(&event),
                    Err(RecvError::Lagged(missed)) => {
                        tracing::debug!(missed, "Progress printer lagged");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        });
    }

    let report = if channels.is_empty() {
        orchestrator.sync(window, &token).await
    } else {
        orchestrator.sync_channels(&channels, window, &token).await
    }
    .context("Sync pass failed")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    if report.failed() > 0 {
        anyhow::bail!("{} channel(s) failed to sync", report.failed());
    }
    Ok(())
}

/// Periodic passes until Ctrl-C
pub async fn watch(config: Config) -> Result<()> {
    let orchestrator = build_orchestrator(&config)?.shared();

    println!("Watching listing {}", config.listing.path.display());
    println!(
        "  Period: {}s | Lookahead: {}s",
        config.sync.period_secs, config.sync.periodic_lookahead_secs
    );

    let (handle, token) = cancellation();
    spawn_ctrl_c(handle);

    let passes = PeriodicSync::new(
        orchestrator,
        config.sync_period(),
        config.periodic_lookahead(),
    )
    .run(token)
    .await;

    println!("Stopped after {passes} pass(es)");
    Ok(())
}

fn spawn_ctrl_c(handle: CancelHandle) {
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
            return;
        }
        tracing::info!("Received Ctrl-C, cancelling");
        handle.cancel();
    });
}

fn print_event(event: &SyncEvent) {
    match event {
        SyncEvent::ChannelScanned {
            index,
            total,
            channel_id,
            status,
        } => {
            println!("  [{}/{}] channel {channel_id}: {status}", index + 1, total);
        }
        SyncEvent::Failed { reason } => println!("  pass failed: {reason}"),
        SyncEvent::Started { .. } | SyncEvent::Finished { .. } => {}
    }
}

fn print_report(report: &SyncReport) {
    println!();
    for channel in &report.channels {
        let detail = match &channel.outcome {
            ChannelOutcome::Synced(s) | ChannelOutcome::Cancelled(s) => format!(
                "+{} ~{} -{} ={}",
                s.inserted, s.updated, s.deleted, s.unchanged
            ),
            ChannelOutcome::Skipped { reason } => reason.clone(),
            ChannelOutcome::Failed {
                error,
                recoverable,
                category,
            } => format!(
                "{error} ({}, recoverable: {recoverable})",
                category.as_str()
            ),
        };
        println!(
            "{:>6} {:<24} {:<9} {} generated, {}",
            channel.channel_id,
            channel.display_name,
            channel.outcome.label(),
            channel.generated,
            detail
        );
    }

    println!();
    println!(
        "Synced: {} | Skipped: {} | Failed: {} | Operations: {}",
        report.synced(),
        report.skipped(),
        report.failed(),
        report.operations_applied()
    );
    if report.cancelled {
        println!("Cancelled with {} channel(s) not reached", report.not_reached);
    }
}
