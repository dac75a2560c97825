//! Background sync loop.
//!
//! One task owns the synchronizer and runs passes on a fixed interval, so
//! passes never overlap. A failed pass is logged and the loop waits for the
//! next tick; reads keep being served either way.

use crate::metrics::Metrics;
use charger_engine::{Clock, LocationStore, RemoteSource, SyncReport, Synchronizer};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};

/// Report of the most recent successful pass, shared with the health route.
#[derive(Debug, Clone, Default)]
pub struct SyncStatus(Arc<RwLock<Option<SyncReport>>>);

impl SyncStatus {
    pub async fn last(&self) -> Option<SyncReport> {
        *self.0.read().await
    }

    async fn record(&self, report: SyncReport) {
        *self.0.write().await = Some(report);
    }
}

/// Run a single pass, log its outcome and record it in `metrics`.
pub async fn run_pass<S, R, C>(
    synchronizer: &Synchronizer<S, R, C>,
    metrics: &Metrics,
) -> Option<SyncReport>
where
    S: LocationStore,
    R: RemoteSource,
    C: Clock,
{
    tracing::info!("Starting sync pass");
    let start = Instant::now();

    let report = match synchronizer.sync().await {
        Ok(report) => {
            tracing::info!(
                added = report.added,
                updated = report.updated,
                unchanged = report.unchanged,
                "Sync pass finished"
            );
            Some(report)
        }
        Err(e) => {
            tracing::error!(error = %e, "Sync pass failed");
            None
        }
    };

    metrics.record_sync(report.as_ref(), start.elapsed());
    report
}

/// Spawn the loop. The first pass runs immediately when `run_on_start` is set.
pub fn spawn<S, R, C>(
    synchronizer: Arc<Synchronizer<S, R, C>>,
    every: Duration,
    run_on_start: bool,
    status: SyncStatus,
    metrics: Metrics,
) -> JoinHandle<()>
where
    S: LocationStore + 'static,
    R: RemoteSource + 'static,
    C: Clock + 'static,
{
    tokio::spawn(async move {
        let mut ticker = interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        // The first tick completes immediately
        if !run_on_start {
            ticker.tick().await;
        }

        loop {
            ticker.tick().await;
            if let Some(report) = run_pass(synchronizer.as_ref(), &metrics).await {
                status.record(report).await;
            }
        }
    })
}
