//! Periodic reconciliation of the denormalized incident counts.
//!
//! Counts are recomputed on every child mutation already; this task closes
//! the window left by a crash between a child write and its recompute.

use std::time::Duration;

use tokio::time::{MissedTickBehavior, interval};
use tracing::{error, info};

use super::facade::OccurrenceService;

/// Start the reconciliation background task. An interval of zero disables it.
pub fn start_reconcile_task(service: OccurrenceService, interval_secs: u64) {
    if interval_secs == 0 {
        info!("Count reconciliation disabled");
        return;
    }

    tokio::spawn(async move {
        info!(
            "Starting count reconciliation (interval: {} seconds)",
            interval_secs
        );

        let mut ticker = interval(Duration::from_secs(interval_secs));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;

            match service.reconcile_counts().await {
                Ok(0) => {}
                Ok(corrected) => info!("Reconciled counts on {} incidents", corrected),
                Err(e) => error!("Count reconciliation error: {}", e),
            }
        }
    });
}
