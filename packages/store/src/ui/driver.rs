//! Periodic broadcast driver.
//!
//! One task per server. On every tick it pushes the latest state to all subscribers, whether or
//! not anything changed since the previous tick.

use std::{sync::Arc, time::Duration};

use tokio::{
    sync::watch,
    task::JoinHandle,
    time::{self, MissedTickBehavior},
};

use crate::usecase::BroadcastLatestStateUseCase;

/// Spawn the driver. It stops when `shutdown` flips to `true` or its sender is dropped.
pub fn spawn_broadcast_driver(
    usecase: Arc<BroadcastLatestStateUseCase>,
    period: Duration,
    mut shutdown: watch::Receiver<bool>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tracing::info!("Broadcast driver started (every {:?})", period);

        loop {
            tokio::select! {
                biased;
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
                _ = ticker.tick() => {
                    match usecase.execute().await {
                        Ok(Some(report)) => {
                            if !report.pruned.is_empty() {
                                tracing::debug!(
                                    "Tick delivered to {}, pruned {}",
                                    report.delivered,
                                    report.pruned.len()
                                );
                            }
                        }
                        Ok(None) => tracing::trace!("No telemetry yet, skipping tick"),
                        Err(e) => tracing::error!("Periodic broadcast failed: {}", e),
                    }
                }
            }
        }

        tracing::info!("Broadcast driver stopped");
    })
}
