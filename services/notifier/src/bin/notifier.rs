//! services/notifier/src/bin/notifier.rs

use futures::StreamExt;
use notifier_lib::{
    adapters::{JsonSnapshotSource, LocalNotificationQueue},
    config::Config,
    error::NotifierError,
    sync::{ReconciliationTrigger, SyncState},
};
use reminder_core::domain::Snapshot;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), NotifierError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting notifier...");
    info!(
        "Horizon: {} days / {} weeks ({:?} profile).",
        config.horizon.days, config.horizon.weeks, config.platform
    );

    // --- 2. Initialize the Notification Queue Adapter ---
    let queue = LocalNotificationQueue::new(config.notifications_permitted, config.queue_capacity);
    let shutdown = CancellationToken::new();
    let delivery = tokio::spawn(
        queue
            .clone()
            .run_delivery(Duration::from_secs(1), shutdown.clone()),
    );

    // --- 3. Build the Shared SyncState and Trigger ---
    let state = Arc::new(SyncState::from_config(Arc::new(queue), &config));
    let trigger = ReconciliationTrigger::new(state, config.debounce);

    // --- 4. Feed Snapshot Changes to the Trigger ---
    let source = JsonSnapshotSource::new(&config.snapshot_path);
    info!(
        "Watching {} every {:?}.",
        source.path().display(),
        config.poll_interval
    );
    let snapshots = source.watch(config.poll_interval);
    futures::pin_mut!(snapshots);

    // The horizon only moves forward when something replans, so replan daily even without edits.
    let mut refresh = tokio::time::interval(config.refresh_interval);
    refresh.tick().await;
    let mut latest: Option<Snapshot> = None;

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Shutdown requested.");
                break;
            }
            next = snapshots.next() => match next {
                Some(snapshot) => {
                    latest = Some(snapshot.clone());
                    trigger.on_change(snapshot);
                }
                None => break,
            },
            _ = refresh.tick() => {
                if let Some(snapshot) = latest.clone() {
                    info!("Refreshing the schedule horizon.");
                    trigger.invalidate();
                    trigger.on_change(snapshot);
                }
            }
        }
    }

    // --- 5. Stop the Delivery Loop ---
    shutdown.cancel();
    delivery
        .await
        .map_err(|e| NotifierError::Internal(e.to_string()))?;
    Ok(())
}
