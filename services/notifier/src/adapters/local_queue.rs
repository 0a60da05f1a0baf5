//! services/notifier/src/adapters/local_queue.rs
//!
//! An in-process stand-in for the device's local notification centre.
//! It implements the `NotificationService` port from the `core` crate, keeps
//! pending notifications in memory with a bounded capacity (like the host
//! schedulers do), and "delivers" them by logging once they come due.

use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reminder_core::domain::{Channel, Importance, NotificationMetadata};
use reminder_core::ports::{
    NotificationHandle, NotificationService, PermissionStatus, PortError, PortResult, Trigger,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use uuid::Uuid;

/// A notification waiting in the queue.
#[derive(Debug, Clone)]
pub struct QueuedNotification {
    pub handle: NotificationHandle,
    pub fire_at: DateTime<Utc>,
    pub channel: Channel,
    pub title: String,
    pub body: String,
    pub metadata: NotificationMetadata,
}

#[derive(Default)]
struct QueueState {
    channels: HashSet<Channel>,
    pending: BTreeMap<NotificationHandle, QueuedNotification>,
}

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements the `NotificationService` port in memory.
#[derive(Clone)]
pub struct LocalNotificationQueue {
    permitted: Arc<AtomicBool>,
    capacity: usize,
    state: Arc<Mutex<QueueState>>,
}

impl LocalNotificationQueue {
    /// Creates a new `LocalNotificationQueue`.
    pub fn new(permitted: bool, capacity: usize) -> Self {
        Self {
            permitted: Arc::new(AtomicBool::new(permitted)),
            capacity,
            state: Arc::new(Mutex::new(QueueState::default())),
        }
    }

    /// Simulates the user granting or revoking notification permission.
    pub fn set_permitted(&self, permitted: bool) {
        self.permitted.store(permitted, Ordering::SeqCst);
    }

    /// Pending notifications ordered by fire time.
    pub fn pending(&self) -> Vec<QueuedNotification> {
        let state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        let mut pending: Vec<_> = state.pending.values().cloned().collect();
        pending.sort_by_key(|n| n.fire_at);
        pending
    }

    /// Removes and returns every notification due at `now`.
    pub fn take_due(&self, now: DateTime<Utc>) -> Vec<QueuedNotification> {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        let due: Vec<NotificationHandle> = state
            .pending
            .values()
            .filter(|n| n.fire_at <= now)
            .map(|n| n.handle.clone())
            .collect();
        let mut delivered: Vec<QueuedNotification> = due
            .iter()
            .filter_map(|handle| state.pending.remove(handle))
            .collect();
        delivered.sort_by_key(|n| n.fire_at);
        delivered
    }

    /// Delivers due notifications every `tick` until `shutdown` is cancelled.
    pub async fn run_delivery(self, tick: Duration, shutdown: CancellationToken) {
        let mut ticker = tokio::time::interval(tick);
        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    info!("Delivery loop stopped.");
                    return;
                }
                _ = ticker.tick() => {
                    for n in self.take_due(Utc::now()) {
                        info!(
                            channel = n.channel.id(),
                            "🔔 {}: {}",
                            n.title,
                            n.body
                        );
                    }
                }
            }
        }
    }
}

//=========================================================================================
// `NotificationService` Trait Implementation
//=========================================================================================

#[async_trait]
impl NotificationService for LocalNotificationQueue {
    async fn request_permission(&self) -> PortResult<PermissionStatus> {
        Ok(if self.permitted.load(Ordering::SeqCst) {
            PermissionStatus::Granted
        } else {
            PermissionStatus::Denied
        })
    }

    async fn create_channel(&self, channel: Channel, importance: Importance) -> PortResult<()> {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        if state.channels.insert(channel) {
            debug!("Created channel {} ({:?}).", channel.id(), importance);
        }
        Ok(())
    }

    async fn next_fire_time(&self, trigger: &Trigger) -> PortResult<Option<DateTime<Utc>>> {
        // One-shot date triggers fire exactly when asked to.
        Ok(Some(trigger.fire_at))
    }

    async fn schedule_at(
        &self,
        trigger: Trigger,
        title: &str,
        body: &str,
        metadata: &NotificationMetadata,
    ) -> PortResult<NotificationHandle> {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        if !state.channels.contains(&trigger.channel) {
            return Err(PortError::Rejected(format!(
                "channel {} does not exist",
                trigger.channel.id()
            )));
        }
        if state.pending.len() >= self.capacity {
            return Err(PortError::Rejected(format!(
                "queue is full ({} pending)",
                self.capacity
            )));
        }

        let handle = NotificationHandle(Uuid::new_v4().to_string());
        state.pending.insert(
            handle.clone(),
            QueuedNotification {
                handle: handle.clone(),
                fire_at: trigger.fire_at,
                channel: trigger.channel,
                title: title.to_string(),
                body: body.to_string(),
                metadata: metadata.clone(),
            },
        );
        Ok(handle)
    }

    async fn cancel_all(&self) -> PortResult<()> {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.pending.clear();
        Ok(())
    }

    async fn list_scheduled(&self) -> PortResult<Vec<NotificationHandle>> {
        let state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        Ok(state.pending.keys().cloned().collect())
    }
}
