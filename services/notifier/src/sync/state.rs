//! services/notifier/src/sync/state.rs
//!
//! Defines the state shared by every reconciliation.

use std::sync::Arc;

use reminder_core::ports::NotificationService;
use reminder_core::{Horizon, SchedulingGateway};

use crate::config::Config;

/// Created once at startup and shared by the trigger and its reconciliation tasks.
pub struct SyncState {
    pub gateway: SchedulingGateway,
    pub horizon: Horizon,
}

impl SyncState {
    pub fn new(
        service: Arc<dyn NotificationService>,
        horizon: Horizon,
        safety_margin: chrono::Duration,
    ) -> Self {
        Self {
            gateway: SchedulingGateway::new(service, safety_margin),
            horizon,
        }
    }

    /// Builds the state from the loaded configuration.
    pub fn from_config(service: Arc<dyn NotificationService>, config: &Config) -> Self {
        let safety_margin = chrono::Duration::from_std(config.safety_margin)
            .unwrap_or_else(|_| chrono::Duration::seconds(5));
        Self::new(service, config.horizon, safety_margin)
    }
}
