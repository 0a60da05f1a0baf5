//! crates/reminder_core/src/ports.rs
//!
//! Defines the service contracts (traits) the scheduling core depends on.
//! These traits form the boundary of the hexagonal architecture, so the planner
//! and gateway never know which device notification API sits behind them.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{Channel, Importance, NotificationMetadata, Snapshot};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Service unavailable: {0}")]
    Unavailable(String),
    #[error("Request rejected: {0}")]
    Rejected(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Notification Scheduling Port
//=========================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionStatus {
    Granted,
    Denied,
}

/// A one-shot date trigger as understood by the host scheduler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trigger {
    pub fire_at: DateTime<Utc>,
    pub channel: Channel,
}

/// Opaque identifier handed back by the host scheduler.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NotificationHandle(pub String);

#[async_trait]
pub trait NotificationService: Send + Sync {
    async fn request_permission(&self) -> PortResult<PermissionStatus>;

    /// Only meaningful on platforms with notification channels.
    async fn create_channel(&self, _channel: Channel, _importance: Importance) -> PortResult<()> {
        Ok(())
    }

    /// The instant the host would actually fire `trigger` at, if it can tell.
    async fn next_fire_time(&self, trigger: &Trigger) -> PortResult<Option<DateTime<Utc>>>;

    async fn schedule_at(
        &self,
        trigger: Trigger,
        title: &str,
        body: &str,
        metadata: &NotificationMetadata,
    ) -> PortResult<NotificationHandle>;

    async fn cancel_all(&self) -> PortResult<()>;

    async fn list_scheduled(&self) -> PortResult<Vec<NotificationHandle>>;
}

//=========================================================================================
// People / Settings Store Port
//=========================================================================================

/// Read-only access to the current people + settings.
#[async_trait]
pub trait SnapshotSource: Send + Sync {
    async fn load_snapshot(&self) -> PortResult<Snapshot>;
}
