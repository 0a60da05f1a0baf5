pub mod composer;
pub mod domain;
pub mod gateway;
pub mod planner;
pub mod ports;
pub mod recurrence;
pub mod signature;

pub use domain::{
    Channel, Horizon, Importance, Locale, NotificationMetadata, OccasionKind, Person,
    PlannedNotification, Platform, Settings, Snapshot,
};
pub use gateway::{CommitOutcome, CommitReport, SchedulingGateway, SubmissionFailure};
pub use planner::plan;
pub use ports::{
    NotificationHandle, NotificationService, PermissionStatus, PortError, PortResult,
    SnapshotSource, Trigger,
};
pub use recurrence::{age_on, next_occurrence, CalendarDate, DateError};
pub use signature::{compute_signature, NotificationSignature};
