pub mod local_queue;
pub mod snapshot;

pub use local_queue::LocalNotificationQueue;
pub use snapshot::JsonSnapshotSource;
