pub mod reconcile_task;
pub mod state;
pub mod trigger;

// Re-export the trigger so the binary can wire it to the snapshot stream.
pub use reconcile_task::reconcile_process;
pub use state::SyncState;
pub use trigger::{ChangeDecision, ReconciliationTrigger};
