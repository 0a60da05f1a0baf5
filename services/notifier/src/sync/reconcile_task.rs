//! services/notifier/src/sync/reconcile_task.rs
//!
//! One reconciliation pass: plan from the snapshot, then commit the plan.

use chrono::{DateTime, Local, Utc};
use reminder_core::domain::{Channel, Snapshot};
use reminder_core::gateway::{CommitOutcome, CommitReport};
use reminder_core::planner;
use reminder_core::ports::PortResult;
use std::time::Instant;
use tracing::{info, warn};

use crate::sync::state::SyncState;

/// Plans every notification for `snapshot` as of `now` and replaces the queue with it.
///
/// Once the gateway has started clearing the queue this runs to completion;
/// individual submission failures are logged and do not stop the pass.
pub async fn reconcile_process(
    state: &SyncState,
    snapshot: &Snapshot,
    now: DateTime<Local>,
) -> PortResult<CommitReport> {
    let start_time = Instant::now();

    let plan = planner::plan(&snapshot.settings, &snapshot.people, &now, state.horizon);
    let daily = plan.iter().filter(|n| n.channel == Channel::Daily).count();
    info!(
        "Planned {} notifications ({} daily, {} weekly) for {} people.",
        plan.len(),
        daily,
        plan.len() - daily,
        snapshot.people.len()
    );

    let report = state
        .gateway
        .commit_plan(&plan, now.with_timezone(&Utc))
        .await?;

    match report.outcome {
        CommitOutcome::PermissionDenied => {
            warn!("Notification permission denied; nothing was scheduled.");
        }
        CommitOutcome::Committed => {
            for failure in &report.failures {
                warn!(
                    "Failed to schedule {} notification at {}: {}",
                    failure.channel.id(),
                    failure.fire_at,
                    failure.error
                );
            }
            if report.fire_time_fallbacks > 0 {
                warn!(
                    "Fire time unknown for {} entries; used the planned time.",
                    report.fire_time_fallbacks
                );
            }
            info!(
                "Scheduled {} notifications ({} too close to now, {} failed, {} queued) in {:?}.",
                report.submitted.len(),
                report.dropped_past,
                report.failures.len(),
                report
                    .queued_after
                    .map(|n| n.to_string())
                    .unwrap_or_else(|| "unknown".to_string()),
                start_time.elapsed()
            );
        }
    }
    Ok(report)
}
