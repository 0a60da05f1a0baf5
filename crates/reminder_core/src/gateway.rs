//! crates/reminder_core/src/gateway.rs
//!
//! Commits a plan against the external notification scheduler.
//!
//! Every commit is a full replace: the scheduler's queue is cleared and the
//! plan resubmitted, so no stale or duplicate entry survives. Entries whose
//! fire time is not safely in the future are dropped instead of submitted,
//! because the host would fire them immediately.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};

use crate::domain::{Channel, PlannedNotification};
use crate::ports::{
    NotificationHandle, NotificationService, PermissionStatus, PortError, PortResult, Trigger,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    Committed,
    /// Nothing was touched; the queue still holds whatever it held before.
    PermissionDenied,
}

/// A single entry the scheduler refused.
#[derive(Debug)]
pub struct SubmissionFailure {
    pub fire_at: DateTime<Utc>,
    pub channel: Channel,
    pub error: PortError,
}

#[derive(Debug)]
pub struct CommitReport {
    pub outcome: CommitOutcome,
    pub submitted: Vec<NotificationHandle>,
    pub dropped_past: usize,
    /// Entries whose fire time the scheduler could not report; the planned
    /// instant was used for the safety-margin check instead.
    pub fire_time_fallbacks: usize,
    pub failures: Vec<SubmissionFailure>,
    /// What the scheduler reports as queued once the commit finished, if it could tell.
    pub queued_after: Option<usize>,
}

impl CommitReport {
    fn permission_denied() -> Self {
        Self {
            outcome: CommitOutcome::PermissionDenied,
            submitted: Vec::new(),
            dropped_past: 0,
            fire_time_fallbacks: 0,
            failures: Vec::new(),
            queued_after: None,
        }
    }

    pub fn is_committed(&self) -> bool {
        self.outcome == CommitOutcome::Committed
    }
}

pub struct SchedulingGateway {
    service: Arc<dyn NotificationService>,
    safety_margin: Duration,
}

impl SchedulingGateway {
    pub fn new(service: Arc<dyn NotificationService>, safety_margin: Duration) -> Self {
        Self {
            service,
            safety_margin,
        }
    }

    /// Replaces everything queued with `plan`.
    ///
    /// Returns `Err` only when the queue could not be cleared; individual
    /// submission failures are collected in the report.
    pub async fn commit_plan(
        &self,
        plan: &[PlannedNotification],
        now: DateTime<Utc>,
    ) -> PortResult<CommitReport> {
        if self.service.request_permission().await? == PermissionStatus::Denied {
            return Ok(CommitReport::permission_denied());
        }

        for channel in [Channel::Daily, Channel::Weekly] {
            self.service
                .create_channel(channel, channel.importance())
                .await?;
        }

        self.service.cancel_all().await?;

        let earliest = now + self.safety_margin;
        let mut report = CommitReport {
            outcome: CommitOutcome::Committed,
            submitted: Vec::new(),
            dropped_past: 0,
            fire_time_fallbacks: 0,
            failures: Vec::new(),
            queued_after: None,
        };

        for entry in plan {
            let trigger = Trigger {
                fire_at: entry.fire_at,
                channel: entry.channel,
            };
            // Prefer the scheduler's own idea of when the trigger fires.
            let effective = match self.service.next_fire_time(&trigger).await {
                Ok(Some(at)) => at,
                Ok(None) => entry.fire_at,
                Err(_) => {
                    report.fire_time_fallbacks += 1;
                    entry.fire_at
                }
            };
            if effective <= earliest {
                report.dropped_past += 1;
                continue;
            }

            match self
                .service
                .schedule_at(trigger, &entry.title, &entry.body, &entry.metadata)
                .await
            {
                Ok(handle) => report.submitted.push(handle),
                Err(error) => report.failures.push(SubmissionFailure {
                    fire_at: entry.fire_at,
                    channel: entry.channel,
                    error,
                }),
            }
        }

        report.queued_after = self.service.list_scheduled().await.ok().map(|h| h.len());
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::NotificationMetadata;
    use async_trait::async_trait;
    use chrono::TimeZone;
    use std::sync::Mutex;

    /// Records calls; refuses titles containing "reject".
    #[derive(Default)]
    struct RecordingService {
        denied: bool,
        fire_time_unknown: bool,
        calls: Mutex<Vec<String>>,
        queued: Mutex<Vec<NotificationHandle>>,
    }

    #[async_trait]
    impl NotificationService for RecordingService {
        async fn request_permission(&self) -> PortResult<PermissionStatus> {
            self.calls.lock().unwrap().push("permission".into());
            Ok(if self.denied {
                PermissionStatus::Denied
            } else {
                PermissionStatus::Granted
            })
        }

        async fn next_fire_time(&self, trigger: &Trigger) -> PortResult<Option<DateTime<Utc>>> {
            if self.fire_time_unknown {
                return Err(PortError::Unavailable("trigger api".into()));
            }
            Ok(Some(trigger.fire_at))
        }

        async fn schedule_at(
            &self,
            trigger: Trigger,
            title: &str,
            _body: &str,
            _metadata: &NotificationMetadata,
        ) -> PortResult<NotificationHandle> {
            if title.contains("reject") {
                return Err(PortError::Rejected("queue full".into()));
            }
            self.calls.lock().unwrap().push(format!("schedule {}", title));
            let handle = NotificationHandle(trigger.fire_at.to_rfc3339());
            self.queued.lock().unwrap().push(handle.clone());
            Ok(handle)
        }

        async fn cancel_all(&self) -> PortResult<()> {
            self.calls.lock().unwrap().push("cancel_all".into());
            self.queued.lock().unwrap().clear();
            Ok(())
        }

        async fn list_scheduled(&self) -> PortResult<Vec<NotificationHandle>> {
            Ok(self.queued.lock().unwrap().clone())
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 15, 8, 0, 0).unwrap()
    }

    fn entry(title: &str, fire_at: DateTime<Utc>) -> PlannedNotification {
        PlannedNotification {
            fire_at,
            title: title.to_string(),
            body: "body".to_string(),
            channel: Channel::Daily,
            metadata: NotificationMetadata::Weekly { anchor: fire_at },
        }
    }

    #[tokio::test]
    async fn clears_before_submitting() {
        let service = Arc::new(RecordingService::default());
        let gateway = SchedulingGateway::new(service.clone(), Duration::seconds(5));
        let plan = vec![entry("a", now() + Duration::hours(1))];

        let report = gateway.commit_plan(&plan, now()).await.unwrap();
        assert!(report.is_committed());
        assert_eq!(
            *service.calls.lock().unwrap(),
            vec!["permission", "cancel_all", "schedule a"]
        );
        assert_eq!(report.queued_after, Some(1));
    }

    #[tokio::test]
    async fn drops_entries_inside_the_safety_margin() {
        let service = Arc::new(RecordingService::default());
        let gateway = SchedulingGateway::new(service.clone(), Duration::seconds(5));
        let plan = vec![
            entry("past", now() - Duration::minutes(1)),
            entry("edge", now() + Duration::seconds(5)),
            entry("future", now() + Duration::seconds(6)),
        ];

        let report = gateway.commit_plan(&plan, now()).await.unwrap();
        assert_eq!(report.dropped_past, 2);
        assert_eq!(report.submitted.len(), 1);
    }

    #[tokio::test]
    async fn failed_submission_does_not_abort_the_batch() {
        let service = Arc::new(RecordingService::default());
        let gateway = SchedulingGateway::new(service.clone(), Duration::seconds(5));
        let plan = vec![
            entry("reject me", now() + Duration::hours(1)),
            entry("b", now() + Duration::hours(2)),
        ];

        let report = gateway.commit_plan(&plan, now()).await.unwrap();
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.submitted.len(), 1);
        assert!(matches!(report.failures[0].error, PortError::Rejected(_)));
    }

    #[tokio::test]
    async fn unknown_fire_time_falls_back_to_the_planned_instant() {
        let service = Arc::new(RecordingService {
            fire_time_unknown: true,
            ..Default::default()
        });
        let gateway = SchedulingGateway::new(service.clone(), Duration::seconds(5));
        let plan = vec![
            entry("past", now() - Duration::minutes(1)),
            entry("future", now() + Duration::hours(1)),
        ];

        let report = gateway.commit_plan(&plan, now()).await.unwrap();
        assert_eq!(report.fire_time_fallbacks, 2);
        assert_eq!(report.dropped_past, 1);
        assert_eq!(report.submitted.len(), 1);
    }

    #[tokio::test]
    async fn permission_denied_leaves_the_queue_alone() {
        let service = Arc::new(RecordingService {
            denied: true,
            ..Default::default()
        });
        let gateway = SchedulingGateway::new(service.clone(), Duration::seconds(5));
        let plan = vec![entry("a", now() + Duration::hours(1))];

        let report = gateway.commit_plan(&plan, now()).await.unwrap();
        assert_eq!(report.outcome, CommitOutcome::PermissionDenied);
        assert_eq!(*service.calls.lock().unwrap(), vec!["permission"]);
    }
}
