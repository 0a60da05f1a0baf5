//! services/notifier/src/sync/trigger.rs
//!
//! Decides when to reconcile. Every snapshot change is fingerprinted; an
//! unchanged fingerprint is a no-op, a changed one (re)starts a debounce timer.
//! When the timer elapses the reconciliation runs, serialized behind an
//! in-flight guard so two clear-then-submit sequences never interleave.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::Local;
use reminder_core::domain::Snapshot;
use reminder_core::signature::{compute_signature, NotificationSignature};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::sync::reconcile_task::reconcile_process;
use crate::sync::state::SyncState;

/// What `on_change` did with a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeDecision {
    /// Same fingerprint as the last commit; nothing to do.
    Unchanged,
    /// A reconciliation will run once the debounce window elapses.
    Scheduled,
}

pub struct ReconciliationTrigger {
    state: Arc<SyncState>,
    debounce: Duration,
    last_committed: Mutex<Option<NotificationSignature>>,
    /// Token of the debounce timer that is currently waiting, if any.
    pending: Mutex<Option<CancellationToken>>,
    /// Signature of the pass that is past its last cancellation check.
    running: Mutex<Option<NotificationSignature>>,
    in_flight: tokio::sync::Mutex<()>,
}

impl ReconciliationTrigger {
    pub fn new(state: Arc<SyncState>, debounce: Duration) -> Arc<Self> {
        Arc::new(Self {
            state,
            debounce,
            last_committed: Mutex::new(None),
            pending: Mutex::new(None),
            running: Mutex::new(None),
            in_flight: tokio::sync::Mutex::new(()),
        })
    }

    /// Signature of the last snapshot whose plan was committed.
    pub fn last_committed(&self) -> Option<NotificationSignature> {
        self.last_committed
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Forgets the last commit so the next change replans even if its
    /// signature is unchanged.
    pub fn invalidate(&self) {
        *self
            .last_committed
            .lock()
            .unwrap_or_else(|e| e.into_inner()) = None;
    }

    fn running_signature(&self) -> Option<NotificationSignature> {
        self.running.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Call whenever people or settings change.
    pub fn on_change(self: &Arc<Self>, snapshot: Snapshot) -> ChangeDecision {
        let signature = compute_signature(&snapshot.settings, &snapshot.people);

        let mut pending = self.pending.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(previous) = pending.take() {
            previous.cancel();
        }
        // A running pass decides what the queue ends up holding, not the last commit.
        let settled = match self.running_signature() {
            Some(running) => running == signature,
            None => self.last_committed().as_ref() == Some(&signature),
        };
        if settled {
            debug!("Snapshot {} already committed; nothing to do.", signature);
            return ChangeDecision::Unchanged;
        }

        let token = CancellationToken::new();
        *pending = Some(token.clone());
        drop(pending);

        debug!("Snapshot {} changed; reconciling in {:?}.", signature, self.debounce);
        let trigger = Arc::clone(self);
        let superseded = token.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = superseded.cancelled() => {
                    debug!("Debounce for {} superseded by a newer change.", signature);
                }
                _ = tokio::time::sleep(trigger.debounce) => {
                    trigger.reconcile(snapshot, signature, token).await;
                }
            }
        });
        ChangeDecision::Scheduled
    }

    async fn reconcile(
        &self,
        snapshot: Snapshot,
        signature: NotificationSignature,
        token: CancellationToken,
    ) {
        let _guard = self.in_flight.lock().await;

        {
            // Checked under the `pending` lock so `on_change` sees either a
            // cancelled timer or a running pass, never neither.
            let _pending = self.pending.lock().unwrap_or_else(|e| e.into_inner());
            // A newer change arrived while the previous pass held the guard.
            if token.is_cancelled() {
                debug!("Skipping superseded reconciliation {}.", signature);
                return;
            }
            if self.last_committed().as_ref() == Some(&signature) {
                return;
            }
            *self.running.lock().unwrap_or_else(|e| e.into_inner()) = Some(signature.clone());
        }

        info!("Reconciling notifications for snapshot {}.", signature);
        match reconcile_process(&self.state, &snapshot, Local::now()).await {
            Ok(report) if report.is_committed() => {
                *self
                    .last_committed
                    .lock()
                    .unwrap_or_else(|e| e.into_inner()) = Some(signature);
            }
            // Not recorded, so the next change (or restart) tries again.
            Ok(_) => {}
            Err(e) => {
                error!("Reconciliation {} failed: {}", signature, e);
            }
        }
        *self.running.lock().unwrap_or_else(|e| e.into_inner()) = None;
    }
}
