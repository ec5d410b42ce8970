//! Single in-flight action tracking
//!
//! A client runs at most one publish or revise action at a time. Starting an
//! action registers a oneshot sender; the host's answer resolves it. Once the
//! deadline passes the action counts as timed out whether or not its handle
//! is being awaited: the tracker is Idle again and late answers are dropped.
//!
//! ```text
//!            start()                     resolve() / deadline / drop
//!   Idle ─────────────────► InFlight ──────────────────────────────► Idle
//!     ▲       start() ──► Err(ActionInProgress)                        │
//!     └────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::{Error, Result};
use crate::types::{FailedResponse, SuccessfulResponse};
use std::future::{Future, IntoFuture};
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::oneshot::{self, error::TryRecvError};
use tokio::time::Instant;

/// Default time the host has to answer an action
pub const DEFAULT_ACTION_TIMEOUT: Duration = Duration::from_millis(10_000);

/// How the host answered an action
pub(crate) type Outcome = std::result::Result<SuccessfulResponse, FailedResponse>;

struct InFlight {
    id: u64,
    started_at: Instant,
    deadline: Instant,
    responder: oneshot::Sender<Outcome>,
}

#[derive(Default)]
pub(crate) struct ActionTracker {
    next_id: AtomicU64,
    current: Mutex<Option<InFlight>>,
}

impl ActionTracker {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Move to InFlight, or fail if an action is already pending
    pub fn start(self: &Arc<Self>, timeout: Duration) -> Result<PendingAction> {
        let mut current = self.lock();
        if current.is_some() {
            return Err(Error::ActionInProgress);
        }

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let started_at = Instant::now();
        let deadline = started_at + timeout;
        let (responder, receiver) = oneshot::channel();
        *current = Some(InFlight {
            id,
            started_at,
            deadline,
            responder,
        });
        tracing::debug!(action = id, "action started");

        Ok(PendingAction {
            id,
            deadline,
            receiver,
            tracker: Arc::clone(self),
        })
    }

    /// Deliver the host's answer to the pending action
    ///
    /// Returns `false` when no action is pending, including when the pending
    /// one is past its deadline.
    pub fn resolve(&self, outcome: Outcome) -> bool {
        let Some(in_flight) = self.lock().take() else {
            tracing::debug!("no action pending, ignoring host answer");
            return false;
        };

        tracing::info!(
            action = in_flight.id,
            elapsed = ?in_flight.started_at.elapsed(),
            success = outcome.is_ok(),
            "action resolved"
        );
        if in_flight.responder.send(outcome).is_err() {
            tracing::debug!(action = in_flight.id, "action no longer awaited");
        }
        true
    }

    /// Drop the pending action, failing its waiter with `ActionAborted`
    pub fn abort(&self) {
        if let Some(in_flight) = self.lock().take() {
            tracing::debug!(action = in_flight.id, "action aborted");
        }
    }

    pub fn is_idle(&self) -> bool {
        self.lock().is_none()
    }

    /// Return to Idle if `id` is still the pending action
    fn finish(&self, id: u64) {
        let mut current = self.lock();
        if current.as_ref().is_some_and(|in_flight| in_flight.id == id) {
            *current = None;
        }
    }

    /// Lock the pending slot, timing out an action past its deadline
    ///
    /// Dropping the expired responder closes the channel, which the waiting
    /// handle reports as `OperationTimeout`.
    fn lock(&self) -> MutexGuard<'_, Option<InFlight>> {
        let mut current = self.current.lock().unwrap_or_else(PoisonError::into_inner);
        if current
            .as_ref()
            .is_some_and(|in_flight| Instant::now() >= in_flight.deadline)
        {
            if let Some(expired) = current.take() {
                tracing::warn!(action = expired.id, "action timed out");
            }
        }
        current
    }
}

/// Handle to a publish or revise action awaiting the host's answer
///
/// Await it (or call [`response`](Self::response)) to get the result.
/// Dropping the handle abandons the action and frees the client for the
/// next one.
#[must_use = "an action is abandoned when its handle is dropped"]
pub struct PendingAction {
    id: u64,
    deadline: Instant,
    receiver: oneshot::Receiver<Outcome>,
    tracker: Arc<ActionTracker>,
}

impl PendingAction {
    /// Wait for the host's answer, up to the action's deadline
    ///
    /// An answer delivered before the deadline is returned even when the
    /// handle is awaited later; anything else past the deadline is
    /// `OperationTimeout`.
    pub async fn response(mut self) -> Result<SuccessfulResponse> {
        let received = match self.receiver.try_recv() {
            Ok(outcome) => Ok(Ok(outcome)),
            Err(TryRecvError::Empty | TryRecvError::Closed) => {
                tokio::time::timeout_at(self.deadline, &mut self.receiver).await
            }
        };

        match received {
            Ok(Ok(Ok(response))) => Ok(response),
            Ok(Ok(Err(failed))) => {
                tracing::warn!(action = self.id, reason = ?failed.reason, "action failed");
                Err(Error::ActionFailed(failed))
            }
            Ok(Err(_closed)) if Instant::now() >= self.deadline => {
                tracing::warn!(action = self.id, "action timed out");
                Err(Error::OperationTimeout)
            }
            Ok(Err(_closed)) => Err(Error::ActionAborted),
            Err(_elapsed) => {
                tracing::warn!(action = self.id, "action timed out");
                Err(Error::OperationTimeout)
            }
        }
    }

    /// When the action times out
    pub fn deadline(&self) -> Instant {
        self.deadline
    }
}

impl Drop for PendingAction {
    fn drop(&mut self) {
        self.tracker.finish(self.id);
    }
}

impl IntoFuture for PendingAction {
    type Output = Result<SuccessfulResponse>;
    type IntoFuture = Pin<Box<dyn Future<Output = Self::Output> + Send>>;

    fn into_future(self) -> Self::IntoFuture {
        Box::pin(self.response())
    }
}

impl std::fmt::Debug for PendingAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingAction")
            .field("id", &self.id)
            .field("deadline", &self.deadline)
            .finish_non_exhaustive()
    }
}
