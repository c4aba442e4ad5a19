//! Correlation tracking of in-flight requests
//!
//! Maps each correlation id to the waiter suspended on it and,
//! separately, to the acknowledgment staged for pickup. The two maps
//! live behind one mutex so completion, pickup, and expiry are atomic
//! with respect to each other; the delivery path calls [`complete`]
//! while caller tasks drive the rest. The lock is never held across
//! an await — the waiter's oneshot receiver is consumed outside it.
//!
//! [`complete`]: CorrelationTracker::complete

use std::collections::HashMap;

use parking_lot::Mutex;
use tokio::sync::oneshot;
use tracing::debug;
use uuid::Uuid;

use hearth_core::ReplyMessage;

use crate::error::{GatewayError, Result};

#[derive(Default)]
struct State {
    /// Pending waiters, signalled exactly once each
    waiters: HashMap<Uuid, oneshot::Sender<()>>,
    /// Acknowledgments staged for pickup
    results: HashMap<Uuid, ReplyMessage>,
}

/// Tracks which correlation ids are awaited and which have resolved
#[derive(Default)]
pub struct CorrelationTracker {
    state: Mutex<State>,
}

/// Handle for one tracked request; consumed by waiting on it
pub struct PendingRequest {
    id: Uuid,
    rx: oneshot::Receiver<()>,
}

impl PendingRequest {
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Suspend until the matching acknowledgment is signalled.
    ///
    /// Returns false if the waiter was removed without being
    /// signalled (expired by another path).
    pub async fn wait(self) -> bool {
        self.rx.await.is_ok()
    }
}

impl CorrelationTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new waiter for `id`.
    ///
    /// Ids are minted fresh per request, so a collision means a bug
    /// upstream rather than a recoverable condition.
    pub fn start(&self, id: Uuid) -> Result<PendingRequest> {
        let mut state = self.state.lock();
        if state.waiters.contains_key(&id) {
            return Err(GatewayError::Internal(format!(
                "correlation id {id} already tracked"
            )));
        }

        let (tx, rx) = oneshot::channel();
        state.waiters.insert(id, tx);
        debug!("tracking request {}", id);

        Ok(PendingRequest { id, rx })
    }

    /// Deliver an acknowledgment for `id`.
    ///
    /// If a waiter exists the reply is staged and the waiter signalled
    /// once. Late, duplicate, or unknown ids are tolerated no-ops —
    /// the delivery path must never fail because a caller gave up.
    pub fn complete(&self, id: Uuid, reply: ReplyMessage) {
        let mut state = self.state.lock();
        match state.waiters.remove(&id) {
            Some(tx) => {
                state.results.insert(id, reply);
                // Receiver may already be gone if the caller was
                // cancelled; expiry will reclaim the staged result.
                let _ = tx.send(());
            }
            None => {
                debug!("dropping acknowledgment for unknown or finished request {}", id);
            }
        }
    }

    /// Remove and return the staged acknowledgment, if any.
    ///
    /// Idempotent: the second call for an id always returns None.
    pub fn take(&self, id: Uuid) -> Option<ReplyMessage> {
        self.state.lock().results.remove(&id)
    }

    /// Abandon `id`: drop its waiter and any staged acknowledgment so
    /// a later delivery is a no-op instead of resurrecting the
    /// request, and nothing is retained for ids nobody will pick up.
    pub fn expire(&self, id: Uuid) {
        let mut state = self.state.lock();
        state.waiters.remove(&id);
        state.results.remove(&id);
    }

    /// Number of requests currently awaited
    pub fn pending(&self) -> usize {
        self.state.lock().waiters.len()
    }

    /// Number of acknowledgments staged but not yet picked up
    pub fn staged(&self) -> usize {
        self.state.lock().results.len()
    }
}
