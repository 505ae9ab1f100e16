//! At-most-once dispatch guard for webhook-driven fulfillment.
//!
//! Stripe redelivers webhook events until it sees a 2xx, and its retry
//! workers can deliver the same event concurrently. The guard turns the
//! check-then-mark sequence into a single atomic insert so two simultaneous
//! deliveries of the same session can never both win.
//!
//! State is process-lifetime only: a restart forgets all claims, so a
//! redelivery that straddles a redeploy can dispatch twice. This is a known
//! limitation; the upgrade path is a unique-constraint insert in Postgres
//! (see DESIGN.md).

use dashmap::DashSet;
use shepherd_core::SessionId;

/// Registry of checkout sessions whose fulfillment has been dispatched.
#[derive(Debug, Default)]
pub struct IdempotencyGuard {
    processed: DashSet<String>,
}

impl IdempotencyGuard {
    /// Create an empty guard.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Atomically claim a session for dispatch.
    ///
    /// Returns `true` exactly once per key; every subsequent (or concurrent)
    /// call returns `false`. The claim is taken *before* the dispatch call,
    /// bounding the duplicate-submission window to the dispatch itself.
    pub fn claim(&self, session_id: &SessionId) -> bool {
        self.processed.insert(session_id.as_str().to_string())
    }

    /// Whether a session has already been claimed.
    #[must_use]
    pub fn seen(&self, session_id: &SessionId) -> bool {
        self.processed.contains(session_id.as_str())
    }
}
