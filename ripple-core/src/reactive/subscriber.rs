//! Subscriber identity and the computation capability.
//!
//! A Computation is anything that re-executes when reactive values it read
//! change: an effect, or the computation half of a memo. Signals never hold
//! computations directly; they hold `SubscriberId`s, and the runtime resolves
//! those back to live computations at notification time. This breaks the
//! mutual Signal <-> Computation reference cycle.

use std::sync::atomic::{AtomicU64, Ordering};

/// Unique identifier for a computation.
///
/// Every effect and memo gets one at creation. The id is what signals store
/// in their subscriber sets, so duplicate reads of the same signal within one
/// run collapse to a single subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberId(u64);

impl SubscriberId {
    /// Generate a new unique subscriber ID.
    ///
    /// Uses an atomic counter to ensure uniqueness across threads.
    pub fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for SubscriberId {
    fn default() -> Self {
        Self::new()
    }
}

/// Capability interface for reactive computations.
///
/// `execute()` re-runs the computation in place: it unsubscribes from every
/// signal read during the previous run, installs itself as the tracking
/// context, runs its body (re-subscribing as a side effect of each read), and
/// restores the previous tracking context on the way out. Re-execution never
/// creates a new identity; `subscriber_id()` is stable for the lifetime of
/// the computation.
pub trait Computation: Send + Sync {
    /// Get the stable subscriber ID for this computation.
    fn subscriber_id(&self) -> SubscriberId;

    /// Re-run the computation body, refreshing its dependency set.
    fn execute(&self);
}
