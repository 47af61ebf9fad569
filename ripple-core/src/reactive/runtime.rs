//! Reactive Runtime
//!
//! The runtime owns the dependency graph that connects signals to the
//! computations reading them. Signals and computations never reference each
//! other directly; both sides go through ID-indexed maps held here, which is
//! what keeps the mutual Signal <-> Computation relationship free of
//! ownership cycles.
//!
//! # How It Works
//!
//! 1. When an effect or memo is created, it registers here and receives a
//!    handle; dropping the handle unregisters it.
//!
//! 2. When a signal is read inside an executing computation, `subscribe`
//!    records the computation in that signal's subscriber set.
//!
//! 3. When a signal's value is written, `notify` snapshots the subscriber
//!    set, resolves the IDs to live computations, releases every lock, and
//!    re-executes each computation synchronously.
//!
//! The snapshot is load-bearing: a re-executing subscriber will unsubscribe
//! and re-subscribe on the very signal being notified, and nested writes may
//! mutate subscriber sets arbitrarily. Neither may disturb the in-progress
//! fan-out, and no lock may be held while user code runs.
//!
//! # Thread Safety
//!
//! The maps are behind RwLocks so signals can be shared across threads; the
//! tracking context itself is thread-local (see `context`).

use std::collections::HashMap;
use std::sync::{Arc, OnceLock, RwLock, Weak};

use indexmap::IndexSet;
use tracing::trace;

use super::signal::SignalId;
use super::subscriber::{Computation, SubscriberId};

/// Handle to a registered computation.
///
/// Dropping this handle unregisters the computation: it disappears from the
/// registry and from every signal's subscriber set, and for a memo its own
/// subscriber set is released as well.
pub struct ReactiveHandle {
    subscriber_id: SubscriberId,
    /// The signal role of the computation, if it has one (memos).
    source: Option<SignalId>,
}

impl Drop for ReactiveHandle {
    fn drop(&mut self) {
        Runtime::unregister(self.subscriber_id, self.source);
    }
}

/// The global reactive runtime.
pub struct Runtime;

// Maps subscriber IDs to weak references so a dead computation is simply
// skipped at notification time rather than kept alive by the graph.
static REGISTRY: OnceLock<RwLock<HashMap<SubscriberId, Weak<dyn Computation>>>> = OnceLock::new();

// Subscriber sets, keyed by signal. IndexSet gives set semantics plus a
// deterministic insertion-order snapshot for the notification fan-out.
static SUBSCRIBERS: OnceLock<RwLock<HashMap<SignalId, IndexSet<SubscriberId>>>> = OnceLock::new();

fn registry() -> &'static RwLock<HashMap<SubscriberId, Weak<dyn Computation>>> {
    REGISTRY.get_or_init(|| RwLock::new(HashMap::new()))
}

fn subscribers() -> &'static RwLock<HashMap<SignalId, IndexSet<SubscriberId>>> {
    SUBSCRIBERS.get_or_init(|| RwLock::new(HashMap::new()))
}

impl Runtime {
    /// Register a computation with the runtime.
    ///
    /// `source` is the signal role of the computation (a memo's output
    /// signal), used to release its subscriber set on unregistration.
    ///
    /// Returns a handle that unregisters the computation when dropped.
    pub fn register(computation: Arc<dyn Computation>, source: Option<SignalId>) -> ReactiveHandle {
        let subscriber_id = computation.subscriber_id();

        registry()
            .write()
            .expect("registry lock poisoned")
            .insert(subscriber_id, Arc::downgrade(&computation));

        ReactiveHandle {
            subscriber_id,
            source,
        }
    }

    /// Unregister a computation, scrubbing it from every subscriber set.
    fn unregister(subscriber_id: SubscriberId, source: Option<SignalId>) {
        registry()
            .write()
            .expect("registry lock poisoned")
            .remove(&subscriber_id);

        let mut subs = subscribers().write().expect("subscribers lock poisoned");
        for set in subs.values_mut() {
            set.shift_remove(&subscriber_id);
        }
        if let Some(signal_id) = source {
            subs.remove(&signal_id);
        }
    }

    /// Record that `subscriber_id` depends on `signal_id`.
    ///
    /// Called from the signal's read path while a computation is executing.
    /// The set semantics make repeated reads within one run idempotent.
    pub fn subscribe(signal_id: SignalId, subscriber_id: SubscriberId) {
        subscribers()
            .write()
            .expect("subscribers lock poisoned")
            .entry(signal_id)
            .or_default()
            .insert(subscriber_id);
    }

    /// Remove `subscriber_id` from `signal_id`'s subscriber set.
    ///
    /// Called during dependency cleanup before a computation re-runs.
    pub fn unsubscribe(signal_id: SignalId, subscriber_id: SubscriberId) {
        if let Some(set) = subscribers()
            .write()
            .expect("subscribers lock poisoned")
            .get_mut(&signal_id)
        {
            set.shift_remove(&subscriber_id);
        }
    }

    /// Notify every current subscriber of `signal_id`.
    ///
    /// This is the push half of propagation: each subscriber's `execute()`
    /// runs synchronously, in subscription order, against an immutable
    /// snapshot of the set taken before the first call. A panic in one
    /// subscriber unwinds out of the loop; siblings later in the snapshot do
    /// not run.
    pub fn notify(signal_id: SignalId) {
        let snapshot: Vec<SubscriberId> = {
            let subs = subscribers().read().expect("subscribers lock poisoned");
            subs.get(&signal_id)
                .map(|set| set.iter().copied().collect())
                .unwrap_or_default()
        };

        if snapshot.is_empty() {
            return;
        }

        // Resolve IDs to live computations, then release the registry lock
        // before running any user code.
        let computations: Vec<Arc<dyn Computation>> = {
            let registry = registry().read().expect("registry lock poisoned");
            snapshot
                .iter()
                .filter_map(|id| registry.get(id).and_then(Weak::upgrade))
                .collect()
        };

        trace!(?signal_id, subscribers = computations.len(), "notifying");

        for computation in computations {
            computation.execute();
        }
    }

    /// Release a signal's subscriber set.
    ///
    /// Called when the last handle to a signal is dropped.
    pub(crate) fn release_signal(signal_id: SignalId) {
        subscribers()
            .write()
            .expect("subscribers lock poisoned")
            .remove(&signal_id);
    }

    /// Number of computations currently subscribed to `signal_id`.
    pub fn subscriber_count(signal_id: SignalId) -> usize {
        subscribers()
            .read()
            .expect("subscribers lock poisoned")
            .get(&signal_id)
            .map(|set| set.len())
            .unwrap_or(0)
    }
}
