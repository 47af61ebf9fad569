//! Effect Implementation
//!
//! An Effect is a side-effecting computation that re-runs whenever a signal
//! it read during its previous run is written.
//!
//! # How Effects Work
//!
//! 1. When created, the effect runs its body immediately to establish
//!    initial dependencies.
//!
//! 2. A write to any of those signals re-executes the body synchronously.
//!
//! 3. Before every run, the effect unsubscribes from all previous
//!    dependencies; running the body re-subscribes it to exactly the signals
//!    it reads this time. This is required correctness, not an optimization:
//!    a body that conditionally reads signal A or signal B must not remain
//!    subscribed to the branch it didn't take.
//!
//! # Lifecycle
//!
//! An effect re-executes in place; its identity never changes across runs.
//! Dropping the last `Effect` handle unregisters the computation from the
//! runtime. `dispose()` silences it without dropping.
//!
//! # Use Cases
//!
//! Effects synchronize reactive state with the outside world: patching
//! rendered output, logging, writing to files.

use std::fmt::Debug;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};

use indexmap::IndexSet;
use tracing::trace;

use super::context::ReactiveContext;
use super::runtime::{ReactiveHandle, Runtime};
use super::signal::SignalId;
use super::subscriber::{Computation, SubscriberId};

struct EffectInner {
    /// The subscriber ID used for dependency tracking.
    subscriber_id: SubscriberId,

    /// The effect body.
    run: Box<dyn Fn() + Send + Sync>,

    /// Signals read during the most recent run. Shared with the tracking
    /// context while the body executes.
    dependencies: Arc<RwLock<IndexSet<SignalId>>>,

    /// Whether the effect has been disposed.
    disposed: AtomicBool,

    /// Number of completed runs.
    run_count: AtomicUsize,
}

impl Computation for EffectInner {
    fn subscriber_id(&self) -> SubscriberId {
        self.subscriber_id
    }

    fn execute(&self) {
        if self.disposed.load(Ordering::SeqCst) {
            return;
        }

        // Cleanup: drop every subscription from the previous run. If the
        // body panics below, whatever it re-subscribed to before the panic
        // is what remains.
        let stale: Vec<SignalId> = {
            let mut deps = self.dependencies.write().expect("dependencies lock poisoned");
            deps.drain(..).collect()
        };
        for signal_id in stale {
            Runtime::unsubscribe(signal_id, self.subscriber_id);
        }

        trace!(subscriber_id = ?self.subscriber_id, "running effect");

        // The guard restores the previous tracking context on drop, on
        // panic exits included.
        let _ctx = ReactiveContext::enter(self.subscriber_id, Arc::clone(&self.dependencies));
        (self.run)();

        self.run_count.fetch_add(1, Ordering::SeqCst);
    }
}

/// A side-effecting computation that re-runs when its dependencies change.
///
/// The handle keeps the effect alive: once every clone is dropped, the
/// effect is unregistered and never runs again.
///
/// # Example
///
/// ```rust,ignore
/// let count = Signal::new(0);
///
/// let effect = Effect::new(move || {
///     println!("Count is: {}", count.get());
/// });
///
/// count.set(5);  // Prints: "Count is: 5"
/// ```
pub struct Effect {
    inner: Arc<EffectInner>,
    handle: Arc<ReactiveHandle>,
}

impl Effect {
    /// Create a new effect with the given body.
    ///
    /// The body runs immediately to establish initial dependencies. A panic
    /// in the initial run propagates to the caller.
    pub fn new<F>(run: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        let inner = Arc::new(EffectInner {
            subscriber_id: SubscriberId::new(),
            run: Box::new(run),
            dependencies: Arc::new(RwLock::new(IndexSet::new())),
            disposed: AtomicBool::new(false),
            run_count: AtomicUsize::new(0),
        });

        // Register before the first run so a write issued from the body
        // itself can already reach this effect.
        let handle = Runtime::register(Arc::clone(&inner) as Arc<dyn Computation>, None);

        inner.execute();

        Self {
            inner,
            handle: Arc::new(handle),
        }
    }

    /// Get the subscriber ID for this effect.
    pub fn subscriber_id(&self) -> SubscriberId {
        self.inner.subscriber_id
    }

    /// Dispose of the effect.
    ///
    /// After disposal, the effect will not run again.
    pub fn dispose(&self) {
        self.inner.disposed.store(true, Ordering::SeqCst);
    }

    /// Check if the effect has been disposed.
    pub fn is_disposed(&self) -> bool {
        self.inner.disposed.load(Ordering::SeqCst)
    }

    /// Get the number of times the effect has run to completion.
    pub fn run_count(&self) -> usize {
        self.inner.run_count.load(Ordering::SeqCst)
    }

    /// Get the number of signals the effect currently depends on.
    pub fn dependency_count(&self) -> usize {
        self.inner
            .dependencies
            .read()
            .expect("dependencies lock poisoned")
            .len()
    }
}

/// Create an effect that runs `body` now and after every relevant write.
pub fn create_effect<F>(body: F) -> Effect
where
    F: Fn() + Send + Sync + 'static,
{
    Effect::new(body)
}

impl Clone for Effect {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            handle: Arc::clone(&self.handle),
        }
    }
}

impl Debug for Effect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Effect")
            .field("subscriber_id", &self.subscriber_id())
            .field("run_count", &self.run_count())
            .field("dependency_count", &self.dependency_count())
            .field("disposed", &self.is_disposed())
            .finish()
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
