//! Memo Implementation
//!
//! A Memo is both a computation and a signal: it recomputes a derived value
//! whenever a dependency changes, and it notifies its own subscribers — but
//! only when the freshly computed value differs from the cached one.
//!
//! # How Memos Work
//!
//! 1. The initial value is computed synchronously at construction, which
//!    also establishes the initial dependency set.
//!
//! 2. A write to any dependency re-runs the computation immediately (push
//!    propagation; there is no dirty-flag laziness here).
//!
//! 3. If the new result equals the cached value under `T: PartialEq`, it is
//!    discarded and nobody downstream is notified. This is the whole point
//!    of a memo over an effect that recomputes a value: redundant work *and*
//!    redundant downstream re-execution are both suppressed.
//!
//! 4. Reading a memo behaves exactly like reading a signal: the cached value
//!    is returned and the executing computation, if any, subscribes. Reads
//!    never recompute — the cache is always current in this model.

use std::fmt::Debug;
use std::sync::{Arc, RwLock};

use indexmap::IndexSet;
use tracing::trace;

use super::context::ReactiveContext;
use super::runtime::{ReactiveHandle, Runtime};
use super::signal::{Readable, SignalId};
use super::subscriber::{Computation, SubscriberId};

struct MemoInner<T> {
    /// Identity of the computation role (what subscribes to dependencies).
    subscriber_id: SubscriberId,

    /// Identity of the signal role (what downstream computations subscribe to).
    signal_id: SignalId,

    /// The computation body.
    compute: Box<dyn Fn() -> T + Send + Sync>,

    /// The cached value. `None` only during the initial computation.
    value: RwLock<Option<T>>,

    /// Signals read during the most recent computation. Shared with the
    /// tracking context while the body executes.
    dependencies: Arc<RwLock<IndexSet<SignalId>>>,
}

impl<T> Computation for MemoInner<T>
where
    T: Clone + Send + Sync + PartialEq + 'static,
{
    fn subscriber_id(&self) -> SubscriberId {
        self.subscriber_id
    }

    fn execute(&self) {
        // Cleanup: same discipline as effects. Stale subscriptions from the
        // previous run must be gone before the body re-reads.
        let stale: Vec<SignalId> = {
            let mut deps = self.dependencies.write().expect("dependencies lock poisoned");
            deps.drain(..).collect()
        };
        for signal_id in stale {
            Runtime::unsubscribe(signal_id, self.subscriber_id);
        }

        // The guard must be gone before downstream notification: dependents
        // re-execute in their own context, not inside this memo's.
        let new_value = {
            let _ctx = ReactiveContext::enter(self.subscriber_id, Arc::clone(&self.dependencies));
            (self.compute)()
        };

        let changed = {
            let current = self.value.read().expect("value lock poisoned");
            current.as_ref() != Some(&new_value)
        };

        trace!(signal_id = ?self.signal_id, changed, "memo recomputed");

        if changed {
            *self.value.write().expect("value lock poisoned") = Some(new_value);
            Runtime::notify(self.signal_id);
        }
    }
}

/// A cached derived value that notifies subscribers only when it changes.
///
/// The `PartialEq` bound is the change gate: whatever equality means for `T`
/// decides whether downstream computations re-run.
///
/// # Example
///
/// ```rust,ignore
/// let count = Signal::new(2);
///
/// let count_clone = count.clone();
/// let doubled = Memo::new(move || count_clone.get() * 2);
///
/// assert_eq!(doubled.get(), 4);
/// count.set(5);
/// assert_eq!(doubled.get(), 10);
/// ```
pub struct Memo<T>
where
    T: Clone + Send + Sync + PartialEq + 'static,
{
    inner: Arc<MemoInner<T>>,
    handle: Arc<ReactiveHandle>,
}

impl<T> Memo<T>
where
    T: Clone + Send + Sync + PartialEq + 'static,
{
    /// Create a new memo with the given computation body.
    ///
    /// The body runs synchronously before this returns; the memo is born
    /// with a value and a live dependency set. A panic in the body
    /// propagates to the caller.
    pub fn new<F>(compute: F) -> Self
    where
        F: Fn() -> T + Send + Sync + 'static,
    {
        let signal_id = SignalId::next();
        let inner = Arc::new(MemoInner {
            subscriber_id: SubscriberId::new(),
            signal_id,
            compute: Box::new(compute),
            value: RwLock::new(None),
            dependencies: Arc::new(RwLock::new(IndexSet::new())),
        });

        // Register first so writes originating inside the initial
        // computation can already find this memo.
        let handle = Runtime::register(
            Arc::clone(&inner) as Arc<dyn Computation>,
            Some(signal_id),
        );

        inner.execute();

        Self {
            inner,
            handle: Arc::new(handle),
        }
    }

    /// Get the memo's signal-role ID.
    pub fn id(&self) -> SignalId {
        self.inner.signal_id
    }

    /// Get the subscriber ID of the memo's computation role.
    pub fn subscriber_id(&self) -> SubscriberId {
        self.inner.subscriber_id
    }

    /// Get the cached value.
    ///
    /// Behaves like `Signal::get`: the executing computation, if any,
    /// subscribes to this memo before the value is returned. Never triggers
    /// a recomputation.
    pub fn get(&self) -> T {
        if let Some(subscriber_id) = ReactiveContext::register_read(self.inner.signal_id) {
            Runtime::subscribe(self.inner.signal_id, subscriber_id);
        }

        self.inner
            .value
            .read()
            .expect("value lock poisoned")
            .clone()
            .expect("memo value computed at construction")
    }

    /// Get the cached value without tracking dependencies.
    pub fn get_untracked(&self) -> T {
        self.inner
            .value
            .read()
            .expect("value lock poisoned")
            .clone()
            .expect("memo value computed at construction")
    }

    /// Get the number of signals the memo currently depends on.
    pub fn dependency_count(&self) -> usize {
        self.inner
            .dependencies
            .read()
            .expect("dependencies lock poisoned")
            .len()
    }

    /// Get the number of computations subscribed to this memo.
    pub fn subscriber_count(&self) -> usize {
        Runtime::subscriber_count(self.inner.signal_id)
    }
}

/// Create a memo over `body` and return its read handle.
pub fn create_memo<T, F>(body: F) -> Memo<T>
where
    T: Clone + Send + Sync + PartialEq + 'static,
    F: Fn() -> T + Send + Sync + 'static,
{
    Memo::new(body)
}

impl<T> Readable<T> for Memo<T>
where
    T: Clone + Send + Sync + PartialEq + 'static,
{
    fn get(&self) -> T {
        Memo::get(self)
    }

    fn get_untracked(&self) -> T {
        Memo::get_untracked(self)
    }
}

impl<T> Clone for Memo<T>
where
    T: Clone + Send + Sync + PartialEq + 'static,
{
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            handle: Arc::clone(&self.handle),
        }
    }
}

impl<T> Debug for Memo<T>
where
    T: Clone + Send + Sync + PartialEq + Debug + 'static,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Memo")
            .field("id", &self.id())
            .field("value", &self.get_untracked())
            .field("dependency_count", &self.dependency_count())
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
