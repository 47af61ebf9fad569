//! Signal Implementation
//!
//! A Signal is the fundamental reactive primitive. It holds a value and
//! tracks which computations depend on it.
//!
//! # How Signals Work
//!
//! 1. When a signal is read while a computation is executing, the signal
//!    subscribes that computation: the signal's ID goes into the
//!    computation's dependency set, and the computation's ID goes into the
//!    signal's subscriber set. Both sides are sets, so repeated reads within
//!    one run are idempotent. A read outside any computation has no side
//!    effects.
//!
//! 2. When a signal's value is written, every current subscriber re-executes
//!    synchronously, snapshot first. Writes carry no equality gate: an
//!    identical value still notifies. Only memos suppress unchanged output
//!    (see `memo`).
//!
//! # Thread Safety
//!
//! The value sits behind a RwLock; subscriber bookkeeping lives in the
//! runtime's lock-protected maps. Dependency attribution itself is
//! thread-local (see `context`).

use std::fmt::Debug;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use tracing::trace;

use super::context::ReactiveContext;
use super::runtime::Runtime;

/// Counter for generating unique signal IDs.
static SIGNAL_ID_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Unique identifier for a reactive source.
///
/// Both plain signals and the signal role of memos carry one; computations
/// store these IDs in their dependency sets instead of referencing sources
/// directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SignalId(u64);

impl SignalId {
    /// Allocate the next unique signal ID.
    pub(crate) fn next() -> Self {
        Self(SIGNAL_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

/// Capability interface for anything whose value can be read reactively.
///
/// Implemented by [`Signal`], [`ReadSignal`], and [`Memo`](super::Memo):
/// `get` participates in dependency tracking, `get_untracked` does not.
pub trait Readable<T> {
    /// Read the value, subscribing the executing computation if any.
    fn get(&self) -> T;

    /// Read the value without establishing a dependency.
    fn get_untracked(&self) -> T;
}

/// Releases the signal's runtime state once the last handle drops.
struct SignalRegistration {
    id: SignalId,
}

impl Drop for SignalRegistration {
    fn drop(&mut self) {
        Runtime::release_signal(self.id);
    }
}

/// A reactive signal holding a value of type T.
///
/// Cloning a signal produces another handle to the same shared state.
///
/// # Example
///
/// ```rust,ignore
/// let count = Signal::new(0);
///
/// // Read the value
/// let value = count.get();
///
/// // Update the value (notifies subscribers)
/// count.set(5);
/// ```
pub struct Signal<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Unique identifier for this signal.
    id: SignalId,

    /// The current value, protected by RwLock for thread safety.
    value: Arc<RwLock<T>>,

    /// Shared drop guard for runtime cleanup.
    registration: Arc<SignalRegistration>,
}

impl<T> Signal<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Create a new signal with the given initial value.
    pub fn new(value: T) -> Self {
        let id = SignalId::next();
        Self {
            id,
            value: Arc::new(RwLock::new(value)),
            registration: Arc::new(SignalRegistration { id }),
        }
    }

    /// Get the signal's unique ID.
    pub fn id(&self) -> SignalId {
        self.id
    }

    /// Get the current value.
    ///
    /// If a computation is currently executing, it becomes a subscriber of
    /// this signal before the value is returned.
    pub fn get(&self) -> T {
        if let Some(subscriber_id) = ReactiveContext::register_read(self.id) {
            Runtime::subscribe(self.id, subscriber_id);
        }

        self.value.read().expect("value lock poisoned").clone()
    }

    /// Get the current value without tracking dependencies.
    ///
    /// Use this when you need to read the value without establishing
    /// a reactive dependency.
    pub fn get_untracked(&self) -> T {
        self.value.read().expect("value lock poisoned").clone()
    }

    /// Set a new value and notify subscribers.
    ///
    /// Every write notifies, even when the new value equals the old one.
    /// The entire downstream cascade runs to completion before this returns.
    pub fn set(&self, value: T) {
        {
            let mut guard = self.value.write().expect("value lock poisoned");
            *guard = value;
        }

        trace!(signal_id = ?self.id, "signal written");
        Runtime::notify(self.id);
    }

    /// Update the value using a function.
    ///
    /// This is useful for updates that depend on the current value.
    pub fn update<F>(&self, f: F)
    where
        F: FnOnce(&T) -> T,
    {
        let new_value = {
            let guard = self.value.read().expect("value lock poisoned");
            f(&guard)
        };
        self.set(new_value);
    }

    /// Split this signal into a read handle and a write handle.
    pub fn split(&self) -> (ReadSignal<T>, WriteSignal<T>) {
        (
            ReadSignal {
                signal: self.clone(),
            },
            WriteSignal {
                signal: self.clone(),
            },
        )
    }

    /// Get the number of computations currently subscribed to this signal.
    pub fn subscriber_count(&self) -> usize {
        Runtime::subscriber_count(self.id)
    }
}

/// Create a signal and return its accessor pair.
///
/// This is the tuple-style surface over [`Signal`]: the read handle tracks
/// dependencies, the write handle notifies.
pub fn create_signal<T>(initial: T) -> (ReadSignal<T>, WriteSignal<T>)
where
    T: Clone + Send + Sync + 'static,
{
    Signal::new(initial).split()
}

impl<T> Readable<T> for Signal<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn get(&self) -> T {
        Signal::get(self)
    }

    fn get_untracked(&self) -> T {
        Signal::get_untracked(self)
    }
}

impl<T> Clone for Signal<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            value: Arc::clone(&self.value),
            registration: Arc::clone(&self.registration),
        }
    }
}

impl<T> Debug for Signal<T>
where
    T: Clone + Send + Sync + Debug + 'static,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Signal")
            .field("id", &self.id)
            .field("value", &self.get_untracked())
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}

/// Read half of a signal accessor pair.
pub struct ReadSignal<T>
where
    T: Clone + Send + Sync + 'static,
{
    signal: Signal<T>,
}

impl<T> ReadSignal<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Get the current value, subscribing the executing computation if any.
    pub fn get(&self) -> T {
        self.signal.get()
    }

    /// Get the current value without tracking dependencies.
    pub fn get_untracked(&self) -> T {
        self.signal.get_untracked()
    }

    /// Get the underlying signal's unique ID.
    pub fn id(&self) -> SignalId {
        self.signal.id()
    }
}

impl<T> Readable<T> for ReadSignal<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn get(&self) -> T {
        ReadSignal::get(self)
    }

    fn get_untracked(&self) -> T {
        ReadSignal::get_untracked(self)
    }
}

impl<T> Clone for ReadSignal<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            signal: self.signal.clone(),
        }
    }
}

/// Write half of a signal accessor pair.
pub struct WriteSignal<T>
where
    T: Clone + Send + Sync + 'static,
{
    signal: Signal<T>,
}

impl<T> WriteSignal<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Set a new value and notify subscribers unconditionally.
    pub fn set(&self, value: T) {
        self.signal.set(value);
    }

    /// Update the value using a function.
    pub fn update<F>(&self, f: F)
    where
        F: FnOnce(&T) -> T,
    {
        self.signal.update(f);
    }
}

impl<T> Clone for WriteSignal<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            signal: self.signal.clone(),
        }
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
