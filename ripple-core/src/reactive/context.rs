//! Reactive Context
//!
//! The reactive context tracks which computation is currently running.
//! This enables automatic dependency tracking: when a signal is read,
//! we register the current computation as a subscriber without the caller
//! ever naming it.
//!
//! # Implementation
//!
//! We use a thread-local stack to track the currently executing computation.
//! When a computation starts executing, it pushes an entry onto the stack;
//! when it finishes, the entry is popped. The stack (rather than a single
//! slot that gets cleared) is what makes nested execution correct: a
//! computation whose body synchronously triggers another computation resumes
//! its own tracking status once the inner one returns.
//!
//! The pop happens in a drop guard, so the context is restored on every exit
//! path, including panics in user-supplied bodies. A panic must not leave a
//! dead computation installed as the context for all future reads.

use std::cell::RefCell;
use std::sync::{Arc, RwLock};

use indexmap::IndexSet;
use smallvec::SmallVec;

use super::signal::SignalId;
use super::subscriber::SubscriberId;

/// The reactive context stack.
///
/// Each thread has its own stack, so dependency attribution never crosses
/// threads and no synchronization is needed on the hot path. Nesting depth
/// is almost always small; SmallVec keeps the common case allocation-free.
thread_local! {
    static CONTEXT_STACK: RefCell<SmallVec<[ContextEntry; 4]>> =
        RefCell::new(SmallVec::new());
}

/// An entry in the reactive context stack.
struct ContextEntry {
    /// The subscriber ID of the executing computation.
    subscriber_id: SubscriberId,
    /// Shared handle to that computation's dependency set. Signal reads
    /// insert into this set directly, so the computation-side half of the
    /// subscription link is written inside `get()`, exactly once per signal.
    dependencies: Arc<RwLock<IndexSet<SignalId>>>,
}

/// Guard that pops the context when dropped.
pub struct ReactiveContext {
    subscriber_id: SubscriberId,
}

impl ReactiveContext {
    /// Enter a reactive context for the given computation.
    ///
    /// While the returned guard is alive, any signal read on this thread
    /// records the signal in `dependencies` and subscribes the computation
    /// to the signal. The previous context (if any) is restored when the
    /// guard drops.
    pub fn enter(
        subscriber_id: SubscriberId,
        dependencies: Arc<RwLock<IndexSet<SignalId>>>,
    ) -> Self {
        CONTEXT_STACK.with(|stack| {
            stack.borrow_mut().push(ContextEntry {
                subscriber_id,
                dependencies,
            });
        });

        Self { subscriber_id }
    }

    /// Check if a computation is currently executing on this thread.
    pub fn is_active() -> bool {
        CONTEXT_STACK.with(|stack| !stack.borrow().is_empty())
    }

    /// Get the subscriber ID of the innermost executing computation, if any.
    pub fn current_subscriber() -> Option<SubscriberId> {
        CONTEXT_STACK.with(|stack| stack.borrow().last().map(|entry| entry.subscriber_id))
    }

    /// Record that the current computation read the given signal.
    ///
    /// Inserts the signal into the computation's dependency set and returns
    /// the computation's subscriber ID so the caller can write the
    /// signal-side half of the link. Returns `None` when no computation is
    /// executing; a top-level read has no side effects.
    pub fn register_read(signal_id: SignalId) -> Option<SubscriberId> {
        CONTEXT_STACK.with(|stack| {
            let stack = stack.borrow();
            let entry = stack.last()?;
            entry
                .dependencies
                .write()
                .expect("dependencies lock poisoned")
                .insert(signal_id);
            Some(entry.subscriber_id)
        })
    }
}

impl Drop for ReactiveContext {
    fn drop(&mut self) {
        CONTEXT_STACK.with(|stack| {
            let popped = stack.borrow_mut().pop();

            // Verify we're popping the right context.
            // This helps catch bugs where contexts are mismatched.
            if let Some(entry) = popped {
                debug_assert_eq!(
                    entry.subscriber_id, self.subscriber_id,
                    "ReactiveContext mismatch: expected {:?}, got {:?}",
                    self.subscriber_id, entry.subscriber_id
                );
            }
        });
    }
}
