//! Reactive Primitives
//!
//! This module implements the core reactive system: signals, memos, and
//! effects. These primitives form the foundation of Ripple's fine-grained
//! reactivity.
//!
//! # Concepts
//!
//! ## Signals
//!
//! A Signal is a container for mutable state. When a signal's value is read
//! within a tracking context (such as a memo or effect), the signal
//! automatically registers that context as a subscriber. Every write
//! notifies all subscribers synchronously — there is no equality gate and
//! no batching.
//!
//! ## Memos
//!
//! A Memo is a derived value that is both a computation and a signal: it
//! recomputes when a dependency changes and notifies its own subscribers,
//! but only when the computed value actually differs from the cached one.
//!
//! ## Effects
//!
//! An Effect is a side-effecting computation that re-runs whenever its
//! dependencies change. Effects are used to synchronize reactive state with
//! external systems, such as patching output or logging.
//!
//! # Implementation Notes
//!
//! The reactive system uses a thread-local tracking context to automatically
//! detect dependencies: when a signal is read, the currently executing
//! computation (if any) is subscribed without the caller naming it. Before
//! every re-run a computation unsubscribes from all previous dependencies,
//! so conditional reads never leave stale subscriptions behind.
//!
//! This approach (sometimes called "automatic dependency tracking" or
//! "transparent reactivity") is used by SolidJS, Vue 3, and Leptos.
//!
//! Propagation is synchronous and unguarded: a write drives its entire
//! downstream cascade to completion before returning, and a dependency
//! cycle recurses until the stack runs out. Callers must not build cycles.

mod context;
mod effect;
mod memo;
mod runtime;
mod signal;
mod subscriber;

pub use context::ReactiveContext;
pub use effect::{create_effect, Effect};
pub use memo::{create_memo, Memo};
pub use runtime::{ReactiveHandle, Runtime};
pub use signal::{create_signal, ReadSignal, Readable, Signal, SignalId, WriteSignal};
pub use subscriber::{Computation, SubscriberId};
