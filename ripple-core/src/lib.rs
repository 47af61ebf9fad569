//! Ripple Core
//!
//! This crate provides the reactive engine for the Ripple runtime: a
//! fine-grained dependency-tracking system built from three primitives.
//!
//! - Signals: mutable reactive cells with read/write accessors
//! - Memos: cached derived values that notify only on change
//! - Effects: side-effecting computations that re-run when inputs change
//!
//! Dependencies are discovered automatically: reading a signal inside a
//! memo or effect subscribes that computation, and every re-run starts by
//! unsubscribing from the previous run's dependencies, so subscriptions
//! always mirror what the body actually read last time.
//!
//! # Example
//!
//! ```rust,ignore
//! use ripple_core::reactive::{create_signal, create_effect, create_memo};
//!
//! let (count, set_count) = create_signal(0);
//!
//! // A derived value
//! let count_reader = count.clone();
//! let doubled = create_memo(move || count_reader.get() * 2);
//!
//! // An effect
//! let _effect = create_effect(move || {
//!     println!("Count: {}, Doubled: {}", count.get(), doubled.get());
//! });
//!
//! // Update the signal
//! set_count.set(5);
//! // Effect runs synchronously, prints: "Count: 5, Doubled: 10"
//! ```

pub mod reactive;

pub use reactive::{
    create_effect, create_memo, create_signal, Effect, Memo, ReadSignal, Readable, Signal,
    WriteSignal,
};
