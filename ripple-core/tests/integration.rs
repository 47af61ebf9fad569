//! Integration Tests for the Reactive Engine
//!
//! These tests exercise signals, memos, and effects together: propagation,
//! dependency cleanup across conditional reads, change-gated memo
//! notification, nested execution, and panic behavior.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::Arc;

use ripple_core::reactive::{create_effect, create_memo, create_signal, ReactiveContext};

fn counter() -> Arc<AtomicI32> {
    Arc::new(AtomicI32::new(0))
}

/// Writing a signal re-runs a dependent effect exactly once, with the new
/// value visible inside the body.
#[test]
fn write_propagates_to_effect() {
    let (value, set_value) = create_signal(5);
    let runs = counter();
    let observed = Arc::new(AtomicI32::new(-1));

    let runs_clone = runs.clone();
    let observed_clone = observed.clone();
    let _effect = create_effect(move || {
        runs_clone.fetch_add(1, Ordering::SeqCst);
        observed_clone.store(value.get(), Ordering::SeqCst);
    });

    assert_eq!(runs.load(Ordering::SeqCst), 1);
    assert_eq!(observed.load(Ordering::SeqCst), 5);

    set_value.set(10);
    assert_eq!(runs.load(Ordering::SeqCst), 2);
    assert_eq!(observed.load(Ordering::SeqCst), 10);
}

/// Signal writes carry no equality gate: an identical value still notifies.
#[test]
fn identical_write_still_notifies() {
    let (value, set_value) = create_signal(7);
    let runs = counter();

    let runs_clone = runs.clone();
    let _effect = create_effect(move || {
        let _ = value.get();
        runs_clone.fetch_add(1, Ordering::SeqCst);
    });

    assert_eq!(runs.load(Ordering::SeqCst), 1);

    set_value.set(7);
    assert_eq!(runs.load(Ordering::SeqCst), 2);

    set_value.set(7);
    assert_eq!(runs.load(Ordering::SeqCst), 3);
}

/// A computation that conditionally reads A or B must drop the subscription
/// to the branch it didn't take this run. Writes to the stale branch are
/// silent; writes to the live branch re-trigger.
#[test]
fn conditional_read_cleans_up_stale_branch() {
    let (use_a, set_use_a) = create_signal(true);
    let (a, set_a) = create_signal(0);
    let (b, set_b) = create_signal(0);
    let runs = counter();

    let runs_clone = runs.clone();
    let _effect = create_effect(move || {
        runs_clone.fetch_add(1, Ordering::SeqCst);
        if use_a.get() {
            let _ = a.get();
        } else {
            let _ = b.get();
        }
    });

    assert_eq!(runs.load(Ordering::SeqCst), 1);

    // B has never been read; writing it is silent.
    set_b.set(1);
    assert_eq!(runs.load(Ordering::SeqCst), 1);

    // A is live.
    set_a.set(1);
    assert_eq!(runs.load(Ordering::SeqCst), 2);

    // Switch branches.
    set_use_a.set(false);
    assert_eq!(runs.load(Ordering::SeqCst), 3);

    // A is now the stale branch.
    set_a.set(2);
    assert_eq!(runs.load(Ordering::SeqCst), 3);

    // B is live.
    set_b.set(2);
    assert_eq!(runs.load(Ordering::SeqCst), 4);
}

/// Diamond: A and B feed memo M = A + B, effect E reads M. Two separate
/// writes mean two recomputes and two effect runs — propagation is
/// sequential, nothing is batched.
#[test]
fn diamond_propagates_sequentially() {
    let (a, set_a) = create_signal(2);
    let (b, set_b) = create_signal(3);
    let computes = counter();
    let effect_runs = counter();
    let seen = Arc::new(AtomicI32::new(0));

    let computes_clone = computes.clone();
    let sum = create_memo(move || {
        computes_clone.fetch_add(1, Ordering::SeqCst);
        a.get() + b.get()
    });

    let sum_reader = sum.clone();
    let effect_runs_clone = effect_runs.clone();
    let seen_clone = seen.clone();
    let _effect = create_effect(move || {
        effect_runs_clone.fetch_add(1, Ordering::SeqCst);
        seen_clone.store(sum_reader.get(), Ordering::SeqCst);
    });

    assert_eq!(computes.load(Ordering::SeqCst), 1);
    assert_eq!(effect_runs.load(Ordering::SeqCst), 1);
    assert_eq!(seen.load(Ordering::SeqCst), 5);

    set_a.set(5);
    assert_eq!(computes.load(Ordering::SeqCst), 2);
    assert_eq!(effect_runs.load(Ordering::SeqCst), 2);
    assert_eq!(seen.load(Ordering::SeqCst), 8);

    set_b.set(7);
    assert_eq!(computes.load(Ordering::SeqCst), 3);
    assert_eq!(effect_runs.load(Ordering::SeqCst), 3);
    assert_eq!(seen.load(Ordering::SeqCst), 12);
}

/// A write that leaves a memo's output unchanged must not re-run the memo's
/// subscribers.
#[test]
fn unchanged_memo_output_suppresses_downstream() {
    let (value, set_value) = create_signal(4);
    let effect_runs = counter();

    let parity = create_memo(move || value.get() % 2);

    let parity_reader = parity.clone();
    let effect_runs_clone = effect_runs.clone();
    let _effect = create_effect(move || {
        let _ = parity_reader.get();
        effect_runs_clone.fetch_add(1, Ordering::SeqCst);
    });

    assert_eq!(effect_runs.load(Ordering::SeqCst), 1);

    // 4 -> 6: parity stays 0, effect stays quiet.
    set_value.set(6);
    assert_eq!(effect_runs.load(Ordering::SeqCst), 1);

    // Writing the current value back is also a recompute with equal output.
    set_value.set(6);
    assert_eq!(effect_runs.load(Ordering::SeqCst), 1);

    // 6 -> 7 flips parity.
    set_value.set(7);
    assert_eq!(effect_runs.load(Ordering::SeqCst), 2);
}

/// Chained memos: reading the tail repeatedly recomputes nothing, and an
/// upstream write flows through the whole chain once.
#[test]
fn chained_memos_read_from_cache() {
    let (base, set_base) = create_signal(2);
    let squared_computes = counter();
    let plus_ten_computes = counter();

    let squared_computes_clone = squared_computes.clone();
    let squared = create_memo(move || {
        squared_computes_clone.fetch_add(1, Ordering::SeqCst);
        let v = base.get();
        v * v
    });

    let squared_reader = squared.clone();
    let plus_ten_computes_clone = plus_ten_computes.clone();
    let plus_ten = create_memo(move || {
        plus_ten_computes_clone.fetch_add(1, Ordering::SeqCst);
        squared_reader.get() + 10
    });

    assert_eq!(plus_ten.get(), 14);
    assert_eq!(plus_ten.get(), 14);
    assert_eq!(squared_computes.load(Ordering::SeqCst), 1);
    assert_eq!(plus_ten_computes.load(Ordering::SeqCst), 1);

    set_base.set(3);
    assert_eq!(plus_ten.get(), 19);
    assert_eq!(squared_computes.load(Ordering::SeqCst), 2);
    assert_eq!(plus_ten_computes.load(Ordering::SeqCst), 2);
}

/// An effect whose body triggers a nested effect run must resume its own
/// tracking context afterwards: a read made after the nested trigger still
/// attributes to the outer effect.
#[test]
fn nested_trigger_restores_outer_context() {
    let (first, set_first) = create_signal(0);
    let (relay, set_relay) = create_signal(0);
    let (last, set_last) = create_signal(0);
    let inner_runs = counter();
    let outer_runs = counter();

    let inner_runs_clone = inner_runs.clone();
    let _inner = create_effect(move || {
        let _ = relay.get();
        inner_runs_clone.fetch_add(1, Ordering::SeqCst);
    });
    assert_eq!(inner_runs.load(Ordering::SeqCst), 1);

    let outer_runs_clone = outer_runs.clone();
    let _outer = create_effect(move || {
        outer_runs_clone.fetch_add(1, Ordering::SeqCst);
        let _ = first.get();
        // Synchronously drives the inner effect before this body resumes.
        set_relay.set(1);
        let _ = last.get();
    });

    assert_eq!(outer_runs.load(Ordering::SeqCst), 1);
    // Initial run + the write above.
    assert_eq!(inner_runs.load(Ordering::SeqCst), 2);

    // `last` was read after the nested trigger returned; it must belong to
    // the outer effect.
    set_last.set(1);
    assert_eq!(outer_runs.load(Ordering::SeqCst), 2);
    assert_eq!(inner_runs.load(Ordering::SeqCst), 3);

    // And so must `first`.
    set_first.set(1);
    assert_eq!(outer_runs.load(Ordering::SeqCst), 3);
}

/// A panic in a body unwinds to the caller of the triggering write, and the
/// tracking context is restored on the way out.
#[test]
fn panic_restores_tracking_context() {
    let (value, set_value) = create_signal(0);

    let value_reader = value.clone();
    let _effect = create_effect(move || {
        if value_reader.get() == 1 {
            panic!("effect body failed");
        }
    });

    let result = catch_unwind(AssertUnwindSafe(|| set_value.set(1)));
    assert!(result.is_err());
    assert!(!ReactiveContext::is_active());

    // The engine still works: the effect stayed subscribed (it read the
    // signal before panicking) and runs again on the next write.
    set_value.set(2);
}

/// A panic during the notification fan-out aborts the snapshot loop:
/// subscribers later in the snapshot are skipped for that write.
#[test]
fn panic_skips_remaining_snapshot_siblings() {
    let (value, set_value) = create_signal(0);
    let second_runs = counter();

    // Subscribed first, so it is notified first.
    let value_reader = value.clone();
    let _first = create_effect(move || {
        if value_reader.get() == 1 {
            panic!("first subscriber failed");
        }
    });

    let value_reader = value.clone();
    let second_runs_clone = second_runs.clone();
    let _second = create_effect(move || {
        let _ = value_reader.get();
        second_runs_clone.fetch_add(1, Ordering::SeqCst);
    });

    assert_eq!(second_runs.load(Ordering::SeqCst), 1);

    let result = catch_unwind(AssertUnwindSafe(|| set_value.set(1)));
    assert!(result.is_err());
    // The sibling after the panicking effect never ran.
    assert_eq!(second_runs.load(Ordering::SeqCst), 1);

    // A later write reaches both again.
    set_value.set(2);
    assert_eq!(second_runs.load(Ordering::SeqCst), 2);
}

/// A computation that panics mid-run keeps the partial dependency set it
/// accumulated before the failure: cleanup already ran, and every read up to
/// the panic re-subscribed.
#[test]
fn panicked_run_keeps_partial_dependencies() {
    let (gate, set_gate) = create_signal(0);
    let (tail, set_tail) = create_signal(0);
    let runs = counter();

    let runs_clone = runs.clone();
    let gate_reader = gate.clone();
    let tail_reader = tail.clone();
    let _effect = create_effect(move || {
        runs_clone.fetch_add(1, Ordering::SeqCst);
        if gate_reader.get() == 1 {
            panic!("failed before reading tail");
        }
        let _ = tail_reader.get();
    });

    assert_eq!(runs.load(Ordering::SeqCst), 1);

    let result = catch_unwind(AssertUnwindSafe(|| set_gate.set(1)));
    assert!(result.is_err());
    assert_eq!(runs.load(Ordering::SeqCst), 2);

    // `tail` was not read during the failed run, so it is no longer a
    // dependency.
    set_tail.set(1);
    assert_eq!(runs.load(Ordering::SeqCst), 2);

    // `gate` was read before the panic and is still live.
    set_gate.set(0);
    assert_eq!(runs.load(Ordering::SeqCst), 3);

    // The successful run re-read `tail`.
    set_tail.set(2);
    assert_eq!(runs.load(Ordering::SeqCst), 4);
}

/// Memos compute eagerly at construction, before any read.
#[test]
fn memo_is_eager() {
    let computes = counter();

    let computes_clone = computes.clone();
    let memo = create_memo(move || {
        computes_clone.fetch_add(1, Ordering::SeqCst);
        String::from("ready")
    });

    assert_eq!(computes.load(Ordering::SeqCst), 1);
    assert_eq!(memo.get(), "ready");
    assert_eq!(computes.load(Ordering::SeqCst), 1);
}

/// An effect writing to an unrelated signal from inside its body drives that
/// signal's subscribers to completion before the original write returns.
#[test]
fn cascading_writes_run_to_completion() {
    let (source, set_source) = create_signal(1);
    let (derived, set_derived) = create_signal(0);
    let observed = Arc::new(AtomicI32::new(-1));

    let derived_reader = derived.clone();
    let observed_clone = observed.clone();
    let _sink = create_effect(move || {
        observed_clone.store(derived_reader.get(), Ordering::SeqCst);
    });

    let _relay = create_effect(move || {
        let v = source.get();
        set_derived.set(v * 10);
    });

    assert_eq!(observed.load(Ordering::SeqCst), 10);

    set_source.set(3);
    assert_eq!(observed.load(Ordering::SeqCst), 30);
}
