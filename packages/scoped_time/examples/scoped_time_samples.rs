//! Demonstrates the different ways of measuring code regions with `scoped_time`.
//!
//! Each sample sums a range of numbers and measures how long that took, using macros, explicit
//! records and scopes, runtime-generated names and recursion. At the end, the reports of the
//! default clock database are printed and exported as CSV.
//!
//! Run with: `cargo run --example scoped_time_samples`.
#![expect(
    clippy::arithmetic_side_effects,
    reason = "this is example code that doesn't need production-level safety"
)]

use std::hint::black_box;
use std::sync::{Arc, LazyLock};
use std::thread;

use scoped_time::{Base, Database, DefaultClock, Record, measure, measure_dynamic};

const LOOP_COUNT: u64 = 5_000_000;
const RECURSION_DEPTH: u32 = 10;

fn sum_range(count: u64) -> u64 {
    let mut sum = 0_u64;

    for i in 0..count {
        sum = black_box(sum + i);
    }

    sum
}

/// The recommended way: fast, panic-safe and short. Not for concurrent or recursive use.
fn measured_with_macro() {
    measure!(measure_with_macro);
    black_box(sum_range(LOOP_COUNT));
}

/// Explicit start and stop. Nothing is recorded if the region panics.
fn measured_manually() {
    static RECORD: LazyLock<Arc<Record>> = LazyLock::new(|| Record::register("manual_start_stop"));

    let start = RECORD.now();
    black_box(sum_range(LOOP_COUNT));
    RECORD.stop_measure(start);
}

/// Explicit record with a scope guard, same cost as the macro.
fn measured_with_scope() {
    static RECORD: LazyLock<Arc<Record<DefaultClock, Base>>> =
        LazyLock::new(|| Record::register("measure_with_scope"));

    let _scope = RECORD.scope();
    black_box(sum_range(LOOP_COUNT));
}

/// Safe for concurrent and recursive use, at the cost of a lock.
fn measured_thread_and_recursion_safe() {
    measure!("measure with thread and recursion safe macro", ThreadRecursionSafe);
    black_box(sum_range(LOOP_COUNT));
}

/// Record names computed at runtime.
fn measured_dynamic(index: u32) {
    measure_dynamic!(format!("dynamic_title_{index}"), ThreadSafe);
    black_box(sum_range(LOOP_COUNT / 10));
}

fn recursive_base(depth: u32) -> u64 {
    measure!(recursion_base, Base);

    let own = sum_range(LOOP_COUNT / 100);
    if depth > 1 { own + recursive_base(depth - 1) } else { own }
}

fn recursive_thread_safe(depth: u32) -> u64 {
    measure!(recursion_thread_safe, ThreadSafe);

    let own = sum_range(LOOP_COUNT / 100);
    if depth > 1 { own + recursive_thread_safe(depth - 1) } else { own }
}

fn recursive_recursion_safe(depth: u32) -> u64 {
    measure!(recursion_recursion_safe, RecursionSafe);

    let own = sum_range(LOOP_COUNT / 100);
    if depth > 1 { own + recursive_recursion_safe(depth - 1) } else { own }
}

fn recursive_thread_recursion_safe(depth: u32) -> u64 {
    measure!(recursion_thread_recursion_safe, ThreadRecursionSafe);

    let own = sum_range(LOOP_COUNT / 100);
    if depth > 1 {
        own + recursive_thread_recursion_safe(depth - 1)
    } else {
        own
    }
}

fn recursion_reference() {
    // The same work without recursion. The recursion-safe policies should report about this
    // much, while the others count every level and come out roughly ten times higher.
    measure!(recursion_reference);

    for _ in 0..RECURSION_DEPTH {
        black_box(sum_range(LOOP_COUNT / 100));
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    println!("=== Measurement samples ===");

    measured_with_macro();
    measured_manually();
    measured_with_scope();
    measured_thread_and_recursion_safe();

    for index in [1, 2, 1, 3] {
        measured_dynamic(index);
    }

    println!("=== Recursion ===");

    recursion_reference();
    black_box(recursive_base(RECURSION_DEPTH));
    black_box(recursive_thread_safe(RECURSION_DEPTH));
    black_box(recursive_recursion_safe(RECURSION_DEPTH));
    black_box(recursive_thread_recursion_safe(RECURSION_DEPTH));

    println!("=== Threads ===");

    thread::scope(|s| {
        for _ in 0..4 {
            s.spawn(|| {
                measured_thread_and_recursion_safe();
                black_box(recursive_thread_recursion_safe(RECURSION_DEPTH));
            });
        }
    });

    println!();
    scoped_time::print_measure();

    Database::<DefaultClock>::global()
        .write_csv_file(scoped_time::DEFAULT_CSV_FILE_NAME)
        .expect("writing the CSV report to the working directory should succeed");

    println!("CSV report written to {}", scoped_time::DEFAULT_CSV_FILE_NAME);
}
