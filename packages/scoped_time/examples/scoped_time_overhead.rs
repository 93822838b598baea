//! Prints how much a scope of each policy costs with each clock.
//!
//! A reference loop is timed once without and once with an empty scope inside it. The
//! difference per iteration is the overhead of one scope, shown in nanoseconds and in
//! processor clock cycles.
//!
//! The `NullClock` rows show the bookkeeping cost of each policy alone, because that clock is
//! never read.
//!
//! Run with: `cargo run --release --example scoped_time_overhead`.
#![expect(
    clippy::cast_precision_loss,
    reason = "this is example code that doesn't need production-level safety"
)]

use std::hint::black_box;

use scoped_time::{
    Base, Clock, NullClock, PerfCounterClock, Policy, Record, RecursionSafe, StdClock,
    ThreadRecursionSafe, ThreadSafe, TscClock, processor_frequency, time_to_str,
};

const LOOP_COUNT: u64 = 10_000_000;

fn main() {
    println!("Measuring processor frequency ...");
    let frequency = processor_frequency();
    println!("processor frequency = {:.2} MHz", frequency as f64 / 1e6);
    println!();

    println!("scope overhead:");
    measure_clock::<NullClock>(frequency);
    measure_clock::<StdClock>(frequency);
    measure_clock::<TscClock>(frequency);
    measure_clock::<PerfCounterClock>(frequency);
}

fn measure_clock<C: Clock>(frequency: u64) {
    measure_policy::<C, Base>(frequency);
    measure_policy::<C, ThreadSafe>(frequency);
    measure_policy::<C, RecursionSafe>(frequency);
    measure_policy::<C, ThreadRecursionSafe>(frequency);
}

fn measure_policy<C: Clock, P: Policy>(frequency: u64) {
    let reference = Record::<StdClock, Base>::new("reference");
    let target = Record::<StdClock, Base>::new("target");
    let tested = Record::<C, P>::new("tested");

    // Warm up the caches and the clock.
    for i in 0..LOOP_COUNT / 10 {
        let _scope = tested.scope();
        black_box(i);
    }

    {
        let _scope = reference.scope();
        for i in 0..LOOP_COUNT {
            black_box(i);
        }
    }

    {
        let _scope = target.scope();
        for i in 0..LOOP_COUNT {
            let _scope = tested.scope();
            black_box(i);
        }
    }

    let overhead_secs = target.total_secs() - reference.total_secs();
    let per_call_secs = overhead_secs / LOOP_COUNT as f64;

    println!(
        "{:>32}: ~ {:7.3} ns/call, ~ {:6.1} clock/call, {} total",
        format!("{}::{}", C::TITLE, P::NAME),
        per_call_secs * 1e9,
        per_call_secs * frequency as f64,
        time_to_str(overhead_secs)
    );
}
