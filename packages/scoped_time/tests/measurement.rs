//! End-to-end measurement behavior of the public API with real clocks and real threads.

#![cfg(feature = "enabled")]

use std::hint::black_box;
use std::thread;
use std::time::Duration;

use scoped_time::{
    Base, Clock, Database, NullClock, PerfCounterClock, Policy, Record, RecursionSafe, StdClock,
    ThreadRecursionSafe, ThreadSafe, TrackDepth, TscClock,
};

const THREADS: u64 = 8;
const CALLS_PER_THREAD: u64 = 10_000;

fn recurse<P: TrackDepth>(record: &Record<StdClock, P>, depth: u32) {
    let _scope = record.scope();
    black_box(depth);

    if depth > 1 {
        recurse(record, depth - 1);
    }
}

fn sleep_once<C: Clock, P: Policy>(record: &Record<C, P>) {
    let _scope = record.scope();
    thread::sleep(Duration::from_millis(10));
}

#[test]
fn sleep_is_measured_by_every_real_clock() {
    let std_record = Record::<StdClock, Base>::new("sleep");
    let tsc_record = Record::<TscClock, ThreadSafe>::new("sleep");
    let perf_record = Record::<PerfCounterClock, RecursionSafe>::new("sleep");

    sleep_once(&std_record);
    sleep_once(&tsc_record);
    sleep_once(&perf_record);

    for (title, calls, secs) in [
        ("std", std_record.num_calls(), std_record.total_secs()),
        ("tsc", tsc_record.num_calls(), tsc_record.total_secs()),
        ("perf", perf_record.num_calls(), perf_record.total_secs()),
    ] {
        assert_eq!(calls, 1, "{title}");
        assert!(secs >= 0.009, "{title} measured {secs} s");
        assert!(secs < 0.1, "{title} measured {secs} s");
    }
}

#[test]
fn null_clock_counts_calls_without_time() {
    let database = Database::<NullClock>::new();
    let record = database.record::<ThreadRecursionSafe>("overhead");

    for _ in 0..1_000 {
        recurse_null(&record, 3);
    }

    assert_eq!(record.num_calls(), 1_000);
    assert!(record.total_secs() <= 0.0);

    let report = database.report();
    let overhead = report.record("overhead").unwrap();
    assert!(!overhead.has_data());
    assert_eq!(overhead.average_secs(), None);
}

fn recurse_null(record: &Record<NullClock, ThreadRecursionSafe>, depth: u32) {
    let _scope = record.scope();

    if depth > 1 {
        recurse_null(record, depth - 1);
    }
}

#[test]
fn thread_safe_never_loses_updates() {
    let record = Record::<StdClock, ThreadSafe>::new("contended");

    thread::scope(|s| {
        for _ in 0..THREADS {
            s.spawn(|| {
                for _ in 0..CALLS_PER_THREAD {
                    let _scope = record.scope();
                    black_box(());
                }
            });
        }
    });

    assert_eq!(record.num_calls(), THREADS * CALLS_PER_THREAD);
    assert!(record.total_ticks() >= 0);
}

#[test]
fn base_under_contention_stays_within_bounds() {
    let record = Record::<StdClock, Base>::new("racy");

    thread::scope(|s| {
        for _ in 0..THREADS {
            s.spawn(|| {
                for _ in 0..CALLS_PER_THREAD {
                    let _scope = record.scope();
                }
            });
        }
    });

    // Lost updates are possible, extra ones are not.
    assert!(record.num_calls() <= THREADS * CALLS_PER_THREAD);
    assert!(record.num_calls() > 0);
}

#[test]
fn thread_recursion_safe_counts_outermost_calls_per_thread() {
    let record = Record::<StdClock, ThreadRecursionSafe>::new("tree_walk");

    thread::scope(|s| {
        for _ in 0..THREADS {
            s.spawn(|| {
                for _ in 0..1_000 {
                    recurse(&record, 10);
                }

                assert_eq!(record.depth(), 0);
            });
        }
    });

    assert_eq!(record.num_calls(), THREADS * 1_000);
}

#[test]
fn recursion_safe_matches_non_recursive_reference() {
    let reference = Record::<StdClock, Base>::new("reference");
    let recursive = Record::<StdClock, RecursionSafe>::new("recursive");

    {
        let _reference = reference.scope();
        recurse(&recursive, 10);
    }

    assert_eq!(recursive.num_calls(), 1);

    // The outer reference scope encloses the whole recursion, so it cannot be shorter.
    assert!(recursive.total_ticks() <= reference.total_ticks());
}

#[test]
fn manual_start_and_stop() {
    let record = Record::<StdClock, ThreadSafe>::new("manual");

    for _ in 0..5 {
        let start = record.now();
        black_box(());
        record.stop_measure(start);
    }

    assert_eq!(record.num_calls(), 5);
}

#[test]
fn reset_all_then_find_still_succeeds() {
    let database = Database::<StdClock>::new();
    let record = database.record::<ThreadSafe>("reset_me");

    sleep_once(&record);
    assert_eq!(database.find("reset_me").unwrap().num_calls(), 1);

    database.reset_all();

    let found = database.find("reset_me").unwrap();
    assert_eq!(found.num_calls(), 0);
    assert!(found.total_secs().abs() < f64::EPSILON);
}

#[test]
fn registered_records_reach_the_global_database() {
    let record = Record::<StdClock, RecursionSafe>::register("measurement_global_register");
    sleep_once(&record);

    let found = Database::<StdClock>::global()
        .find("measurement_global_register")
        .unwrap();

    assert_eq!(found.num_calls(), 1);
    assert!(found.total_secs() > 0.0);
}
