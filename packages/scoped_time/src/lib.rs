#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Low-overhead timing of named code regions.
//!
//! Place a measurement at the start of a block and the time spent until the end of the block
//! is accumulated, together with a call count, in a named record. At the end of the program
//! the records are printed as a table or exported as CSV.
//!
//! ```
//! use scoped_time::measure;
//!
//! fn handle_request() {
//!     measure!(handle_request);
//!     // Code to measure.
//! }
//!
//! for _ in 0..3 {
//!     handle_request();
//! }
//!
//! scoped_time::print_measure();
//! ```
//!
//! Which prints something like:
//!
//! ```text
//! ------------------------------------- std times --------------------------------------
//!                                     Name       Calls       Total (ns)     Average (ns)
//! --------------------------------------------------------------------------------------
//!                           handle_request           3              135               45
//! --------------------------------------------------------------------------------------
//! ```
//!
//! # Safety policies
//!
//! Every record has a [`Policy`] that decides what it costs to measure and in which
//! situations the result is correct:
//!
//! * [`Base`] - cheapest, for regions that run on one thread and are not re-entered.
//! * [`ThreadSafe`] - for regions that run on several threads at once.
//! * [`RecursionSafe`] - for recursive functions on one thread. Only the outermost call is
//!   measured, so time is not counted twice.
//! * [`ThreadRecursionSafe`] - for recursive functions on several threads at once.
//!
//! ```
//! use scoped_time::measure;
//!
//! fn visit(depth: u32) {
//!     measure!(visit, ThreadRecursionSafe);
//!
//!     if depth > 0 {
//!         visit(depth - 1);
//!     }
//! }
//!
//! std::thread::scope(|s| {
//!     s.spawn(|| visit(10));
//!     s.spawn(|| visit(10));
//! });
//! ```
//!
//! # Clocks
//!
//! The clock is a type parameter, so the choice costs nothing at runtime:
//!
//! * [`StdClock`] - the standard library monotonic clock, in nanoseconds.
//! * [`TscClock`] - the processor timestamp counter, the cheapest to read.
//! * [`PerfCounterClock`] - the operating system performance counter.
//! * [`NullClock`] - never advances, for measuring the overhead of the framework itself.
//!
//! [`DefaultClock`] is [`StdClock`] unless the `tsc-default-clock` or
//! `perf-counter-default-clock` package feature selects another one.
//!
//! Each clock has its own process-wide [`Database`], which the [`measure!`] macro registers
//! records in.
//!
//! # Without macros
//!
//! The macros are shorthand for a process-wide [`Record`] and a [`Scope`] guard:
//!
//! ```
//! use std::sync::{Arc, LazyLock};
//!
//! use scoped_time::{Database, Record, StdClock, ThreadSafe};
//!
//! static ENCODE: LazyLock<Arc<Record<StdClock, ThreadSafe>>> =
//!     LazyLock::new(|| Record::register("encode"));
//!
//! fn encode() {
//!     let _scope = ENCODE.scope();
//!     // Code to measure.
//! }
//!
//! encode();
//!
//! let report = Database::<StdClock>::global().report();
//! if scoped_time::ENABLED {
//!     assert_eq!(report.record("encode").unwrap().num_calls(), 1);
//! }
//! ```
//!
//! # Records with runtime names
//!
//! When the name is only known at runtime, use [`measure_dynamic!`], [`Record::dynamic()`] or
//! a [`DynamicDatabase`]. Looking up the record costs a hash and a lock, which happen before
//! the measured region starts.
//!
//! # Turning measurement off
//!
//! All measurement is compiled out when the `enabled` package feature (on by default) is
//! disabled. The macros expand to nothing, scopes are empty and reports print nothing, while
//! all the types and functions remain available so that calling code compiles unchanged.
//!
//! # Logging
//!
//! Record registration and report export are logged via `tracing` at debug level. Nothing is
//! logged while measuring.

mod clock;
mod clocks;
mod database;
mod dynamic;
mod error;
mod format;
mod frequency;
mod globals;
mod macros;
mod policy;
mod record;
mod report;
mod scope;

pub use clock::*;
pub use clocks::*;
pub use database::*;
pub use dynamic::*;
pub use error::*;
pub use format::*;
pub use frequency::*;
pub use policy::*;
pub use record::*;
pub use report::*;
pub use scope::*;

/// Whether measurement is compiled in, as controlled by the `enabled` package feature.
pub const ENABLED: bool = cfg!(feature = "enabled");

/// Prints the report of the process-wide database of the [`DefaultClock`] to stdout.
///
/// Typically called at the end of the program. Prints nothing if no records are registered.
#[cfg_attr(test, mutants::skip)] // Too difficult to test stdout output reliably - manually tested.
pub fn print_measure() {
    Database::<DefaultClock>::global().print_report();
}

trait Sealed {}
