/// Measures the rest of the enclosing block with a process-wide record.
///
/// The first argument names the record, either as an identifier or as a string literal. The
/// optional second argument names the [`Policy`][crate::Policy] (default [`Base`][crate::Base])
/// and the optional third argument is the [`Clock`][crate::Clock] type (default
/// [`DefaultClock`][crate::DefaultClock]).
///
/// Each use site creates its record on first execution and registers it in the
/// [`Database::global()`][crate::Database::global] of the clock. Later executions only start
/// a scope, which ends together with the enclosing block.
///
/// When the `enabled` package feature is off, the macro expands to nothing.
///
/// # Examples
///
/// ```
/// use scoped_time::{Database, DefaultClock, measure};
///
/// fn parse_request() {
///     measure!(parse_request);
///     // Code to measure.
/// }
///
/// fn fibonacci(n: u64) -> u64 {
///     measure!("fibonacci", RecursionSafe);
///
///     if n < 2 { n } else { fibonacci(n - 1) + fibonacci(n - 2) }
/// }
///
/// parse_request();
/// fibonacci(10);
///
/// let database = Database::<DefaultClock>::global();
/// assert_eq!(database.find("parse_request").unwrap().num_calls(), 1);
/// assert_eq!(database.find("fibonacci").unwrap().num_calls(), 1);
/// ```
///
/// Selecting the clock:
///
/// ```
/// use scoped_time::{TscClock, measure};
///
/// fn hot_loop() {
///     measure!(hot_loop, ThreadSafe, TscClock);
///     // Code to measure.
/// }
/// # hot_loop();
/// ```
#[cfg(feature = "enabled")]
#[macro_export]
macro_rules! measure {
    ($name:ident) => {
        $crate::measure!(@scope ::std::stringify!($name), $crate::Base, $crate::DefaultClock);
    };
    ($name:literal) => {
        $crate::measure!(@scope $name, $crate::Base, $crate::DefaultClock);
    };
    ($name:ident, $policy:ident) => {
        $crate::measure!(@scope ::std::stringify!($name), $crate::$policy, $crate::DefaultClock);
    };
    ($name:literal, $policy:ident) => {
        $crate::measure!(@scope $name, $crate::$policy, $crate::DefaultClock);
    };
    ($name:ident, $policy:ident, $clock:ty) => {
        $crate::measure!(@scope ::std::stringify!($name), $crate::$policy, $clock);
    };
    ($name:literal, $policy:ident, $clock:ty) => {
        $crate::measure!(@scope $name, $crate::$policy, $clock);
    };
    (@scope $name:expr, $policy:ty, $clock:ty) => {
        let _scoped_time_scope = {
            static RECORD: ::std::sync::LazyLock<
                ::std::sync::Arc<$crate::Record<$clock, $policy>>,
            > = ::std::sync::LazyLock::new(|| $crate::Record::register($name));

            RECORD.scope()
        };
    };
}

/// Measures the rest of the enclosing block with a process-wide record.
///
/// The `enabled` package feature is off, so this expands to nothing.
#[cfg(not(feature = "enabled"))]
#[macro_export]
macro_rules! measure {
    ($($args:tt)*) => {};
}

/// Measures the rest of the enclosing block with a record whose name is computed at runtime.
///
/// The first argument is any expression that can be borrowed as `str`. The second argument
/// names the [`Policy`][crate::Policy] and the optional third argument is the
/// [`Clock`][crate::Clock] type (default [`DefaultClock`][crate::DefaultClock]).
///
/// The record is looked up in (or added to) the
/// [`DynamicDatabase::global()`][crate::DynamicDatabase::global] of the clock and policy on
/// every execution. The lookup is not part of the measured time but it does cost a hash, a
/// lock and possibly an allocation.
///
/// When the `enabled` package feature is off, the macro expands to nothing and the name
/// expression is not evaluated.
///
/// # Examples
///
/// ```
/// use scoped_time::{Database, DefaultClock, measure_dynamic};
///
/// fn load(table: &str) {
///     measure_dynamic!(format!("load_{table}"), ThreadSafe);
///     // Code to measure.
/// }
///
/// load("users");
/// load("orders");
/// load("users");
///
/// let database = Database::<DefaultClock>::global();
/// assert_eq!(database.find("load_users").unwrap().num_calls(), 2);
/// ```
#[cfg(feature = "enabled")]
#[macro_export]
macro_rules! measure_dynamic {
    ($name:expr, $policy:ident) => {
        $crate::measure_dynamic!($name, $policy, $crate::DefaultClock);
    };
    ($name:expr, $policy:ident, $clock:ty) => {
        let _scoped_time_record = $crate::Record::<$clock, $crate::$policy>::dynamic(
            ::std::convert::AsRef::<str>::as_ref(&$name),
        );
        let _scoped_time_scope = _scoped_time_record.scope();
    };
}

/// Measures the rest of the enclosing block with a record whose name is computed at runtime.
///
/// The `enabled` package feature is off, so this expands to nothing.
#[cfg(not(feature = "enabled"))]
#[macro_export]
macro_rules! measure_dynamic {
    ($($args:tt)*) => {};
}
