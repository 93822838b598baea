use std::any::type_name;
use std::borrow::Cow;
use std::fmt;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::marker::PhantomData;
use std::path::Path;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;

use crate::{
    Clock, DefaultClock, ENABLED, Error, Policy, Record, RecordStats, Report, ReportRecord, Result,
    globals,
};

/// File name used by [`Database::write_csv_file()`] callers that have no preference.
pub const DEFAULT_CSV_FILE_NAME: &str = "performance_report.csv";

/// The list of records measured with clock `C`, in registration order.
///
/// Records of every [`Policy`] share the database of their clock, so one report shows all
/// regions measured with that clock. The database holds shared ownership of its records,
/// which therefore stay reportable even if the code that created them is gone.
///
/// `Database` is a cheap handle: clones refer to the same list. Each clock has one
/// process-wide instance, obtained via [`global()`][Self::global], which the measurement
/// macros register into. Independent instances from [`new()`][Self::new] are useful for
/// isolated reporting and in tests.
///
/// # Examples
///
/// ```
/// use scoped_time::{Database, StdClock, ThreadSafe};
///
/// let database = Database::<StdClock>::new();
/// let record = database.record::<ThreadSafe>("render");
///
/// for _ in 0..10 {
///     let _scope = record.scope();
///     // Code to measure.
/// }
///
/// if scoped_time::ENABLED {
///     assert_eq!(database.find("render").unwrap().num_calls(), 10);
/// }
/// database.print_report();
/// ```
pub struct Database<C: Clock = DefaultClock> {
    records: Arc<Mutex<Vec<Arc<dyn RecordStats>>>>,

    _clock: PhantomData<fn() -> C>,
}

impl<C: Clock> Database<C> {
    /// Creates an empty database that is independent of the process-wide one.
    #[must_use]
    pub fn new() -> Self {
        Self {
            records: Arc::new(Mutex::new(Vec::new())),
            _clock: PhantomData,
        }
    }

    /// The process-wide database of clock `C`.
    #[must_use]
    pub fn global() -> Self {
        globals::get_or_init(Self::new)
    }

    /// Creates a record and registers it in this database.
    #[must_use]
    pub fn record<P: Policy>(&self, name: impl Into<Cow<'static, str>>) -> Arc<Record<C, P>> {
        let record = Arc::new(Record::new(name));
        self.add_record(Arc::clone(&record));
        record
    }

    /// Appends an existing record to this database.
    ///
    /// Names are not required to be unique. Registering the same record twice makes it appear
    /// twice in reports.
    ///
    /// Does nothing when the `enabled` package feature is off.
    pub fn add_record<P: Policy>(&self, record: Arc<Record<C, P>>) {
        if !ENABLED {
            return;
        }

        debug!(
            name = record.name(),
            clock = C::TITLE,
            policy = P::NAME,
            "registering timing record"
        );

        self.records.lock().push(record);
    }

    /// Finds the first registered record with the given name.
    ///
    /// This is a linear scan under the database lock. Keep the record returned at
    /// registration time instead of looking it up on hot paths.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<Arc<dyn RecordStats>> {
        self.records
            .lock()
            .iter()
            .find(|record| record.name() == name)
            .cloned()
    }

    /// Resets the counters of every registered record. The records stay registered.
    ///
    /// Measurements that are in progress while this runs may be committed before or after
    /// the reset. For records whose policy serializes commits, each such commit lands
    /// entirely on one side of the reset. For [`Base`][crate::Base] and
    /// [`RecursionSafe`][crate::RecursionSafe] records, which do not support concurrent use,
    /// a commit racing the reset may restore the total it had before the reset.
    pub fn reset_all(&self) {
        let records = self.records.lock();

        debug!(
            clock = C::TITLE,
            count = records.len(),
            "resetting timing records"
        );

        for record in records.iter() {
            record.reset();
        }
    }

    /// Number of registered records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    /// Whether no records are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }

    /// Takes a snapshot of all registered records.
    #[must_use]
    pub fn report(&self) -> Report {
        let records = self
            .records
            .lock()
            .iter()
            .map(|record| ReportRecord::new(record.name(), record.num_calls(), record.total_secs()))
            .collect();

        Report::new(C::TITLE, records)
    }

    /// Prints the text report of all registered records to stdout.
    ///
    /// Prints nothing if no records are registered or the `enabled` package feature is off.
    #[cfg_attr(test, mutants::skip)] // Too difficult to test stdout output reliably - manually tested.
    pub fn print_report(&self) {
        if !ENABLED {
            return;
        }

        self.report().print_to_stdout();
    }

    /// Writes the CSV report of all registered records.
    ///
    /// # Errors
    ///
    /// Returns any error reported by `writer`.
    pub fn write_csv<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        self.report().write_csv(writer)
    }

    /// Writes the CSV report of all registered records to a file, replacing any existing file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the file cannot be created or written.
    pub fn write_csv_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        let write = || -> io::Result<()> {
            let mut writer = BufWriter::new(File::create(path)?);
            self.write_csv(&mut writer)?;
            writer.flush()
        };

        write().map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;

        debug!(path = %path.display(), "wrote timing report");
        Ok(())
    }
}

impl<C: Clock> Default for Database<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> Clone for Database<C> {
    fn clone(&self) -> Self {
        Self {
            records: Arc::clone(&self.records),
            _clock: PhantomData,
        }
    }
}

impl<C: Clock> fmt::Debug for Database<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct(type_name::<Self>())
            .field("records", &self.records.lock().len())
            .finish()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use static_assertions::assert_impl_all;

    use super::*;
    use crate::NullClock;

    assert_impl_all!(Database<crate::StdClock>: Send, Sync, Clone);

    #[test]
    fn new_database_is_empty() {
        let database = Database::<NullClock>::new();

        assert!(database.is_empty());
        assert_eq!(database.len(), 0);
        assert!(database.find("anything").is_none());
        assert!(database.report().is_empty());
    }

    #[test]
    fn global_is_shared() {
        let first = Database::<NullClock>::global();
        let second = Database::<NullClock>::global();

        assert!(Arc::ptr_eq(&first.records, &second.records));
    }

    #[cfg(feature = "enabled")]
    mod enabled {
        use super::*;
        use crate::clock::ManualClock;
        use crate::{Base, RecursionSafe, ThreadRecursionSafe, ThreadSafe};

        fn measure<P: Policy>(record: &Record<ManualClock, P>, ticks: i64) {
            let start = record.now();
            ManualClock::advance(ticks);
            record.stop_measure(start);
        }

        #[test]
        fn records_of_all_policies_share_the_database() {
            let database = Database::<ManualClock>::new();

            let _base = database.record::<Base>("base");
            let _thread_safe = database.record::<ThreadSafe>("thread_safe");
            let _recursion_safe = database.record::<RecursionSafe>("recursion_safe");
            let _both = database.record::<ThreadRecursionSafe>("both");

            assert_eq!(database.len(), 4);

            let names: Vec<String> = database
                .report()
                .records()
                .map(|r| r.name().to_owned())
                .collect();
            assert_eq!(names, ["base", "thread_safe", "recursion_safe", "both"]);
        }

        #[test]
        fn find_returns_first_match() {
            let database = Database::<ManualClock>::new();

            let first = database.record::<Base>("dup");
            let _second = database.record::<Base>("dup");
            measure(&first, 10);

            let found = database.find("dup").unwrap();
            assert_eq!(found.num_calls(), 1);
            assert_eq!(database.len(), 2);
        }

        #[test]
        fn add_record_accepts_existing_records() {
            let database = Database::<ManualClock>::new();
            let record = Arc::new(Record::<ManualClock, ThreadSafe>::new("external"));

            database.add_record(Arc::clone(&record));
            measure(&record, 3);

            assert_eq!(database.find("external").unwrap().num_calls(), 1);
        }

        #[test]
        fn reset_all_keeps_records_registered() {
            let database = Database::<ManualClock>::new();
            let record = database.record::<Base>("counted");
            measure(&record, 50);
            measure(&record, 50);

            database.reset_all();

            assert_eq!(record.num_calls(), 0);
            assert_eq!(record.total_ticks(), 0);

            let found = database.find("counted").unwrap();
            assert_eq!(found.num_calls(), 0);

            measure(&record, 5);
            assert_eq!(found.num_calls(), 1);
        }

        #[test]
        fn report_reflects_counters() {
            let database = Database::<ManualClock>::new();
            let record = database.record::<Base>("work");
            measure(&record, 1_000);
            measure(&record, 3_000);

            let report = database.report();
            let work = report.record("work").unwrap();

            assert_eq!(report.title(), "manual times");
            assert_eq!(work.num_calls(), 2);
            assert!((work.total_secs() - 4e-6).abs() < 1e-12);
            assert!((work.average_secs().unwrap() - 2e-6).abs() < 1e-12);
        }

        #[test]
        fn csv_lists_records() {
            let database = Database::<ManualClock>::new();
            let record = database.record::<Base>("work");
            let _idle = database.record::<Base>("idle");
            measure(&record, 2_000);

            let mut out = Vec::new();
            database.write_csv(&mut out).unwrap();
            let csv = String::from_utf8(out).unwrap();
            let lines: Vec<&str> = csv.lines().collect();

            assert_eq!(lines[0], "name,num_calls,total_ns,average_ns");
            assert!(lines[1].starts_with("work,1,"));
            assert_eq!(lines[2], "idle,0,,");
        }

        #[test]
        fn csv_file_is_written() {
            let database = Database::<ManualClock>::new();
            let record = database.record::<Base>("file");
            measure(&record, 10);

            let path = std::env::temp_dir().join(format!(
                "scoped_time_csv_file_is_written_{}.csv",
                std::process::id()
            ));

            database.write_csv_file(&path).unwrap();
            let csv = std::fs::read_to_string(&path).unwrap();
            std::fs::remove_file(&path).unwrap();

            assert!(csv.contains("file,1,"));
        }

        #[test]
        fn csv_file_error_names_path() {
            let database = Database::<ManualClock>::new();
            let _record = database.record::<Base>("file");

            let path = std::env::temp_dir()
                .join("scoped_time_missing_directory")
                .join("nested")
                .join(DEFAULT_CSV_FILE_NAME);

            let error = database.write_csv_file(&path).unwrap_err();
            assert!(matches!(error, Error::Io { .. }));
            assert!(error.to_string().contains(DEFAULT_CSV_FILE_NAME));
        }
    }

    #[cfg(not(feature = "enabled"))]
    #[test]
    fn disabled_database_registers_nothing() {
        let database = Database::<NullClock>::new();
        let _record = database.record::<crate::Base>("ignored");

        assert!(database.is_empty());
    }
}
