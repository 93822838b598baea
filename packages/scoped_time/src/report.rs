//! Snapshots of database contents and their text and CSV renderings.

use std::borrow::Cow;
use std::fmt;
use std::io;

use crate::time_to_str_ns;

/// Total width of the text report table.
const TABLE_WIDTH: usize = 86;

const NAME_WIDTH: usize = 40;
const CALLS_WIDTH: usize = 12;
const TIME_WIDTH: usize = 17;

/// Header row of the CSV report.
pub const CSV_HEADER: &str = "name,num_calls,total_ns,average_ns";

/// A snapshot of the records of one [`Database`][crate::Database], in registration order.
///
/// The snapshot is detached from the database, so it can be sent to other threads and
/// formatted while measurements continue.
///
/// The [`Display`][fmt::Display] implementation renders the aligned text table. An empty
/// report renders as nothing at all.
///
/// # Examples
///
/// ```
/// use scoped_time::{Base, Database, StdClock};
///
/// let database = Database::<StdClock>::new();
/// let record = database.record::<Base>("load_config");
///
/// {
///     let _scope = record.scope();
///     // Code to measure.
/// }
///
/// let report = database.report();
/// println!("{report}");
///
/// let mut csv = Vec::new();
/// report.write_csv(&mut csv).unwrap();
/// ```
#[derive(Clone, Debug)]
pub struct Report {
    title: &'static str,
    records: Vec<ReportRecord>,
}

/// Statistics of a single record in a [`Report`].
#[derive(Clone, Debug, PartialEq)]
pub struct ReportRecord {
    name: String,
    num_calls: u64,
    total_secs: f64,
}

impl Report {
    #[must_use]
    pub(crate) fn new(title: &'static str, records: Vec<ReportRecord>) -> Self {
        Self { title, records }
    }

    /// Title of the clock backend the report was measured with.
    #[must_use]
    pub fn title(&self) -> &'static str {
        self.title
    }

    /// Iterates over the records in registration order.
    pub fn records(&self) -> impl Iterator<Item = &ReportRecord> {
        self.records.iter()
    }

    /// Looks up a record by name.
    #[must_use]
    pub fn record(&self, name: &str) -> Option<&ReportRecord> {
        self.records.iter().find(|r| r.name == name)
    }

    /// Whether the report contains no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Prints the text report to stdout.
    ///
    /// Prints nothing if the report is empty, not even an empty line.
    #[cfg_attr(test, mutants::skip)] // Too difficult to test stdout output reliably - manually tested.
    pub fn print_to_stdout(&self) {
        if self.is_empty() {
            return;
        }

        print!("{self}");
    }

    /// Writes the report as CSV, one row per record after the [`CSV_HEADER`] row.
    ///
    /// Records without data have empty time fields. Writes nothing if the report is empty.
    ///
    /// # Errors
    ///
    /// Returns any error reported by `writer`.
    pub fn write_csv<W: io::Write>(&self, writer: &mut W) -> io::Result<()> {
        if self.is_empty() {
            return Ok(());
        }

        writeln!(writer, "{CSV_HEADER}")?;

        for record in &self.records {
            let name = csv_field(&record.name);

            match record.average_secs() {
                Some(average_secs) => writeln!(
                    writer,
                    "{name},{},{:.6},{:.6}",
                    record.num_calls,
                    record.total_secs * 1e9,
                    average_secs * 1e9
                )?,
                None => writeln!(writer, "{name},{},,", record.num_calls)?,
            }
        }

        Ok(())
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return Ok(());
        }

        let title_len = self.title.chars().count();

        #[expect(
            clippy::integer_division,
            reason = "an odd title is balanced by the extra dash after it"
        )]
        let pad = "-".repeat((TABLE_WIDTH.saturating_sub(title_len) / 2).saturating_sub(1));
        let odd = if title_len % 2 == 1 { "-" } else { "" };
        writeln!(f, "{pad} {} {pad}{odd}", self.title)?;

        writeln!(
            f,
            "{:>NAME_WIDTH$}{:>CALLS_WIDTH$}{:>TIME_WIDTH$}{:>TIME_WIDTH$}",
            "Name", "Calls", "Total (ns)", "Average (ns)"
        )?;

        let rule = "-".repeat(TABLE_WIDTH);
        writeln!(f, "{rule}")?;

        for record in &self.records {
            write!(
                f,
                "{:>NAME_WIDTH$}{:>CALLS_WIDTH$}",
                record.name, record.num_calls
            )?;

            if let Some(average_secs) = record.average_secs() {
                write!(
                    f,
                    "{:>TIME_WIDTH$}{:>TIME_WIDTH$}",
                    time_to_str_ns(record.total_secs),
                    time_to_str_ns(average_secs)
                )?;
            }

            writeln!(f)?;
        }

        writeln!(f, "{rule}")
    }
}

impl ReportRecord {
    #[must_use]
    pub(crate) fn new(name: impl Into<String>, num_calls: u64, total_secs: f64) -> Self {
        Self {
            name: name.into(),
            num_calls,
            total_secs,
        }
    }

    /// Name of the record.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of completed calls.
    #[must_use]
    pub fn num_calls(&self) -> u64 {
        self.num_calls
    }

    /// Total elapsed time in seconds. May be zero or negative, see [`has_data()`][Self::has_data].
    #[must_use]
    pub fn total_secs(&self) -> f64 {
        self.total_secs
    }

    /// Whether the record has both calls and a positive total time.
    ///
    /// Records of the [`NullClock`][crate::NullClock] or ones that were never entered have no
    /// data. Reports show only their name and call count.
    #[must_use]
    pub fn has_data(&self) -> bool {
        self.num_calls > 0 && self.total_secs > 0.0
    }

    /// Mean time per call in seconds, or `None` if the record has no data.
    #[must_use]
    pub fn average_secs(&self) -> Option<f64> {
        if !self.has_data() {
            return None;
        }

        #[expect(
            clippy::cast_precision_loss,
            reason = "call counts beyond 2^52 are not a realistic concern for reporting"
        )]
        let calls = self.num_calls as f64;

        Some(self.total_secs / calls)
    }
}

/// Quotes a CSV field if it contains characters that would break the row.
fn csv_field(value: &str) -> Cow<'_, str> {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\"")).into()
    } else {
        value.into()
    }
}
