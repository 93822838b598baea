use std::any::type_name;
use std::fmt;
use std::sync::Arc;

use foldhash::HashMap;
use parking_lot::Mutex;
use tracing::{debug, trace};

use crate::{Base, Clock, Database, DefaultClock, Policy, Record, globals};

/// Records whose names are only known at runtime, created on first use and then reused.
///
/// Each lookup hashes the name and takes a lock, so call [`get_or_add()`][Self::get_or_add]
/// outside the measured region and measure with the returned record.
///
/// New records are also registered in the [`Database`] of the same clock, so they appear in
/// its reports next to the records created by name literals.
///
/// # Examples
///
/// ```
/// use scoped_time::{Database, DynamicDatabase, StdClock, ThreadSafe};
///
/// let database = Database::<StdClock>::new();
/// let dynamic = DynamicDatabase::<StdClock, ThreadSafe>::new(database.clone());
///
/// for table in ["users", "orders", "users"] {
///     let record = dynamic.get_or_add(&format!("query_{table}"));
///     let _scope = record.scope();
///     // Code to measure.
/// }
///
/// assert_eq!(dynamic.len(), 2);
/// if scoped_time::ENABLED {
///     assert_eq!(database.find("query_users").unwrap().num_calls(), 2);
/// }
/// ```
pub struct DynamicDatabase<C: Clock = DefaultClock, P: Policy = Base> {
    records: Arc<Mutex<HashMap<String, Arc<Record<C, P>>>>>,
    database: Database<C>,
}

impl<C: Clock, P: Policy> DynamicDatabase<C, P> {
    /// Creates an empty dynamic database whose new records are registered in `database`.
    #[must_use]
    pub fn new(database: Database<C>) -> Self {
        Self {
            records: Arc::new(Mutex::new(HashMap::default())),
            database,
        }
    }

    /// The process-wide dynamic database of clock `C` and policy `P`, which registers into
    /// [`Database::global()`].
    #[must_use]
    pub fn global() -> Self {
        globals::get_or_init(|| Self::new(Database::global()))
    }

    /// Returns the record with the given name, creating and registering it if this is the
    /// first request for the name.
    ///
    /// Concurrent first requests for the same name create exactly one record.
    pub fn get_or_add(&self, name: &str) -> Arc<Record<C, P>> {
        // The lock is held across lookup, creation and registration.
        let mut records = self.records.lock();

        if let Some(record) = records.get(name) {
            trace!(name, "reusing dynamic timing record");
            return Arc::clone(record);
        }

        debug!(
            name,
            clock = C::TITLE,
            policy = P::NAME,
            "creating dynamic timing record"
        );

        let record = self.database.record::<P>(name.to_owned());
        records.insert(name.to_owned(), Arc::clone(&record));
        record
    }

    /// Number of distinct names requested so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    /// Whether no names have been requested yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }

    /// The database new records are registered in.
    #[must_use]
    pub fn database(&self) -> &Database<C> {
        &self.database
    }
}

impl<C: Clock, P: Policy> Clone for DynamicDatabase<C, P> {
    fn clone(&self) -> Self {
        Self {
            records: Arc::clone(&self.records),
            database: self.database.clone(),
        }
    }
}

impl<C: Clock, P: Policy> fmt::Debug for DynamicDatabase<C, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct(type_name::<Self>())
            .field("records", &self.records.lock().len())
            .field("database", &self.database)
            .finish()
    }
}
