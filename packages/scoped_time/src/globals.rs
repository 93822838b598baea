//! Process-wide singletons keyed by type.
//!
//! Rust has no generic statics, so each `Database<C>` and `DynamicDatabase<C, P>`
//! instantiation keeps its global handle in one shared registry keyed by `TypeId`.

use std::any::{Any, TypeId};
use std::sync::LazyLock;

use foldhash::HashMap;
use parking_lot::Mutex;

static INSTANCES: LazyLock<Mutex<HashMap<TypeId, Box<dyn Any + Send + Sync>>>> =
    LazyLock::new(|| Mutex::new(HashMap::default()));

/// Returns a clone of the process-wide instance of `T`, creating it with `init` on first use.
///
/// `init` runs without the registry lock held, so it may itself obtain other globals. If two
/// threads race to create the same instance, one of the created values is discarded and both
/// receive the same stored instance.
pub(crate) fn get_or_init<T>(init: impl FnOnce() -> T) -> T
where
    T: Any + Clone + Send + Sync,
{
    if let Some(existing) = get::<T>() {
        return existing;
    }

    let created = init();

    let mut instances = INSTANCES.lock();
    let stored = instances
        .entry(TypeId::of::<T>())
        .or_insert_with(|| Box::new(created));

    downcast(stored.as_ref())
}

fn get<T>() -> Option<T>
where
    T: Any + Clone + Send + Sync,
{
    INSTANCES
        .lock()
        .get(&TypeId::of::<T>())
        .map(|stored| downcast(stored.as_ref()))
}

fn downcast<T: Any + Clone>(stored: &(dyn Any + Send + Sync)) -> T {
    match stored.downcast_ref::<T>() {
        Some(instance) => instance.clone(),
        // The map is keyed by the TypeId of the stored value.
        None => unreachable!("global instance stored under the TypeId of another type"),
    }
}
