use core::{convert::Infallible, future::Future};
use std::{
    collections::{HashMap, hash_map::Entry},
    sync::Arc,
};

use parking_lot::{Mutex, RwLock};
use portable_atomic::{AtomicU64, Ordering};

use crate::{
    CounterStatus, CounterStore, Identifier, IdentifierRecord, InsertStatus, PartitionKey,
    RegistryStore, Store,
};

/// A process-local store holding counter rows and registered identifiers in
/// memory.
///
/// Each counter row is its own [`AtomicU64`], created lazily on the first
/// increment for its key. The map lock only guards row creation; increments
/// are a compare-and-swap loop on the row itself, so racing writers on one
/// key never serialise behind a lock.
///
/// The registry side keeps a uniqueness index over identifiers, mirroring the
/// `UNIQUE` constraint a database would provide.
///
/// ## Recommended When
/// - Tests and local tooling
/// - Single-process deployments where losing counters on restart is fine
///
/// Every process gets its own counters, so this store provides no
/// uniqueness across processes. Use [`PgStore`] for that.
///
/// [`PgStore`]: crate::PgStore
#[derive(Default)]
pub struct MemoryStore {
    counters: RwLock<HashMap<PartitionKey, Arc<AtomicU64>>>,
    registry: Mutex<HashMap<Identifier, IdentifierRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store whose counters start at the given `last_issued`
    /// values, as if restored from persistent storage.
    pub fn with_counters(counters: impl IntoIterator<Item = (PartitionKey, u64)>) -> Self {
        let counters = counters
            .into_iter()
            .map(|(key, last_issued)| (key, Arc::new(AtomicU64::new(last_issued))))
            .collect();
        Self {
            counters: RwLock::new(counters),
            registry: Mutex::default(),
        }
    }

    /// Synchronous form of [`CounterStore::try_increment`]. Always issues.
    pub fn increment(&self, key: &PartitionKey) -> u64 {
        let existing = self.counters.read().get(key).cloned();
        let cell = match existing {
            Some(cell) => cell,
            None => match self.counters.write().entry(*key) {
                Entry::Vacant(entry) => {
                    entry.insert(Arc::new(AtomicU64::new(1)));
                    return 1;
                }
                // Another writer created the row first; fall through to the
                // increment path.
                Entry::Occupied(entry) => Arc::clone(entry.get()),
            },
        };
        Self::compare_and_increment(&cell)
    }

    /// Number of partitions with a counter row.
    pub fn partitions(&self) -> usize {
        self.counters.read().len()
    }

    /// Number of registered identifiers.
    pub fn registered(&self) -> usize {
        self.registry.lock().len()
    }

    fn compare_and_increment(cell: &AtomicU64) -> u64 {
        let mut current = cell.load(Ordering::Acquire);
        loop {
            // A saturated counter stays saturated; the allocator rejects any
            // value past `Sequence::MAX` long before this matters.
            let Some(next) = current.checked_add(1) else {
                return current;
            };
            match cell.compare_exchange_weak(current, next, Ordering::AcqRel, Ordering::Acquire) {
                Ok(_) => return next,
                Err(actual) => current = actual,
            }
        }
    }
}

impl Store for MemoryStore {
    type Err = Infallible;
}

impl CounterStore for MemoryStore {
    fn try_increment(
        &self,
        key: &PartitionKey,
    ) -> impl Future<Output = Result<CounterStatus, Self::Err>> + Send {
        let value = self.increment(key);
        core::future::ready(Ok(CounterStatus::Issued { value }))
    }

    fn last_issued(
        &self,
        key: &PartitionKey,
    ) -> impl Future<Output = Result<Option<u64>, Self::Err>> + Send {
        let value = self
            .counters
            .read()
            .get(key)
            .map(|cell| cell.load(Ordering::Acquire));
        core::future::ready(Ok(value))
    }
}

impl RegistryStore for MemoryStore {
    fn insert(
        &self,
        record: &IdentifierRecord,
    ) -> impl Future<Output = Result<InsertStatus, Self::Err>> + Send {
        let status = match self.registry.lock().entry(record.identifier) {
            Entry::Occupied(_) => InsertStatus::Duplicate,
            Entry::Vacant(entry) => {
                entry.insert(*record);
                InsertStatus::Inserted
            }
        };
        core::future::ready(Ok(status))
    }

    fn find(
        &self,
        identifier: &Identifier,
    ) -> impl Future<Output = Result<Option<IdentifierRecord>, Self::Err>> + Send {
        let record = self.registry.lock().get(identifier).copied();
        core::future::ready(Ok(record))
    }
}

#[cfg(test)]
mod tests {
    use std::{collections::HashSet, thread::scope};

    use super::*;
    use crate::{LocationCode, Year};

    fn key(location: &str, year: u16) -> PartitionKey {
        PartitionKey::new(
            location.parse::<LocationCode>().unwrap(),
            Year::new(year).unwrap(),
        )
    }

    #[test]
    fn first_increment_creates_the_row_at_one() {
        let store = MemoryStore::new();
        assert_eq!(store.partitions(), 0);
        assert_eq!(store.increment(&key("CHN", 2025)), 1);
        assert_eq!(store.increment(&key("CHN", 2025)), 2);
        assert_eq!(store.partitions(), 1);
    }

    #[test]
    fn restored_counters_continue_from_last_issued() {
        let store = MemoryStore::with_counters([(key("CHN", 2025), 41)]);
        assert_eq!(store.increment(&key("CHN", 2025)), 42);
        assert_eq!(store.increment(&key("MUM", 2025)), 1);
    }

    #[test]
    fn saturated_counter_does_not_wrap() {
        let store = MemoryStore::with_counters([(key("CHN", 2025), u64::MAX)]);
        assert_eq!(store.increment(&key("CHN", 2025)), u64::MAX);
    }

    #[test]
    fn racing_threads_never_share_a_value() {
        const THREADS: usize = 8;
        const PER_THREAD: usize = 2_000;

        let store = MemoryStore::new();
        let k = key("DEL", 2025);

        let values: Vec<u64> = scope(|s| {
            let handles: Vec<_> = (0..THREADS)
                .map(|_| {
                    s.spawn(|| {
                        (0..PER_THREAD)
                            .map(|_| store.increment(&k))
                            .collect::<Vec<_>>()
                    })
                })
                .collect();
            handles
                .into_iter()
                .flat_map(|h| h.join().unwrap())
                .collect()
        });

        let unique: HashSet<u64> = values.iter().copied().collect();
        assert_eq!(unique.len(), THREADS * PER_THREAD);
        assert_eq!(
            unique,
            (1..=(THREADS * PER_THREAD) as u64).collect::<HashSet<_>>()
        );
    }

    #[tokio::test]
    async fn registry_rejects_duplicates() {
        let store = MemoryStore::new();
        let record = IdentifierRecord::from("CHN-2025-00001".parse::<Identifier>().unwrap());

        assert_eq!(store.insert(&record).await, Ok(InsertStatus::Inserted));
        assert_eq!(store.insert(&record).await, Ok(InsertStatus::Duplicate));
        assert_eq!(store.registered(), 1);
        assert_eq!(store.find(&record.identifier).await, Ok(Some(record)));
    }

    #[tokio::test]
    async fn last_issued_is_none_until_first_increment() {
        let store = MemoryStore::new();
        let k = key("CHN", 2026);
        assert_eq!(store.last_issued(&k).await, Ok(None));
        store.increment(&k);
        store.increment(&k);
        assert_eq!(store.last_issued(&k).await, Ok(Some(2)));
    }
}
