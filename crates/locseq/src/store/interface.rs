use core::future::Future;

use crate::{Identifier, IdentifierRecord, PartitionKey};

/// Common error plumbing shared by [`CounterStore`] and [`RegistryStore`].
pub trait Store {
    /// A non-transient backend failure.
    type Err: core::error::Error + Send + Sync + 'static;
}

/// The outcome of a single [`CounterStore::try_increment`] attempt.
///
/// This allows the allocator to tell a committed increment apart from a
/// transient failure it should back off from and retry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CounterStatus {
    /// The counter row for the key was created with `last_issued = 1`, or
    /// atomically incremented; `value` is the committed post-increment value.
    Issued {
        /// The new `last_issued`.
        value: u64,
    },
    /// The increment did not happen because of a transient condition (lock
    /// timeout, serialisation failure, exhausted connection pool). Nothing was
    /// committed.
    Contended,
}

/// The persistence capability the allocator consumes: an atomic
/// increment-and-return on one counter row per partition key.
///
/// Implementations must guarantee, across every process sharing the store,
/// that no two `Issued` results for the same key carry the same value, and
/// that the value for a key never decreases. A missing row is created on the
/// first increment; a creation race must fall through to the increment path
/// rather than fail.
pub trait CounterStore: Store {
    /// Atomically creates or increments the counter for `key`.
    fn try_increment(
        &self,
        key: &PartitionKey,
    ) -> impl Future<Output = Result<CounterStatus, Self::Err>> + Send;

    /// Returns the current `last_issued` for `key`, or `None` if no sequence
    /// has ever been issued for it.
    fn last_issued(
        &self,
        key: &PartitionKey,
    ) -> impl Future<Output = Result<Option<u64>, Self::Err>> + Send;
}

/// Whether a [`RegistryStore::insert`] was accepted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InsertStatus {
    Inserted,
    /// The uniqueness constraint on the identifier column rejected the row.
    Duplicate,
}

/// A uniqueness-constrained home for issued identifiers.
///
/// This is the backstop behind the allocator: even a defective allocator or a
/// manual data fix cannot make two rows carry the same identifier.
pub trait RegistryStore: Store {
    /// Inserts `record`, reporting [`InsertStatus::Duplicate`] instead of
    /// overwriting when the identifier already exists.
    fn insert(
        &self,
        record: &IdentifierRecord,
    ) -> impl Future<Output = Result<InsertStatus, Self::Err>> + Send;

    /// Looks up a previously inserted identifier.
    fn find(
        &self,
        identifier: &Identifier,
    ) -> impl Future<Output = Result<Option<IdentifierRecord>, Self::Err>> + Send;
}

impl<S: Store> Store for std::sync::Arc<S> {
    type Err = S::Err;
}

impl<S: CounterStore> CounterStore for std::sync::Arc<S> {
    fn try_increment(
        &self,
        key: &PartitionKey,
    ) -> impl Future<Output = Result<CounterStatus, Self::Err>> + Send {
        S::try_increment(self, key)
    }

    fn last_issued(
        &self,
        key: &PartitionKey,
    ) -> impl Future<Output = Result<Option<u64>, Self::Err>> + Send {
        S::last_issued(self, key)
    }
}

impl<S: RegistryStore> RegistryStore for std::sync::Arc<S> {
    fn insert(
        &self,
        record: &IdentifierRecord,
    ) -> impl Future<Output = Result<InsertStatus, Self::Err>> + Send {
        S::insert(self, record)
    }

    fn find(
        &self,
        identifier: &Identifier,
    ) -> impl Future<Output = Result<Option<IdentifierRecord>, Self::Err>> + Send {
        S::find(self, identifier)
    }
}
