use chrono::Datelike;

use crate::{
    CounterStore, Error, Identifier, IdentifierRecord, InsertStatus, PartitionKey, RegistryStore,
    RetryPolicy, SequenceAllocator, futures::SleepProvider, resolve_detailed,
};

/// Resolves free-text location input to a partition key, allocates the next
/// sequence number for it and formats the identifier.
///
/// This is the single entry point callers creating records should use. The
/// lower level [`SequenceAllocator`] is available through
/// [`Registrar::allocator`] for callers that already hold a
/// [`PartitionKey`].
///
/// # Example
///
/// ```
/// # #[cfg(feature = "async-tokio")]
/// # tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap().block_on(async {
/// use chrono::NaiveDate;
/// use locseq::{MemoryStore, Registrar};
///
/// let registrar = Registrar::new(MemoryStore::new());
/// let now = NaiveDate::from_ymd_opt(2025, 3, 14).unwrap();
///
/// let first = registrar.assign_identifier("Chennai", &now).await.unwrap();
/// let second = registrar.assign_identifier("madras", &now).await.unwrap();
/// assert_eq!(first.to_string(), "CHN-2025-00001");
/// assert_eq!(second.to_string(), "CHN-2025-00002");
/// # });
/// ```
pub struct Registrar<S> {
    allocator: SequenceAllocator<S>,
}

impl<S> Registrar<S>
where
    S: CounterStore,
{
    pub fn new(store: S) -> Self {
        Self::from_allocator(SequenceAllocator::new(store))
    }

    pub fn with_policy(store: S, policy: RetryPolicy) -> Self {
        Self::from_allocator(SequenceAllocator::with_policy(store, policy))
    }

    pub fn from_allocator(allocator: SequenceAllocator<S>) -> Self {
        Self { allocator }
    }

    pub fn allocator(&self) -> &SequenceAllocator<S> {
        &self.allocator
    }

    pub fn store(&self) -> &S {
        self.allocator.store()
    }

    /// Issues a fresh identifier for the location named by `raw` in the year
    /// of `now`.
    ///
    /// Unrecognised locations are not an error: they fall back to a derived or
    /// hashed code (see [`resolve_detailed`]) and are logged at `warn`.
    ///
    /// # Errors
    ///
    /// Any error from [`SequenceAllocator::allocate_with`].
    #[cfg_attr(feature = "tracing", tracing::instrument(level = "debug", skip(self, now)))]
    pub async fn assign_identifier_with<P, T>(
        &self,
        raw: &str,
        now: &T,
    ) -> Result<Identifier, Error<S::Err>>
    where
        P: SleepProvider,
        T: Datelike + Sync + ?Sized,
    {
        let resolution = resolve_detailed(raw, now);
        #[cfg(feature = "tracing")]
        if resolution.origin != crate::LocationOrigin::Known {
            tracing::warn!(
                raw,
                key = %resolution.key,
                origin = ?resolution.origin,
                "location not recognised, using fallback code"
            );
        }
        let sequence = self.allocator.allocate_with::<P>(&resolution.key).await?;
        Ok(Identifier::new(resolution.key, sequence))
    }

    /// [`Self::assign_identifier_with`] backing off with [`TokioSleep`].
    ///
    /// # Errors
    ///
    /// See [`Self::assign_identifier_with`].
    ///
    /// [`TokioSleep`]: crate::TokioSleep
    #[cfg_attr(docsrs, doc(cfg(feature = "async-tokio")))]
    #[cfg(feature = "async-tokio")]
    pub async fn assign_identifier<T>(
        &self,
        raw: &str,
        now: &T,
    ) -> Result<Identifier, Error<S::Err>>
    where
        T: Datelike + Sync + ?Sized,
    {
        self.assign_identifier_with::<crate::TokioSleep, T>(raw, now)
            .await
    }

    /// # Errors
    ///
    /// Returns [`Error::Store`] if the store lookup fails.
    pub async fn last_issued(&self, key: &PartitionKey) -> Result<Option<u64>, Error<S::Err>> {
        self.allocator.last_issued(key).await
    }
}

impl<S> Registrar<S>
where
    S: CounterStore + RegistryStore,
{
    /// Issues a fresh identifier and inserts it into the registry.
    ///
    /// The counter increment and the insert are two separate atomic steps. If
    /// the insert never happens the sequence number is a gap. If the registry
    /// rejects the identifier as a duplicate, the failure is returned as is:
    /// the duplicate means the counter and the registry disagree, and drawing
    /// another number would hide that.
    ///
    /// # Errors
    ///
    /// - Any error from [`Self::assign_identifier_with`]
    /// - [`Error::DuplicateIdentifier`] if the identifier is already registered
    /// - [`Error::Store`] if the insert fails
    pub async fn register_with<P, T>(
        &self,
        raw: &str,
        now: &T,
    ) -> Result<IdentifierRecord, Error<S::Err>>
    where
        P: SleepProvider,
        T: Datelike + Sync + ?Sized,
    {
        let identifier = self.assign_identifier_with::<P, T>(raw, now).await?;
        let record = IdentifierRecord::from(identifier);
        match self.store().insert(&record).await.map_err(Error::Store)? {
            InsertStatus::Inserted => Ok(record),
            InsertStatus::Duplicate => {
                #[cfg(feature = "tracing")]
                tracing::error!(%identifier, "identifier already registered");
                Err(Error::DuplicateIdentifier { identifier })
            }
        }
    }

    /// Parses `identifier` and fetches its registry row, if any.
    ///
    /// # Errors
    ///
    /// - [`Error::Format`] if `identifier` is not in canonical form
    /// - [`Error::Store`] if the lookup fails
    pub async fn lookup(
        &self,
        identifier: &str,
    ) -> Result<Option<IdentifierRecord>, Error<S::Err>> {
        let identifier: Identifier = identifier.parse()?;
        self.store().find(&identifier).await.map_err(Error::Store)
    }

    /// [`Self::register_with`] backing off with [`TokioSleep`].
    ///
    /// # Errors
    ///
    /// See [`Self::register_with`].
    ///
    /// [`TokioSleep`]: crate::TokioSleep
    #[cfg_attr(docsrs, doc(cfg(feature = "async-tokio")))]
    #[cfg(feature = "async-tokio")]
    pub async fn register<T>(&self, raw: &str, now: &T) -> Result<IdentifierRecord, Error<S::Err>>
    where
        T: Datelike + Sync + ?Sized,
    {
        self.register_with::<crate::TokioSleep, T>(raw, now).await
    }
}
