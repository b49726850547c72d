#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::{
    CounterStatus, CounterStore, Error, PartitionKey, RetryPolicy, Sequence,
    futures::SleepProvider,
};

/// Issues per-partition sequence numbers from a shared [`CounterStore`].
///
/// The allocator holds no counter state of its own: every allocation is one
/// atomic increment-and-return against the store, so any number of allocators
/// in any number of processes can share one store without issuing the same
/// sequence twice for a key.
///
/// Transient store failures ([`CounterStatus::Contended`]) are retried with
/// jittered exponential backoff up to [`RetryPolicy::max_attempts`] times,
/// after which the allocation fails fast with
/// [`Error::AllocationUnavailable`]. A value that was issued but never used by
/// the caller is simply a gap; nothing is reclaimed.
///
/// ## Recommended When
/// - You need identifiers that are unique per partition across processes
/// - Gaps are acceptable but duplicates are not
///
/// ## See Also
/// - [`Registrar`] to resolve, allocate and format in one call
///
/// [`Registrar`]: crate::Registrar
pub struct SequenceAllocator<S> {
    store: S,
    policy: RetryPolicy,
}

impl<S> SequenceAllocator<S>
where
    S: CounterStore,
{
    /// Creates an allocator over `store` with the default [`RetryPolicy`].
    pub fn new(store: S) -> Self {
        Self::with_policy(store, RetryPolicy::default())
    }

    pub fn with_policy(store: S, policy: RetryPolicy) -> Self {
        Self { store, policy }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Allocates the next sequence number for `key`, backing off between
    /// contended attempts with the sleep provider `P`.
    ///
    /// # Errors
    ///
    /// - [`Error::AllocationUnavailable`] if every attempt was contended
    /// - [`Error::PartitionExhausted`] if the counter passed
    ///   [`Sequence::MAX`]. The value consumed by that attempt is a gap.
    /// - [`Error::Store`] on any non-transient store failure
    #[cfg_attr(feature = "tracing", instrument(level = "debug", skip(self, key), fields(%key)))]
    pub async fn allocate_with<P>(&self, key: &PartitionKey) -> Result<Sequence, Error<S::Err>>
    where
        P: SleepProvider,
    {
        let max_attempts = self.policy.max_attempts();
        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.store.try_increment(key).await.map_err(Error::Store)? {
                CounterStatus::Issued { value } => {
                    return Sequence::from_counter(value).ok_or_else(|| {
                        #[cfg(feature = "tracing")]
                        tracing::error!(%key, value, "partition exhausted");
                        Error::PartitionExhausted { key: *key }
                    });
                }
                CounterStatus::Contended if attempt >= max_attempts => {
                    #[cfg(feature = "tracing")]
                    tracing::warn!(%key, attempts = attempt, "allocation retry budget exhausted");
                    return Err(Error::AllocationUnavailable {
                        key: *key,
                        attempts: attempt,
                    });
                }
                CounterStatus::Contended => {
                    let delay = self.policy.backoff(attempt);
                    #[cfg(feature = "tracing")]
                    tracing::debug!(%key, attempt, ?delay, "counter contended, backing off");
                    P::sleep_for(delay).await;
                }
            }
        }
    }

    /// Allocates the next sequence number for `key` using [`TokioSleep`].
    ///
    /// # Errors
    ///
    /// See [`Self::allocate_with`].
    ///
    /// [`TokioSleep`]: crate::TokioSleep
    #[cfg_attr(docsrs, doc(cfg(feature = "async-tokio")))]
    #[cfg(feature = "async-tokio")]
    pub async fn allocate(&self, key: &PartitionKey) -> Result<Sequence, Error<S::Err>> {
        self.allocate_with::<crate::TokioSleep>(key).await
    }

    /// The highest sequence number ever issued for `key`, if any.
    ///
    /// Diagnostic only: by the time the caller looks at it, a concurrent
    /// allocation may already have moved it on.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Store`] if the store lookup fails.
    pub async fn last_issued(&self, key: &PartitionKey) -> Result<Option<u64>, Error<S::Err>> {
        self.store.last_issued(key).await.map_err(Error::Store)
    }
}
