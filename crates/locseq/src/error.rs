//! The crate-wide error type.
//!
//! Callers of [`SequenceAllocator`] and [`Registrar`] see at most one of these
//! per call, and never a partially-built identifier:
//!
//! - [`Error::AllocationUnavailable`]: the retry budget ran out under
//!   contention. Transient; surface a "try again" response.
//! - [`Error::Format`]: a malformed identifier string. A caller or data bug.
//! - [`Error::DuplicateIdentifier`]: the store's uniqueness backstop rejected
//!   an insert. Evidence of an allocator defect, never retried.
//! - [`Error::PartitionExhausted`]: the partition issued its last
//!   representable sequence number.
//! - [`Error::Store`]: a non-transient failure of the backing store.
//!
//! [`SequenceAllocator`]: crate::SequenceAllocator
//! [`Registrar`]: crate::Registrar

use crate::{FormatError, Identifier, PartitionKey};

/// A result type defaulting to the crate [`Error`].
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// All errors `locseq` can surface.
///
/// `E` is the backing store's own error type; it defaults to
/// [`Infallible`](core::convert::Infallible) for stores that cannot fail,
/// such as [`MemoryStore`](crate::MemoryStore).
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error<E = core::convert::Infallible> {
    /// Every attempt allowed by the retry policy hit a transient failure.
    #[error("allocation unavailable for {key} after {attempts} attempts")]
    AllocationUnavailable { key: PartitionKey, attempts: u32 },

    /// The counter for `key` has moved past the largest representable
    /// sequence number.
    #[error("partition {key} has no sequence numbers left")]
    PartitionExhausted { key: PartitionKey },

    /// The uniqueness constraint on the identifier column rejected an insert.
    #[error("duplicate identifier: {identifier}")]
    DuplicateIdentifier { identifier: Identifier },

    /// A string was not a canonical identifier.
    #[error("malformed identifier: {0}")]
    Format(#[from] FormatError),

    /// The backing store failed in a way retrying will not fix.
    #[error("store error")]
    Store(#[source] E),
}

impl<E> Error<E> {
    /// Returns `true` if retrying the whole request later may succeed.
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::AllocationUnavailable { .. })
    }
}
