use core::{fmt, num::NonZeroU32};

use crate::identifier::FormatError;

/// A positive sequence number issued by the allocator, unique within its
/// partition key.
///
/// The range is `1..=99_999`, exactly what the five-digit `NNNNN` segment of
/// an identifier can hold.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
pub struct Sequence(NonZeroU32);

impl Sequence {
    /// The first sequence number of every partition.
    pub const FIRST: Self = Self(NonZeroU32::MIN);

    /// The largest sequence number a partition can issue.
    pub const MAX: Self = match NonZeroU32::new(99_999) {
        Some(n) => Self(n),
        None => unreachable!(),
    };

    /// Number of digits in the formatted sequence segment.
    pub const DIGITS: usize = 5;

    /// Validates a sequence number.
    ///
    /// # Errors
    ///
    /// Returns [`FormatError::InvalidSequence`] for `0` or anything above
    /// [`Self::MAX`].
    pub const fn new(n: u32) -> Result<Self, FormatError> {
        match NonZeroU32::new(n) {
            Some(n) if n.get() <= Self::MAX.0.get() => Ok(Self(n)),
            _ => Err(FormatError::InvalidSequence),
        }
    }

    /// Converts a raw counter value into a sequence, or `None` if the counter
    /// has moved past [`Self::MAX`].
    pub(crate) fn from_counter(value: u64) -> Option<Self> {
        u32::try_from(value).ok().and_then(|n| Self::new(n).ok())
    }

    pub const fn get(self) -> u32 {
        self.0.get()
    }
}

impl TryFrom<u32> for Sequence {
    type Error = FormatError;

    fn try_from(n: u32) -> Result<Self, Self::Error> {
        Self::new(n)
    }
}

impl TryFrom<i32> for Sequence {
    type Error = FormatError;

    fn try_from(n: i32) -> Result<Self, Self::Error> {
        u32::try_from(n)
            .map_err(|_| FormatError::InvalidSequence)
            .and_then(Self::new)
    }
}

impl From<Sequence> for u32 {
    fn from(sequence: Sequence) -> Self {
        sequence.get()
    }
}

impl From<Sequence> for i32 {
    fn from(sequence: Sequence) -> Self {
        // MAX fits comfortably in an i32.
        sequence.get() as i32
    }
}

impl fmt::Display for Sequence {
    /// Zero-padded to [`Sequence::DIGITS`] digits.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:0width$}", self.get(), width = Self::DIGITS)
    }
}
