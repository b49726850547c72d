use core::fmt;

use crate::{LocationCode, Year};

/// The composite `(location, year)` key that scopes one independent sequence
/// counter.
///
/// Two keys are equal iff both fields are equal. Keys are `Copy` and
/// immutable; every allocation for the same key draws from the same counter,
/// and allocations for different keys never affect each other.
///
/// Displays as `LOC-YYYY`, which is also the prefix of every identifier
/// issued under the key.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
pub struct PartitionKey {
    location: LocationCode,
    year: Year,
}

impl PartitionKey {
    pub const fn new(location: LocationCode, year: Year) -> Self {
        Self { location, year }
    }

    pub const fn location(&self) -> LocationCode {
        self.location
    }

    pub const fn year(&self) -> Year {
        self.year
    }
}

impl fmt::Display for PartitionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.location, self.year)
    }
}
