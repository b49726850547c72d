use crate::{Identifier, LocationCode, Sequence, Year};

/// The identifier columns an owning entity row carries.
///
/// The canonical string is the unique column; the decomposed fields are
/// denormalised copies kept for range and lookup queries.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct IdentifierRecord {
    pub identifier: Identifier,
    pub location_code: LocationCode,
    pub registered_year: Year,
    pub sequence_number: Sequence,
}

impl From<Identifier> for IdentifierRecord {
    fn from(identifier: Identifier) -> Self {
        let key = identifier.key();
        Self {
            identifier,
            location_code: key.location(),
            registered_year: key.year(),
            sequence_number: identifier.sequence(),
        }
    }
}
