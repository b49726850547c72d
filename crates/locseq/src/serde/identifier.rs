use core::marker::PhantomData;

use serde::{Deserialize, Deserializer, Serialize, Serializer, de, ser::SerializeStruct};

use super::key::StrVisitor;
use crate::{Identifier, IdentifierRecord, LocationCode, Sequence, Year};

impl Serialize for Identifier {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Identifier {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        d.deserialize_str(StrVisitor("an identifier like `CHN-2025-00001`", PhantomData))
    }
}

impl Serialize for IdentifierRecord {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        let mut state = s.serialize_struct("IdentifierRecord", 4)?;
        state.serialize_field("identifier", &self.identifier)?;
        state.serialize_field("location_code", &self.location_code)?;
        state.serialize_field("registered_year", &self.registered_year)?;
        state.serialize_field("sequence_number", &self.sequence_number)?;
        state.end()
    }
}

/// The decomposed columns must agree with the identifier they were split
/// from; a record where they don't is rejected.
impl<'de> Deserialize<'de> for IdentifierRecord {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(rename = "IdentifierRecord", deny_unknown_fields)]
        struct Fields {
            identifier: Identifier,
            location_code: LocationCode,
            registered_year: Year,
            sequence_number: Sequence,
        }

        let fields = Fields::deserialize(d)?;
        let record = Self::from(fields.identifier);
        if record.location_code != fields.location_code
            || record.registered_year != fields.registered_year
            || record.sequence_number != fields.sequence_number
        {
            return Err(de::Error::custom(format_args!(
                "record fields disagree with identifier {}",
                fields.identifier
            )));
        }
        Ok(record)
    }
}
