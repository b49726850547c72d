use core::fmt;

use chrono::Datelike;

use crate::identifier::FormatError;

/// A four-digit calendar year, the second half of a [`PartitionKey`].
///
/// Years are restricted to `1000..=9999` so that the `YYYY` segment of an
/// [`Identifier`] never needs padding and always round-trips.
///
/// [`PartitionKey`]: crate::PartitionKey
/// [`Identifier`]: crate::Identifier
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
pub struct Year(u16);

impl Year {
    /// Smallest representable year.
    pub const MIN: Self = Self(1000);

    /// Largest representable year.
    pub const MAX: Self = Self(9999);

    /// Validates a year.
    ///
    /// # Errors
    ///
    /// Returns [`FormatError::InvalidYear`] if `year` is outside
    /// `1000..=9999`.
    pub const fn new(year: u16) -> Result<Self, FormatError> {
        if year < Self::MIN.0 || year > Self::MAX.0 {
            return Err(FormatError::InvalidYear);
        }
        Ok(Self(year))
    }

    /// Takes the year of any calendar value, clamped into the representable
    /// range. Never fails.
    ///
    /// ```
    /// use chrono::NaiveDate;
    /// use locseq::Year;
    ///
    /// let date = NaiveDate::from_ymd_opt(2025, 3, 14).unwrap();
    /// assert_eq!(Year::of(&date).get(), 2025);
    /// ```
    pub fn of<T: Datelike + ?Sized>(now: &T) -> Self {
        let clamped = now
            .year()
            .clamp(i32::from(Self::MIN.0), i32::from(Self::MAX.0));
        // In range after the clamp.
        Self(clamped as u16)
    }

    /// Returns the year as an integer.
    pub const fn get(self) -> u16 {
        self.0
    }
}

impl TryFrom<u16> for Year {
    type Error = FormatError;

    fn try_from(year: u16) -> Result<Self, Self::Error> {
        Self::new(year)
    }
}

impl TryFrom<i32> for Year {
    type Error = FormatError;

    fn try_from(year: i32) -> Result<Self, Self::Error> {
        u16::try_from(year)
            .map_err(|_| FormatError::InvalidYear)
            .and_then(Self::new)
    }
}

impl From<Year> for u16 {
    fn from(year: Year) -> Self {
        year.0
    }
}

impl From<Year> for i32 {
    fn from(year: Year) -> Self {
        i32::from(year.0)
    }
}

impl fmt::Display for Year {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}", self.0)
    }
}
