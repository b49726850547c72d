use core::{fmt, str::FromStr};

use crate::{FormatError, LocationCode, PartitionKey, Sequence, Year};

/// Byte length of every canonical identifier: `AAA-YYYY-NNNNN`.
pub const IDENTIFIER_LEN: usize = 14;

const YEAR_SEPARATOR: usize = 3;
const SEQUENCE_SEPARATOR: usize = 8;

/// A display-facing identifier: a partition key plus the sequence issued
/// under it.
///
/// The canonical string form is `"<LOC>-<YYYY>-<NNNNN>"`, for example
/// `CHN-2025-00001`. [`Display`] renders it and [`FromStr`] parses it back,
/// and the two are exact inverses for every valid identifier.
///
/// Ordering is by location, then year, then sequence, which matches the
/// lexicographic order of the canonical strings.
///
/// # Example
///
/// ```
/// use locseq::Identifier;
///
/// let id: Identifier = "CHN-2025-00042".parse().unwrap();
/// assert_eq!(id.key().location().as_str(), "CHN");
/// assert_eq!(id.key().year().get(), 2025);
/// assert_eq!(id.sequence().get(), 42);
/// assert_eq!(id.to_string(), "CHN-2025-00042");
/// ```
///
/// [`Display`]: core::fmt::Display
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
pub struct Identifier {
    key: PartitionKey,
    sequence: Sequence,
}

impl Identifier {
    pub const fn new(key: PartitionKey, sequence: Sequence) -> Self {
        Self { key, sequence }
    }

    pub const fn key(&self) -> PartitionKey {
        self.key
    }

    pub const fn sequence(&self) -> Sequence {
        self.sequence
    }

    /// Splits the identifier back into its parts.
    pub const fn into_parts(self) -> (PartitionKey, Sequence) {
        (self.key, self.sequence)
    }
}

/// Renders `(key, sequence)` as the canonical identifier string.
///
/// ```
/// use locseq::{LocationCode, PartitionKey, Sequence, Year, format};
///
/// let key = PartitionKey::new("CHN".parse().unwrap(), Year::new(2025).unwrap());
/// assert_eq!(format(&key, Sequence::new(1).unwrap()), "CHN-2025-00001");
/// ```
pub fn format(key: &PartitionKey, sequence: Sequence) -> String {
    Identifier::new(*key, sequence).to_string()
}

/// Parses a canonical identifier string.
///
/// The input must be exactly `AAA-YYYY-NNNNN`: three uppercase ASCII letters,
/// a four-digit year in `1000..=9999` and a five-digit sequence in
/// `00001..=99999`, separated by `-`. Nothing is trimmed or case-folded.
///
/// # Errors
///
/// Returns a [`FormatError`] describing the first deviation found.
pub fn parse(s: &str) -> Result<(PartitionKey, Sequence), FormatError> {
    let bytes = s.as_bytes();
    if bytes.len() != IDENTIFIER_LEN {
        return Err(FormatError::InvalidLength { len: bytes.len() });
    }
    for position in [YEAR_SEPARATOR, SEQUENCE_SEPARATOR] {
        if bytes[position] != b'-' {
            return Err(FormatError::MissingSeparator { position });
        }
    }

    let location = LocationCode::from_bytes(&bytes[..YEAR_SEPARATOR])?;
    let year = parse_digits(&bytes[YEAR_SEPARATOR + 1..SEQUENCE_SEPARATOR])
        .ok_or(FormatError::InvalidYear)
        .and_then(|n| u16::try_from(n).map_err(|_| FormatError::InvalidYear))
        .and_then(Year::new)?;
    let sequence = parse_digits(&bytes[SEQUENCE_SEPARATOR + 1..])
        .ok_or(FormatError::InvalidSequence)
        .and_then(Sequence::new)?;

    Ok((PartitionKey::new(location, year), sequence))
}

/// Decimal value of an all-ASCII-digit slice, `None` on any other byte.
///
/// Callers pass at most five bytes, so the result cannot overflow.
fn parse_digits(digits: &[u8]) -> Option<u32> {
    digits.iter().try_fold(0_u32, |acc, &b| {
        b.is_ascii_digit().then(|| acc * 10 + u32::from(b - b'0'))
    })
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.key, self.sequence)
    }
}

impl FromStr for Identifier {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (key, sequence) = parse(s)?;
        Ok(Self::new(key, sequence))
    }
}

impl TryFrom<&str> for Identifier {
    type Error = FormatError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Identifier> for String {
    fn from(id: Identifier) -> Self {
        id.to_string()
    }
}
