use core::{fmt, str::FromStr};

use crate::identifier::FormatError;

/// A three-letter, uppercase ASCII location code such as `CHN` or `MUM`.
///
/// The code is the first segment of every [`Identifier`] and, together with a
/// [`Year`], selects the counter a sequence number is drawn from.
///
/// Construction always validates: a `LocationCode` can only ever hold bytes in
/// `b'A'..=b'Z'`, which is what makes [`LocationCode::as_str`] infallible.
///
/// # Example
///
/// ```
/// use locseq::LocationCode;
///
/// let code: LocationCode = "CHN".parse().unwrap();
/// assert_eq!(code.as_str(), "CHN");
/// assert!("chn".parse::<LocationCode>().is_err());
/// ```
///
/// [`Identifier`]: crate::Identifier
/// [`Year`]: crate::Year
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LocationCode([u8; LocationCode::LEN]);

impl LocationCode {
    /// Number of letters in every location code.
    pub const LEN: usize = 3;

    /// Validates `bytes` as a location code.
    ///
    /// # Errors
    ///
    /// - [`FormatError::InvalidLength`] if `bytes` is not exactly
    ///   [`Self::LEN`] long
    /// - [`FormatError::InvalidLocation`] on the first byte that is not an
    ///   uppercase ASCII letter
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, FormatError> {
        let code: [u8; Self::LEN] = bytes
            .try_into()
            .map_err(|_| FormatError::InvalidLength { len: bytes.len() })?;
        if let Some(&byte) = code.iter().find(|b| !b.is_ascii_uppercase()) {
            return Err(FormatError::InvalidLocation { byte });
        }
        Ok(Self(code))
    }

    /// Builds a code directly from three letter indices in `0..26`.
    ///
    /// Only the resolver's hash fallback needs this, so it is crate-private.
    pub(crate) const fn from_letter_indices(a: u8, b: u8, c: u8) -> Self {
        Self([b'A' + a % 26, b'A' + b % 26, b'A' + c % 26])
    }

    /// Returns the code as a `&str`.
    pub fn as_str(&self) -> &str {
        // SAFETY: every constructor guarantees the bytes are ASCII uppercase
        // letters, which are valid single-byte UTF-8.
        unsafe { core::str::from_utf8_unchecked(&self.0) }
    }

    /// Returns the raw ASCII bytes of the code.
    pub const fn as_bytes(&self) -> &[u8; Self::LEN] {
        &self.0
    }
}

impl FromStr for LocationCode {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_bytes(s.as_bytes())
    }
}

impl TryFrom<&str> for LocationCode {
    type Error = FormatError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl AsRef<str> for LocationCode {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for LocationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Debug for LocationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("LocationCode").field(&self.as_str()).finish()
    }
}
