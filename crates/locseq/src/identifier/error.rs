/// Errors produced when a string (or one of its segments) is not a canonical
/// `AAA-YYYY-NNNNN` identifier.
///
/// A `FormatError` always points at a caller or data bug and is never worth
/// retrying.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, thiserror::Error)]
#[non_exhaustive]
pub enum FormatError {
    /// The input (or segment) has the wrong number of bytes.
    #[error("invalid length: {len}")]
    InvalidLength { len: usize },

    /// A `-` was expected at byte offset `position`.
    #[error("expected '-' at position {position}")]
    MissingSeparator { position: usize },

    /// The location segment contains a byte that is not `A..=Z`.
    #[error("invalid location byte: {byte:#04x}")]
    InvalidLocation { byte: u8 },

    /// The year segment is not four digits in `1000..=9999`.
    #[error("invalid year")]
    InvalidYear,

    /// The sequence segment is not five digits in `00001..=99999`.
    #[error("invalid sequence")]
    InvalidSequence,
}
