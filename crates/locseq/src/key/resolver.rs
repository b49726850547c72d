use chrono::Datelike;

use crate::{LocationCode, PartitionKey, Year};

/// Known place names (lowercase, single-spaced) and the code they map to.
///
/// Historical and colloquial aliases map to the same code as the current
/// name.
const KNOWN_LOCATIONS: &[(&str, &str)] = &[
    ("chennai", "CHN"),
    ("madras", "CHN"),
    ("mumbai", "MUM"),
    ("bombay", "MUM"),
    ("delhi", "DEL"),
    ("new delhi", "DEL"),
    ("bengaluru", "BLR"),
    ("bangalore", "BLR"),
    ("hyderabad", "HYD"),
    ("kolkata", "KOL"),
    ("calcutta", "KOL"),
    ("pune", "PUN"),
    ("poona", "PUN"),
    ("ahmedabad", "AMD"),
    ("jaipur", "JAI"),
    ("lucknow", "LKO"),
    ("kochi", "COK"),
    ("cochin", "COK"),
    ("coimbatore", "CBE"),
    ("madurai", "MDU"),
    ("tiruchirappalli", "TRZ"),
    ("trichy", "TRZ"),
    ("salem", "SLM"),
    ("vellore", "VLR"),
    ("thiruvananthapuram", "TRV"),
    ("trivandrum", "TRV"),
    ("visakhapatnam", "VTZ"),
    ("vizag", "VTZ"),
    ("chandigarh", "IXC"),
    ("nagpur", "NAG"),
    ("indore", "IDR"),
    ("bhopal", "BHO"),
    ("patna", "PAT"),
    ("surat", "STV"),
    ("mysuru", "MYS"),
    ("mysore", "MYS"),
    ("puducherry", "PNY"),
    ("pondicherry", "PNY"),
];

const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// How a [`Resolution`]'s location code was obtained.
///
/// Anything other than [`LocationOrigin::Known`] is a recoverable condition:
/// allocation proceeds, but the caller may want to record that the input
/// did not match the location table.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum LocationOrigin {
    /// The input (or one of its comma-separated parts) matched a known place
    /// name or code.
    Known,
    /// No match; the code is the first three ASCII letters of the input.
    Derived,
    /// No match and fewer than three ASCII letters; the code is a hash of the
    /// normalised input.
    Hashed,
}

/// The outcome of [`resolve_detailed`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Resolution {
    pub key: PartitionKey,
    pub origin: LocationOrigin,
}

/// Derives the partition key for free-text location input and the caller's
/// current time.
///
/// Pure and total: the same `(raw, now.year())` always yields the same key,
/// and no input is rejected. See [`resolve_detailed`] to learn whether the
/// location was recognised.
///
/// # Example
///
/// ```
/// use chrono::NaiveDate;
/// use locseq::resolve;
///
/// let now = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
/// assert_eq!(resolve("  chennai ", &now).to_string(), "CHN-2025");
/// assert_eq!(resolve("Bombay", &now).to_string(), "MUM-2025");
/// ```
pub fn resolve<T: Datelike + ?Sized>(raw: &str, now: &T) -> PartitionKey {
    resolve_detailed(raw, now).key
}

/// Like [`resolve`], additionally reporting how the location code was found.
pub fn resolve_detailed<T: Datelike + ?Sized>(raw: &str, now: &T) -> Resolution {
    let (location, origin) = resolve_location(raw);
    Resolution {
        key: PartitionKey::new(location, Year::of(now)),
        origin,
    }
}

/// Maps free-text location input to a code. Never fails.
pub fn resolve_location(raw: &str) -> (LocationCode, LocationOrigin) {
    let normalized = normalize(raw);

    let known = lookup(&normalized).or_else(|| {
        normalized
            .split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .find_map(lookup)
    });
    if let Some(code) = known {
        return (code, LocationOrigin::Known);
    }

    let letters: Vec<u8> = raw
        .trim()
        .bytes()
        .filter(u8::is_ascii_alphabetic)
        .take(LocationCode::LEN)
        .map(|b| b.to_ascii_uppercase())
        .collect();
    if let Ok(code) = LocationCode::from_bytes(&letters) {
        return (code, LocationOrigin::Derived);
    }

    (hashed_code(normalized.as_bytes()), LocationOrigin::Hashed)
}

/// Trims, collapses whitespace runs and lowercases ASCII letters.
fn normalize(raw: &str) -> String {
    raw.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_ascii_lowercase()
}

fn lookup(name: &str) -> Option<LocationCode> {
    KNOWN_LOCATIONS
        .iter()
        .find(|(known, code)| *known == name || code.eq_ignore_ascii_case(name))
        .and_then(|(_, code)| code.parse().ok())
}

/// FNV-1a over the input, reduced to three base-26 letters.
fn hashed_code(bytes: &[u8]) -> LocationCode {
    let hash = bytes.iter().fold(FNV_OFFSET_BASIS, |hash, &b| {
        (hash ^ u64::from(b)).wrapping_mul(FNV_PRIME)
    });
    let n = hash % (26 * 26 * 26);
    // Each digit is < 26.
    LocationCode::from_letter_indices((n / 676) as u8, (n / 26 % 26) as u8, (n % 26) as u8)
}
