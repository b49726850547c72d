use crate::{
    FormatError, Identifier, IdentifierRecord, LocationCode, PartitionKey, Sequence, Year, format,
    parse,
};

fn key(location: &str, year: u16) -> PartitionKey {
    PartitionKey::new(location.parse().unwrap(), Year::new(year).unwrap())
}

fn seq(n: u32) -> Sequence {
    Sequence::new(n).unwrap()
}

#[test]
fn formats_with_five_digit_padding() {
    assert_eq!(format(&key("CHN", 2025), seq(1)), "CHN-2025-00001");
    assert_eq!(format(&key("MUM", 2025), seq(420)), "MUM-2025-00420");
    assert_eq!(format(&key("DEL", 9999), Sequence::MAX), "DEL-9999-99999");
}

#[test]
fn parses_canonical_identifiers() {
    assert_eq!(parse("CHN-2025-00001"), Ok((key("CHN", 2025), seq(1))));
    assert_eq!(parse("ZZZ-1000-99999"), Ok((key("ZZZ", 1000), Sequence::MAX)));
}

#[test]
fn round_trips_across_keys_and_sequences() {
    let keys = [
        key("AAA", 1000),
        key("CHN", 2025),
        key("MUM", 2026),
        key("QXZ", 5000),
        key("ZZZ", 9999),
    ];
    // Every 997th value plus both ends of the range.
    let sequences = (1..=Sequence::MAX.get())
        .step_by(997)
        .chain([Sequence::MAX.get()]);

    for k in keys {
        for n in sequences.clone() {
            let s = format(&k, seq(n));
            assert_eq!(parse(&s), Ok((k, seq(n))), "identifier: {s}");
        }
    }
}

#[test]
fn rejects_missing_segments() {
    assert_eq!(parse("CHN-2025"), Err(FormatError::InvalidLength { len: 8 }));
    assert_eq!(parse("2025-00001"), Err(FormatError::InvalidLength { len: 10 }));
    assert_eq!(parse(""), Err(FormatError::InvalidLength { len: 0 }));
}

#[test]
fn rejects_lowercase_location() {
    assert_eq!(
        parse("chn-2025-00001"),
        Err(FormatError::InvalidLocation { byte: b'c' })
    );
    assert_eq!(
        parse("CHn-2025-00001"),
        Err(FormatError::InvalidLocation { byte: b'n' })
    );
}

#[test]
fn rejects_three_digit_year() {
    assert!(parse("CHN-202-00001").is_err());
    // Same length as a valid identifier, but the year is padded into range.
    assert_eq!(parse("CHN-0202-00001"), Err(FormatError::InvalidYear));
}

#[test]
fn rejects_non_numeric_fields() {
    assert_eq!(parse("CHN-2025-0000A"), Err(FormatError::InvalidSequence));
    assert_eq!(parse("CHN-2025-+0001"), Err(FormatError::InvalidSequence));
    assert_eq!(parse("CHN-20X5-00001"), Err(FormatError::InvalidYear));
    assert_eq!(parse("CHN-2025-00000"), Err(FormatError::InvalidSequence));
}

#[test]
fn rejects_misplaced_separators() {
    assert_eq!(
        parse("CHN_2025-00001"),
        Err(FormatError::MissingSeparator { position: 3 })
    );
    assert_eq!(
        parse("CHN-2025_00001"),
        Err(FormatError::MissingSeparator { position: 8 })
    );
    assert_eq!(
        parse("CHNN-025-00001"),
        Err(FormatError::MissingSeparator { position: 3 })
    );
}

#[test]
fn rejects_surrounding_whitespace_and_multibyte_input() {
    assert!(parse(" CHN-2025-00001").is_err());
    assert!(parse("CHN-2025-00001\n").is_err());
    assert!(parse("ÇHN-2025-0001").is_err());
}

#[test]
fn identifier_display_and_from_str_agree() {
    let id: Identifier = "BLR-2031-07777".parse().unwrap();
    assert_eq!(id.key(), key("BLR", 2031));
    assert_eq!(id.sequence(), seq(7777));
    assert_eq!(id.to_string(), "BLR-2031-07777");
    assert_eq!(String::from(id), "BLR-2031-07777");
    assert_eq!(Identifier::try_from("BLR-2031-07777"), Ok(id));
}

#[test]
fn identifier_order_matches_string_order() {
    let mut ids: Vec<Identifier> = [
        "MUM-2025-00002",
        "CHN-2026-00001",
        "CHN-2025-00010",
        "CHN-2025-00002",
    ]
    .into_iter()
    .map(|s| s.parse().unwrap())
    .collect();
    ids.sort();
    let rendered: Vec<String> = ids.iter().map(ToString::to_string).collect();

    let mut expected = rendered.clone();
    expected.sort();
    assert_eq!(rendered, expected);
}

#[test]
fn sequence_bounds() {
    assert_eq!(Sequence::new(0), Err(FormatError::InvalidSequence));
    assert_eq!(Sequence::new(100_000), Err(FormatError::InvalidSequence));
    assert_eq!(Sequence::FIRST.get(), 1);
    assert_eq!(Sequence::MAX.get(), 99_999);
    assert_eq!(Sequence::from_counter(0), None);
    assert_eq!(Sequence::from_counter(99_999), Some(Sequence::MAX));
    assert_eq!(Sequence::from_counter(100_000), None);
    assert_eq!(Sequence::from_counter(u64::MAX), None);
}

#[test]
fn record_carries_decomposed_fields() {
    let id: Identifier = "CHN-2025-00003".parse().unwrap();
    let record = IdentifierRecord::from(id);
    assert_eq!(record.identifier, id);
    assert_eq!(record.location_code, "CHN".parse::<LocationCode>().unwrap());
    assert_eq!(record.registered_year.get(), 2025);
    assert_eq!(record.sequence_number.get(), 3);
}
