//! Tests for header decoding and encoding

use super::*;
use crate::error::{HeaderField, ParseError};
use crate::fixtures::{chunked_scenario, header_for, pointer_scenario, set_pointer, set_slot_raw};
use crate::section::SectionName;
use crate::variant::FormatVariant;
use crate::{COUNT_TABLE_OFFSET, HEADER_SIZE};

#[test]
fn test_decode_dday_header() {
    let bytes = pointer_scenario(FormatVariant::DDay);
    let header = decode_header(&bytes, FormatVariant::DDay).unwrap();

    assert_eq!(header.magic, 0x1230);
    assert_eq!(header.terrain_type_count(), 13);
    assert_eq!(header.side_count(), 2);
    assert_eq!(header.map_width(), 64);
    assert_eq!(header.map_height(), 48);
    assert_eq!(header.pointers.len(), 4);

    let order: Vec<SectionName> = header.pointers.file_order().into_iter().map(|(n, _)| n).collect();
    assert_eq!(
        order,
        vec![
            SectionName::NumericData,
            SectionName::SpecializedData,
            SectionName::UnitRoster,
            SectionName::UnitPositionsAndText,
        ]
    );
}

#[test]
fn test_declaration_order_differs_from_file_order() {
    let bytes = pointer_scenario(FormatVariant::DDay);
    let header = decode_header(&bytes, FormatVariant::DDay).unwrap();

    let declared: Vec<SectionName> = header.pointers.iter().map(|(n, _)| n).collect();
    assert_eq!(declared[0], SectionName::UnitRoster);
    assert_eq!(header.pointers.file_order()[0].0, SectionName::NumericData);
}

#[test]
fn test_decode_float_header() {
    let bytes = pointer_scenario(FormatVariant::Stalingrad);
    let header = decode_header(&bytes, FormatVariant::Stalingrad).unwrap();

    assert_eq!(header.count_value(2), Some(40.0));
    assert_eq!(header.map_height(), 32);
    assert_eq!(header.pointers.len(), 4);
}

#[test]
fn test_float_counts_accept_small_deviation() {
    let mut bytes = pointer_scenario(FormatVariant::Stalingrad);
    let offset = COUNT_TABLE_OFFSET + 4;
    bytes[offset..offset + 4].copy_from_slice(&2.005f32.to_bits().to_le_bytes());

    let header = decode_header(&bytes, FormatVariant::Stalingrad).unwrap();
    assert_eq!(header.side_count(), 2);
}

#[test]
fn test_float_counts_reject_large_deviation() {
    let mut bytes = pointer_scenario(FormatVariant::Stalingrad);
    let offset = COUNT_TABLE_OFFSET + 4;
    bytes[offset..offset + 4].copy_from_slice(&2.5f32.to_bits().to_le_bytes());

    let err = decode_header(&bytes, FormatVariant::Stalingrad).unwrap_err();
    assert!(matches!(
        err,
        ParseError::HeaderMismatch {
            field: HeaderField::Count(1),
            ..
        }
    ));
}

#[test]
fn test_integer_count_mismatch_reports_expected_and_actual() {
    let mut bytes = pointer_scenario(FormatVariant::DDay);
    let offset = COUNT_TABLE_OFFSET + 2 * 4;
    bytes[offset..offset + 4].copy_from_slice(&65u32.to_le_bytes());

    match decode_header(&bytes, FormatVariant::DDay) {
        Err(ParseError::HeaderMismatch {
            variant,
            field,
            expected,
            actual,
        }) => {
            assert_eq!(variant, FormatVariant::DDay);
            assert_eq!(field, HeaderField::Count(2));
            assert_eq!(expected, "64");
            assert_eq!(actual, "65");
        }
        other => panic!("unexpected result: {:?}", other),
    }
}

#[test]
fn test_integer_header_read_as_float_variant_fails() {
    // Same buffer, wrong variant: the magic check catches it before any count is read
    let bytes = pointer_scenario(FormatVariant::DDay);
    let err = decode_header(&bytes, FormatVariant::Stalingrad).unwrap_err();
    assert!(matches!(
        err,
        ParseError::HeaderMismatch {
            field: HeaderField::Magic,
            ..
        }
    ));
}

#[test]
fn test_pointer_past_end_is_rejected() {
    let mut bytes = pointer_scenario(FormatVariant::DDay);
    let len = bytes.len();
    set_pointer(&mut bytes, FormatVariant::DDay, SectionName::SpecializedData, len + 1);

    let err = decode_header(&bytes, FormatVariant::DDay).unwrap_err();
    assert!(matches!(
        err,
        ParseError::HeaderMismatch {
            field: HeaderField::Pointer(SectionName::SpecializedData),
            ..
        }
    ));
}

#[test]
fn test_huge_pointer_is_rejected_without_panic() {
    let mut bytes = pointer_scenario(FormatVariant::DDay);
    set_slot_raw(&mut bytes, 2, u32::MAX);

    assert!(matches!(
        decode_header(&bytes, FormatVariant::DDay),
        Err(ParseError::HeaderMismatch { .. })
    ));
}

#[test]
fn test_pointer_inside_terrain_layer_is_rejected() {
    let mut bytes = pointer_scenario(FormatVariant::DDay);
    set_pointer(&mut bytes, FormatVariant::DDay, SectionName::NumericData, HEADER_SIZE + 10);

    assert!(matches!(
        decode_header(&bytes, FormatVariant::DDay),
        Err(ParseError::HeaderMismatch {
            field: HeaderField::Pointer(SectionName::NumericData),
            ..
        })
    ));
}

#[test]
fn test_fractional_float_pointer_is_rejected() {
    let mut bytes = pointer_scenario(FormatVariant::Stalingrad);
    set_slot_raw(&mut bytes, 3, 1000.5f32.to_bits());

    assert!(matches!(
        decode_header(&bytes, FormatVariant::Stalingrad),
        Err(ParseError::HeaderMismatch {
            field: HeaderField::Pointer(SectionName::UnitPositionsAndText),
            ..
        })
    ));
}

#[test]
fn test_decorative_constant_must_be_one() {
    let mut bytes = pointer_scenario(FormatVariant::Stalingrad);
    set_slot_raw(&mut bytes, 1, 3.0f32.to_bits());

    assert!(matches!(
        decode_header(&bytes, FormatVariant::Stalingrad),
        Err(ParseError::HeaderMismatch {
            field: HeaderField::Constant(0x44),
            ..
        })
    ));
}

#[test]
fn test_zero_pointer_means_absent() {
    let mut bytes = pointer_scenario(FormatVariant::DDay);
    set_pointer(&mut bytes, FormatVariant::DDay, SectionName::SpecializedData, 0);

    let header = decode_header(&bytes, FormatVariant::DDay).unwrap();
    assert_eq!(header.pointers.get(SectionName::SpecializedData), None);
    assert_eq!(header.pointers.len(), 3);
}

#[test]
fn test_truncated_buffer() {
    let bytes = header_for(FormatVariant::DDay);
    let err = decode_header(&bytes, FormatVariant::DDay).unwrap_err();
    assert!(matches!(err, ParseError::Truncated { len: 96, .. }));

    let bytes = header_for(FormatVariant::Crusader);
    let err = decode_header(&bytes, FormatVariant::Crusader).unwrap_err();
    assert!(matches!(err, ParseError::Truncated { required: 0x022C, .. }));
}

#[test]
fn test_encode_round_trip_all_variants() {
    for variant in FormatVariant::ALL {
        let bytes = match variant {
            FormatVariant::Crusader => chunked_scenario(),
            _ => pointer_scenario(variant),
        };
        let header = decode_header(&bytes, variant).unwrap();
        assert_eq!(&encode_header(&header)[..], &bytes[..HEADER_SIZE], "{}", variant);
    }
}

#[test]
fn test_encode_preserves_opaque_bytes() {
    let mut bytes = pointer_scenario(FormatVariant::DDay);
    bytes[2] = 0xAB;
    bytes[0x35] = 0xCD;
    set_slot_raw(&mut bytes, 7, 0xDEADBEEF);

    let header = decode_header(&bytes, FormatVariant::DDay).unwrap();
    assert_eq!(&header.to_bytes()[..], &bytes[..HEADER_SIZE]);
}

#[test]
fn test_encode_writes_changed_pointer() {
    let bytes = pointer_scenario(FormatVariant::Stalingrad);
    let mut header = decode_header(&bytes, FormatVariant::Stalingrad).unwrap();
    header.pointers.set(SectionName::UnitRoster, 5000);

    let encoded = header.to_bytes();
    let raw = u32::from_le_bytes([encoded[0x48], encoded[0x49], encoded[0x4A], encoded[0x4B]]);
    assert_eq!(f32::from_bits(raw), 5000.0);
}
