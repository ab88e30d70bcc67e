//! Header decoding and validation

use super::{Header, PointerTable, numeric_value};
use crate::error::{HeaderField, ParseError};
use crate::variant::{CountEncoding, FormatVariant, SlotRole, VariantProfile};
use crate::{COUNT_FIELDS, COUNT_TABLE_OFFSET, FLOAT_TOLERANCE, POINTER_SLOTS, POINTER_TABLE_OFFSET, RESERVED_OFFSET};

/// Decode and validate the fixed header of `buffer` as `variant`
///
/// Validation checks, in order:
/// - the buffer reaches the end of the variant's fixed regions
/// - the magic number belongs to `variant`
/// - every count equals the variant constant (within [`FLOAT_TOLERANCE`] for
///   float headers)
/// - map width times map height is a positive cell count
/// - constant slots hold their expected value
/// - present section pointers lie within `[body_start, buffer.len()]`
///
/// The first failed rule is reported as [`ParseError::HeaderMismatch`].
pub fn decode_header(buffer: &[u8], variant: FormatVariant) -> Result<Header, ParseError> {
    let profile = variant.profile();

    let required = profile.min_file_len();
    if buffer.len() < required {
        return Err(ParseError::Truncated {
            variant,
            len: buffer.len(),
            required,
        });
    }

    let magic = read_u16_le(buffer, 0).unwrap_or_default();
    if magic != profile.magic {
        return Err(mismatch(
            variant,
            HeaderField::Magic,
            format!("0x{:04X}", profile.magic),
            format!("0x{:04X}", magic),
        ));
    }

    let mut prefix = [0u8; 2];
    prefix.copy_from_slice(&buffer[2..4]);

    // Counts (12 words)
    let mut counts = [0u32; COUNT_FIELDS];
    for (index, count) in counts.iter_mut().enumerate() {
        let raw = read_u32_le(buffer, COUNT_TABLE_OFFSET + index * 4).unwrap_or_default();
        check_constant(profile, raw, profile.counts[index], HeaderField::Count(index))?;
        *count = raw;
    }

    let width = numeric_value(profile.encoding, counts[2]).round();
    let height = numeric_value(profile.encoding, counts[3]).round();
    if width * height < 1.0 {
        return Err(mismatch(
            variant,
            HeaderField::MapDimensions,
            "positive cell count".to_string(),
            format!("{}x{}", width, height),
        ));
    }

    let mut reserved = [0u8; 12];
    reserved.copy_from_slice(&buffer[RESERVED_OFFSET..POINTER_TABLE_OFFSET]);

    // Pointer slots (8 words)
    let body_start = profile.body_start();
    let mut slots = [0u32; POINTER_SLOTS];
    let mut pointers = PointerTable::default();
    for (index, role) in profile.slots.iter().enumerate() {
        let offset = POINTER_TABLE_OFFSET + index * 4;
        let raw = read_u32_le(buffer, offset).unwrap_or_default();
        slots[index] = raw;

        match *role {
            SlotRole::Section(name) => {
                let field = HeaderField::Pointer(name);
                let Some(pointer) = decode_pointer(profile.encoding, raw) else {
                    return Err(mismatch(
                        variant,
                        field,
                        "integral offset".to_string(),
                        format_raw(profile.encoding, raw),
                    ));
                };
                if pointer == 0 {
                    continue;
                }
                if pointer < body_start || pointer > buffer.len() {
                    return Err(mismatch(
                        variant,
                        field,
                        format!("offset in 0x{:X}..=0x{:X}", body_start, buffer.len()),
                        format!("0x{:X}", pointer),
                    ));
                }
                pointers.set(name, pointer);
            }
            SlotRole::Constant(expected) => {
                check_constant(profile, raw, expected, HeaderField::Constant(offset))?;
            }
            SlotRole::Unused => {}
        }
    }

    tracing::debug!(
        variant = variant.name(),
        sections = pointers.len(),
        "decoded scenario header"
    );

    Ok(Header {
        variant,
        magic,
        prefix,
        counts,
        reserved,
        slots,
        pointers,
    })
}

/// Decode a pointer slot word into a byte offset
///
/// Float slots must hold a finite, non-negative, integral value.
pub(crate) fn decode_pointer(encoding: CountEncoding, raw: u32) -> Option<usize> {
    match encoding {
        CountEncoding::IntegerCounts => Some(raw as usize),
        CountEncoding::FloatCounts => {
            let value = f32::from_bits(raw) as f64;
            if !value.is_finite() || value < 0.0 || (value - value.round()).abs() >= FLOAT_TOLERANCE {
                return None;
            }
            Some(value.round() as usize)
        }
    }
}

fn check_constant(
    profile: &VariantProfile,
    raw: u32,
    expected: u32,
    field: HeaderField,
) -> Result<(), ParseError> {
    let matches = match profile.encoding {
        CountEncoding::IntegerCounts => raw == expected,
        CountEncoding::FloatCounts => {
            let value = f32::from_bits(raw) as f64;
            value.is_finite() && (value - expected as f64).abs() < FLOAT_TOLERANCE
        }
    };

    if matches {
        Ok(())
    } else {
        Err(mismatch(
            profile.variant,
            field,
            expected.to_string(),
            format_raw(profile.encoding, raw),
        ))
    }
}

fn format_raw(encoding: CountEncoding, raw: u32) -> String {
    match encoding {
        CountEncoding::IntegerCounts => raw.to_string(),
        CountEncoding::FloatCounts => format!("{:?}", f32::from_bits(raw)),
    }
}

fn mismatch(variant: FormatVariant, field: HeaderField, expected: String, actual: String) -> ParseError {
    ParseError::HeaderMismatch {
        variant,
        field,
        expected,
        actual,
    }
}

/// Read a little-endian u16, `None` past the end of `buffer`
pub(crate) fn read_u16_le(buffer: &[u8], offset: usize) -> Option<u16> {
    let bytes = buffer.get(offset..offset.checked_add(2)?)?;
    Some(u16::from_le_bytes([bytes[0], bytes[1]]))
}

/// Read a little-endian u32, `None` past the end of `buffer`
pub(crate) fn read_u32_le(buffer: &[u8], offset: usize) -> Option<u32> {
    let bytes = buffer.get(offset..offset.checked_add(4)?)?;
    Some(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
}
