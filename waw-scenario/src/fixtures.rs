//! Synthetic scenario buffers shared by unit tests

use crate::section::SectionName;
use crate::variant::{FormatVariant, SlotRole};
use crate::{CHUNK_START, COUNT_TABLE_OFFSET, HEADER_SIZE, POINTER_TABLE_OFFSET, PARAMETER_WORDS};

pub(crate) const BRIEFING: &str = "Secure the causeways before dawn";
pub(crate) const ORDERS: &str = "Hold Carentan";
pub(crate) const CRUSADER_TEXT: &str = "Tobruk garrison must hold";

/// Offset of the parameter array inside NumericData
pub(crate) const NUMERIC_PARAM_OFFSET: usize = 40;
/// Offset of the parameter array inside the large Crusader chunk payload
pub(crate) const CHUNK_PARAM_OFFSET: usize = 100;
/// Offset of the briefing text inside UnitPositionsAndText
pub(crate) const BRIEFING_OFFSET: usize = 6;

pub(crate) const POINTER_PARAMS: [u16; PARAMETER_WORDS] = [120, 80, 64, 24, 3, 0, 0, 0, 0, 0, 0, 0];
pub(crate) const CHUNK_PARAMS: [u16; PARAMETER_WORDS] = [50, 50, 50, 11, 0, 0, 0, 0, 0, 0, 0, 0];

/// Valid 96-byte header with every pointer slot cleared
pub(crate) fn header_for(variant: FormatVariant) -> Vec<u8> {
    let profile = variant.profile();
    let mut bytes = vec![0u8; HEADER_SIZE];
    bytes[0..2].copy_from_slice(&profile.magic.to_le_bytes());

    for (index, value) in profile.counts.iter().enumerate() {
        let offset = COUNT_TABLE_OFFSET + index * 4;
        let raw = profile.encoding.encode_value(*value);
        bytes[offset..offset + 4].copy_from_slice(&raw.to_le_bytes());
    }

    for (index, role) in profile.slots.iter().enumerate() {
        if let SlotRole::Constant(value) = role {
            set_slot_raw(&mut bytes, index, profile.encoding.encode_value(*value));
        }
    }

    bytes
}

pub(crate) fn set_slot_raw(bytes: &mut [u8], index: usize, raw: u32) {
    let offset = POINTER_TABLE_OFFSET + index * 4;
    bytes[offset..offset + 4].copy_from_slice(&raw.to_le_bytes());
}

pub(crate) fn set_pointer(bytes: &mut [u8], variant: FormatVariant, name: SectionName, value: usize) {
    let profile = variant.profile();
    let index = profile
        .slots
        .iter()
        .position(|role| *role == SlotRole::Section(name))
        .expect("variant has no slot for section");
    set_slot_raw(bytes, index, profile.encoding.encode_value(value as u32));
}

pub(crate) fn put_words(block: &mut [u8], offset: usize, words: &[u16]) {
    for (i, word) in words.iter().enumerate() {
        block[offset + i * 2..offset + i * 2 + 2].copy_from_slice(&word.to_le_bytes());
    }
}

/// Terrain layer with every value inside the variant's cap
pub(crate) fn terrain_layer(variant: FormatVariant) -> Vec<u8> {
    let profile = variant.profile();
    let types = profile.terrain_type_count();
    match variant {
        FormatVariant::DDay => (0..profile.terrain_len())
            .map(|i| ((i % types) as u8) | (((i % 5) as u8) << 4))
            .collect(),
        _ => (0..profile.terrain_len())
            .map(|i| ((2 * i % types) as u8) | ((((2 * i + 1) % types) as u8) << 4))
            .collect(),
    }
}

/// Section bodies in file order for pointer-indexed variants
pub(crate) fn pointer_sections() -> Vec<(SectionName, Vec<u8>)> {
    let mut numeric = vec![0u8; 300];
    put_words(&mut numeric, NUMERIC_PARAM_OFFSET, &POINTER_PARAMS);
    numeric[200] = 0x81;

    let mut specialized = vec![0u8; 64];
    specialized[10] = 0x07;
    specialized[33] = 0xC0;

    let roster: Vec<u8> = (0..48u8).map(|i| i.wrapping_mul(37) | 0x80).collect();

    let mut text = vec![0x01, 0x02, 0x81, 0x90, 0x00, 0x00];
    text.extend_from_slice(BRIEFING.as_bytes());
    text.push(0x00);
    text.extend_from_slice(ORDERS.as_bytes());
    text.push(0x00);
    text.resize(80, 0x00);

    vec![
        (SectionName::NumericData, numeric),
        (SectionName::SpecializedData, specialized),
        (SectionName::UnitRoster, roster),
        (SectionName::UnitPositionsAndText, text),
    ]
}

/// Complete pointer-indexed scenario (D-Day or Stalingrad)
///
/// Layout: header, terrain layer, 4-byte gap, then NumericData,
/// SpecializedData, UnitRoster, UnitPositionsAndText.
pub(crate) fn pointer_scenario(variant: FormatVariant) -> Vec<u8> {
    let mut bytes = header_for(variant);
    bytes.extend(terrain_layer(variant));
    bytes.extend_from_slice(&[0xEE; 4]);

    let mut body = Vec::new();
    for (name, data) in pointer_sections() {
        let offset = bytes.len() + body.len();
        set_pointer(&mut bytes, variant, name, offset);
        body.extend(data);
    }
    bytes.extend(body);
    bytes
}

/// Complete chunked (Crusader) scenario
///
/// Chunk stream: tag chunk (12 bytes), zero size word, large chunk (400 bytes),
/// size word above the ceiling, small chunk (30 bytes).
pub(crate) fn chunked_scenario() -> Vec<u8> {
    let mut bytes = header_for(FormatVariant::Crusader);
    bytes.extend((HEADER_SIZE..CHUNK_START).map(|i| (i % 7) as u8));

    let tag = b"SIDE\x02\x00TURN\x0B\x00".to_vec();
    push_chunk(&mut bytes, &tag);

    bytes.extend_from_slice(&0u16.to_le_bytes());

    let mut large = vec![0u8; 400];
    put_words(&mut large, CHUNK_PARAM_OFFSET, &CHUNK_PARAMS);
    large[200..200 + CRUSADER_TEXT.len()].copy_from_slice(CRUSADER_TEXT.as_bytes());
    push_chunk(&mut bytes, &large);

    bytes.extend_from_slice(&0xFFFFu16.to_le_bytes());

    let small: Vec<u8> = (0..30u8).collect();
    push_chunk(&mut bytes, &small);

    bytes
}

pub(crate) fn push_chunk(bytes: &mut Vec<u8>, data: &[u8]) {
    bytes.extend_from_slice(&(data.len() as u16).to_le_bytes());
    bytes.extend_from_slice(data);
}
