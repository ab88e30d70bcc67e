//! Scenario files for command tests

use std::path::{Path, PathBuf};

use waw_scenario::{
    CHUNK_START, COUNT_TABLE_OFFSET, FormatVariant, HEADER_SIZE, POINTER_TABLE_OFFSET, SectionName,
    SlotRole,
};

pub const BRIEFING: &str = "Break out of the bridgehead";
pub const BRIEFING_OFFSET: usize = 8;
pub const TURNS: u16 = 12;

fn put_word(bytes: &mut [u8], at: usize, variant: FormatVariant, value: u32) {
    let raw = variant.profile().encoding.encode_value(value);
    bytes[at..at + 4].copy_from_slice(&raw.to_le_bytes());
}

fn header(variant: FormatVariant) -> Vec<u8> {
    let profile = variant.profile();
    let mut bytes = vec![0u8; HEADER_SIZE];
    bytes[..2].copy_from_slice(&profile.magic.to_le_bytes());
    for (i, value) in profile.counts.iter().enumerate() {
        put_word(&mut bytes, COUNT_TABLE_OFFSET + i * 4, variant, *value);
    }
    for (i, role) in profile.slots.iter().enumerate() {
        if let SlotRole::Constant(value) = role {
            put_word(&mut bytes, POINTER_TABLE_OFFSET + i * 4, variant, *value);
        }
    }
    bytes
}

fn parameter_block() -> Vec<u8> {
    let mut block = vec![0u8; 300];
    for (i, word) in [40u16, 40, 40, TURNS].iter().enumerate() {
        block[64 + i * 2..66 + i * 2].copy_from_slice(&word.to_le_bytes());
    }
    block
}

fn text_block() -> Vec<u8> {
    let mut block = vec![0u8; 64];
    block[BRIEFING_OFFSET..BRIEFING_OFFSET + BRIEFING.len()].copy_from_slice(BRIEFING.as_bytes());
    block
}

/// Pointer-indexed scenario: terrain, NumericData, UnitPositionsAndText
pub fn pointer_scenario(variant: FormatVariant) -> Vec<u8> {
    let profile = variant.profile();
    let mut bytes = header(variant);
    bytes.extend((0..profile.terrain_len()).map(|i| (i % 5) as u8));

    for (name, body) in [
        (SectionName::NumericData, parameter_block()),
        (SectionName::UnitPositionsAndText, text_block()),
    ] {
        let slot = profile
            .slots
            .iter()
            .position(|role| *role == SlotRole::Section(name))
            .unwrap();
        let pointer = bytes.len() as u32;
        put_word(&mut bytes, POINTER_TABLE_OFFSET + slot * 4, variant, pointer);
        bytes.extend(body);
    }
    bytes
}

/// Chunked scenario: tag chunk, parameter chunk, text chunk
pub fn chunked_scenario() -> Vec<u8> {
    let mut bytes = header(FormatVariant::Crusader);
    bytes.resize(CHUNK_START, 0);
    for chunk in [b"TAG\x01".to_vec(), parameter_block(), text_block()] {
        bytes.extend((chunk.len() as u16).to_le_bytes());
        bytes.extend(chunk);
    }
    bytes
}

/// Write `bytes` to `name` inside `dir`
pub fn write(dir: &Path, name: &str, bytes: &[u8]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, bytes).unwrap();
    path
}
