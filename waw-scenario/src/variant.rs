//! Format variants and their per-variant constants
//!
//! Each [`FormatVariant`] owns one static [`VariantProfile`], the single source
//! of truth for its magic number, header encoding, expected counts, pointer slot
//! roles and body layout. Adding a variant means adding an enum arm and a
//! profile, never branching on file names.

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ParseError;
use crate::section::SectionName;
use crate::terrain::TerrainEncoding;
use crate::{CHUNK_START, COUNT_FIELDS, HEADER_SIZE, POINTER_SLOTS};

/// Known scenario format variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FormatVariant {
    /// Integer-header, pointer-indexed variant (reference format)
    DDay,
    /// Float-header, pointer-indexed variant with a row-major nibble map
    Stalingrad,
    /// Float-header, chunked-body variant
    Crusader,
}

/// Encoding of the header count fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CountEncoding {
    /// Little-endian u32
    IntegerCounts,
    /// Little-endian IEEE-754 f32
    FloatCounts,
}

impl CountEncoding {
    /// Raw header word holding the integral `value`
    pub fn encode_value(self, value: u32) -> u32 {
        match self {
            Self::IntegerCounts => value,
            Self::FloatCounts => (value as f32).to_bits(),
        }
    }
}

/// How the body after the header is organised
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BodyLayout {
    /// Terrain layer directly after the header, sections addressed by pointer slots
    Pointers,
    /// Size-prefixed chunks from a fixed start offset
    Chunks { start: usize },
}

/// Role of one 4-byte pointer slot in the header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotRole {
    /// Byte offset of a logical section (0 = absent)
    Section(SectionName),
    /// Constant value stored in the variant's count encoding
    Constant(u32),
    /// Not interpreted, preserved verbatim
    Unused,
}

/// Per-variant constants
#[derive(Debug, Clone, Copy)]
pub struct VariantProfile {
    /// Variant this profile describes
    pub variant: FormatVariant,
    /// Magic number at offset 0 (little-endian)
    pub magic: u16,
    /// Encoding of counts and pointer slots
    pub encoding: CountEncoding,
    /// Fixed header size in bytes
    pub header_size: usize,
    /// Expected value of every count field
    pub counts: [u32; COUNT_FIELDS],
    /// Role of every pointer slot, in header order (0x40, 0x44, ... 0x5C)
    pub slots: [SlotRole; POINTER_SLOTS],
    /// Body organisation
    pub body: BodyLayout,
    /// Terrain layer encoding, if this variant's terrain is decoded
    pub terrain: Option<TerrainEncoding>,
    /// Byte used to pad edited text runs
    pub text_pad: u8,
}

impl VariantProfile {
    /// Expected terrain-type count (count slot 0)
    pub const fn terrain_type_count(&self) -> usize {
        self.counts[0] as usize
    }

    /// Expected side count (count slot 1)
    pub const fn side_count(&self) -> usize {
        self.counts[1] as usize
    }

    /// Map width in cells (count slot 2)
    pub const fn map_width(&self) -> usize {
        self.counts[2] as usize
    }

    /// Map height in cells (count slot 3)
    pub const fn map_height(&self) -> usize {
        self.counts[3] as usize
    }

    /// Largest terrain value kept as-is in a decoded grid
    pub const fn terrain_value_cap(&self) -> u8 {
        self.counts[0].saturating_sub(1) as u8
    }

    /// Byte length of the terrain layer (0 when terrain is not decoded)
    pub fn terrain_len(&self) -> usize {
        self.terrain
            .map(|encoding| encoding.byte_len(self.map_width(), self.map_height()))
            .unwrap_or(0)
    }

    /// First offset a section pointer may take
    pub fn body_start(&self) -> usize {
        self.header_size + self.terrain_len()
    }

    /// Minimum file length for this variant's fixed regions
    pub fn min_file_len(&self) -> usize {
        match self.body {
            BodyLayout::Pointers => self.body_start(),
            BodyLayout::Chunks { start } => start,
        }
    }
}

const SLOT_FLOAT_ONE: SlotRole = SlotRole::Constant(1);

static DDAY: VariantProfile = VariantProfile {
    variant: FormatVariant::DDay,
    magic: 0x1230,
    encoding: CountEncoding::IntegerCounts,
    header_size: HEADER_SIZE,
    counts: [13, 2, 64, 48, 6, 4, 3, 1, 0, 0, 0, 0],
    slots: [
        SlotRole::Unused,
        SlotRole::Unused,
        SlotRole::Section(SectionName::UnitRoster),
        SlotRole::Section(SectionName::UnitPositionsAndText),
        SlotRole::Section(SectionName::NumericData),
        SlotRole::Section(SectionName::SpecializedData),
        SlotRole::Unused,
        SlotRole::Unused,
    ],
    body: BodyLayout::Pointers,
    terrain: Some(TerrainEncoding::PackedPairColumnMajor),
    text_pad: 0x00,
};

static STALINGRAD: VariantProfile = VariantProfile {
    variant: FormatVariant::Stalingrad,
    magic: 0x0F4A,
    encoding: CountEncoding::FloatCounts,
    header_size: HEADER_SIZE,
    counts: [11, 2, 40, 32, 5, 4, 1, 1, 0, 0, 0, 0],
    slots: [
        SLOT_FLOAT_ONE,
        SLOT_FLOAT_ONE,
        SlotRole::Section(SectionName::UnitRoster),
        SlotRole::Section(SectionName::UnitPositionsAndText),
        SlotRole::Section(SectionName::NumericData),
        SlotRole::Section(SectionName::SpecializedData),
        SlotRole::Unused,
        SlotRole::Unused,
    ],
    body: BodyLayout::Pointers,
    terrain: Some(TerrainEncoding::PackedNibblePairRowMajor),
    text_pad: b' ',
};

static CRUSADER: VariantProfile = VariantProfile {
    variant: FormatVariant::Crusader,
    magic: 0x0F3C,
    encoding: CountEncoding::FloatCounts,
    header_size: HEADER_SIZE,
    counts: [12, 2, 56, 40, 5, 5, 1, 1, 0, 0, 0, 0],
    slots: [
        SLOT_FLOAT_ONE,
        SLOT_FLOAT_ONE,
        SlotRole::Unused,
        SlotRole::Unused,
        SlotRole::Unused,
        SlotRole::Unused,
        SlotRole::Unused,
        SlotRole::Unused,
    ],
    body: BodyLayout::Chunks { start: CHUNK_START },
    terrain: None,
    text_pad: 0x00,
};

impl FormatVariant {
    /// All known variants
    pub const ALL: [FormatVariant; 3] = [Self::DDay, Self::Stalingrad, Self::Crusader];

    /// Constants for this variant
    pub fn profile(self) -> &'static VariantProfile {
        match self {
            Self::DDay => &DDAY,
            Self::Stalingrad => &STALINGRAD,
            Self::Crusader => &CRUSADER,
        }
    }

    /// Variant whose magic number equals `magic`
    pub fn from_magic(magic: u16) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|variant| variant.profile().magic == magic)
    }

    /// Magic number of this variant
    pub fn magic(self) -> u16 {
        self.profile().magic
    }

    /// Short name used in messages
    pub fn name(self) -> &'static str {
        match self {
            Self::DDay => "DDay",
            Self::Stalingrad => "Stalingrad",
            Self::Crusader => "Crusader",
        }
    }
}

impl fmt::Display for FormatVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [magic 0x{:04X}]", self.name(), self.magic())
    }
}

/// Classify a buffer by its magic number
///
/// This is the gate in front of every other component: a buffer whose magic is
/// not recognized is rejected, never guessed.
pub fn detect_variant(bytes: &[u8]) -> Result<FormatVariant, ParseError> {
    let magic = match bytes {
        [lo, hi, ..] => u16::from_le_bytes([*lo, *hi]),
        _ => return Err(ParseError::TooSmall { len: bytes.len() }),
    };

    let variant = FormatVariant::from_magic(magic).ok_or(ParseError::UnknownFormat { magic })?;
    tracing::debug!(variant = variant.name(), magic, "detected scenario variant");
    Ok(variant)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_words_per_encoding() {
        assert_eq!(CountEncoding::IntegerCounts.encode_value(64), 64);
        assert_eq!(CountEncoding::FloatCounts.encode_value(1), 0x3F80_0000);
        assert_eq!(f32::from_bits(CountEncoding::FloatCounts.encode_value(40)), 40.0);
    }

    #[test]
    fn test_magic_dispatch() {
        let mut bytes = vec![0u8; 8];
        bytes[..2].copy_from_slice(&[0x30, 0x12]);
        assert_eq!(detect_variant(&bytes), Ok(FormatVariant::DDay));

        bytes[..2].copy_from_slice(&[0x4A, 0x0F]);
        assert_eq!(detect_variant(&bytes), Ok(FormatVariant::Stalingrad));

        bytes[..2].copy_from_slice(&[0x3C, 0x0F]);
        assert_eq!(detect_variant(&bytes), Ok(FormatVariant::Crusader));
    }

    #[test]
    fn test_unknown_magic_is_rejected() {
        let bytes = [0xFF, 0xFF, 0x00, 0x00];
        assert_eq!(
            detect_variant(&bytes),
            Err(ParseError::UnknownFormat { magic: 0xFFFF })
        );
    }

    #[test]
    fn test_too_small() {
        assert_eq!(detect_variant(&[0x30]), Err(ParseError::TooSmall { len: 1 }));
        assert_eq!(detect_variant(&[]), Err(ParseError::TooSmall { len: 0 }));
    }

    #[test]
    fn test_magic_numbers_are_unique() {
        for a in FormatVariant::ALL {
            for b in FormatVariant::ALL {
                if a != b {
                    assert_ne!(a.magic(), b.magic());
                }
            }
        }
    }

    #[test]
    fn test_profiles_are_consistent() {
        for variant in FormatVariant::ALL {
            let profile = variant.profile();
            assert_eq!(profile.variant, variant);
            assert_eq!(profile.header_size, HEADER_SIZE);
            assert!(profile.map_width() * profile.map_height() > 0);
            assert!(profile.terrain_type_count() > 0);
        }
    }

    #[test]
    fn test_dday_terrain_layer_size() {
        let profile = FormatVariant::DDay.profile();
        assert_eq!(profile.terrain_len(), 64 * 48);
        assert_eq!(profile.body_start(), HEADER_SIZE + 64 * 48);
        assert_eq!(profile.terrain_value_cap(), 12);
    }

    #[test]
    fn test_stalingrad_terrain_layer_is_nibble_packed() {
        let profile = FormatVariant::Stalingrad.profile();
        assert_eq!(profile.terrain_len(), 40 * 32 / 2);
    }

    #[test]
    fn test_crusader_has_no_terrain_layer() {
        let profile = FormatVariant::Crusader.profile();
        assert_eq!(profile.terrain_len(), 0);
        assert_eq!(profile.min_file_len(), CHUNK_START);
    }
}
