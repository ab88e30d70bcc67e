//! Fixed 96-byte scenario header
//!
//! Layout shared by every variant:
//!
//! ```text
//! 0x00  magic            u16
//! 0x02  opaque           2 bytes, preserved
//! 0x04  counts[12]       u32 or f32 per variant
//! 0x34  opaque           12 bytes, preserved
//! 0x40  slots[8]         u32 or f32 per variant (pointers / constants / unused)
//! ```
//!
//! - `read` - decoding and validation against the variant profile
//! - `write` - byte-exact encoding

mod read;
mod write;

#[cfg(test)]
mod tests;

pub use read::decode_header;
pub use write::encode_header;

pub(crate) use read::{decode_pointer, read_u16_le};

use crate::section::SectionName;
use crate::variant::{CountEncoding, FormatVariant, VariantProfile};
use crate::{COUNT_FIELDS, POINTER_SLOTS};

/// Decoded scenario header
///
/// Count and slot words are kept as raw little-endian words so that encoding
/// an unmodified header reproduces the original bytes exactly, including the
/// bit patterns of float fields.
#[derive(Debug, Clone, PartialEq)]
pub struct Header {
    /// Variant the header was decoded as
    pub variant: FormatVariant,
    /// Magic number (offset 0x00)
    pub magic: u16,
    /// Opaque bytes 0x02..0x04
    pub prefix: [u8; 2],
    /// Raw count words (0x04..0x34)
    pub counts: [u32; COUNT_FIELDS],
    /// Opaque bytes 0x34..0x40
    pub reserved: [u8; 12],
    /// Raw pointer slot words (0x40..0x60)
    pub slots: [u32; POINTER_SLOTS],
    /// Section pointers decoded from the slots, in declaration order
    pub pointers: PointerTable,
}

impl Header {
    /// Constants of the header's variant
    pub fn profile(&self) -> &'static VariantProfile {
        self.variant.profile()
    }

    /// Numeric value of count field `index` under the variant's encoding
    pub fn count_value(&self, index: usize) -> Option<f64> {
        let raw = *self.counts.get(index)?;
        Some(numeric_value(self.profile().encoding, raw))
    }

    fn count_usize(&self, index: usize) -> usize {
        self.count_value(index)
            .map(|value| value.round().max(0.0) as usize)
            .unwrap_or(0)
    }

    /// Number of terrain types
    pub fn terrain_type_count(&self) -> usize {
        self.count_usize(0)
    }

    /// Number of sides
    pub fn side_count(&self) -> usize {
        self.count_usize(1)
    }

    /// Map width in cells
    pub fn map_width(&self) -> usize {
        self.count_usize(2)
    }

    /// Map height in cells
    pub fn map_height(&self) -> usize {
        self.count_usize(3)
    }
}

/// Logical section pointers in declaration order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PointerTable {
    entries: Vec<(SectionName, usize)>,
}

impl PointerTable {
    /// Offset of `name`, if the section is present
    pub fn get(&self, name: SectionName) -> Option<usize> {
        self.entries
            .iter()
            .find(|(entry, _)| *entry == name)
            .map(|(_, offset)| *offset)
    }

    /// Set or add the offset of `name`
    pub fn set(&mut self, name: SectionName, offset: usize) {
        match self.entries.iter_mut().find(|(entry, _)| *entry == name) {
            Some(entry) => entry.1 = offset,
            None => self.entries.push((name, offset)),
        }
    }

    /// Entries in declaration order
    pub fn iter(&self) -> impl Iterator<Item = (SectionName, usize)> + '_ {
        self.entries.iter().copied()
    }

    /// Entries sorted by offset (file order)
    pub fn file_order(&self) -> Vec<(SectionName, usize)> {
        let mut sorted = self.entries.clone();
        sorted.sort_by_key(|(_, offset)| *offset);
        sorted
    }

    /// Number of present sections
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no section pointer is present
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Numeric value of a raw header word
pub(crate) fn numeric_value(encoding: CountEncoding, raw: u32) -> f64 {
    match encoding {
        CountEncoding::IntegerCounts => raw as f64,
        CountEncoding::FloatCounts => f32::from_bits(raw) as f64,
    }
}
