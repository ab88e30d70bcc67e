//! Header encoding

use super::Header;
use super::read::decode_pointer;
use crate::variant::SlotRole;
use crate::{COUNT_TABLE_OFFSET, HEADER_SIZE, POINTER_TABLE_OFFSET, RESERVED_OFFSET};

/// Encode a header back to its 96 bytes
///
/// Raw words are written as decoded, so an unmodified header reproduces the
/// original bytes exactly. Section slots are rewritten only when the pointer
/// table disagrees with the raw slot word.
pub fn encode_header(header: &Header) -> [u8; HEADER_SIZE] {
    let profile = header.profile();
    let mut bytes = [0u8; HEADER_SIZE];

    bytes[0..2].copy_from_slice(&header.magic.to_le_bytes());
    bytes[2..4].copy_from_slice(&header.prefix);

    for (index, count) in header.counts.iter().enumerate() {
        let offset = COUNT_TABLE_OFFSET + index * 4;
        bytes[offset..offset + 4].copy_from_slice(&count.to_le_bytes());
    }

    bytes[RESERVED_OFFSET..POINTER_TABLE_OFFSET].copy_from_slice(&header.reserved);

    for (index, role) in profile.slots.iter().enumerate() {
        let mut raw = header.slots[index];

        if let SlotRole::Section(name) = *role {
            let current = decode_pointer(profile.encoding, raw).unwrap_or(0);
            let wanted = header.pointers.get(name).unwrap_or(0);
            if current != wanted {
                raw = profile.encoding.encode_value(wanted as u32);
            }
        }

        let offset = POINTER_TABLE_OFFSET + index * 4;
        bytes[offset..offset + 4].copy_from_slice(&raw.to_le_bytes());
    }

    bytes
}

impl Header {
    /// Encode this header to bytes
    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        encode_header(self)
    }
}
