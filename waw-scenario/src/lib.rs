//! WaW-Scenario: scenario file codec for the 1990s hex wargame family
//!
//! This crate reads and writes the scenario files shared by three games of one
//! lineage: D-Day, Stalingrad and Crusader. The three titles use incompatible
//! on-disk layouts that are told apart by a 2-byte magic number at offset 0.
//!
//! # Key Features
//!
//! - **Explicit variant dispatch**: every component takes a [`FormatVariant`],
//!   there is no ambient "current format" state
//! - **Byte-exact round-trip**: unexplained regions are carried verbatim, so
//!   `save(load(bytes)) == bytes` for any file the codec accepts
//! - **Recoverable quirks**: corrupt chunk sizes and out-of-range terrain values
//!   are recorded as [`LoadWarning`]s instead of aborting the load
//! - **Heuristic parameter recovery**: the turn count is found by searching for
//!   a plausible 12-word record, with an optional per-scenario hint table
//!
//! # Format Overview
//!
//! Every file starts with a fixed 96-byte header:
//! - 0x00: magic (u16 LE)
//! - 0x04..0x34: twelve count fields (u32 or f32 depending on variant)
//! - 0x40..0x60: eight pointer slots (section offsets or decorative constants)
//!
//! The body is either a terrain layer followed by pointer-addressed sections
//! (D-Day, Stalingrad) or a stream of size-prefixed chunks starting at 0x022C
//! (Crusader).
//!
//! # Usage
//!
//! ```ignore
//! use waw_scenario::{load, save, SectionName};
//!
//! let bytes = std::fs::read("OMAHA.SCN")?;
//! let mut model = load(&bytes)?;
//!
//! println!("Variant: {}", model.variant());
//! println!("Turns: {:?}", model.turn_count());
//!
//! model.set_cell(3, 7, 2, 0)?;
//! std::fs::write("OMAHA.SCN", save(&model))?;
//! ```

mod chunk;
mod config;
mod error;
mod header;
mod model;
mod params;
mod section;
mod terrain;
mod text;
mod variant;

#[cfg(test)]
mod fixtures;

pub use chunk::{Chunk, ChunkEvent, ChunkWalker, SkipReason};
pub use config::{CodecConfig, LoadOptions};
pub use error::{CodecError, HeaderField, LoadWarning, ParseError};
pub use header::{Header, PointerTable, decode_header, encode_header};
pub use model::{ScenarioModel, ScenarioState, ScenarioSummary, SectionInfo, TerrainInfo, load, load_with, save};
pub use params::{
    ParameterArray, ParameterHint, ParameterHints, ParameterMatch, accept_at, find_in_blocks,
    find_parameter_array, locate_parameter_array,
};
pub use section::{Section, SectionName, extract_chunked_sections, extract_sections, reassemble};
pub use terrain::{
    TerrainCell, TerrainEncoding, TerrainGrid, decode_terrain, decode_terrain_clamped,
    encode_terrain,
};
pub use text::{TextRun, TextRunId, check_replacement, extract_runs, read_run, replace_run};
pub use variant::{
    BodyLayout, CountEncoding, FormatVariant, SlotRole, VariantProfile, detect_variant,
};

// =============================================================================
// Header Constants
// =============================================================================

/// Fixed header size shared by every known variant
pub const HEADER_SIZE: usize = 96;

/// Offset of the first count field
pub const COUNT_TABLE_OFFSET: usize = 0x04;

/// Number of count fields in the header
pub const COUNT_FIELDS: usize = 12;

/// Offset of the opaque bytes between the count table and the pointer table
pub const RESERVED_OFFSET: usize = COUNT_TABLE_OFFSET + COUNT_FIELDS * 4;

/// Offset of the first pointer slot
pub const POINTER_TABLE_OFFSET: usize = 0x40;

/// Number of 4-byte pointer slots in the header
pub const POINTER_SLOTS: usize = 8;

/// Maximum distance between a float count and its expected constant
pub const FLOAT_TOLERANCE: f64 = 0.01;

// =============================================================================
// Chunk Constants
// =============================================================================

/// Offset of the first chunk in the chunked-body variant
pub const CHUNK_START: usize = 0x022C;

/// Largest declared chunk size the walker trusts
pub const CHUNK_SIZE_CEILING: u16 = 20_000;

/// Size of the little-endian length prefix in front of every chunk
pub const CHUNK_PREFIX_SIZE: usize = 2;

/// Chunks smaller than this are never searched for a parameter array
pub const LARGE_CHUNK_MIN: usize = 256;

// =============================================================================
// Parameter Array Constants
// =============================================================================

/// Number of 16-bit words in a parameter array
pub const PARAMETER_WORDS: usize = 12;

/// Byte length of a parameter array
pub const PARAMETER_ARRAY_SIZE: usize = PARAMETER_WORDS * 2;

/// Index of the turn count word
pub const TURN_COUNT_WORD: usize = 3;

// =============================================================================
// Text Constants
// =============================================================================

/// Default minimum length of an extracted text run
pub const DEFAULT_MIN_TEXT_RUN: usize = 4;

// =============================================================================
// Terrain Constants
// =============================================================================

/// Largest value that fits in a packed terrain or variant nibble
pub const NIBBLE_MAX: u8 = 0x0F;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_layout_constants() {
        assert_eq!(RESERVED_OFFSET, 0x34);
        assert_eq!(POINTER_TABLE_OFFSET + POINTER_SLOTS * 4, HEADER_SIZE);
        assert!(CHUNK_START > HEADER_SIZE);
    }

    #[test]
    fn test_parameter_constants() {
        assert_eq!(PARAMETER_ARRAY_SIZE, 24);
        assert!(TURN_COUNT_WORD < PARAMETER_WORDS);
        assert!(LARGE_CHUNK_MIN > PARAMETER_ARRAY_SIZE);
    }
}
