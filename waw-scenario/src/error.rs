//! Error and warning types for scenario decoding and editing

use core::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::chunk::SkipReason;
use crate::section::SectionName;
use crate::variant::FormatVariant;

/// Header field that failed validation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum HeaderField {
    /// Magic number at offset 0
    Magic,
    /// Total file length (header or fixed body start not reachable)
    FileLength,
    /// Count field by index (0-11)
    Count(usize),
    /// Section pointer slot
    Pointer(SectionName),
    /// Decorative constant slot at the given header offset
    Constant(usize),
    /// Map width times map height
    MapDimensions,
}

impl HeaderField {
    fn count_label(index: usize) -> &'static str {
        match index {
            0 => "terrain types",
            1 => "sides",
            2 => "map width",
            3 => "map height",
            _ => "constant",
        }
    }
}

impl fmt::Display for HeaderField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Magic => write!(f, "magic"),
            Self::FileLength => write!(f, "file length"),
            Self::Count(i) => write!(
                f,
                "count[{}] @0x{:02X} ({})",
                i,
                crate::COUNT_TABLE_OFFSET + i * 4,
                Self::count_label(*i)
            ),
            Self::Pointer(name) => write!(f, "pointer {}", name),
            Self::Constant(offset) => write!(f, "constant @0x{:02X}", offset),
            Self::MapDimensions => write!(f, "map dimensions"),
        }
    }
}

/// Fatal errors raised while loading a scenario
///
/// A load that returns one of these never exposes a partially decoded model.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    /// Fewer than two bytes, so no magic number can be read
    #[error("file too small to hold a magic number: {len} bytes")]
    TooSmall { len: usize },

    /// Magic number matches no known variant
    #[error("unknown format: magic 0x{magic:04X} matches no known variant")]
    UnknownFormat { magic: u16 },

    /// Buffer ends before a fixed-size region of the detected variant
    #[error("{variant}: file truncated, {len} bytes but layout needs {required}")]
    Truncated {
        variant: FormatVariant,
        len: usize,
        required: usize,
    },

    /// A header field deviates from the variant's expected value
    #[error("{variant}: header mismatch at {field}: expected {expected}, found {actual}")]
    HeaderMismatch {
        variant: FormatVariant,
        field: HeaderField,
        expected: String,
        actual: String,
    },

    /// Two sections start at the same offset once sorted into file order
    #[error(
        "{variant}: overlapping sections: {first} @0x{first_offset:X} and {second} @0x{second_offset:X}"
    )]
    OverlappingSections {
        variant: FormatVariant,
        first: SectionName,
        first_offset: usize,
        second: SectionName,
        second_offset: usize,
    },

    /// The terrain layer could not be decoded
    #[error("{variant}: terrain layer rejected: {source}")]
    Terrain {
        variant: FormatVariant,
        source: CodecError,
    },
}

/// Errors raised by codec operations on already-decoded data
///
/// Every operation that returns one of these leaves its target bytes untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// Replacement text is longer than the fixed-length run it replaces
    #[error("text run too long: {requested} bytes for a {capacity}-byte run")]
    TextRunTooLong { capacity: usize, requested: usize },

    /// Replacement text contains a byte that is not printable ASCII or a line ending
    #[error("text contains non-printable byte 0x{byte:02X} at position {position}")]
    NonPrintableText { byte: u8, position: usize },

    /// No text run starts at the given offset of the section
    #[error("no text run at offset 0x{offset:X} in {section}")]
    UnknownTextRun { section: SectionName, offset: usize },

    /// Run lies outside the section it is applied to
    #[error("text run 0x{offset:X}+{len} exceeds section length {section_len}")]
    RunOutOfBounds {
        offset: usize,
        len: usize,
        section_len: usize,
    },

    /// Terrain type or variant does not fit its allowed range
    #[error("terrain {field} value {value} out of range (max {max})")]
    TerrainValueOutOfRange {
        field: &'static str,
        value: u8,
        max: u8,
    },

    /// Cell coordinate outside the map
    #[error("cell ({x}, {y}) outside {width}x{height} map")]
    CellOutOfBounds {
        x: usize,
        y: usize,
        width: usize,
        height: usize,
    },

    /// Byte buffer length does not match the grid dimensions
    #[error("terrain data is {actual} bytes, expected {expected}")]
    GridSizeMismatch { expected: usize, actual: usize },

    /// The variant carries no decodable terrain layer
    #[error("{0} has no decodable terrain layer")]
    NoTerrainLayer(FormatVariant),

    /// The named section is not present in this scenario
    #[error("section {0} not present")]
    MissingSection(SectionName),

    /// The section is derived from decoded state and cannot be replaced
    #[error("section {0} cannot be replaced")]
    ReadOnlySection(SectionName),

    /// Section replacement would change the section length
    #[error("section {section} is {expected} bytes, replacement is {actual}")]
    SectionLengthMismatch {
        section: SectionName,
        expected: usize,
        actual: usize,
    },

    /// Sections do not tile a contiguous byte range
    #[error("section {section} starts at 0x{actual:X}, expected 0x{expected:X}")]
    SectionGap {
        section: SectionName,
        expected: usize,
        actual: usize,
    },

    /// No parameter array was located during load
    #[error("parameter array not located in this scenario")]
    ParameterArrayUnavailable,

    /// Parameter word index past the end of the array
    #[error("parameter word index {0} out of range (max {max})", max = crate::PARAMETER_WORDS - 1)]
    ParameterIndexOutOfRange(usize),

    /// Writing the value would make the parameter array unrecognizable
    #[error("parameter word {index} cannot be set to {value}")]
    ParameterOutOfRange { index: usize, value: u16 },
}

/// Non-fatal findings collected while loading a scenario
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum LoadWarning {
    /// The chunk walker skipped an implausible size word
    ChunkDesync {
        offset: usize,
        declared_size: u16,
        reason: SkipReason,
    },
    /// A single dangling byte follows the last chunk
    TrailingByte { offset: usize },
    /// A terrain value above the variant's cap was clamped in the decoded grid
    TerrainValueClamped {
        x: usize,
        y: usize,
        value: u8,
        clamped_to: u8,
    },
    /// No plausible parameter array was found; the turn count is unknown
    ParameterArrayNotFound,
    /// The hint table entry for this scenario did not point at a plausible array
    ParameterHintRejected {
        scenario: String,
        chunk: usize,
        offset: usize,
    },
}

impl fmt::Display for LoadWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ChunkDesync {
                offset,
                declared_size,
                reason,
            } => write!(
                f,
                "chunk desync at 0x{:X}: size {} skipped ({})",
                offset, declared_size, reason
            ),
            Self::TrailingByte { offset } => write!(f, "trailing byte at 0x{:X}", offset),
            Self::TerrainValueClamped {
                x,
                y,
                value,
                clamped_to,
            } => write!(
                f,
                "terrain value {} at ({}, {}) clamped to {}",
                value, x, y, clamped_to
            ),
            Self::ParameterArrayNotFound => write!(f, "parameter array not found"),
            Self::ParameterHintRejected {
                scenario,
                chunk,
                offset,
            } => write!(
                f,
                "hint for {} (chunk {}, offset 0x{:X}) rejected, searched instead",
                scenario, chunk, offset
            ),
        }
    }
}
