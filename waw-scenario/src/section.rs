//! Named sections tiling a scenario buffer
//!
//! Extraction turns header pointers (or a chunk walk) into an ordered list of
//! [`Section`]s that covers every byte of the file exactly once. Bytes nobody
//! understands still get a section (`Gap`, `Preamble`, `ChunkSkip`,
//! `Trailing`), which is what makes [`reassemble`] an identity on unmodified
//! input.

use core::fmt;
use std::borrow::Cow;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::chunk::ChunkEvent;
use crate::error::{CodecError, LoadWarning, ParseError};
use crate::header::Header;
use crate::CHUNK_PREFIX_SIZE;

/// Logical name of a section
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SectionName {
    /// Fixed 96-byte header
    Header,
    /// Packed terrain layer
    Terrain,
    /// Unexplained bytes between the terrain layer and the first section
    Gap,
    /// Unit roster
    UnitRoster,
    /// Unit positions and mission text
    UnitPositionsAndText,
    /// Numeric and coordinate tables
    NumericData,
    /// AI / specialized data, preserved as an opaque blob
    SpecializedData,
    /// Bytes between the header and the first chunk
    Preamble,
    /// First chunk: small tag/config key-value block
    TagConfig,
    /// Any later chunk, by walk index
    Chunk(usize),
    /// A skipped size word
    ChunkSkip,
    /// Dangling final byte of a chunk stream
    Trailing,
}

impl SectionName {
    /// Section name of the chunk at walk index `index`
    pub fn chunk(index: usize) -> Self {
        if index == 0 { Self::TagConfig } else { Self::Chunk(index) }
    }

    /// Walk index, for chunk sections
    pub fn chunk_index(self) -> Option<usize> {
        match self {
            Self::TagConfig => Some(0),
            Self::Chunk(index) => Some(index),
            _ => None,
        }
    }

    /// True for sections that may hold mission text
    pub fn holds_text(self) -> bool {
        !matches!(
            self,
            Self::Header | Self::Terrain | Self::ChunkSkip | Self::Trailing
        )
    }
}

impl fmt::Display for SectionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Chunk(index) => write!(f, "Chunk{}", index),
            other => write!(f, "{:?}", other),
        }
    }
}

impl FromStr for SectionName {
    type Err = String;

    /// Parse a section name case-insensitively; chunks as `chunk3` or `chunk:3`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        let name = match lower.as_str() {
            "header" => Self::Header,
            "terrain" => Self::Terrain,
            "gap" => Self::Gap,
            "unitroster" | "roster" => Self::UnitRoster,
            "unitpositionsandtext" | "text" => Self::UnitPositionsAndText,
            "numericdata" | "numeric" => Self::NumericData,
            "specializeddata" | "specialized" | "ai" => Self::SpecializedData,
            "preamble" => Self::Preamble,
            "tagconfig" | "tag" => Self::TagConfig,
            "chunkskip" => Self::ChunkSkip,
            "trailing" => Self::Trailing,
            other => {
                let index = other
                    .strip_prefix("chunk")
                    .map(|rest| rest.trim_start_matches(':'))
                    .and_then(|digits| digits.parse::<usize>().ok())
                    .ok_or_else(|| format!("unknown section name: {}", s))?;
                Self::chunk(index)
            }
        };
        Ok(name)
    }
}

/// A named, contiguous byte range of the file
///
/// The bytes are borrowed from the loaded buffer until the section is edited,
/// at which point it owns a private copy of the same length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section<'a> {
    /// Logical name
    pub name: SectionName,
    /// Offset of the first byte in the original file
    pub start: usize,
    data: Cow<'a, [u8]>,
    modified: bool,
}

impl<'a> Section<'a> {
    fn borrowed(name: SectionName, buffer: &'a [u8], start: usize, end: usize) -> Self {
        Self {
            name,
            start,
            data: Cow::Borrowed(&buffer[start..end]),
            modified: false,
        }
    }

    /// Section bytes
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Offset just past the last byte
    pub fn end(&self) -> usize {
        self.start + self.data.len()
    }

    /// Section length in bytes
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// True for a zero-length section
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// True once the section has been written to
    pub fn is_modified(&self) -> bool {
        self.modified
    }

    /// Offset of the payload inside the section (skips a chunk's size prefix)
    pub fn payload_offset(&self) -> usize {
        if self.name.chunk_index().is_some() { CHUNK_PREFIX_SIZE } else { 0 }
    }

    /// Section bytes without a chunk's size prefix
    pub fn payload(&self) -> &[u8] {
        &self.data[self.payload_offset()..]
    }

    /// Mutable access, copying the bytes on first write
    pub fn bytes_mut(&mut self) -> &mut [u8] {
        self.modified = true;
        self.data.to_mut()
    }

    /// Detach from the loaded buffer
    pub fn into_owned(self) -> Section<'static> {
        Section {
            name: self.name,
            start: self.start,
            data: Cow::Owned(self.data.into_owned()),
            modified: self.modified,
        }
    }
}

/// Split a pointer-indexed buffer into sections
///
/// Pointers are sorted into file order rather than assumed to follow the
/// reference order, since it varies between scenarios. Each section ends where
/// the next one starts; the last one ends at the buffer end.
pub fn extract_sections<'a>(buffer: &'a [u8], header: &Header) -> Result<Vec<Section<'a>>, ParseError> {
    let profile = header.profile();
    let body_start = profile.body_start();
    if buffer.len() < body_start {
        return Err(ParseError::Truncated {
            variant: header.variant,
            len: buffer.len(),
            required: body_start,
        });
    }

    let mut sections = vec![Section::borrowed(SectionName::Header, buffer, 0, profile.header_size)];
    if body_start > profile.header_size {
        sections.push(Section::borrowed(
            SectionName::Terrain,
            buffer,
            profile.header_size,
            body_start,
        ));
    }

    let ordered = header.pointers.file_order();
    if let Some(&(_, last)) = ordered.last() {
        if last > buffer.len() {
            return Err(ParseError::Truncated {
                variant: header.variant,
                len: buffer.len(),
                required: last,
            });
        }
    }
    for pair in ordered.windows(2) {
        let (first, first_offset) = pair[0];
        let (second, second_offset) = pair[1];
        if first_offset >= second_offset {
            return Err(ParseError::OverlappingSections {
                variant: header.variant,
                first,
                first_offset,
                second,
                second_offset,
            });
        }
    }

    let first_start = ordered.first().map(|(_, offset)| *offset).unwrap_or(buffer.len());
    if let Some(&(name, offset)) = ordered.first() {
        if offset < body_start {
            return Err(ParseError::OverlappingSections {
                variant: header.variant,
                first: SectionName::Terrain,
                first_offset: profile.header_size,
                second: name,
                second_offset: offset,
            });
        }
    }
    if first_start > body_start {
        sections.push(Section::borrowed(SectionName::Gap, buffer, body_start, first_start));
    }

    for (index, (name, start)) in ordered.iter().enumerate() {
        let end = ordered
            .get(index + 1)
            .map(|(_, next)| *next)
            .unwrap_or(buffer.len());
        sections.push(Section::borrowed(*name, buffer, *start, end));
    }

    tracing::debug!(
        variant = header.variant.name(),
        sections = sections.len(),
        "extracted pointer sections"
    );
    Ok(sections)
}

/// Split a chunked buffer into sections from an already-walked event list
///
/// Skipped size words and a trailing byte become their own sections, and
/// each one is also reported as a warning.
pub fn extract_chunked_sections<'a>(
    buffer: &'a [u8],
    header: &Header,
    start: usize,
    events: &[ChunkEvent<'a>],
) -> Result<(Vec<Section<'a>>, Vec<LoadWarning>), ParseError> {
    let profile = header.profile();
    if buffer.len() < start {
        return Err(ParseError::Truncated {
            variant: header.variant,
            len: buffer.len(),
            required: start,
        });
    }

    let mut sections = vec![Section::borrowed(SectionName::Header, buffer, 0, profile.header_size)];
    if start > profile.header_size {
        sections.push(Section::borrowed(
            SectionName::Preamble,
            buffer,
            profile.header_size,
            start,
        ));
    }

    let walked_end = events
        .iter()
        .map(|event| match *event {
            ChunkEvent::Chunk(chunk) => chunk.end(),
            ChunkEvent::Skipped { offset, .. } => offset + CHUNK_PREFIX_SIZE,
            ChunkEvent::Trailing { offset } => offset + 1,
        })
        .max()
        .unwrap_or(start);
    if walked_end > buffer.len() {
        return Err(ParseError::Truncated {
            variant: header.variant,
            len: buffer.len(),
            required: walked_end,
        });
    }

    let mut warnings = Vec::new();
    for event in events {
        match *event {
            ChunkEvent::Chunk(chunk) => {
                sections.push(Section::borrowed(
                    SectionName::chunk(chunk.index),
                    buffer,
                    chunk.offset,
                    chunk.end(),
                ));
            }
            ChunkEvent::Skipped {
                offset,
                declared_size,
                reason,
            } => {
                tracing::warn!(offset, declared_size, %reason, "chunk desync, size word skipped");
                sections.push(Section::borrowed(
                    SectionName::ChunkSkip,
                    buffer,
                    offset,
                    offset + CHUNK_PREFIX_SIZE,
                ));
                warnings.push(LoadWarning::ChunkDesync {
                    offset,
                    declared_size,
                    reason,
                });
            }
            ChunkEvent::Trailing { offset } => {
                tracing::warn!(offset, "trailing byte after chunk stream");
                sections.push(Section::borrowed(SectionName::Trailing, buffer, offset, offset + 1));
                warnings.push(LoadWarning::TrailingByte { offset });
            }
        }
    }

    tracing::debug!(
        variant = header.variant.name(),
        sections = sections.len(),
        skipped = warnings.len(),
        "extracted chunk sections"
    );
    Ok((sections, warnings))
}

/// Concatenate sections back into a file
///
/// Sections must start at 0 and each must begin where the previous one ends.
pub fn reassemble(sections: &[Section<'_>]) -> Result<Vec<u8>, CodecError> {
    let mut expected = 0;
    for section in sections {
        if section.start != expected {
            return Err(CodecError::SectionGap {
                section: section.name,
                expected,
                actual: section.start,
            });
        }
        expected = section.end();
    }

    Ok(concat(sections))
}

/// Concatenate sections without checking contiguity
pub(crate) fn concat(sections: &[Section<'_>]) -> Vec<u8> {
    let total = sections.iter().map(Section::len).sum();
    let mut bytes = Vec::with_capacity(total);
    for section in sections {
        bytes.extend_from_slice(&section.data);
    }
    bytes
}
