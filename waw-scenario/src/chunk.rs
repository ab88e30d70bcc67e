//! Size-prefixed chunk stream of the chunked-body variant
//!
//! Each chunk is a little-endian u16 size followed by that many bytes. Stray
//! bytes between chunks are common in shipped files, so the walker never
//! trusts an implausible size: a zero size, a size above the ceiling, or a
//! size running past the end of the buffer advances the cursor by two bytes
//! and is reported as a [`ChunkEvent::Skipped`].
//!
//! This keeps the walk finite and usually resynchronizes it, but it cannot
//! guarantee that a corrupt stream is split at the producer's boundaries.

use core::fmt;

use serde::Serialize;

use crate::header::read_u16_le;
use crate::{CHUNK_PREFIX_SIZE, CHUNK_SIZE_CEILING};

/// One chunk of the body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chunk<'a> {
    /// Position among yielded chunks (skips are not counted)
    pub index: usize,
    /// Offset of the size prefix in the buffer
    pub offset: usize,
    /// Size declared by the prefix
    pub declared_size: u16,
    /// Chunk payload (without the prefix)
    pub data: &'a [u8],
}

impl Chunk<'_> {
    /// Offset just past the chunk
    pub fn end(&self) -> usize {
        self.offset + CHUNK_PREFIX_SIZE + self.data.len()
    }
}

/// Why a size word was skipped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SkipReason {
    /// Declared size is zero
    ZeroSize,
    /// Declared size exceeds the sanity ceiling
    AboveCeiling,
    /// Declared size runs past the end of the buffer
    Truncated,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroSize => write!(f, "zero size"),
            Self::AboveCeiling => write!(f, "above ceiling"),
            Self::Truncated => write!(f, "runs past end of file"),
        }
    }
}

/// Item produced by [`ChunkWalker`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkEvent<'a> {
    /// A plausible chunk
    Chunk(Chunk<'a>),
    /// A size word that was stepped over
    Skipped {
        offset: usize,
        declared_size: u16,
        reason: SkipReason,
    },
    /// A single byte left after the last size word
    Trailing { offset: usize },
}

/// Lazy, restartable walk over a chunk stream
#[derive(Debug, Clone)]
pub struct ChunkWalker<'a> {
    buffer: &'a [u8],
    start: usize,
    pos: usize,
    next_index: usize,
    ceiling: u16,
}

impl<'a> ChunkWalker<'a> {
    /// Walk `buffer` from `start` with the default size ceiling
    pub fn new(buffer: &'a [u8], start: usize) -> Self {
        Self {
            buffer,
            start,
            pos: start,
            next_index: 0,
            ceiling: CHUNK_SIZE_CEILING,
        }
    }

    /// Use a different size ceiling
    pub fn with_ceiling(mut self, ceiling: u16) -> Self {
        self.ceiling = ceiling;
        self
    }

    /// Rewind to the start offset
    pub fn restart(&mut self) {
        self.pos = self.start;
        self.next_index = 0;
    }

    /// Current cursor position
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Collect only the plausible chunks, dropping skip events
    pub fn chunks(self) -> Vec<Chunk<'a>> {
        self.filter_map(|event| match event {
            ChunkEvent::Chunk(chunk) => Some(chunk),
            _ => None,
        })
        .collect()
    }

    fn skip(&mut self, declared_size: u16, reason: SkipReason) -> ChunkEvent<'a> {
        let offset = self.pos;
        self.pos += CHUNK_PREFIX_SIZE;
        ChunkEvent::Skipped {
            offset,
            declared_size,
            reason,
        }
    }
}

impl<'a> Iterator for ChunkWalker<'a> {
    type Item = ChunkEvent<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.pos >= self.buffer.len() {
            return None;
        }

        let Some(size) = read_u16_le(self.buffer, self.pos) else {
            let offset = self.pos;
            self.pos = self.buffer.len();
            return Some(ChunkEvent::Trailing { offset });
        };

        if size == 0 {
            return Some(self.skip(size, SkipReason::ZeroSize));
        }
        if size > self.ceiling {
            return Some(self.skip(size, SkipReason::AboveCeiling));
        }

        let data_start = self.pos + CHUNK_PREFIX_SIZE;
        let data_end = data_start + size as usize;
        let Some(data) = self.buffer.get(data_start..data_end) else {
            return Some(self.skip(size, SkipReason::Truncated));
        };

        let chunk = Chunk {
            index: self.next_index,
            offset: self.pos,
            declared_size: size,
            data,
        };
        self.next_index += 1;
        self.pos = data_end;
        Some(ChunkEvent::Chunk(chunk))
    }
}
