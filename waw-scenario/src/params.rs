//! Heuristic recovery of the 12-word scenario parameter array
//!
//! The producing games laid out their scenario records dynamically, so the
//! parameter array (turn count in word 3) has no fixed offset. It is found by
//! scanning large blocks for the first 24 bytes that look like one:
//!
//! - the array starts at an even offset and is preceded by a zero pad byte
//! - words 0, 1 and 2 are each in `[10, 1000)`
//! - word 3 (turn count) is in `[1, 255]`
//!
//! This is a heuristic, not a proof. A per-scenario hint table can short-cut
//! the search, but a hint is verified against the same rules before it is
//! trusted and the search still runs when it fails.

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::chunk::Chunk;
use crate::error::LoadWarning;
use crate::{LARGE_CHUNK_MIN, PARAMETER_ARRAY_SIZE, PARAMETER_WORDS, TURN_COUNT_WORD};

/// Twelve little-endian 16-bit scenario parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ParameterArray {
    pub words: [u16; PARAMETER_WORDS],
}

impl ParameterArray {
    /// Read an array from the first 24 bytes of `bytes`
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        let bytes = bytes.get(..PARAMETER_ARRAY_SIZE)?;
        let mut words = [0u16; PARAMETER_WORDS];
        for (word, pair) in words.iter_mut().zip(bytes.chunks_exact(2)) {
            *word = u16::from_le_bytes([pair[0], pair[1]]);
        }
        Some(Self { words })
    }

    /// Encode as 24 little-endian bytes
    pub fn to_bytes(&self) -> [u8; PARAMETER_ARRAY_SIZE] {
        let mut bytes = [0u8; PARAMETER_ARRAY_SIZE];
        for (pair, word) in bytes.chunks_exact_mut(2).zip(self.words) {
            pair.copy_from_slice(&word.to_le_bytes());
        }
        bytes
    }

    /// Scenario length in turns
    pub fn turn_count(&self) -> u16 {
        self.words[TURN_COUNT_WORD]
    }

    /// Value-range part of the acceptance rules
    pub fn is_plausible(&self) -> bool {
        self.words[..TURN_COUNT_WORD]
            .iter()
            .all(|word| (10..1000).contains(word))
            && (1..=255).contains(&self.turn_count())
    }
}

/// Where a parameter array was found
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ParameterMatch {
    /// Chunk walk index (or block index for section searches)
    pub chunk_index: usize,
    /// Offset of the first word inside the chunk payload
    pub offset: usize,
    /// Decoded words
    pub array: ParameterArray,
}

/// Check every acceptance rule for an array at `offset` of `block`
pub fn accept_at(block: &[u8], offset: usize) -> Option<ParameterArray> {
    if offset == 0 || offset % 2 != 0 {
        return None;
    }
    if block.get(offset - 1) != Some(&0) {
        return None;
    }

    let end = offset.checked_add(PARAMETER_ARRAY_SIZE)?;
    let array = ParameterArray::from_bytes(block.get(offset..end)?)?;
    array.is_plausible().then_some(array)
}

fn scan_block(block: &[u8]) -> Option<(usize, ParameterArray)> {
    if block.len() < LARGE_CHUNK_MIN {
        return None;
    }

    let limit = block.len() - PARAMETER_ARRAY_SIZE;
    (0..limit)
        .step_by(2)
        .find_map(|offset| accept_at(block, offset).map(|array| (offset, array)))
}

/// Search `(index, bytes)` blocks in order and return the first acceptance
///
/// Blocks shorter than [`LARGE_CHUNK_MIN`] are skipped. The search stops at
/// the first hit; later candidates are never examined.
pub fn find_in_blocks<'b, I>(blocks: I) -> Option<ParameterMatch>
where
    I: IntoIterator<Item = (usize, &'b [u8])>,
{
    blocks.into_iter().find_map(|(index, block)| {
        scan_block(block).map(|(offset, array)| ParameterMatch {
            chunk_index: index,
            offset,
            array,
        })
    })
}

/// Search chunk payloads in file order
pub fn find_parameter_array(chunks: &[Chunk<'_>]) -> Option<ParameterMatch> {
    find_in_blocks(chunks.iter().map(|chunk| (chunk.index, chunk.data)))
}

/// Known parameter location for one scenario file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterHint {
    /// Chunk walk index (block index for pointer variants)
    pub chunk: usize,
    /// Offset of the first word inside the block
    pub offset: usize,
}

/// Static scenario-name to parameter-location table
///
/// Names are matched case-insensitively, as scenario files come from
/// case-insensitive DOS file systems.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    from = "HashMap<String, ParameterHint>",
    into = "HashMap<String, ParameterHint>"
)]
pub struct ParameterHints(HashMap<String, ParameterHint>);

impl From<HashMap<String, ParameterHint>> for ParameterHints {
    fn from(map: HashMap<String, ParameterHint>) -> Self {
        let mut hints = Self::new();
        for (scenario, hint) in map {
            hints.insert(&scenario, hint);
        }
        hints
    }
}

impl From<ParameterHints> for HashMap<String, ParameterHint> {
    fn from(hints: ParameterHints) -> Self {
        hints.0
    }
}

impl ParameterHints {
    /// Empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace the hint for `scenario`
    pub fn insert(&mut self, scenario: &str, hint: ParameterHint) {
        self.0.insert(scenario.to_ascii_uppercase(), hint);
    }

    /// Hint for `scenario`
    pub fn get(&self, scenario: &str) -> Option<ParameterHint> {
        self.0.get(&scenario.to_ascii_uppercase()).copied()
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True for an empty table
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Locate the parameter array, trying the hint table before searching
///
/// Returns the match (if any) and the warnings raised on the way: a rejected
/// hint, and [`LoadWarning::ParameterArrayNotFound`] when nothing was found.
pub fn locate_parameter_array(
    blocks: &[(usize, &[u8])],
    scenario: Option<&str>,
    hints: &ParameterHints,
) -> (Option<ParameterMatch>, Vec<LoadWarning>) {
    let mut warnings = Vec::new();

    if let Some((name, hint)) = scenario.and_then(|name| hints.get(name).map(|hint| (name, hint))) {
        let hit = blocks
            .iter()
            .find(|(index, _)| *index == hint.chunk)
            .and_then(|(_, block)| accept_at(block, hint.offset));

        match hit {
            Some(array) => {
                tracing::debug!(scenario = name, chunk = hint.chunk, offset = hint.offset, "parameter hint accepted");
                return (
                    Some(ParameterMatch {
                        chunk_index: hint.chunk,
                        offset: hint.offset,
                        array,
                    }),
                    warnings,
                );
            }
            None => {
                tracing::warn!(scenario = name, chunk = hint.chunk, offset = hint.offset, "parameter hint rejected");
                warnings.push(LoadWarning::ParameterHintRejected {
                    scenario: name.to_string(),
                    chunk: hint.chunk,
                    offset: hint.offset,
                });
            }
        }
    }

    let found = find_in_blocks(blocks.iter().copied());
    match found {
        Some(found) => tracing::debug!(
            chunk = found.chunk_index,
            offset = found.offset,
            turns = found.array.turn_count(),
            "parameter array found"
        ),
        None => {
            tracing::warn!("parameter array not found, turn count unknown");
            warnings.push(LoadWarning::ParameterArrayNotFound);
        }
    }

    (found, warnings)
}
