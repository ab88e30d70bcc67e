//! Packed hex-grid terrain layer
//!
//! Two packings exist in the wild and are exposed as named strategies:
//!
//! - [`TerrainEncoding::PackedPairColumnMajor`] - one byte per cell,
//!   `terrain | variant << 4`, filled one full column at a time
//!   (`index = x * height + y`)
//! - [`TerrainEncoding::PackedNibblePairRowMajor`] - two terrain-only cells per
//!   byte (low nibble first), filled one row at a time (`index = y * width + x`)
//!
//! Decoding under the wrong strategy does not fail, it silently scrambles the
//! map, so callers always pick the strategy from the variant profile.

mod codec;


pub use codec::{decode_terrain, decode_terrain_clamped, encode_terrain};

pub(crate) use codec::{check_cell, write_cell};

use serde::Serialize;

use crate::error::CodecError;

/// Packing strategy of a terrain layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TerrainEncoding {
    /// One byte per cell, low nibble terrain, high nibble variant, column-major
    PackedPairColumnMajor,
    /// Two terrain-only nibbles per byte, row-major
    PackedNibblePairRowMajor,
}

impl TerrainEncoding {
    /// Bytes needed for a `width x height` grid
    pub const fn byte_len(self, width: usize, height: usize) -> usize {
        match self {
            Self::PackedPairColumnMajor => width * height,
            Self::PackedNibblePairRowMajor => (width * height).div_ceil(2),
        }
    }

    /// True when the packing has room for variant bits
    pub const fn stores_variant(self) -> bool {
        matches!(self, Self::PackedPairColumnMajor)
    }
}

/// One map cell
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TerrainCell {
    /// Terrain type index
    pub terrain: u8,
    /// Graphic variant of the terrain type
    pub variant: u8,
}

impl TerrainCell {
    pub const fn new(terrain: u8, variant: u8) -> Self {
        Self { terrain, variant }
    }
}

/// Fixed `width x height` grid of terrain cells
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TerrainGrid {
    width: usize,
    height: usize,
    // column-major, like the primary on-disk packing
    cells: Vec<TerrainCell>,
}

impl TerrainGrid {
    /// Grid filled with default cells
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![TerrainCell::default(); width * height],
        }
    }

    /// Width in cells
    pub fn width(&self) -> usize {
        self.width
    }

    /// Height in cells
    pub fn height(&self) -> usize {
        self.height
    }

    fn index(&self, x: usize, y: usize) -> Result<usize, CodecError> {
        if x >= self.width || y >= self.height {
            return Err(CodecError::CellOutOfBounds {
                x,
                y,
                width: self.width,
                height: self.height,
            });
        }
        Ok(x * self.height + y)
    }

    /// Cell at `(x, y)`
    pub fn get(&self, x: usize, y: usize) -> Result<TerrainCell, CodecError> {
        let index = self.index(x, y)?;
        Ok(self.cells[index])
    }

    /// Overwrite the cell at `(x, y)`
    pub fn set(&mut self, x: usize, y: usize, cell: TerrainCell) -> Result<(), CodecError> {
        let index = self.index(x, y)?;
        self.cells[index] = cell;
        Ok(())
    }

    /// Cells of row `y`, left to right
    pub fn row(&self, y: usize) -> impl Iterator<Item = TerrainCell> + '_ {
        (0..self.width).filter_map(move |x| self.get(x, y).ok())
    }
}
