//! Terrain layer decoding and encoding

use super::{TerrainCell, TerrainEncoding, TerrainGrid};
use crate::error::{CodecError, LoadWarning};
use crate::NIBBLE_MAX;

/// Decode a terrain layer
///
/// `bytes` must be exactly [`TerrainEncoding::byte_len`] long.
pub fn decode_terrain(
    bytes: &[u8],
    width: usize,
    height: usize,
    encoding: TerrainEncoding,
) -> Result<TerrainGrid, CodecError> {
    let expected = encoding.byte_len(width, height);
    if bytes.len() != expected {
        return Err(CodecError::GridSizeMismatch {
            expected,
            actual: bytes.len(),
        });
    }

    let mut grid = TerrainGrid::new(width, height);
    match encoding {
        TerrainEncoding::PackedPairColumnMajor => {
            for (i, byte) in bytes.iter().enumerate() {
                let (x, y) = (i / height, i % height);
                grid.set(x, y, TerrainCell::new(byte & 0x0F, byte >> 4))?;
            }
        }
        TerrainEncoding::PackedNibblePairRowMajor => {
            let cells = width * height;
            let mut idx = 0;
            for byte in bytes {
                for nibble in [byte & 0x0F, byte >> 4] {
                    if idx < cells {
                        grid.set(idx % width, idx / width, TerrainCell::new(nibble, 0))?;
                    }
                    idx += 1;
                }
            }
        }
    }

    Ok(grid)
}

/// Decode a terrain layer, clamping terrain values above `cap`
///
/// Shipped maps contain terrain values past the documented type count. They
/// are clamped in the decoded grid and reported, not rejected; the raw bytes
/// are left alone.
pub fn decode_terrain_clamped(
    bytes: &[u8],
    width: usize,
    height: usize,
    encoding: TerrainEncoding,
    cap: u8,
) -> Result<(TerrainGrid, Vec<LoadWarning>), CodecError> {
    let mut grid = decode_terrain(bytes, width, height, encoding)?;
    let mut warnings = Vec::new();

    for x in 0..width {
        for y in 0..height {
            let cell = grid.get(x, y)?;
            if cell.terrain > cap {
                tracing::warn!(x, y, value = cell.terrain, cap, "terrain value clamped");
                warnings.push(LoadWarning::TerrainValueClamped {
                    x,
                    y,
                    value: cell.terrain,
                    clamped_to: cap,
                });
                grid.set(x, y, TerrainCell::new(cap, cell.variant))?;
            }
        }
    }

    Ok((grid, warnings))
}

/// Encode a grid under `encoding`
///
/// Values that do not fit their nibble fail the whole encode instead of
/// being truncated. An odd cell count in the nibble packing leaves the last
/// high nibble zero.
pub fn encode_terrain(grid: &TerrainGrid, encoding: TerrainEncoding) -> Result<Vec<u8>, CodecError> {
    let (width, height) = (grid.width(), grid.height());
    let mut bytes = vec![0u8; encoding.byte_len(width, height)];

    for x in 0..width {
        for y in 0..height {
            write_cell(&mut bytes, width, height, encoding, x, y, grid.get(x, y)?)?;
        }
    }

    Ok(bytes)
}

/// Pack one cell into an encoded layer in place
///
/// Nothing is written when the cell is rejected.
pub(crate) fn write_cell(
    bytes: &mut [u8],
    width: usize,
    height: usize,
    encoding: TerrainEncoding,
    x: usize,
    y: usize,
    cell: TerrainCell,
) -> Result<(), CodecError> {
    if x >= width || y >= height {
        return Err(CodecError::CellOutOfBounds { x, y, width, height });
    }
    check_cell(encoding, cell)?;

    match encoding {
        TerrainEncoding::PackedPairColumnMajor => {
            let index = x * height + y;
            let byte = bytes.get_mut(index).ok_or(CodecError::GridSizeMismatch {
                expected: encoding.byte_len(width, height),
                actual: index,
            })?;
            *byte = cell.terrain | (cell.variant << 4);
        }
        TerrainEncoding::PackedNibblePairRowMajor => {
            let index = y * width + x;
            let byte = bytes.get_mut(index / 2).ok_or(CodecError::GridSizeMismatch {
                expected: encoding.byte_len(width, height),
                actual: index / 2,
            })?;
            *byte = if index % 2 == 0 {
                (*byte & 0xF0) | cell.terrain
            } else {
                (*byte & 0x0F) | (cell.terrain << 4)
            };
        }
    }

    Ok(())
}

/// Check that `cell` fits the packing of `encoding`
pub(crate) fn check_cell(encoding: TerrainEncoding, cell: TerrainCell) -> Result<(), CodecError> {
    check_nibble("terrain", cell.terrain, NIBBLE_MAX)?;
    let variant_max = if encoding.stores_variant() { NIBBLE_MAX } else { 0 };
    check_nibble("variant", cell.variant, variant_max)
}

fn check_nibble(field: &'static str, value: u8, max: u8) -> Result<(), CodecError> {
    if value > max {
        return Err(CodecError::TerrainValueOutOfRange { field, value, max });
    }
    Ok(())
}
