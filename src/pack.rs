use crate::utils::packed_len;
use crate::{BitGrid, ConvertError, GlyphBitmap, PackedGlyph};

/// Pack a glyph's pixels into its record bit stream.
///
/// Pixels are taken row by row, eight per byte, first pixel in the most
/// significant bit. Unused bits of the last byte stay zero.
pub fn pack_glyph(glyph: &GlyphBitmap) -> PackedGlyph {
    PackedGlyph {
        width: glyph.width(),
        bytes: pack_bits(&glyph.pixels),
    }
}

pub fn pack_bits(grid: &BitGrid) -> Vec<u8> {
    let mut bytes = vec![0u8; packed_len(grid.width(), grid.height())];
    for (bit, on) in grid.iter().enumerate() {
        if on {
            bytes[bit / 8] |= 0x80 >> (bit % 8);
        }
    }
    bytes
}

/// Inverse of [`pack_bits`]. Padding bits past `width * height` are ignored.
///
/// Errors:
/// - `bytes` shorter than `ceil(width * height / 8)` => Malformed
pub fn unpack_bits(bytes: &[u8], width: usize, height: usize) -> Result<BitGrid, ConvertError> {
    let expected = packed_len(width, height);
    if bytes.len() < expected {
        return Err(ConvertError::malformed(
            bytes.len(),
            format!("bit stream too short: expected {expected} bytes, got {}", bytes.len()),
        ));
    }

    let mut grid = BitGrid::new(width, height);
    for row in 0..height {
        for col in 0..width {
            let bit = row * width + col;
            let mask = 0x80 >> (bit % 8);
            grid.set(col, row, bytes[bit / 8] & mask != 0);
        }
    }
    Ok(grid)
}
