use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::pack::unpack_bits;
use crate::utils::{ensure_parent_dir, header_size, packed_len};
use crate::{BitGrid, ConvertError, PackedGlyph, FIRST_CHAR, MAGIC};

/// A complete fixed-height bitmap font asset.
///
/// Layout (little-endian):
/// - `FONT` magic, u16 height, u16 glyph count
/// - one u32 absolute file offset per glyph
/// - glyph records back to back: u8 width, then `ceil(width * height / 8)` bytes
///   of row-major MSB-first pixels
///
/// Glyph `i` is code point `FIRST_CHAR + i`. The offset table is computed when
/// the asset is built, so writing is a single sequential pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontAsset {
    height: u16,
    glyphs: Vec<PackedGlyph>,
    offsets: Vec<u32>,
}

impl FontAsset {
    /// Lay out `glyphs` behind the header.
    ///
    /// Errors (`Layout`):
    /// - more than `u16::MAX` glyphs
    /// - a glyph width of 0 or above 255
    /// - a bit stream whose length does not match its width and `height`
    /// - a file larger than `u32` offsets can address
    pub fn new(height: u16, glyphs: Vec<PackedGlyph>) -> Result<Self, ConvertError> {
        if u16::try_from(glyphs.len()).is_err() {
            return Err(ConvertError::Layout(format!(
                "{} glyphs do not fit the u16 count field",
                glyphs.len()
            )));
        }

        let header_size = header_size(glyphs.len());
        let mut offsets = Vec::with_capacity(glyphs.len());
        let mut cursor = 0usize;
        for (i, glyph) in glyphs.iter().enumerate() {
            if glyph.width == 0 || glyph.width > u8::MAX as usize {
                return Err(ConvertError::Layout(format!(
                    "glyph {i} has width {}, record widths must be 1..=255",
                    glyph.width
                )));
            }
            let expected = packed_len(glyph.width, height as usize);
            if glyph.bytes.len() != expected {
                return Err(ConvertError::Layout(format!(
                    "glyph {i} has {} packed bytes, expected {expected}",
                    glyph.bytes.len()
                )));
            }

            let offset = u32::try_from(header_size + cursor).map_err(|_| {
                ConvertError::Layout(format!("glyph {i} starts beyond the 4 GiB offset range"))
            })?;
            offsets.push(offset);
            cursor += glyph.record_len();
        }

        if u32::try_from(header_size + cursor).is_err() {
            return Err(ConvertError::Layout(
                "asset exceeds the 4 GiB offset range".to_string(),
            ));
        }

        Ok(Self {
            height,
            glyphs,
            offsets,
        })
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    pub fn count(&self) -> usize {
        self.glyphs.len()
    }

    pub fn glyphs(&self) -> &[PackedGlyph] {
        &self.glyphs
    }

    /// Absolute file offset of each glyph record.
    pub fn offsets(&self) -> &[u32] {
        &self.offsets
    }

    pub fn header_size(&self) -> usize {
        header_size(self.count())
    }

    /// Total size of the serialized asset in bytes.
    pub fn byte_len(&self) -> usize {
        self.header_size() + self.glyphs.iter().map(PackedGlyph::record_len).sum::<usize>()
    }

    /// Record for `ch`, if the asset covers it.
    pub fn glyph(&self, ch: char) -> Option<&PackedGlyph> {
        let index = (ch as u32).checked_sub(FIRST_CHAR as u32)?;
        self.glyphs.get(index as usize)
    }

    /// Unpacked pixels of `ch`.
    pub fn glyph_pixels(&self, ch: char) -> Option<BitGrid> {
        let glyph = self.glyph(ch)?;
        unpack_bits(&glyph.bytes, glyph.width, self.height as usize).ok()
    }

    /// Serialize the asset: header, offset table, then the glyph records.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut data = Vec::with_capacity(self.byte_len());
        data.extend_from_slice(MAGIC);
        data.extend_from_slice(&self.height.to_le_bytes());
        data.extend_from_slice(&(self.count() as u16).to_le_bytes());

        for offset in &self.offsets {
            data.extend_from_slice(&offset.to_le_bytes());
        }

        for glyph in &self.glyphs {
            data.push(glyph.width as u8);
            data.extend_from_slice(&glyph.bytes);
        }
        data
    }

    pub fn write_to<W: Write>(&self, mut writer: W) -> std::io::Result<()> {
        writer.write_all(&self.to_bytes())
    }

    /// Write the asset to `path`, replacing any existing file.
    ///
    /// The parent directory is created when missing. Returns the number of
    /// bytes written. A failed write leaves the destination in an undefined
    /// state.
    pub fn write_to_path<P: AsRef<Path>>(&self, path: P) -> Result<u64, ConvertError> {
        let path = path.as_ref();
        ensure_parent_dir(path)?;

        let file = File::create(path).map_err(|err| ConvertError::io(path, err))?;
        let mut writer = BufWriter::new(file);
        self.write_to(&mut writer)
            .and_then(|_| writer.flush())
            .map_err(|err| ConvertError::io(path, err))?;

        let written = self.byte_len() as u64;
        log::info!("Wrote {} ({written} bytes)", path.display());
        Ok(written)
    }

    /// Parse and validate a serialized asset.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ConvertError> {
        if bytes.len() < 8 {
            return Err(ConvertError::malformed(bytes.len(), "truncated header"));
        }
        if &bytes[0..4] != MAGIC {
            return Err(ConvertError::malformed(0, "not a FONT asset (magic mismatch)"));
        }
        let height = u16::from_le_bytes([bytes[4], bytes[5]]);
        let count = u16::from_le_bytes([bytes[6], bytes[7]]) as usize;
        if height == 0 {
            return Err(ConvertError::malformed(4, "zero glyph height"));
        }

        let header_size = header_size(count);
        if bytes.len() < header_size {
            return Err(ConvertError::malformed(bytes.len(), "truncated offset table"));
        }

        let mut glyphs = Vec::with_capacity(count);
        let mut pos = header_size;
        for i in 0..count {
            let entry = 8 + i * 4;
            let offset = u32::from_le_bytes([
                bytes[entry],
                bytes[entry + 1],
                bytes[entry + 2],
                bytes[entry + 3],
            ]) as usize;
            if offset != pos {
                return Err(ConvertError::malformed(
                    entry,
                    format!("offset of glyph {i} is {offset}, expected {pos}"),
                ));
            }

            let width = *bytes
                .get(pos)
                .ok_or_else(|| ConvertError::malformed(pos, format!("glyph {i} record missing")))?
                as usize;
            if width == 0 {
                return Err(ConvertError::malformed(pos, format!("glyph {i} has zero width")));
            }
            let len = packed_len(width, height as usize);
            let data = bytes.get(pos + 1..pos + 1 + len).ok_or_else(|| {
                ConvertError::malformed(pos + 1, format!("glyph {i} bit stream truncated"))
            })?;

            glyphs.push(PackedGlyph {
                width,
                bytes: data.to_vec(),
            });
            pos += 1 + len;
        }

        if pos != bytes.len() {
            return Err(ConvertError::malformed(
                pos,
                format!("{} trailing bytes after last record", bytes.len() - pos),
            ));
        }

        Self::new(height, glyphs)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, ConvertError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|err| ConvertError::io(path, err))?;
        Self::from_bytes(&bytes)
    }
}
