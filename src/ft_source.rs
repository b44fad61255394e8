use std::path::Path;

use freetype::bitmap::PixelMode;
use freetype::face::LoadFlag;
use freetype::{Face, Library};

use crate::raster::{GlyphSource, InkBounds, PixelRect};
use crate::ConvertError;

/// Converts a 26.6 fixed-point value to whole pixels.
fn convert_metric(value: i64) -> i32 {
    (value >> 6) as i32
}

/// One glyph rendered by FreeType, as coverage values in layout space.
struct RenderedGlyph {
    ch: char,
    left: i32,
    top: i32,
    width: usize,
    rows: usize,
    coverage: Vec<u8>,
}

impl RenderedGlyph {
    fn value_at(&self, x: i32, y: i32) -> u8 {
        let (col, row) = (x - self.left, y - self.top);
        if col < 0 || row < 0 || col as usize >= self.width || row as usize >= self.rows {
            return 0;
        }
        self.coverage[row as usize * self.width + col as usize]
    }

    fn bounds(&self) -> Option<InkBounds> {
        if !self.coverage.iter().any(|&value| value > 0) {
            return None;
        }
        Some(InkBounds {
            left: self.left,
            top: self.top,
            right: self.left + self.width as i32,
            bottom: self.top + self.rows as i32,
        })
    }
}

/// Expand a FreeType bitmap buffer into one coverage value per pixel, top row first.
///
/// Mono buffers hold 8 pixels per byte, MSB first. A negative `pitch` means the
/// rows are stored bottom-up.
fn decode_rows(buffer: &[u8], width: usize, rows: usize, pitch: i32, mono: bool) -> Vec<u8> {
    let stride = pitch.unsigned_abs() as usize;
    let mut coverage = Vec::with_capacity(width * rows);
    for y in 0..rows {
        let row = if pitch < 0 { rows - 1 - y } else { y };
        let start = row * stride;
        for x in 0..width {
            let value = if mono {
                let byte = buffer.get(start + x / 8).copied().unwrap_or(0);
                ((byte >> (7 - (x % 8))) & 1) * 0xFF
            } else {
                buffer.get(start + x).copied().unwrap_or(0)
            };
            coverage.push(value);
        }
    }
    coverage
}

/// [`GlyphSource`] backed by a FreeType face rendered in monochrome.
pub struct FreeTypeSource {
    // declared before `_library` so the face is released first
    face: Face,
    _library: Library,
    ascender: i32,
    last: Option<RenderedGlyph>,
}

impl FreeTypeSource {
    /// Open the font at `path` and size it to `size` pixels.
    pub fn open<P: AsRef<Path>>(path: P, size: u32) -> Result<Self, ConvertError> {
        let path = path.as_ref();
        let load_error = |err: freetype::Error| ConvertError::FontLoad {
            reason: format!("{}: {err}", path.display()),
        };

        let library = Library::init().map_err(load_error)?;
        let face = library.new_face(path, 0).map_err(load_error)?;
        face.set_pixel_sizes(0, size).map_err(load_error)?;

        let ascender = face
            .size_metrics()
            .map(|metrics| convert_metric(metrics.ascender as i64))
            .unwrap_or(size as i32);

        log::debug!(
            "Loaded {} ({}), ascender {ascender}px at {size}px",
            path.display(),
            face.family_name().unwrap_or_else(|| "unnamed family".to_string())
        );

        Ok(Self {
            face,
            _library: library,
            ascender,
            last: None,
        })
    }

    fn render(&mut self, ch: char) -> Result<&RenderedGlyph, ConvertError> {
        if self.last.as_ref().map(|glyph| glyph.ch) != Some(ch) {
            let glyph = self.load(ch)?;
            self.last = Some(glyph);
        }
        self.last.as_ref().ok_or_else(|| ConvertError::Glyph {
            ch,
            message: "render cache empty".to_string(),
        })
    }

    fn load(&self, ch: char) -> Result<RenderedGlyph, ConvertError> {
        self.face
            .load_char(ch as usize, LoadFlag::RENDER | LoadFlag::TARGET_MONO)
            .map_err(|err| ConvertError::Glyph {
                ch,
                message: err.to_string(),
            })?;

        let slot = self.face.glyph();
        let bitmap = slot.bitmap();
        let width = bitmap.width().max(0) as usize;
        let rows = bitmap.rows().max(0) as usize;
        let mono = matches!(bitmap.pixel_mode(), Ok(PixelMode::Mono));
        let coverage = decode_rows(bitmap.buffer(), width, rows, bitmap.pitch(), mono);

        Ok(RenderedGlyph {
            ch,
            left: slot.bitmap_left(),
            top: self.ascender - slot.bitmap_top(),
            width,
            rows,
            coverage,
        })
    }
}

impl GlyphSource for FreeTypeSource {
    fn ink_bounds(&mut self, ch: char) -> Result<Option<InkBounds>, ConvertError> {
        Ok(self.render(ch)?.bounds())
    }

    fn coverage(&mut self, ch: char, rect: PixelRect) -> Result<Vec<u8>, ConvertError> {
        let glyph = self.render(ch)?;
        let mut out = Vec::with_capacity(rect.width * rect.height);
        for row in 0..rect.height as i32 {
            for col in 0..rect.width as i32 {
                out.push(glyph.value_at(rect.x + col, rect.y + row));
            }
        }
        Ok(out)
    }
}
