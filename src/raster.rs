use crate::{BitGrid, ConvertError, GlyphBitmap};

/// Ink bounding box of a glyph in layout space.
///
/// Layout space puts x = 0 at the pen origin and y = 0 on the ascender line,
/// with y growing downwards. `right` and `bottom` are exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InkBounds {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl InkBounds {
    pub fn width(&self) -> i32 {
        self.right - self.left
    }
}

/// A rectangle of layout space to sample coverage from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PixelRect {
    pub x: i32,
    pub y: i32,
    pub width: usize,
    pub height: usize,
}

/// Outline rendering capability used to obtain glyph masks.
pub trait GlyphSource {
    /// Ink bounding box of `ch`, or `None` when the glyph draws nothing.
    fn ink_bounds(&mut self, ch: char) -> Result<Option<InkBounds>, ConvertError>;

    /// Row-major coverage of `ch` over `rect`, `rect.width * rect.height` values.
    /// Positions the glyph does not cover read as zero.
    fn coverage(&mut self, ch: char, rect: PixelRect) -> Result<Vec<u8>, ConvertError>;
}

/// Width policy for glyphs that have no usable ink box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RasterPolicy {
    /// Blank glyphs (no ink at all, e.g. space) get `size / blank_divisor` columns.
    pub blank_divisor: u32,
    /// Glyphs whose ink box has no positive width get `size / degenerate_divisor` columns.
    pub degenerate_divisor: u32,
    /// Lower bound for either fallback. Values below 1 are treated as 1.
    pub min_width: usize,
}

impl Default for RasterPolicy {
    fn default() -> Self {
        Self {
            blank_divisor: 3,
            degenerate_divisor: 4,
            min_width: 1,
        }
    }
}

impl RasterPolicy {
    pub fn blank_width(&self, size: u32) -> usize {
        self.fallback(size, self.blank_divisor)
    }

    pub fn degenerate_width(&self, size: u32) -> usize {
        self.fallback(size, self.degenerate_divisor)
    }

    fn fallback(&self, size: u32, divisor: u32) -> usize {
        let width = size.checked_div(divisor).unwrap_or(0) as usize;
        width.max(self.min_width).max(1)
    }
}

/// Render one code point into a mask `size` pixels tall.
///
/// The leftmost ink column lands on column 0 and row 0 is the ascender line.
/// Glyphs without ink, or with an empty ink box, fall back to the widths in
/// `policy`.
pub fn rasterize_glyph<S: GlyphSource + ?Sized>(
    source: &mut S,
    ch: char,
    size: u32,
    policy: &RasterPolicy,
) -> Result<GlyphBitmap, ConvertError> {
    let height = size as usize;

    let Some(bounds) = source.ink_bounds(ch)? else {
        let width = policy.blank_width(size);
        log::debug!("{ch:?}: no ink, using blank width {width}");
        return Ok(GlyphBitmap {
            ch,
            pixels: BitGrid::new(width, height),
        });
    };

    let width = match usize::try_from(bounds.width()) {
        Ok(width) if width > 0 => width,
        _ => {
            let width = policy.degenerate_width(size);
            log::debug!("{ch:?}: degenerate ink box {bounds:?}, using width {width}");
            width
        }
    };

    if bounds.top < 0 || bounds.bottom > size as i32 {
        log::warn!("{ch:?}: ink box {bounds:?} exceeds the {size}px cell and will be clipped");
    }

    let rect = PixelRect {
        x: bounds.left,
        y: 0,
        width,
        height,
    };
    let coverage = source.coverage(ch, rect)?;
    let pixels = BitGrid::from_coverage(width, height, &coverage).ok_or_else(|| {
        ConvertError::Glyph {
            ch,
            message: format!(
                "coverage has {} values, expected {width}x{height}",
                coverage.len()
            ),
        }
    })?;

    Ok(GlyphBitmap { ch, pixels })
}
