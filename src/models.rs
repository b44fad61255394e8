use std::path::PathBuf;

/// Magic tag at the start of every asset.
pub const MAGIC: &[u8; 4] = b"FONT";
/// First code point stored in an asset (space).
pub const FIRST_CHAR: char = ' ';
/// Last code point stored in an asset (tilde).
pub const LAST_CHAR: char = '~';
/// Number of glyph records in an asset covering printable ASCII.
pub const GLYPH_COUNT: usize = (LAST_CHAR as usize) - (FIRST_CHAR as usize) + 1;

/// Iterates the printable ASCII charset in ascending code point order.
pub fn ascii_printable() -> impl Iterator<Item = char> {
    FIRST_CHAR..=LAST_CHAR
}

/// Fixed-size monochrome pixel grid, stored row-major.
///
/// Dimensions are fixed when the grid is created and the backing storage always
/// holds exactly `width * height` cells.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BitGrid {
    width: usize,
    height: usize,
    bits: Vec<bool>,
}

impl BitGrid {
    /// An all-background grid.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            bits: vec![false; width * height],
        }
    }

    /// Builds a grid from row-major coverage values; any nonzero value is ink.
    ///
    /// Returns `None` when `coverage` does not hold exactly `width * height` values.
    pub fn from_coverage(width: usize, height: usize, coverage: &[u8]) -> Option<Self> {
        if coverage.len() != width.checked_mul(height)? {
            return None;
        }
        Some(Self {
            width,
            height,
            bits: coverage.iter().map(|&value| value > 0).collect(),
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn get(&self, col: usize, row: usize) -> Option<bool> {
        self.index(col, row).map(|i| self.bits[i])
    }

    /// Sets a pixel. Returns `false` if the position lies outside the grid.
    pub fn set(&mut self, col: usize, row: usize, on: bool) -> bool {
        match self.index(col, row) {
            Some(i) => {
                self.bits[i] = on;
                true
            }
            None => false,
        }
    }

    /// Row slices from top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[bool]> {
        // chunks_exact panics on a zero chunk size
        self.bits.chunks_exact(self.width.max(1))
    }

    /// All pixels in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = bool> + '_ {
        self.bits.iter().copied()
    }

    pub fn has_ink(&self) -> bool {
        self.bits.iter().any(|&on| on)
    }

    fn index(&self, col: usize, row: usize) -> Option<usize> {
        (col < self.width && row < self.height).then(|| row * self.width + col)
    }
}

impl std::fmt::Display for BitGrid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.bits.is_empty() {
            return writeln!(f, "(empty bitmap)");
        }

        for row in self.rows() {
            for &pixel in row {
                write!(f, "{}", if pixel { "*" } else { "." })?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Monochrome rendering of a single code point at the asset height.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlyphBitmap {
    pub ch: char,
    pub pixels: BitGrid,
}

impl GlyphBitmap {
    pub fn width(&self) -> usize {
        self.pixels.width()
    }

    pub fn height(&self) -> usize {
        self.pixels.height()
    }
}

/// A glyph serialized to a row-major, MSB-first bit stream.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PackedGlyph {
    pub width: usize,
    pub bytes: Vec<u8>,
}

impl PackedGlyph {
    /// Size of this glyph's record in an asset: width byte plus bit stream.
    pub fn record_len(&self) -> usize {
        1 + self.bytes.len()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    #[error("source font not found: {}", path.display())]
    SourceNotFound { path: PathBuf },

    #[error("failed to load font: {reason}")]
    FontLoad { reason: String },

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("glyph {ch:?}: {message}")]
    Glyph { ch: char, message: String },

    #[error("invalid asset layout: {0}")]
    Layout(String),

    #[error("malformed asset at byte {offset}: {message}")]
    Malformed { offset: usize, message: String },
}

impl ConvertError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConvertError::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn malformed(offset: usize, message: impl Into<String>) -> Self {
        ConvertError::Malformed {
            offset,
            message: message.into(),
        }
    }
}
