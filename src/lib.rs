//! # LibFontBin: outline fonts to fixed-height 1-bit bitmap assets
//!
//! Converts a vector font into a compact bitmap blob that small targets (embedded
//! displays, boot loaders, kernels) can blit directly without rasterizing outlines.
//!
//! ## Pipeline
//!
//! 1. **Rasterize**: every printable ASCII code point (32..=126) is rendered at the
//!    requested pixel size through a [`GlyphSource`] into a [`GlyphBitmap`].
//! 2. **Pack**: each mask becomes a row-major, MSB-first bit stream ([`pack_glyph`]).
//! 3. **Lay out**: [`FontAsset`] computes the header and absolute offset table, then
//!    writes everything in one sequential pass.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! # #[cfg(feature = "freetype")]
//! # {
//! use libfontbin::{convert_font, ConvertRequest};
//!
//! let report = convert_font(&ConvertRequest::new("Inter-Bold.ttf", 24, "assets/font_24px.bin"))?;
//! println!("{} bytes written to {}", report.byte_len, report.output.display());
//! # }
//! # Ok(())
//! # }
//! ```
//!
//! ## Asset format
//!
//! | Offset | Size | Field |
//! |---|---|---|
//! | 0 | 4 | `FONT` |
//! | 4 | 2 | glyph height (u16 LE) |
//! | 6 | 2 | glyph count (u16 LE) |
//! | 8 | 4 * count | absolute record offsets (u32 LE) |
//! | 8 + 4 * count | ... | records: u8 width + `ceil(width * height / 8)` bytes |

mod asset;
#[cfg(feature = "freetype")]
mod ft_source;
mod models;
pub mod pack;
pub mod raster;
mod utils;

pub use crate::asset::FontAsset;
#[cfg(feature = "freetype")]
pub use crate::ft_source::FreeTypeSource;
pub use crate::models::*;
pub use crate::pack::{pack_glyph, unpack_bits};
pub use crate::raster::{rasterize_glyph, GlyphSource, InkBounds, PixelRect, RasterPolicy};
pub use crate::utils::{header_size, packed_len};

#[cfg(feature = "freetype")]
use std::path::PathBuf;

/// Rasterize and pack the printable ASCII range into an asset `size` pixels tall.
///
/// Touches no files; `source` supplies all glyph shapes.
pub fn build_asset<S: GlyphSource + ?Sized>(
    source: &mut S,
    size: u32,
    policy: &RasterPolicy,
) -> Result<FontAsset, ConvertError> {
    let height = u16::try_from(size)
        .ok()
        .filter(|&height| height > 0)
        .ok_or_else(|| ConvertError::FontLoad {
            reason: format!("invalid pixel size {size}, expected 1..={}", u16::MAX),
        })?;

    let mut glyphs = Vec::with_capacity(GLYPH_COUNT);
    for ch in ascii_printable() {
        glyphs.push(pack_record(rasterize_glyph(source, ch, size, policy)?)?);
    }

    FontAsset::new(height, glyphs)
}

/// Pack a rendered glyph, rejecting widths the one-byte record field cannot hold.
fn pack_record(bitmap: GlyphBitmap) -> Result<PackedGlyph, ConvertError> {
    if bitmap.width() > u8::MAX as usize {
        return Err(ConvertError::Glyph {
            ch: bitmap.ch,
            message: format!("width {} does not fit the record width byte", bitmap.width()),
        });
    }
    log::debug!("{:?}: {}x{}", bitmap.ch, bitmap.width(), bitmap.height());
    Ok(pack_glyph(&bitmap))
}

/// Typed parameters of one conversion run.
#[cfg(feature = "freetype")]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertRequest {
    pub source: PathBuf,
    pub size: u32,
    pub output: PathBuf,
    pub policy: RasterPolicy,
}

#[cfg(feature = "freetype")]
impl ConvertRequest {
    pub fn new(source: impl Into<PathBuf>, size: u32, output: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            size,
            output: output.into(),
            policy: RasterPolicy::default(),
        }
    }
}

/// Outcome of a successful [`convert_font`] run.
#[cfg(feature = "freetype")]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionReport {
    pub output: PathBuf,
    pub byte_len: u64,
    pub height: u16,
    pub glyph_count: usize,
}

/// Convert the outline font at `request.source` and write the asset to `request.output`.
///
/// Nothing is written unless the font loaded and every glyph was rasterized.
#[cfg(feature = "freetype")]
pub fn convert_font(request: &ConvertRequest) -> Result<ConversionReport, ConvertError> {
    if !request.source.exists() {
        return Err(ConvertError::SourceNotFound {
            path: request.source.clone(),
        });
    }

    let mut source = FreeTypeSource::open(&request.source, request.size)?;
    let asset = build_asset(&mut source, request.size, &request.policy)?;
    let byte_len = asset.write_to_path(&request.output)?;

    Ok(ConversionReport {
        output: request.output.clone(),
        byte_len,
        height: asset.height(),
        glyph_count: asset.count(),
    })
}
