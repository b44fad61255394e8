use libfontbin::{
    ascii_printable, build_asset, header_size, pack_glyph, packed_len, rasterize_glyph,
    unpack_bits, ConvertError, FontAsset, GlyphSource, InkBounds, PixelRect, RasterPolicy,
    GLYPH_COUNT,
};
use test_case::test_case;

/// Deterministic stand-in for an outline renderer.
///
/// - space has no ink
/// - '|' reports an ink box with zero width
/// - every other glyph gets a box whose width depends on the code point, filled
///   with a diagonal hatch so masks differ from glyph to glyph
struct HatchSource {
    size: i32,
}

impl HatchSource {
    fn bounds(&self, ch: char) -> Option<InkBounds> {
        let code = ch as i32;
        match ch {
            ' ' => None,
            '|' => Some(InkBounds {
                left: 2,
                top: 0,
                right: 2,
                bottom: self.size,
            }),
            _ => Some(InkBounds {
                left: code % 3 - 1,
                top: 1,
                right: code % 3 - 1 + 1 + code % (self.size / 2).max(1),
                bottom: self.size - 1,
            }),
        }
    }
}

impl GlyphSource for HatchSource {
    fn ink_bounds(&mut self, ch: char) -> Result<Option<InkBounds>, ConvertError> {
        Ok(self.bounds(ch))
    }

    fn coverage(&mut self, ch: char, rect: PixelRect) -> Result<Vec<u8>, ConvertError> {
        let bounds = self.bounds(ch);
        let mut out = Vec::with_capacity(rect.width * rect.height);
        for row in 0..rect.height as i32 {
            for col in 0..rect.width as i32 {
                let (x, y) = (rect.x + col, rect.y + row);
                let value = match bounds {
                    Some(b) if x >= b.left && x < b.right && y >= b.top && y < b.bottom => {
                        if (x + y + ch as i32) % 3 == 0 {
                            255
                        } else {
                            0
                        }
                    }
                    _ => 0,
                };
                out.push(value);
            }
        }
        Ok(out)
    }
}

fn build(size: u32) -> FontAsset {
    let mut source = HatchSource { size: size as i32 };
    build_asset(&mut source, size, &RasterPolicy::default()).unwrap()
}

#[test_case(8)]
#[test_case(13)]
#[test_case(24)]
#[test_case(32)]
fn every_glyph_has_width_and_packed_len(size: u32) {
    let asset = build(size);
    assert_eq!(asset.count(), GLYPH_COUNT);
    for ch in ascii_printable() {
        let glyph = asset.glyph(ch).unwrap();
        assert!(glyph.width >= 1, "{ch:?} has zero width");
        assert_eq!(glyph.bytes.len(), packed_len(glyph.width, size as usize));
    }
}

#[test_case(8)]
#[test_case(13)]
#[test_case(24)]
fn unpack_reproduces_masks(size: u32) {
    let mut source = HatchSource { size: size as i32 };
    for ch in ascii_printable() {
        let bitmap = rasterize_glyph(&mut source, ch, size, &RasterPolicy::default()).unwrap();
        let packed = pack_glyph(&bitmap);
        let unpacked = unpack_bits(&packed.bytes, packed.width, size as usize).unwrap();
        assert_eq!(unpacked, bitmap.pixels, "{ch:?} did not survive packing");
    }
}

#[test]
fn offset_table_is_consistent() {
    let asset = build(24);
    let data = asset.to_bytes();
    let offsets: Vec<usize> = (0..GLYPH_COUNT)
        .map(|i| {
            let entry = 8 + i * 4;
            u32::from_le_bytes(data[entry..entry + 4].try_into().unwrap()) as usize
        })
        .collect();

    assert_eq!(offsets[0], header_size(GLYPH_COUNT));
    for i in 0..GLYPH_COUNT - 1 {
        let width = data[offsets[i]] as usize;
        assert_eq!(offsets[i + 1] - offsets[i], 1 + packed_len(width, 24));
    }
    let last = offsets[GLYPH_COUNT - 1];
    assert_eq!(last + 1 + packed_len(data[last] as usize, 24), data.len());
}

#[test]
fn header_for_size_24() {
    let data = build(24).to_bytes();
    assert_eq!(&data[0..4], b"FONT");
    assert_eq!(&data[0..8], &[0x46, 0x4F, 0x4E, 0x54, 0x18, 0x00, 0x5F, 0x00]);
    assert_eq!(&data[8..12], &[0x84, 0x01, 0x00, 0x00]);
}

#[test]
fn space_uses_blank_fallback() {
    let asset = build(24);
    let space = asset.glyph(' ').unwrap();
    assert_eq!(space.width, 24 / 3);
    assert_eq!(space.bytes.len(), packed_len(8, 24));
    assert!(space.bytes.iter().all(|&b| b == 0));

    let data = asset.to_bytes();
    let first = asset.offsets()[0] as usize;
    assert_eq!(data[first], 8);
}

#[test]
fn zero_width_ink_uses_degenerate_fallback() {
    let asset = build(24);
    assert_eq!(asset.glyph('|').unwrap().width, 24 / 4);
}

#[test]
fn conversion_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let first = dir.path().join("first").join("font_24px.bin");
    let second = dir.path().join("second").join("font_24px.bin");

    build(24).write_to_path(&first).unwrap();
    build(24).write_to_path(&second).unwrap();

    let a = std::fs::read(&first).unwrap();
    let b = std::fs::read(&second).unwrap();
    assert_eq!(a, b);

    // rewriting the same path gives the same bytes again
    build(24).write_to_path(&first).unwrap();
    assert_eq!(std::fs::read(&first).unwrap(), a);
}

#[test]
fn written_asset_reads_back() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("font_13px.bin");
    let asset = build(13);
    let written = asset.write_to_path(&path).unwrap();

    assert_eq!(written, std::fs::metadata(&path).unwrap().len());
    let parsed = FontAsset::from_path(&path).unwrap();
    assert_eq!(parsed, asset);
    for ch in ascii_printable() {
        assert_eq!(parsed.glyph_pixels(ch), asset.glyph_pixels(ch));
    }
}

#[test]
fn custom_policy_changes_fallbacks() {
    let policy = RasterPolicy {
        blank_divisor: 2,
        degenerate_divisor: 8,
        min_width: 4,
    };
    let mut source = HatchSource { size: 24 };
    let asset = build_asset(&mut source, 24, &policy).unwrap();
    assert_eq!(asset.glyph(' ').unwrap().width, 12);
    assert_eq!(asset.glyph('|').unwrap().width, 4);
}

#[cfg(feature = "freetype")]
#[test]
fn missing_source_writes_nothing() {
    use libfontbin::{convert_font, ConvertRequest};

    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("assets").join("font.bin");
    let request = ConvertRequest::new(dir.path().join("no-such-font.ttf"), 24, &output);

    match convert_font(&request) {
        Err(ConvertError::SourceNotFound { path }) => assert_eq!(path, request.source),
        other => panic!("expected SourceNotFound, got {other:?}"),
    }
    assert!(!output.exists());
    assert!(!dir.path().join("assets").exists());
}

#[cfg(feature = "freetype")]
mod dejavu {
    use super::*;
    use libfontbin::{convert_font, BitGrid, ConvertRequest, FreeTypeSource};
    use std::path::PathBuf;

    fn fixture() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("tests")
            .join("fontbin")
            .join("DejaVuSans.ttf")
    }

    fn ink_rows(grid: &BitGrid) -> Vec<usize> {
        grid.rows()
            .enumerate()
            .filter(|(_, row)| row.iter().any(|&on| on))
            .map(|(y, _)| y)
            .collect()
    }

    fn column_has_ink(grid: &BitGrid, col: usize) -> bool {
        (0..grid.height()).any(|row| grid.get(col, row) == Some(true))
    }

    #[test]
    fn space_has_no_ink_box() {
        let mut source = FreeTypeSource::open(fixture(), 24).unwrap();
        assert_eq!(source.ink_bounds(' ').unwrap(), None);
        assert!(source.ink_bounds('A').unwrap().is_some());
    }

    #[test]
    fn coverage_follows_the_requested_glyph() {
        let mut source = FreeTypeSource::open(fixture(), 24).unwrap();
        let bounds = source.ink_bounds('A').unwrap().unwrap();
        let rect = PixelRect {
            x: bounds.left,
            y: 0,
            width: bounds.width() as usize,
            height: 24,
        };
        let first = source.coverage('A', rect).unwrap();

        // render something else in between, then ask for 'A' again
        source.ink_bounds('o').unwrap();
        let o = source.coverage('o', rect).unwrap();
        let second = source.coverage('A', rect).unwrap();

        assert_eq!(first.len(), rect.width * rect.height);
        assert_eq!(first, second);
        assert_ne!(first, o);
    }

    #[test]
    fn glyphs_sit_in_the_cell() {
        let mut source = FreeTypeSource::open(fixture(), 24).unwrap();
        let asset = build_asset(&mut source, 24, &RasterPolicy::default()).unwrap();

        let space = asset.glyph_pixels(' ').unwrap();
        assert_eq!(space.width(), 8);
        assert!(!space.has_ink());

        // a period only inks rows near the baseline
        let period = asset.glyph_pixels('.').unwrap();
        let rows = ink_rows(&period);
        assert!(!rows.is_empty());
        assert!(rows.iter().all(|&y| y >= 16), "'.' inked rows {rows:?}");

        // capitals start below the ascender line and span their full ink width
        let a = asset.glyph_pixels('A').unwrap();
        let rows = ink_rows(&a);
        assert!(rows[0] > 0 && rows[0] < 12, "'A' inked rows {rows:?}");
        assert!(column_has_ink(&a, 0));
        assert!(column_has_ink(&a, a.width() - 1));
    }

    #[test]
    fn converting_twice_gives_identical_files() {
        let dir = tempfile::tempdir().unwrap();
        let first = dir.path().join("a").join("font_24px.bin");
        let second = dir.path().join("b").join("font_24px.bin");

        let report = convert_font(&ConvertRequest::new(fixture(), 24, &first)).unwrap();
        convert_font(&ConvertRequest::new(fixture(), 24, &second)).unwrap();

        let a = std::fs::read(&first).unwrap();
        let b = std::fs::read(&second).unwrap();
        assert_eq!(a, b);
        assert_eq!(report.byte_len, a.len() as u64);
        assert_eq!(report.glyph_count, GLYPH_COUNT);
        assert_eq!(&a[0..8], &[0x46, 0x4F, 0x4E, 0x54, 0x18, 0x00, 0x5F, 0x00]);
        assert_eq!(&a[8..12], &388u32.to_le_bytes());
        assert_eq!(FontAsset::from_bytes(&a).unwrap().count(), GLYPH_COUNT);
    }
}
