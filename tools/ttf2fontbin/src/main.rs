use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use libfontbin::{ascii_printable, convert_font, ConvertRequest, FontAsset, RasterPolicy};
use log::LevelFilter;
use simple_logger::SimpleLogger;

#[derive(Debug, Parser)]
#[clap(
    name = "ttf2fontbin",
    version,
    about = "Convert an outline font into a fixed-height 1-bit FONT asset",
    after_help = "Example: ttf2fontbin Inter_24pt-Bold.ttf 24 assets/font_24px.bin"
)]
struct Cli {
    /// Outline font to convert (TTF, OTF, ...)
    source: PathBuf,

    /// Glyph height in pixels
    size: u32,

    /// Destination of the asset; missing directories are created
    output: PathBuf,

    /// Width of ink-less glyphs (such as space) is size / BLANK_DIVISOR
    #[clap(long, default_value_t = 3)]
    blank_divisor: u32,

    /// Width of glyphs with an empty ink box is size / DEGENERATE_DIVISOR
    #[clap(long, default_value_t = 4)]
    degenerate_divisor: u32,

    /// Lower bound for both fallback widths
    #[clap(long, default_value_t = 1)]
    min_width: usize,

    /// Print every glyph of the written asset as ASCII art
    #[clap(long)]
    preview: bool,

    /// Enable debug logging
    #[clap(short, long)]
    verbose: bool,
}

fn print_preview(cli: &Cli) -> anyhow::Result<()> {
    let asset = FontAsset::from_path(&cli.output)
        .with_context(|| format!("reading back {}", cli.output.display()))?;

    for ch in ascii_printable() {
        if let Some(pixels) = asset.glyph_pixels(ch) {
            println!("{ch:?} ({}x{})", pixels.width(), pixels.height());
            print!("{pixels}");
        }
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    // a logger may already be installed, that's fine too
    let _ = SimpleLogger::new().with_level(level).init();

    println!(
        "Converting {} (size {}) -> {}...",
        cli.source.display(),
        cli.size,
        cli.output.display()
    );

    let request = ConvertRequest {
        source: cli.source.clone(),
        size: cli.size,
        output: cli.output.clone(),
        policy: RasterPolicy {
            blank_divisor: cli.blank_divisor,
            degenerate_divisor: cli.degenerate_divisor,
            min_width: cli.min_width,
        },
    };

    let report = convert_font(&request)
        .with_context(|| format!("converting {}", cli.source.display()))?;

    println!(
        "Done. Asset written to {} ({} bytes, {} glyphs at {}px).",
        report.output.display(),
        report.byte_len,
        report.glyph_count,
        report.height
    );

    if cli.preview {
        print_preview(&cli)?;
    }

    Ok(())
}
