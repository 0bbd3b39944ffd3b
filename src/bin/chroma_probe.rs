// Decode the first frame of a media file, report its key color and write the
// masked result as PNG

use std::path::PathBuf;

use clap::Parser;
use tracing::info;

use chroma_overlay::{
    chroma::{ChromaKeyEngine, KeyColor, Tolerance},
    video::{read_looping, DefaultMediaOpener, FrameSource, MediaOpener},
};

#[derive(Parser)]
#[command(name = "chroma-probe", version, about = "Preview chroma keying on the first frame of a file")]
struct Cli {
    /// Video, GIF or image to probe
    input: PathBuf,

    /// Where to write the masked frame
    #[arg(short, long, default_value = "probe.png")]
    output: PathBuf,

    /// Key color as R,G,B or #RRGGBB; auto-detected when omitted
    #[arg(short, long)]
    key_color: Option<KeyColor>,

    /// Color tolerance (0-255)
    #[arg(short, long, default_value_t = Tolerance::DEFAULT.value())]
    tolerance: u8,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let cli = Cli::parse();
    println!("🔍 Probing {:?}", cli.input);

    let mut source = DefaultMediaOpener::new().open(&cli.input)?;
    let (width, height) = source.dimensions();
    println!("   Native size: {}x{}", width, height);

    let frame = read_looping(source.as_mut())?
        .ok_or_else(|| anyhow::anyhow!("{:?} produced no frames", cli.input))?;
    source.close();

    let engine = ChromaKeyEngine::new();
    let detected = engine.auto_detect(&frame);
    match detected {
        Some(key) => println!("   Auto-detected key color: {}", key),
        None => println!("   ❌ Frame too small to auto-detect a key color"),
    }

    let key = cli.key_color.or(detected).unwrap_or_default();
    let tolerance = Tolerance(cli.tolerance);
    let masked = engine.apply_mask(&frame, key, tolerance);

    let keyed = (0..height)
        .flat_map(|y| (0..width).map(move |x| (x, y)))
        .filter(|&(x, y)| masked.get_pixel(x, y) == key.0)
        .count();
    let total = (width as usize * height as usize).max(1);
    println!(
        "   Keyed {} of {} pixels ({:.1}%) with {} at tolerance {}",
        keyed,
        total,
        keyed as f64 * 100.0 / total as f64,
        key,
        tolerance
    );

    masked.save_png(&cli.output)?;
    info!("Masked frame written to {:?}", cli.output);
    println!("✅ Wrote {:?}", cli.output);
    Ok(())
}
