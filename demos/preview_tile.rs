//! Preview Tile Demo
//!
//! Runs the preprocessing stage on its own and writes the classifier tile to
//! disk, so the crop / rotation can be checked by eye:
//! 1. Load a still image, or render a synthetic YUV frame
//! 2. Convert YUV → ARGB (synthetic frames only)
//! 3. Rotate + scale onto the tile
//! 4. Save the tile as PNG
//!
//! Usage: cargo run -p mobinet-demos --bin preview_tile -- --input cat.jpg --rotation 90

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use log::info;
use mobinet_camera::{FrameSource, PlaneBuffers, SyntheticSource};
use mobinet_preprocess::{Preprocessor, RgbBuffer, Sampling, ScaleMode, TILE_SIZE};
use std::path::PathBuf;
use std::time::Instant;

#[derive(Clone, Copy, ValueEnum)]
enum Mode {
    Stretch,
    Fit,
    Fill,
}

impl From<Mode> for ScaleMode {
    fn from(m: Mode) -> Self {
        match m {
            Mode::Stretch => ScaleMode::Stretch,
            Mode::Fit => ScaleMode::Fit,
            Mode::Fill => ScaleMode::Fill,
        }
    }
}

#[derive(Parser)]
struct CliArgs {
    /// Still image to preprocess; a synthetic camera frame is used if absent
    #[arg(long)]
    input: Option<PathBuf>,

    #[arg(long, default_value = "tile.png")]
    output: PathBuf,

    /// Rotation in degrees applied to the frame
    #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
    rotation: i32,

    #[arg(long, default_value_t = TILE_SIZE)]
    size: u32,

    #[arg(long, value_enum, default_value = "fit")]
    mode: Mode,

    #[arg(long)]
    bilinear: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = CliArgs::parse();

    let sampling = if args.bilinear { Sampling::Bilinear } else { Sampling::Nearest };
    let mut pre = Preprocessor::new(args.size, args.size)
        .with_scale_mode(args.mode.into())
        .with_sampling(sampling);

    info!("Tile {}x{}, mode {:?}, {:?} sampling", args.size, args.size, ScaleMode::from(args.mode), sampling);
    let start = Instant::now();
    let tile = match &args.input {
        Some(path) => {
            println!("🖼️  Loading {:?}", path);
            let img = image::open(path).with_context(|| format!("Failed to open {:?}", path))?;
            let rgb = RgbBuffer::from_rgba_image(&img.to_rgba8());
            pre.preprocess_rgb(&rgb, args.rotation)?
        }
        None => {
            println!("📷 Rendering synthetic 1280x720 frame");
            let mut source = SyntheticSource::new(1280, 720).with_rotation(args.rotation);
            let frame = source.next_frame_blocking()?;
            let mut planes = PlaneBuffers::new();
            planes.ingest(&frame)?;
            let rotation = frame.rotation();
            frame.release();
            pre.run(&planes, rotation)?
        }
    };
    println!("⏱️  Preprocessed in {:.2}ms", start.elapsed().as_secs_f64() * 1000.0);

    tile.save_png(&args.output)
        .with_context(|| format!("Failed to write {:?}", args.output))?;
    println!("✅ Tile {}x{} written to {:?}", tile.width(), tile.height(), args.output);
    Ok(())
}
