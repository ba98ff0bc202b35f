//! Classify Image Demo
//!
//! Loads the MobileNet assets, maps a still image onto the 224×224 tile the
//! same way camera frames are, and prints the top-1 label.
//!
//! Usage: cargo run -p mobinet-demos --features onnx --bin classify_image -- --models ./models cat.jpg

use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use mobinet_classify::{Classifier, OnnxMobileNet};
use mobinet_model::{ModelAssets, ModelConfig};
use mobinet_preprocess::{Preprocessor, RgbBuffer, ScaleMode};
use std::path::PathBuf;
use std::time::Instant;

#[derive(Parser)]
struct CliArgs {
    /// Directory holding mobilenet.param.json, mobilenet.onnx and synset.txt
    #[arg(long, default_value = "./models")]
    models: PathBuf,

    /// Optional JSON model config overriding the file names
    #[arg(long)]
    model_config: Option<PathBuf>,

    /// Crop the centre instead of letterboxing
    #[arg(long)]
    fill: bool,

    image: PathBuf,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = CliArgs::parse();

    let config = match &args.model_config {
        Some(path) => ModelConfig::from_json_file(path)?,
        None => ModelConfig::in_dir(&args.models),
    };
    println!("🔧 Loading model assets from {:?}", config.asset_dir);
    let assets = ModelAssets::load(&config)?;
    let mut classifier = OnnxMobileNet::from_assets(&assets).context("Failed to initialise classifier")?;
    println!("✅ {}", classifier.describe());

    let img = image::open(&args.image).with_context(|| format!("Failed to open {:?}", args.image))?;
    let rgb = RgbBuffer::from_rgba_image(&img.to_rgba8());

    let size = classifier.params().input_size;
    info!("Image {}x{}, tile {}x{}", rgb.width(), rgb.height(), size, size);
    let mode = if args.fill { ScaleMode::Fill } else { ScaleMode::Fit };
    let mut pre = Preprocessor::new(size, size).with_scale_mode(mode);

    let start = Instant::now();
    let tile = pre.preprocess_rgb(&rgb, 0)?;
    let result = classifier.infer(tile)?;
    println!("🏷️  {}  ({:.2}ms)", result.label_text(), start.elapsed().as_secs_f64() * 1000.0);
    Ok(())
}
