//! Camera Classify Demo
//!
//! The complete mobinet pipeline:
//! 1. Frames from the camera (`--features gst`) or a synthetic source
//! 2. Busy-drop admission on the capture side
//! 3. YUV → ARGB → 224×224 tile on the inference thread
//! 4. MobileNet top-1 label per processed frame
//!
//! Usage: cargo run -p mobinet-demos --features onnx --bin camera_classify -- --frames 300

use anyhow::{Context, Result};
use clap::Parser;
use log::{info, warn};
use mobinet_camera::{frame_stream, CameraError, FrameSource, SyntheticSource};
use mobinet_classify::OnnxMobileNet;
use mobinet_model::{ModelAssets, ModelConfig};
use mobinet_pipeline::{Admission, Pipeline, PipelineConfig};
use std::path::PathBuf;
use std::time::Instant;
use tokio_stream::StreamExt;

const CAMERA_FPS: u32 = 30;

#[derive(Parser)]
struct CliArgs {
    #[arg(long, default_value = "./models")]
    models: PathBuf,

    /// Optional JSON pipeline config
    #[arg(long)]
    config: Option<PathBuf>,

    /// Stop after this many camera frames
    #[arg(long, default_value = "300")]
    frames: u64,

    /// Use the synthetic source even when a camera is available
    #[arg(long)]
    synthetic: bool,

    /// Sensor rotation reported with every frame
    #[arg(long, default_value_t = 90)]
    rotation: i32,
}

fn open_source(args: &CliArgs, config: &PipelineConfig) -> Result<Box<dyn FrameSource>> {
    let (w, h) = config.desired_preview;
    #[cfg(feature = "gst")]
    if !args.synthetic {
        println!("📷 Initializing camera at {}x{}@{}fps...", w, h, CAMERA_FPS);
        let camera = mobinet_camera::Camera::new(w, h, CAMERA_FPS)
            .context("Failed to initialize camera")?
            .with_rotation(args.rotation);
        return Ok(Box::new(camera));
    }

    println!("🧪 Synthetic {}x{} frames at {}fps timestamps", w, h, CAMERA_FPS);
    let interval = std::time::Duration::from_secs(1) / CAMERA_FPS;
    Ok(Box::new(
        SyntheticSource::new(w, h)
            .with_rotation(args.rotation)
            .with_frame_interval(interval)
            .with_limit(args.frames),
    ))
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let args = CliArgs::parse();

    let config = match &args.config {
        Some(path) => PipelineConfig::from_json_file(path)?,
        None => PipelineConfig::default(),
    };

    let assets = ModelAssets::load_async(&ModelConfig::in_dir(&args.models)).await?;
    let classifier = OnnxMobileNet::from_assets(&assets).context("Failed to initialise classifier")?;

    info!("Pipeline config: {:?}", config);
    let source = open_source(&args, &config)?;
    let (mut handle, mut outcomes) = Pipeline::spawn(config, classifier)?;

    let printer = tokio::spawn(async move {
        while let Some(outcome) = outcomes.next().await {
            match outcome.classification {
                Some(c) => println!("🏷️  #{:<5} {}  ({:.1}ms)", outcome.index, c.label_text(), outcome.elapsed.as_secs_f64() * 1000.0),
                None => println!("⚠️  #{:<5} no result", outcome.index),
            }
        }
    });

    let start = Instant::now();
    let mut frames = frame_stream(source);
    let (mut seen, mut rejected) = (0u64, 0u64);
    while seen < args.frames {
        let Some(item) = frames.next().await else { break };
        let frame = match item {
            Ok(frame) => frame,
            Err(CameraError::EndOfStream) => break,
            Err(e) => return Err(e.into()),
        };
        seen += 1;
        match handle.submit(frame) {
            Admission::Accepted(_) | Admission::Busy => {}
            Admission::Rejected(e) => {
                warn!("Frame {} rejected: {}", seen, e);
                rejected += 1;
            }
            Admission::Closed => {
                eprintln!("❌ Inference worker stopped");
                break;
            }
        }
    }

    let (accepted, dropped) = (handle.accepted_frames(), handle.dropped_frames());
    tokio::task::spawn_blocking(move || handle.shutdown()).await??;
    printer.await?;

    let secs = start.elapsed().as_secs_f64();
    info!("{} frames seen, {} accepted, {} busy, {} rejected", seen, accepted, dropped, rejected);
    println!(
        "📊 {} classified, {} dropped while busy, {} rejected in {:.1}s ({:.1} classifications/s)",
        accepted,
        dropped,
        rejected,
        secs,
        accepted as f64 / secs.max(f64::EPSILON)
    );
    Ok(())
}
