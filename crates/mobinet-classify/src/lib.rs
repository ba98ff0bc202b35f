// mobinet-classify/src/lib.rs
// ============================================================
// mobinet-classify  –  classification stage
// Runs a MobileNet v1 image classifier on the preprocessed
// 224×224 tile and reports the top-1 label.
// ------------------------------------------------------------
// Pipeline: Tile → Array4<f32> (BGR, NCHW) → scores → label
// ------------------------------------------------------------
// Public API
//   * Classifier::infer(tile)   – one inference, top-1 result
//   * top1(scores) / decode()   – score vector → Classification
//   * tile_to_bgr_tensor()      – mean-subtracted input tensor
// ------------------------------------------------------------
//   Build notes
//     * `--features onnx` adds the ONNX Runtime backend.
// ============================================================

//! mobinet – classification layer
//!
//! The rest of the pipeline only sees the [`Classifier`] trait: one call
//! per tile, one [`Classification`] back. Backends are built from
//! [`ModelAssets`](mobinet_model::ModelAssets) by their own constructor and
//! fail there when a payload is malformed, never later in the hot path.

use mobinet_model::{LabelTable, ModelError};
use mobinet_preprocess::Tile;
use std::fmt;
use thiserror::Error;

mod tensor;

#[cfg(feature = "onnx")]
mod onnx;

pub use tensor::{check_input, tile_to_bgr_tensor};
pub use mobinet_model::params::MOBILENET_MEAN_BGR;

#[cfg(feature = "onnx")]
pub use onnx::OnnxMobileNet;

#[derive(Debug, Error)]
pub enum ClassifyError {
    #[error("Input tile is {width}x{height}, network expects {expected}x{expected}")]
    InputSize { expected: usize, width: usize, height: usize },
    #[error("Inference backend error: {0}")]
    Backend(String),
    #[error("Network produced no scores")]
    EmptyOutput,
    #[error("Class {class} outside the {len}-entry label table")]
    UnknownClass { class: usize, len: usize },
    #[error("Label table is empty")]
    NoLabels,
    #[error(transparent)]
    Model(#[from] ModelError),
}

pub type Result<T> = std::result::Result<T, ClassifyError>;

/// Top-1 result of one inference.
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub label: String,
    pub class: usize,
    pub score: f32,
}

impl Classification {
    /// `"{label} = {score}"` with three decimals, the format shown to users.
    pub fn label_text(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {:.3}", self.label, self.score)
    }
}

/// Trait for tile classifiers.
pub trait Classifier: Send {
    /// Classify one tile. Called at most once per accepted frame.
    fn infer(&mut self, tile: &Tile) -> Result<Classification>;

    /// Short human readable description of the backend.
    fn describe(&self) -> String {
        "mobinet classifier".to_string()
    }
}

impl<C: Classifier + ?Sized> Classifier for Box<C> {
    fn infer(&mut self, tile: &Tile) -> Result<Classification> {
        (**self).infer(tile)
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}

/// Index and value of the highest score.
///
/// Scanning starts from `(0, 0.0)` and only a strictly greater score wins,
/// so ties keep the lowest index and an all-negative vector reports class 0.
pub fn top1(scores: &[f32]) -> Option<(usize, f32)> {
    if scores.is_empty() {
        return None;
    }
    let best = scores
        .iter()
        .enumerate()
        .fold((0, 0.0f32), |best, (i, &s)| if s > best.1 { (i, s) } else { best });
    Some(best)
}

/// Turn a score vector into a labelled [`Classification`].
pub fn decode(scores: &[f32], labels: &LabelTable) -> Result<Classification> {
    let (class, score) = top1(scores).ok_or(ClassifyError::EmptyOutput)?;
    let label = labels
        .get(class)
        .ok_or(ClassifyError::UnknownClass { class, len: labels.len() })?;
    Ok(Classification { label: label.to_string(), class, score })
}
