//! # mobinet-model
//!
//! Everything the classifier needs from disk, loaded once at startup:
//!
//! - network parameters (input / output blob names, input size, mean values)
//! - network weights (opaque bytes handed to the inference backend)
//! - the label table mapping class index to a human readable name
//!
//! All three payloads are read fully into memory. A missing or empty file is
//! reported as a [`ModelError`] naming the asset; loading is never retried.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub mod assets;
pub mod labels;
pub mod params;

pub use assets::ModelAssets;
pub use labels::LabelTable;
pub use params::NetworkParams;

/// Which of the model files an error refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
    Params,
    Weights,
    Labels,
    Config,
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AssetKind::Params => "network parameters",
            AssetKind::Weights => "network weights",
            AssetKind::Labels => "label table",
            AssetKind::Config => "model config",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug)]
pub enum ModelError {
    #[error("Failed to load {kind} from {path:?}: {source}")]
    AssetLoad {
        kind: AssetKind,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{kind} at {path:?} is empty")]
    TruncatedAsset { kind: AssetKind, path: PathBuf },
    #[error("Malformed {kind}: {source}")]
    Json {
        kind: AssetKind,
        #[source]
        source: serde_json::Error,
    },
    #[error("Invalid network parameters: {0}")]
    InvalidParams(String),
}

pub type Result<T> = std::result::Result<T, ModelError>;

/// Where the model files live
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Directory holding the three asset files
    pub asset_dir: PathBuf,
    /// Network parameter description (JSON)
    pub param_file: String,
    /// Network weights
    pub weight_file: String,
    /// Newline separated class labels
    pub label_file: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            asset_dir: PathBuf::from("./models"),
            param_file: "mobilenet.param.json".to_string(),
            weight_file: "mobilenet.onnx".to_string(),
            label_file: "synset.txt".to_string(),
        }
    }
}

impl ModelConfig {
    /// Config rooted at `asset_dir` with the default file names.
    pub fn in_dir(asset_dir: impl Into<PathBuf>) -> Self {
        Self { asset_dir: asset_dir.into(), ..Self::default() }
    }

    /// Load a config from a JSON file; missing keys take their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|source| ModelError::AssetLoad {
            kind: AssetKind::Config,
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_slice(&bytes).map_err(|source| ModelError::Json { kind: AssetKind::Config, source })
    }

    pub fn param_path(&self) -> PathBuf {
        self.asset_dir.join(&self.param_file)
    }

    pub fn weight_path(&self) -> PathBuf {
        self.asset_dir.join(&self.weight_file)
    }

    pub fn label_path(&self) -> PathBuf {
        self.asset_dir.join(&self.label_file)
    }
}
