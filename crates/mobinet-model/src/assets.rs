//! Raw model payloads

use crate::{AssetKind, LabelTable, ModelConfig, ModelError, NetworkParams, Result};
use log::{debug, info};
use std::path::PathBuf;

/// The three model payloads, read fully into memory
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModelAssets {
    pub params: Vec<u8>,
    pub weights: Vec<u8>,
    pub labels: Vec<u8>,
}

fn check(kind: AssetKind, path: PathBuf, read: std::io::Result<Vec<u8>>) -> Result<Vec<u8>> {
    let bytes = read.map_err(|source| ModelError::AssetLoad { kind, path: path.clone(), source })?;
    if bytes.is_empty() {
        return Err(ModelError::TruncatedAsset { kind, path });
    }
    debug!("Loaded {} ({} bytes) from {:?}", kind, bytes.len(), path);
    Ok(bytes)
}

impl ModelAssets {
    /// Read params, weights and labels from `config.asset_dir`.
    pub fn load(config: &ModelConfig) -> Result<Self> {
        let read = |kind, path: PathBuf| {
            let bytes = std::fs::read(&path);
            check(kind, path, bytes)
        };
        let assets = Self {
            params: read(AssetKind::Params, config.param_path())?,
            weights: read(AssetKind::Weights, config.weight_path())?,
            labels: read(AssetKind::Labels, config.label_path())?,
        };
        info!("Model assets loaded from {:?}", config.asset_dir);
        Ok(assets)
    }

    /// Async variant of [`ModelAssets::load`] on `tokio::fs`.
    pub async fn load_async(config: &ModelConfig) -> Result<Self> {
        let (params, weights, labels) = tokio::join!(
            tokio::fs::read(config.param_path()),
            tokio::fs::read(config.weight_path()),
            tokio::fs::read(config.label_path()),
        );
        let assets = Self {
            params: check(AssetKind::Params, config.param_path(), params)?,
            weights: check(AssetKind::Weights, config.weight_path(), weights)?,
            labels: check(AssetKind::Labels, config.label_path(), labels)?,
        };
        info!("Model assets loaded from {:?}", config.asset_dir);
        Ok(assets)
    }

    pub fn network_params(&self) -> Result<NetworkParams> {
        NetworkParams::from_json(&self.params)
    }

    pub fn label_table(&self) -> LabelTable {
        LabelTable::parse(&self.labels)
    }
}
