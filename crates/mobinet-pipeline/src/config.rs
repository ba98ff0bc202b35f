// mobinet-pipeline/src/config.rs
use crate::{PipelineError, Result};
use mobinet_preprocess::{Sampling, ScaleMode, TILE_SIZE};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Pipeline settings; every field has a default so partial JSON works.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Edge of the square classifier tile
    pub crop_size: u32,
    /// Preview size requested from the camera (width, height)
    pub desired_preview: (u32, u32),
    pub scale_mode: ScaleMode,
    pub sampling: Sampling,
    /// Added to the frame rotation to get the tile orientation
    pub orientation_offset: i32,
    /// Write every classified tile to `preview_dir/preview.png`
    pub save_preview: bool,
    pub preview_dir: PathBuf,
    /// Outcomes buffered for a slow consumer before new ones are dropped
    pub outcome_depth: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            crop_size: TILE_SIZE,
            desired_preview: (1280, 720),
            scale_mode: ScaleMode::Fit,
            sampling: Sampling::Nearest,
            orientation_offset: 270,
            save_preview: false,
            preview_dir: PathBuf::from("./preview"),
            outcome_depth: 4,
        }
    }
}

impl PipelineConfig {
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|source| PipelineError::ConfigRead { path: path.to_path_buf(), source })?;
        let config: Self = serde_json::from_slice(&bytes)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.crop_size == 0 {
            return Err(PipelineError::InvalidConfig("crop_size must be positive".into()));
        }
        if self.outcome_depth == 0 {
            return Err(PipelineError::InvalidConfig("outcome_depth must be at least 1".into()));
        }
        Ok(())
    }

    /// Rotation applied to a frame captured at `frame_rotation` degrees.
    pub fn tile_rotation(&self, frame_rotation: i32) -> i32 {
        (frame_rotation + self.orientation_offset).rem_euclid(360)
    }

    pub fn preview_path(&self) -> PathBuf {
        self.preview_dir.join("preview.png")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let c = PipelineConfig::default();
        assert_eq!(c.crop_size, 224);
        assert_eq!(c.desired_preview, (1280, 720));
        assert_eq!(c.scale_mode, ScaleMode::Fit);
        assert!(!c.save_preview);
        assert_eq!(c.tile_rotation(90), 0);
        assert_eq!(c.tile_rotation(0), 270);
    }

    #[test]
    fn partial_json() {
        let c: PipelineConfig =
            serde_json::from_str(r#"{ "scale_mode": "fill", "sampling": "bilinear", "orientation_offset": 0 }"#).unwrap();
        assert_eq!(c.scale_mode, ScaleMode::Fill);
        assert_eq!(c.sampling, Sampling::Bilinear);
        assert_eq!(c.tile_rotation(-90), 270);
        assert_eq!(c.crop_size, 224);
    }

    #[test]
    fn zero_depth_invalid() {
        let c = PipelineConfig { outcome_depth: 0, ..Default::default() };
        assert!(matches!(c.validate(), Err(PipelineError::InvalidConfig(_))));
    }
}
