//! Network parameter description.

use crate::{AssetKind, ModelError, Result};
use serde::{Deserialize, Serialize};

/// Per-channel means for MobileNet v1, in BGR order.
pub const MOBILENET_MEAN_BGR: [f32; 3] = [103.94, 116.78, 123.68];

/// How to feed the network and where to read its scores
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkParams {
    /// Input blob name
    pub input_blob: String,
    /// Output (softmax) blob name
    pub output_blob: String,
    /// Square input edge in pixels
    pub input_size: u32,
    /// Values subtracted from the B, G, R channels
    pub mean_values: [f32; 3],
    /// Intra-op threads for the backend
    pub num_threads: usize,
}

impl Default for NetworkParams {
    fn default() -> Self {
        Self {
            input_blob: "data".to_string(),
            output_blob: "prob".to_string(),
            input_size: 224,
            mean_values: MOBILENET_MEAN_BGR,
            num_threads: 4,
        }
    }
}

impl NetworkParams {
    pub fn from_json(bytes: &[u8]) -> Result<Self> {
        let params: Self =
            serde_json::from_slice(bytes).map_err(|source| ModelError::Json { kind: AssetKind::Params, source })?;
        params.validate()?;
        Ok(params)
    }

    pub fn validate(&self) -> Result<()> {
        if self.input_blob.is_empty() || self.output_blob.is_empty() {
            return Err(ModelError::InvalidParams("blob names must not be empty".into()));
        }
        if self.input_size == 0 {
            return Err(ModelError::InvalidParams("input_size must be positive".into()));
        }
        if self.num_threads == 0 {
            return Err(ModelError::InvalidParams("num_threads must be at least 1".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_is_mobilenet_v1() {
        let p = NetworkParams::from_json(b"{}").unwrap();
        assert_eq!(p, NetworkParams::default());
        assert_eq!(p.mean_values, [103.94, 116.78, 123.68]);
    }

    #[test]
    fn zero_input_size_rejected() {
        let err = NetworkParams::from_json(br#"{ "input_size": 0 }"#).unwrap_err();
        assert!(matches!(err, ModelError::InvalidParams(_)));
    }

    #[test]
    fn garbage_is_a_json_error() {
        let err = NetworkParams::from_json(b"7767517\n").unwrap_err();
        assert!(matches!(err, ModelError::Json { kind: AssetKind::Params, .. }));
    }
}
