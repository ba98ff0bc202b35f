// mobinet-classify/src/onnx.rs
use crate::{check_input, decode, tile_to_bgr_tensor, Classification, Classifier, ClassifyError, Result};
use log::{debug, info};
use mobinet_model::{LabelTable, ModelAssets, NetworkParams};
use mobinet_preprocess::Tile;
use ort::{
    inputs,
    session::{builder::GraphOptimizationLevel, Session},
    value::TensorRef,
};
use std::time::Instant;

fn backend(e: impl std::fmt::Display) -> ClassifyError {
    ClassifyError::Backend(e.to_string())
}

/// MobileNet on ONNX Runtime.
///
/// `weights` hold the ONNX model, `params` the JSON [`NetworkParams`] and
/// `labels` the synset table.
pub struct OnnxMobileNet {
    session: Session,
    params: NetworkParams,
    labels: LabelTable,
}

impl OnnxMobileNet {
    pub fn from_assets(assets: &ModelAssets) -> Result<Self> {
        let params = assets.network_params()?;
        let labels = assets.label_table();
        if labels.is_empty() {
            return Err(ClassifyError::NoLabels);
        }

        let session = Session::builder()
            .map_err(backend)?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(backend)?
            .with_intra_threads(params.num_threads)
            .map_err(backend)?
            .commit_from_memory(&assets.weights)
            .map_err(backend)?;

        info!(
            "ONNX MobileNet ready: {} → {}, {} labels",
            params.input_blob,
            params.output_blob,
            labels.len()
        );
        Ok(Self { session, params, labels })
    }

    pub fn params(&self) -> &NetworkParams {
        &self.params
    }
}

impl Classifier for OnnxMobileNet {
    fn infer(&mut self, tile: &Tile) -> Result<Classification> {
        let start = Instant::now();
        check_input(tile, self.params.input_size as usize)?;
        let input = tile_to_bgr_tensor(tile, self.params.mean_values);

        let scores: Vec<f32> = {
            let tensor = TensorRef::from_array_view(input.view()).map_err(backend)?;
            let outputs = self
                .session
                .run(inputs![self.params.input_blob.as_str() => tensor])
                .map_err(backend)?;
            let prob = outputs[self.params.output_blob.as_str()]
                .try_extract_array::<f32>()
                .map_err(backend)?;
            prob.iter().copied().collect()
        };

        let result = decode(&scores, &self.labels)?;
        debug!("{:.2}ms   {}", start.elapsed().as_secs_f64() * 1000.0, result);
        Ok(result)
    }

    fn describe(&self) -> String {
        format!(
            "ONNX Runtime MobileNet {}x{} ({} classes)",
            self.params.input_size,
            self.params.input_size,
            self.labels.len()
        )
    }
}
