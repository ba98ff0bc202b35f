//! Integration tests for mobinet-model crate

use mobinet_model::{AssetKind, ModelAssets, ModelConfig, ModelError};
use std::fs;
use tempfile::tempdir;

fn write_assets(dir: &std::path::Path) {
    fs::write(dir.join("mobilenet.param.json"), br#"{ "input_size": 224, "num_threads": 2 }"#).unwrap();
    fs::write(dir.join("mobilenet.onnx"), [0x08u8, 0x07, 0x12, 0x00]).unwrap();
    fs::write(dir.join("synset.txt"), "n01440764 tench\nn01443537 goldfish\n").unwrap();
}

#[test]
fn test_load_all_assets() {
    let temp_dir = tempdir().unwrap();
    write_assets(temp_dir.path());

    let assets = ModelAssets::load(&ModelConfig::in_dir(temp_dir.path())).unwrap();
    assert_eq!(assets.weights, [0x08, 0x07, 0x12, 0x00]);

    let params = assets.network_params().unwrap();
    assert_eq!(params.input_size, 224);
    assert_eq!(params.num_threads, 2);
    assert_eq!(params.input_blob, "data");

    let labels = assets.label_table();
    assert_eq!(labels.len(), 2);
    assert_eq!(labels.get(1), Some("goldfish"));
}

#[tokio::test]
async fn test_load_async_matches_sync() {
    let temp_dir = tempdir().unwrap();
    write_assets(temp_dir.path());
    let config = ModelConfig::in_dir(temp_dir.path());

    let sync = ModelAssets::load(&config).unwrap();
    let async_ = ModelAssets::load_async(&config).await.unwrap();
    assert_eq!(sync, async_);
}

#[test]
fn test_missing_weights_named() {
    let temp_dir = tempdir().unwrap();
    write_assets(temp_dir.path());
    fs::remove_file(temp_dir.path().join("mobilenet.onnx")).unwrap();

    match ModelAssets::load(&ModelConfig::in_dir(temp_dir.path())) {
        Err(ModelError::AssetLoad { kind, path, .. }) => {
            assert_eq!(kind, AssetKind::Weights);
            assert!(path.ends_with("mobilenet.onnx"));
        }
        other => panic!("expected AssetLoad, got {other:?}"),
    }
}

#[test]
fn test_renamed_files_load_from_configured_paths() {
    let temp_dir = tempdir().unwrap();
    write_assets(temp_dir.path());
    fs::rename(temp_dir.path().join("synset.txt"), temp_dir.path().join("labels.txt")).unwrap();

    let mut config = ModelConfig::in_dir(temp_dir.path());
    match ModelAssets::load(&config) {
        Err(ModelError::AssetLoad { kind: AssetKind::Labels, path, .. }) => {
            assert_eq!(path, temp_dir.path().join("synset.txt"));
        }
        other => panic!("expected AssetLoad, got {other:?}"),
    }

    config.label_file = "labels.txt".to_string();
    let assets = ModelAssets::load(&config).unwrap();
    assert_eq!(assets.label_table().get(0), Some("tench"));
}

#[tokio::test]
async fn test_empty_labels_rejected() {
    let temp_dir = tempdir().unwrap();
    write_assets(temp_dir.path());
    fs::write(temp_dir.path().join("synset.txt"), b"").unwrap();

    let err = ModelAssets::load_async(&ModelConfig::in_dir(temp_dir.path())).await.unwrap_err();
    assert!(matches!(err, ModelError::TruncatedAsset { kind: AssetKind::Labels, .. }));
}

#[test]
fn test_model_config_serialization() {
    let temp_dir = tempdir().unwrap();
    let mut config = ModelConfig::in_dir(temp_dir.path());
    config.weight_file = "mobilenet_v2.onnx".into();

    let path = temp_dir.path().join("model.json");
    fs::write(&path, serde_json::to_vec(&config).unwrap()).unwrap();
    let loaded = ModelConfig::from_json_file(&path).unwrap();
    assert_eq!(loaded, config);
}

#[test]
fn test_model_config_bad_json() {
    let temp_dir = tempdir().unwrap();
    let path = temp_dir.path().join("model.json");
    fs::write(&path, "{ not json").unwrap();
    assert!(matches!(
        ModelConfig::from_json_file(&path),
        Err(ModelError::Json { kind: AssetKind::Config, .. })
    ));
}
