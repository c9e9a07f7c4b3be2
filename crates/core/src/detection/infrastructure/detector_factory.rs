use std::path::Path;

use crate::detection::domain::landmark_source::LandmarkSource;
use crate::shared::constants::MAX_HANDS;
use crate::shared::model_resolver::{self, ProgressFn};

use super::onnx_hand_landmark_detector::{OnnxHandLandmarkDetector, DEFAULT_CONFIDENCE};
use super::replay_landmark_source::ReplayLandmarkSource;

/// Backend that produces hand landmarks.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Runtime {
    /// ONNX hand landmark model; the location is a path or http(s) URL.
    Onnx,
    /// JSON-lines landmark recording; the location is a local path.
    Replay,
}

#[derive(Clone, Debug, PartialEq)]
pub struct DetectorConfig {
    pub runtime: Runtime,
    pub model_asset_location: String,
    pub max_hands: usize,
    pub min_confidence: f64,
}

impl DetectorConfig {
    pub fn new(runtime: Runtime, model_asset_location: impl Into<String>) -> Self {
        Self {
            runtime,
            model_asset_location: model_asset_location.into(),
            max_hands: MAX_HANDS,
            min_confidence: DEFAULT_CONFIDENCE,
        }
    }
}

/// Builds the landmark source described by `config`.
///
/// Remote ONNX models are downloaded into the model cache on first use;
/// `progress` receives download progress.
pub fn create_detector(
    config: &DetectorConfig,
    progress: Option<ProgressFn>,
) -> Result<Box<dyn LandmarkSource>, Box<dyn std::error::Error>> {
    match config.runtime {
        Runtime::Onnx => {
            let model_path =
                model_resolver::resolve_location(&config.model_asset_location, None, progress)?;
            log::info!(
                "Using ONNX hand landmarks (min_confidence={}, max_hands={})",
                config.min_confidence,
                config.max_hands
            );
            Ok(Box::new(OnnxHandLandmarkDetector::new(
                &model_path,
                config.min_confidence,
                config.max_hands,
            )?))
        }
        Runtime::Replay => {
            log::info!("Replaying hand landmarks from {}", config.model_asset_location);
            Ok(Box::new(ReplayLandmarkSource::open(
                Path::new(&config.model_asset_location),
                config.max_hands,
            )?))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::domain::landmark_source::EstimateOptions;
    use crate::shared::frame::Frame;

    #[test]
    fn test_new_uses_single_hand_defaults() {
        let config = DetectorConfig::new(Runtime::Onnx, "hand.onnx");
        assert_eq!(config.max_hands, 1);
        assert_eq!(config.min_confidence, 0.5);
        assert_eq!(config.model_asset_location, "hand.onnx");
    }

    #[test]
    fn test_replay_runtime_builds_source() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hands.jsonl");
        std::fs::write(&path, "{\"hands\":[]}\n").unwrap();

        let config = DetectorConfig::new(Runtime::Replay, path.to_string_lossy());
        let mut detector = create_detector(&config, None).unwrap();
        let hands = detector
            .estimate_hands(&Frame::filled(4, 4, [0; 3], 0), EstimateOptions::default())
            .unwrap();
        assert!(hands.is_empty());
    }

    #[test]
    fn test_replay_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let config = DetectorConfig::new(
            Runtime::Replay,
            dir.path().join("missing.jsonl").to_string_lossy(),
        );
        assert!(create_detector(&config, None).is_err());
    }

    #[test]
    fn test_onnx_missing_local_model_fails() {
        let dir = tempfile::tempdir().unwrap();
        let config = DetectorConfig::new(
            Runtime::Onnx,
            dir.path().join("missing.onnx").to_string_lossy(),
        );
        let err = create_detector(&config, None).err().unwrap();
        assert!(err.to_string().contains("model file not found"));
    }
}
