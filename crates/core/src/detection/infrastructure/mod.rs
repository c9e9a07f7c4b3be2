pub mod detector_factory;
pub mod execution_provider;
pub mod onnx_hand_landmark_detector;
pub mod replay_landmark_source;
