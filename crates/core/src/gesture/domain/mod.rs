pub mod gesture_classifier;
pub mod gesture_label;
pub mod hand_pose;
pub mod spoken_state;
