pub mod hand_landmarks;
pub mod landmark_source;
