/// Cache and config directory name under the platform base directories.
pub const APP_DIR_NAME: &str = "SignSpeak";

/// Landmarks produced per detected hand.
pub const LANDMARK_COUNT: usize = 21;

/// Only one hand is ever classified.
pub const MAX_HANDS: usize = 1;

/// Overlay marker radius in pixels.
pub const DEFAULT_MARKER_RADIUS: u32 = 5;

/// Overlay marker color (red).
pub const DEFAULT_MARKER_COLOR: [u8; 3] = [255, 0, 0];

/// Status text shown while no hand is in view.
pub const NO_HAND_TEXT: &str = "No hand detected";

/// Pace of the presentation loop when the source does not report a rate.
pub const DEFAULT_FPS: f64 = 30.0;

pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "tiff", "tif", "webp"];
