use crate::detection::domain::hand_landmarks::HandObservation;
use crate::shared::frame::Frame;

/// Per-call detection options.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EstimateOptions {
    /// Report landmarks as they appear in the horizontally mirrored frame.
    pub flip_horizontal: bool,
}

impl Default for EstimateOptions {
    fn default() -> Self {
        Self {
            flip_horizontal: true,
        }
    }
}

/// Domain interface for hand landmark detection.
///
/// Returns zero or more hands; the presentation loop only ever consults the
/// first. Implementations may keep state between calls, hence `&mut self`.
pub trait LandmarkSource: Send {
    fn estimate_hands(
        &mut self,
        frame: &Frame,
        options: EstimateOptions,
    ) -> Result<Vec<HandObservation>, Box<dyn std::error::Error>>;
}
