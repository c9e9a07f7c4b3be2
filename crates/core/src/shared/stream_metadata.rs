use std::path::PathBuf;

/// What a media source reports once its frame dimensions are known.
#[derive(Clone, Debug, PartialEq)]
pub struct StreamMetadata {
    pub width: u32,
    pub height: u32,
    /// 0.0 when the source has no inherent rate (still images).
    pub fps: f64,
    pub source_path: Option<PathBuf>,
}

impl StreamMetadata {
    /// Rate the loop should run at: the source's own, or `fallback` when unknown.
    pub fn effective_fps(&self, fallback: f64) -> f64 {
        if self.fps.is_finite() && self.fps > 0.0 {
            self.fps
        } else {
            fallback
        }
    }
}
