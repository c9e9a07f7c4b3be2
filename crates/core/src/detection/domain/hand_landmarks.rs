//! 21-point hand landmarks in the MediaPipe hand model order.
//!
//! Coordinates are in frame pixel space with y growing downward, so a point
//! "above" another has the smaller y.

use thiserror::Error;

use crate::shared::constants::LANDMARK_COUNT;

pub const WRIST: usize = 0;
pub const THUMB_CMC: usize = 1;
pub const THUMB_MCP: usize = 2;
pub const THUMB_IP: usize = 3;
pub const THUMB_TIP: usize = 4;
pub const INDEX_MCP: usize = 5;
pub const INDEX_PIP: usize = 6;
pub const INDEX_DIP: usize = 7;
pub const INDEX_TIP: usize = 8;
pub const MIDDLE_MCP: usize = 9;
pub const MIDDLE_PIP: usize = 10;
pub const MIDDLE_DIP: usize = 11;
pub const MIDDLE_TIP: usize = 12;
pub const RING_MCP: usize = 13;
pub const RING_PIP: usize = 14;
pub const RING_DIP: usize = 15;
pub const RING_TIP: usize = 16;
pub const PINKY_MCP: usize = 17;
pub const PINKY_PIP: usize = 18;
pub const PINKY_DIP: usize = 19;
pub const PINKY_TIP: usize = 20;

#[derive(Error, Debug, PartialEq)]
pub enum LandmarkError {
    #[error("expected 21 landmarks, got {0}")]
    WrongCount(usize),
    #[error("landmark {index} has a non-finite coordinate")]
    NonFinite { index: usize },
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Landmark {
    pub x: f64,
    pub y: f64,
    /// Depth relative to the wrist, when the model provides it.
    pub z: Option<f64>,
}

impl Landmark {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y, z: None }
    }

    pub fn with_z(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z: Some(z) }
    }

    fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.map_or(true, f64::is_finite)
    }
}

/// One detected hand: exactly 21 landmarks, so classification never sees
/// a malformed sequence.
#[derive(Clone, Debug, PartialEq)]
pub struct HandObservation {
    points: [Landmark; LANDMARK_COUNT],
    /// Detector confidence for this hand, when reported.
    score: Option<f64>,
}

impl HandObservation {
    pub fn new(points: [Landmark; LANDMARK_COUNT]) -> Self {
        Self {
            points,
            score: None,
        }
    }

    /// Builds an observation from a detector's variable-length output.
    pub fn from_points(points: &[Landmark]) -> Result<Self, LandmarkError> {
        let points: [Landmark; LANDMARK_COUNT] = points
            .try_into()
            .map_err(|_| LandmarkError::WrongCount(points.len()))?;
        if let Some(index) = points.iter().position(|p| !p.is_finite()) {
            return Err(LandmarkError::NonFinite { index });
        }
        Ok(Self::new(points))
    }

    pub fn with_score(mut self, score: f64) -> Self {
        self.score = Some(score);
        self
    }

    pub fn points(&self) -> &[Landmark; LANDMARK_COUNT] {
        &self.points
    }

    pub fn score(&self) -> Option<f64> {
        self.score
    }

    pub fn get(&self, index: usize) -> &Landmark {
        &self.points[index]
    }

    /// Same hand seen in a horizontally mirrored frame of width `frame_width`.
    pub fn mirrored(&self, frame_width: f64) -> Self {
        let mut points = self.points;
        for p in points.iter_mut() {
            p.x = frame_width - p.x;
        }
        Self {
            points,
            score: self.score,
        }
    }
}
