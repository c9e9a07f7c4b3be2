/// Hand landmark model run with ONNX Runtime via `ort`.
///
/// Expects a MediaPipe-style landmark network: one square RGB image input
/// and at least two outputs, the 21×3 landmark coordinates in input pixel
/// space followed by a hand-presence score. The whole frame is fed to the
/// model, so it suits close-up single-hand video.
use std::path::Path;

use crate::detection::domain::hand_landmarks::{HandObservation, Landmark};
use crate::detection::domain::landmark_source::{EstimateOptions, LandmarkSource};
use crate::shared::constants::LANDMARK_COUNT;
use crate::shared::frame::Frame;

use super::execution_provider::preferred_execution_providers;

/// Input resolution when the model's input shape is dynamic.
const DEFAULT_INPUT_SIZE: u32 = 224;

/// Default minimum hand-presence score.
pub const DEFAULT_CONFIDENCE: f64 = 0.5;

/// Values per landmark in the model output (x, y, z).
const VALUES_PER_LANDMARK: usize = 3;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TensorLayout {
    /// `[1, 3, H, W]`
    Nchw,
    /// `[1, H, W, 3]`, the layout of models converted from TFLite.
    Nhwc,
}

pub struct OnnxHandLandmarkDetector {
    session: ort::session::Session,
    input_size: u32,
    layout: TensorLayout,
    min_confidence: f64,
    max_hands: usize,
}

impl OnnxHandLandmarkDetector {
    /// Load a landmark model. Layout and resolution come from the model's
    /// input shape when it is static.
    pub fn new(
        model_path: &Path,
        min_confidence: f64,
        max_hands: usize,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let session = ort::session::Session::builder()?
            .with_execution_providers(preferred_execution_providers())?
            .commit_from_file(model_path)?;

        let (layout, input_size) = session
            .inputs()
            .first()
            .and_then(|input| {
                if let ort::value::ValueType::Tensor { ref shape, .. } = input.dtype() {
                    let dims: Vec<i64> = (0..shape.len()).map(|i| shape[i]).collect();
                    infer_layout(&dims)
                } else {
                    None
                }
            })
            .unwrap_or((TensorLayout::Nhwc, DEFAULT_INPUT_SIZE));

        log::info!(
            "Loaded hand landmark model {} ({layout:?}, {input_size}px)",
            model_path.display()
        );

        Ok(Self {
            session,
            input_size,
            layout,
            min_confidence,
            max_hands,
        })
    }
}

impl LandmarkSource for OnnxHandLandmarkDetector {
    fn estimate_hands(
        &mut self,
        frame: &Frame,
        options: EstimateOptions,
    ) -> Result<Vec<HandObservation>, Box<dyn std::error::Error>> {
        if self.max_hands == 0 {
            return Ok(Vec::new());
        }

        let flipped;
        let input = if options.flip_horizontal {
            flipped = frame.flipped_horizontal();
            &flipped
        } else {
            frame
        };

        let tensor = preprocess(input, self.input_size, self.layout);
        let input_value = ort::value::Tensor::from_array(tensor)?;
        let outputs = self.session.run(ort::inputs![input_value])?;
        if outputs.len() < 2 {
            return Err(format!(
                "Hand landmark model expected 2 outputs, got {}",
                outputs.len()
            )
            .into());
        }

        let landmarks = outputs[0].try_extract_array::<f32>()?;
        let presence = outputs[1].try_extract_array::<f32>()?;
        let coords = landmarks.as_slice().ok_or("Cannot get landmark slice")?;
        let raw_score = *presence
            .as_slice()
            .and_then(|s| s.first())
            .ok_or("Empty hand presence output")?;

        let score = presence_score(raw_score);
        if score < self.min_confidence {
            return Ok(Vec::new());
        }

        let points = decode_landmarks(coords, self.input_size, frame.width(), frame.height())?;
        let hand = HandObservation::from_points(&points)?.with_score(score);
        Ok(vec![hand])
    }
}

/// Reads `(layout, size)` from a 4-D input shape with 3 channels.
fn infer_layout(shape: &[i64]) -> Option<(TensorLayout, u32)> {
    if shape.len() != 4 {
        return None;
    }
    if shape[1] == 3 && shape[2] > 0 {
        Some((TensorLayout::Nchw, shape[2] as u32))
    } else if shape[3] == 3 && shape[1] > 0 {
        Some((TensorLayout::Nhwc, shape[1] as u32))
    } else {
        None
    }
}

/// Some exports emit a logit, others a probability.
fn presence_score(raw: f32) -> f64 {
    let raw = raw as f64;
    if (0.0..=1.0).contains(&raw) {
        raw
    } else {
        1.0 / (1.0 + (-raw).exp())
    }
}

/// Maps model-space coordinates back to frame pixels.
fn decode_landmarks(
    coords: &[f32],
    input_size: u32,
    frame_width: u32,
    frame_height: u32,
) -> Result<Vec<Landmark>, Box<dyn std::error::Error>> {
    let needed = LANDMARK_COUNT * VALUES_PER_LANDMARK;
    if coords.len() < needed {
        return Err(format!(
            "Hand landmark output has {} values, expected {needed}",
            coords.len()
        )
        .into());
    }

    let sx = frame_width as f64 / input_size as f64;
    let sy = frame_height as f64 / input_size as f64;
    Ok(coords[..needed]
        .chunks_exact(VALUES_PER_LANDMARK)
        .map(|v| Landmark::with_z(v[0] as f64 * sx, v[1] as f64 * sy, v[2] as f64))
        .collect())
}

/// Resize to `size × size` (nearest neighbour) and normalize to [0,1].
fn preprocess(frame: &Frame, size: u32, layout: TensorLayout) -> ndarray::Array4<f32> {
    let src = frame.as_ndarray();
    let src_h = frame.height() as usize;
    let src_w = frame.width() as usize;
    let s = size as usize;

    let mut tensor = match layout {
        TensorLayout::Nchw => ndarray::Array4::<f32>::zeros((1, 3, s, s)),
        TensorLayout::Nhwc => ndarray::Array4::<f32>::zeros((1, s, s, 3)),
    };
    if src_h == 0 || src_w == 0 {
        return tensor;
    }

    for y in 0..s {
        let src_y = (((y as f64 + 0.5) * src_h as f64 / s as f64) as usize).min(src_h - 1);
        for x in 0..s {
            let src_x = (((x as f64 + 0.5) * src_w as f64 / s as f64) as usize).min(src_w - 1);
            for c in 0..3 {
                let v = src[[src_y, src_x, c]] as f32 / 255.0;
                match layout {
                    TensorLayout::Nchw => tensor[[0, c, y, x]] = v,
                    TensorLayout::Nhwc => tensor[[0, y, x, c]] = v,
                }
            }
        }
    }

    tensor
}
