use std::path::PathBuf;

use crate::presentation::domain::render_surface::RenderSurface;
use crate::shared::frame::Frame;
use crate::video::domain::image_writer::ImageWriter;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Marker {
    pub x: f64,
    pub y: f64,
    pub radius: u32,
    pub color: [u8; 3],
}

/// Overlay kept as a draw list and rasterized onto the video frame on present.
///
/// With an output directory, every presented tick is written as
/// `<dir>/<frame index>.png`; without one, presenting only keeps the
/// latest composite in memory.
pub struct FrameOverlaySurface {
    width: u32,
    height: u32,
    markers: Vec<Marker>,
    output: Option<(Box<dyn ImageWriter>, PathBuf)>,
    last_composite: Option<Frame>,
}

impl FrameOverlaySurface {
    pub fn new() -> Self {
        Self {
            width: 0,
            height: 0,
            markers: Vec::new(),
            output: None,
            last_composite: None,
        }
    }

    pub fn with_output(mut self, writer: Box<dyn ImageWriter>, dir: PathBuf) -> Self {
        self.output = Some((writer, dir));
        self
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    pub fn last_composite(&self) -> Option<&Frame> {
        self.last_composite.as_ref()
    }

    /// Draws the current markers onto a copy of `frame`.
    ///
    /// Marker coordinates are in surface space and scaled when the frame
    /// has a different resolution.
    pub fn composite(&self, frame: &Frame) -> Frame {
        let mut out = frame.clone();
        let sx = scale(frame.width(), self.width);
        let sy = scale(frame.height(), self.height);
        for m in &self.markers {
            fill_disc(&mut out, m.x * sx, m.y * sy, m.radius, m.color);
        }
        out
    }
}

impl Default for FrameOverlaySurface {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderSurface for FrameOverlaySurface {
    fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.markers.clear();
    }

    fn clear(&mut self) {
        self.markers.clear();
    }

    fn fill_circle(&mut self, x: f64, y: f64, radius: u32, color: [u8; 3]) {
        self.markers.push(Marker {
            x,
            y,
            radius,
            color,
        });
    }

    fn present(&mut self, frame: &Frame) -> Result<(), Box<dyn std::error::Error>> {
        let composite = self.composite(frame);
        if let Some((writer, dir)) = &self.output {
            let path = dir.join(format!("{:06}.png", frame.index()));
            writer.write(&path, &composite)?;
        }
        self.last_composite = Some(composite);
        Ok(())
    }
}

fn scale(frame_dim: u32, surface_dim: u32) -> f64 {
    if surface_dim == 0 {
        1.0
    } else {
        frame_dim as f64 / surface_dim as f64
    }
}

/// Filled disc centered on the nearest pixel; clipped at frame edges.
fn fill_disc(frame: &mut Frame, cx: f64, cy: f64, radius: u32, color: [u8; 3]) {
    if !cx.is_finite() || !cy.is_finite() {
        return;
    }
    let cx = cx.round() as i64;
    let cy = cy.round() as i64;
    let r = radius as i64;
    let r_sq = r * r;

    for dy in -r..=r {
        let y = cy + dy;
        if y < 0 || y >= frame.height() as i64 {
            continue;
        }
        for dx in -r..=r {
            let x = cx + dx;
            if x < 0 || x >= frame.width() as i64 || dx * dx + dy * dy > r_sq {
                continue;
            }
            frame.set_pixel(x as u32, y as u32, color);
        }
    }
}
