use crate::shared::frame::Frame;

/// 2D overlay drawn on top of the live video.
///
/// Sized to the stream's native resolution at startup. The loop clears it,
/// draws the tick's markers, then presents it against the frame being shown.
pub trait RenderSurface: Send {
    fn resize(&mut self, width: u32, height: u32);

    fn clear(&mut self);

    fn fill_circle(&mut self, x: f64, y: f64, radius: u32, color: [u8; 3]);

    /// Called once per tick after drawing. Default: nothing to flush.
    fn present(&mut self, _frame: &Frame) -> Result<(), Box<dyn std::error::Error>> {
        Ok(())
    }
}
