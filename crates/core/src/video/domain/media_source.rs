use crate::shared::frame::Frame;
use crate::shared::stream_metadata::StreamMetadata;

/// Where frames come from: a camera, a video file, still images.
///
/// `acquire_stream` is the startup step: it fails if the device or file
/// cannot be opened and returns once frame dimensions are known. After that,
/// `next_frame` is pulled once per tick; `None` means the stream has ended.
pub trait MediaSource: Send {
    fn acquire_stream(&mut self) -> Result<StreamMetadata, Box<dyn std::error::Error>>;

    fn next_frame(&mut self) -> Option<Result<Frame, Box<dyn std::error::Error>>>;

    /// Releases the underlying device or file.
    fn close(&mut self) {}
}
