use std::path::PathBuf;

use crate::shared::frame::Frame;
use crate::shared::stream_metadata::StreamMetadata;
use crate::video::domain::media_source::MediaSource;

/// libavdevice input format used for cameras on this platform.
#[cfg(target_os = "macos")]
pub const CAPTURE_FORMAT: &str = "avfoundation";
#[cfg(target_os = "windows")]
pub const CAPTURE_FORMAT: &str = "dshow";
#[cfg(not(any(target_os = "macos", target_os = "windows")))]
pub const CAPTURE_FORMAT: &str = "v4l2";

/// What to open: a media file, or a capture device in [`CAPTURE_FORMAT`]
/// naming (`/dev/video0`, `0`, `video=Integrated Camera`).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CaptureTarget {
    File(PathBuf),
    Device(String),
}

/// Camera or video file decoded with ffmpeg-next, one RGB24 frame per pull.
pub struct FfmpegMediaSource {
    target: CaptureTarget,
    decoding: Option<Decoding>,
}

// Safety: FfmpegMediaSource is only used from a single thread at a time.
// The raw pointers inside ffmpeg types are not shared across threads.
unsafe impl Send for FfmpegMediaSource {}

impl FfmpegMediaSource {
    pub fn new(target: CaptureTarget) -> Self {
        Self {
            target,
            decoding: None,
        }
    }

    pub fn target(&self) -> &CaptureTarget {
        &self.target
    }

    fn open_input(
        &self,
    ) -> Result<ffmpeg_next::format::context::Input, Box<dyn std::error::Error>> {
        match &self.target {
            CaptureTarget::File(path) => Ok(ffmpeg_next::format::input(path)?),
            CaptureTarget::Device(device) => {
                ffmpeg_next::device::register_all();
                let format = ffmpeg_next::device::input::video()
                    .find(|f| f.name() == CAPTURE_FORMAT)
                    .ok_or_else(|| format!("capture backend '{CAPTURE_FORMAT}' is not available"))?;
                let ctx = ffmpeg_next::format::open_with(
                    device.as_str(),
                    &ffmpeg_next::format::Format::Input(format),
                    ffmpeg_next::Dictionary::new(),
                )
                .map_err(|e| format!("cannot open camera '{device}': {e}"))?;
                Ok(ctx.input())
            }
        }
    }
}

impl MediaSource for FfmpegMediaSource {
    fn acquire_stream(&mut self) -> Result<StreamMetadata, Box<dyn std::error::Error>> {
        ffmpeg_next::init()?;

        let ictx = self.open_input()?;
        let stream = ictx
            .streams()
            .best(ffmpeg_next::media::Type::Video)
            .ok_or("No video stream found")?;

        let stream_index = stream.index();
        let codec_ctx = ffmpeg_next::codec::context::Context::from_parameters(stream.parameters())?;
        let decoder = codec_ctx.decoder().video()?;

        let rate = stream.rate();
        let fps = if rate.denominator() != 0 {
            rate.numerator() as f64 / rate.denominator() as f64
        } else {
            0.0
        };

        let width = decoder.width();
        let height = decoder.height();
        if width == 0 || height == 0 {
            return Err("Video stream reports no frame size".into());
        }

        let scaler = ffmpeg_next::software::scaling::Context::get(
            decoder.format(),
            width,
            height,
            ffmpeg_next::format::Pixel::RGB24,
            width,
            height,
            ffmpeg_next::software::scaling::Flags::BILINEAR,
        )?;

        let source_path = match &self.target {
            CaptureTarget::File(path) => Some(path.clone()),
            CaptureTarget::Device(_) => None,
        };

        self.decoding = Some(Decoding {
            ictx,
            decoder,
            scaler,
            stream_index,
            width,
            height,
            frame_index: 0,
            flushing: false,
            done: false,
        });

        log::info!("Opened {:?}: {width}x{height} @ {fps:.1} fps", self.target);
        Ok(StreamMetadata {
            width,
            height,
            fps,
            source_path,
        })
    }

    fn next_frame(&mut self) -> Option<Result<Frame, Box<dyn std::error::Error>>> {
        match self.decoding.as_mut() {
            Some(decoding) => decoding.next_frame(),
            None => Some(Err("FfmpegMediaSource: stream not acquired".into())),
        }
    }

    fn close(&mut self) {
        self.decoding = None;
    }
}

/// Open decoder state. Frames are decoded lazily, one packet at a time.
struct Decoding {
    ictx: ffmpeg_next::format::context::Input,
    decoder: ffmpeg_next::decoder::Video,
    scaler: ffmpeg_next::software::scaling::Context,
    stream_index: usize,
    width: u32,
    height: u32,
    frame_index: usize,
    flushing: bool,
    done: bool,
}

impl Decoding {
    fn next_frame(&mut self) -> Option<Result<Frame, Box<dyn std::error::Error>>> {
        if self.done {
            return None;
        }

        if let Some(result) = self.try_receive() {
            return Some(result);
        }

        if self.flushing {
            self.done = true;
            return None;
        }

        loop {
            let Some((stream, packet)) = self.ictx.packets().next() else {
                let _ = self.decoder.send_eof();
                self.flushing = true;
                if let Some(result) = self.try_receive() {
                    return Some(result);
                }
                self.done = true;
                return None;
            };

            if stream.index() != self.stream_index {
                continue;
            }

            if self.decoder.send_packet(&packet).is_err() {
                continue;
            }

            if let Some(result) = self.try_receive() {
                return Some(result);
            }
        }
    }

    fn try_receive(&mut self) -> Option<Result<Frame, Box<dyn std::error::Error>>> {
        let mut decoded = ffmpeg_next::util::frame::video::Video::empty();
        if self.decoder.receive_frame(&mut decoded).is_err() {
            return None;
        }

        let mut rgb_frame = ffmpeg_next::util::frame::video::Video::empty();
        if let Err(e) = self.scaler.run(&decoded, &mut rgb_frame) {
            return Some(Err(Box::new(e)));
        }

        let pixels = extract_rgb_pixels(&rgb_frame, self.width, self.height);
        let frame = Frame::new(pixels, self.width, self.height, self.frame_index);
        self.frame_index += 1;
        Some(Ok(frame))
    }
}

/// Copies packed RGB rows out of a possibly padded ffmpeg plane.
fn extract_rgb_pixels(
    rgb_frame: &ffmpeg_next::util::frame::video::Video,
    width: u32,
    height: u32,
) -> Vec<u8> {
    let stride = rgb_frame.stride(0);
    let data = rgb_frame.data(0);
    let row_len = width as usize * 3;

    let mut pixels = Vec::with_capacity(row_len * height as usize);
    for row in 0..height as usize {
        let start = row * stride;
        pixels.extend_from_slice(&data[start..start + row_len]);
    }
    pixels
}
