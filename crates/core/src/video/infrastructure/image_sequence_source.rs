use std::path::{Path, PathBuf};

use crate::shared::constants::IMAGE_EXTENSIONS;
use crate::shared::frame::Frame;
use crate::shared::stream_metadata::StreamMetadata;
use crate::video::domain::media_source::MediaSource;

/// Still images played back as a stream: one file, or every image in a
/// directory in file-name order.
///
/// All frames are delivered at the first image's resolution; later images of
/// a different size are resized to match.
pub struct ImageSequenceSource {
    path: PathBuf,
    fps: f64,
    looping: bool,
    files: Vec<PathBuf>,
    size: Option<(u32, u32)>,
    position: usize,
    frame_index: usize,
}

impl ImageSequenceSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            fps: 0.0,
            looping: false,
            files: Vec::new(),
            size: None,
            position: 0,
            frame_index: 0,
        }
    }

    /// Rate reported in the stream metadata. 0 leaves pacing to the caller.
    pub fn with_fps(mut self, fps: f64) -> Self {
        self.fps = fps;
        self
    }

    /// Start over from the first image instead of ending the stream.
    pub fn looping(mut self, looping: bool) -> Self {
        self.looping = looping;
        self
    }

    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    fn load(&self, path: &Path) -> Result<Frame, Box<dyn std::error::Error>> {
        let mut img = image::open(path)?.to_rgb8();
        if let Some((w, h)) = self.size {
            if img.dimensions() != (w, h) {
                img = image::imageops::resize(&img, w, h, image::imageops::FilterType::Triangle);
            }
        }
        let (w, h) = img.dimensions();
        Ok(Frame::new(img.into_raw(), w, h, self.frame_index))
    }
}

pub fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

fn list_images(path: &Path) -> Result<Vec<PathBuf>, Box<dyn std::error::Error>> {
    if path.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }
    if !path.is_dir() {
        return Err(format!("Input not found: {}", path.display()).into());
    }
    let mut files: Vec<PathBuf> = std::fs::read_dir(path)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.is_file() && is_image(p))
        .collect();
    files.sort();
    Ok(files)
}

impl MediaSource for ImageSequenceSource {
    fn acquire_stream(&mut self) -> Result<StreamMetadata, Box<dyn std::error::Error>> {
        let files = list_images(&self.path)?;
        let first = files
            .first()
            .ok_or_else(|| format!("No images found in {}", self.path.display()))?;
        let (width, height) = image::image_dimensions(first)?;

        self.size = Some((width, height));
        self.files = files;
        self.position = 0;
        self.frame_index = 0;

        log::info!(
            "Opened {} image(s) from {}: {width}x{height}",
            self.files.len(),
            self.path.display()
        );
        Ok(StreamMetadata {
            width,
            height,
            fps: self.fps,
            source_path: Some(self.path.clone()),
        })
    }

    fn next_frame(&mut self) -> Option<Result<Frame, Box<dyn std::error::Error>>> {
        if self.size.is_none() {
            return Some(Err("ImageSequenceSource: stream not acquired".into()));
        }
        if self.position >= self.files.len() {
            if !self.looping || self.files.is_empty() {
                return None;
            }
            self.position = 0;
        }

        let path = self.files[self.position].clone();
        self.position += 1;
        let result = self.load(&path);
        self.frame_index += 1;
        Some(result)
    }

    fn close(&mut self) {
        self.files.clear();
        self.size = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_image(dir: &Path, name: &str, w: u32, h: u32, rgb: [u8; 3]) -> PathBuf {
        let path = dir.join(name);
        let mut img = image::RgbImage::new(w, h);
        for pixel in img.pixels_mut() {
            *pixel = image::Rgb(rgb);
        }
        img.save(&path).unwrap();
        path
    }

    #[test]
    fn test_single_file_yields_one_frame() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_image(dir.path(), "hand.png", 40, 30, [10, 20, 30]);

        let mut source = ImageSequenceSource::new(&path).with_fps(15.0);
        let metadata = source.acquire_stream().unwrap();
        assert_eq!((metadata.width, metadata.height), (40, 30));
        assert_eq!(metadata.fps, 15.0);

        let frame = source.next_frame().unwrap().unwrap();
        assert_eq!(frame.pixel(0, 0), Some([10, 20, 30]));
        assert!(source.next_frame().is_none());
    }

    #[test]
    fn test_directory_in_name_order_skipping_non_images() {
        let dir = tempfile::tempdir().unwrap();
        write_image(dir.path(), "b.png", 8, 8, [2, 2, 2]);
        write_image(dir.path(), "a.png", 8, 8, [1, 1, 1]);
        std::fs::write(dir.path().join("notes.txt"), "not an image").unwrap();

        let mut source = ImageSequenceSource::new(dir.path());
        source.acquire_stream().unwrap();
        assert_eq!(source.files().len(), 2);

        let first = source.next_frame().unwrap().unwrap();
        let second = source.next_frame().unwrap().unwrap();
        assert_eq!(first.pixel(0, 0), Some([1, 1, 1]));
        assert_eq!((first.index(), second.index()), (0, 1));
        assert_eq!(second.pixel(0, 0), Some([2, 2, 2]));
        assert!(source.next_frame().is_none());
    }

    #[test]
    fn test_looping_wraps_and_keeps_counting() {
        let dir = tempfile::tempdir().unwrap();
        write_image(dir.path(), "only.png", 4, 4, [9, 9, 9]);

        let mut source = ImageSequenceSource::new(dir.path()).looping(true);
        source.acquire_stream().unwrap();
        let indices: Vec<usize> = (0..3)
            .map(|_| source.next_frame().unwrap().unwrap().index())
            .collect();
        assert_eq!(indices, vec![0, 1, 2]);
    }

    #[test]
    fn test_mismatched_sizes_are_resized_to_first() {
        let dir = tempfile::tempdir().unwrap();
        write_image(dir.path(), "0.png", 16, 12, [0, 0, 0]);
        write_image(dir.path(), "1.png", 32, 24, [0, 0, 0]);

        let mut source = ImageSequenceSource::new(dir.path());
        source.acquire_stream().unwrap();
        source.next_frame();
        let resized = source.next_frame().unwrap().unwrap();
        assert_eq!((resized.width(), resized.height()), (16, 12));
    }

    #[test]
    fn test_empty_directory_fails_to_acquire() {
        let dir = tempfile::tempdir().unwrap();
        let mut source = ImageSequenceSource::new(dir.path());
        assert!(source.acquire_stream().is_err());
    }

    #[test]
    fn test_missing_path_fails_to_acquire() {
        let dir = tempfile::tempdir().unwrap();
        let mut source = ImageSequenceSource::new(dir.path().join("nope"));
        assert!(source.acquire_stream().is_err());
    }

    #[test]
    fn test_next_frame_before_acquire_is_error() {
        let mut source = ImageSequenceSource::new("anything");
        assert!(matches!(source.next_frame(), Some(Err(_))));
    }

    #[test]
    fn test_is_image_case_insensitive() {
        assert!(is_image(Path::new("a/B.JPG")));
        assert!(is_image(Path::new("x.webp")));
        assert!(!is_image(Path::new("clip.mp4")));
        assert!(!is_image(Path::new("noext")));
    }
}
