pub mod image_writer;
pub mod media_source;
