pub mod detection;
pub mod gesture;
pub mod pipeline;
pub mod presentation;
pub mod shared;
pub mod video;
