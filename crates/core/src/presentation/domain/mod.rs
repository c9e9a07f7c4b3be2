pub mod render_surface;
pub mod speech_output;
pub mod status_display;
