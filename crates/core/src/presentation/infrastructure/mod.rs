pub mod command_speech_output;
pub mod frame_overlay_surface;
pub mod log_speech_output;
pub mod log_status_display;
