pub mod frame_loop;
pub mod frame_scheduler;
pub mod loop_logger;
pub mod start_session_use_case;
pub mod startup_error;
