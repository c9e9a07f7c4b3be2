use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

/// Longest single sleep while waiting, so cancellation is noticed promptly.
const WAIT_SLICE: Duration = Duration::from_millis(5);

/// Decides when the next tick may start.
pub trait FrameScheduler: Send {
    /// Blocks until the next tick is due. Returns `false` if `cancelled`
    /// was set while waiting.
    fn wait_next(&mut self, cancelled: &AtomicBool) -> bool;
}

/// Never waits. For offline files and tests.
pub struct ImmediateScheduler;

impl FrameScheduler for ImmediateScheduler {
    fn wait_next(&mut self, cancelled: &AtomicBool) -> bool {
        !cancelled.load(Ordering::Relaxed)
    }
}

/// Paces ticks at a fixed rate measured from the start of the previous tick.
///
/// A tick that overruns its interval makes the next one start at once; ticks
/// are never skipped or run in parallel.
pub struct FixedRateScheduler {
    interval: Duration,
    last_start: Option<Instant>,
}

impl FixedRateScheduler {
    pub fn new(fps: f64) -> Self {
        let interval = if fps.is_finite() && fps > 0.0 {
            Duration::from_secs_f64(1.0 / fps)
        } else {
            Duration::ZERO
        };
        Self {
            interval,
            last_start: None,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }
}

impl FrameScheduler for FixedRateScheduler {
    fn wait_next(&mut self, cancelled: &AtomicBool) -> bool {
        if let Some(last) = self.last_start {
            let deadline = last + self.interval;
            loop {
                if cancelled.load(Ordering::Relaxed) {
                    return false;
                }
                let now = Instant::now();
                if now >= deadline {
                    break;
                }
                std::thread::sleep((deadline - now).min(WAIT_SLICE));
            }
        }
        if cancelled.load(Ordering::Relaxed) {
            return false;
        }
        self.last_start = Some(Instant::now());
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_immediate_honors_cancellation() {
        let cancelled = AtomicBool::new(false);
        assert!(ImmediateScheduler.wait_next(&cancelled));
        cancelled.store(true, Ordering::Relaxed);
        assert!(!ImmediateScheduler.wait_next(&cancelled));
    }

    #[test]
    fn test_fixed_rate_interval_from_fps() {
        assert_eq!(FixedRateScheduler::new(50.0).interval(), Duration::from_millis(20));
        assert_eq!(FixedRateScheduler::new(0.0).interval(), Duration::ZERO);
        assert_eq!(FixedRateScheduler::new(f64::NAN).interval(), Duration::ZERO);
    }

    #[test]
    fn test_fixed_rate_first_tick_is_immediate() {
        let mut scheduler = FixedRateScheduler::new(1.0);
        let start = Instant::now();
        assert!(scheduler.wait_next(&AtomicBool::new(false)));
        assert!(start.elapsed() < Duration::from_millis(500));
    }

    #[test]
    fn test_fixed_rate_waits_out_the_interval() {
        let mut scheduler = FixedRateScheduler::new(20.0);
        let cancelled = AtomicBool::new(false);
        scheduler.wait_next(&cancelled);
        let start = Instant::now();
        assert!(scheduler.wait_next(&cancelled));
        assert!(start.elapsed() >= Duration::from_millis(40));
    }

    #[test]
    fn test_fixed_rate_overrun_does_not_wait() {
        let mut scheduler = FixedRateScheduler::new(100.0);
        let cancelled = AtomicBool::new(false);
        scheduler.wait_next(&cancelled);
        std::thread::sleep(Duration::from_millis(30));
        let start = Instant::now();
        assert!(scheduler.wait_next(&cancelled));
        assert!(start.elapsed() < Duration::from_millis(10));
    }

    #[test]
    fn test_fixed_rate_cancel_interrupts_wait() {
        let mut scheduler = FixedRateScheduler::new(0.5);
        let cancelled = Arc::new(AtomicBool::new(false));
        scheduler.wait_next(&cancelled);

        let flag = cancelled.clone();
        let canceller = std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(20));
            flag.store(true, Ordering::Relaxed);
        });

        let start = Instant::now();
        assert!(!scheduler.wait_next(&cancelled));
        assert!(start.elapsed() < Duration::from_secs(1));
        canceller.join().unwrap();
    }
}
