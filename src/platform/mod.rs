//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Logger and panic hook setup
//! - Turning host timestamps into frame deltas

/// Longest frame the simulation will be asked to step (a hidden tab resumes at this)
pub const MAX_FRAME_MS: f32 = 100.0;

/// Install the logger for the current target. Safe to call more than once.
#[cfg(target_arch = "wasm32")]
pub fn init_logging() {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Info).is_err() {
        log::debug!("Logger already installed");
    }
}

/// Install the logger for the current target. Safe to call more than once.
#[cfg(not(target_arch = "wasm32"))]
pub fn init_logging() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .try_init();
}

/// Converts animation-frame timestamps into clamped millisecond deltas
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameClock {
    last_ms: Option<f64>,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delta since the previous call; the first call yields zero
    pub fn delta(&mut self, now_ms: f64) -> f32 {
        let dt = match self.last_ms {
            Some(last) if now_ms > last => (now_ms - last) as f32,
            _ => 0.0,
        };
        self.last_ms = Some(now_ms);
        dt.min(MAX_FRAME_MS)
    }

    /// Forget the last timestamp, e.g. after the page was hidden
    pub fn reset(&mut self) {
        self.last_ms = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_frame_is_zero() {
        let mut clock = FrameClock::new();
        assert_eq!(clock.delta(1234.0), 0.0);
        assert!((clock.delta(1250.5) - 16.5).abs() < 0.001);
    }

    #[test]
    fn test_long_gap_is_clamped() {
        let mut clock = FrameClock::new();
        clock.delta(0.0);
        assert_eq!(clock.delta(5000.0), MAX_FRAME_MS);
    }

    #[test]
    fn test_time_going_backwards() {
        let mut clock = FrameClock::new();
        clock.delta(100.0);
        assert_eq!(clock.delta(50.0), 0.0);
        clock.reset();
        assert_eq!(clock.delta(500.0), 0.0);
    }

    #[test]
    fn test_init_logging_twice() {
        init_logging();
        init_logging();
    }
}
