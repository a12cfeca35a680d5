//! Valor Arena - real-time combat core for a 2D tournament fighter
//!
//! Core modules:
//! - `sim`: Deterministic round simulation (physics, combat, match state)
//! - `tuning`: Data-driven game balance
//! - `ledger`: Tournament ledger shared between rounds of a session
//! - `session`: Explicit session context that starts and records rounds
//! - `audio`: Abstract cue sink the core reports sounds to
//! - `platform`: Browser/native logging setup

pub mod audio;
pub mod error;
pub mod ledger;
pub mod platform;
pub mod session;
pub mod sim;
pub mod tuning;

#[cfg(target_arch = "wasm32")]
pub mod web;

pub use error::{ConfigError, SessionError};
pub use ledger::Ledger;
pub use session::Session;
pub use tuning::Tuning;

/// Game configuration constants
pub mod consts {
    /// Logical screen size the arena layouts are authored against
    pub const SCREEN_WIDTH: f32 = 1280.0;
    pub const SCREEN_HEIGHT: f32 = 720.0;

    /// Fighter body size
    pub const FIGHTER_WIDTH: f32 = 30.0;
    pub const FIGHTER_HEIGHT: f32 = 50.0;

    /// Frame length assumed by the movement look-ahead (60 Hz)
    pub const LOOKAHEAD_DT: f32 = 1.0 / 60.0;

    /// Platform slab thickness
    pub const PLATFORM_THICKNESS: f32 = 25.0;
}

/// Count a millisecond timer down toward zero
#[inline]
pub fn decay_ms(timer: &mut f32, dt_ms: f32) {
    *timer = (*timer - dt_ms).max(0.0);
}

/// Quadratic ease-out over t in [0, 1]
#[inline]
pub fn ease_out_quad(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    1.0 - (1.0 - t) * (1.0 - t)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decay_ms_stops_at_zero() {
        let mut t = 120.0;
        decay_ms(&mut t, 100.0);
        assert!((t - 20.0).abs() < 0.001);
        decay_ms(&mut t, 100.0);
        assert_eq!(t, 0.0);
    }

    #[test]
    fn test_ease_out_quad_endpoints() {
        assert_eq!(ease_out_quad(0.0), 0.0);
        assert_eq!(ease_out_quad(1.0), 1.0);
        assert!(ease_out_quad(0.5) > 0.5);
    }
}
