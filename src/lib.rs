//! Duet - a two-dot rotation arcade game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (pool, spawner, obstacles, player, state machine)
//! - `config`: Data-driven game and obstacle configuration
//! - `renderer`: WebGPU rendering pipeline
//! - `platform`: Input collapse and browser/native differences
//! - `persistence`: Key/value storage backends
//! - `ui`: Panel visibility and button actions

pub mod audio;
pub mod config;
pub mod highscores;
pub mod persistence;
pub mod platform;
pub mod renderer;
pub mod settings;
pub mod sim;
pub mod ui;

pub use config::{GameConfig, ObstacleConfig, Resources};
pub use highscores::HighScore;
pub use settings::Settings;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (120 Hz for smooth physics)
    pub const SIM_DT: f32 = 1.0 / 120.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Number of horizontal spawn lanes
    pub const LANE_COUNT: usize = 3;

    /// Pool key used when an obstacle config has no id
    pub const DEFAULT_POOL_KEY: &str = "Obstacle";
}

/// Normalize an angle in degrees to [-180, 180)
#[inline]
pub fn normalize_degrees(mut angle: f32) -> f32 {
    while angle >= 180.0 {
        angle -= 360.0;
    }
    while angle < -180.0 {
        angle += 360.0;
    }
    angle
}

/// Interpolate between two angles (degrees) along the shortest arc
#[inline]
pub fn lerp_angle(from: f32, to: f32, t: f32) -> f32 {
    let delta = normalize_degrees(to - from);
    from + delta * t.clamp(0.0, 1.0)
}

/// Rotate a vector by an angle in degrees (counter-clockwise positive)
#[inline]
pub fn rotate_degrees(v: Vec2, degrees: f32) -> Vec2 {
    Vec2::from_angle(degrees.to_radians()).rotate(v)
}

/// Ease-out cubic: fast start, gentle landing
#[inline]
pub fn ease_out_cubic(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    1.0 - (1.0 - t).powi(3)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_degrees() {
        assert!((normalize_degrees(190.0) - (-170.0)).abs() < 1e-4);
        assert!((normalize_degrees(-540.0) - (-180.0)).abs() < 1e-4);
        assert!((normalize_degrees(45.0) - 45.0).abs() < 1e-4);
    }

    #[test]
    fn test_lerp_angle_takes_short_way() {
        // 350 -> 10 should pass through 0, not 180
        let mid = normalize_degrees(lerp_angle(350.0, 10.0, 0.5));
        assert!(mid.abs() < 1e-3);
    }

    #[test]
    fn test_rotate_degrees() {
        let v = rotate_degrees(Vec2::X, 90.0);
        assert!(v.x.abs() < 1e-5);
        assert!((v.y - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_ease_out_cubic_endpoints() {
        assert_eq!(ease_out_cubic(0.0), 0.0);
        assert_eq!(ease_out_cubic(1.0), 1.0);
        assert!(ease_out_cubic(0.5) > 0.5);
    }
}
