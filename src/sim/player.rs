//! Player pivot with two orbiting dots

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::config::GameConfig;
use crate::{normalize_degrees, rotate_degrees};

/// The rotating pivot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub pos: Vec2,
    /// Degrees, counter-clockwise
    pub rotation: f32,
    /// Uniform scale
    pub scale: f32,
    /// Degrees/sec
    pub angular_vel: f32,
    /// Input controller (torque) enabled
    pub controller_enabled: bool,
    /// Menu idle spin enabled
    pub auto_rotate: bool,
    pub dot_distance: f32,
    pub dot_radius: f32,
}

impl Player {
    /// Player in its menu pose
    pub fn new(cfg: &GameConfig) -> Self {
        Self {
            pos: cfg.menu_player_position,
            rotation: 0.0,
            scale: cfg.menu_player_scale,
            angular_vel: 0.0,
            controller_enabled: false,
            auto_rotate: true,
            dot_distance: cfg.dot_distance,
            dot_radius: cfg.dot_radius,
        }
    }

    /// World positions of the two dots
    pub fn dots(&self) -> [Vec2; 2] {
        let arm = rotate_degrees(Vec2::new(self.dot_distance * self.scale, 0.0), self.rotation);
        [self.pos - arm, self.pos + arm]
    }

    /// World radius of each dot
    pub fn dot_world_radius(&self) -> f32 {
        self.dot_radius * self.scale
    }

    /// Menu idle spin (clockwise)
    pub fn auto_rotate_step(&mut self, speed: f32, dt: f32) {
        if self.auto_rotate {
            self.rotation = normalize_degrees(self.rotation - speed * dt);
        }
    }

    /// Torque controller: `direction` is -1 (left), 0, or +1 (right).
    /// Left input turns counter-clockwise.
    pub fn torque_step(&mut self, direction: i8, cfg: &GameConfig, dt: f32) {
        if !self.controller_enabled {
            return;
        }
        if direction != 0 {
            self.angular_vel += -(direction as f32) * cfg.torque_force * dt;
        }
        self.angular_vel /= 1.0 + cfg.angular_drag * dt;
        self.angular_vel = self
            .angular_vel
            .clamp(-cfg.max_angular_velocity, cfg.max_angular_velocity);
        self.rotation = normalize_degrees(self.rotation + self.angular_vel * dt);
    }

    /// Stop spinning
    pub fn halt(&mut self) {
        self.angular_vel = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dots_are_symmetric() {
        let cfg = GameConfig::default();
        let mut p = Player::new(&cfg);
        p.pos = Vec2::new(0.0, -3.5);
        p.scale = 1.0;
        let [a, b] = p.dots();
        assert!(((a + b) * 0.5 - p.pos).length() < 1e-5);
        assert!(((b - a).length() - 2.0 * cfg.dot_distance).abs() < 1e-5);
    }

    #[test]
    fn test_controller_disabled_ignores_input() {
        let cfg = GameConfig::default();
        let mut p = Player::new(&cfg);
        p.torque_step(1, &cfg, 0.1);
        assert_eq!(p.rotation, 0.0);
        assert_eq!(p.angular_vel, 0.0);
    }

    #[test]
    fn test_left_input_turns_counter_clockwise() {
        let cfg = GameConfig::default();
        let mut p = Player::new(&cfg);
        p.controller_enabled = true;
        p.torque_step(-1, &cfg, 0.05);
        assert!(p.angular_vel > 0.0);
        assert!(p.rotation > 0.0);
    }

    #[test]
    fn test_angular_velocity_clamped() {
        let cfg = GameConfig::default();
        let mut p = Player::new(&cfg);
        p.controller_enabled = true;
        for _ in 0..500 {
            p.torque_step(1, &cfg, 1.0 / 120.0);
        }
        assert!(p.angular_vel >= -cfg.max_angular_velocity);
        assert!((p.angular_vel + cfg.max_angular_velocity).abs() < 1.0);
    }

    #[test]
    fn test_drag_slows_without_input() {
        let cfg = GameConfig::default();
        let mut p = Player::new(&cfg);
        p.controller_enabled = true;
        p.angular_vel = 200.0;
        p.torque_step(0, &cfg, 0.1);
        assert!(p.angular_vel < 200.0 && p.angular_vel > 0.0);
    }

    #[test]
    fn test_auto_rotate_clockwise() {
        let cfg = GameConfig::default();
        let mut p = Player::new(&cfg);
        p.auto_rotate_step(120.0, 0.5);
        assert!((p.rotation - (-60.0)).abs() < 1e-4);
        p.auto_rotate = false;
        p.auto_rotate_step(120.0, 0.5);
        assert!((p.rotation - (-60.0)).abs() < 1e-4);
    }
}
