//! Animated player moves between the menu pose and the play pose

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::player::Player;
use crate::{ease_out_cubic, lerp_angle, normalize_degrees};

/// Which way the player is travelling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransitionKind {
    /// Menu pose → play pose
    Start,
    /// Play pose → menu pose
    ReturnToMenu,
}

/// An in-flight tween
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transition {
    pub kind: TransitionKind,
    pub elapsed: f32,
    pub duration: f32,
    from_pos: Vec2,
    from_rotation: f32,
    from_scale: f32,
    to_pos: Vec2,
    to_rotation: f32,
    to_scale: f32,
    /// Start only: the menu spin keeps going while it eases out
    spin_speed: f32,
}

impl Transition {
    /// Progress in [0, 1]
    pub fn progress(&self) -> f32 {
        if self.duration <= 0.0 {
            1.0
        } else {
            (self.elapsed / self.duration).clamp(0.0, 1.0)
        }
    }

    fn apply(&self, player: &mut Player) {
        let ease = ease_out_cubic(self.progress());
        player.pos = self.from_pos.lerp(self.to_pos, ease);
        player.scale = self.from_scale + (self.to_scale - self.from_scale) * ease;
        let from = match self.kind {
            TransitionKind::Start => self.from_rotation - self.spin_speed * self.elapsed,
            TransitionKind::ReturnToMenu => self.from_rotation,
        };
        player.rotation = normalize_degrees(lerp_angle(from, self.to_rotation, ease));
    }

    fn finish(&self, player: &mut Player) {
        player.pos = self.to_pos;
        player.rotation = normalize_degrees(self.to_rotation);
        player.scale = self.to_scale;
        match self.kind {
            TransitionKind::Start => {
                player.controller_enabled = true;
                player.auto_rotate = false;
            }
            TransitionKind::ReturnToMenu => {
                player.auto_rotate = true;
            }
        }
    }
}

/// Drives at most one transition at a time
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Transitioner {
    active: Option<Transition>,
}

impl Transitioner {
    pub fn is_transitioning(&self) -> bool {
        self.active.is_some()
    }

    pub fn current(&self) -> Option<&Transition> {
        self.active.as_ref()
    }

    /// Begin the start transition, carrying the menu spin at `spin_speed` deg/s.
    /// Ignored while another is running.
    pub fn start(
        &mut self,
        player: &mut Player,
        target_pos: Vec2,
        target_scale: f32,
        duration: f32,
        spin_speed: f32,
    ) -> bool {
        if self.active.is_some() {
            return false;
        }
        self.begin(
            player,
            TransitionKind::Start,
            target_pos,
            0.0,
            target_scale,
            duration,
            spin_speed,
        )
    }

    /// Begin the return transition. Ignored while another is running.
    pub fn start_return(
        &mut self,
        player: &mut Player,
        menu_pos: Vec2,
        menu_rotation: f32,
        menu_scale: f32,
        duration: f32,
    ) -> bool {
        if self.active.is_some() {
            return false;
        }
        self.begin(
            player,
            TransitionKind::ReturnToMenu,
            menu_pos,
            menu_rotation,
            menu_scale,
            duration,
            0.0,
        )
    }

    #[allow(clippy::too_many_arguments)]
    fn begin(
        &mut self,
        player: &mut Player,
        kind: TransitionKind,
        to_pos: Vec2,
        to_rotation: f32,
        to_scale: f32,
        duration: f32,
        spin_speed: f32,
    ) -> bool {
        player.controller_enabled = false;
        player.auto_rotate = false;
        player.halt();
        log::debug!("{:?} transition over {:.2}s", kind, duration);
        self.active = Some(Transition {
            kind,
            elapsed: 0.0,
            duration: duration.max(0.0),
            from_pos: player.pos,
            from_rotation: player.rotation,
            from_scale: player.scale,
            to_pos,
            to_rotation,
            to_scale,
            spin_speed,
        });
        true
    }

    /// Advance by `dt`. Returns the kind that just completed, if any.
    pub fn step(&mut self, player: &mut Player, dt: f32) -> Option<TransitionKind> {
        let transition = self.active.as_mut()?;
        transition.elapsed += dt;
        if transition.elapsed < transition.duration {
            transition.apply(player);
            return None;
        }
        let transition = self.active.take()?;
        transition.finish(player);
        Some(transition.kind)
    }
}
