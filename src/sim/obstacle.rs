//! Falling obstacles
//!
//! Each obstacle falls at a constant speed, optionally oscillating sideways and
//! spinning about its center. Archetypes with a burst carry a child part that
//! briefly sprints ahead of the parent, then eases back to its speed.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::{BurstConfig, BurstTrigger, ObstacleConfig};
use crate::rotate_degrees;

/// One of the three spawn lanes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Lane {
    Left,
    #[default]
    Center,
    Right,
}

impl Lane {
    pub const ALL: [Lane; 3] = [Lane::Left, Lane::Center, Lane::Right];

    pub fn index(self) -> usize {
        match self {
            Lane::Left => 0,
            Lane::Center => 1,
            Lane::Right => 2,
        }
    }

    /// Lane center x for a view spanning [-half_width, half_width]
    pub fn center_x(self, half_width: f32) -> f32 {
        let region = half_width * 2.0 / 3.0;
        -half_width + region * (self.index() as f32 + 0.5)
    }
}

/// Which degrees of freedom are locked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MotionConstraint {
    /// Spinning obstacles keep their x
    FreezeHorizontal,
    /// Everything else never rotates
    #[default]
    FreezeRotation,
}

impl MotionConstraint {
    pub fn for_config(cfg: &ObstacleConfig) -> Self {
        if cfg.center_rotate {
            MotionConstraint::FreezeHorizontal
        } else {
            MotionConstraint::FreezeRotation
        }
    }
}

/// Burst lifecycle of the child part
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum BurstPhase {
    /// Waiting for the trigger
    #[default]
    Armed,
    /// Sprinting, `remaining` seconds left
    Bursting { remaining: f32 },
    /// Easing back to parent speed, `elapsed` into the rejoin
    Rejoining { elapsed: f32 },
    /// One-shot burst finished
    Spent,
}

/// Child part that bursts ahead
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BurstChild {
    /// Offset from the parent center (world units, negative = below)
    pub offset: f32,
    pub phase: BurstPhase,
    /// Current speed multiplier relative to the parent
    pub multiplier: f32,
}

impl Default for BurstChild {
    fn default() -> Self {
        Self {
            offset: 0.0,
            phase: BurstPhase::Armed,
            multiplier: 1.0,
        }
    }
}

impl BurstChild {
    /// Start the sprint
    pub fn start(&mut self, burst: &BurstConfig) {
        self.phase = BurstPhase::Bursting {
            remaining: burst.duration,
        };
        self.multiplier = burst.multiplier;
    }

    /// Advance the child relative to a parent falling at `fall_speed`
    pub fn step(&mut self, burst: &BurstConfig, fall_speed: f32, dt: f32) {
        match self.phase {
            BurstPhase::Armed | BurstPhase::Spent => return,
            BurstPhase::Bursting { remaining } => {
                let remaining = remaining - dt;
                if remaining > 0.0 {
                    self.phase = BurstPhase::Bursting { remaining };
                } else if burst.rejoin_snap || burst.rejoin_duration <= 0.0 {
                    self.multiplier = 1.0;
                    self.phase = BurstPhase::Spent;
                } else {
                    self.phase = BurstPhase::Rejoining { elapsed: 0.0 };
                }
            }
            BurstPhase::Rejoining { elapsed } => {
                let elapsed = elapsed + dt;
                let t = (elapsed / burst.rejoin_duration).clamp(0.0, 1.0);
                self.multiplier = burst.multiplier + (1.0 - burst.multiplier) * t;
                self.phase = if t >= 1.0 {
                    self.multiplier = 1.0;
                    BurstPhase::Spent
                } else {
                    BurstPhase::Rejoining { elapsed }
                };
            }
        }
        // Extra speed beyond the parent moves the child ahead (down)
        self.offset -= (self.multiplier - 1.0) * fall_speed * dt;
    }
}

/// A pooled obstacle instance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Obstacle {
    /// Pool the instance returns to
    pub pool_key: String,
    pub lane: Lane,
    pub config: ObstacleConfig,
    pub pos: Vec2,
    /// Degrees, counter-clockwise
    pub rotation: f32,
    pub scale: Vec2,
    /// Collider size before scale
    pub collider_size: Vec2,
    pub constraint: MotionConstraint,
    pub fall_speed: f32,
    /// Horizontal anchor and fall start, captured at spawn
    pub base: Vec2,
    pub horizontal_phase: f32,
    pub rotation_sign: f32,
    /// Seconds since spawn
    pub age: f32,
    pub child: Option<BurstChild>,
}

impl Obstacle {
    /// Template instance for a config (the "prefab")
    pub fn template(cfg: &ObstacleConfig) -> Self {
        Self {
            pool_key: cfg.pool_key().to_string(),
            lane: Lane::Center,
            config: cfg.clone(),
            pos: Vec2::ZERO,
            rotation: 0.0,
            scale: Vec2::ONE,
            collider_size: cfg.size,
            constraint: MotionConstraint::for_config(cfg),
            fall_speed: 0.0,
            base: Vec2::ZERO,
            horizontal_phase: 0.0,
            rotation_sign: 1.0,
            age: 0.0,
            child: None,
        }
    }

    /// Reset a (possibly reused) instance for a fresh fall
    pub fn spawn<R: Rng + ?Sized>(
        &mut self,
        cfg: &ObstacleConfig,
        lane: Lane,
        pos: Vec2,
        fall_speed: f32,
        rng: &mut R,
    ) {
        self.pool_key = cfg.pool_key().to_string();
        self.lane = lane;
        self.config = cfg.clone();
        self.pos = pos;
        self.base = pos;
        self.rotation = 0.0;
        self.scale = cfg.local_scale();
        self.collider_size = cfg.collider_size();
        self.constraint = MotionConstraint::for_config(cfg);
        self.fall_speed = fall_speed;
        self.horizontal_phase = rng.random_range(0.0..std::f32::consts::TAU);
        self.rotation_sign = if rng.random_bool(0.5) { 1.0 } else { -1.0 };
        self.age = 0.0;
        self.child = cfg.burst.enabled.then(BurstChild::default);
    }

    /// Advance one step. `time` is the game clock used for oscillation.
    pub fn step(&mut self, dt: f32, time: f32) {
        self.age += dt;
        self.pos.y -= self.fall_speed * dt;

        if self.config.horizontal_move && self.constraint != MotionConstraint::FreezeHorizontal {
            let offset = (time * self.config.horizontal_speed + self.horizontal_phase).sin()
                * self.config.horizontal_amplitude;
            self.pos.x = self.base.x + offset;
        }

        if self.config.center_rotate && self.constraint != MotionConstraint::FreezeRotation {
            self.rotation -= self.rotation_sign * self.config.rotation_speed * dt;
        }

        self.step_burst(dt);
    }

    fn step_burst(&mut self, dt: f32) {
        let burst = &self.config.burst;
        let Some(child) = self.child.as_mut() else {
            return;
        };
        if child.phase == BurstPhase::Armed {
            let triggered = match burst.trigger {
                BurstTrigger::Height => self.base.y - self.pos.y >= burst.trigger_value,
                BurstTrigger::Time => self.age >= burst.trigger_value,
            };
            if triggered {
                log::debug!("Burst triggered on '{}'", self.pool_key);
                child.start(burst);
            }
        }
        child.step(burst, self.fall_speed, dt);
    }

    /// World-space half extents of one collider box
    pub fn half_extents(&self) -> Vec2 {
        self.collider_size * self.scale.abs() * 0.5
    }

    /// Collider boxes as (center, half extents, rotation degrees)
    pub fn boxes(&self) -> impl Iterator<Item = (Vec2, Vec2, f32)> + '_ {
        let half = self.half_extents();
        let parent = std::iter::once((self.pos, half, self.rotation));
        let child = self
            .child
            .as_ref()
            .map(|c| (self.pos + Vec2::new(0.0, c.offset), half, self.rotation));
        parent.chain(child)
    }

    /// Highest point of any box (rotation-aware bound)
    pub fn top(&self) -> f32 {
        self.boxes()
            .map(|(center, half, rot)| {
                let corner_a = rotate_degrees(half, rot);
                let corner_b = rotate_degrees(Vec2::new(half.x, -half.y), rot);
                center.y + corner_a.y.abs().max(corner_b.y.abs())
            })
            .fold(f32::NEG_INFINITY, f32::max)
    }
}
