//! Fixed timestep simulation tick
//!
//! Core game loop that advances the world deterministically.

use super::collision::{circle_overlaps_box, is_below};
use super::obstacle::Lane;
use super::pool::{InstanceId, ReturnReason};
use super::state::{GameState, World};
use crate::normalize_degrees;

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// -1 = rotate left, 0 = none, +1 = rotate right
    pub direction: i8,
    /// Pause toggle (Escape)
    pub pause_toggle: bool,
    /// Idle/demo mode - steer automatically
    pub autopilot: bool,
}

/// Advance the world by one fixed timestep of real time `dt`
pub fn tick(world: &mut World, input: &TickInput, dt: f32) {
    if input.pause_toggle && matches!(world.state, GameState::Playing | GameState::Paused) {
        let _ = world.toggle_pause();
    }

    world.ticks += 1;
    world.background.update(dt, &mut world.rng);

    let dt = dt * world.time_scale;
    if dt <= 0.0 {
        return;
    }
    world.time += dt;

    if let Some(kind) = world.transition.step(&mut world.player, dt) {
        world.on_transition_finished(kind);
    }

    match world.state {
        GameState::Menu => {
            if !world.transition.is_transitioning() {
                world.player.auto_rotate_step(world.config.rotate_speed, dt);
            }
        }
        GameState::Playing => {
            let direction = if input.autopilot {
                autopilot_direction(world)
            } else {
                input.direction.signum()
            };
            world.player.torque_step(direction, &world.config, dt);
            step_obstacles(world, dt);
            if player_hit(world) {
                let _ = world.on_player_hit();
            }
        }
        GameState::Paused | GameState::GameOver => {}
    }
}

/// Spawn, move and recycle obstacles
fn step_obstacles(world: &mut World, dt: f32) {
    let now = world.time;
    world
        .spawner
        .update(now, &mut world.pool, &world.config, &mut world.rng);

    for (_, obstacle) in world.pool.iter_active_mut() {
        obstacle.step(dt, now);
    }

    let bottom = -world.config.camera_half_height;
    let gone: Vec<(InstanceId, String)> = world
        .pool
        .iter_active()
        .filter(|(_, _, o)| is_below(o.top(), bottom))
        .map(|(id, key, _)| (id, key.to_string()))
        .collect();
    for (id, key) in gone {
        if let Err(e) = world.pool.release(&key, id, ReturnReason::OffScreen) {
            log::warn!("Could not recycle obstacle: {}", e);
        }
    }
    world.collect_returns();
}

/// Whether either dot overlaps any obstacle box
pub fn player_hit(world: &World) -> bool {
    let radius = world.player.dot_world_radius();
    let dots = world.player.dots();
    world.obstacles().any(|obstacle| {
        obstacle.boxes().any(|(center, half, rotation)| {
            dots.iter()
                .any(|&dot| circle_overlaps_box(dot, radius, center, half, rotation))
        })
    })
}

/// Demo steering: line the dots up vertically when the next obstacle is off
/// to one side, horizontally when it comes down the middle.
pub fn autopilot_direction(world: &World) -> i8 {
    let player_y = world.player.pos.y;
    let threat = world
        .obstacles()
        .filter(|o| o.pos.y > player_y)
        .min_by(|a, b| a.pos.y.total_cmp(&b.pos.y));
    let Some(threat) = threat else {
        return 0;
    };

    let candidates: [f32; 2] = if threat.lane == Lane::Center {
        [0.0, 180.0]
    } else {
        [90.0, -90.0]
    };
    let rotation = world.player.rotation;
    let delta = candidates
        .iter()
        .map(|&target| normalize_degrees(target - rotation))
        .min_by(|a, b| a.abs().total_cmp(&b.abs()))
        .unwrap_or(0.0);

    const DEADBAND: f32 = 5.0;
    if delta > DEADBAND {
        // Counter-clockwise
        -1
    } else if delta < -DEADBAND {
        1
    } else {
        0
    }
}
