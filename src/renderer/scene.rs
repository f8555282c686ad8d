//! Turns a `World` into a triangle list in world coordinates

use super::shapes::{circle, ring, rotated_rect};
use super::vertex::{Vertex, colors};
use crate::sim::World;

const DOT_SEGMENTS: u32 = 24;
const ORBIT_SEGMENTS: u32 = 48;
const ORBIT_THICKNESS: f32 = 0.03;

/// Build this frame's vertices (obstacles first, player on top)
pub fn build_scene(world: &World) -> Vec<Vertex> {
    let mut vertices = Vec::new();

    for obstacle in world.obstacles() {
        for (i, (center, half, rotation)) in obstacle.boxes().enumerate() {
            let color = if i == 0 {
                colors::OBSTACLE
            } else {
                colors::OBSTACLE_CHILD
            };
            vertices.extend(rotated_rect(center, half, rotation, color));
        }
    }

    let player = &world.player;
    let orbit = player.dot_distance * player.scale;
    vertices.extend(ring(
        player.pos,
        orbit - ORBIT_THICKNESS,
        orbit + ORBIT_THICKNESS,
        colors::ORBIT,
        ORBIT_SEGMENTS,
    ));
    let [left, right] = player.dots();
    let radius = player.dot_world_radius();
    vertices.extend(circle(left, radius, colors::DOT_LEFT, DOT_SEGMENTS));
    vertices.extend(circle(right, radius, colors::DOT_RIGHT, DOT_SEGMENTS));

    vertices
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{GameConfig, ObstacleConfig};
    use crate::persistence::MemoryStorage;
    use crate::renderer::pipeline::world_to_ndc;
    use crate::sim::Lane;

    #[test]
    fn test_scene_grows_with_obstacles() {
        let mut world = World::new(
            GameConfig::default(),
            vec![ObstacleConfig::default()],
            Box::new(MemoryStorage::new()),
            0,
        );
        let empty = build_scene(&world).len();
        assert_eq!(
            empty,
            (ORBIT_SEGMENTS * 6 + DOT_SEGMENTS * 3 * 2) as usize
        );
        world.pool.acquire("Obstacle").unwrap();
        assert_eq!(build_scene(&world).len(), empty + 6);
    }

    #[test]
    fn test_lanes_split_a_landscape_screen_in_thirds() {
        let mut cfg = GameConfig::default();
        let size = (1920, 1080);
        cfg.set_viewport(size.0, size.1);

        let half_width = cfg.camera_half_width();
        let expected = [
            (Lane::Left, -2.0 / 3.0),
            (Lane::Center, 0.0),
            (Lane::Right, 2.0 / 3.0),
        ];
        for (lane, expected) in expected {
            let (x, _) =
                world_to_ndc(lane.center_x(half_width), 0.0, size, cfg.camera_half_height);
            assert!((x - expected).abs() < 1e-4, "{:?} at {}", lane, x);
        }
    }
}
