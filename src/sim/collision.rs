//! Collision detection between the player's dots and obstacle boxes
//!
//! Dots are circles; obstacle colliders are boxes rotated about their center.
//! Any contact ends the run, so only overlap is reported.

use glam::Vec2;

use crate::rotate_degrees;

/// Circle vs. box rotated by `rotation` degrees about `box_center`.
/// Touching counts as overlap.
pub fn circle_overlaps_box(
    circle_pos: Vec2,
    radius: f32,
    box_center: Vec2,
    half_extents: Vec2,
    rotation: f32,
) -> bool {
    // Work in the box's local frame
    let local = rotate_degrees(circle_pos - box_center, -rotation);
    let closest = local.clamp(-half_extents, half_extents);
    (local - closest).length_squared() <= radius * radius
}

/// Whether an axis-aligned bound lies entirely below `bottom`
pub fn is_below(top: f32, bottom: f32) -> bool {
    top < bottom
}

#[cfg(test)]
mod tests {
    use super::*;

    const HALF: Vec2 = Vec2::new(1.0, 0.5);

    #[test]
    fn test_circle_touching_face() {
        assert!(circle_overlaps_box(Vec2::new(0.0, 0.7), 0.3, Vec2::ZERO, HALF, 0.0));
    }

    #[test]
    fn test_circle_clear_of_box() {
        assert!(!circle_overlaps_box(Vec2::new(0.0, 1.0), 0.3, Vec2::ZERO, HALF, 0.0));
    }

    #[test]
    fn test_rotation_matters() {
        // Long thin bar; a circle above its end only hits once the bar stands up
        let half = Vec2::new(1.0, 0.1);
        let circle = Vec2::new(0.0, 0.9);
        assert!(!circle_overlaps_box(circle, 0.2, Vec2::ZERO, half, 0.0));
        assert!(circle_overlaps_box(circle, 0.2, Vec2::ZERO, half, 90.0));
    }

    #[test]
    fn test_center_inside_box() {
        assert!(circle_overlaps_box(Vec2::new(0.9, 0.0), 0.2, Vec2::ZERO, HALF, 0.0));
    }

    #[test]
    fn test_corner_needs_true_distance() {
        // Inside the bounding square of the corner but outside the circle
        assert!(!circle_overlaps_box(Vec2::new(1.18, 0.68), 0.2, Vec2::ZERO, HALF, 0.0));
        assert!(circle_overlaps_box(Vec2::new(1.1, 0.6), 0.2, Vec2::ZERO, HALF, 0.0));
    }

    #[test]
    fn test_offset_box_center() {
        let center = Vec2::new(3.0, -2.0);
        assert!(circle_overlaps_box(Vec2::new(3.0, -1.4), 0.2, center, HALF, 0.0));
        assert!(!circle_overlaps_box(Vec2::new(0.0, -1.4), 0.2, center, HALF, 0.0));
    }

    #[test]
    fn test_is_below() {
        assert!(is_below(-6.0, -5.0));
        assert!(!is_below(-4.0, -5.0));
    }
}
