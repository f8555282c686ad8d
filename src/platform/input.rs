//! Raw input state, collapsed each tick into a single rotation direction
//!
//! Priority: touches, then the primary mouse button, then the keyboard.

use std::collections::HashSet;

/// Lifecycle phase of a touch point
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TouchPhase {
    Began,
    Moved,
    Stationary,
    Ended,
    Canceled,
}

/// One touch, x in screen pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TouchPoint {
    pub id: i32,
    pub x: f32,
    pub phase: TouchPhase,
}

/// Keys the game listens to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    A,
    D,
    Left,
    Right,
    Escape,
}

impl Key {
    /// Map a DOM `KeyboardEvent.key` value
    pub fn from_dom(key: &str) -> Option<Self> {
        match key {
            "a" | "A" => Some(Key::A),
            "d" | "D" => Some(Key::D),
            "ArrowLeft" => Some(Key::Left),
            "ArrowRight" => Some(Key::Right),
            "Escape" => Some(Key::Escape),
            _ => None,
        }
    }
}

/// Polled input state for one frame
#[derive(Debug, Clone, Default)]
pub struct InputSnapshot {
    /// Screen width in pixels (for half-screen tests)
    pub screen_width: f32,
    pub touches: Vec<TouchPoint>,
    /// Primary mouse button x position, if held
    pub mouse_down_x: Option<f32>,
    pub keys: HashSet<Key>,
}

impl InputSnapshot {
    pub fn new(screen_width: f32) -> Self {
        Self {
            screen_width,
            ..Default::default()
        }
    }

    pub fn press(&mut self, key: Key) {
        self.keys.insert(key);
    }

    pub fn release(&mut self, key: Key) {
        self.keys.remove(&key);
    }

    /// Insert or update a touch
    pub fn touch(&mut self, point: TouchPoint) {
        match self.touches.iter_mut().find(|t| t.id == point.id) {
            Some(t) => *t = point,
            None => self.touches.push(point),
        }
    }

    /// Drop touches that have ended (call once per frame after polling)
    pub fn prune_touches(&mut self) {
        self.touches
            .retain(|t| !matches!(t.phase, TouchPhase::Ended | TouchPhase::Canceled));
    }

    /// -1 = rotate left, 0 = none, +1 = rotate right
    pub fn rotation_direction(&self) -> i8 {
        if !self.touches.is_empty() {
            let half = self.screen_width * 0.5;
            let mut saw_left = false;
            let mut saw_right = false;
            for t in &self.touches {
                if matches!(t.phase, TouchPhase::Ended | TouchPhase::Canceled) {
                    continue;
                }
                if t.x > half {
                    saw_right = true;
                } else {
                    saw_left = true;
                }
            }
            return match (saw_left, saw_right) {
                (true, false) => -1,
                (false, true) => 1,
                _ => 0,
            };
        }

        if let Some(x) = self.mouse_down_x {
            return if x > self.screen_width * 0.5 { 1 } else { -1 };
        }

        if self.keys.contains(&Key::A) || self.keys.contains(&Key::Left) {
            return -1;
        }
        if self.keys.contains(&Key::D) || self.keys.contains(&Key::Right) {
            return 1;
        }
        0
    }
}
