//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Input polling (touch, mouse, keyboard) collapsed to a rotation direction
//! - Storage (see `persistence`)

pub mod input;

pub use input::{InputSnapshot, Key, TouchPhase, TouchPoint};
