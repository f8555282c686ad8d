//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (by instance id)
//! - No rendering or platform dependencies

pub mod background;
pub mod collision;
pub mod machine;
pub mod obstacle;
pub mod player;
pub mod pool;
pub mod score;
pub mod spawner;
pub mod state;
pub mod tick;
pub mod transition;

pub use background::BackgroundCycler;
pub use collision::{circle_overlaps_box, is_below};
pub use machine::StateError;
pub use obstacle::{BurstPhase, Lane, MotionConstraint, Obstacle};
pub use player::Player;
pub use pool::{InstanceId, Pool, PoolError, ReturnReason, Returned};
pub use score::ScoreBoard;
pub use spawner::Spawner;
pub use state::{GameEvent, GameState, PauseSnapshot, Sound, World};
pub use tick::{TickInput, tick};
pub use transition::{TransitionKind, Transitioner};
