//! World state and core simulation types
//!
//! Everything the frontend needs to draw a frame or drive the UI lives on
//! `World`. It changes only through `tick` and the state-machine operations.

use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::background::BackgroundCycler;
use super::obstacle::Obstacle;
use super::player::Player;
use super::pool::Pool;
use super::score::ScoreBoard;
use super::spawner::Spawner;
use super::transition::{TransitionKind, Transitioner};
use crate::config::{GameConfig, ObstacleConfig};
use crate::highscores::HighScore;
use crate::persistence::Storage;
use crate::ui::UiPanels;

/// Top-level game state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GameState {
    /// Title screen, player idling
    #[default]
    Menu,
    /// Active gameplay
    Playing,
    /// Time frozen, overlay showing
    Paused,
    /// A dot was hit
    GameOver,
}

/// One-shot sound cues
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sound {
    /// Any button press
    Click,
    /// Dot hit an obstacle
    Crush,
    /// Run ended
    GameOver,
}

/// Events emitted for audio/UI, drained by the frontend each frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    Sound(Sound),
    StateChanged { from: GameState, to: GameState },
    ScoreChanged(u64),
    NewHighScore(u64),
    TransitionFinished(TransitionKind),
}

/// Values stashed by pause and put back by resume
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PauseSnapshot {
    pub spawner_enabled: bool,
    pub controller_enabled: bool,
    pub time_scale: f32,
}

/// The complete game world
pub struct World {
    pub config: GameConfig,
    pub state: GameState,
    /// Scaled game clock (seconds)
    pub time: f32,
    /// 0 while paused
    pub time_scale: f32,
    /// Fixed ticks run so far
    pub ticks: u64,
    pub player: Player,
    pub transition: Transitioner,
    pub pool: Pool<Obstacle>,
    pub spawner: Spawner,
    pub score: ScoreBoard,
    pub high_score: HighScore,
    pub background: BackgroundCycler,
    pub ui: UiPanels,
    /// Set by the Quit action; the frontend decides what quitting means
    pub quit_requested: bool,
    pub(crate) pause_snapshot: Option<PauseSnapshot>,
    pub(crate) events: Vec<GameEvent>,
    pub(crate) rng: Pcg32,
    pub(crate) storage: Box<dyn Storage>,
}

impl World {
    /// Build a world in the Menu state, loading the high score from `storage`
    pub fn new(
        config: GameConfig,
        obstacles: Vec<ObstacleConfig>,
        storage: Box<dyn Storage>,
        seed: u64,
    ) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        let high_score = HighScore::load(storage.as_ref());
        let spawner = Spawner::new(obstacles);
        let mut pool = Pool::new();
        spawner.prime(&mut pool, config.obstacle_pool_initial_count);
        let background = BackgroundCycler::new(&mut rng);

        log::info!(
            "World created: {} obstacle types, seed {}",
            spawner.configs().len(),
            seed
        );

        Self {
            player: Player::new(&config),
            config,
            state: GameState::Menu,
            time: 0.0,
            time_scale: 1.0,
            ticks: 0,
            transition: Transitioner::default(),
            pool,
            spawner,
            score: ScoreBoard::default(),
            high_score,
            background,
            ui: UiPanels::default(),
            quit_requested: false,
            pause_snapshot: None,
            events: Vec::new(),
            rng,
            storage,
        }
    }

    /// Take all pending events
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn events(&self) -> &[GameEvent] {
        &self.events
    }

    pub fn storage(&self) -> &dyn Storage {
        self.storage.as_ref()
    }

    pub fn storage_mut(&mut self) -> &mut dyn Storage {
        self.storage.as_mut()
    }

    pub fn pause_snapshot(&self) -> Option<&PauseSnapshot> {
        self.pause_snapshot.as_ref()
    }

    /// Active obstacles in spawn-slot order
    pub fn obstacles(&self) -> impl Iterator<Item = &Obstacle> {
        self.pool.iter_active().map(|(_, _, o)| o)
    }

    pub(crate) fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    pub(crate) fn set_state(&mut self, to: GameState) {
        let from = self.state;
        if from == to {
            return;
        }
        self.state = to;
        log::info!("Game state changed to: {:?}", to);
        self.emit(GameEvent::StateChanged { from, to });
    }

    /// Add returned obstacles to the score and persist a beaten high score
    pub(crate) fn collect_returns(&mut self) {
        let returned = self.pool.take_returned();
        if returned.is_empty() {
            return;
        }
        if self.score.on_returned(&returned) == 0 {
            return;
        }
        let score = self.score.score;
        self.emit(GameEvent::ScoreChanged(score));
        if self.high_score.submit(score) {
            self.high_score.save(self.storage.as_mut());
            self.emit(GameEvent::NewHighScore(score));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStorage;
    use crate::sim::pool::ReturnReason;

    fn world_with(storage: MemoryStorage) -> World {
        World::new(
            GameConfig::default(),
            vec![ObstacleConfig::default()],
            Box::new(storage),
            7,
        )
    }

    #[test]
    fn test_new_world_is_menu_with_primed_pool() {
        let world = world_with(MemoryStorage::new());
        assert_eq!(world.state, GameState::Menu);
        assert!(world.ui.menu);
        assert_eq!(world.pool.inactive_count("Obstacle"), 20);
        assert_eq!(world.pool.active_count(), 0);
    }

    #[test]
    fn test_high_score_loaded_from_storage() {
        let mut storage = MemoryStorage::new();
        HighScore { high_score: 12 }.save(&mut storage);
        let world = world_with(storage);
        assert_eq!(world.high_score.high_score, 12);
    }

    #[test]
    fn test_beating_high_score_saves_immediately() {
        let mut world = world_with(MemoryStorage::new());
        let id = world.pool.acquire("Obstacle").unwrap();
        world
            .pool
            .release("Obstacle", id, ReturnReason::OffScreen)
            .unwrap();
        world.collect_returns();

        assert_eq!(world.score.score, 1);
        assert_eq!(HighScore::load(world.storage()).high_score, 1);
        let events = world.drain_events();
        assert!(events.contains(&GameEvent::ScoreChanged(1)));
        assert!(events.contains(&GameEvent::NewHighScore(1)));
    }

    #[test]
    fn test_drained_returns_do_not_score() {
        let mut world = world_with(MemoryStorage::new());
        world.pool.acquire("Obstacle").unwrap();
        world.pool.release_all_active(ReturnReason::Drained);
        world.collect_returns();
        assert_eq!(world.score.score, 0);
        assert!(world.events().is_empty());
    }
}
