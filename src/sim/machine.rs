//! Game state machine
//!
//! ```text
//! Menu --start--> (start transition) --> Playing
//! Playing <--pause/resume--> Paused
//! Playing --hit--> GameOver
//! GameOver | Paused --restart--> Playing
//! GameOver | Paused --menu--> Menu (return transition)
//! ```
//!
//! Requests that do not fit the current state are rejected with
//! `StateError::InvalidTransition` and leave the world untouched.

use super::pool::ReturnReason;
use super::state::{GameEvent, GameState, PauseSnapshot, Sound, World};
use super::transition::TransitionKind;
use crate::ui::{GAME_OVER_TEXT, PAUSED_TEXT, UiAction};

/// Requested change that the state machine refused
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum StateError {
    #[error("cannot {request} while in {from:?}")]
    InvalidTransition {
        from: GameState,
        request: &'static str,
    },
}

impl World {
    fn require(&self, allowed: &[GameState], request: &'static str) -> Result<(), StateError> {
        if allowed.contains(&self.state) {
            Ok(())
        } else {
            let err = StateError::InvalidTransition {
                from: self.state,
                request,
            };
            log::warn!("{}", err);
            Err(err)
        }
    }

    /// Hide the menu and fly the player into position. Playing begins when the
    /// transition lands.
    pub fn start_game(&mut self) -> Result<(), StateError> {
        self.require(&[GameState::Menu], "start")?;
        if self.transition.is_transitioning() {
            log::debug!("Start ignored, transition already running");
            return Ok(());
        }
        self.ui.hide_menu();
        self.transition.start(
            &mut self.player,
            self.config.player_start_position,
            self.config.transition_target_scale,
            self.config.transition_duration,
            self.config.rotate_speed,
        );
        Ok(())
    }

    /// Freeze time, stashing what resume needs
    pub fn pause(&mut self) -> Result<(), StateError> {
        self.require(&[GameState::Playing], "pause")?;
        self.pause_snapshot = Some(PauseSnapshot {
            spawner_enabled: self.spawner.enabled,
            controller_enabled: self.player.controller_enabled,
            time_scale: self.time_scale,
        });
        self.set_state(GameState::Paused);
        self.spawner.enabled = false;
        self.player.controller_enabled = false;
        self.time_scale = 0.0;
        self.ui.show_game_over(PAUSED_TEXT, true);
        Ok(())
    }

    /// Restore the pause snapshot and carry on
    pub fn resume(&mut self) -> Result<(), StateError> {
        self.require(&[GameState::Paused], "resume")?;
        let snapshot = self.pause_snapshot.take().unwrap_or(PauseSnapshot {
            spawner_enabled: true,
            controller_enabled: true,
            time_scale: 1.0,
        });
        self.time_scale = snapshot.time_scale;
        self.spawner.enabled = snapshot.spawner_enabled;
        self.player.controller_enabled = snapshot.controller_enabled;
        self.ui.hide_game_over();
        self.set_state(GameState::Playing);
        Ok(())
    }

    /// Escape key: pause when playing, resume when paused
    pub fn toggle_pause(&mut self) -> Result<(), StateError> {
        match self.state {
            GameState::Paused => self.resume(),
            _ => self.pause(),
        }
    }

    /// Fresh run without the intro transition
    pub fn restart(&mut self) -> Result<(), StateError> {
        self.require(&[GameState::GameOver, GameState::Paused], "restart")?;
        self.pause_snapshot = None;
        self.time_scale = 1.0;
        self.drain_obstacles();
        self.player.pos = self.config.player_start_position;
        self.player.rotation = 0.0;
        self.player.scale = self.config.transition_target_scale;
        self.player.halt();
        self.begin_play();
        Ok(())
    }

    /// Back to the title screen, flying the player home
    pub fn return_to_menu(&mut self) -> Result<(), StateError> {
        self.require(&[GameState::GameOver, GameState::Paused], "return to menu")?;
        self.pause_snapshot = None;
        self.time_scale = 1.0;
        self.set_state(GameState::Menu);
        self.spawner.enabled = false;
        self.drain_obstacles();
        self.ui.show_menu();
        self.transition.start_return(
            &mut self.player,
            self.config.menu_player_position,
            self.config.menu_return_rotation,
            self.config.menu_player_scale,
            self.config.transition_duration,
        );
        Ok(())
    }

    /// Flag the frontend to exit
    pub fn quit(&mut self) {
        log::info!("Quit requested");
        self.quit_requested = true;
    }

    /// A dot touched an obstacle
    pub fn on_player_hit(&mut self) -> Result<(), StateError> {
        self.require(&[GameState::Playing], "end the run")?;
        self.set_state(GameState::GameOver);
        self.emit(GameEvent::Sound(Sound::Crush));
        self.emit(GameEvent::Sound(Sound::GameOver));
        self.spawner.enabled = false;
        self.player.controller_enabled = false;
        self.player.halt();
        self.ui.show_game_over(GAME_OVER_TEXT, false);
        Ok(())
    }

    /// Route a button press
    pub fn dispatch(&mut self, action: UiAction) -> Result<(), StateError> {
        self.emit(GameEvent::Sound(Sound::Click));
        match action {
            UiAction::Start => self.start_game(),
            UiAction::Pause => self.pause(),
            UiAction::Resume => self.resume(),
            UiAction::Restart => self.restart(),
            UiAction::Menu => self.return_to_menu(),
            UiAction::Quit => {
                self.quit();
                Ok(())
            }
        }
    }

    /// Completion hook for a finished transition
    pub(crate) fn on_transition_finished(&mut self, kind: TransitionKind) {
        self.emit(GameEvent::TransitionFinished(kind));
        match kind {
            TransitionKind::Start => {
                // A menu return may have raced the intro; only start from Menu
                if self.state == GameState::Menu {
                    self.begin_play();
                }
            }
            TransitionKind::ReturnToMenu => {
                log::debug!("Back at menu");
            }
        }
    }

    fn begin_play(&mut self) {
        self.spawner
            .prime(&mut self.pool, self.config.obstacle_pool_initial_count);
        self.set_state(GameState::Playing);
        if self.score.score != 0 {
            self.score.reset();
            self.emit(GameEvent::ScoreChanged(0));
        }
        self.spawner.reset(self.time, self.config.spawn_interval);
        self.spawner.enabled = true;
        self.player.controller_enabled = true;
        self.player.auto_rotate = false;
        self.ui.show_hud();
    }

    /// Return every active obstacle without scoring it
    fn drain_obstacles(&mut self) {
        let drained = self.pool.release_all_active(ReturnReason::Drained);
        if drained > 0 {
            log::debug!("Drained {} obstacles", drained);
        }
        self.collect_returns();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{GameConfig, ObstacleConfig};
    use crate::persistence::MemoryStorage;
    use crate::sim::transition::TransitionKind;

    fn world() -> World {
        World::new(
            GameConfig::default(),
            vec![ObstacleConfig::default()],
            Box::new(MemoryStorage::new()),
            1,
        )
    }

    fn finish_transition(world: &mut World) {
        while world.transition.is_transitioning() {
            if let Some(kind) = world.transition.step(&mut world.player, 1.0 / 60.0) {
                world.on_transition_finished(kind);
            }
        }
    }

    fn playing_world() -> World {
        let mut w = world();
        w.start_game().unwrap();
        finish_transition(&mut w);
        w
    }

    #[test]
    fn test_start_waits_for_transition() {
        let mut w = world();
        w.start_game().unwrap();
        assert_eq!(w.state, GameState::Menu);
        assert!(!w.ui.menu);
        assert!(w.transition.is_transitioning());

        finish_transition(&mut w);
        assert_eq!(w.state, GameState::Playing);
        assert!(w.spawner.enabled);
        assert!(w.player.controller_enabled);
        assert!(w.ui.hud);
        assert_eq!(w.player.pos, w.config.player_start_position);
    }

    #[test]
    fn test_double_start_is_noop() {
        let mut w = world();
        w.start_game().unwrap();
        let before = w.transition.current().map(|t| t.elapsed);
        w.start_game().unwrap();
        assert_eq!(w.transition.current().map(|t| t.elapsed), before);
    }

    #[test]
    fn test_pause_then_resume_restores_snapshot() {
        let mut w = playing_world();
        w.spawner.enabled = false;
        w.player.controller_enabled = true;
        w.time_scale = 1.0;

        w.pause().unwrap();
        assert_eq!(w.state, GameState::Paused);
        assert_eq!(w.time_scale, 0.0);
        assert!(!w.player.controller_enabled);
        assert!(w.ui.show_continue);
        assert_eq!(w.ui.game_over_text, "PAUSED");

        w.resume().unwrap();
        assert_eq!(w.state, GameState::Playing);
        assert_eq!(w.time_scale, 1.0);
        assert!(!w.spawner.enabled);
        assert!(w.player.controller_enabled);
        assert!(w.pause_snapshot().is_none());
    }

    #[test]
    fn test_invalid_transitions_rejected() {
        let mut w = world();
        assert_eq!(
            w.pause(),
            Err(StateError::InvalidTransition {
                from: GameState::Menu,
                request: "pause"
            })
        );
        assert!(w.resume().is_err());
        assert!(w.restart().is_err());
        assert!(w.on_player_hit().is_err());
        assert_eq!(w.state, GameState::Menu);

        let mut w = playing_world();
        let err = w.start_game().unwrap_err();
        assert_eq!(err.to_string(), "cannot start while in Playing");
        assert!(w.return_to_menu().is_err());
    }

    #[test]
    fn test_hit_ends_run_with_sounds() {
        let mut w = playing_world();
        w.drain_events();
        w.on_player_hit().unwrap();
        assert_eq!(w.state, GameState::GameOver);
        assert!(!w.spawner.enabled);
        assert!(w.ui.game_over && !w.ui.show_continue);
        let events = w.drain_events();
        assert!(events.contains(&GameEvent::Sound(Sound::Crush)));
        assert!(events.contains(&GameEvent::Sound(Sound::GameOver)));
    }

    #[test]
    fn test_restart_drains_and_resets() {
        let mut w = playing_world();
        w.pool.acquire("Obstacle").unwrap();
        w.pool.acquire("Obstacle").unwrap();
        w.score.score = 5;
        w.on_player_hit().unwrap();

        w.restart().unwrap();
        assert_eq!(w.state, GameState::Playing);
        assert_eq!(w.pool.active_count(), 0);
        assert_eq!(w.score.score, 0);
        assert!(w.spawner.enabled);
        assert_eq!(w.player.pos, w.config.player_start_position);
    }

    #[test]
    fn test_paused_can_restart_or_leave() {
        let mut w = playing_world();
        w.pause().unwrap();
        w.restart().unwrap();
        assert_eq!(w.time_scale, 1.0);
        assert!(w.player.controller_enabled);

        w.pause().unwrap();
        w.return_to_menu().unwrap();
        assert_eq!(w.state, GameState::Menu);
        assert_eq!(w.time_scale, 1.0);
        assert!(w.ui.menu);
    }

    #[test]
    fn test_return_to_menu_resumes_idle_spin() {
        let mut w = playing_world();
        w.on_player_hit().unwrap();
        w.return_to_menu().unwrap();
        assert!(!w.spawner.enabled);
        assert!(!w.player.auto_rotate);
        finish_transition(&mut w);
        assert!(w.player.auto_rotate);
        assert_eq!(w.player.scale, w.config.menu_player_scale);
        assert!(
            w.drain_events()
                .contains(&GameEvent::TransitionFinished(TransitionKind::ReturnToMenu))
        );
    }

    #[test]
    fn test_start_during_return_is_noop() {
        let mut w = playing_world();
        w.on_player_hit().unwrap();
        w.return_to_menu().unwrap();
        assert_eq!(w.state, GameState::Menu);
        let before = w.transition.current().map(|t| (t.kind, t.elapsed));

        w.start_game().unwrap();
        assert_eq!(w.transition.current().map(|t| (t.kind, t.elapsed)), before);
        assert!(w.ui.menu);
        assert!(!w.spawner.enabled);

        finish_transition(&mut w);
        assert_eq!(w.state, GameState::Menu);
        assert!(w.player.auto_rotate);
    }

    #[test]
    fn test_dispatch_clicks_and_quits() {
        let mut w = world();
        w.dispatch(UiAction::Quit).unwrap();
        assert!(w.quit_requested);
        assert_eq!(w.drain_events(), vec![GameEvent::Sound(Sound::Click)]);
    }

    #[test]
    fn test_toggle_pause() {
        let mut w = playing_world();
        w.toggle_pause().unwrap();
        assert_eq!(w.state, GameState::Paused);
        w.toggle_pause().unwrap();
        assert_eq!(w.state, GameState::Playing);
    }
}
