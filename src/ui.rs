//! Panel visibility model and button actions
//!
//! The simulation only decides which panels are visible and what they say; the
//! frontend mirrors this onto the DOM each frame.

use serde::{Deserialize, Serialize};

/// Button press routed to the state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UiAction {
    Start,
    Pause,
    Resume,
    Restart,
    Menu,
    Quit,
}

impl UiAction {
    /// Map a DOM button id
    pub fn from_button_id(id: &str) -> Option<Self> {
        match id {
            "start-btn" => Some(UiAction::Start),
            "pause-btn" => Some(UiAction::Pause),
            "continue-btn" => Some(UiAction::Resume),
            "restart-btn" => Some(UiAction::Restart),
            "menu-btn" => Some(UiAction::Menu),
            "quit-btn" => Some(UiAction::Quit),
            _ => None,
        }
    }

    /// DOM button id for this action
    pub fn button_id(self) -> &'static str {
        match self {
            UiAction::Start => "start-btn",
            UiAction::Pause => "pause-btn",
            UiAction::Resume => "continue-btn",
            UiAction::Restart => "restart-btn",
            UiAction::Menu => "menu-btn",
            UiAction::Quit => "quit-btn",
        }
    }

    pub const ALL: [UiAction; 6] = [
        UiAction::Start,
        UiAction::Pause,
        UiAction::Resume,
        UiAction::Restart,
        UiAction::Menu,
        UiAction::Quit,
    ];
}

pub const GAME_OVER_TEXT: &str = "Game Over";
pub const PAUSED_TEXT: &str = "PAUSED";

/// Which panels are showing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UiPanels {
    pub menu: bool,
    pub hud: bool,
    /// Shared by game over and pause
    pub game_over: bool,
    pub game_over_text: String,
    /// Continue button on the shared panel (pause only)
    pub show_continue: bool,
}

impl Default for UiPanels {
    fn default() -> Self {
        Self {
            menu: true,
            hud: false,
            game_over: false,
            game_over_text: GAME_OVER_TEXT.to_string(),
            show_continue: false,
        }
    }
}

impl UiPanels {
    pub fn show_menu(&mut self) {
        self.menu = true;
        self.hud = false;
        self.game_over = false;
    }

    pub fn hide_menu(&mut self) {
        self.menu = false;
    }

    pub fn show_hud(&mut self) {
        self.menu = false;
        self.game_over = false;
        self.hud = true;
    }

    /// Show the shared overlay with `message`, hiding the HUD
    pub fn show_game_over(&mut self, message: &str, show_continue: bool) {
        self.game_over_text = message.to_string();
        self.game_over = true;
        self.hud = false;
        self.show_continue = show_continue;
    }

    /// Hide the overlay and bring the HUD back
    pub fn hide_game_over(&mut self) {
        self.game_over = false;
        self.hud = true;
    }
}

/// HUD score line
pub fn score_text(score: u64) -> String {
    format!("Score: {}", score)
}

/// HUD high score line
pub fn high_score_text(high: u64) -> String {
    format!("Best: {}", high)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_button_ids_round_trip() {
        for action in UiAction::ALL {
            assert_eq!(UiAction::from_button_id(action.button_id()), Some(action));
        }
        assert_eq!(UiAction::from_button_id("nope"), None);
    }

    #[test]
    fn test_pause_overlay_shows_continue() {
        let mut ui = UiPanels::default();
        ui.show_hud();
        ui.show_game_over(PAUSED_TEXT, true);
        assert!(ui.game_over && ui.show_continue && !ui.hud);
        assert_eq!(ui.game_over_text, "PAUSED");
        ui.hide_game_over();
        assert!(ui.hud && !ui.game_over);
    }

    #[test]
    fn test_menu_hides_everything_else() {
        let mut ui = UiPanels::default();
        ui.show_game_over(GAME_OVER_TEXT, false);
        ui.show_menu();
        assert!(ui.menu && !ui.hud && !ui.game_over);
    }
}
