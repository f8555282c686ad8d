//! Data-driven game configuration
//!
//! `GameConfig` holds process-wide tunables; each `ObstacleConfig` describes one
//! obstacle archetype. Both are JSON assets loaded by name from a resource
//! directory, with built-in copies embedded for the web build and as a fallback.

use std::path::PathBuf;

use glam::Vec2;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::consts::DEFAULT_POOL_KEY;

/// Built-in assets, keyed by resource name
const BUILTIN_GAME_CONFIG: &str = include_str!("../assets/GameConfig.json");
const BUILTIN_OBSTACLES: &[(&str, &str)] = &[
    ("Obstacles/Obstacle", include_str!("../assets/Obstacles/Obstacle.json")),
    ("Obstacles/Spinner", include_str!("../assets/Obstacles/Spinner.json")),
    ("Obstacles/Wobbler", include_str!("../assets/Obstacles/Wobbler.json")),
    ("Obstacles/Sprinter", include_str!("../assets/Obstacles/Sprinter.json")),
];

/// Global tunables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    // === Player ===
    pub player_start_position: Vec2,
    /// Distance of each dot from the pivot at scale 1
    pub dot_distance: f32,
    pub dot_radius: f32,

    // === Menu player ===
    pub menu_player_position: Vec2,
    pub menu_player_scale: f32,
    /// Menu auto-rotate speed (degrees/sec, clockwise)
    pub rotate_speed: f32,
    /// Angular acceleration from input (degrees/sec²)
    pub torque_force: f32,
    /// Angular velocity clamp (degrees/sec)
    pub max_angular_velocity: f32,
    pub angular_drag: f32,

    // === Obstacles ===
    pub obstacle_fall_speed: f32,
    pub obstacle_pool_initial_count: usize,
    pub spawn_interval: f32,
    /// Distance above the camera top where obstacles appear
    pub spawn_margin: f32,
    /// Horizontal half-extent used when the camera width is unknown
    pub spawn_range_x: f32,
    /// Upper bound of lanes filled per spawn tick (1..=3)
    pub max_lanes_per_spawn: usize,

    // === Transition ===
    pub transition_duration: f32,
    pub transition_target_scale: f32,
    /// Pivot rotation (degrees) after returning to the menu
    pub menu_return_rotation: f32,

    // === Camera ===
    pub camera_half_height: f32,
    /// Width / height, kept in step with the viewport
    pub camera_aspect: f32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            player_start_position: Vec2::new(0.0, -3.5),
            dot_distance: 1.0,
            dot_radius: 0.28,

            menu_player_position: Vec2::ZERO,
            menu_player_scale: 1.36,
            rotate_speed: 120.0,
            torque_force: 1440.0,
            max_angular_velocity: 360.0,
            angular_drag: 2.0,

            obstacle_fall_speed: 2.0,
            obstacle_pool_initial_count: 20,
            spawn_interval: 1.5,
            spawn_margin: 1.0,
            spawn_range_x: 4.0,
            max_lanes_per_spawn: 2,

            transition_duration: 1.0,
            transition_target_scale: 1.0,
            menu_return_rotation: 180.0,

            camera_half_height: 5.0,
            camera_aspect: 9.0 / 16.0,
        }
    }
}

impl GameConfig {
    /// Half of the visible width in world units
    pub fn camera_half_width(&self) -> f32 {
        if self.camera_aspect > 0.0 {
            self.camera_half_height * self.camera_aspect
        } else {
            self.spawn_range_x
        }
    }

    /// Match the camera to a viewport in pixels; a degenerate size is ignored
    pub fn set_viewport(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.camera_aspect = width as f32 / height as f32;
        }
    }
}

/// What arms a burst
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BurstTrigger {
    /// Distance fallen since spawn (world units)
    #[default]
    Height,
    /// Seconds since spawn
    Time,
}

/// Child burst parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BurstConfig {
    pub enabled: bool,
    pub trigger: BurstTrigger,
    pub trigger_value: f32,
    /// Child speed as a multiple of the parent fall speed
    pub multiplier: f32,
    pub duration: f32,
    pub rejoin_duration: f32,
    /// Snap back to parent speed instead of easing over `rejoin_duration`
    pub rejoin_snap: bool,
}

impl Default for BurstConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            trigger: BurstTrigger::Height,
            trigger_value: 2.0,
            multiplier: 2.0,
            duration: 0.8,
            rejoin_duration: 0.2,
            rejoin_snap: true,
        }
    }
}

/// One obstacle archetype
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObstacleConfig {
    /// Registry key; empty means the default pool
    pub id: String,
    /// Base box size at scale 1
    pub size: Vec2,

    // === Layout ===
    pub centered: bool,
    /// Bias inside the lane, -1 (left edge) to 1 (right edge)
    pub region_offset: f32,
    pub allow_center_lane: bool,

    // === Rotation ===
    pub center_rotate: bool,
    /// Degrees/sec
    pub rotation_speed: f32,

    // === Spawn ===
    pub probability: f32,

    // === Size ===
    /// Zero means keep the default scale
    pub override_local_scale: Vec2,
    /// Zero means collider matches `size`
    pub override_collider_size: Vec2,

    // === Movement ===
    pub horizontal_move: bool,
    pub horizontal_speed: f32,
    pub horizontal_amplitude: f32,

    pub burst: BurstConfig,
}

impl Default for ObstacleConfig {
    fn default() -> Self {
        Self {
            id: String::new(),
            size: Vec2::new(1.0, 0.5),
            centered: true,
            region_offset: 0.0,
            allow_center_lane: true,
            center_rotate: false,
            rotation_speed: 0.0,
            probability: 1.0,
            override_local_scale: Vec2::ZERO,
            override_collider_size: Vec2::ZERO,
            horizontal_move: false,
            horizontal_speed: 1.0,
            horizontal_amplitude: 0.5,
            burst: BurstConfig::default(),
        }
    }
}

impl ObstacleConfig {
    /// Pool key this archetype registers under
    pub fn pool_key(&self) -> &str {
        if self.id.is_empty() {
            DEFAULT_POOL_KEY
        } else {
            &self.id
        }
    }

    /// Selection weight (negative weights count as zero)
    pub fn weight(&self) -> f32 {
        if self.probability.is_finite() {
            self.probability.max(0.0)
        } else {
            0.0
        }
    }

    /// Scale applied at spawn
    pub fn local_scale(&self) -> Vec2 {
        if self.override_local_scale == Vec2::ZERO {
            Vec2::ONE
        } else {
            self.override_local_scale
        }
    }

    /// Collider size in local (unscaled) units
    pub fn collider_size(&self) -> Vec2 {
        if self.override_collider_size == Vec2::ZERO {
            self.size
        } else {
            self.override_collider_size
        }
    }
}

/// Config loading failure
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read '{name}': {source}")]
    Io {
        name: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse '{name}': {source}")]
    Parse {
        name: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("resource '{0}' not found")]
    NotFound(String),
}

/// Where config assets come from
#[derive(Debug, Clone)]
pub enum Resources {
    /// `<root>/<name>.json`
    Dir(PathBuf),
    /// Copies compiled into the binary
    Builtin,
}

impl Resources {
    /// Load and parse a named resource
    pub fn load<T: DeserializeOwned>(&self, name: &str) -> Result<T, ConfigError> {
        let json = self.read(name)?;
        serde_json::from_str(&json).map_err(|source| ConfigError::Parse {
            name: name.to_string(),
            source,
        })
    }

    fn read(&self, name: &str) -> Result<String, ConfigError> {
        match self {
            Resources::Dir(root) => {
                let path = root.join(format!("{}.json", name));
                std::fs::read_to_string(&path).map_err(|source| {
                    if source.kind() == std::io::ErrorKind::NotFound {
                        ConfigError::NotFound(name.to_string())
                    } else {
                        ConfigError::Io {
                            name: name.to_string(),
                            source,
                        }
                    }
                })
            }
            Resources::Builtin => builtin(name)
                .map(str::to_string)
                .ok_or_else(|| ConfigError::NotFound(name.to_string())),
        }
    }

    /// Load `GameConfig`, falling back to defaults
    pub fn game_config(&self) -> GameConfig {
        match self.load::<GameConfig>("GameConfig") {
            Ok(cfg) => {
                log::info!("Loaded GameConfig");
                cfg
            }
            Err(e) => {
                log::warn!("GameConfig unavailable ({}), using defaults", e);
                GameConfig::default()
            }
        }
    }

    /// Load every obstacle archetype under `Obstacles/`, sorted by resource name
    pub fn obstacle_configs(&self) -> Vec<ObstacleConfig> {
        let names = match self {
            Resources::Dir(root) => match list_json(&root.join("Obstacles")) {
                Ok(names) => names,
                Err(e) => {
                    log::warn!("No obstacle directory ({}), using built-in obstacles", e);
                    return Resources::Builtin.obstacle_configs();
                }
            },
            Resources::Builtin => BUILTIN_OBSTACLES
                .iter()
                .map(|(name, _)| name.to_string())
                .collect(),
        };

        let configs: Vec<ObstacleConfig> = names
            .iter()
            .filter_map(|name| match self.load::<ObstacleConfig>(name) {
                Ok(cfg) => Some(cfg),
                Err(e) => {
                    log::warn!("Skipping obstacle config: {}", e);
                    None
                }
            })
            .collect();

        log::info!("Loaded {} obstacle configs", configs.len());
        configs
    }
}

fn builtin(name: &str) -> Option<&'static str> {
    if name == "GameConfig" {
        return Some(BUILTIN_GAME_CONFIG);
    }
    BUILTIN_OBSTACLES
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, json)| *json)
}

/// Resource names (`Obstacles/<stem>`) of the JSON files in a directory
fn list_json(dir: &std::path::Path) -> std::io::Result<Vec<String>> {
    let mut names = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.extension().is_some_and(|ext| ext == "json") {
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                names.push(format!("Obstacles/{}", stem));
            }
        }
    }
    names.sort();
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_game_config_parses() {
        let cfg = Resources::Builtin.game_config();
        assert_eq!(cfg.obstacle_pool_initial_count, 20);
        assert!((cfg.spawn_interval - 1.5).abs() < 1e-6);
    }

    #[test]
    fn test_builtin_obstacles_parse() {
        let configs = Resources::Builtin.obstacle_configs();
        assert_eq!(configs.len(), BUILTIN_OBSTACLES.len());
        assert!(configs.iter().any(|c| c.pool_key() == "Obstacle"));
        assert!(configs.iter().any(|c| c.burst.enabled));
    }

    #[test]
    fn test_partial_obstacle_uses_defaults() {
        let cfg: ObstacleConfig = serde_json::from_str(r#"{"probability": 3.0}"#).unwrap();
        assert_eq!(cfg.pool_key(), DEFAULT_POOL_KEY);
        assert!(cfg.allow_center_lane);
        assert_eq!(cfg.local_scale(), Vec2::ONE);
        assert_eq!(cfg.collider_size(), cfg.size);
    }

    #[test]
    fn test_negative_weight_clamped() {
        let cfg = ObstacleConfig {
            probability: -2.0,
            ..Default::default()
        };
        assert_eq!(cfg.weight(), 0.0);
    }

    #[test]
    fn test_viewport_sets_aspect() {
        let mut cfg = GameConfig::default();
        cfg.set_viewport(1920, 1080);
        assert!((cfg.camera_half_width() - 5.0 * 16.0 / 9.0).abs() < 1e-5);
        cfg.set_viewport(0, 1080);
        assert!((cfg.camera_aspect - 16.0 / 9.0).abs() < 1e-6);
    }

    #[test]
    fn test_missing_dir_falls_back() {
        let res = Resources::Dir(PathBuf::from("/nonexistent/duet/resources"));
        assert_eq!(res.game_config(), GameConfig::default());
        assert_eq!(res.obstacle_configs().len(), BUILTIN_OBSTACLES.len());
    }

    #[test]
    fn test_unknown_builtin_is_not_found() {
        let err = Resources::Builtin
            .load::<GameConfig>("Nope")
            .unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
        assert_eq!(err.to_string(), "resource 'Nope' not found");
    }

    #[test]
    fn test_parse_error_keeps_source() {
        let dir = std::env::temp_dir().join(format!("duet-config-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("GameConfig.json"), "{ broken").unwrap();

        let err = Resources::Dir(dir.clone())
            .load::<GameConfig>("GameConfig")
            .unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().starts_with("failed to parse 'GameConfig'"));
        assert!(std::error::Error::source(&err).is_some());
        let _ = std::fs::remove_dir_all(&dir);
    }
}
