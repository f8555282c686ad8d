//! Obstacle spawner
//!
//! Every `spawn_interval` seconds of game time, one to `max_lanes_per_spawn`
//! distinct lanes each receive one obstacle drawn by weight from the loaded
//! archetypes.

use glam::Vec2;
use rand::Rng;
use rand::seq::SliceRandom;

use super::obstacle::{Lane, Obstacle};
use super::pool::{InstanceId, Pool};
use crate::config::{GameConfig, ObstacleConfig};

/// Pick an archetype by cumulative weight.
///
/// Negative weights count as zero. If every weight is zero the pick is uniform;
/// so is a pick among weights whose sum overflows.
pub fn pick_weighted<'a, R: Rng + ?Sized>(
    configs: &'a [ObstacleConfig],
    rng: &mut R,
) -> Option<&'a ObstacleConfig> {
    if configs.is_empty() {
        return None;
    }
    let total: f32 = configs.iter().map(ObstacleConfig::weight).sum();
    if total <= 0.0 {
        return configs.get(rng.random_range(0..configs.len()));
    }
    if !total.is_finite() {
        // Weights too large to sum: pick evenly among the weighted ones
        let weighted: Vec<&ObstacleConfig> =
            configs.iter().filter(|c| c.weight() > 0.0).collect();
        return weighted.get(rng.random_range(0..weighted.len())).copied();
    }

    let roll = rng.random_range(0.0..total);
    let mut cumulative = 0.0;
    for cfg in configs {
        cumulative += cfg.weight();
        if roll < cumulative {
            return Some(cfg);
        }
    }
    // Float round-off: fall back to the last weighted entry
    configs.iter().rev().find(|c| c.weight() > 0.0)
}

/// Shuffle the lanes and take 1..=max of them
pub fn choose_lanes<R: Rng + ?Sized>(max_lanes: usize, rng: &mut R) -> Vec<Lane> {
    let max = max_lanes.clamp(1, Lane::ALL.len());
    let count = rng.random_range(1..=max);
    let mut lanes = Lane::ALL.to_vec();
    lanes.shuffle(rng);
    lanes.truncate(count);
    lanes
}

/// Final lane for a config, or None to skip the spawn.
///
/// A config that forbids the center moves to a lane not in `used`.
pub fn resolve_lane(lane: Lane, cfg: &ObstacleConfig, used: &[Lane]) -> Option<Lane> {
    if lane != Lane::Center || cfg.allow_center_lane {
        return Some(lane);
    }
    [Lane::Left, Lane::Right]
        .into_iter()
        .find(|alt| !used.contains(alt))
}

/// Spawn point for a config placed in a lane
pub fn spawn_position(cfg: &ObstacleConfig, lane: Lane, game: &GameConfig) -> Vec2 {
    let half_width = game.camera_half_width();
    let mut x = lane.center_x(half_width);
    if !cfg.centered {
        let half_region = half_width / 3.0;
        x += cfg.region_offset.clamp(-1.0, 1.0) * half_region;
    }
    Vec2::new(x, game.camera_half_height + game.spawn_margin)
}

/// Timed, weighted obstacle spawner
#[derive(Debug, Clone)]
pub struct Spawner {
    pub enabled: bool,
    /// Game time of the next batch
    pub next_spawn_time: f32,
    configs: Vec<ObstacleConfig>,
}

impl Spawner {
    pub fn new(configs: Vec<ObstacleConfig>) -> Self {
        if configs.is_empty() {
            log::warn!("No obstacle configs loaded, spawner will be idle");
        }
        Self {
            enabled: false,
            next_spawn_time: 0.0,
            configs,
        }
    }

    pub fn configs(&self) -> &[ObstacleConfig] {
        &self.configs
    }

    /// Register one pool per archetype
    pub fn prime(&self, pool: &mut Pool<Obstacle>, initial_count: usize) {
        for cfg in &self.configs {
            pool.register(cfg.pool_key(), Obstacle::template(cfg), initial_count);
        }
    }

    /// Schedule the first batch one interval from `now`
    pub fn reset(&mut self, now: f32, interval: f32) {
        self.next_spawn_time = now + interval;
    }

    /// Spawn a batch when due. Returns the new instances.
    pub fn update<R: Rng + ?Sized>(
        &mut self,
        now: f32,
        pool: &mut Pool<Obstacle>,
        game: &GameConfig,
        rng: &mut R,
    ) -> Vec<InstanceId> {
        if !self.enabled || now < self.next_spawn_time {
            return Vec::new();
        }
        self.next_spawn_time = now + game.spawn_interval;
        self.spawn_batch(pool, game, rng)
    }

    /// Fill a random set of lanes right now
    pub fn spawn_batch<R: Rng + ?Sized>(
        &self,
        pool: &mut Pool<Obstacle>,
        game: &GameConfig,
        rng: &mut R,
    ) -> Vec<InstanceId> {
        let lanes = choose_lanes(game.max_lanes_per_spawn, rng);
        let mut used: Vec<Lane> = Vec::with_capacity(lanes.len());
        let mut spawned = Vec::with_capacity(lanes.len());

        for &lane in &lanes {
            let Some(cfg) = pick_weighted(&self.configs, rng) else {
                break;
            };
            // Every lane of the batch stays reserved, plus alternates already taken
            let reserved: Vec<Lane> = lanes.iter().chain(used.iter()).copied().collect();
            let Some(lane) = resolve_lane(lane, cfg, &reserved) else {
                log::debug!("No free lane for '{}', skipping", cfg.pool_key());
                continue;
            };
            if used.contains(&lane) {
                continue;
            }

            let key = cfg.pool_key();
            if !pool.is_registered(key) {
                pool.register(key, Obstacle::template(cfg), 0);
            }
            let id = match pool.acquire(key) {
                Ok(id) => id,
                Err(e) => {
                    log::error!("Spawn failed: {}", e);
                    continue;
                }
            };
            let pos = spawn_position(cfg, lane, game);
            if let Some(obstacle) = pool.get_mut(id) {
                obstacle.spawn(cfg, lane, pos, game.obstacle_fall_speed, rng);
            }
            used.push(lane);
            spawned.push(id);
        }
        spawned
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn cfg(id: &str, probability: f32) -> ObstacleConfig {
        ObstacleConfig {
            id: id.to_string(),
            probability,
            ..Default::default()
        }
    }

    #[test]
    fn test_weighted_frequency_converges() {
        let configs = vec![cfg("a", 1.0), cfg("b", 3.0)];
        let mut rng = Pcg32::seed_from_u64(42);
        let n = 20_000;
        let b = (0..n)
            .filter(|_| pick_weighted(&configs, &mut rng).unwrap().id == "b")
            .count();
        let freq = b as f32 / n as f32;
        assert!((freq - 0.75).abs() < 0.02, "freq = {}", freq);
    }

    #[test]
    fn test_negative_weight_never_picked() {
        let configs = vec![cfg("neg", -5.0), cfg("pos", 1.0)];
        let mut rng = Pcg32::seed_from_u64(3);
        for _ in 0..500 {
            assert_eq!(pick_weighted(&configs, &mut rng).unwrap().id, "pos");
        }
    }

    #[test]
    fn test_all_zero_weights_pick_uniformly() {
        let configs = vec![cfg("a", 0.0), cfg("b", 0.0)];
        let mut rng = Pcg32::seed_from_u64(9);
        let a = (0..2000)
            .filter(|_| pick_weighted(&configs, &mut rng).unwrap().id == "a")
            .count();
        assert!(a > 800 && a < 1200);
        assert!(pick_weighted(&[], &mut rng).is_none());
    }

    #[test]
    fn test_overflowing_weights_still_pick() {
        let configs = vec![cfg("a", 3e38), cfg("b", 3e38), cfg("c", 0.0)];
        let mut rng = Pcg32::seed_from_u64(4);
        let mut seen_a = 0;
        for _ in 0..500 {
            let picked = pick_weighted(&configs, &mut rng).unwrap();
            assert_ne!(picked.id, "c");
            if picked.id == "a" {
                seen_a += 1;
            }
        }
        assert!(seen_a > 150 && seen_a < 350);
    }

    #[test]
    fn test_center_forbidden_moves_to_free_lane() {
        let no_center = ObstacleConfig {
            allow_center_lane: false,
            ..Default::default()
        };
        assert_eq!(resolve_lane(Lane::Center, &no_center, &[]), Some(Lane::Left));
        assert_eq!(
            resolve_lane(Lane::Center, &no_center, &[Lane::Left]),
            Some(Lane::Right)
        );
        assert_eq!(
            resolve_lane(Lane::Center, &no_center, &[Lane::Left, Lane::Right]),
            None
        );
        assert_eq!(resolve_lane(Lane::Right, &no_center, &[]), Some(Lane::Right));
    }

    #[test]
    fn test_spawn_position_offsets_inside_lane() {
        let game = GameConfig::default();
        let hw = game.camera_half_width();
        let centered = ObstacleConfig::default();
        let pos = spawn_position(&centered, Lane::Left, &game);
        assert!((pos.x - Lane::Left.center_x(hw)).abs() < 1e-5);
        assert!((pos.y - (game.camera_half_height + game.spawn_margin)).abs() < 1e-5);

        let offset = ObstacleConfig {
            centered: false,
            region_offset: 1.0,
            ..Default::default()
        };
        let pos = spawn_position(&offset, Lane::Left, &game);
        assert!((pos.x - (Lane::Left.center_x(hw) + hw / 3.0)).abs() < 1e-5);
    }

    #[test]
    fn test_unprimed_key_is_primed_on_spawn() {
        let spawner = Spawner::new(vec![cfg("Fresh", 1.0)]);
        let mut pool = Pool::new();
        let mut rng = Pcg32::seed_from_u64(5);
        let ids = spawner.spawn_batch(&mut pool, &GameConfig::default(), &mut rng);
        assert!(!ids.is_empty());
        assert!(pool.is_registered("Fresh"));
        assert_eq!(pool.key_of(ids[0]), Some("Fresh"));
    }

    #[test]
    fn test_update_waits_for_interval() {
        let game = GameConfig::default();
        let mut spawner = Spawner::new(vec![cfg("", 1.0)]);
        let mut pool = Pool::new();
        spawner.prime(&mut pool, 0);
        let mut rng = Pcg32::seed_from_u64(1);

        spawner.reset(0.0, game.spawn_interval);
        assert!(spawner.update(0.0, &mut pool, &game, &mut rng).is_empty());
        spawner.enabled = true;
        assert!(spawner.update(1.0, &mut pool, &game, &mut rng).is_empty());
        assert!(!spawner.update(1.5, &mut pool, &game, &mut rng).is_empty());
        assert!((spawner.next_spawn_time - 3.0).abs() < 1e-5);
    }

    proptest! {
        #[test]
        fn prop_batch_lanes_unique(seed in any::<u64>(), max_lanes in 1usize..=3) {
            let game = GameConfig { max_lanes_per_spawn: max_lanes, ..Default::default() };
            let configs = vec![
                cfg("Obstacle", 2.0),
                ObstacleConfig { id: "Edge".into(), allow_center_lane: false, ..Default::default() },
            ];
            let spawner = Spawner::new(configs);
            let mut pool = Pool::new();
            spawner.prime(&mut pool, 0);
            let mut rng = Pcg32::seed_from_u64(seed);

            let ids = spawner.spawn_batch(&mut pool, &game, &mut rng);
            prop_assert!(ids.len() <= max_lanes);
            let mut lanes: Vec<Lane> = ids.iter().map(|id| pool.get(*id).unwrap().lane).collect();
            for id in &ids {
                let o = pool.get(*id).unwrap();
                if !o.config.allow_center_lane {
                    prop_assert_ne!(o.lane, Lane::Center);
                }
            }
            lanes.sort_by_key(|l| l.index());
            lanes.dedup();
            prop_assert_eq!(lanes.len(), ids.len());
        }
    }
}
