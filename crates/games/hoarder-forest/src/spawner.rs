use serde::{Deserialize, Serialize};

use hoarder_core::rng::SeededRng;
use hoarder_core::world_time::Season;

use crate::config::SpawnConfig;
use crate::items::ItemKind;
use crate::physics::Vec2;
use crate::player::Player;
use crate::powerups::PowerUpType;

/// Bob phase advance per second. Cosmetic only.
const BOB_RATE: f32 = 2.0;
/// Pickups rest this far above the ground line, plus up to `SPAWN_JITTER`.
const SPAWN_LIFT: f32 = 28.0;
const SPAWN_JITTER: f32 = 8.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldPickup {
    pub id: u64,
    pub pos: Vec2,
    pub kind: ItemKind,
    pub bob: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldPowerUp {
    pub id: u64,
    pub pos: Vec2,
    pub kind: PowerUpType,
    pub bob: f32,
}

/// Keeps the loose item and power-up populations topped up.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Spawner {
    pub pickups: Vec<WorldPickup>,
    pub powerups: Vec<WorldPowerUp>,
    next_id: u64,
}

impl Spawner {
    pub fn new() -> Self {
        Self::default()
    }

    fn take_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    /// Spawn until both populations reach their targets.
    pub fn replenish(&mut self, rng: &mut SeededRng, cfg: &SpawnConfig, season: Season, ground_y: f32) {
        while self.pickups.len() < cfg.pickup_target {
            let Some(&kind) = rng.choice(&ItemKind::FORAGEABLE) else {
                break;
            };
            let x = cfg.pickup_x_min + rng.next_f64() as f32 * cfg.pickup_x_span;
            let y = ground_y - SPAWN_LIFT + rng.next_f64() as f32 * SPAWN_JITTER;
            let bob = rng.float(0.0, std::f64::consts::TAU) as f32;
            let id = self.take_id();
            self.pickups.push(WorldPickup {
                id,
                pos: Vec2::new(x, y),
                kind,
                bob,
            });
        }

        let weights = PowerUpType::spawn_weights(season);
        while self.powerups.len() < cfg.powerup_target {
            let kind = PowerUpType::ALL[rng.weighted_choice(&weights)];
            let x = cfg.powerup_x_min + rng.next_f64() as f32 * cfg.powerup_x_span;
            let y = ground_y - SPAWN_LIFT + rng.next_f64() as f32 * SPAWN_JITTER;
            let bob = rng.float(0.0, std::f64::consts::TAU) as f32;
            let id = self.take_id();
            tracing::debug!(id, kind = kind.name(), x, "power-up spawned");
            self.powerups.push(WorldPowerUp {
                id,
                pos: Vec2::new(x, y),
                kind,
                bob,
            });
        }
    }

    pub fn animate(&mut self, dt: f32) {
        for p in &mut self.pickups {
            p.bob += dt * BOB_RATE;
        }
        for p in &mut self.powerups {
            p.bob += dt * BOB_RATE;
        }
    }

    /// Move every pickup within reach into the player's inventory. Items the
    /// player cannot carry stay in the world. With `magnet` the reach widens
    /// to `cfg.magnet_reach` on both axes.
    pub fn collect_pickups(&mut self, player: &mut Player, cfg: &SpawnConfig, magnet: bool) -> Vec<ItemKind> {
        let (rx, ry) = reach(cfg, magnet);
        let mut collected = Vec::new();
        self.pickups.retain(|p| {
            let near = within(player.pos, p.pos, rx, ry);
            if near && player.can_carry(p.kind, 1) {
                player.add_item(p.kind, 1);
                collected.push(p.kind);
                false
            } else {
                true
            }
        });
        collected
    }

    /// Remove and return every power-up within reach.
    pub fn collect_powerups(&mut self, player: &Player, cfg: &SpawnConfig) -> Vec<PowerUpType> {
        let (rx, ry) = reach(cfg, false);
        let mut collected = Vec::new();
        self.powerups.retain(|p| {
            if within(player.pos, p.pos, rx, ry) {
                collected.push(p.kind);
                false
            } else {
                true
            }
        });
        collected
    }
}

fn reach(cfg: &SpawnConfig, magnet: bool) -> (f32, f32) {
    if magnet {
        (
            cfg.pickup_reach_x.max(cfg.magnet_reach),
            cfg.pickup_reach_y.max(cfg.magnet_reach),
        )
    } else {
        (cfg.pickup_reach_x, cfg.pickup_reach_y)
    }
}

fn within(a: Vec2, b: Vec2, rx: f32, ry: f32) -> bool {
    (a.x - b.x).abs() < rx && (a.y - b.y).abs() < ry
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PlayerConfig;

    const GROUND: f32 = 512.0;

    fn filled() -> (Spawner, SpawnConfig) {
        let cfg = SpawnConfig::default();
        let mut spawner = Spawner::new();
        spawner.replenish(&mut SeededRng::new(3), &cfg, Season::Spring, GROUND);
        (spawner, cfg)
    }

    #[test]
    fn replenish_reaches_targets_inside_band() {
        let (spawner, cfg) = filled();
        assert_eq!(spawner.pickups.len(), cfg.pickup_target);
        assert_eq!(spawner.powerups.len(), cfg.powerup_target);
        for p in &spawner.pickups {
            assert!(p.pos.x >= 200.0 && p.pos.x < 2200.0);
            assert!(p.pos.y >= GROUND - 28.0 && p.pos.y < GROUND - 20.0);
        }
        for p in &spawner.powerups {
            assert!(p.pos.x >= 300.0 && p.pos.x < 2100.0);
        }
    }

    #[test]
    fn ids_are_unique() {
        let (mut spawner, cfg) = filled();
        spawner.pickups.clear();
        spawner.replenish(&mut SeededRng::new(4), &cfg, Season::Fall, GROUND);
        let mut ids: Vec<u64> = spawner
            .pickups
            .iter()
            .map(|p| p.id)
            .chain(spawner.powerups.iter().map(|p| p.id))
            .collect();
        let n = ids.len();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), n);
    }

    #[test]
    fn collects_only_within_reach() {
        let (mut spawner, cfg) = filled();
        let mut player = Player::new(&PlayerConfig::default());
        let target = spawner.pickups[0].clone();
        player.pos = Vec2::new(target.pos.x + 10.0, GROUND - 16.0);
        let got = spawner.collect_pickups(&mut player, &cfg, false);
        assert!(got.contains(&target.kind));
        assert!(spawner.pickups.iter().all(|p| p.id != target.id));
        assert!(player.quantity_of(target.kind) >= 1);
    }

    #[test]
    fn full_basket_leaves_items_behind() {
        let cfg = SpawnConfig::default();
        let mut spawner = Spawner::new();
        spawner.pickups.push(WorldPickup {
            id: 1,
            pos: Vec2::new(500.0, 490.0),
            kind: ItemKind::Acorn,
            bob: 0.0,
        });
        let mut player = Player::new(&PlayerConfig::default());
        player.pos = Vec2::new(500.0, 496.0);
        player.add_item(ItemKind::Hazelnut, 20);
        assert!(spawner.collect_pickups(&mut player, &cfg, false).is_empty());
        assert_eq!(spawner.pickups.len(), 1);
    }

    #[test]
    fn magnet_widens_reach() {
        let cfg = SpawnConfig::default();
        let mut spawner = Spawner::new();
        spawner.pickups.push(WorldPickup {
            id: 1,
            pos: Vec2::new(560.0, 490.0),
            kind: ItemKind::Leaf,
            bob: 0.0,
        });
        let mut player = Player::new(&PlayerConfig::default());
        player.pos = Vec2::new(500.0, 496.0);
        assert!(spawner.collect_pickups(&mut player, &cfg, false).is_empty());
        assert_eq!(spawner.collect_pickups(&mut player, &cfg, true), vec![ItemKind::Leaf]);
    }

    #[test]
    fn bob_advances() {
        let (mut spawner, _) = filled();
        let before = spawner.pickups[0].bob;
        spawner.animate(0.5);
        assert!((spawner.pickups[0].bob - before - 1.0).abs() < 1e-5);
    }
}
