use serde::{Deserialize, Serialize};

use hoarder_core::rng::SeededRng;
use hoarder_core::world_time::Season;

use crate::config::SpawnConfig;
use crate::physics::{Rect, Vec2};

/// Hawks spawn this far above the ground line.
const HAWK_ALTITUDE: f32 = 150.0;
/// Chasing beyond `detection_range * CHASE_GIVE_UP` drops back to patrol.
const CHASE_GIVE_UP: f32 = 1.5;
const PATROL_SPEED_FACTOR: f32 = 0.3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnemyKind {
    Wolf,
    Bear,
    Hawk,
}

/// Static per-kind balance numbers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnemyStats {
    pub health: i32,
    pub speed: f32,
    pub damage: i32,
    pub detection_range: f32,
    pub attack_range: f32,
    pub chase_speed: f32,
    pub patrol_distance: f32,
    pub attack_cooldown: f32,
    pub flying: bool,
    pub width: f32,
    pub height: f32,
}

const WOLF: EnemyStats = EnemyStats {
    health: 3,
    speed: 120.0,
    damage: 1,
    detection_range: 250.0,
    attack_range: 40.0,
    chase_speed: 160.0,
    patrol_distance: 150.0,
    attack_cooldown: 1.0,
    flying: false,
    width: 48.0,
    height: 32.0,
};

const BEAR: EnemyStats = EnemyStats {
    health: 6,
    speed: 70.0,
    damage: 2,
    detection_range: 200.0,
    attack_range: 50.0,
    chase_speed: 110.0,
    patrol_distance: 100.0,
    attack_cooldown: 1.5,
    flying: false,
    width: 64.0,
    height: 48.0,
};

const HAWK: EnemyStats = EnemyStats {
    health: 2,
    speed: 150.0,
    damage: 1,
    detection_range: 300.0,
    attack_range: 35.0,
    chase_speed: 190.0,
    patrol_distance: 220.0,
    attack_cooldown: 1.2,
    flying: true,
    width: 40.0,
    height: 24.0,
};

impl EnemyKind {
    pub const ALL: [EnemyKind; 3] = [EnemyKind::Wolf, EnemyKind::Bear, EnemyKind::Hawk];

    pub fn stats(self) -> &'static EnemyStats {
        match self {
            EnemyKind::Wolf => &WOLF,
            EnemyKind::Bear => &BEAR,
            EnemyKind::Hawk => &HAWK,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            EnemyKind::Wolf => "wolf",
            EnemyKind::Bear => "bear",
            EnemyKind::Hawk => "hawk",
        }
    }

    /// Relative spawn weights, indexed like [`EnemyKind::ALL`].
    pub fn spawn_weights(season: Season) -> [f64; 3] {
        match season {
            Season::Spring => [0.5, 0.2, 0.3],
            Season::Summer => [0.3, 0.4, 0.3],
            Season::Fall => [0.4, 0.4, 0.2],
            // Bears hibernate.
            Season::Winter => [0.7, 0.0, 0.3],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnemyState {
    Patrol,
    Chase,
    Attack,
    Dead,
}

/// Terrain facts an enemy needs each tick.
#[derive(Debug, Clone, Copy)]
pub struct Terrain {
    pub ground_y: f32,
    pub world_width: f32,
    pub gravity: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Enemy {
    pub id: u64,
    pub kind: EnemyKind,
    pub pos: Vec2,
    pub vel: Vec2,
    pub health: i32,
    pub max_health: i32,
    pub state: EnemyState,
    /// +1 or -1.
    pub direction: f32,
    pub patrol_start_x: f32,
    /// Sim time of the last landed attack.
    pub last_attack: Option<f32>,
    pub time_since_death: f32,
}

impl Enemy {
    pub fn new(id: u64, kind: EnemyKind, pos: Vec2, direction: f32) -> Self {
        let health = kind.stats().health;
        Self {
            id,
            kind,
            pos,
            vel: Vec2::ZERO,
            health,
            max_health: health,
            state: EnemyState::Patrol,
            direction: if direction < 0.0 { -1.0 } else { 1.0 },
            patrol_start_x: pos.x,
            last_attack: None,
            time_since_death: 0.0,
        }
    }

    pub fn stats(&self) -> &'static EnemyStats {
        self.kind.stats()
    }

    pub fn rect(&self) -> Rect {
        let s = self.stats();
        Rect::from_center(self.pos, s.width, s.height)
    }

    pub fn is_alive(&self) -> bool {
        self.health > 0 && self.state != EnemyState::Dead
    }

    /// Apply player damage. Returns true if this hit was lethal.
    pub fn take_hit(&mut self, damage: i32) -> bool {
        if !self.is_alive() {
            return false;
        }
        self.health = (self.health - damage).max(0);
        if self.health == 0 {
            self.state = EnemyState::Dead;
            self.vel = Vec2::ZERO;
            return true;
        }
        false
    }

    /// Dead long enough for the corpse to be cleared.
    pub fn should_remove(&self, corpse_time: f32) -> bool {
        self.state == EnemyState::Dead && self.time_since_death >= corpse_time
    }

    /// Run the state machine for one tick. Returns damage dealt to the
    /// player by an attack this tick.
    pub fn update(&mut self, target: Vec2, now: f32, dt: f32, terrain: &Terrain) -> Option<i32> {
        if self.health <= 0 || self.state == EnemyState::Dead {
            self.state = EnemyState::Dead;
            self.time_since_death += dt;
            return None;
        }

        let stats = *self.stats();
        let dx = target.x - self.pos.x;
        let dy = target.y - self.pos.y;
        let distance = (dx * dx + dy * dy).sqrt();
        let mut dealt = None;

        match self.state {
            EnemyState::Patrol => {
                self.vel.x = stats.speed * self.direction * PATROL_SPEED_FACTOR;
                self.pos.x += self.vel.x * dt;
                if (self.pos.x - self.patrol_start_x).abs() > stats.patrol_distance {
                    self.direction = -self.direction;
                }
                if distance < stats.detection_range {
                    self.state = EnemyState::Chase;
                    tracing::debug!(id = self.id, kind = self.kind.name(), "enemy gives chase");
                }
            },
            EnemyState::Chase => {
                let step = if dx > 0.0 { 1.0 } else { -1.0 };
                self.direction = step;
                self.vel.x = stats.chase_speed * step;
                self.pos.x += self.vel.x * dt;
                if stats.flying {
                    self.vel.y = if dy.abs() > 2.0 {
                        dy.signum() * stats.chase_speed * 0.5
                    } else {
                        0.0
                    };
                    self.pos.y += self.vel.y * dt;
                }
                if distance < stats.attack_range {
                    self.state = EnemyState::Attack;
                } else if distance > stats.detection_range * CHASE_GIVE_UP {
                    self.state = EnemyState::Patrol;
                    self.patrol_start_x = self.pos.x;
                }
            },
            EnemyState::Attack => {
                self.vel.x = 0.0;
                let ready = self
                    .last_attack
                    .is_none_or(|last| now - last > stats.attack_cooldown);
                if ready {
                    self.last_attack = Some(now);
                    dealt = Some(stats.damage);
                }
                if distance > stats.attack_range {
                    self.state = EnemyState::Chase;
                }
            },
            EnemyState::Dead => {},
        }

        if stats.flying {
            if self.state != EnemyState::Chase {
                self.vel.y = 0.0;
            }
        } else {
            self.vel.y += terrain.gravity * dt;
            self.pos.y += self.vel.y * dt;
            let rest = terrain.ground_y - stats.height / 2.0;
            if self.pos.y >= rest {
                self.pos.y = rest;
                self.vel.y = 0.0;
            }
        }
        self.pos.x = self.pos.x.clamp(0.0, terrain.world_width);
        dealt
    }
}

/// Roll the per-tick spawn chance. On success pick a season-weighted kind
/// and place it `min..min+span` px to one side of the player, trying the
/// other side if the first lands outside the world.
pub fn roll_spawn(
    rng: &mut SeededRng,
    cfg: &SpawnConfig,
    season: Season,
    player_x: f32,
    terrain: &Terrain,
    alive: usize,
    next_id: &mut u64,
) -> Option<Enemy> {
    if rng.next_f64() >= cfg.enemy_spawn_chance {
        return None;
    }
    if alive >= cfg.max_enemies {
        return None;
    }
    let kind = EnemyKind::ALL[rng.weighted_choice(&EnemyKind::spawn_weights(season))];
    let distance = cfg.enemy_spawn_min_distance
        + rng.next_f64() as f32 * cfg.enemy_spawn_distance_span;
    let side = if rng.bool() { 1.0 } else { -1.0 };

    let in_world = |x: f32| (0.0..=terrain.world_width).contains(&x);
    let x = [player_x + side * distance, player_x - side * distance]
        .into_iter()
        .find(|&x| in_world(x))?;

    let stats = kind.stats();
    let y = if stats.flying {
        terrain.ground_y - HAWK_ALTITUDE
    } else {
        terrain.ground_y - stats.height / 2.0
    };
    let id = *next_id;
    *next_id += 1;
    // Face the player.
    let direction = if player_x < x { -1.0 } else { 1.0 };
    tracing::info!(id, kind = kind.name(), x, "enemy spawned");
    Some(Enemy::new(id, kind, Vec2::new(x, y), direction))
}

/// A player swing that connected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hit {
    pub id: u64,
    pub kind: EnemyKind,
    pub killed: bool,
}

/// Damage every live enemy whose center is within `range` of `hitbox`.
pub fn resolve_attack(enemies: &mut [Enemy], hitbox: Vec2, range: f32, damage: i32) -> Vec<Hit> {
    let mut hits = Vec::new();
    for enemy in enemies.iter_mut().filter(|e| e.is_alive()) {
        if enemy.pos.distance(hitbox) < range {
            let killed = enemy.take_hit(damage);
            if killed {
                tracing::info!(id = enemy.id, kind = enemy.kind.name(), "enemy defeated");
            }
            hits.push(Hit {
                id: enemy.id,
                kind: enemy.kind,
                killed,
            });
        }
    }
    hits
}

/// Damage from the first live enemy touching the player, if any.
pub fn contact_damage(enemies: &[Enemy], player: Vec2, reach_x: f32, reach_y: f32) -> Option<i32> {
    enemies
        .iter()
        .filter(|e| e.is_alive())
        .find(|e| (player.x - e.pos.x).abs() < reach_x && (player.y - e.pos.y).abs() < reach_y)
        .map(|e| e.stats().damage)
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 1.0 / 60.0;

    fn terrain() -> Terrain {
        Terrain {
            ground_y: 512.0,
            world_width: 3200.0,
            gravity: 1600.0,
        }
    }

    fn wolf_at(x: f32) -> Enemy {
        Enemy::new(1, EnemyKind::Wolf, Vec2::new(x, 512.0 - 16.0), 1.0)
    }

    #[test]
    fn patrol_enters_chase_just_inside_detection() {
        let mut wolf = wolf_at(1000.0);
        let range = wolf.stats().detection_range;
        // Account for the patrol step taken before the range check.
        let step = wolf.stats().speed * PATROL_SPEED_FACTOR * DT;
        let target = Vec2::new(wolf.pos.x + step + range - 1.0, wolf.pos.y);
        wolf.update(target, 0.0, DT, &terrain());
        assert_eq!(wolf.state, EnemyState::Chase);
    }

    #[test]
    fn patrol_ignores_player_outside_detection() {
        let mut wolf = wolf_at(1000.0);
        let target = Vec2::new(1000.0 + 400.0, wolf.pos.y);
        wolf.update(target, 0.0, DT, &terrain());
        assert_eq!(wolf.state, EnemyState::Patrol);
    }

    #[test]
    fn chase_has_hysteresis() {
        let mut wolf = wolf_at(1000.0);
        wolf.state = EnemyState::Chase;
        let range = wolf.stats().detection_range;
        // Beyond detection but inside the give-up band: keep chasing.
        for _ in 0..5 {
            let target = Vec2::new(wolf.pos.x + range * 1.4, wolf.pos.y);
            wolf.update(target, 0.0, DT, &terrain());
            assert_eq!(wolf.state, EnemyState::Chase);
        }
        let target = Vec2::new(wolf.pos.x + range * 1.5 + 10.0, wolf.pos.y);
        wolf.update(target, 0.0, DT, &terrain());
        assert_eq!(wolf.state, EnemyState::Patrol);
    }

    #[test]
    fn chase_moves_toward_player() {
        let mut wolf = wolf_at(1000.0);
        wolf.state = EnemyState::Chase;
        let before = wolf.pos.x;
        wolf.update(Vec2::new(800.0, wolf.pos.y), 0.0, DT, &terrain());
        assert!(wolf.pos.x < before);
        assert_eq!(wolf.direction, -1.0);
    }

    #[test]
    fn attack_respects_cooldown() {
        let mut wolf = wolf_at(1000.0);
        wolf.state = EnemyState::Attack;
        let target = Vec2::new(1010.0, wolf.pos.y);
        assert_eq!(wolf.update(target, 5.0, DT, &terrain()), Some(1));
        assert_eq!(wolf.update(target, 5.5, DT, &terrain()), None);
        assert_eq!(wolf.update(target, 6.1, DT, &terrain()), Some(1));
        assert_eq!(wolf.state, EnemyState::Attack);
    }

    #[test]
    fn attack_reverts_to_chase_when_out_of_range() {
        let mut wolf = wolf_at(1000.0);
        wolf.state = EnemyState::Attack;
        wolf.update(Vec2::new(1100.0, wolf.pos.y), 0.0, DT, &terrain());
        assert_eq!(wolf.state, EnemyState::Chase);
    }

    #[test]
    fn ground_enemies_rest_on_ground() {
        let mut bear = Enemy::new(2, EnemyKind::Bear, Vec2::new(500.0, 300.0), 1.0);
        for _ in 0..120 {
            bear.update(Vec2::new(3000.0, 0.0), 0.0, DT, &terrain());
        }
        assert_eq!(bear.pos.y, 512.0 - 24.0);
    }

    #[test]
    fn hawks_ignore_gravity() {
        let mut hawk = Enemy::new(3, EnemyKind::Hawk, Vec2::new(500.0, 362.0), 1.0);
        for _ in 0..60 {
            hawk.update(Vec2::new(3000.0, 0.0), 0.0, DT, &terrain());
        }
        assert_eq!(hawk.pos.y, 362.0);
    }

    #[test]
    fn death_is_immediate_and_removal_deferred() {
        let mut wolf = wolf_at(1000.0);
        assert!(!wolf.take_hit(2));
        assert!(wolf.take_hit(1));
        assert_eq!(wolf.state, EnemyState::Dead);
        assert!(!wolf.take_hit(1), "already dead");
        for _ in 0..30 {
            wolf.update(Vec2::ZERO, 0.0, DT, &terrain());
        }
        assert!(!wolf.should_remove(1.0));
        for _ in 0..31 {
            wolf.update(Vec2::ZERO, 0.0, DT, &terrain());
        }
        assert!(wolf.should_remove(1.0));
    }

    #[test]
    fn attack_hits_only_nearby_live_enemies() {
        let mut enemies = vec![wolf_at(150.0), wolf_at(400.0)];
        enemies[1].id = 2;
        let hitbox = Vec2::new(150.0, 512.0 - 16.0);
        let hits = resolve_attack(&mut enemies, hitbox, 50.0, 3);
        assert_eq!(
            hits,
            vec![Hit {
                id: 1,
                kind: EnemyKind::Wolf,
                killed: true
            }]
        );
        assert!(resolve_attack(&mut enemies, hitbox, 50.0, 3).is_empty());
    }

    #[test]
    fn contact_skips_the_dead() {
        let mut enemies = vec![wolf_at(100.0)];
        let player = Vec2::new(120.0, 496.0);
        assert_eq!(contact_damage(&enemies, player, 60.0, 70.0), Some(1));
        enemies[0].take_hit(10);
        assert_eq!(contact_damage(&enemies, player, 60.0, 70.0), None);
    }

    #[test]
    fn winter_never_spawns_bears() {
        let weights = EnemyKind::spawn_weights(Season::Winter);
        assert_eq!(weights[1], 0.0);
        let mut rng = SeededRng::new(7);
        for _ in 0..500 {
            let kind = EnemyKind::ALL[rng.weighted_choice(&weights)];
            assert_ne!(kind, EnemyKind::Bear);
        }
    }

    #[test]
    fn spawns_land_in_world_and_away_from_player() {
        let cfg = SpawnConfig {
            enemy_spawn_chance: 1.0,
            ..SpawnConfig::default()
        };
        let mut rng = SeededRng::new(99);
        let mut next_id = 1;
        for _ in 0..200 {
            let enemy = roll_spawn(&mut rng, &cfg, Season::Fall, 100.0, &terrain(), 0, &mut next_id)
                .unwrap();
            assert!(enemy.pos.x >= 600.0 + 100.0 - 1e-3);
            assert!(enemy.pos.x <= 3200.0);
        }
        assert_eq!(next_id, 201);
    }

    #[test]
    fn spawn_respects_cap() {
        let cfg = SpawnConfig {
            enemy_spawn_chance: 1.0,
            ..SpawnConfig::default()
        };
        let mut rng = SeededRng::new(5);
        let mut next_id = 1;
        let got = roll_spawn(
            &mut rng,
            &cfg,
            Season::Spring,
            1600.0,
            &terrain(),
            cfg.max_enemies,
            &mut next_id,
        );
        assert!(got.is_none());
        assert_eq!(next_id, 1);
    }
}
