use serde::{Deserialize, Serialize};

use hoarder_core::world_time::CalendarConfig;

/// Downward acceleration (px/s^2, y grows downward).
pub const GRAVITY: f32 = 1600.0;
/// Horizontal acceleration while input is held (px/s^2).
pub const MOVE_ACCEL: f32 = 2200.0;
/// Top running speed before encumbrance (px/s).
pub const MAX_RUN_SPEED: f32 = 190.0;
/// Vertical velocity applied by a jump (px/s, negative is up).
pub const JUMP_VELOCITY: f32 = -520.0;
/// Horizontal velocity while dashing (px/s).
pub const DASH_SPEED: f32 = 320.0;
/// Velocity multiplier per tick without input, on the ground.
pub const GROUND_FRICTION: f32 = 0.85;
/// Velocity multiplier per tick without input, in the air.
pub const AIR_FRICTION: f32 = 0.95;

pub const PLAYER_WIDTH: f32 = 24.0;
pub const PLAYER_HEIGHT: f32 = 32.0;
pub const STAMINA_MAX: f32 = 100.0;
/// Stamina regained per second while not dashing.
pub const STAMINA_RECOVERY: f32 = 18.0;
/// Minimum stamina to start a dash; also drained per second while dashing.
pub const STAMINA_DASH_COST: f32 = 25.0;

pub const TILE_SIZE: f32 = 32.0;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    pub gravity: f32,
    pub move_accel: f32,
    pub max_run_speed: f32,
    pub jump_velocity: f32,
    pub dash_speed: f32,
    pub ground_friction: f32,
    pub air_friction: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: GRAVITY,
            move_accel: MOVE_ACCEL,
            max_run_speed: MAX_RUN_SPEED,
            jump_velocity: JUMP_VELOCITY,
            dash_speed: DASH_SPEED,
            ground_friction: GROUND_FRICTION,
            air_friction: AIR_FRICTION,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    pub width: f32,
    pub height: f32,
    pub max_health: i32,
    pub max_stamina: f32,
    pub stamina_recovery: f32,
    pub stamina_dash_cost: f32,
    pub max_carry_weight: f32,
    /// Extra carry weight per basket upgrade level.
    pub basket_bonus: f32,
    /// Encumbrance never slows the player below this fraction of top speed.
    pub min_speed_multiplier: f32,
    pub spawn_x: f32,
    pub spawn_y: f32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            width: PLAYER_WIDTH,
            height: PLAYER_HEIGHT,
            max_health: 5,
            max_stamina: STAMINA_MAX,
            stamina_recovery: STAMINA_RECOVERY,
            stamina_dash_cost: STAMINA_DASH_COST,
            max_carry_weight: 20.0,
            basket_bonus: 5.0,
            min_speed_multiplier: 0.3,
            spawn_x: 100.0,
            spawn_y: 400.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatConfig {
    pub attack_cooldown: f32,
    /// Distance from the player to the hitbox center, and the hitbox radius.
    pub attack_range: f32,
    pub attack_damage: i32,
    pub invincibility_time: f32,
    /// Half-extents of the enemy contact box around the player center.
    pub contact_dx: f32,
    pub contact_dy: f32,
    /// Seconds a dead enemy lingers before removal.
    pub corpse_time: f32,
    pub spike_damage: i32,
    pub pit_damage: i32,
    pub shake_on_hit: f32,
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self {
            attack_cooldown: 0.5,
            attack_range: 50.0,
            attack_damage: 1,
            invincibility_time: 1.0,
            contact_dx: 60.0,
            contact_dy: 70.0,
            corpse_time: 1.0,
            spike_damage: 1,
            pit_damage: 1,
            shake_on_hit: 6.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeConfig {
    pub seconds_per_day: f32,
    pub days_per_season: u32,
    /// Calories the squirrel eats from the pantry each winter day.
    pub calories_per_day_winter: u32,
    /// Calories saved per insulation level.
    pub insulation_bonus: u32,
}

impl TimeConfig {
    pub fn calendar(&self) -> CalendarConfig {
        CalendarConfig {
            seconds_per_day: self.seconds_per_day,
            days_per_season: self.days_per_season,
        }
    }
}

impl Default for TimeConfig {
    fn default() -> Self {
        let calendar = CalendarConfig::default();
        Self {
            seconds_per_day: calendar.seconds_per_day,
            days_per_season: calendar.days_per_season,
            calories_per_day_winter: 10,
            insulation_bonus: 2,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnConfig {
    pub pickup_target: usize,
    pub pickup_x_min: f32,
    pub pickup_x_span: f32,
    pub powerup_target: usize,
    pub powerup_x_min: f32,
    pub powerup_x_span: f32,
    /// Half-extents of the collection box around the player center.
    pub pickup_reach_x: f32,
    pub pickup_reach_y: f32,
    /// Collection half-extent while a magnet is active.
    pub magnet_reach: f32,
    /// Chance per tick of attempting an enemy spawn.
    pub enemy_spawn_chance: f64,
    pub enemy_spawn_min_distance: f32,
    pub enemy_spawn_distance_span: f32,
    pub max_enemies: usize,
}

impl Default for SpawnConfig {
    fn default() -> Self {
        Self {
            pickup_target: 8,
            pickup_x_min: 200.0,
            pickup_x_span: 2000.0,
            powerup_target: 3,
            powerup_x_min: 300.0,
            powerup_x_span: 1800.0,
            pickup_reach_x: 20.0,
            pickup_reach_y: 24.0,
            magnet_reach: 96.0,
            enemy_spawn_chance: 0.001,
            enemy_spawn_min_distance: 600.0,
            enemy_spawn_distance_span: 800.0,
            max_enemies: 6,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelConfig {
    pub width: f32,
    pub height: f32,
    pub tile_size: f32,
    /// Fraction of the world height covered by the solid ground band.
    pub ground_band: f32,
    /// Seeded pickups scattered above the ground at level creation.
    pub scatter_pickups: usize,
    pub viewport_width: f32,
    pub viewport_height: f32,
}

impl LevelConfig {
    /// The y of the ground surface: the top edge of the ground band.
    pub fn ground_y(&self) -> f32 {
        let rows = (self.height / self.tile_size).ceil();
        (rows * (1.0 - self.ground_band)).floor() * self.tile_size
    }
}

impl Default for LevelConfig {
    fn default() -> Self {
        Self {
            width: 3200.0,
            height: 640.0,
            tile_size: TILE_SIZE,
            ground_band: 0.2,
            scatter_pickups: 12,
            viewport_width: 800.0,
            viewport_height: 600.0,
        }
    }
}

/// Every balance knob of the forest game.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ForestConfig {
    pub physics: PhysicsConfig,
    pub player: PlayerConfig,
    pub combat: CombatConfig,
    pub time: TimeConfig,
    pub spawns: SpawnConfig,
    pub level: LevelConfig,
}

impl ForestConfig {
    /// Load config from a TOML file. Falls back to defaults if the file is missing
    /// or unparseable.
    pub fn load() -> Self {
        let path = std::env::var("HOARDER_FOREST_CONFIG")
            .unwrap_or_else(|_| "config/forest.toml".to_string());
        match std::fs::read_to_string(&path) {
            Ok(content) => Self::from_toml(&content).unwrap_or_else(|e| {
                tracing::warn!("Failed to parse {path}: {e}, using defaults");
                ForestConfig::default()
            }),
            Err(_) => ForestConfig::default(),
        }
    }

    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }
}
