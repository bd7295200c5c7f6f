//! Read-only per-frame view of the simulation for a renderer.

use serde::Serialize;

use hoarder_core::world_time::{Season, Weather};

use crate::enemy::{EnemyKind, EnemyState};
use crate::items::ItemKind;
use crate::physics::Vec2;
use crate::player::{Facing, PlayerAction};
use crate::powerups::PowerUpType;
use crate::win_lose::Outcome;

/// Vertical bob amplitude for floating pickups, in px.
pub const BOB_AMPLITUDE: f32 = 3.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Palette {
    pub primary: &'static str,
    pub secondary: &'static str,
    pub accent: &'static str,
    pub background: &'static str,
}

pub fn palette(season: Season) -> Palette {
    match season {
        Season::Spring => Palette {
            primary: "#8FBC8F",
            secondary: "#98FB98",
            accent: "#90EE90",
            background: "#F0FFF0",
        },
        Season::Summer => Palette {
            primary: "#228B22",
            secondary: "#32CD32",
            accent: "#00FF00",
            background: "#F5FFFA",
        },
        Season::Fall => Palette {
            primary: "#CD853F",
            secondary: "#DEB887",
            accent: "#FF8C00",
            background: "#FFF8DC",
        },
        Season::Winter => Palette {
            primary: "#4682B4",
            secondary: "#87CEEB",
            accent: "#B0E0E6",
            background: "#F0F8FF",
        },
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerPose {
    /// Interpolated between the last two ticks.
    pub pos: Vec2,
    pub facing: Facing,
    pub action: PlayerAction,
    pub health: i32,
    pub max_health: i32,
    pub stamina: f32,
    pub invincible: bool,
    pub carry_weight: f32,
    pub max_carry_weight: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnemyPose {
    pub id: u64,
    pub kind: EnemyKind,
    pub pos: Vec2,
    pub state: EnemyState,
    pub direction: f32,
    pub health: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PickupPose {
    pub id: u64,
    pub kind: ItemKind,
    pub pos: Vec2,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PowerUpPose {
    pub id: u64,
    pub kind: PowerUpType,
    pub pos: Vec2,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderSnapshot {
    pub camera: Vec2,
    pub parallax: [f32; 4],
    pub palette: Palette,
    pub player: PlayerPose,
    pub enemies: Vec<EnemyPose>,
    pub pickups: Vec<PickupPose>,
    pub powerups: Vec<PowerUpPose>,
    pub nest_level: u32,
    pub season: Season,
    pub day: u32,
    pub weather: Weather,
    pub clock: String,
    pub paused: bool,
    pub outcome: Option<Outcome>,
}

/// Blend the previous and current tick positions by `alpha` in `[0, 1]`.
pub fn interpolate(prev: Vec2, current: Vec2, alpha: f32) -> Vec2 {
    prev.lerp(current, alpha.clamp(0.0, 1.0))
}

/// Display position of a bobbing pickup.
pub fn bobbed(pos: Vec2, bob: f32) -> Vec2 {
    Vec2::new(pos.x, pos.y + bob.sin() * BOB_AMPLITUDE)
}
