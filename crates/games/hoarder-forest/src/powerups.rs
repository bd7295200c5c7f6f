use serde::{Deserialize, Serialize};

use hoarder_core::powerup::{ActiveEffects, PowerUpKind};
use hoarder_core::world_time::Season;

use crate::player::Player;

pub const SPEED_BOOST_MULTIPLIER: f32 = 1.5;
pub const INVINCIBILITY_DURATION: f32 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PowerUpType {
    Health,
    StaminaBoost,
    SpeedBoost,
    Invincibility,
    Magnet,
    DoublePoints,
}

impl PowerUpKind for PowerUpType {
    fn duration(&self) -> f32 {
        match self {
            // Invincibility lives on the player's own timer.
            PowerUpType::Health | PowerUpType::StaminaBoost | PowerUpType::Invincibility => 0.0,
            PowerUpType::SpeedBoost => 10.0,
            PowerUpType::Magnet => 15.0,
            PowerUpType::DoublePoints => 20.0,
        }
    }
}

impl PowerUpType {
    pub const ALL: [PowerUpType; 6] = [
        PowerUpType::Health,
        PowerUpType::StaminaBoost,
        PowerUpType::SpeedBoost,
        PowerUpType::Invincibility,
        PowerUpType::Magnet,
        PowerUpType::DoublePoints,
    ];

    pub fn name(self) -> &'static str {
        match self {
            PowerUpType::Health => "health",
            PowerUpType::StaminaBoost => "stamina_boost",
            PowerUpType::SpeedBoost => "speed_boost",
            PowerUpType::Invincibility => "invincibility",
            PowerUpType::Magnet => "magnet",
            PowerUpType::DoublePoints => "double_points",
        }
    }

    /// Relative spawn weights, indexed like [`PowerUpType::ALL`].
    pub fn spawn_weights(season: Season) -> [f64; 6] {
        match season {
            Season::Spring => [0.3, 0.2, 0.2, 0.05, 0.15, 0.1],
            Season::Summer => [0.2, 0.25, 0.2, 0.05, 0.15, 0.15],
            Season::Fall => [0.2, 0.15, 0.15, 0.1, 0.2, 0.2],
            Season::Winter => [0.35, 0.25, 0.1, 0.15, 0.1, 0.05],
        }
    }
}

pub type Effects = ActiveEffects<PowerUpType>;

/// Apply a freshly collected power-up: instant kinds hit the player now,
/// timed kinds join the active list.
pub fn apply(kind: PowerUpType, player: &mut Player, effects: &mut Effects) {
    match kind {
        PowerUpType::Health => player.heal(1),
        PowerUpType::StaminaBoost => player.stamina = player.max_stamina,
        PowerUpType::Invincibility => {
            player.invincibility = player.invincibility.max(INVINCIBILITY_DURATION);
        },
        PowerUpType::SpeedBoost | PowerUpType::Magnet | PowerUpType::DoublePoints => {
            effects.add(kind);
        },
    }
}

pub fn speed_multiplier(effects: &Effects) -> f32 {
    if effects.has(PowerUpType::SpeedBoost) {
        SPEED_BOOST_MULTIPLIER
    } else {
        1.0
    }
}

/// Quest progress per collected item.
pub fn quest_multiplier(effects: &Effects) -> u32 {
    if effects.has(PowerUpType::DoublePoints) { 2 } else { 1 }
}
