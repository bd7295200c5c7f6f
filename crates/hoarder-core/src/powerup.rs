use serde::{Deserialize, Serialize, de::DeserializeOwned};

/// Trait for game-specific power-up kind enums.
pub trait PowerUpKind: Clone + Copy + PartialEq + Serialize + DeserializeOwned {
    /// Duration in seconds. `f32::INFINITY` never expires, `0.0` is an instant effect.
    fn duration(&self) -> f32;

    /// Instant effects are applied on pickup and never join the active list.
    fn is_instant(&self) -> bool {
        self.duration() <= 0.0
    }
}

/// A timed effect currently running on the player.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct ActivePowerUp<K: PowerUpKind> {
    pub kind: K,
    pub remaining: f32,
}

impl<K: PowerUpKind> ActivePowerUp<K> {
    pub fn new(kind: K) -> Self {
        Self {
            remaining: kind.duration(),
            kind,
        }
    }

    pub fn tick(&mut self, dt: f32) {
        if self.remaining.is_finite() {
            self.remaining -= dt;
        }
    }

    pub fn is_expired(&self) -> bool {
        self.remaining <= 0.0
    }
}

/// Active effects with refresh-on-repeat semantics.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct ActiveEffects<K: PowerUpKind> {
    effects: Vec<ActivePowerUp<K>>,
}

impl<K: PowerUpKind> ActiveEffects<K> {
    pub fn new() -> Self {
        Self {
            effects: Vec::new(),
        }
    }

    /// Start an effect. Picking up a kind that is already running refreshes
    /// its timer instead of stacking.
    pub fn add(&mut self, kind: K) {
        if let Some(existing) = self.effects.iter_mut().find(|e| e.kind == kind) {
            existing.remaining = kind.duration();
        } else {
            self.effects.push(ActivePowerUp::new(kind));
        }
    }

    /// Advance all timers and return the kinds that ran out this tick.
    pub fn tick(&mut self, dt: f32) -> Vec<K> {
        let mut expired = Vec::new();
        for effect in &mut self.effects {
            effect.tick(dt);
            if effect.is_expired() {
                expired.push(effect.kind);
            }
        }
        self.effects.retain(|e| !e.is_expired());
        expired
    }

    pub fn has(&self, kind: K) -> bool {
        self.effects.iter().any(|e| e.kind == kind)
    }

    pub fn remaining(&self, kind: K) -> Option<f32> {
        self.effects
            .iter()
            .find(|e| e.kind == kind)
            .map(|e| e.remaining)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ActivePowerUp<K>> {
        self.effects.iter()
    }

    pub fn len(&self) -> usize {
        self.effects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    pub fn clear(&mut self) {
        self.effects.clear();
    }
}

impl<K: PowerUpKind> Default for ActiveEffects<K> {
    fn default() -> Self {
        Self::new()
    }
}
