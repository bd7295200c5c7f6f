use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::TimeConfig;
use crate::items::ItemKind;
use crate::player::Player;

pub const MAX_UPGRADE_LEVEL: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UpgradeKind {
    /// +carry weight per level.
    Basket,
    /// Lowers the winter ration.
    Insulation,
    /// Unlocks preserving berries and mushrooms.
    Rack,
    Pillow,
    Map,
}

impl UpgradeKind {
    pub const ALL: [UpgradeKind; 5] = [
        UpgradeKind::Basket,
        UpgradeKind::Insulation,
        UpgradeKind::Rack,
        UpgradeKind::Pillow,
        UpgradeKind::Map,
    ];

    /// Materials spent per level. The price does not scale with level.
    pub fn cost(self) -> &'static [(ItemKind, u32)] {
        match self {
            UpgradeKind::Basket => &[(ItemKind::Leaf, 20), (ItemKind::Pine, 10)],
            UpgradeKind::Insulation => &[(ItemKind::Leaf, 30), (ItemKind::Pine, 15)],
            UpgradeKind::Rack => &[(ItemKind::Pine, 25), (ItemKind::Leaf, 15)],
            UpgradeKind::Pillow => &[(ItemKind::Leaf, 40), (ItemKind::Pine, 5)],
            UpgradeKind::Map => &[(ItemKind::Pine, 20), (ItemKind::Leaf, 10)],
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            UpgradeKind::Basket => "basket",
            UpgradeKind::Insulation => "insulation",
            UpgradeKind::Rack => "rack",
            UpgradeKind::Pillow => "pillow",
            UpgradeKind::Map => "map",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpgradeError {
    Maxed(UpgradeKind),
    Unaffordable(UpgradeKind),
}

impl fmt::Display for UpgradeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UpgradeError::Maxed(kind) => {
                write!(f, "{} is already at level {MAX_UPGRADE_LEVEL}", kind.name())
            },
            UpgradeError::Unaffordable(kind) => {
                write!(f, "not enough materials for {}", kind.name())
            },
        }
    }
}

impl std::error::Error for UpgradeError {}

/// Totals moved by one deposit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Deposit {
    pub food: u32,
    pub materials: u32,
}

impl Deposit {
    pub fn is_empty(&self) -> bool {
        self.food == 0 && self.materials == 0
    }
}

/// Result of one winter day's meal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Ration {
    pub needed: u32,
    pub eaten: u32,
}

impl Ration {
    pub fn shortfall(&self) -> u32 {
        self.needed.saturating_sub(self.eaten)
    }
}

/// The home base: pantry, building materials and upgrades.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Nest {
    pub pantry: BTreeMap<ItemKind, u32>,
    pub materials: BTreeMap<ItemKind, u32>,
    pub upgrades: BTreeMap<UpgradeKind, u32>,
    pub decorations: Vec<String>,
}

impl Nest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty the player's inventory: food to the pantry, everything else to materials.
    pub fn deposit_all(&mut self, player: &mut Player) -> Deposit {
        let mut deposit = Deposit::default();
        for stack in player.take_all() {
            if stack.item.is_food() {
                *self.pantry.entry(stack.item).or_default() += stack.quantity;
                deposit.food += stack.quantity;
            } else {
                *self.materials.entry(stack.item).or_default() += stack.quantity;
                deposit.materials += stack.quantity;
            }
        }
        if !deposit.is_empty() {
            tracing::debug!(food = deposit.food, materials = deposit.materials, "deposited at nest");
        }
        deposit
    }

    pub fn add_materials(&mut self, kind: ItemKind, quantity: u32) {
        if quantity > 0 {
            *self.materials.entry(kind).or_default() += quantity;
        }
    }

    pub fn add_food(&mut self, kind: ItemKind, quantity: u32) {
        if quantity > 0 && kind.is_food() {
            *self.pantry.entry(kind).or_default() += quantity;
        }
    }

    pub fn material(&self, kind: ItemKind) -> u32 {
        self.materials.get(&kind).copied().unwrap_or(0)
    }

    pub fn food(&self, kind: ItemKind) -> u32 {
        self.pantry.get(&kind).copied().unwrap_or(0)
    }

    pub fn upgrade_level(&self, kind: UpgradeKind) -> u32 {
        self.upgrades.get(&kind).copied().unwrap_or(0)
    }

    /// Sum of all upgrade levels; drives the nest sprite.
    pub fn total_upgrade_levels(&self) -> u32 {
        self.upgrades.values().sum()
    }

    pub fn can_afford(&self, kind: UpgradeKind) -> bool {
        kind.cost()
            .iter()
            .all(|&(item, amount)| self.material(item) >= amount)
    }

    /// Spend materials and raise `kind` one level. Returns the new level.
    pub fn purchase_upgrade(&mut self, kind: UpgradeKind) -> Result<u32, UpgradeError> {
        if self.upgrade_level(kind) >= MAX_UPGRADE_LEVEL {
            return Err(UpgradeError::Maxed(kind));
        }
        if !self.can_afford(kind) {
            return Err(UpgradeError::Unaffordable(kind));
        }
        for &(item, amount) in kind.cost() {
            if let Some(have) = self.materials.get_mut(&item) {
                *have -= amount;
            }
        }
        let level = self.upgrades.entry(kind).or_default();
        *level += 1;
        tracing::info!(upgrade = kind.name(), level = *level, "nest upgraded");
        Ok(*level)
    }

    /// Units of food in the pantry.
    pub fn total_food(&self) -> u32 {
        self.pantry.values().sum()
    }

    pub fn total_calories(&self) -> u32 {
        self.pantry
            .iter()
            .map(|(item, count)| item.calories() * count)
            .sum()
    }

    /// Calories one winter day costs after insulation.
    pub fn winter_ration(&self, time: &TimeConfig) -> u32 {
        let saved = self.upgrade_level(UpgradeKind::Insulation) * time.insulation_bonus;
        time.calories_per_day_winter.saturating_sub(saved)
    }

    /// Eat whole units from the pantry until `needed` calories are covered
    /// or the pantry is empty. Richest food is eaten first.
    pub fn eat(&mut self, needed: u32) -> Ration {
        let mut ration = Ration { needed, eaten: 0 };
        let mut order: Vec<ItemKind> = self.pantry.keys().copied().collect();
        order.sort_by_key(|item| std::cmp::Reverse(item.calories()));
        for item in order {
            while ration.eaten < needed {
                let Some(count) = self.pantry.get_mut(&item) else {
                    break;
                };
                if *count == 0 {
                    break;
                }
                *count -= 1;
                ration.eaten += item.calories();
            }
        }
        self.pantry.retain(|_, count| *count > 0);
        ration
    }

    /// With a rack, turn pairs of berries or mushrooms into preserved food.
    /// Returns how many preserved units were made.
    pub fn preserve(&mut self) -> u32 {
        if self.upgrade_level(UpgradeKind::Rack) == 0 {
            return 0;
        }
        let mut made = 0;
        for item in [ItemKind::Berry, ItemKind::Mushroom] {
            if let Some(count) = self.pantry.get_mut(&item) {
                let pairs = *count / 2;
                *count -= pairs * 2;
                made += pairs;
            }
        }
        self.pantry.retain(|_, count| *count > 0);
        self.add_food(ItemKind::Preserved, made);
        made
    }

    /// Upgrades plus decorations; purely cosmetic.
    pub fn coziness(&self) -> u32 {
        self.total_upgrade_levels() + self.decorations.len() as u32
    }
}
