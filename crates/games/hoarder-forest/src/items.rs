use serde::{Deserialize, Serialize};

/// Everything the squirrel can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Acorn,
    Hazelnut,
    Berry,
    Mushroom,
    Pine,
    Leaf,
    Twig,
    Preserved,
}

impl ItemKind {
    /// Kinds that spawn loose in the world.
    pub const FORAGEABLE: [ItemKind; 7] = [
        ItemKind::Acorn,
        ItemKind::Hazelnut,
        ItemKind::Berry,
        ItemKind::Mushroom,
        ItemKind::Pine,
        ItemKind::Leaf,
        ItemKind::Twig,
    ];

    /// Kinds scattered by level generation.
    pub const SCATTERED: [ItemKind; 4] = [
        ItemKind::Acorn,
        ItemKind::Hazelnut,
        ItemKind::Berry,
        ItemKind::Mushroom,
    ];

    /// Carry weight of a single unit.
    pub fn weight(self) -> f32 {
        match self {
            ItemKind::Acorn | ItemKind::Hazelnut | ItemKind::Pine | ItemKind::Preserved => 1.0,
            ItemKind::Berry | ItemKind::Mushroom => 0.5,
            ItemKind::Leaf => 0.2,
            ItemKind::Twig => 0.3,
        }
    }

    /// Food value of a single unit. Materials are worth nothing.
    pub fn calories(self) -> u32 {
        match self {
            ItemKind::Acorn | ItemKind::Hazelnut => 2,
            ItemKind::Berry | ItemKind::Mushroom => 1,
            ItemKind::Preserved => 3,
            ItemKind::Pine | ItemKind::Leaf | ItemKind::Twig => 0,
        }
    }

    pub fn is_food(self) -> bool {
        self.calories() > 0
    }

    pub fn is_material(self) -> bool {
        !self.is_food()
    }

    pub fn name(self) -> &'static str {
        match self {
            ItemKind::Acorn => "acorn",
            ItemKind::Hazelnut => "hazelnut",
            ItemKind::Berry => "berry",
            ItemKind::Mushroom => "mushroom",
            ItemKind::Pine => "pine",
            ItemKind::Leaf => "leaf",
            ItemKind::Twig => "twig",
            ItemKind::Preserved => "preserved",
        }
    }
}

/// A quantity of one item kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemStack {
    pub item: ItemKind,
    pub quantity: u32,
}
