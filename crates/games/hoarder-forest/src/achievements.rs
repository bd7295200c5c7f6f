use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::enemy::EnemyKind;

/// Lifetime counters. Every field only ever increases.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Stats {
    pub items_collected: u32,
    pub enemies_killed: u32,
    pub kills_by_kind: BTreeMap<EnemyKind, u32>,
    pub days_survived: u32,
    pub seasons_completed: u32,
    pub upgrades_built: u32,
    pub quests_completed: u32,
}

impl Stats {
    pub fn record_kill(&mut self, kind: EnemyKind) {
        self.enemies_killed += 1;
        *self.kills_by_kind.entry(kind).or_default() += 1;
    }

    pub fn kills_of(&self, kind: EnemyKind) -> u32 {
        self.kills_by_kind.get(&kind).copied().unwrap_or(0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Condition {
    Collect(u32),
    /// Typed kills count only that kind; `None` counts every kill.
    Kill { enemy: Option<EnemyKind>, total: u32 },
    Survive(u32),
    Season(u32),
    Upgrade(u32),
    Quest(u32),
}

impl Condition {
    /// `(current, target)` for progress bars.
    pub fn progress(&self, stats: &Stats) -> (u32, u32) {
        match *self {
            Condition::Collect(n) => (stats.items_collected, n),
            Condition::Kill { enemy: None, total } => (stats.enemies_killed, total),
            Condition::Kill {
                enemy: Some(kind),
                total,
            } => (stats.kills_of(kind), total),
            Condition::Survive(n) => (stats.days_survived, n),
            Condition::Season(n) => (stats.seasons_completed, n),
            Condition::Upgrade(n) => (stats.upgrades_built, n),
            Condition::Quest(n) => (stats.quests_completed, n),
        }
    }

    pub fn is_met(&self, stats: &Stats) -> bool {
        let (current, target) = self.progress(stats);
        current >= target
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Achievement {
    pub id: &'static str,
    pub title: &'static str,
    pub condition: Condition,
    /// Materials granted on unlock: (leaf, pine).
    pub reward: (u32, u32),
}

pub const ACHIEVEMENTS: &[Achievement] = &[
    Achievement {
        id: "first_forage",
        title: "First Forage",
        condition: Condition::Collect(1),
        reward: (2, 0),
    },
    Achievement {
        id: "hoarder",
        title: "Hoarder",
        condition: Condition::Collect(50),
        reward: (10, 5),
    },
    Achievement {
        id: "squirrel_tycoon",
        title: "Squirrel Tycoon",
        condition: Condition::Collect(200),
        reward: (25, 15),
    },
    Achievement {
        id: "first_blood",
        title: "Tooth and Claw",
        condition: Condition::Kill {
            enemy: None,
            total: 1,
        },
        reward: (5, 0),
    },
    Achievement {
        id: "wolf_hunter",
        title: "Wolf Hunter",
        condition: Condition::Kill {
            enemy: Some(EnemyKind::Wolf),
            total: 5,
        },
        reward: (10, 10),
    },
    Achievement {
        id: "bear_wrestler",
        title: "Bear Wrestler",
        condition: Condition::Kill {
            enemy: Some(EnemyKind::Bear),
            total: 3,
        },
        reward: (15, 10),
    },
    Achievement {
        id: "hawk_eye",
        title: "Hawk Eye",
        condition: Condition::Kill {
            enemy: Some(EnemyKind::Hawk),
            total: 3,
        },
        reward: (10, 5),
    },
    Achievement {
        id: "survivor",
        title: "Survivor",
        condition: Condition::Survive(6),
        reward: (10, 5),
    },
    Achievement {
        id: "seasoned",
        title: "Seasoned",
        condition: Condition::Season(1),
        reward: (10, 10),
    },
    Achievement {
        id: "through_the_year",
        title: "Through the Year",
        condition: Condition::Season(3),
        reward: (20, 20),
    },
    Achievement {
        id: "handy",
        title: "Handy",
        condition: Condition::Upgrade(1),
        reward: (5, 5),
    },
    Achievement {
        id: "architect",
        title: "Architect",
        condition: Condition::Upgrade(5),
        reward: (20, 10),
    },
    Achievement {
        id: "questing",
        title: "Questing",
        condition: Condition::Quest(1),
        reward: (5, 0),
    },
    Achievement {
        id: "adventurer",
        title: "Adventurer",
        condition: Condition::Quest(10),
        reward: (20, 15),
    },
];

pub fn find(id: &str) -> Option<&'static Achievement> {
    ACHIEVEMENTS.iter().find(|a| a.id == id)
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AchievementTracker {
    pub stats: Stats,
    /// Append-only, no duplicates.
    pub unlocked: Vec<String>,
}

impl AchievementTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_unlocked(&self, id: &str) -> bool {
        self.unlocked.iter().any(|u| u == id)
    }

    /// Unlock everything whose condition now holds. Returns only the
    /// achievements unlocked by this call.
    pub fn check(&mut self) -> Vec<&'static Achievement> {
        let mut fresh = Vec::new();
        for achievement in ACHIEVEMENTS {
            if self.is_unlocked(achievement.id) || !achievement.condition.is_met(&self.stats) {
                continue;
            }
            self.unlocked.push(achievement.id.to_string());
            tracing::info!(achievement = achievement.id, "achievement unlocked");
            fresh.push(achievement);
        }
        fresh
    }
}
