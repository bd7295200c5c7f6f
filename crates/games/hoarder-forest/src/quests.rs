//! Daily and seasonal quests.
//!
//! Progress is tracked by quest id in [`QuestLog::progress`]. Completion is
//! always an explicit player action: reaching the target only makes a quest
//! claimable.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use hoarder_core::rng::SeededRng;
use hoarder_core::world_time::Season;

use crate::enemy::EnemyKind;
use crate::items::{ItemKind, ItemStack};
use crate::nest::Nest;
use crate::player::Player;

/// How many daily quests are drawn from the catalogue each day.
pub const DAILY_QUEST_COUNT: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum QuestGoal {
    /// Collect `quantity` of `item`, or of anything when `item` is `None`.
    Collect { item: Option<ItemKind>, quantity: u32 },
    Kill { enemy: Option<EnemyKind>, quantity: u32 },
    Survive { days: u32 },
    Build { upgrades: u32 },
    /// Reach `distance` px from the world's left edge.
    Explore { distance: u32 },
}

impl QuestGoal {
    pub fn target(&self) -> u32 {
        match *self {
            QuestGoal::Collect { quantity, .. } | QuestGoal::Kill { quantity, .. } => quantity,
            QuestGoal::Survive { days } => days,
            QuestGoal::Build { upgrades } => upgrades,
            QuestGoal::Explore { distance } => distance,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Reward {
    Materials { leaf: u32, pine: u32 },
    Health { amount: i32 },
    Stamina,
    /// Delivered straight to the nest so a full basket never loses them.
    Items { items: Vec<ItemStack> },
}

impl Reward {
    pub fn apply(&self, player: &mut Player, nest: &mut Nest) {
        match self {
            Reward::Materials { leaf, pine } => {
                nest.add_materials(ItemKind::Leaf, *leaf);
                nest.add_materials(ItemKind::Pine, *pine);
            },
            Reward::Health { amount } => player.heal(*amount),
            Reward::Stamina => player.stamina = player.max_stamina,
            Reward::Items { items } => {
                for stack in items {
                    if stack.item.is_food() {
                        nest.add_food(stack.item, stack.quantity);
                    } else {
                        nest.add_materials(stack.item, stack.quantity);
                    }
                }
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quest {
    pub id: String,
    pub title: String,
    pub goal: QuestGoal,
    pub reward: Reward,
    pub difficulty: u8,
}

impl Quest {
    fn new(id: &str, title: &str, goal: QuestGoal, reward: Reward, difficulty: u8) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            goal,
            reward,
            difficulty,
        }
    }
}

fn daily_catalogue() -> Vec<Quest> {
    vec![
        Quest::new(
            "gather_acorns",
            "Gather 5 acorns",
            QuestGoal::Collect {
                item: Some(ItemKind::Acorn),
                quantity: 5,
            },
            Reward::Materials { leaf: 5, pine: 2 },
            1,
        ),
        Quest::new(
            "pick_berries",
            "Pick 4 berries",
            QuestGoal::Collect {
                item: Some(ItemKind::Berry),
                quantity: 4,
            },
            Reward::Health { amount: 1 },
            1,
        ),
        Quest::new(
            "pine_cones",
            "Find 3 pine cones",
            QuestGoal::Collect {
                item: Some(ItemKind::Pine),
                quantity: 3,
            },
            Reward::Materials { leaf: 8, pine: 0 },
            1,
        ),
        Quest::new(
            "chase_off_wolf",
            "Drive off a wolf",
            QuestGoal::Kill {
                enemy: Some(EnemyKind::Wolf),
                quantity: 1,
            },
            Reward::Materials { leaf: 10, pine: 5 },
            2,
        ),
        Quest::new(
            "scout_east",
            "Scout the eastern woods",
            QuestGoal::Explore { distance: 1500 },
            Reward::Stamina,
            1,
        ),
        Quest::new(
            "find_mushrooms",
            "Find 2 mushrooms",
            QuestGoal::Collect {
                item: Some(ItemKind::Mushroom),
                quantity: 2,
            },
            Reward::Items {
                items: vec![ItemStack {
                    item: ItemKind::Acorn,
                    quantity: 2,
                }],
            },
            1,
        ),
    ]
}

fn seasonal_catalogue(season: Season) -> Vec<Quest> {
    match season {
        Season::Spring => vec![
            Quest::new(
                "spring_forager",
                "Forage 20 items this spring",
                QuestGoal::Collect {
                    item: None,
                    quantity: 20,
                },
                Reward::Materials { leaf: 15, pine: 10 },
                2,
            ),
            Quest::new(
                "spring_builder",
                "Build a nest upgrade",
                QuestGoal::Build { upgrades: 1 },
                Reward::Items {
                    items: vec![ItemStack {
                        item: ItemKind::Hazelnut,
                        quantity: 3,
                    }],
                },
                2,
            ),
        ],
        Season::Summer => vec![
            Quest::new(
                "summer_guardian",
                "Defeat 3 predators",
                QuestGoal::Kill {
                    enemy: None,
                    quantity: 3,
                },
                Reward::Materials { leaf: 20, pine: 10 },
                3,
            ),
            Quest::new(
                "summer_explorer",
                "Reach the far edge of the forest",
                QuestGoal::Explore { distance: 3000 },
                Reward::Health { amount: 2 },
                2,
            ),
        ],
        Season::Fall => vec![
            Quest::new(
                "fall_harvest",
                "Harvest 40 items before winter",
                QuestGoal::Collect {
                    item: None,
                    quantity: 40,
                },
                Reward::Items {
                    items: vec![ItemStack {
                        item: ItemKind::Preserved,
                        quantity: 4,
                    }],
                },
                3,
            ),
            Quest::new(
                "fall_fortify",
                "Build two nest upgrades",
                QuestGoal::Build { upgrades: 2 },
                Reward::Materials { leaf: 20, pine: 20 },
                3,
            ),
        ],
        Season::Winter => vec![
            Quest::new(
                "winter_endure",
                "Endure five winter days",
                QuestGoal::Survive { days: 5 },
                Reward::Items {
                    items: vec![ItemStack {
                        item: ItemKind::Preserved,
                        quantity: 3,
                    }],
                },
                3,
            ),
            Quest::new(
                "winter_wolves",
                "Drive off 2 winter wolves",
                QuestGoal::Kill {
                    enemy: Some(EnemyKind::Wolf),
                    quantity: 2,
                },
                Reward::Health { amount: 2 },
                3,
            ),
        ],
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuestError {
    Unknown(String),
    NotReady { progress: u32, target: u32 },
}

impl fmt::Display for QuestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuestError::Unknown(id) => write!(f, "no active quest with id {id}"),
            QuestError::NotReady { progress, target } => {
                write!(f, "quest not finished ({progress}/{target})")
            },
        }
    }
}

impl std::error::Error for QuestError {}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuestLog {
    pub daily: Vec<Quest>,
    pub seasonal: Vec<Quest>,
    pub completed: Vec<String>,
    pub progress: BTreeMap<String, u32>,
    /// Where the squirrel stood when each explore quest first saw it.
    pub explore_from: BTreeMap<String, f32>,
}

impl QuestLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the daily pool with a fresh draw from the catalogue.
    /// Unfinished dailies and their progress are dropped.
    pub fn regenerate_daily(&mut self, day_index: u32, rng: &mut SeededRng) {
        for quest in self.daily.drain(..) {
            self.progress.remove(&quest.id);
            self.explore_from.remove(&quest.id);
        }
        let mut pool = daily_catalogue();
        rng.shuffle(&mut pool);
        self.daily = pool
            .into_iter()
            .take(DAILY_QUEST_COUNT)
            .map(|mut q| {
                q.id = format!("{}-d{day_index}", q.id);
                q
            })
            .filter(|q| !self.completed.contains(&q.id))
            .collect();
        tracing::debug!(day = day_index, quests = self.daily.len(), "daily quests drawn");
    }

    /// Install the fixed quests for `season`, skipping any already completed.
    pub fn set_seasonal(&mut self, season: Season) {
        for quest in self.seasonal.drain(..) {
            self.progress.remove(&quest.id);
            self.explore_from.remove(&quest.id);
        }
        self.seasonal = seasonal_catalogue(season)
            .into_iter()
            .filter(|q| !self.completed.contains(&q.id))
            .collect();
    }

    pub fn active(&self) -> impl Iterator<Item = &Quest> {
        self.daily.iter().chain(self.seasonal.iter())
    }

    pub fn get(&self, id: &str) -> Option<&Quest> {
        self.active().find(|q| q.id == id)
    }

    pub fn progress_of(&self, id: &str) -> u32 {
        self.progress.get(id).copied().unwrap_or(0)
    }

    pub fn is_ready(&self, id: &str) -> bool {
        self.get(id)
            .is_some_and(|q| self.progress_of(id) >= q.goal.target())
    }

    fn bump(&mut self, matches: impl Fn(&QuestGoal) -> bool, amount: u32) {
        let ids: Vec<String> = self
            .active()
            .filter(|q| matches(&q.goal))
            .map(|q| q.id.clone())
            .collect();
        for id in ids {
            *self.progress.entry(id).or_default() += amount;
        }
    }

    pub fn record_collect(&mut self, kind: ItemKind, amount: u32) {
        self.bump(
            |g| matches!(g, QuestGoal::Collect { item, .. } if item.is_none_or(|i| i == kind)),
            amount,
        );
    }

    pub fn record_kill(&mut self, kind: EnemyKind) {
        self.bump(
            |g| matches!(g, QuestGoal::Kill { enemy, .. } if enemy.is_none_or(|e| e == kind)),
            1,
        );
    }

    pub fn record_day_survived(&mut self) {
        self.bump(|g| matches!(g, QuestGoal::Survive { .. }), 1);
    }

    pub fn record_build(&mut self) {
        self.bump(|g| matches!(g, QuestGoal::Build { .. }), 1);
    }

    /// Explore progress is the furthest the squirrel has travelled east of
    /// where it stood when the quest became active, not its absolute x.
    pub fn record_explore(&mut self, x: f32) {
        let ids: Vec<String> = self
            .active()
            .filter(|q| matches!(q.goal, QuestGoal::Explore { .. }))
            .map(|q| q.id.clone())
            .collect();
        for id in ids {
            let origin = *self.explore_from.entry(id.clone()).or_insert(x);
            let reached = (x - origin).max(0.0) as u32;
            let entry = self.progress.entry(id).or_default();
            *entry = (*entry).max(reached);
        }
    }

    /// Claim a finished quest. It leaves the active pools and its reward is
    /// returned for the caller to apply.
    pub fn complete(&mut self, id: &str) -> Result<Reward, QuestError> {
        let quest = self
            .get(id)
            .ok_or_else(|| QuestError::Unknown(id.to_string()))?;
        let target = quest.goal.target();
        let progress = self.progress_of(id);
        if progress < target {
            return Err(QuestError::NotReady { progress, target });
        }
        let reward = quest.reward.clone();
        self.daily.retain(|q| q.id != id);
        self.seasonal.retain(|q| q.id != id);
        self.progress.remove(id);
        self.explore_from.remove(id);
        self.completed.push(id.to_string());
        tracing::info!(quest = id, "quest completed");
        Ok(reward)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PlayerConfig;

    fn log_with(quest: Quest) -> QuestLog {
        QuestLog {
            daily: vec![quest],
            ..QuestLog::default()
        }
    }

    fn acorn_quest() -> Quest {
        Quest::new(
            "acorns-d1",
            "Gather acorns",
            QuestGoal::Collect {
                item: Some(ItemKind::Acorn),
                quantity: 3,
            },
            Reward::Materials { leaf: 5, pine: 2 },
            1,
        )
    }

    #[test]
    fn completing_collect_quest_pays_materials_and_leaves_pool() {
        let mut log = log_with(acorn_quest());
        let mut nest = Nest::new();
        let mut player = Player::new(&PlayerConfig::default());
        log.record_collect(ItemKind::Acorn, 3);
        let reward = log.complete("acorns-d1").unwrap();
        reward.apply(&mut player, &mut nest);
        assert_eq!(nest.material(ItemKind::Leaf), 5);
        assert_eq!(nest.material(ItemKind::Pine), 2);
        assert!(log.daily.is_empty());
        assert_eq!(log.completed, vec!["acorns-d1".to_string()]);
    }

    #[test]
    fn unfinished_quest_is_not_claimable() {
        let mut log = log_with(acorn_quest());
        log.record_collect(ItemKind::Acorn, 2);
        log.record_collect(ItemKind::Berry, 5);
        assert_eq!(
            log.complete("acorns-d1"),
            Err(QuestError::NotReady {
                progress: 2,
                target: 3
            })
        );
        assert_eq!(log.daily.len(), 1);
    }

    #[test]
    fn reaching_target_does_not_auto_complete() {
        let mut log = log_with(acorn_quest());
        log.record_collect(ItemKind::Acorn, 10);
        assert!(log.is_ready("acorns-d1"));
        assert_eq!(log.daily.len(), 1);
        assert!(log.completed.is_empty());
    }

    #[test]
    fn unknown_quest_is_an_error() {
        let mut log = QuestLog::new();
        assert_eq!(
            log.complete("nope"),
            Err(QuestError::Unknown("nope".to_string()))
        );
    }

    #[test]
    fn daily_draw_is_deterministic_and_sized() {
        let mut a = QuestLog::new();
        let mut b = QuestLog::new();
        a.regenerate_daily(1, &mut SeededRng::new(11));
        b.regenerate_daily(1, &mut SeededRng::new(11));
        assert_eq!(a.daily.len(), DAILY_QUEST_COUNT);
        assert_eq!(a.daily, b.daily);
        assert!(a.daily.iter().all(|q| q.id.ends_with("-d1")));
    }

    #[test]
    fn regenerating_drops_old_progress() {
        let mut log = QuestLog::new();
        let mut rng = SeededRng::new(2);
        log.regenerate_daily(1, &mut rng);
        let old = log.daily[0].id.clone();
        log.progress.insert(old.clone(), 1);
        log.regenerate_daily(2, &mut rng);
        assert!(!log.progress.contains_key(&old));
        assert!(log.daily.iter().all(|q| q.id.ends_with("-d2")));
    }

    #[test]
    fn untyped_goals_count_everything() {
        let mut log = QuestLog::new();
        log.set_seasonal(Season::Summer);
        log.record_kill(EnemyKind::Bear);
        log.record_kill(EnemyKind::Hawk);
        assert_eq!(log.progress_of("summer_guardian"), 2);
    }

    #[test]
    fn explore_tracks_furthest_point() {
        let mut log = QuestLog::new();
        log.set_seasonal(Season::Summer);
        log.record_explore(100.0);
        log.record_explore(1300.0);
        log.record_explore(800.0);
        assert_eq!(log.progress_of("summer_explorer"), 1200);
    }

    #[test]
    fn explore_counts_from_where_the_quest_was_issued() {
        let mut log = QuestLog::new();
        log.set_seasonal(Season::Spring);
        log.record_explore(2800.0);

        log.set_seasonal(Season::Summer);
        log.record_explore(3200.0);
        assert_eq!(log.progress_of("summer_explorer"), 0);
        assert!(!log.is_ready("summer_explorer"));

        log.record_explore(1000.0);
        log.record_explore(6000.0);
        assert_eq!(log.progress_of("summer_explorer"), 2800);
        log.record_explore(6300.0);
        assert!(log.is_ready("summer_explorer"));

        log.set_seasonal(Season::Fall);
        assert!(!log.explore_from.contains_key("summer_explorer"));
    }

    #[test]
    fn completed_seasonals_are_not_reissued() {
        let mut log = QuestLog::new();
        log.set_seasonal(Season::Spring);
        log.record_build();
        log.complete("spring_builder").unwrap();
        log.set_seasonal(Season::Spring);
        assert!(log.get("spring_builder").is_none());
        assert!(log.get("spring_forager").is_some());
    }

    #[test]
    fn item_rewards_go_to_the_nest() {
        let mut nest = Nest::new();
        let mut player = Player::new(&PlayerConfig::default());
        Reward::Items {
            items: vec![
                ItemStack {
                    item: ItemKind::Hazelnut,
                    quantity: 3,
                },
                ItemStack {
                    item: ItemKind::Twig,
                    quantity: 2,
                },
            ],
        }
        .apply(&mut player, &mut nest);
        assert_eq!(nest.food(ItemKind::Hazelnut), 3);
        assert_eq!(nest.material(ItemKind::Twig), 2);
        assert!(player.inventory().is_empty());
    }
}
