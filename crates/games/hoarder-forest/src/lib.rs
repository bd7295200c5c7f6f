pub mod achievements;
pub mod camera;
pub mod config;
pub mod enemy;
pub mod items;
pub mod level;
pub mod nest;
pub mod physics;
pub mod player;
pub mod powerups;
pub mod quests;
pub mod save;
pub mod snapshot;
pub mod spawner;
pub mod win_lose;

use serde::Serialize;

use hoarder_core::events::Subscription;
use hoarder_core::input::{InputTracker, Key};
use hoarder_core::rng::{RngState, SeededRng};
use hoarder_core::world_time::{Season, TimeEvent, TimeEventKind, WorldClock};

use achievements::AchievementTracker;
use camera::Camera;
use config::ForestConfig;
use enemy::{Enemy, EnemyKind, Terrain};
use items::ItemKind;
use level::{Level, Pushable, TriggerKind};
use nest::{Deposit, Nest, UpgradeError, UpgradeKind};
use physics::Vec2;
use player::{Player, StepContext};
use powerups::{Effects, PowerUpType};
use quests::{QuestError, QuestLog, Reward};
use save::{KeyValueStore, SAVE_VERSION, SaveData, SaveError, WorldSave};
use snapshot::{EnemyPose, PickupPose, PlayerPose, PowerUpPose, RenderSnapshot};
use spawner::Spawner;
use win_lose::Outcome;

/// Named cues for the audio collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SoundCue {
    Jump,
    Pickup,
    Deposit,
    Hit,
    /// A kill that should keep battle music going.
    AttackExtendsBattle,
    ButtonClick,
}

/// Everything the host may want to react to, in emission order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum SimEvent {
    Sound(SoundCue),
    Time(TimeEvent),
    Paused,
    Resumed,
    NestToggled { open: bool },
    PlayerDamaged { amount: i32, health: i32 },
    EnemySpawned { id: u64, kind: EnemyKind },
    EnemyKilled { id: u64, kind: EnemyKind },
    ItemCollected { kind: ItemKind },
    PowerUpCollected { kind: PowerUpType },
    PowerUpExpired { kind: PowerUpType },
    Deposited { food: u32, materials: u32 },
    UpgradePurchased { kind: UpgradeKind, level: u32 },
    QuestCompleted { id: String },
    AchievementUnlocked { id: &'static str },
    TriggerActivated { id: String, kind: TriggerKind },
    RationEaten { needed: u32, eaten: u32 },
    GameOver(Outcome),
}

/// Borrowed view of the authoritative state for compact encoding.
#[derive(Serialize)]
struct StateView<'a> {
    tick: u64,
    sim_time: f32,
    rng: RngState,
    clock: &'a WorldClock,
    player: &'a Player,
    nest: &'a Nest,
    enemies: &'a [Enemy],
    spawner: &'a Spawner,
    effects: &'a Effects,
    quests: &'a QuestLog,
    achievements: &'a AchievementTracker,
    pushables: &'a [Pushable],
    outcome: Option<Outcome>,
}

/// The authoritative forest simulation. All state changes go through
/// [`ForestSim::update`] or one of the named player actions.
pub struct ForestSim {
    config: ForestConfig,
    seed: u64,
    rng: SeededRng,
    input: InputTracker,
    clock: WorldClock,
    level: Level,
    player: Player,
    nest: Nest,
    enemies: Vec<Enemy>,
    next_enemy_id: u64,
    spawner: Spawner,
    effects: Effects,
    quests: QuestLog,
    achievements: AchievementTracker,
    camera: Camera,
    sim_time: f32,
    tick: u64,
    paused: bool,
    outcome: Option<Outcome>,
    furthest_x: f32,
    nest_open: bool,
    /// Events raised outside `update`, flushed by the next `update`.
    outbox: Vec<SimEvent>,
}

impl ForestSim {
    pub fn new(seed: u64, config: ForestConfig) -> Self {
        let mut rng = SeededRng::new(seed);
        let level = Level::generate(&config.level, &mut rng);
        let player = Player::new(&config.player);
        let clock = WorldClock::new(config.time.calendar());

        let mut quests = QuestLog::new();
        quests.regenerate_daily(1, &mut rng);
        quests.set_seasonal(clock.season());

        let mut spawner = Spawner::new();
        spawner.replenish(&mut rng, &config.spawns, clock.season(), level.ground_y);

        let mut camera = Camera::new(config.level.viewport_width, config.level.viewport_height);
        camera.set_position(Vec2::new(player.pos.x - config.level.viewport_width / 2.0, 0.0));

        tracing::info!(seed, "forest simulation created");
        Self {
            furthest_x: player.pos.x,
            config,
            seed,
            rng,
            input: InputTracker::new(),
            clock,
            level,
            player,
            nest: Nest::new(),
            enemies: Vec::new(),
            next_enemy_id: 1,
            spawner,
            effects: Effects::new(),
            quests,
            achievements: AchievementTracker::new(),
            camera,
            sim_time: 0.0,
            tick: 0,
            paused: false,
            outcome: None,
            nest_open: false,
            outbox: Vec::new(),
        }
    }

    // ---- Host input ----

    pub fn key_down(&mut self, key: Key) {
        self.input.on_key_down(key);
    }

    pub fn key_up(&mut self, key: Key) {
        self.input.on_key_up(key);
    }

    /// Listen for time events without polling `update`'s return value.
    pub fn subscribe_time(
        &mut self,
        kind: TimeEventKind,
        listener: impl FnMut(&TimeEvent) + 'static,
    ) -> Subscription {
        self.clock.subscribe(kind, listener)
    }

    pub fn unsubscribe_time(&mut self, handle: Subscription) -> bool {
        self.clock.unsubscribe(handle)
    }

    // ---- Tick ----

    /// Advance one fixed step. Runs input, time, player, enemies, spawns,
    /// progression, camera and finally the win/lose check.
    pub fn update(&mut self, dt: f32) -> Vec<SimEvent> {
        if self.outcome.is_some() {
            self.input.clear_just_pressed();
            return std::mem::take(&mut self.outbox);
        }

        self.input.update(dt);
        if self.input.is_pause_just_pressed() {
            if self.paused {
                self.resume();
            } else {
                self.pause();
            }
        }
        if self.paused {
            self.input.clear_just_pressed();
            return std::mem::take(&mut self.outbox);
        }

        self.tick += 1;
        self.sim_time += dt;

        for event in self.clock.update(dt, &mut self.rng) {
            self.on_time_event(event);
        }
        self.update_player(dt);
        self.update_enemies(dt);
        self.update_pickups(dt);

        self.quests.record_explore(self.player.pos.x);
        self.check_achievements();

        self.camera.follow(self.player.pos, dt);
        self.input.clear_just_pressed();

        if let Some(outcome) =
            win_lose::evaluate(self.player.health, &self.clock, self.nest.total_food())
        {
            tracing::info!(
                ?outcome,
                day = self.clock.day(),
                season = self.clock.season().name(),
                "game over"
            );
            self.outcome = Some(outcome);
            self.outbox.push(SimEvent::GameOver(outcome));
        }

        std::mem::take(&mut self.outbox)
    }

    fn on_time_event(&mut self, event: TimeEvent) {
        match event {
            TimeEvent::SeasonChanged { season } => {
                self.achievements.stats.seasons_completed += 1;
                self.quests.set_seasonal(season);
            },
            TimeEvent::DayChanged { season, .. } => {
                self.achievements.stats.days_survived += 1;
                self.quests.record_day_survived();
                self.quests
                    .regenerate_daily(self.clock.total_days() + 1, &mut self.rng);
                if season == Season::Winter {
                    let needed = self.nest.winter_ration(&self.config.time);
                    let ration = self.nest.eat(needed);
                    tracing::info!(
                        needed,
                        eaten = ration.eaten,
                        left = self.nest.total_food(),
                        "winter ration"
                    );
                    self.outbox.push(SimEvent::RationEaten {
                        needed,
                        eaten: ration.eaten,
                    });
                }
            },
            TimeEvent::WeatherChanged { .. } => {},
        }
        self.outbox.push(SimEvent::Time(event));
    }

    fn update_player(&mut self, dt: f32) {
        let combat = self.config.combat.clone();
        self.player.tick_timers(dt);

        let ctx = StepContext {
            physics: &self.config.physics,
            player: &self.config.player,
            combat: &self.config.combat,
            level: &self.level,
            time: self.sim_time,
            speed_boost: powerups::speed_multiplier(&self.effects),
        };
        let out = player::step(&mut self.player, &mut self.input, &ctx, dt);
        if out.jumped {
            self.outbox.push(SimEvent::Sound(SoundCue::Jump));
        }
        if out.damage > 0 {
            self.player_hurt(out.damage, combat.shake_on_hit);
        }
        self.furthest_x = self.furthest_x.max(self.player.pos.x);

        if self.input.is_attack_just_pressed()
            && let Some(hitbox) = self.player.try_attack(&combat)
        {
            let hits = enemy::resolve_attack(
                &mut self.enemies,
                hitbox,
                combat.attack_range,
                combat.attack_damage,
            );
            for hit in hits.into_iter().filter(|h| h.killed) {
                self.achievements.stats.record_kill(hit.kind);
                self.quests.record_kill(hit.kind);
                self.outbox.push(SimEvent::EnemyKilled {
                    id: hit.id,
                    kind: hit.kind,
                });
                self.outbox.push(SimEvent::Sound(SoundCue::AttackExtendsBattle));
            }
        }

        if let Some(damage) = enemy::contact_damage(
            &self.enemies,
            self.player.pos,
            combat.contact_dx,
            combat.contact_dy,
        ) && self.player.take_damage(damage, combat.invincibility_time)
        {
            self.player_hurt(damage, combat.shake_on_hit);
        }

        let body = self.player.rect();
        self.level
            .update_pushables(dt, &self.config.physics, &body, self.player.vel.x);
        for (id, kind) in self.level.update_triggers(&body) {
            tracing::debug!(trigger = %id, ?kind, "trigger activated");
            self.outbox.push(SimEvent::TriggerActivated { id, kind });
        }

        let at_nest = self.level.in_nest_zone(&body);
        if self.input.is_interact_just_pressed() && at_nest {
            self.set_nest_open(!self.nest_open);
        } else if self.nest_open && !at_nest {
            self.set_nest_open(false);
        }
    }

    fn set_nest_open(&mut self, open: bool) {
        self.nest_open = open;
        self.outbox.push(SimEvent::NestToggled { open });
        self.outbox.push(SimEvent::Sound(SoundCue::ButtonClick));
    }

    fn player_hurt(&mut self, amount: i32, shake: f32) {
        self.outbox.push(SimEvent::PlayerDamaged {
            amount,
            health: self.player.health,
        });
        self.outbox.push(SimEvent::Sound(SoundCue::Hit));
        self.camera.add_shake(shake, &mut self.rng);
    }

    fn update_enemies(&mut self, dt: f32) {
        let combat = self.config.combat.clone();
        let terrain = Terrain {
            ground_y: self.level.ground_y,
            world_width: self.level.width,
            gravity: self.config.physics.gravity,
        };
        let alive = self.enemies.iter().filter(|e| e.is_alive()).count();
        if let Some(spawned) = enemy::roll_spawn(
            &mut self.rng,
            &self.config.spawns,
            self.clock.season(),
            self.player.pos.x,
            &terrain,
            alive,
            &mut self.next_enemy_id,
        ) {
            self.outbox.push(SimEvent::EnemySpawned {
                id: spawned.id,
                kind: spawned.kind,
            });
            self.enemies.push(spawned);
        }

        let target = self.player.pos;
        let now = self.sim_time;
        let strikes: Vec<i32> = self
            .enemies
            .iter_mut()
            .filter_map(|e| e.update(target, now, dt, &terrain))
            .collect();
        for damage in strikes {
            if self.player.take_damage(damage, combat.invincibility_time) {
                self.player_hurt(damage, combat.shake_on_hit);
            }
        }
        self.enemies.retain(|e| !e.should_remove(combat.corpse_time));
    }

    fn update_pickups(&mut self, dt: f32) {
        let spawns = &self.config.spawns;
        self.spawner
            .replenish(&mut self.rng, spawns, self.clock.season(), self.level.ground_y);
        self.spawner.animate(dt);

        let magnet = self.effects.has(PowerUpType::Magnet);
        let mut collected = self.spawner.collect_pickups(&mut self.player, spawns, magnet);
        let player = &mut self.player;
        collected.extend(self.level.take_pickups_in_region(&player.rect(), |kind| {
            if player.can_carry(kind, 1) {
                player.add_item(kind, 1);
                true
            } else {
                false
            }
        }));

        let multiplier = powerups::quest_multiplier(&self.effects);
        for kind in collected {
            self.achievements.stats.items_collected += 1;
            self.quests.record_collect(kind, multiplier);
            self.outbox.push(SimEvent::ItemCollected { kind });
            self.outbox.push(SimEvent::Sound(SoundCue::Pickup));
        }

        for kind in self.spawner.collect_powerups(&self.player, spawns) {
            powerups::apply(kind, &mut self.player, &mut self.effects);
            tracing::debug!(kind = kind.name(), "power-up collected");
            self.outbox.push(SimEvent::PowerUpCollected { kind });
            self.outbox.push(SimEvent::Sound(SoundCue::Pickup));
        }
        for kind in self.effects.tick(dt) {
            self.outbox.push(SimEvent::PowerUpExpired { kind });
        }
    }

    fn check_achievements(&mut self) {
        for unlocked in self.achievements.check() {
            let (leaf, pine) = unlocked.reward;
            self.nest.add_materials(ItemKind::Leaf, leaf);
            self.nest.add_materials(ItemKind::Pine, pine);
            self.outbox
                .push(SimEvent::AchievementUnlocked { id: unlocked.id });
        }
    }

    // ---- Player actions ----

    /// Empty the basket into the nest. Only works inside the nest zone.
    pub fn deposit_all(&mut self) -> Option<Deposit> {
        if !self.level.in_nest_zone(&self.player.rect()) {
            return None;
        }
        let deposit = self.nest.deposit_all(&mut self.player);
        if !deposit.is_empty() {
            self.outbox.push(SimEvent::Deposited {
                food: deposit.food,
                materials: deposit.materials,
            });
            self.outbox.push(SimEvent::Sound(SoundCue::Deposit));
        }
        Some(deposit)
    }

    pub fn purchase_upgrade(&mut self, kind: UpgradeKind) -> Result<u32, UpgradeError> {
        let level = self.nest.purchase_upgrade(kind)?;
        if kind == UpgradeKind::Basket {
            self.player.max_carry_weight =
                self.config.player.max_carry_weight + level as f32 * self.config.player.basket_bonus;
        }
        self.achievements.stats.upgrades_built += 1;
        self.quests.record_build();
        self.outbox.push(SimEvent::UpgradePurchased { kind, level });
        self.outbox.push(SimEvent::Sound(SoundCue::ButtonClick));
        self.check_achievements();
        Ok(level)
    }

    /// Claim a finished quest and apply its reward.
    pub fn complete_quest(&mut self, id: &str) -> Result<Reward, QuestError> {
        let reward = self.quests.complete(id)?;
        reward.apply(&mut self.player, &mut self.nest);
        self.achievements.stats.quests_completed += 1;
        self.outbox.push(SimEvent::QuestCompleted { id: id.to_string() });
        self.outbox.push(SimEvent::Sound(SoundCue::ButtonClick));
        self.check_achievements();
        Ok(reward)
    }

    /// Turn pantry berries and mushrooms into preserved food (needs a rack).
    pub fn preserve_food(&mut self) -> u32 {
        self.nest.preserve()
    }

    pub fn pause(&mut self) {
        if !self.paused {
            self.paused = true;
            self.outbox.push(SimEvent::Paused);
        }
    }

    pub fn resume(&mut self) {
        if self.paused {
            self.paused = false;
            self.outbox.push(SimEvent::Resumed);
        }
    }

    /// Start over with the same seed and config. Time listeners survive.
    pub fn reset(&mut self) {
        let mut clock = std::mem::take(&mut self.clock);
        *self = Self::new(self.seed, self.config.clone());
        clock.reset();
        self.clock = clock;
    }

    // ---- Persistence ----

    pub fn to_save(&self) -> SaveData {
        SaveData {
            version: SAVE_VERSION.to_string(),
            timestamp: save::now_millis(),
            season: self.clock.season(),
            day: self.clock.day(),
            weather: self.clock.weather(),
            time_of_day: self.clock.time_of_day(),
            player: self.player.clone(),
            nest: self.nest.clone(),
            world: WorldSave {
                pushables: self.level.pushables.clone(),
                triggers: self.level.triggers.clone(),
                quests: self.quests.clone(),
                achievements: self.achievements.clone(),
                rng: self.rng.state(),
                furthest_x: self.furthest_x,
            },
        }
    }

    pub fn save(&self, store: &mut dyn KeyValueStore) -> Result<(), SaveError> {
        save::write_save(store, &self.to_save())
    }

    /// Replace the current state with the stored save. On any error the
    /// current state is left untouched.
    pub fn load(&mut self, store: &dyn KeyValueStore) -> Result<(), SaveError> {
        let data = save::read_save(store)?;
        self.apply_save(data);
        Ok(())
    }

    /// [`ForestSim::load`] for callers that only need success or failure.
    pub fn try_load(&mut self, store: &dyn KeyValueStore) -> bool {
        match self.load(store) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("load failed: {e}");
                false
            },
        }
    }

    fn apply_save(&mut self, data: SaveData) {
        self.clock
            .restore(data.season, data.day, data.weather, data.time_of_day);
        self.player = data.player;
        self.player.normalize();
        self.nest = data.nest;
        if !data.world.pushables.is_empty() {
            self.level.pushables = data.world.pushables;
        }
        if !data.world.triggers.is_empty() {
            self.level.triggers = data.world.triggers;
        }
        self.quests = data.world.quests;
        self.achievements = data.world.achievements;
        self.rng.set_state(data.world.rng);
        self.furthest_x = data.world.furthest_x.max(self.player.pos.x);

        self.enemies.clear();
        self.effects.clear();
        self.spawner = Spawner::new();
        self.spawner.replenish(
            &mut self.rng,
            &self.config.spawns,
            self.clock.season(),
            self.level.ground_y,
        );
        self.input.release_all();
        self.outcome = None;
        self.paused = false;
        self.nest_open = false;
        self.camera.set_position(Vec2::new(
            self.player.pos.x - self.camera.viewport_width / 2.0,
            0.0,
        ));
        tracing::info!(season = self.clock.season().name(), day = self.clock.day(), "save loaded");
    }

    /// Compact MessagePack encoding of the authoritative state.
    pub fn serialize_state(&self) -> Result<Vec<u8>, rmp_serde::encode::Error> {
        let view = StateView {
            tick: self.tick,
            sim_time: self.sim_time,
            rng: self.rng.state(),
            clock: &self.clock,
            player: &self.player,
            nest: &self.nest,
            enemies: &self.enemies,
            spawner: &self.spawner,
            effects: &self.effects,
            quests: &self.quests,
            achievements: &self.achievements,
            pushables: &self.level.pushables,
            outcome: self.outcome,
        };
        rmp_serde::to_vec(&view)
    }

    // ---- Read access ----

    /// Read-only view for the renderer, blending the player between the
    /// last two ticks by `alpha`.
    pub fn snapshot(&self, alpha: f32) -> RenderSnapshot {
        let season = self.clock.season();
        RenderSnapshot {
            camera: self.camera.pos,
            parallax: [0, 1, 2, 3].map(|layer| self.camera.parallax_offset(layer)),
            palette: snapshot::palette(season),
            player: PlayerPose {
                pos: snapshot::interpolate(self.player.prev_pos, self.player.pos, alpha),
                facing: self.player.facing,
                action: self.player.action,
                health: self.player.health,
                max_health: self.player.max_health,
                stamina: self.player.stamina,
                invincible: self.player.invincibility > 0.0,
                carry_weight: self.player.carry_weight(),
                max_carry_weight: self.player.max_carry_weight,
            },
            enemies: self
                .enemies
                .iter()
                .map(|e| EnemyPose {
                    id: e.id,
                    kind: e.kind,
                    pos: e.pos,
                    state: e.state,
                    direction: e.direction,
                    health: e.health,
                })
                .collect(),
            pickups: self
                .spawner
                .pickups
                .iter()
                .map(|p| PickupPose {
                    id: p.id,
                    kind: p.kind,
                    pos: snapshot::bobbed(p.pos, p.bob),
                })
                .collect(),
            powerups: self
                .spawner
                .powerups
                .iter()
                .map(|p| PowerUpPose {
                    id: p.id,
                    kind: p.kind,
                    pos: snapshot::bobbed(p.pos, p.bob),
                })
                .collect(),
            nest_level: self.nest.total_upgrade_levels(),
            season,
            day: self.clock.day(),
            weather: self.clock.weather(),
            clock: self.clock.clock_string(),
            paused: self.paused,
            outcome: self.outcome,
        }
    }

    pub fn config(&self) -> &ForestConfig {
        &self.config
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn sim_time(&self) -> f32 {
        self.sim_time
    }

    pub fn clock(&self) -> &WorldClock {
        &self.clock
    }

    pub fn level(&self) -> &Level {
        &self.level
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn nest(&self) -> &Nest {
        &self.nest
    }

    pub fn enemies(&self) -> &[Enemy] {
        &self.enemies
    }

    pub fn spawner(&self) -> &Spawner {
        &self.spawner
    }

    pub fn effects(&self) -> &Effects {
        &self.effects
    }

    pub fn quests(&self) -> &QuestLog {
        &self.quests
    }

    pub fn achievements(&self) -> &AchievementTracker {
        &self.achievements
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn is_nest_open(&self) -> bool {
        self.nest_open
    }

    pub fn furthest_x(&self) -> f32 {
        self.furthest_x
    }

    pub fn rng_state(&self) -> RngState {
        self.rng.state()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use hoarder_core::world_time::Weather;

    use super::*;
    use crate::quests::{Quest, QuestGoal};
    use crate::save::MemoryStore;
    use crate::spawner::WorldPickup;
    use crate::win_lose::LoseReason;

    const DT: f32 = 1.0 / 60.0;

    /// No random enemies and one-second days.
    fn quiet_config() -> ForestConfig {
        let mut cfg = ForestConfig::default();
        cfg.spawns.enemy_spawn_chance = 0.0;
        cfg
    }

    fn quick_days() -> ForestConfig {
        let mut cfg = quiet_config();
        cfg.time.seconds_per_day = 1.0;
        cfg
    }

    fn run(sim: &mut ForestSim, ticks: usize) -> Vec<SimEvent> {
        let mut all = Vec::new();
        for _ in 0..ticks {
            all.extend(sim.update(DT));
        }
        all
    }

    fn settled(cfg: ForestConfig) -> ForestSim {
        let mut sim = ForestSim::new(7, cfg);
        run(&mut sim, 90);
        assert!(sim.player.on_ground);
        sim
    }

    fn wolf_beside(sim: &ForestSim, dx: f32) -> Enemy {
        Enemy::new(
            100,
            EnemyKind::Wolf,
            Vec2::new(sim.player.pos.x + dx, sim.level.ground_y - 16.0),
            -1.0,
        )
    }

    #[test]
    fn same_seed_same_state() {
        let mut a = ForestSim::new(42, ForestConfig::default());
        let mut b = ForestSim::new(42, ForestConfig::default());
        for sim in [&mut a, &mut b] {
            sim.key_down(Key::D);
            run(sim, 120);
            sim.key_down(Key::Space);
            run(sim, 30);
            sim.key_up(Key::Space);
            sim.key_up(Key::D);
            run(sim, 60);
        }
        assert_eq!(a.serialize_state().unwrap(), b.serialize_state().unwrap());
        assert_ne!(
            a.serialize_state().unwrap(),
            ForestSim::new(43, ForestConfig::default())
                .serialize_state()
                .unwrap()
        );
    }

    #[test]
    fn escape_toggles_pause_and_freezes_time() {
        let mut sim = ForestSim::new(1, quiet_config());
        run(&mut sim, 10);
        sim.key_down(Key::Escape);
        let events = sim.update(DT);
        assert!(events.contains(&SimEvent::Paused));
        let tick = sim.tick();
        sim.key_up(Key::Escape);
        run(&mut sim, 30);
        assert_eq!(sim.tick(), tick);

        sim.key_down(Key::Escape);
        let events = sim.update(DT);
        assert!(events.contains(&SimEvent::Resumed));
        assert_eq!(sim.tick(), tick + 1);
    }

    #[test]
    fn walking_right_moves_player_and_camera() {
        let mut sim = settled(quiet_config());
        let start = sim.player.pos.x;
        let cam = sim.camera.pos.x;
        sim.key_down(Key::Right);
        run(&mut sim, 30);
        assert!(sim.player.pos.x > start + 20.0);
        assert!(sim.camera.pos.x > cam);
        assert_eq!(sim.furthest_x(), sim.player.pos.x);
    }

    #[test]
    fn picking_up_counts_for_stats_quests_and_achievements() {
        let mut sim = settled(quiet_config());
        sim.spawner.pickups.clear();
        sim.spawner.pickups.push(WorldPickup {
            id: 999,
            pos: Vec2::new(sim.player.pos.x, sim.level.ground_y - 24.0),
            kind: ItemKind::Acorn,
            bob: 0.0,
        });
        let events = sim.update(DT);
        assert!(events.contains(&SimEvent::ItemCollected {
            kind: ItemKind::Acorn
        }));
        assert!(events.contains(&SimEvent::Sound(SoundCue::Pickup)));
        assert!(events.contains(&SimEvent::AchievementUnlocked { id: "first_forage" }));
        assert!(sim.player.quantity_of(ItemKind::Acorn) >= 1);
        assert!(sim.achievements.stats.items_collected >= 1);
        // first_forage pays two leaves.
        assert!(sim.nest.material(ItemKind::Leaf) >= 2);
    }

    #[test]
    fn double_points_doubles_collect_progress() {
        let mut sim = settled(quiet_config());
        sim.quests.daily = vec![Quest {
            id: "acorns".to_string(),
            title: "acorns".to_string(),
            goal: QuestGoal::Collect {
                item: Some(ItemKind::Acorn),
                quantity: 2,
            },
            reward: Reward::Stamina,
            difficulty: 1,
        }];
        sim.effects.add(PowerUpType::DoublePoints);
        sim.spawner.pickups.clear();
        sim.spawner.pickups.push(WorldPickup {
            id: 999,
            pos: sim.player.pos,
            kind: ItemKind::Acorn,
            bob: 0.0,
        });
        sim.update(DT);
        assert!(sim.quests.is_ready("acorns"));
    }

    #[test]
    fn deposit_only_at_the_nest() {
        let mut sim = settled(quiet_config());
        sim.player.add_item(ItemKind::Acorn, 2);
        sim.player.add_item(ItemKind::Pine, 3);
        let dep = sim.deposit_all().unwrap();
        assert_eq!(dep.food, 2);
        assert_eq!(dep.materials, 3);
        assert_eq!(sim.nest.food(ItemKind::Acorn), 2);
        let events = sim.update(DT);
        assert!(events.contains(&SimEvent::Sound(SoundCue::Deposit)));

        sim.player.pos.x = 1500.0;
        sim.player.add_item(ItemKind::Acorn, 1);
        assert_eq!(sim.deposit_all(), None);
        assert_eq!(sim.player.quantity_of(ItemKind::Acorn), 1);
    }

    #[test]
    fn interact_toggles_nest_ui_and_leaving_closes_it() {
        let mut sim = settled(quiet_config());
        sim.key_down(Key::E);
        let events = sim.update(DT);
        assert!(events.contains(&SimEvent::NestToggled { open: true }));
        assert!(sim.is_nest_open());
        sim.key_up(Key::E);
        sim.player.pos.x = 1200.0;
        let events = sim.update(DT);
        assert!(events.contains(&SimEvent::NestToggled { open: false }));
    }

    #[test]
    fn basket_upgrade_raises_carry_limit() {
        let mut sim = settled(quiet_config());
        sim.nest.add_materials(ItemKind::Leaf, 20);
        sim.nest.add_materials(ItemKind::Pine, 10);
        assert_eq!(sim.purchase_upgrade(UpgradeKind::Basket), Ok(1));
        assert_eq!(sim.player.max_carry_weight, 25.0);
        assert_eq!(sim.achievements.stats.upgrades_built, 1);
        assert!(sim.achievements.is_unlocked("handy"));
        assert_eq!(
            sim.purchase_upgrade(UpgradeKind::Basket),
            Err(UpgradeError::Unaffordable(UpgradeKind::Basket))
        );
    }

    #[test]
    fn completing_a_quest_pays_out_and_counts() {
        let mut sim = settled(quiet_config());
        sim.quests.daily = vec![Quest {
            id: "q".to_string(),
            title: "q".to_string(),
            goal: QuestGoal::Collect {
                item: None,
                quantity: 1,
            },
            reward: Reward::Materials { leaf: 5, pine: 2 },
            difficulty: 1,
        }];
        assert!(matches!(
            sim.complete_quest("q"),
            Err(QuestError::NotReady { .. })
        ));
        sim.quests.record_collect(ItemKind::Berry, 1);
        let leaf = sim.nest.material(ItemKind::Leaf);
        sim.complete_quest("q").unwrap();
        // +5 from the quest, +5 from the "questing" achievement.
        assert_eq!(sim.nest.material(ItemKind::Leaf), leaf + 10);
        assert!(sim.quests.daily.is_empty());
        assert_eq!(sim.achievements.stats.quests_completed, 1);
    }

    #[test]
    fn attack_kills_enemy_in_front() {
        let mut sim = settled(quiet_config());
        sim.player.facing = player::Facing::Right;
        sim.player.invincibility = 100.0;
        let mut wolf = wolf_beside(&sim, sim.config.combat.attack_range);
        wolf.health = 1;
        sim.enemies.push(wolf);

        sim.key_down(Key::J);
        let events = sim.update(DT);
        assert!(events.contains(&SimEvent::EnemyKilled {
            id: 100,
            kind: EnemyKind::Wolf
        }));
        assert!(events.contains(&SimEvent::Sound(SoundCue::AttackExtendsBattle)));
        assert_eq!(sim.achievements.stats.kills_of(EnemyKind::Wolf), 1);
        assert!(sim.achievements.is_unlocked("first_blood"));

        // The corpse lingers, then goes.
        sim.key_up(Key::J);
        run(&mut sim, 30);
        assert_eq!(sim.enemies.len(), 1);
        run(&mut sim, 40);
        assert!(sim.enemies.is_empty());
    }

    #[test]
    fn contact_damage_respects_invincibility() {
        let mut sim = settled(quiet_config());
        let wolf = wolf_beside(&sim, 30.0);
        sim.enemies.push(wolf);
        let events = run(&mut sim, 30);
        let hits = events
            .iter()
            .filter(|e| matches!(e, SimEvent::PlayerDamaged { .. }))
            .count();
        assert_eq!(hits, 1);
        assert_eq!(sim.player.health, sim.player.max_health - 1);
    }

    #[test]
    fn death_ends_the_game() {
        let mut sim = settled(quiet_config());
        sim.player.health = 0;
        let events = sim.update(DT);
        assert!(events.contains(&SimEvent::GameOver(Outcome::Lose(LoseReason::Attack))));
        let tick = sim.tick();
        assert!(run(&mut sim, 10).is_empty());
        assert_eq!(sim.tick(), tick);
    }

    #[test]
    fn winter_day_eats_from_pantry() {
        let mut sim = settled(quick_days());
        sim.nest.add_food(ItemKind::Acorn, 10);
        sim.clock.restore(Season::Winter, 2, Weather::Snowy, 0.99);
        let events = run(&mut sim, 2);
        assert!(events.contains(&SimEvent::RationEaten {
            needed: 10,
            eaten: 10
        }));
        assert_eq!(sim.nest.food(ItemKind::Acorn), 5);
        assert_eq!(sim.outcome(), None);
    }

    #[test]
    fn empty_winter_pantry_starves() {
        let mut sim = settled(quick_days());
        sim.clock.restore(Season::Winter, 1, Weather::Snowy, 0.0);
        let events = sim.update(DT);
        assert!(events.contains(&SimEvent::GameOver(Outcome::Lose(
            LoseReason::Starvation
        ))));
    }

    #[test]
    fn reaching_last_winter_day_wins() {
        let mut sim = settled(quick_days());
        sim.nest.add_food(ItemKind::Preserved, 50);
        sim.clock.restore(Season::Winter, 5, Weather::Snowy, 0.99);
        run(&mut sim, 2);
        assert_eq!(sim.outcome(), Some(Outcome::Win));
    }

    #[test]
    fn season_change_installs_seasonal_quests() {
        let mut sim = settled(quick_days());
        sim.clock.restore(Season::Spring, 6, Weather::Sunny, 0.99);
        let events = run(&mut sim, 2);
        assert!(events.contains(&SimEvent::Time(TimeEvent::SeasonChanged {
            season: Season::Summer
        })));
        assert!(sim.quests.get("summer_guardian").is_some());
        assert_eq!(sim.achievements.stats.seasons_completed, 1);
        assert!(sim.achievements.is_unlocked("seasoned"));
    }

    #[test]
    fn save_and_load_round_trip() {
        let mut a = settled(quiet_config());
        a.player.add_item(ItemKind::Berry, 3);
        a.nest.add_materials(ItemKind::Leaf, 12);
        a.quests.record_collect(ItemKind::Acorn, 1);
        run(&mut a, 5);
        let mut store = MemoryStore::new();
        a.save(&mut store).unwrap();
        assert!(save::has_save(&store));

        let mut b = ForestSim::new(999, quiet_config());
        assert!(b.try_load(&store));
        assert_eq!(b.player, a.player);
        assert_eq!(b.nest, a.nest);
        assert_eq!(b.quests, a.quests);
        assert_eq!(b.clock.day(), a.clock.day());
        assert_eq!(b.clock.season(), a.clock.season());
        assert_eq!(b.level.pushables, a.level.pushables);
        assert!(b.enemies.is_empty());
    }

    #[test]
    fn failed_load_leaves_state_alone() {
        let mut sim = settled(quiet_config());
        sim.player.add_item(ItemKind::Twig, 2);
        let before = sim.serialize_state().unwrap();
        let mut store = MemoryStore::new();
        assert!(!sim.try_load(&store));
        store.set(save::SAVE_KEY, r#"{"version":"1.0.0"}"#).unwrap();
        assert!(matches!(sim.load(&store), Err(SaveError::Invalid(_))));
        assert_eq!(sim.serialize_state().unwrap(), before);
    }

    #[test]
    fn reset_keeps_time_listeners() {
        let mut sim = ForestSim::new(5, quick_days());
        let days = Rc::new(RefCell::new(0));
        let counter = Rc::clone(&days);
        sim.subscribe_time(TimeEventKind::DayChanged, move |_| {
            *counter.borrow_mut() += 1;
        });
        run(&mut sim, 61);
        assert_eq!(*days.borrow(), 1);
        sim.reset();
        assert_eq!(sim.tick(), 0);
        assert_eq!(sim.clock.day(), 1);
        run(&mut sim, 61);
        assert_eq!(*days.borrow(), 2);
    }

    #[test]
    fn snapshot_interpolates_player() {
        let mut sim = ForestSim::new(3, quiet_config());
        sim.update(DT);
        let prev = sim.player.prev_pos;
        let cur = sim.player.pos;
        let snap = sim.snapshot(0.5);
        assert_eq!(snap.player.pos, prev.lerp(cur, 0.5));
        assert_eq!(snap.season, Season::Spring);
        assert_eq!(snap.palette.primary, "#8FBC8F");
        assert_eq!(snap.pickups.len(), sim.spawner.pickups.len());
        assert_eq!(snap.clock, sim.clock.clock_string());
    }
}
