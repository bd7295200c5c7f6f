use serde::{Deserialize, Serialize};

use hoarder_core::input::InputTracker;

use crate::config::{CombatConfig, PhysicsConfig, PlayerConfig};
use crate::items::{ItemKind, ItemStack};
use crate::level::Level;
use crate::physics::{self, Rect, Vec2};

/// Feet may sink this far below a platform top and still land on it.
const PLATFORM_LAND_TOLERANCE: f32 = 20.0;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Facing {
    Left,
    #[default]
    Right,
}

impl Facing {
    pub fn sign(self) -> f32 {
        match self {
            Facing::Left => -1.0,
            Facing::Right => 1.0,
        }
    }
}

/// Coarse animation state for the renderer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerAction {
    #[default]
    Idle,
    Run,
    Jump,
    Fall,
    Dash,
    Attack,
}

/// The squirrel. `pos` is the center of its bounding box.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub pos: Vec2,
    /// Position at the start of the last tick, for render interpolation.
    pub prev_pos: Vec2,
    pub vel: Vec2,
    pub width: f32,
    pub height: f32,
    pub facing: Facing,
    pub on_ground: bool,
    pub action: PlayerAction,
    pub health: i32,
    pub max_health: i32,
    pub invincibility: f32,
    pub stamina: f32,
    pub max_stamina: f32,
    pub attack_cooldown: f32,
    inventory: Vec<ItemStack>,
    #[serde(default)]
    carry_weight: f32,
    pub max_carry_weight: f32,
}

impl Player {
    pub fn new(cfg: &PlayerConfig) -> Self {
        let pos = Vec2::new(cfg.spawn_x, cfg.spawn_y);
        Self {
            pos,
            prev_pos: pos,
            vel: Vec2::ZERO,
            width: cfg.width,
            height: cfg.height,
            facing: Facing::Right,
            on_ground: false,
            action: PlayerAction::Idle,
            health: cfg.max_health,
            max_health: cfg.max_health,
            invincibility: 0.0,
            stamina: cfg.max_stamina,
            max_stamina: cfg.max_stamina,
            attack_cooldown: 0.0,
            inventory: Vec::new(),
            carry_weight: 0.0,
            max_carry_weight: cfg.max_carry_weight,
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::from_center(self.pos, self.width, self.height)
    }

    pub fn feet(&self) -> f32 {
        self.pos.y + self.height / 2.0
    }

    pub fn is_alive(&self) -> bool {
        self.health > 0
    }

    // ---- Inventory ----

    pub fn inventory(&self) -> &[ItemStack] {
        &self.inventory
    }

    pub fn carry_weight(&self) -> f32 {
        self.carry_weight
    }

    pub fn quantity_of(&self, item: ItemKind) -> u32 {
        self.inventory
            .iter()
            .find(|s| s.item == item)
            .map_or(0, |s| s.quantity)
    }

    pub fn can_carry(&self, item: ItemKind, quantity: u32) -> bool {
        self.carry_weight + item.weight() * quantity as f32 <= self.max_carry_weight
    }

    pub fn add_item(&mut self, item: ItemKind, quantity: u32) {
        if quantity == 0 {
            return;
        }
        match self.inventory.iter_mut().find(|s| s.item == item) {
            Some(slot) => slot.quantity += quantity,
            None => self.inventory.push(ItemStack { item, quantity }),
        }
        self.recompute_weight();
    }

    /// Remove up to `quantity`; returns how many were actually removed.
    pub fn remove_item(&mut self, item: ItemKind, quantity: u32) -> u32 {
        let Some(idx) = self.inventory.iter().position(|s| s.item == item) else {
            return 0;
        };
        let slot = &mut self.inventory[idx];
        let removed = quantity.min(slot.quantity);
        slot.quantity -= removed;
        if slot.quantity == 0 {
            self.inventory.remove(idx);
        }
        self.recompute_weight();
        removed
    }

    /// Empty the inventory, returning everything that was in it.
    pub fn take_all(&mut self) -> Vec<ItemStack> {
        let all = std::mem::take(&mut self.inventory);
        self.recompute_weight();
        all
    }

    /// Restore inventory invariants after deserializing: one stack per kind,
    /// no empty stacks, and a carry weight derived from the stacks.
    pub fn normalize(&mut self) {
        let mut merged: Vec<ItemStack> = Vec::with_capacity(self.inventory.len());
        for stack in self.inventory.drain(..).filter(|s| s.quantity > 0) {
            match merged.iter_mut().find(|s| s.item == stack.item) {
                Some(slot) => slot.quantity = slot.quantity.saturating_add(stack.quantity),
                None => merged.push(stack),
            }
        }
        self.inventory = merged;
        self.recompute_weight();
        self.health = self.health.clamp(0, self.max_health);
        self.stamina = self.stamina.clamp(0.0, self.max_stamina);
    }

    fn recompute_weight(&mut self) {
        self.carry_weight = self
            .inventory
            .iter()
            .map(|s| s.quantity as f32 * s.item.weight())
            .sum();
    }

    /// Top-speed and acceleration factor from carried weight.
    pub fn speed_multiplier(&self, floor: f32) -> f32 {
        encumbrance_multiplier(self.carry_weight, self.max_carry_weight, floor)
    }

    // ---- Health and combat ----

    pub fn heal(&mut self, amount: i32) {
        self.health = (self.health + amount).clamp(0, self.max_health);
    }

    /// Apply damage unless invincible. A landed hit restarts the
    /// invincibility window. Returns whether damage was applied.
    pub fn take_damage(&mut self, amount: i32, invincibility_time: f32) -> bool {
        if self.invincibility > 0.0 || amount <= 0 {
            return false;
        }
        self.health = (self.health - amount).clamp(0, self.max_health);
        self.invincibility = invincibility_time;
        true
    }

    pub fn tick_timers(&mut self, dt: f32) {
        self.invincibility = (self.invincibility - dt).max(0.0);
        self.attack_cooldown = (self.attack_cooldown - dt).max(0.0);
    }

    /// Start an attack if off cooldown. Returns the hitbox center.
    pub fn try_attack(&mut self, combat: &CombatConfig) -> Option<Vec2> {
        if self.attack_cooldown > 0.0 {
            return None;
        }
        self.attack_cooldown = combat.attack_cooldown;
        self.action = PlayerAction::Attack;
        Some(Vec2::new(
            self.pos.x + self.facing.sign() * combat.attack_range,
            self.pos.y,
        ))
    }

    /// Teleport back to the nest with no momentum.
    pub fn respawn(&mut self, cfg: &PlayerConfig) {
        self.pos = Vec2::new(cfg.spawn_x, cfg.spawn_y);
        self.prev_pos = self.pos;
        self.vel = Vec2::ZERO;
        self.on_ground = false;
    }
}

/// `max(floor, 1 - (weight / max) * 0.7)`, capped at 1.
pub fn encumbrance_multiplier(weight: f32, max_weight: f32, floor: f32) -> f32 {
    if max_weight <= 0.0 {
        return floor;
    }
    (1.0 - (weight / max_weight) * 0.7).clamp(floor, 1.0)
}

/// Everything the controller reads besides the player and input.
pub struct StepContext<'a> {
    pub physics: &'a PhysicsConfig,
    pub player: &'a PlayerConfig,
    pub combat: &'a CombatConfig,
    pub level: &'a Level,
    /// Sim time at the end of this tick, for moving platforms.
    pub time: f32,
    /// Multiplier on top speed from active power-ups.
    pub speed_boost: f32,
}

/// Side effects of one controller step, for sound and bookkeeping.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StepOutcome {
    pub jumped: bool,
    pub dashed: bool,
    pub landed: bool,
    pub fell_in_pit: bool,
    /// Damage taken this step from pits and spikes.
    pub damage: i32,
}

/// Advance the player by one fixed tick.
pub fn step(
    player: &mut Player,
    input: &mut InputTracker,
    ctx: &StepContext<'_>,
    dt: f32,
) -> StepOutcome {
    let phys = ctx.physics;
    let mut out = StepOutcome::default();
    player.prev_pos = player.pos;
    let started_grounded = player.on_ground;

    // 1. Facing
    let horizontal = input.horizontal();
    if horizontal != 0.0 {
        player.facing = if horizontal > 0.0 {
            Facing::Right
        } else {
            Facing::Left
        };
    }

    // 2-3. Encumbered horizontal movement
    let mult = player.speed_multiplier(ctx.player.min_speed_multiplier);
    let friction = if player.on_ground {
        phys.ground_friction
    } else {
        phys.air_friction
    };
    physics::apply_movement(
        &mut player.vel,
        horizontal,
        phys.move_accel * mult,
        phys.max_run_speed * mult * ctx.speed_boost,
        friction,
        dt,
    );

    // 4. Gravity
    physics::apply_gravity(&mut player.vel, phys.gravity, dt, player.on_ground);

    // 5. Jump: grounded or inside the coyote window; otherwise remember the press.
    if input.is_jump_just_pressed() {
        if player.on_ground || input.has_coyote_time() {
            jump(player, input, phys);
            out.jumped = true;
        } else {
            input.buffer_jump();
        }
    }

    // 6. Dash or regenerate
    if input.is_dash_held() && player.stamina >= ctx.player.stamina_dash_cost {
        let dir = if horizontal != 0.0 {
            horizontal
        } else {
            player.facing.sign()
        };
        physics::apply_dash(&mut player.vel, dir, phys.dash_speed);
        player.stamina -= ctx.player.stamina_dash_cost * dt;
        out.dashed = true;
    } else {
        player.stamina += ctx.player.stamina_recovery * dt;
    }
    player.stamina = player.stamina.clamp(0.0, player.max_stamina);

    // 7. Integrate
    physics::update_position(&mut player.pos, player.vel, dt);

    // 8. Ground, bounds, platforms, pits, spikes
    resolve_world(player, ctx, dt, &mut out);

    if !started_grounded && player.on_ground {
        out.landed = true;
        if input.consume_jump_buffer() {
            jump(player, input, phys);
            out.jumped = true;
        }
    } else if started_grounded && !player.on_ground && !out.jumped && !out.fell_in_pit {
        input.set_coyote_time();
    }

    player.action = if player.action == PlayerAction::Attack && player.attack_cooldown > 0.0 {
        PlayerAction::Attack
    } else if out.dashed {
        PlayerAction::Dash
    } else if !player.on_ground {
        if player.vel.y < 0.0 {
            PlayerAction::Jump
        } else {
            PlayerAction::Fall
        }
    } else if player.vel.x.abs() > 1.0 {
        PlayerAction::Run
    } else {
        PlayerAction::Idle
    };

    out
}

fn jump(player: &mut Player, input: &mut InputTracker, phys: &PhysicsConfig) {
    physics::apply_jump(&mut player.vel, phys.jump_velocity);
    player.on_ground = false;
    input.clear_coyote_time();
}

fn resolve_world(player: &mut Player, ctx: &StepContext<'_>, dt: f32, out: &mut StepOutcome) {
    let level = ctx.level;
    let half_w = player.width / 2.0;
    let half_h = player.height / 2.0;
    let ground_y = level.ground_y;

    // Ground baseline, except over an open pit.
    let over_pit = level.pit_under(player.pos.x).is_some();
    if !over_pit && player.pos.y + half_h >= ground_y {
        player.pos.y = ground_y - half_h;
        player.vel.y = 0.0;
        player.on_ground = true;
    } else {
        player.on_ground = false;
    }

    player.pos.x = player.pos.x.clamp(0.0, level.width);

    // One-way platforms, landed on only while descending.
    let mut landings: Vec<(Rect, f32)> = level
        .hazards
        .platforms
        .iter()
        .map(|r| (*r, 0.0))
        .collect();
    for mp in &level.hazards.moving_platforms {
        let now = mp.rect_at(ctx.time);
        let before = mp.rect_at(ctx.time - dt);
        landings.push((now, now.x - before.x));
    }
    for (pl, carry) in landings {
        let within_x = player.pos.x > pl.x - half_w && player.pos.x < pl.right() + half_w;
        if player.vel.y >= 0.0 && within_x {
            let feet = player.pos.y + half_h;
            if feet >= pl.y && feet <= pl.y + PLATFORM_LAND_TOLERANCE {
                player.pos.y = pl.y - half_h;
                player.vel.y = 0.0;
                player.on_ground = true;
                player.pos.x += carry;
            }
        }
    }

    // Falling past a pit's depth costs health and returns the player home.
    if let Some(pit) = level.pit_under(player.pos.x)
        && player.pos.y + half_h >= ground_y + pit.depth
    {
        let dmg = ctx.combat.pit_damage;
        player.health = (player.health - dmg).clamp(0, player.max_health);
        out.damage += dmg;
        out.fell_in_pit = true;
        player.respawn(ctx.player);
        tracing::debug!(health = player.health, "player fell into a pit");
        return;
    }

    let body = player.rect();
    if level
        .hazards
        .spikes
        .iter()
        .any(|s| physics::check_aabb(s, &body))
        && player.take_damage(ctx.combat.spike_damage, ctx.combat.invincibility_time)
    {
        out.damage += ctx.combat.spike_damage;
    }
}
