use serde::{Deserialize, Serialize};

use hoarder_core::rng::SeededRng;

use crate::config::{LevelConfig, PhysicsConfig};
use crate::items::ItemKind;
use crate::physics::{self, Rect, SweepHit, Vec2};

/// Tile types for the level grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Tile {
    Air,
    Solid,
    SlopeL,
    SlopeR,
    OneWay,
    Spikes,
    Water,
    Nest,
    Platform,
    Pit,
}

impl Tile {
    /// Tiles that stop movement in tile-collision queries.
    pub fn blocks(self) -> bool {
        matches!(self, Tile::Solid | Tile::Spikes)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SlopeDirection {
    Left,
    Right,
}

/// A blocking tile found by a collision query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TileHit {
    pub tile: Tile,
    /// World-space top-left of the tile.
    pub x: f32,
    pub y: f32,
}

/// A blocking tile found by a swept query, with the contact along the motion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TileSweep {
    pub hit: TileHit,
    pub sweep: SweepHit,
}

/// Tile map stored row-major (`y * width + x`). Immutable after generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TileGrid {
    /// Width in tiles.
    pub width: u32,
    /// Height in tiles.
    pub height: u32,
    pub tile_size: f32,
    tiles: Vec<Tile>,
}

impl TileGrid {
    fn new(width: u32, height: u32, tile_size: f32) -> Self {
        Self {
            width,
            height,
            tile_size,
            tiles: vec![Tile::Air; (width * height) as usize],
        }
    }

    pub fn get(&self, tx: i32, ty: i32) -> Tile {
        if tx < 0 || ty < 0 || tx >= self.width as i32 || ty >= self.height as i32 {
            return Tile::Air;
        }
        self.tiles[ty as usize * self.width as usize + tx as usize]
    }

    fn set(&mut self, tx: i32, ty: i32, tile: Tile) {
        if tx >= 0 && ty >= 0 && tx < self.width as i32 && ty < self.height as i32 {
            self.tiles[ty as usize * self.width as usize + tx as usize] = tile;
        }
    }

    fn cell(&self, world: f32) -> i32 {
        (world / self.tile_size).floor() as i32
    }

    fn tile_rect(&self, tx: i32, ty: i32) -> Rect {
        Rect::new(
            tx as f32 * self.tile_size,
            ty as f32 * self.tile_size,
            self.tile_size,
            self.tile_size,
        )
    }

    /// Stamp a horizontal run of solid tiles starting at a world position.
    pub fn add_platform(&mut self, x: f32, y: f32, width_tiles: u32) {
        let (sx, sy) = (self.cell(x), self.cell(y));
        for i in 0..width_tiles as i32 {
            self.set(sx + i, sy, Tile::Solid);
        }
    }

    /// Stamp a rising diagonal of slope tiles.
    pub fn add_slope(&mut self, x: f32, y: f32, width_tiles: u32, dir: SlopeDirection) {
        let (sx, sy) = (self.cell(x), self.cell(y));
        let tile = match dir {
            SlopeDirection::Left => Tile::SlopeL,
            SlopeDirection::Right => Tile::SlopeR,
        };
        for i in 0..width_tiles as i32 {
            self.set(sx + i, sy - i, tile);
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DecorationKind {
    Nest,
    Tree,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decoration {
    pub id: String,
    pub kind: DecorationKind,
    pub rect: Rect,
}

/// A pickup placed by level generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScatteredPickup {
    pub id: String,
    pub kind: ItemKind,
    pub rect: Rect,
    pub collected: bool,
}

/// A log that falls onto the ground and can be shoved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pushable {
    pub id: String,
    pub rect: Rect,
    pub vel: Vec2,
    pub on_ground: bool,
}

const PUSHABLE_FRICTION: f32 = 0.9;
const PUSH_IMPULSE: f32 = 200.0;

impl Pushable {
    pub fn push(&mut self, direction: f32, strength: f32) {
        self.vel.x += direction * PUSH_IMPULSE * strength;
    }

    /// Gravity, friction and a swept move against the grid. Snaps flush to
    /// whatever it hits.
    pub fn update(&mut self, dt: f32, gravity: f32, grid: &TileGrid) {
        physics::apply_gravity(&mut self.vel, gravity, dt, self.on_ground);
        self.vel.x *= PUSHABLE_FRICTION;

        // Probe one pixel down so a resting log notices the floor vanishing.
        let probe = Vec2::new(self.vel.x * dt, (self.vel.y * dt).max(1.0));
        self.on_ground = false;
        match sweep_grid(grid, &self.rect, probe) {
            Some(contact) => {
                let s = contact.sweep;
                if s.normal.y < 0.0 {
                    self.rect.x += probe.x;
                    self.rect.y = contact.hit.y - self.rect.h;
                    self.vel.y = 0.0;
                    self.on_ground = true;
                } else if s.normal.x != 0.0 {
                    self.rect.x = if s.normal.x < 0.0 {
                        contact.hit.x - self.rect.w
                    } else {
                        contact.hit.x + grid.tile_size
                    };
                    self.vel.x = 0.0;
                    self.rect.y += self.vel.y * dt;
                } else {
                    self.rect.y = contact.hit.y + grid.tile_size;
                    self.vel.y = 0.0;
                    self.rect.x += probe.x;
                }
            },
            None => {
                self.rect.x += self.vel.x * dt;
                self.rect.y += self.vel.y * dt;
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TriggerKind {
    NestZone,
    Lever,
}

/// A zone that activates when the player overlaps it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trigger {
    pub id: String,
    pub kind: TriggerKind,
    pub rect: Rect,
    pub activated: bool,
}

/// A gap in the ground. The player falls through it; falling past `depth`
/// below the surface counts as a fall.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pit {
    pub x: f32,
    pub width: f32,
    pub depth: f32,
}

impl Pit {
    pub fn contains_x(&self, x: f32) -> bool {
        x > self.x && x < self.x + self.width
    }
}

/// A platform swinging horizontally around `base` as a function of sim time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MovingPlatform {
    pub base: Rect,
    pub range: f32,
    pub period: f32,
}

impl MovingPlatform {
    pub fn rect_at(&self, t: f32) -> Rect {
        let phase = std::f32::consts::TAU * t / self.period;
        self.base.translated(self.range * phase.sin(), 0.0)
    }
}

/// Static hazard and platform geometry, consulted directly by the player
/// resolver rather than baked into the tile grid.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Hazards {
    /// One-way platforms, landed on from above.
    pub platforms: Vec<Rect>,
    pub pits: Vec<Pit>,
    pub spikes: Vec<Rect>,
    pub moving_platforms: Vec<MovingPlatform>,
}

impl Hazards {
    fn forest(ground_y: f32) -> Self {
        Self {
            platforms: vec![
                Rect::new(420.0, ground_y - 70.0, 96.0, 12.0),
                Rect::new(560.0, ground_y - 130.0, 96.0, 12.0),
                Rect::new(1500.0, ground_y - 80.0, 128.0, 12.0),
                Rect::new(2400.0, ground_y - 90.0, 96.0, 12.0),
            ],
            pits: vec![
                Pit {
                    x: 900.0,
                    width: 64.0,
                    depth: 80.0,
                },
                Pit {
                    x: 1900.0,
                    width: 96.0,
                    depth: 80.0,
                },
            ],
            spikes: vec![
                Rect::new(1300.0, ground_y - 12.0, 48.0, 12.0),
                Rect::new(2650.0, ground_y - 12.0, 64.0, 12.0),
            ],
            moving_platforms: vec![MovingPlatform {
                base: Rect::new(1940.0, ground_y - 60.0, 80.0, 12.0),
                range: 60.0,
                period: 4.0,
            }],
        }
    }
}

/// The forest: tile grid plus everything placed on it at generation time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Level {
    pub width: f32,
    pub height: f32,
    pub ground_y: f32,
    pub grid: TileGrid,
    pub decorations: Vec<Decoration>,
    pub pickups: Vec<ScatteredPickup>,
    pub pushables: Vec<Pushable>,
    pub triggers: Vec<Trigger>,
    pub hazards: Hazards,
}

impl Level {
    pub fn generate(cfg: &LevelConfig, rng: &mut SeededRng) -> Self {
        let tiles_w = (cfg.width / cfg.tile_size).ceil() as u32;
        let tiles_h = (cfg.height / cfg.tile_size).ceil() as u32;
        let ground_y = cfg.ground_y();

        let mut grid = TileGrid::new(tiles_w, tiles_h, cfg.tile_size);
        let ground_row = (ground_y / cfg.tile_size) as i32;
        for ty in ground_row..tiles_h as i32 {
            for tx in 0..tiles_w as i32 {
                grid.set(tx, ty, Tile::Solid);
            }
        }

        // Raised ledges a few tiles above the ground.
        for (x, rise, w) in [(200.0, 3.0, 3), (500.0, 5.0, 2), (800.0, 7.0, 4), (1200.0, 3.0, 3)] {
            grid.add_platform(x, ground_y - rise * cfg.tile_size, w);
        }

        let hazards = Hazards::forest(ground_y);
        for pit in &hazards.pits {
            let first = grid.cell(pit.x);
            let last = grid.cell(pit.x + pit.width - 1.0);
            for tx in first..=last {
                for ty in ground_row..tiles_h as i32 {
                    grid.set(tx, ty, Tile::Pit);
                }
            }
        }

        let mut decorations = vec![Decoration {
            id: "nest".to_string(),
            kind: DecorationKind::Nest,
            rect: Rect::new(100.0, ground_y - 60.0, 80.0, 60.0),
        }];
        for i in 0..15 {
            decorations.push(Decoration {
                id: format!("tree_{i}"),
                kind: DecorationKind::Tree,
                rect: Rect::new(
                    150.0 + i as f32 * 200.0,
                    ground_y - 200.0 + (i as f32).sin() * 50.0,
                    40.0,
                    80.0,
                ),
            });
        }

        let pickups = (0..cfg.scatter_pickups)
            .map(|i| {
                let kind = rng
                    .choice(&ItemKind::SCATTERED)
                    .copied()
                    .unwrap_or(ItemKind::Acorn);
                let x = rng.float(200.0, f64::from(cfg.width - 200.0)) as f32;
                let y = rng.float(f64::from(ground_y - 160.0), f64::from(ground_y - 40.0)) as f32;
                ScatteredPickup {
                    id: format!("pickup_{i}"),
                    kind,
                    rect: Rect::new(x, y, 16.0, 16.0),
                    collected: false,
                }
            })
            .collect();

        let pushables = [300.0, 620.0, 1100.0, 1400.0, 2200.0]
            .into_iter()
            .enumerate()
            .map(|(i, x)| Pushable {
                id: format!("log_{i}"),
                rect: Rect::new(x, ground_y - 112.0, 32.0, 16.0),
                vel: Vec2::ZERO,
                on_ground: false,
            })
            .collect();

        let triggers = vec![
            Trigger {
                id: "nest_trigger".to_string(),
                kind: TriggerKind::NestZone,
                rect: Rect::new(80.0, ground_y - 120.0, 120.0, 120.0),
                activated: false,
            },
            Trigger {
                id: "lever_1".to_string(),
                kind: TriggerKind::Lever,
                rect: Rect::new(600.0, ground_y - 40.0, 20.0, 40.0),
                activated: false,
            },
        ];

        tracing::debug!(
            tiles_w,
            tiles_h,
            pickups = cfg.scatter_pickups,
            "forest level generated"
        );

        Self {
            width: cfg.width,
            height: cfg.height,
            ground_y,
            grid,
            decorations,
            pickups,
            pushables,
            triggers,
            hazards,
        }
    }

    /// Tile under a world position; `Air` outside the grid.
    pub fn tile_at(&self, x: f32, y: f32) -> Tile {
        self.grid.get(self.grid.cell(x), self.grid.cell(y))
    }

    /// First blocking tile overlapped by the box, scanning rows top to bottom
    /// and each row left to right. This is not necessarily the tile nearest
    /// to the direction of travel; use [`Level::sweep_tile_collision`] when
    /// the contact face matters.
    pub fn check_tile_collision(&self, x: f32, y: f32, w: f32, h: f32) -> Option<TileHit> {
        let grid = &self.grid;
        let (left, right) = (grid.cell(x), grid.cell(x + w));
        let (top, bottom) = (grid.cell(y), grid.cell(y + h));
        for ty in top..=bottom {
            for tx in left..=right {
                let tile = grid.get(tx, ty);
                if tile.blocks() {
                    return Some(TileHit {
                        tile,
                        x: tx as f32 * grid.tile_size,
                        y: ty as f32 * grid.tile_size,
                    });
                }
            }
        }
        None
    }

    /// Nearest blocking tile along the motion of `rect` by `(dx, dy)`.
    pub fn sweep_tile_collision(&self, rect: &Rect, dx: f32, dy: f32) -> Option<TileSweep> {
        sweep_grid(&self.grid, rect, Vec2::new(dx, dy))
    }

    pub fn decorations_in_region(&self, region: &Rect) -> Vec<&Decoration> {
        self.decorations
            .iter()
            .filter(|d| physics::check_aabb(&d.rect, region))
            .collect()
    }

    /// Uncollected scattered pickups overlapping the region.
    pub fn pickups_in_region(&self, region: &Rect) -> Vec<&ScatteredPickup> {
        self.pickups
            .iter()
            .filter(|p| !p.collected && physics::check_aabb(&p.rect, region))
            .collect()
    }

    /// Collect every uncollected scattered pickup under `region` that
    /// `accept` agrees to take. Refused pickups stay in the level.
    pub fn take_pickups_in_region(
        &mut self,
        region: &Rect,
        mut accept: impl FnMut(ItemKind) -> bool,
    ) -> Vec<ItemKind> {
        let mut taken = Vec::new();
        for p in &mut self.pickups {
            if !p.collected && physics::check_aabb(&p.rect, region) && accept(p.kind) {
                p.collected = true;
                taken.push(p.kind);
            }
        }
        taken
    }

    /// Step every pushable; the player shoves any log it walks into.
    pub fn update_pushables(
        &mut self,
        dt: f32,
        phys: &PhysicsConfig,
        player: &Rect,
        player_vx: f32,
    ) {
        for log in &mut self.pushables {
            if player_vx != 0.0 && physics::check_aabb(&log.rect, player) {
                let strength = (player_vx.abs() / phys.max_run_speed).min(1.0);
                log.push(player_vx.signum(), strength * dt * 10.0);
            }
            log.update(dt, phys.gravity, &self.grid);
            log.rect.x = log.rect.x.clamp(0.0, self.width - log.rect.w);

            // Pit tiles don't block, so a log that drops in rests on the pit floor.
            let center_x = log.rect.center().x;
            let floor = self
                .hazards
                .pits
                .iter()
                .find(|pit| pit.contains_x(center_x))
                .map_or(self.height, |pit| (self.ground_y + pit.depth).min(self.height));
            if log.rect.bottom() > floor {
                log.rect.y = floor - log.rect.h;
                log.vel.y = 0.0;
                log.on_ground = true;
            }
        }
    }

    /// Activate triggers the player overlaps. Returns ids activated this call.
    pub fn update_triggers(&mut self, player: &Rect) -> Vec<(String, TriggerKind)> {
        let mut fired = Vec::new();
        for trigger in &mut self.triggers {
            let inside = physics::check_aabb(&trigger.rect, player);
            match trigger.kind {
                TriggerKind::NestZone => {
                    // The nest zone tracks presence rather than latching.
                    if inside && !trigger.activated {
                        fired.push((trigger.id.clone(), trigger.kind));
                    }
                    trigger.activated = inside;
                },
                TriggerKind::Lever => {
                    if inside && !trigger.activated {
                        trigger.activated = true;
                        fired.push((trigger.id.clone(), trigger.kind));
                    }
                },
            }
        }
        fired
    }

    pub fn in_nest_zone(&self, player: &Rect) -> bool {
        self.triggers
            .iter()
            .any(|t| t.kind == TriggerKind::NestZone && physics::check_aabb(&t.rect, player))
    }

    pub fn pit_under(&self, x: f32) -> Option<&Pit> {
        self.hazards.pits.iter().find(|p| p.contains_x(x))
    }
}

fn sweep_grid(grid: &TileGrid, rect: &Rect, delta: Vec2) -> Option<TileSweep> {
    let swept = Rect::new(
        rect.x.min(rect.x + delta.x),
        rect.y.min(rect.y + delta.y),
        rect.w + delta.x.abs(),
        rect.h + delta.y.abs(),
    );
    let (left, right) = (grid.cell(swept.x), grid.cell(swept.right()));
    let (top, bottom) = (grid.cell(swept.y), grid.cell(swept.bottom()));

    let mut best: Option<TileSweep> = None;
    for ty in top..=bottom {
        for tx in left..=right {
            let tile = grid.get(tx, ty);
            if !tile.blocks() {
                continue;
            }
            let tile_rect = grid.tile_rect(tx, ty);
            let Some(sweep) = physics::swept_aabb(rect, &tile_rect, delta) else {
                continue;
            };
            if best.is_none_or(|b| sweep.time < b.sweep.time) {
                best = Some(TileSweep {
                    hit: TileHit {
                        tile,
                        x: tile_rect.x,
                        y: tile_rect.y,
                    },
                    sweep,
                });
            }
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    fn level() -> Level {
        Level::generate(&LevelConfig::default(), &mut SeededRng::new(42))
    }

    #[test]
    fn ground_band_is_solid() {
        let lvl = level();
        assert_eq!(lvl.tile_at(50.0, lvl.ground_y + 1.0), Tile::Solid);
        assert_eq!(lvl.tile_at(50.0, lvl.ground_y - 1.0), Tile::Air);
        assert_eq!(lvl.tile_at(50.0, lvl.height - 1.0), Tile::Solid);
    }

    #[test]
    fn outside_grid_is_air() {
        let lvl = level();
        assert_eq!(lvl.tile_at(-10.0, 600.0), Tile::Air);
        assert_eq!(lvl.tile_at(50.0, 10_000.0), Tile::Air);
    }

    #[test]
    fn pits_are_carved_out_of_ground() {
        let lvl = level();
        let pit = lvl.hazards.pits[0];
        assert_eq!(lvl.tile_at(pit.x + 2.0, lvl.ground_y + 1.0), Tile::Pit);
        assert!(lvl.pit_under(pit.x + 1.0).is_some());
        assert!(lvl.pit_under(pit.x - 1.0).is_none());
    }

    #[test]
    fn tile_collision_reports_first_row_major_hit() {
        let lvl = level();
        // Spans two ground rows; the upper-left tile is reported.
        let hit = lvl
            .check_tile_collision(40.0, lvl.ground_y + 4.0, 40.0, 40.0)
            .unwrap();
        assert_eq!(hit.tile, Tile::Solid);
        assert_eq!(hit.x, 32.0);
        assert_eq!(hit.y, lvl.ground_y);
    }

    #[test]
    fn tile_collision_misses_in_open_air() {
        let lvl = level();
        assert!(lvl.check_tile_collision(40.0, 10.0, 10.0, 10.0).is_none());
    }

    #[test]
    fn sweep_reports_nearest_tile_along_motion() {
        let lvl = level();
        let ledge_y = lvl.ground_y - 3.0 * 32.0;
        // Falling through a raised ledge at x=200 toward the ground below it.
        let rect = Rect::new(210.0, ledge_y - 40.0, 16.0, 16.0);
        let contact = lvl.sweep_tile_collision(&rect, 0.0, 400.0).unwrap();
        assert_eq!(contact.hit.y, ledge_y);
        assert_eq!(contact.sweep.normal, Vec2::new(0.0, -1.0));
    }

    #[test]
    fn slopes_are_stamped_diagonally() {
        let mut grid = TileGrid::new(10, 10, 32.0);
        grid.add_slope(64.0, 256.0, 3, SlopeDirection::Right);
        assert_eq!(grid.get(2, 8), Tile::SlopeR);
        assert_eq!(grid.get(3, 7), Tile::SlopeR);
        assert_eq!(grid.get(4, 6), Tile::SlopeR);
        assert_eq!(grid.get(5, 5), Tile::Air);
    }

    #[test]
    fn generation_is_deterministic() {
        let a = level();
        let b = level();
        assert_eq!(a.pickups, b.pickups);
    }

    #[test]
    fn region_queries_filter_by_overlap() {
        let lvl = level();
        let nest_area = Rect::new(90.0, lvl.ground_y - 50.0, 20.0, 20.0);
        let found = lvl.decorations_in_region(&nest_area);
        assert!(found.iter().any(|d| d.kind == DecorationKind::Nest));

        let everywhere = Rect::new(0.0, 0.0, lvl.width, lvl.height);
        assert_eq!(lvl.pickups_in_region(&everywhere).len(), lvl.pickups.len());
    }

    #[test]
    fn taken_pickups_leave_region_queries() {
        let mut lvl = level();
        let everywhere = Rect::new(0.0, 0.0, lvl.width, lvl.height);
        let refused = lvl.take_pickups_in_region(&everywhere, |_| false);
        assert!(refused.is_empty());
        assert_eq!(lvl.pickups_in_region(&everywhere).len(), lvl.pickups.len());
        let taken = lvl.take_pickups_in_region(&everywhere, |_| true);
        assert_eq!(taken.len(), lvl.pickups.len());
        assert!(lvl.pickups_in_region(&everywhere).is_empty());
    }

    #[test]
    fn pushable_settles_on_ground() {
        let mut lvl = level();
        let physics = PhysicsConfig::default();
        let far_away = Rect::new(-500.0, -500.0, 1.0, 1.0);
        for _ in 0..240 {
            lvl.update_pushables(1.0 / 60.0, &physics, &far_away, 0.0);
        }
        let log = &lvl.pushables[0];
        assert!(log.on_ground);
        assert_eq!(log.rect.bottom(), lvl.ground_y);
    }

    #[test]
    fn log_in_a_pit_rests_on_the_pit_floor() {
        let mut lvl = level();
        let pit = lvl.hazards.pits[0];
        lvl.pushables.truncate(1);
        lvl.pushables[0].rect = Rect::new(pit.x + 8.0, lvl.ground_y - 40.0, 40.0, 20.0);
        let physics = PhysicsConfig::default();
        let far_away = Rect::new(-500.0, -500.0, 1.0, 1.0);
        for _ in 0..600 {
            lvl.update_pushables(1.0 / 60.0, &physics, &far_away, 0.0);
        }
        let log = &lvl.pushables[0];
        assert!(log.on_ground);
        assert_eq!(log.vel.y, 0.0);
        assert_eq!(log.rect.bottom(), lvl.ground_y + pit.depth);
        assert!(log.rect.bottom() <= lvl.height);
    }

    #[test]
    fn lever_latches_and_nest_zone_tracks_presence() {
        let mut lvl = level();
        let lever = lvl.triggers[1].rect;
        let fired = lvl.update_triggers(&lever);
        assert_eq!(fired, vec![("lever_1".to_string(), TriggerKind::Lever)]);
        assert!(lvl.update_triggers(&lever).is_empty());

        let nest = lvl.triggers[0].rect;
        assert_eq!(lvl.update_triggers(&nest).len(), 1);
        assert!(lvl.in_nest_zone(&nest));
        lvl.update_triggers(&Rect::new(3000.0, 0.0, 1.0, 1.0));
        assert!(!lvl.triggers[0].activated);
        assert!(lvl.triggers[1].activated);
    }

    #[test]
    fn moving_platform_oscillates_around_base() {
        let mp = MovingPlatform {
            base: Rect::new(100.0, 0.0, 10.0, 10.0),
            range: 50.0,
            period: 4.0,
        };
        assert!((mp.rect_at(0.0).x - 100.0).abs() < 1e-4);
        assert!((mp.rect_at(1.0).x - 150.0).abs() < 1e-3);
        assert!((mp.rect_at(3.0).x - 50.0).abs() < 1e-3);
    }
}
