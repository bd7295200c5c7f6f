use serde::{Deserialize, Serialize};

/// A 2D vector in world pixels, y pointing down.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance(self, other: Vec2) -> f32 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }

    pub fn lerp(self, other: Vec2, t: f32) -> Vec2 {
        Vec2 {
            x: self.x + (other.x - self.x) * t,
            y: self.y + (other.y - self.y) * t,
        }
    }
}

/// Axis-aligned rectangle anchored at its top-left corner.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    pub fn from_center(center: Vec2, w: f32, h: f32) -> Self {
        Self {
            x: center.x - w / 2.0,
            y: center.y - h / 2.0,
            w,
            h,
        }
    }

    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.w / 2.0, self.y + self.h / 2.0)
    }

    pub fn translated(&self, dx: f32, dy: f32) -> Rect {
        Rect {
            x: self.x + dx,
            y: self.y + dy,
            ..*self
        }
    }
}

/// Result of a swept test: when along the motion the boxes first touch, and
/// the surface normal of the face that was hit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SweepHit {
    /// Fraction of the motion in `[0, 1]`.
    pub time: f32,
    pub normal: Vec2,
}

/// Add `gravity * dt` to the vertical velocity unless grounded.
pub fn apply_gravity(vel: &mut Vec2, gravity: f32, dt: f32, on_ground: bool) {
    if !on_ground {
        vel.y += gravity * dt;
    }
}

/// Accelerate toward `input` capped at `max_speed`, or bleed speed through
/// `friction` when there is no input.
pub fn apply_movement(
    vel: &mut Vec2,
    input: f32,
    accel: f32,
    max_speed: f32,
    friction: f32,
    dt: f32,
) {
    if input != 0.0 {
        vel.x += input * accel * dt;
        vel.x = vel.x.clamp(-max_speed, max_speed);
    } else {
        vel.x *= friction;
    }
}

pub fn apply_jump(vel: &mut Vec2, jump_velocity: f32) {
    vel.y = jump_velocity;
}

pub fn apply_dash(vel: &mut Vec2, direction: f32, dash_speed: f32) {
    vel.x = direction * dash_speed;
}

/// Explicit Euler step.
pub fn update_position(pos: &mut Vec2, vel: Vec2, dt: f32) {
    pos.x += vel.x * dt;
    pos.y += vel.y * dt;
}

/// Strict overlap test; touching edges do not count.
pub fn check_aabb(a: &Rect, b: &Rect) -> bool {
    a.x < b.right() && a.right() > b.x && a.y < b.bottom() && a.bottom() > b.y
}

/// Continuous collision of `moving` displaced by `delta` against a static `target`.
///
/// Per-axis entry and exit fractions are computed from the gap to the near
/// and far faces. An axis with no motion contributes `-inf`/`+inf`, but the
/// boxes must already overlap on that axis or the sweep cannot hit.
pub fn swept_aabb(moving: &Rect, target: &Rect, delta: Vec2) -> Option<SweepHit> {
    if delta.x == 0.0 && (moving.right() <= target.x || moving.x >= target.right()) {
        return None;
    }
    if delta.y == 0.0 && (moving.bottom() <= target.y || moving.y >= target.bottom()) {
        return None;
    }

    let (x_inv_entry, x_inv_exit) = if delta.x > 0.0 {
        (target.x - moving.right(), target.right() - moving.x)
    } else {
        (target.right() - moving.x, target.x - moving.right())
    };
    let (y_inv_entry, y_inv_exit) = if delta.y > 0.0 {
        (target.y - moving.bottom(), target.bottom() - moving.y)
    } else {
        (target.bottom() - moving.y, target.y - moving.bottom())
    };

    let (x_entry, x_exit) = if delta.x == 0.0 {
        (f32::NEG_INFINITY, f32::INFINITY)
    } else {
        (x_inv_entry / delta.x, x_inv_exit / delta.x)
    };
    let (y_entry, y_exit) = if delta.y == 0.0 {
        (f32::NEG_INFINITY, f32::INFINITY)
    } else {
        (y_inv_entry / delta.y, y_inv_exit / delta.y)
    };

    let entry = x_entry.max(y_entry);
    let exit = x_exit.min(y_exit);

    if entry > exit || (x_entry < 0.0 && y_entry < 0.0) || x_entry > 1.0 || y_entry > 1.0 {
        return None;
    }

    // The axis that entered last owns the contact face.
    let normal = if x_entry > y_entry {
        Vec2::new(if x_inv_entry < 0.0 { 1.0 } else { -1.0 }, 0.0)
    } else {
        Vec2::new(0.0, if y_inv_entry < 0.0 { 1.0 } else { -1.0 })
    };

    Some(SweepHit {
        time: entry,
        normal,
    })
}

/// Rewind `pos` to the contact point of `hit` and stop motion along its normal.
pub fn resolve_collision(pos: &mut Vec2, vel: &mut Vec2, hit: &SweepHit, dt: f32) {
    pos.x -= vel.x * dt * (1.0 - hit.time);
    pos.y -= vel.y * dt * (1.0 - hit.time);
    if hit.normal.x != 0.0 {
        vel.x = 0.0;
    }
    if hit.normal.y != 0.0 {
        vel.y = 0.0;
    }
}
