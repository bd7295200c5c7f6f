use serde::{Deserialize, Serialize};

use hoarder_core::rng::SeededRng;

use crate::physics::{Rect, Vec2};

pub const FOLLOW_SPEED: f32 = 5.0;
pub const SHAKE_DECAY: f32 = 0.9;
/// Scroll factors from the far background to the foreground.
pub const PARALLAX_SPEEDS: [f32; 4] = [0.1, 0.3, 0.6, 1.0];
/// Shake components below this snap to zero.
const SHAKE_EPSILON: f32 = 0.1;

/// Side-scrolling camera. `pos` is the top-left of the viewport in world px.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    pub pos: Vec2,
    pub target: Vec2,
    pub viewport_width: f32,
    pub viewport_height: f32,
    pub follow_speed: f32,
    pub shake: Vec2,
    parallax: [f32; 4],
}

impl Camera {
    pub fn new(viewport_width: f32, viewport_height: f32) -> Self {
        Self {
            pos: Vec2::ZERO,
            target: Vec2::ZERO,
            viewport_width,
            viewport_height,
            follow_speed: FOLLOW_SPEED,
            shake: Vec2::ZERO,
            parallax: [0.0; 4],
        }
    }

    /// Ease toward centering `focus` horizontally. The vertical target is
    /// pinned at 0 so jumps don't bob the view.
    pub fn follow(&mut self, focus: Vec2, dt: f32) {
        self.target = Vec2::new(focus.x - self.viewport_width / 2.0, 0.0);
        let t = 1.0 - (-self.follow_speed * dt).exp();
        self.pos = self.pos.lerp(self.target, t);

        for (offset, speed) in self.parallax.iter_mut().zip(PARALLAX_SPEEDS) {
            *offset = self.pos.x * speed;
        }

        self.pos.x += self.shake.x;
        self.pos.y += self.shake.y;
        self.shake.x *= SHAKE_DECAY;
        self.shake.y *= SHAKE_DECAY;
        if self.shake.x.abs() < SHAKE_EPSILON {
            self.shake.x = 0.0;
        }
        if self.shake.y.abs() < SHAKE_EPSILON {
            self.shake.y = 0.0;
        }
    }

    /// Kick the camera by up to `intensity / 2` px on each axis.
    pub fn add_shake(&mut self, intensity: f32, rng: &mut SeededRng) {
        self.shake.x = (rng.next_f64() as f32 - 0.5) * intensity;
        self.shake.y = (rng.next_f64() as f32 - 0.5) * intensity;
    }

    pub fn world_to_screen(&self, world: Vec2) -> Vec2 {
        Vec2::new(world.x - self.pos.x, world.y - self.pos.y)
    }

    pub fn screen_to_world(&self, screen: Vec2) -> Vec2 {
        Vec2::new(screen.x + self.pos.x, screen.y + self.pos.y)
    }

    pub fn is_visible(&self, world: Vec2, margin: f32) -> bool {
        world.x >= self.pos.x - margin
            && world.x <= self.pos.x + self.viewport_width + margin
            && world.y >= self.pos.y - margin
            && world.y <= self.pos.y + self.viewport_height + margin
    }

    /// Horizontal offset of a parallax layer; 0 for unknown layers.
    pub fn parallax_offset(&self, layer: usize) -> f32 {
        self.parallax.get(layer).copied().unwrap_or(0.0)
    }

    pub fn set_position(&mut self, pos: Vec2) {
        self.pos = pos;
        self.target = pos;
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(self.pos.x, self.pos.y, self.viewport_width, self.viewport_height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn follow_converges_on_centered_target() {
        let mut cam = Camera::new(800.0, 600.0);
        for _ in 0..600 {
            cam.follow(Vec2::new(1000.0, 300.0), 1.0 / 60.0);
        }
        assert!((cam.pos.x - 600.0).abs() < 0.01);
        assert_eq!(cam.pos.y, 0.0);
    }

    #[test]
    fn follow_is_frame_rate_independent() {
        let mut fine = Camera::new(800.0, 600.0);
        let mut coarse = Camera::new(800.0, 600.0);
        let focus = Vec2::new(1000.0, 0.0);
        for _ in 0..4 {
            fine.follow(focus, 0.025);
        }
        coarse.follow(focus, 0.1);
        assert!((fine.pos.x - coarse.pos.x).abs() < 0.01);
    }

    #[test]
    fn shake_decays_to_zero() {
        let mut cam = Camera::new(800.0, 600.0);
        cam.add_shake(10.0, &mut SeededRng::new(1));
        assert!(cam.shake.x.abs() <= 5.0 && cam.shake.y.abs() <= 5.0);
        for _ in 0..100 {
            cam.follow(Vec2::new(400.0, 0.0), 1.0 / 60.0);
        }
        assert_eq!(cam.shake, Vec2::ZERO);
    }

    #[test]
    fn parallax_scales_with_layer() {
        let mut cam = Camera::new(800.0, 600.0);
        cam.set_position(Vec2::new(1000.0, 0.0));
        cam.follow(Vec2::new(1400.0, 0.0), 1.0 / 60.0);
        assert!((cam.parallax_offset(0) - 100.0).abs() < 1e-3);
        assert!((cam.parallax_offset(3) - 1000.0).abs() < 1e-3);
        assert_eq!(cam.parallax_offset(9), 0.0);
    }

    #[test]
    fn screen_world_round_trip() {
        let mut cam = Camera::new(800.0, 600.0);
        cam.set_position(Vec2::new(250.0, 10.0));
        let world = Vec2::new(300.0, 200.0);
        assert_eq!(cam.screen_to_world(cam.world_to_screen(world)), world);
        assert!(cam.is_visible(world, 0.0));
        assert!(!cam.is_visible(Vec2::new(2000.0, 200.0), 100.0));
    }
}
