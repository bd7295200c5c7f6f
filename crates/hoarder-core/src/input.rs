use std::collections::HashSet;

/// Jump-buffer window in seconds.
pub const JUMP_BUFFER_TIME: f32 = 0.12;
/// Coyote-time window in seconds.
pub const COYOTE_TIME: f32 = 0.12;

/// Keys the game binds. Hosts translate their own key codes into these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Left,
    Right,
    Up,
    Down,
    A,
    D,
    W,
    S,
    Space,
    ShiftLeft,
    ShiftRight,
    E,
    J,
    X,
    Q,
    Tab,
    Escape,
}

impl Key {
    /// Map a DOM `KeyboardEvent.code` string onto a bound key.
    pub fn from_code(code: &str) -> Option<Self> {
        let key = match code {
            "ArrowLeft" => Key::Left,
            "ArrowRight" => Key::Right,
            "ArrowUp" => Key::Up,
            "ArrowDown" => Key::Down,
            "KeyA" => Key::A,
            "KeyD" => Key::D,
            "KeyW" => Key::W,
            "KeyS" => Key::S,
            "Space" => Key::Space,
            "ShiftLeft" => Key::ShiftLeft,
            "ShiftRight" => Key::ShiftRight,
            "KeyE" => Key::E,
            "KeyJ" => Key::J,
            "KeyX" => Key::X,
            "KeyQ" => Key::Q,
            "Tab" => Key::Tab,
            "Escape" => Key::Escape,
            _ => return None,
        };
        Some(key)
    }
}

const JUMP_KEYS: [Key; 3] = [Key::Space, Key::Up, Key::W];

/// Edge-triggered key state plus the jump-buffer and coyote-time windows.
///
/// Key edges are fed by the host (`on_key_down` / `on_key_up`). The
/// just-pressed and just-released sets persist until `clear_just_pressed`,
/// which the simulation calls exactly once per tick after every consumer ran.
#[derive(Debug, Clone)]
pub struct InputTracker {
    keys_down: HashSet<Key>,
    keys_just_pressed: HashSet<Key>,
    keys_just_released: HashSet<Key>,
    jump_buffer: f32,
    coyote: f32,
}

impl InputTracker {
    pub fn new() -> Self {
        Self {
            keys_down: HashSet::new(),
            keys_just_pressed: HashSet::new(),
            keys_just_released: HashSet::new(),
            jump_buffer: 0.0,
            coyote: 0.0,
        }
    }

    /// Register a key-down edge. Auto-repeat of a held key is ignored.
    pub fn on_key_down(&mut self, key: Key) {
        if self.keys_down.insert(key) {
            self.keys_just_pressed.insert(key);
        }
    }

    /// Register a key-up edge.
    pub fn on_key_up(&mut self, key: Key) {
        if self.keys_down.remove(&key) {
            self.keys_just_released.insert(key);
        }
    }

    /// Decay both grace windows, floored at zero.
    pub fn update(&mut self, dt: f32) {
        self.jump_buffer = (self.jump_buffer - dt).max(0.0);
        self.coyote = (self.coyote - dt).max(0.0);
    }

    pub fn is_pressed(&self, key: Key) -> bool {
        self.keys_down.contains(&key)
    }

    pub fn is_just_pressed(&self, key: Key) -> bool {
        self.keys_just_pressed.contains(&key)
    }

    pub fn is_just_released(&self, key: Key) -> bool {
        self.keys_just_released.contains(&key)
    }

    /// -1 for left, +1 for right, 0 when neither or both are held.
    pub fn horizontal(&self) -> f32 {
        let mut dir = 0.0;
        if self.is_pressed(Key::Left) || self.is_pressed(Key::A) {
            dir -= 1.0;
        }
        if self.is_pressed(Key::Right) || self.is_pressed(Key::D) {
            dir += 1.0;
        }
        dir
    }

    /// -1 for up, +1 for down (screen space).
    pub fn vertical(&self) -> f32 {
        let mut dir = 0.0;
        if self.is_pressed(Key::Up) || self.is_pressed(Key::W) {
            dir -= 1.0;
        }
        if self.is_pressed(Key::Down) || self.is_pressed(Key::S) {
            dir += 1.0;
        }
        dir
    }

    pub fn is_jump_held(&self) -> bool {
        JUMP_KEYS.iter().any(|&k| self.is_pressed(k))
    }

    pub fn is_jump_just_pressed(&self) -> bool {
        JUMP_KEYS.iter().any(|&k| self.is_just_pressed(k))
    }

    pub fn is_dash_held(&self) -> bool {
        self.is_pressed(Key::ShiftLeft) || self.is_pressed(Key::ShiftRight)
    }

    pub fn is_attack_just_pressed(&self) -> bool {
        self.is_just_pressed(Key::J) || self.is_just_pressed(Key::X)
    }

    pub fn is_interact_just_pressed(&self) -> bool {
        self.is_just_pressed(Key::E)
    }

    pub fn is_pause_just_pressed(&self) -> bool {
        self.is_just_pressed(Key::Escape)
    }

    pub fn is_quest_log_just_pressed(&self) -> bool {
        self.is_just_pressed(Key::Q)
    }

    pub fn is_achievements_just_pressed(&self) -> bool {
        self.is_just_pressed(Key::Tab)
    }

    /// Arm the jump-buffer window.
    pub fn buffer_jump(&mut self) {
        self.jump_buffer = JUMP_BUFFER_TIME;
    }

    /// Check-and-clear the jump buffer.
    pub fn consume_jump_buffer(&mut self) -> bool {
        if self.jump_buffer > 0.0 {
            self.jump_buffer = 0.0;
            true
        } else {
            false
        }
    }

    pub fn has_buffered_jump(&self) -> bool {
        self.jump_buffer > 0.0
    }

    /// Arm the coyote-time window after leaving the ground.
    pub fn set_coyote_time(&mut self) {
        self.coyote = COYOTE_TIME;
    }

    /// Spend the coyote window on a jump so it cannot be reused.
    pub fn clear_coyote_time(&mut self) {
        self.coyote = 0.0;
    }

    pub fn has_coyote_time(&self) -> bool {
        self.coyote > 0.0
    }

    /// Drop this tick's edge sets. Call once per tick, after all consumers.
    pub fn clear_just_pressed(&mut self) {
        self.keys_just_pressed.clear();
        self.keys_just_released.clear();
    }

    /// Release every key, e.g. when the host window loses focus.
    pub fn release_all(&mut self) {
        let held: Vec<Key> = self.keys_down.iter().copied().collect();
        for key in held {
            self.on_key_up(key);
        }
    }
}

impl Default for InputTracker {
    fn default() -> Self {
        Self::new()
    }
}
