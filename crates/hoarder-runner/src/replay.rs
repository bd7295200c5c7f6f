//! Scripted input replays: key edges and player actions per host frame.

use serde::Deserialize;

use hoarder_core::clock::FrameHandler;
use hoarder_core::input::Key;
use hoarder_forest::nest::UpgradeKind;
use hoarder_forest::{ForestSim, SimEvent};

fn one() -> u32 {
    1
}

fn default_frame_ms() -> f64 {
    1000.0 / 60.0
}

/// Something the player does through a menu rather than a key.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Action {
    Deposit,
    Upgrade { kind: UpgradeKind },
    Complete { quest: String },
    Preserve,
}

/// One scripted host frame, repeated `repeat` times. Key edges and actions
/// apply before the first repetition only.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Frame {
    /// DOM `KeyboardEvent.code` strings.
    #[serde(default)]
    pub down: Vec<String>,
    #[serde(default)]
    pub up: Vec<String>,
    #[serde(default)]
    pub actions: Vec<Action>,
    #[serde(default = "one")]
    pub repeat: u32,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Replay {
    #[serde(default)]
    pub seed: Option<u64>,
    /// Wall-clock length of one host frame.
    #[serde(default = "default_frame_ms")]
    pub frame_ms: f64,
    pub frames: Vec<Frame>,
}

impl Replay {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn total_frames(&self) -> u64 {
        self.frames.iter().map(|f| u64::from(f.repeat)).sum()
    }
}

/// Resolve key codes, skipping (and logging) ones the game does not bind.
fn keys(codes: &[String]) -> impl Iterator<Item = Key> + '_ {
    codes.iter().filter_map(|code| {
        let key = Key::from_code(code);
        if key.is_none() {
            tracing::warn!(code = %code, "unbound key in replay");
        }
        key
    })
}

/// Scheduler callbacks over a sim, keeping a tally of what it emitted.
pub struct ReplayHost {
    pub sim: ForestSim,
    pub events: Vec<SimEvent>,
    pub renders: u64,
    pub last_alpha: f32,
}

impl ReplayHost {
    pub fn new(sim: ForestSim) -> Self {
        Self {
            sim,
            events: Vec::new(),
            renders: 0,
            last_alpha: 0.0,
        }
    }

    /// Feed a frame's key edges and run its actions.
    pub fn apply(&mut self, frame: &Frame) {
        for key in keys(&frame.down) {
            self.sim.key_down(key);
        }
        for key in keys(&frame.up) {
            self.sim.key_up(key);
        }
        for action in &frame.actions {
            self.run_action(action);
        }
    }

    fn run_action(&mut self, action: &Action) {
        match action {
            Action::Deposit => match self.sim.deposit_all() {
                Some(d) => tracing::info!(food = d.food, materials = d.materials, "deposited"),
                None => tracing::warn!("deposit outside the nest zone"),
            },
            Action::Upgrade { kind } => match self.sim.purchase_upgrade(*kind) {
                Ok(level) => tracing::info!(upgrade = kind.name(), level, "upgrade bought"),
                Err(e) => tracing::warn!("upgrade failed: {e}"),
            },
            Action::Complete { quest } => match self.sim.complete_quest(quest) {
                Ok(reward) => tracing::info!(quest = %quest, ?reward, "quest completed"),
                Err(e) => tracing::warn!("quest not completed: {e}"),
            },
            Action::Preserve => {
                let made = self.sim.preserve_food();
                tracing::info!(made, "food preserved");
            },
        }
    }
}

impl FrameHandler for ReplayHost {
    fn update(&mut self, dt: f32) {
        self.events.extend(self.sim.update(dt));
    }

    fn render(&mut self, alpha: f32) {
        self.renders += 1;
        self.last_alpha = alpha;
    }
}
