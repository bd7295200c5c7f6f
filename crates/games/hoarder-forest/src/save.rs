//! Versioned save snapshots over a pluggable key/value store.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use hoarder_core::rng::RngState;
use hoarder_core::world_time::{Season, Weather};

use crate::achievements::AchievementTracker;
use crate::level::{Pushable, Trigger};
use crate::nest::Nest;
use crate::player::Player;
use crate::quests::QuestLog;

pub const SAVE_KEY: &str = "forest-hoarder-save";
pub const SAVE_VERSION: &str = "1.0.0";

/// Top-level fields a save must carry to be loadable.
const REQUIRED_FIELDS: [&str; 3] = ["version", "player", "nest"];

#[derive(Debug)]
pub enum SaveError {
    NoSave,
    Invalid(String),
    Parse(serde_json::Error),
    Storage(String),
}

impl std::fmt::Display for SaveError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoSave => write!(f, "no save found"),
            Self::Invalid(why) => write!(f, "invalid save: {why}"),
            Self::Parse(e) => write!(f, "save parse error: {e}"),
            Self::Storage(e) => write!(f, "storage error: {e}"),
        }
    }
}

impl std::error::Error for SaveError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Parse(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for SaveError {
    fn from(e: serde_json::Error) -> Self {
        Self::Parse(e)
    }
}

/// Host-side persistence, e.g. browser local storage or a directory.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, SaveError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), SaveError>;
    fn remove(&mut self, key: &str) -> Result<(), SaveError>;
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, SaveError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), SaveError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), SaveError> {
        self.entries.remove(key);
        Ok(())
    }
}

/// One `<key>.json` file per key under `root`.
#[derive(Debug, Clone)]
pub struct DirStore {
    root: PathBuf,
}

impl DirStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, SaveError> {
        if key.is_empty() || key.contains(['/', '\\']) || key.starts_with('.') {
            return Err(SaveError::Storage(format!("unusable key {key:?}")));
        }
        Ok(self.root.join(format!("{key}.json")))
    }
}

impl KeyValueStore for DirStore {
    fn get(&self, key: &str) -> Result<Option<String>, SaveError> {
        let path = self.path_for(key)?;
        match std::fs::read_to_string(&path) {
            Ok(s) => Ok(Some(s)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(SaveError::Storage(format!("{}: {e}", path.display()))),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), SaveError> {
        let path = self.path_for(key)?;
        std::fs::create_dir_all(&self.root)
            .and_then(|()| std::fs::write(&path, value))
            .map_err(|e| SaveError::Storage(format!("{}: {e}", path.display())))
    }

    fn remove(&mut self, key: &str) -> Result<(), SaveError> {
        let path = self.path_for(key)?;
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(SaveError::Storage(format!("{}: {e}", path.display()))),
        }
    }
}

/// Level and progression state beyond the player and nest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorldSave {
    pub pushables: Vec<Pushable>,
    pub triggers: Vec<Trigger>,
    #[serde(default)]
    pub quests: QuestLog,
    #[serde(default)]
    pub achievements: AchievementTracker,
    pub rng: RngState,
    #[serde(default)]
    pub furthest_x: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveData {
    pub version: String,
    /// Unix time in milliseconds.
    pub timestamp: u64,
    pub season: Season,
    pub day: u32,
    pub weather: Weather,
    /// Fraction of the current day elapsed, 0..1.
    pub time_of_day: f32,
    pub player: Player,
    pub nest: Nest,
    pub world: WorldSave,
}

/// Header of a save, for menus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveInfo {
    pub version: String,
    pub timestamp: u64,
    pub season: String,
    pub day: u32,
}

pub fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

pub fn write_save(store: &mut dyn KeyValueStore, data: &SaveData) -> Result<(), SaveError> {
    let json = serde_json::to_string(data)?;
    store.set(SAVE_KEY, &json)?;
    tracing::info!(bytes = json.len(), season = data.season.name(), day = data.day, "game saved");
    Ok(())
}

/// Read and validate the stored save. A missing key is `NoSave`; a save
/// lacking any required field is `Invalid`.
pub fn read_save(store: &dyn KeyValueStore) -> Result<SaveData, SaveError> {
    let raw = store.get(SAVE_KEY)?.ok_or(SaveError::NoSave)?;
    let value: serde_json::Value = serde_json::from_str(&raw)?;
    for field in REQUIRED_FIELDS {
        if value.get(field).is_none_or(serde_json::Value::is_null) {
            return Err(SaveError::Invalid(format!("missing {field}")));
        }
    }
    let data: SaveData = serde_json::from_value(value)?;
    if data.version != SAVE_VERSION {
        tracing::warn!(found = %data.version, expected = SAVE_VERSION, "loading save from another version");
    }
    Ok(data)
}

pub fn has_save(store: &dyn KeyValueStore) -> bool {
    matches!(store.get(SAVE_KEY), Ok(Some(_)))
}

pub fn delete_save(store: &mut dyn KeyValueStore) -> Result<(), SaveError> {
    store.remove(SAVE_KEY)
}

/// Header fields of the stored save, or `None` if there is no readable save.
pub fn save_info(store: &dyn KeyValueStore) -> Option<SaveInfo> {
    let raw = store.get(SAVE_KEY).ok()??;
    let value: serde_json::Value = serde_json::from_str(&raw).ok()?;
    Some(SaveInfo {
        version: value.get("version")?.as_str()?.to_string(),
        timestamp: value.get("timestamp").and_then(|t| t.as_u64()).unwrap_or(0),
        season: value
            .get("season")
            .and_then(|s| s.as_str())
            .unwrap_or("Spring")
            .to_string(),
        day: value
            .get("day")
            .and_then(|d| d.as_u64())
            .map_or(1, |d| d as u32),
    })
}
