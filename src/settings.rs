//! Settings loaded from TOML
//!
//! Read from ~/.config/termtris/settings.toml (or platform equivalent) when
//! present. The game never writes this file.

use crate::game::SOFT_DROP_INTERVAL;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

/// Game settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Keybindings
    pub keys: KeyBindings,
    /// Loop timing
    pub timing: TimingSettings,
}

/// Key bindings (stored as strings for easy editing)
/// Each action can have one or more keys bound to it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyBindings {
    #[serde(deserialize_with = "deserialize_keys", serialize_with = "serialize_keys")]
    pub move_left: Vec<String>,
    #[serde(deserialize_with = "deserialize_keys", serialize_with = "serialize_keys")]
    pub move_right: Vec<String>,
    #[serde(deserialize_with = "deserialize_keys", serialize_with = "serialize_keys")]
    pub rotate: Vec<String>,
    #[serde(deserialize_with = "deserialize_keys", serialize_with = "serialize_keys")]
    pub soft_drop: Vec<String>,
    #[serde(deserialize_with = "deserialize_keys", serialize_with = "serialize_keys")]
    pub quit: Vec<String>,
}

/// A binding as written in the file: `"a"` or `["a", "space"]`
#[derive(Deserialize)]
#[serde(untagged)]
enum KeyList {
    One(String),
    Many(Vec<String>),
}

fn deserialize_keys<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(match KeyList::deserialize(deserializer)? {
        KeyList::One(key) => vec![key],
        KeyList::Many(keys) => keys,
    })
}

/// A lone key is written back as a plain string
fn serialize_keys<S>(keys: &[String], serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    match keys {
        [key] => serializer.serialize_str(key),
        _ => keys.serialize(serializer),
    }
}

/// Scheduler timing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingSettings {
    /// Sleep between scheduler passes, in milliseconds
    pub poll_interval_ms: u64,
    /// Upper bound on the wait for a pending key, in milliseconds
    pub input_timeout_ms: u64,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            move_left: vec!["a".to_string()],
            move_right: vec!["d".to_string()],
            rotate: vec!["w".to_string()],
            soft_drop: vec!["s".to_string()],
            quit: vec!["q".to_string()],
        }
    }
}

impl Default for TimingSettings {
    fn default() -> Self {
        Self {
            poll_interval_ms: 50,
            input_timeout_ms: 1,
        }
    }
}

/// Shortest sleep between passes; zero would spin the loop
const MIN_POLL_INTERVAL_MS: u64 = 1;
/// Longest wait for a key. Must stay well under the soft drop period.
const MAX_INPUT_TIMEOUT_MS: u64 = 10;

impl TimingSettings {
    /// Pull both values into the range the loop can keep gravity on time with
    fn clamped(self) -> Self {
        let max_poll_ms = SOFT_DROP_INTERVAL.as_millis() as u64;
        let poll_interval_ms = self.poll_interval_ms.clamp(MIN_POLL_INTERVAL_MS, max_poll_ms);
        if poll_interval_ms != self.poll_interval_ms {
            tracing::warn!(
                "poll_interval_ms = {} is out of range, using {}",
                self.poll_interval_ms,
                poll_interval_ms
            );
        }

        let input_timeout_ms = self.input_timeout_ms.min(MAX_INPUT_TIMEOUT_MS);
        if input_timeout_ms != self.input_timeout_ms {
            tracing::warn!(
                "input_timeout_ms = {} is too long, using {}",
                self.input_timeout_ms,
                input_timeout_ms
            );
        }

        Self {
            poll_interval_ms,
            input_timeout_ms,
        }
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn input_timeout(&self) -> Duration {
        Duration::from_millis(self.input_timeout_ms)
    }
}

impl Settings {
    /// Get the config directory path
    fn config_dir() -> Option<PathBuf> {
        ProjectDirs::from("com", "termtris", "termtris").map(|dirs| dirs.config_dir().to_path_buf())
    }

    /// Get the settings file path
    pub fn settings_path() -> Option<PathBuf> {
        Self::config_dir().map(|dir| dir.join("settings.toml"))
    }

    /// Load settings from file, or fall back to the defaults
    pub fn load() -> Self {
        let Some(path) = Self::settings_path() else {
            tracing::debug!("No config directory, using default settings");
            return Self::default();
        };

        match fs::read_to_string(&path) {
            Ok(contents) => match Self::from_toml(&contents) {
                Ok(settings) => {
                    tracing::info!("Loaded settings from {}", path.display());
                    settings
                }
                Err(e) => {
                    tracing::warn!("Ignoring malformed {}: {}", path.display(), e);
                    Self::default()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("No settings at {}, using defaults", path.display());
                Self::default()
            }
            Err(e) => {
                tracing::warn!("Could not read {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Parse settings from TOML text; missing fields take their defaults and
    /// timing values are clamped
    pub fn from_toml(contents: &str) -> Result<Self, toml::de::Error> {
        let mut settings: Self = toml::from_str(contents)?;
        settings.timing = settings.timing.clamped();
        Ok(settings)
    }
}
