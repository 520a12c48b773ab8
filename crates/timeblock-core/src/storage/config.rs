//! TOML-based application configuration.
//!
//! Stores engine tuning:
//! - Drag-selection padding for the timeblock engine
//! - Slot and deadline policy for the auto-scheduler
//!
//! Configuration is stored at `~/.config/timeblock/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::data_dir;
use crate::error::{ConfigError, CoreError, Result};
use crate::scheduler::{AutoScheduler, SchedulerConfig};
use crate::timeblock::{TimeblockConfig, TimeblockEngine, MAX_DRAG_PADDING_MINUTES};

/// Timeblock engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeblocksSection {
    #[serde(default = "default_drag_padding_minutes")]
    pub drag_padding_minutes: i64,
}

/// Auto-scheduler configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerSection {
    #[serde(default = "default_min_slot_minutes")]
    pub min_slot_minutes: i64,
    #[serde(default = "default_true")]
    pub allow_past_deadline: bool,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/timeblock/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub timeblocks: TimeblocksSection,
    #[serde(default)]
    pub scheduler: SchedulerSection,
}

fn default_drag_padding_minutes() -> i64 {
    15
}
fn default_min_slot_minutes() -> i64 {
    15
}
fn default_true() -> bool {
    true
}

impl Default for TimeblocksSection {
    fn default() -> Self {
        Self {
            drag_padding_minutes: default_drag_padding_minutes(),
        }
    }
}

impl Default for SchedulerSection {
    fn default() -> Self {
        Self {
            min_slot_minutes: default_min_slot_minutes(),
            allow_past_deadline: true,
        }
    }
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(root: &mut serde_json::Value, key: &str, value: &str) -> Result<()> {
        let unknown = || CoreError::from(ConfigError::UnknownKey(key.to_string()));
        let invalid = |message: String| {
            CoreError::from(ConfigError::InvalidValue {
                key: key.to_string(),
                message,
            })
        };

        let mut parts = key.split('.').peekable();
        if parts.peek().is_none() || key.is_empty() {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            if parts.peek().is_none() {
                let obj = current.as_object_mut().ok_or_else(unknown)?;
                let existing = obj.get(part).ok_or_else(unknown)?;

                let new_value = match existing {
                    serde_json::Value::Bool(_) => serde_json::Value::Bool(
                        value
                            .parse::<bool>()
                            .map_err(|_| invalid(format!("cannot parse '{value}' as bool")))?,
                    ),
                    serde_json::Value::Number(_) => serde_json::Value::Number(
                        value
                            .parse::<i64>()
                            .map_err(|_| invalid(format!("cannot parse '{value}' as integer")))?
                            .into(),
                    ),
                    serde_json::Value::Object(_) => return Err(invalid("is a section, not a value".into())),
                    _ => serde_json::Value::String(value.into()),
                };

                obj.insert(part.to_string(), new_value);
                return Ok(());
            }

            current = current.get_mut(part).ok_or_else(unknown)?;
        }

        Err(unknown())
    }

    /// Check value ranges the engines rely on.
    ///
    /// # Errors
    /// Returns [`ConfigError::InvalidValue`] naming the offending key.
    pub fn validate(&self) -> Result<()> {
        let padding = self.timeblocks.drag_padding_minutes;
        if !(0..=MAX_DRAG_PADDING_MINUTES).contains(&padding) {
            return Err(ConfigError::InvalidValue {
                key: "timeblocks.drag_padding_minutes".into(),
                message: format!("must be between 0 and {MAX_DRAG_PADDING_MINUTES}, got {padding}"),
            }
            .into());
        }
        if self.scheduler.min_slot_minutes < 0 {
            return Err(ConfigError::InvalidValue {
                key: "scheduler.min_slot_minutes".into(),
                message: format!("must not be negative, got {}", self.scheduler.min_slot_minutes),
            }
            .into());
        }
        Ok(())
    }

    /// Default config file location
    ///
    /// # Errors
    /// Returns an error if the config directory cannot be created.
    pub fn path() -> Result<PathBuf> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from the default location, writing defaults if no file exists.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be parsed, or if the
    /// default config cannot be written.
    pub fn load() -> Result<Self> {
        let path = Self::path()?;
        if !path.exists() {
            let cfg = Self::default();
            cfg.save_to(&path)?;
            return Ok(cfg);
        }
        Self::load_from(&path)
    }

    /// Load from an explicit file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed, or holds an
    /// out-of-range value.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let cfg: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Load from disk, returning default on error.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_else(|err| {
            tracing::warn!(%err, "falling back to default config");
            Self::default()
        })
    }

    /// Persist to the default location.
    ///
    /// # Errors
    /// Returns an error if the config cannot be serialized or written.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::path()?)
    }

    /// Persist to an explicit file.
    ///
    /// # Errors
    /// Returns an error if the config cannot be serialized or written.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))?;
        Ok(())
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by dot-separated key. Does not save.
    ///
    /// # Errors
    /// Returns an error if the key is unknown, the value has the wrong type
    /// or is out of range. `self` is left unchanged on error.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let mut json = serde_json::to_value(&*self)?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Self = serde_json::from_value(json)?;
        updated.validate()?;
        *self = updated;
        Ok(())
    }

    /// Timeblock engine using this configuration
    pub fn engine(&self) -> TimeblockEngine {
        TimeblockEngine::with_config(TimeblockConfig {
            drag_padding_minutes: self.timeblocks.drag_padding_minutes,
        })
    }

    /// Scheduler using this configuration
    pub fn scheduler(&self) -> AutoScheduler {
        AutoScheduler::with_config(SchedulerConfig {
            min_slot_minutes: self.scheduler.min_slot_minutes,
            allow_past_deadline: self.scheduler.allow_past_deadline,
        })
    }
}
