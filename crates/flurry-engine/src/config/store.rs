//! Configuration store: defaults, persisted overrides, and single-field updates.

use std::collections::HashMap;

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::api::config::{AmbientConfig, EffectKind};

/// Key the configuration record is stored under.
pub const STORAGE_KEY: &str = "st_ambient_config";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("malformed config record: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("config record is not a JSON object")]
    NotAnObject,
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage is unavailable")]
    Unavailable,
    #[error("storage rejected write: {0}")]
    Write(String),
}

/// Key-value string persistence, e.g. browser `localStorage`.
pub trait Storage {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// In-memory storage. Used in tests and when no persistent store exists.
#[derive(Debug, Default, Clone)]
pub struct MemoryStorage {
    entries: HashMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(key: &str, value: &str) -> Self {
        let mut storage = Self::new();
        storage.entries.insert(key.to_string(), value.to_string());
        storage
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Replacement for exactly one configuration field.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigField {
    Enabled(bool),
    Kind(EffectKind),
    Speed(f32),
    Size(f32),
    Count(u32),
    Color(String),
}

/// Owns the live configuration and its persistence backend.
pub struct ConfigStore<S: Storage> {
    config: AmbientConfig,
    storage: S,
}

impl<S: Storage> ConfigStore<S> {
    /// Create a store holding defaults. Call [`load`](Self::load) to apply persisted values.
    pub fn new(storage: S) -> Self {
        Self {
            config: AmbientConfig::default(),
            storage,
        }
    }

    /// Create a store and immediately load persisted values over the defaults.
    pub fn open(storage: S) -> Self {
        let mut store = Self::new(storage);
        store.load();
        store
    }

    pub fn config(&self) -> &AmbientConfig {
        &self.config
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Reset to defaults, then overlay whatever the persisted record provides.
    /// Any failure leaves defaults in place and is only logged.
    pub fn load(&mut self) {
        self.config = AmbientConfig::default();
        let Some(raw) = self.storage.get(STORAGE_KEY) else {
            return;
        };
        if let Err(err) = merge_record(&mut self.config, &raw) {
            log::warn!("ambient config unreadable, using defaults: {}", err);
            self.config = AmbientConfig::default();
        }
    }

    /// Write the full configuration. Failures are logged and otherwise ignored.
    pub fn save(&mut self) {
        if let Err(err) = self.try_save() {
            log::warn!("ambient config not saved: {}", err);
        }
    }

    fn try_save(&mut self) -> Result<(), StorageError> {
        let json = self
            .config
            .to_json()
            .map_err(|e| StorageError::Write(e.to_string()))?;
        self.storage.set(STORAGE_KEY, &json)
    }

    /// Replace one field. No validation or clamping.
    pub fn update(&mut self, field: ConfigField) {
        match field {
            ConfigField::Enabled(v) => self.config.enabled = v,
            ConfigField::Kind(v) => self.config.kind = v,
            ConfigField::Speed(v) => self.config.speed = v,
            ConfigField::Size(v) => self.config.size = v,
            ConfigField::Count(v) => self.config.count = v,
            ConfigField::Color(v) => self.config.color = v,
        }
    }
}

/// Shallow merge of a persisted JSON record into `config`.
/// Unknown keys are ignored; a known key with a bad value keeps its current value.
pub fn merge_record(config: &mut AmbientConfig, raw: &str) -> Result<(), ConfigError> {
    let value: Value = serde_json::from_str(raw)?;
    let Value::Object(map) = value else {
        return Err(ConfigError::NotAnObject);
    };

    merge_field(&map, "enabled", &mut config.enabled);
    merge_field(&map, "type", &mut config.kind);
    merge_field(&map, "speed", &mut config.speed);
    merge_field(&map, "size", &mut config.size);
    merge_field(&map, "count", &mut config.count);
    merge_field(&map, "color", &mut config.color);
    Ok(())
}

fn merge_field<T: DeserializeOwned>(map: &Map<String, Value>, key: &str, slot: &mut T) {
    let Some(value) = map.get(key) else {
        return;
    };
    match serde_json::from_value::<T>(value.clone()) {
        Ok(v) => *slot = v,
        Err(err) => log::warn!("ignoring persisted `{}`: {}", key, err),
    }
}
