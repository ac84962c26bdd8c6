// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Bridge settings, polling configuration and settings storage.
//!
//! Settings are only written to a [`SettingsStore`] after they pass
//! validation, so a store never holds credentials the bridge rejected.

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ProtocolError};
use crate::types::check_credentials;

/// Network address and access token of a bridge.
///
/// # Examples
///
/// ```
/// use bondfan_lib::BridgeSettings;
///
/// let settings = BridgeSettings::new("192.168.1.20", "f3a1c0de");
/// assert!(settings.validate_syntax().is_ok());
///
/// let bad = BridgeSettings::new("bridge.local", "f3a1c0de");
/// assert!(bad.validate_syntax().is_err());
/// ```
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BridgeSettings {
    /// IPv4 address of the bridge.
    pub address: String,
    /// Access token sent in the token header.
    pub token: String,
}

impl BridgeSettings {
    /// Creates settings from an address and token.
    #[must_use]
    pub fn new(address: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            token: token.into(),
        }
    }

    /// Checks the address and token syntax without any network call.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError::InvalidAddress` or `ProtocolError::InvalidToken`.
    pub fn validate_syntax(&self) -> Result<(), ProtocolError> {
        check_credentials(&self.address, &self.token)
    }
}

impl fmt::Debug for BridgeSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BridgeSettings")
            .field("address", &self.address)
            .field("token", &"<redacted>")
            .finish()
    }
}

/// Polling behaviour of the device manager.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use bondfan_lib::PollingConfig;
///
/// let config = PollingConfig::default().with_interval(Duration::from_secs(30));
/// assert_eq!(config.interval(), Duration::from_secs(30));
/// ```
#[derive(Debug, Clone)]
pub struct PollingConfig {
    interval: Duration,
    event_capacity: usize,
}

impl PollingConfig {
    /// Default interval between poll cycles.
    pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(10);
    /// Default event bus capacity.
    pub const DEFAULT_EVENT_CAPACITY: usize = 256;

    /// Sets the poll interval. Zero is raised to one millisecond.
    #[must_use]
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval.max(Duration::from_millis(1));
        self
    }

    /// Sets the event bus capacity.
    #[must_use]
    pub fn with_event_capacity(mut self, capacity: usize) -> Self {
        self.event_capacity = capacity.max(1);
        self
    }

    /// Returns the poll interval.
    #[must_use]
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Returns the event bus capacity.
    #[must_use]
    pub fn event_capacity(&self) -> usize {
        self.event_capacity
    }
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            interval: Self::DEFAULT_INTERVAL,
            event_capacity: Self::DEFAULT_EVENT_CAPACITY,
        }
    }
}

/// Storage for per-device bridge settings, keyed by bridge device id.
pub trait SettingsStore: Send + Sync {
    /// Loads the settings for a device.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the backing storage cannot be read.
    fn load(&self, device_id: &str) -> Result<Option<BridgeSettings>, ConfigError>;

    /// Saves the settings for a device.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the backing storage cannot be written.
    fn save(&self, device_id: &str, settings: &BridgeSettings) -> Result<(), ConfigError>;

    /// Removes the settings for a device.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the backing storage cannot be written.
    fn remove(&self, device_id: &str) -> Result<(), ConfigError>;
}

/// In-memory settings store.
#[derive(Debug, Default)]
pub struct MemorySettingsStore {
    entries: RwLock<HashMap<String, BridgeSettings>>,
}

impl MemorySettingsStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl SettingsStore for MemorySettingsStore {
    fn load(&self, device_id: &str) -> Result<Option<BridgeSettings>, ConfigError> {
        Ok(self.entries.read().get(device_id).cloned())
    }

    fn save(&self, device_id: &str, settings: &BridgeSettings) -> Result<(), ConfigError> {
        self.entries
            .write()
            .insert(device_id.to_string(), settings.clone());
        Ok(())
    }

    fn remove(&self, device_id: &str) -> Result<(), ConfigError> {
        self.entries.write().remove(device_id);
        Ok(())
    }
}

/// Settings store backed by a pretty-printed JSON file.
///
/// The whole file is rewritten on every save. A missing file reads as empty.
#[derive(Debug)]
pub struct JsonFileSettingsStore {
    path: PathBuf,
    lock: RwLock<()>,
}

impl JsonFileSettingsStore {
    /// Creates a store for the given file path.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: RwLock::new(()),
        }
    }

    /// Returns the file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<HashMap<String, BridgeSettings>, ConfigError> {
        if !self.path.exists() {
            return Ok(HashMap::new());
        }
        let contents = fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    fn write_all(&self, entries: &HashMap<String, BridgeSettings>) -> Result<(), ConfigError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(entries)?;
        fs::write(&self.path, contents)?;
        tracing::debug!(path = %self.path.display(), "Saved bridge settings");
        Ok(())
    }
}

impl SettingsStore for JsonFileSettingsStore {
    fn load(&self, device_id: &str) -> Result<Option<BridgeSettings>, ConfigError> {
        let _guard = self.lock.read();
        Ok(self.read_all()?.remove(device_id))
    }

    fn save(&self, device_id: &str, settings: &BridgeSettings) -> Result<(), ConfigError> {
        let _guard = self.lock.write();
        let mut entries = self.read_all()?;
        entries.insert(device_id.to_string(), settings.clone());
        self.write_all(&entries)
    }

    fn remove(&self, device_id: &str) -> Result<(), ConfigError> {
        let _guard = self.lock.write();
        let mut entries = self.read_all()?;
        if entries.remove(device_id).is_some() {
            self.write_all(&entries)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_redacts_token() {
        let settings = BridgeSettings::new("192.168.1.20", "very-secret");
        let debug = format!("{settings:?}");
        assert!(debug.contains("192.168.1.20"));
        assert!(!debug.contains("very-secret"));
    }

    #[test]
    fn validate_syntax_checks_address_then_token() {
        assert!(matches!(
            BridgeSettings::new("999.1.1.1", "").validate_syntax(),
            Err(ProtocolError::InvalidAddress(_))
        ));
        assert!(matches!(
            BridgeSettings::new("10.0.0.2", "").validate_syntax(),
            Err(ProtocolError::InvalidToken)
        ));
    }

    #[test]
    fn polling_config_defaults() {
        let config = PollingConfig::default();
        assert_eq!(config.interval(), Duration::from_secs(10));
        assert_eq!(config.event_capacity(), 256);
    }

    #[test]
    fn polling_config_rejects_zero() {
        let config = PollingConfig::default()
            .with_interval(Duration::ZERO)
            .with_event_capacity(0);
        assert_eq!(config.interval(), Duration::from_millis(1));
        assert_eq!(config.event_capacity(), 1);
    }

    #[test]
    fn memory_store_round_trip() {
        let store = MemorySettingsStore::new();
        assert!(store.load("abc").unwrap().is_none());

        let settings = BridgeSettings::new("10.0.0.2", "t");
        store.save("abc", &settings).unwrap();
        assert_eq!(store.load("abc").unwrap(), Some(settings));

        store.remove("abc").unwrap();
        assert!(store.load("abc").unwrap().is_none());
    }

    #[test]
    fn json_file_store_persists_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.json");

        let store = JsonFileSettingsStore::new(&path);
        assert!(store.load("abc").unwrap().is_none());

        store
            .save("abc", &BridgeSettings::new("10.0.0.2", "one"))
            .unwrap();
        store
            .save("def", &BridgeSettings::new("10.0.0.3", "two"))
            .unwrap();

        let reopened = JsonFileSettingsStore::new(&path);
        assert_eq!(
            reopened.load("def").unwrap(),
            Some(BridgeSettings::new("10.0.0.3", "two"))
        );

        reopened.remove("abc").unwrap();
        assert!(store.load("abc").unwrap().is_none());
        assert!(store.load("def").unwrap().is_some());
    }

    #[test]
    fn json_file_store_reports_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "not json").unwrap();

        let store = JsonFileSettingsStore::new(&path);
        assert!(matches!(store.load("abc"), Err(ConfigError::Format(_))));
    }
}
