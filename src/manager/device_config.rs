// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Registration parameters for managed devices.

use serde::{Deserialize, Serialize};

use crate::capabilities::DeviceProperties;
use crate::config::BridgeSettings;

/// Who a device is: the bridge's id for it and how to reach the bridge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceIdentity {
    /// Bridge-assigned device id.
    pub bridge_id: String,
    /// Bridge address and token.
    pub settings: BridgeSettings,
}

impl DeviceIdentity {
    /// Creates an identity.
    #[must_use]
    pub fn new(bridge_id: impl Into<String>, settings: BridgeSettings) -> Self {
        Self {
            bridge_id: bridge_id.into(),
            settings,
        }
    }
}

/// Configuration for adding a device to the manager.
///
/// # Examples
///
/// ```
/// use bondfan_lib::{BridgeSettings, DeviceProperties};
/// use bondfan_lib::manager::DeviceConfig;
///
/// let config = DeviceConfig::new("a1b2c3", BridgeSettings::new("192.168.1.20", "f3a1c0de"))
///     .with_name("Bedroom Fan")
///     .with_properties(DeviceProperties {
///         feature_light: true,
///         feature_brightness: false,
///         max_speed: Some(6),
///     });
///
/// assert_eq!(config.display_name(), "Bedroom Fan");
/// ```
#[derive(Debug, Clone)]
pub struct DeviceConfig {
    /// Device identity.
    pub identity: DeviceIdentity,
    /// Optional display name.
    pub name: Option<String>,
    /// Known feature flags. Fetched from the bridge when `None`.
    pub properties: Option<DeviceProperties>,
}

impl DeviceConfig {
    /// Creates a configuration that fetches the feature flags on registration.
    #[must_use]
    pub fn new(bridge_id: impl Into<String>, settings: BridgeSettings) -> Self {
        Self {
            identity: DeviceIdentity::new(bridge_id, settings),
            name: None,
            properties: None,
        }
    }

    /// Sets the display name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Uses known feature flags instead of fetching them.
    #[must_use]
    pub fn with_properties(mut self, properties: DeviceProperties) -> Self {
        self.properties = Some(properties);
        self
    }

    /// Returns the display name, falling back to the bridge id.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.identity.bridge_id)
    }
}

impl From<DeviceIdentity> for DeviceConfig {
    fn from(identity: DeviceIdentity) -> Self {
        Self {
            identity,
            name: None,
            properties: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_name_falls_back_to_bridge_id() {
        let config = DeviceConfig::new("a1", BridgeSettings::new("10.0.0.2", "t"));
        assert_eq!(config.display_name(), "a1");
        assert!(config.properties.is_none());
    }

    #[test]
    fn from_identity() {
        let identity = DeviceIdentity::new("a1", BridgeSettings::new("10.0.0.2", "t"));
        let config = DeviceConfig::from(identity.clone());
        assert_eq!(config.identity, identity);
    }

    #[test]
    fn identity_serde_round_trip() {
        let identity = DeviceIdentity::new("a1", BridgeSettings::new("10.0.0.2", "t"));
        let json = serde_json::to_string(&identity).unwrap();
        let back: DeviceIdentity = serde_json::from_str(&json).unwrap();
        assert_eq!(back, identity);
    }
}
