// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Feature detection and capability profiles.
//!
//! A fan reports its static feature flags once through
//! `GET /v2/devices/{id}/properties`. [`CapabilityProfile::from_properties`]
//! turns those flags into the set of capabilities the device exposes. The
//! profile is computed once per device session and never changes afterwards.
//!
//! # Profile Axes
//!
//! | Axis | Variants | Decided by |
//! |------|----------|------------|
//! | Power | plain / light | `feature_light` |
//! | Speed | continuous / discrete | `max_speed` |
//! | Dimmer | present / absent | `feature_light` and `feature_brightness` |
//! | Direction | always present | - |

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ValueError;

/// Static feature flags reported by the bridge for one device.
///
/// Parsing is lenient: a flag that is missing or has the wrong JSON type is
/// treated as absent.
///
/// # Examples
///
/// ```
/// use bondfan_lib::DeviceProperties;
///
/// let props = DeviceProperties::from_json(&serde_json::json!({
///     "feature_light": true,
///     "feature_brightness": "yes",
///     "max_speed": 6
/// }));
///
/// assert!(props.feature_light);
/// assert!(!props.feature_brightness);
/// assert_eq!(props.max_speed, Some(6));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceProperties {
    /// The device has a light.
    #[serde(default)]
    pub feature_light: bool,
    /// The light is dimmable.
    #[serde(default)]
    pub feature_brightness: bool,
    /// Highest speed step; absent for fixed 3-speed fans.
    #[serde(default)]
    pub max_speed: Option<u32>,
}

impl DeviceProperties {
    /// Reads properties from a raw bridge payload.
    ///
    /// Non-object payloads yield the default (no optional features).
    /// `max_speed` is kept only when it is a positive integer.
    #[must_use]
    pub fn from_json(value: &Value) -> Self {
        let flag = |key: &str| value.get(key).and_then(Value::as_bool).unwrap_or(false);

        let max_speed = value
            .get("max_speed")
            .and_then(Value::as_u64)
            .filter(|speed| *speed > 0)
            .and_then(|speed| u32::try_from(speed).ok());

        Self {
            feature_light: flag("feature_light"),
            feature_brightness: flag("feature_brightness"),
            max_speed,
        }
    }
}

/// What the on/off capability controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PowerControl {
    /// On/off drives the fan motor.
    Plain,
    /// On/off drives the light; the motor is controlled through speed.
    Light,
}

/// How fan speed is exposed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpeedControl {
    /// `fan_speed` capability in `0..=max_speed`.
    Continuous {
        /// Highest speed step reported by the device.
        max_speed: u32,
    },
    /// `fan_mode` capability with off/low/medium/high.
    Discrete,
}

/// Capability profile derived from [`DeviceProperties`].
///
/// # Examples
///
/// ```
/// use bondfan_lib::{CapabilityProfile, DeviceProperties, PowerControl, SpeedControl};
///
/// let profile = CapabilityProfile::from_properties(&DeviceProperties {
///     feature_light: true,
///     feature_brightness: true,
///     max_speed: None,
/// });
///
/// assert_eq!(profile.power, PowerControl::Light);
/// assert_eq!(profile.speed, SpeedControl::Discrete);
/// assert!(profile.dimmer);
/// assert!(profile.direction);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CapabilityProfile {
    /// Power axis.
    pub power: PowerControl,
    /// Speed axis.
    pub speed: SpeedControl,
    /// The `dim` capability is registered.
    pub dimmer: bool,
    /// The `fan_direction` capability is registered.
    pub direction: bool,
}

impl CapabilityProfile {
    /// Derives the profile from a device's feature flags.
    #[must_use]
    pub fn from_properties(properties: &DeviceProperties) -> Self {
        let power = if properties.feature_light {
            PowerControl::Light
        } else {
            PowerControl::Plain
        };

        let speed = match properties.max_speed {
            Some(max_speed) if max_speed > 0 => SpeedControl::Continuous { max_speed },
            _ => SpeedControl::Discrete,
        };

        Self {
            power,
            speed,
            dimmer: properties.feature_light && properties.feature_brightness,
            direction: true,
        }
    }

    /// Returns whether on/off controls the light.
    #[must_use]
    pub const fn has_light(&self) -> bool {
        matches!(self.power, PowerControl::Light)
    }

    /// Returns the highest speed step for continuous-speed fans.
    #[must_use]
    pub const fn max_speed(&self) -> Option<u32> {
        match self.speed {
            SpeedControl::Continuous { max_speed } => Some(max_speed),
            SpeedControl::Discrete => None,
        }
    }

    /// Returns whether the profile registers `capability`.
    #[must_use]
    pub const fn supports(&self, capability: Capability) -> bool {
        match capability {
            Capability::OnOff => true,
            Capability::Dim => self.dimmer,
            Capability::FanSpeed => matches!(self.speed, SpeedControl::Continuous { .. }),
            Capability::FanMode => matches!(self.speed, SpeedControl::Discrete),
            Capability::FanDirection => self.direction,
        }
    }

    /// Returns the registered capabilities in a stable order.
    #[must_use]
    pub fn capabilities(&self) -> Vec<Capability> {
        Capability::ALL
            .into_iter()
            .filter(|capability| self.supports(*capability))
            .collect()
    }
}

impl Default for CapabilityProfile {
    fn default() -> Self {
        Self::from_properties(&DeviceProperties::default())
    }
}

/// A named control surface exposed to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// `onoff`: light or motor power.
    #[serde(rename = "onoff")]
    OnOff,
    /// `dim`: light level as a fraction.
    Dim,
    /// `fan_speed`: continuous speed.
    FanSpeed,
    /// `fan_mode`: off/low/medium/high.
    FanMode,
    /// `fan_direction`: rotation direction.
    FanDirection,
}

impl Capability {
    /// Every capability, in registration order.
    pub const ALL: [Self; 5] = [
        Self::OnOff,
        Self::Dim,
        Self::FanSpeed,
        Self::FanMode,
        Self::FanDirection,
    ];

    /// Returns the capability name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::OnOff => "onoff",
            Self::Dim => "dim",
            Self::FanSpeed => "fan_speed",
            Self::FanMode => "fan_mode",
            Self::FanDirection => "fan_direction",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Capability {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|capability| capability.as_str() == s)
            .ok_or_else(|| ValueError::UnknownCapability(s.to_string()))
    }
}
