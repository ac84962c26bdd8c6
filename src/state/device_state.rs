// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Raw device state as polled from the bridge.

use serde::Serialize;
use serde_json::Value;

/// Raw state reported by `GET /v2/devices/{id}/state`.
///
/// Every field is optional. A field missing from a poll means "unchanged",
/// never zero or off.
///
/// # Examples
///
/// ```
/// use bondfan_lib::state::DeviceState;
///
/// let state = DeviceState::from_json(&serde_json::json!({
///     "power": 1,
///     "speed": 50,
///     "_": "7fc1e84b"
/// }));
///
/// assert_eq!(state.power, Some(1));
/// assert_eq!(state.speed, Some(50));
/// assert_eq!(state.light, None);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DeviceState {
    /// Fan motor power (1 = on).
    pub power: Option<i64>,
    /// Light power (1 = on).
    pub light: Option<i64>,
    /// Light brightness (0-100).
    pub brightness: Option<i64>,
    /// Fan speed step.
    pub speed: Option<i64>,
    /// Rotation direction (1 = forward, -1 = reverse).
    pub direction: Option<i64>,
}

impl DeviceState {
    /// Reads a state payload, skipping fields that are not integers.
    ///
    /// Whole-valued floats (`50.0`) are accepted; other types are treated
    /// as absent.
    #[must_use]
    pub fn from_json(value: &Value) -> Self {
        let field = |key: &str| value.get(key).and_then(as_integer);

        Self {
            power: field("power"),
            light: field("light"),
            brightness: field("brightness"),
            speed: field("speed"),
            direction: field("direction"),
        }
    }

    /// Returns `true` if the payload carried none of the known fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[allow(clippy::cast_possible_truncation)]
fn as_integer(value: &Value) -> Option<i64> {
    if let Some(v) = value.as_i64() {
        return Some(v);
    }
    // Safe: only whole numbers inside the i64 range reach the cast
    value
        .as_f64()
        .filter(|f| f.fract() == 0.0 && f.abs() < 9.0e15)
        .map(|f| f as i64)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn parses_full_payload() {
        let state = DeviceState::from_json(&json!({
            "power": 1,
            "light": 0,
            "brightness": 42,
            "speed": 3,
            "direction": -1
        }));
        assert_eq!(state, DeviceState {
            power: Some(1),
            light: Some(0),
            brightness: Some(42),
            speed: Some(3),
            direction: Some(-1),
        });
    }

    #[test]
    fn missing_fields_stay_absent() {
        let state = DeviceState::from_json(&json!({ "light": 1 }));
        assert_eq!(state.light, Some(1));
        assert_eq!(state.power, None);
        assert_eq!(state.brightness, None);
        assert!(!state.is_empty());
    }

    #[test]
    fn wrong_types_are_ignored() {
        let state = DeviceState::from_json(&json!({
            "power": "on",
            "speed": 2.5,
            "brightness": null
        }));
        assert!(state.is_empty());
    }

    #[test]
    fn whole_floats_are_accepted() {
        let state = DeviceState::from_json(&json!({ "speed": 50.0 }));
        assert_eq!(state.speed, Some(50));
    }

    #[test]
    fn non_object_payload_is_empty() {
        assert!(DeviceState::from_json(&json!([1, 2, 3])).is_empty());
    }
}
