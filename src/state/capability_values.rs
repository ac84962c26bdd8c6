// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Capability values exposed to the host.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::capabilities::Capability;

use super::CapabilityChange;

/// The value of a single capability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CapabilityValue {
    /// A boolean value (`onoff`).
    Bool(bool),
    /// A numeric value (`dim`, `fan_speed`).
    Number(f64),
    /// An enumerated string value (`fan_mode`, `fan_direction`).
    Text(String),
}

impl CapabilityValue {
    /// Returns the value as a boolean, if it is one.
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the value as a number, if it is one.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the value as a string, if it is one.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for CapabilityValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<bool> for CapabilityValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<f64> for CapabilityValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for CapabilityValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for CapabilityValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// Current capability values of a device.
///
/// Values start out unknown and are filled in by writes and polls.
///
/// # Examples
///
/// ```
/// use bondfan_lib::Capability;
/// use bondfan_lib::state::{CapabilityChange, CapabilityValues};
///
/// let mut values = CapabilityValues::new();
/// let change = CapabilityChange::new(Capability::OnOff, true);
///
/// assert!(values.apply(&change));
/// assert!(!values.apply(&change));
/// assert_eq!(values.onoff(), Some(true));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CapabilityValues {
    values: BTreeMap<Capability, CapabilityValue>,
}

impl CapabilityValues {
    /// Creates an empty value set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the value of a capability.
    #[must_use]
    pub fn get(&self, capability: Capability) -> Option<&CapabilityValue> {
        self.values.get(&capability)
    }

    /// Applies a change.
    ///
    /// Returns `true` if the stored value actually changed.
    pub fn apply(&mut self, change: &CapabilityChange) -> bool {
        if self.values.get(&change.capability) == Some(&change.value) {
            return false;
        }
        self.values.insert(change.capability, change.value.clone());
        true
    }

    /// Applies several changes and returns the ones that changed a value.
    pub fn apply_all<'a>(
        &mut self,
        changes: impl IntoIterator<Item = &'a CapabilityChange>,
    ) -> Vec<CapabilityChange> {
        changes
            .into_iter()
            .filter(|change| self.apply(change))
            .cloned()
            .collect()
    }

    /// Returns the `onoff` value.
    #[must_use]
    pub fn onoff(&self) -> Option<bool> {
        self.get(Capability::OnOff).and_then(CapabilityValue::as_bool)
    }

    /// Returns the `dim` value.
    #[must_use]
    pub fn dim(&self) -> Option<f64> {
        self.get(Capability::Dim).and_then(CapabilityValue::as_f64)
    }

    /// Returns the `fan_speed` value.
    #[must_use]
    pub fn fan_speed(&self) -> Option<f64> {
        self.get(Capability::FanSpeed)
            .and_then(CapabilityValue::as_f64)
    }

    /// Returns the `fan_mode` value.
    #[must_use]
    pub fn fan_mode(&self) -> Option<&str> {
        self.get(Capability::FanMode).and_then(CapabilityValue::as_str)
    }

    /// Returns the `fan_direction` value.
    #[must_use]
    pub fn fan_direction(&self) -> Option<&str> {
        self.get(Capability::FanDirection)
            .and_then(CapabilityValue::as_str)
    }

    /// Iterates over the known values.
    pub fn iter(&self) -> impl Iterator<Item = (Capability, &CapabilityValue)> {
        self.values.iter().map(|(capability, value)| (*capability, value))
    }

    /// Returns the number of known values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` if no value is known yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_values_are_unknown() {
        let values = CapabilityValues::new();
        assert!(values.is_empty());
        assert_eq!(values.onoff(), None);
        assert_eq!(values.fan_mode(), None);
    }

    #[test]
    fn apply_reports_changes() {
        let mut values = CapabilityValues::new();
        assert!(values.apply(&CapabilityChange::new(Capability::Dim, 0.5)));
        assert!(!values.apply(&CapabilityChange::new(Capability::Dim, 0.5)));
        assert!(values.apply(&CapabilityChange::new(Capability::Dim, 0.6)));
        assert_eq!(values.dim(), Some(0.6));
    }

    #[test]
    fn apply_all_returns_effective_changes() {
        let mut values = CapabilityValues::new();
        values.apply(&CapabilityChange::new(Capability::OnOff, true));

        let changes = vec![
            CapabilityChange::new(Capability::OnOff, true),
            CapabilityChange::new(Capability::FanMode, "high"),
        ];
        let applied = values.apply_all(&changes);
        assert_eq!(applied, vec![CapabilityChange::new(Capability::FanMode, "high")]);
        assert_eq!(values.len(), 2);
    }

    #[test]
    fn typed_accessors_check_kind() {
        let mut values = CapabilityValues::new();
        values.apply(&CapabilityChange::new(Capability::OnOff, "yes"));
        assert_eq!(values.onoff(), None);
    }

    #[test]
    fn value_display() {
        assert_eq!(CapabilityValue::from(true).to_string(), "true");
        assert_eq!(CapabilityValue::from(0.25).to_string(), "0.25");
        assert_eq!(CapabilityValue::from("low").to_string(), "low");
    }

    #[test]
    fn value_serializes_untagged() {
        let json = serde_json::to_value(CapabilityValue::from("medium")).unwrap();
        assert_eq!(json, serde_json::json!("medium"));
        let json = serde_json::to_value(CapabilityValue::from(true)).unwrap();
        assert_eq!(json, serde_json::json!(true));
    }
}
