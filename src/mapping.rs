// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Translation between capability values and bridge actions.
//!
//! Two pure functions connect the host's capability model to the bridge:
//!
//! - [`plan_write`] turns a capability write into local value changes and
//!   the bridge actions that carry it out.
//! - [`reconcile`] turns a polled [`DeviceState`] into capability changes.
//!
//! Both take the device's [`CapabilityProfile`]; neither talks to the network.

use crate::action::BridgeAction;
use crate::capabilities::{Capability, CapabilityProfile, PowerControl, SpeedControl};
use crate::error::{Error, ValueError};
use crate::state::{CapabilityChange, CapabilityValue, DeviceState};
use crate::types::{Brightness, FanMode};

/// The effects of one capability write.
///
/// `local` changes are applied to the device's values before any action is
/// sent. `actions` are sent in order; the first failure stops the rest.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WritePlan {
    /// Optimistic local value changes, in order.
    pub local: Vec<CapabilityChange>,
    /// Bridge actions, in order.
    pub actions: Vec<BridgeAction>,
}

impl WritePlan {
    fn new() -> Self {
        Self::default()
    }

    fn set(mut self, capability: Capability, value: impl Into<CapabilityValue>) -> Self {
        self.local.push(CapabilityChange::new(capability, value));
        self
    }

    fn send(mut self, action: BridgeAction) -> Self {
        self.actions.push(action);
        self
    }
}

/// Plans a capability write for a device with the given profile.
///
/// # Errors
///
/// Returns [`Error::CapabilityNotSupported`] if the profile does not register
/// `capability`, or [`Error::Value`] if `value` has the wrong kind.
///
/// # Examples
///
/// ```
/// use bondfan_lib::{BridgeAction, Capability, CapabilityProfile, DeviceProperties};
/// use bondfan_lib::mapping::plan_write;
///
/// let profile = CapabilityProfile::from_properties(&DeviceProperties {
///     feature_light: true,
///     feature_brightness: true,
///     max_speed: None,
/// });
///
/// let plan = plan_write(&profile, Capability::OnOff, &true.into()).unwrap();
/// assert_eq!(plan.actions, vec![BridgeAction::TurnLightOn]);
/// ```
pub fn plan_write(
    profile: &CapabilityProfile,
    capability: Capability,
    value: &CapabilityValue,
) -> Result<WritePlan, Error> {
    if !profile.supports(capability) {
        return Err(Error::CapabilityNotSupported(capability.to_string()));
    }

    let plan = match capability {
        Capability::OnOff => {
            let on = expect_bool(capability, value)?;
            let action = match (profile.power, on) {
                (PowerControl::Light, true) => BridgeAction::TurnLightOn,
                (PowerControl::Light, false) => BridgeAction::TurnLightOff,
                (PowerControl::Plain, true) => BridgeAction::TurnOn,
                (PowerControl::Plain, false) => BridgeAction::TurnOff,
            };
            WritePlan::new().set(capability, on).send(action)
        }
        Capability::Dim => {
            let brightness = Brightness::from_dim(expect_number(capability, value)?);
            WritePlan::new()
                .set(capability, brightness.as_dim())
                .send(BridgeAction::SetBrightness(brightness))
        }
        Capability::FanSpeed => {
            let speed = expect_number(capability, value)?;
            let step = speed_step(speed, profile.max_speed().unwrap_or(0));
            let plan = WritePlan::new().set(capability, f64::from(step));
            match step {
                0 => plan.send(BridgeAction::TurnOff),
                step => plan
                    .send(BridgeAction::TurnOn)
                    .send(BridgeAction::SetSpeed(step)),
            }
        }
        Capability::FanMode => {
            let text = value.as_str().ok_or(ValueError::WrongType {
                capability: "fan_mode",
                expected: "text",
            })?;
            let mode: FanMode = text.parse()?;
            let plan = WritePlan::new()
                .set(Capability::OnOff, mode != FanMode::Off)
                .set(capability, mode.as_str());
            match mode.speed_argument() {
                None => plan.send(BridgeAction::TurnOff),
                Some(argument) => plan.send(BridgeAction::SetSpeed(argument)),
            }
        }
        Capability::FanDirection => {
            let direction = parse_direction(value)?;
            WritePlan::new()
                .set(capability, direction.to_string())
                .send(BridgeAction::SetDirection(direction))
        }
    };

    Ok(plan)
}

/// Derives capability changes from a polled device state.
///
/// Only fields present in `state` produce changes. Applying the result twice
/// to the same values changes nothing the second time.
///
/// # Examples
///
/// ```
/// use bondfan_lib::{Capability, CapabilityProfile};
/// use bondfan_lib::mapping::reconcile;
/// use bondfan_lib::state::{CapabilityChange, DeviceState};
///
/// let state = DeviceState { speed: Some(50), ..DeviceState::default() };
/// let changes = reconcile(&CapabilityProfile::default(), &state);
///
/// assert_eq!(changes, vec![CapabilityChange::new(Capability::FanMode, "medium")]);
/// ```
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn reconcile(profile: &CapabilityProfile, state: &DeviceState) -> Vec<CapabilityChange> {
    let mut changes = Vec::new();

    match profile.power {
        PowerControl::Light => {
            if let Some(light) = state.light {
                changes.push(CapabilityChange::new(Capability::OnOff, light == 1));
            }
            if profile.dimmer
                && let Some(brightness) = state.brightness
            {
                let level = Brightness::from_raw(brightness).as_dim();
                changes.push(CapabilityChange::new(Capability::Dim, level));
            }
        }
        PowerControl::Plain => {
            if let Some(power) = state.power {
                changes.push(CapabilityChange::new(Capability::OnOff, power == 1));
            }
        }
    }

    if profile.direction
        && let Some(direction) = state.direction
    {
        changes.push(CapabilityChange::new(
            Capability::FanDirection,
            direction.to_string(),
        ));
    }

    if let Some(speed) = state.speed {
        let change = match profile.speed {
            SpeedControl::Continuous { .. } => {
                CapabilityChange::new(Capability::FanSpeed, speed as f64)
            }
            SpeedControl::Discrete => {
                CapabilityChange::new(Capability::FanMode, FanMode::from_speed(speed).as_str())
            }
        };
        changes.push(change);
    }

    changes
}

fn expect_bool(capability: Capability, value: &CapabilityValue) -> Result<bool, ValueError> {
    value.as_bool().ok_or(ValueError::WrongType {
        capability: capability.as_str(),
        expected: "boolean",
    })
}

fn expect_number(capability: Capability, value: &CapabilityValue) -> Result<f64, ValueError> {
    value
        .as_f64()
        .filter(|number| number.is_finite())
        .ok_or(ValueError::WrongType {
            capability: capability.as_str(),
            expected: "number",
        })
}

/// Rounds a requested speed and clamps it to `0..=max_speed`.
///
/// Any positive speed maps to at least step 1, so only `0` and below turn
/// the fan off.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn speed_step(speed: f64, max_speed: u32) -> u32 {
    let rounded = speed.round().max(1.0);
    if speed <= 0.0 {
        0
    } else if rounded >= f64::from(max_speed) {
        max_speed
    } else {
        rounded as u32
    }
}

#[allow(clippy::cast_possible_truncation)]
fn parse_direction(value: &CapabilityValue) -> Result<i64, ValueError> {
    let number = match value {
        CapabilityValue::Number(n) => Some(*n),
        CapabilityValue::Text(text) => text.trim().parse::<f64>().ok(),
        CapabilityValue::Bool(_) => None,
    };

    number
        .filter(|n| n.is_finite())
        .map(|n| n.round() as i64)
        .ok_or_else(|| ValueError::InvalidDirection(value.to_string()))
}
