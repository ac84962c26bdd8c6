// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Bridge action definitions.
//!
//! An action is sent as `PUT /v2/devices/{id}/actions/{name}` with a JSON
//! body that is either empty or carries a single `argument`.
//!
//! | Action | Argument | Effect |
//! |--------|----------|--------|
//! | [`TurnOn`](BridgeAction::TurnOn) | - | fan motor on |
//! | [`TurnOff`](BridgeAction::TurnOff) | - | fan motor off |
//! | [`TurnLightOn`](BridgeAction::TurnLightOn) | - | light on |
//! | [`TurnLightOff`](BridgeAction::TurnLightOff) | - | light off |
//! | [`SetBrightness`](BridgeAction::SetBrightness) | 0-100 | light level |
//! | [`SetSpeed`](BridgeAction::SetSpeed) | speed | fan speed |
//! | [`SetDirection`](BridgeAction::SetDirection) | direction | rotation |
//!
//! # Examples
//!
//! ```
//! use bondfan_lib::action::BridgeAction;
//! use bondfan_lib::types::Brightness;
//!
//! let action = BridgeAction::SetBrightness(Brightness::clamped(75));
//! assert_eq!(action.name(), "SetBrightness");
//! assert_eq!(action.body(), serde_json::json!({ "argument": 75 }));
//!
//! assert_eq!(BridgeAction::TurnOn.body(), serde_json::json!({}));
//! ```

use std::fmt;

use serde_json::{Value, json};

use crate::types::Brightness;

/// A single action understood by the bridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BridgeAction {
    /// Turns the fan motor on.
    TurnOn,
    /// Turns the fan motor off.
    TurnOff,
    /// Turns the light on.
    TurnLightOn,
    /// Turns the light off.
    TurnLightOff,
    /// Sets the light brightness.
    SetBrightness(Brightness),
    /// Sets the fan speed.
    SetSpeed(u32),
    /// Sets the rotation direction.
    SetDirection(i64),
}

impl BridgeAction {
    /// Returns the action name used in the request path.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::TurnOn => "TurnOn",
            Self::TurnOff => "TurnOff",
            Self::TurnLightOn => "TurnLightOn",
            Self::TurnLightOff => "TurnLightOff",
            Self::SetBrightness(_) => "SetBrightness",
            Self::SetSpeed(_) => "SetSpeed",
            Self::SetDirection(_) => "SetDirection",
        }
    }

    /// Returns the action argument, if any.
    #[must_use]
    pub fn argument(&self) -> Option<i64> {
        match self {
            Self::TurnOn | Self::TurnOff | Self::TurnLightOn | Self::TurnLightOff => None,
            Self::SetBrightness(level) => Some(i64::from(level.value())),
            Self::SetSpeed(speed) => Some(i64::from(*speed)),
            Self::SetDirection(direction) => Some(*direction),
        }
    }

    /// Returns the JSON request body for this action.
    #[must_use]
    pub fn body(&self) -> Value {
        match self.argument() {
            Some(argument) => json!({ "argument": argument }),
            None => json!({}),
        }
    }
}

impl fmt::Display for BridgeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.argument() {
            Some(argument) => write!(f, "{}({argument})", self.name()),
            None => f.write_str(self.name()),
        }
    }
}
