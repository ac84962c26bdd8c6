// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device state types.
//!
//! [`DeviceState`] is the raw payload polled from the bridge.
//! [`CapabilityValues`] is what the host sees, and [`CapabilityChange`]
//! is the unit by which it is updated.
//!
//! # Examples
//!
//! ```
//! use bondfan_lib::Capability;
//! use bondfan_lib::state::{CapabilityChange, CapabilityValues};
//!
//! let mut values = CapabilityValues::new();
//! values.apply(&CapabilityChange::new(Capability::FanMode, "medium"));
//!
//! assert_eq!(values.fan_mode(), Some("medium"));
//! ```

mod capability_values;
mod device_state;
mod state_change;

pub use capability_values::{CapabilityValue, CapabilityValues};
pub use device_state::DeviceState;
pub use state_change::CapabilityChange;
