// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Events published by the device manager.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::capabilities::CapabilityProfile;
use crate::state::{CapabilityChange, CapabilityValues};

use super::DeviceId;

/// Something that happened to a managed device.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum DeviceEvent {
    /// A device was registered and its worker started.
    DeviceAdded {
        /// Manager handle.
        device_id: DeviceId,
        /// Bridge-assigned device id.
        bridge_id: String,
        /// Capability profile derived at registration.
        #[serde(skip)]
        profile: CapabilityProfile,
    },

    /// A device was removed and its worker cancelled.
    DeviceRemoved {
        /// Manager handle.
        device_id: DeviceId,
    },

    /// A poll succeeded and the payload was reconciled.
    ///
    /// Published once per successful poll, even when nothing changed.
    Reconciled {
        /// Manager handle.
        device_id: DeviceId,
        /// Values that actually changed in this cycle.
        changes: Vec<CapabilityChange>,
        /// All values after reconciliation.
        values: CapabilityValues,
        /// When the poll completed.
        at: DateTime<Utc>,
    },

    /// A poll failed with a transient error and will be retried next tick.
    PollSkipped {
        /// Manager handle.
        device_id: DeviceId,
        /// Failure description.
        reason: String,
    },

    /// The token was rejected or a poll failed fatally. Polling stays
    /// stopped until new settings pass validation.
    PollingHalted {
        /// Manager handle.
        device_id: DeviceId,
    },

    /// Validated settings were committed to the device.
    SettingsChanged {
        /// Manager handle.
        device_id: DeviceId,
    },
}

impl DeviceEvent {
    /// Returns the device the event is about.
    #[must_use]
    pub fn device_id(&self) -> DeviceId {
        match self {
            Self::DeviceAdded { device_id, .. }
            | Self::DeviceRemoved { device_id }
            | Self::Reconciled { device_id, .. }
            | Self::PollSkipped { device_id, .. }
            | Self::PollingHalted { device_id }
            | Self::SettingsChanged { device_id } => *device_id,
        }
    }

    /// Returns `true` for added/removed events.
    #[must_use]
    pub fn is_lifecycle(&self) -> bool {
        matches!(self, Self::DeviceAdded { .. } | Self::DeviceRemoved { .. })
    }

    /// Returns `true` for poll outcomes.
    #[must_use]
    pub fn is_poll_outcome(&self) -> bool {
        matches!(
            self,
            Self::Reconciled { .. } | Self::PollSkipped { .. } | Self::PollingHalted { .. }
        )
    }

    /// Returns `true` for [`DeviceEvent::PollingHalted`].
    #[must_use]
    pub fn is_halt(&self) -> bool {
        matches!(self, Self::PollingHalted { .. })
    }
}
