// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The manager's handle on one running device worker.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;

use crate::capabilities::CapabilityProfile;
use crate::state::CapabilityValues;
use crate::subscription::CallbackRegistry;

use super::device_config::DeviceIdentity;
use super::worker::Command;

/// Outcome of the most recent poll cycle of a device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollState {
    /// No poll has run yet.
    Idle,
    /// A poll request is in flight.
    Polling,
    /// The last poll succeeded and was reconciled.
    Reconciled {
        /// When the poll completed.
        at: DateTime<Utc>,
    },
    /// The last poll failed transiently; the next tick retries.
    Skipped {
        /// Failure description.
        reason: String,
    },
    /// The token was rejected or a poll failed fatally; polling is stopped.
    Halted,
}

impl PollState {
    /// Returns `true` if polling is stopped.
    #[must_use]
    pub fn is_halted(&self) -> bool {
        matches!(self, Self::Halted)
    }

    /// Returns `true` if the last poll succeeded.
    #[must_use]
    pub fn is_reconciled(&self) -> bool {
        matches!(self, Self::Reconciled { .. })
    }
}

/// Manager-side view of a device. Dropping it stops the worker.
pub(crate) struct ManagedDevice {
    pub identity: DeviceIdentity,
    pub name: String,
    pub profile: CapabilityProfile,
    pub commands: mpsc::Sender<Command>,
    pub cancel: CancellationToken,
    pub values: watch::Receiver<CapabilityValues>,
    pub poll_state: watch::Receiver<PollState>,
    pub callbacks: Arc<CallbackRegistry>,
}

impl ManagedDevice {
    pub fn current_values(&self) -> CapabilityValues {
        self.values.borrow().clone()
    }

    pub fn current_poll_state(&self) -> PollState {
        self.poll_state.borrow().clone()
    }
}

impl Drop for ManagedDevice {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
