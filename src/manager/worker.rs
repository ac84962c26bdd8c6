// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Per-device worker task.
//!
//! Each device runs one worker that owns its capability values. Poll ticks
//! and commands from the manager are handled by a single `select!` loop, so
//! polls never overlap and writes are serialized with polls.
//!
//! ```text
//!            tick                  Ok
//!   Idle ─────────▶ Polling ─────────────▶ Reconciled
//!                      │  Unreachable / HTTP error
//!                      ├──────────────────▶ Skipped     (next tick retries)
//!                      │  401 / other fatal error
//!                      └──────────────────▶ Halted      (until new settings)
//! ```

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::time::{Interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::capabilities::{Capability, CapabilityProfile};
use crate::config::BridgeSettings;
use crate::error::{Error, ProtocolError, Result};
use crate::event::{DeviceEvent, DeviceId, EventBus};
use crate::mapping::{plan_write, reconcile};
use crate::protocol::{BridgeApi, Transport};
use crate::state::{CapabilityValue, CapabilityValues};
use crate::subscription::CallbackRegistry;

use super::managed_device::PollState;

/// Depth of a worker's command queue.
pub(crate) const COMMAND_QUEUE_DEPTH: usize = 32;

/// A request from the manager to a worker.
pub(crate) enum Command {
    Write {
        capability: Capability,
        value: CapabilityValue,
        reply: oneshot::Sender<Result<()>>,
    },
    Refresh {
        reply: oneshot::Sender<PollState>,
    },
    UpdateSettings {
        settings: BridgeSettings,
        reply: oneshot::Sender<()>,
    },
}

pub(crate) struct Worker<T> {
    pub device_id: DeviceId,
    pub bridge_id: String,
    pub settings: BridgeSettings,
    pub profile: CapabilityProfile,
    pub api: BridgeApi<T>,
    pub values: watch::Sender<CapabilityValues>,
    pub poll_state: watch::Sender<PollState>,
    pub events: EventBus,
    pub callbacks: Arc<CallbackRegistry>,
    pub cancel: CancellationToken,
    pub halted: bool,
}

impl<T: Transport + 'static> Worker<T> {
    /// Runs until cancelled or until the manager drops the command sender.
    pub async fn run(mut self, mut commands: mpsc::Receiver<Command>, interval: Duration) {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        tracing::debug!(device_id = %self.device_id, bridge_id = %self.bridge_id, "Device worker started");

        let cancel = self.cancel.clone();
        loop {
            tokio::select! {
                biased;
                () = cancel.cancelled() => break,
                command = commands.recv() => match command {
                    Some(command) => self.handle(command, &mut ticker).await,
                    None => break,
                },
                _ = ticker.tick(), if !self.halted => {
                    self.poll().await;
                }
            }
        }

        tracing::debug!(device_id = %self.device_id, "Device worker stopped");
    }

    async fn handle(&mut self, command: Command, ticker: &mut Interval) {
        match command {
            Command::Write {
                capability,
                value,
                reply,
            } => {
                let result = self.write(capability, value).await;
                let _ = reply.send(result);
            }
            Command::Refresh { reply } => {
                let state = if self.halted {
                    PollState::Halted
                } else {
                    self.poll().await
                };
                let _ = reply.send(state);
            }
            Command::UpdateSettings { settings, reply } => {
                self.settings = settings;
                if self.halted {
                    tracing::info!(device_id = %self.device_id, "Polling resumed with new settings");
                    self.halted = false;
                    self.poll_state.send_replace(PollState::Idle);
                    ticker.reset_immediately();
                }
                self.events.publish(DeviceEvent::SettingsChanged {
                    device_id: self.device_id,
                });
                let _ = reply.send(());
            }
        }
    }

    /// Applies a capability write: optimistic local values, then the actions
    /// in order, stopping at the first failure.
    ///
    /// A halted worker holds a rejected token and sends nothing.
    async fn write(&mut self, capability: Capability, value: CapabilityValue) -> Result<()> {
        if self.halted {
            tracing::debug!(device_id = %self.device_id, capability = %capability, "Write refused while halted");
            return Err(Error::Protocol(ProtocolError::Unauthorized));
        }

        let plan = plan_write(&self.profile, capability, &value)?;

        self.values
            .send_if_modified(|values| !values.apply_all(&plan.local).is_empty());

        for action in plan.actions {
            if let Err(e) = self
                .api
                .send_action(&self.settings, &self.bridge_id, action)
                .await
            {
                tracing::warn!(
                    device_id = %self.device_id,
                    capability = %capability,
                    %action,
                    error = %e,
                    "Bridge action failed"
                );
                if matches!(e, ProtocolError::Unauthorized) {
                    self.halt(&e);
                }
                return Err(Error::Protocol(e));
            }
        }

        Ok(())
    }

    /// Runs one poll cycle and returns its outcome.
    async fn poll(&mut self) -> PollState {
        self.poll_state.send_replace(PollState::Polling);

        let result = self.api.device_state(&self.settings, &self.bridge_id).await;

        // Teardown may have happened while the request was in flight.
        if self.cancel.is_cancelled() {
            return self.poll_state.borrow().clone();
        }

        let outcome = match result {
            Ok(state) => {
                let changes = reconcile(&self.profile, &state);
                let mut applied = Vec::new();
                self.values.send_if_modified(|values| {
                    applied = values.apply_all(&changes);
                    !applied.is_empty()
                });
                let values = self.values.borrow().clone();
                let at = Utc::now();

                tracing::debug!(device_id = %self.device_id, changed = applied.len(), "Poll reconciled");

                self.callbacks.dispatch_reconciled(&values, &applied);
                self.events.publish(DeviceEvent::Reconciled {
                    device_id: self.device_id,
                    changes: applied,
                    values,
                    at,
                });
                PollState::Reconciled { at }
            }
            Err(e) if e.is_transient() => {
                tracing::warn!(device_id = %self.device_id, error = %e, "Poll skipped");
                let reason = e.to_string();
                self.events.publish(DeviceEvent::PollSkipped {
                    device_id: self.device_id,
                    reason: reason.clone(),
                });
                PollState::Skipped { reason }
            }
            Err(e) => {
                self.halt(&e);
                PollState::Halted
            }
        };

        self.poll_state.send_replace(outcome.clone());
        outcome
    }

    fn halt(&mut self, cause: &ProtocolError) {
        if self.halted {
            return;
        }
        tracing::error!(
            device_id = %self.device_id,
            bridge_id = %self.bridge_id,
            error = %cause,
            "Polling halted until settings change"
        );
        self.halted = true;
        self.poll_state.send_replace(PollState::Halted);
        self.callbacks.dispatch_halted();
        self.events.publish(DeviceEvent::PollingHalted {
            device_id: self.device_id,
        });
    }
}
