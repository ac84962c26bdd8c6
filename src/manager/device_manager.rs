// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device manager for bridge-attached fans.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{RwLock, broadcast, mpsc, oneshot, watch};
use tokio_util::sync::CancellationToken;

use crate::capabilities::{Capability, CapabilityProfile, DeviceProperties};
use crate::config::{BridgeSettings, PollingConfig, SettingsStore};
use crate::error::{Error, Result};
use crate::event::{DeviceEvent, DeviceId, EventBus};
use crate::protocol::{BridgeApi, HttpClient, Transport};
use crate::state::{CapabilityChange, CapabilityValue, CapabilityValues};
use crate::subscription::{CallbackRegistry, SubscriptionId};
use crate::validation::{ValidationOutcome, validate};

use super::device_config::{DeviceConfig, DeviceIdentity};
use super::managed_device::{ManagedDevice, PollState};
use super::worker::{COMMAND_QUEUE_DEPTH, Command, Worker};

/// Manager for fans and lights behind one or more bridges.
///
/// Every added device gets its own worker task that polls the bridge and
/// serializes capability writes. The manager itself only routes requests
/// to workers and keeps the handles.
///
/// # Examples
///
/// ```no_run
/// use bondfan_lib::{BridgeSettings, DeviceManager};
///
/// #[tokio::main]
/// async fn main() -> bondfan_lib::Result<()> {
///     let manager = DeviceManager::http()?;
///
///     let mut events = manager.subscribe();
///     tokio::spawn(async move {
///         while let Ok(event) = events.recv().await {
///             println!("{event:?}");
///         }
///     });
///
///     let fan = manager
///         .add_device("a1b2c3", BridgeSettings::new("192.168.1.20", "f3a1c0de"))
///         .await?;
///
///     manager.write_capability(fan, "fan_mode", "medium").await?;
///     println!("{:?}", manager.capability_values(fan).await);
///     Ok(())
/// }
/// ```
pub struct DeviceManager<T: Transport + 'static = HttpClient> {
    api: BridgeApi<T>,
    devices: Arc<RwLock<HashMap<DeviceId, ManagedDevice>>>,
    event_bus: EventBus,
    polling: PollingConfig,
    settings_store: Option<Arc<dyn SettingsStore>>,
}

impl DeviceManager<HttpClient> {
    /// Creates a manager using the default HTTP transport.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be created.
    pub fn http() -> Result<Self> {
        Ok(Self::new(HttpClient::new()?))
    }
}

impl<T: Transport + 'static> DeviceManager<T> {
    /// Creates a manager on top of a transport.
    #[must_use]
    pub fn new(transport: T) -> Self {
        let polling = PollingConfig::default();
        Self {
            api: BridgeApi::new(transport),
            devices: Arc::new(RwLock::new(HashMap::new())),
            event_bus: EventBus::with_capacity(polling.event_capacity()),
            polling,
            settings_store: None,
        }
    }

    /// Sets the polling configuration. Applies to devices added afterwards.
    #[must_use]
    pub fn with_polling_config(mut self, polling: PollingConfig) -> Self {
        self.event_bus = EventBus::with_capacity(polling.event_capacity());
        self.polling = polling;
        self
    }

    /// Persists validated settings to `store`.
    #[must_use]
    pub fn with_settings_store(mut self, store: Arc<dyn SettingsStore>) -> Self {
        self.settings_store = Some(store);
        self
    }

    /// Returns the typed bridge API used by this manager.
    #[must_use]
    pub fn api(&self) -> &BridgeApi<T> {
        &self.api
    }

    // =========================================================================
    // Events
    // =========================================================================

    /// Subscribes to events of every managed device.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<DeviceEvent> {
        self.event_bus.subscribe()
    }

    /// Returns the number of active event subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.event_bus.subscriber_count()
    }

    // =========================================================================
    // Device lifecycle
    // =========================================================================

    /// Adds a device and starts polling it.
    ///
    /// # Errors
    ///
    /// See [`add`](Self::add).
    pub async fn add_device(
        &self,
        bridge_id: impl Into<String>,
        settings: BridgeSettings,
    ) -> Result<DeviceId> {
        self.add(DeviceConfig::new(bridge_id, settings)).await
    }

    /// Adds a device using the settings saved for it in the settings store.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DeviceNotFound`] if no store is configured or it has
    /// no settings for `bridge_id`, otherwise see [`add`](Self::add).
    pub async fn add_stored_device(&self, bridge_id: &str) -> Result<DeviceId> {
        let settings = match &self.settings_store {
            Some(store) => store.load(bridge_id)?,
            None => None,
        }
        .ok_or(Error::DeviceNotFound)?;

        self.add(DeviceConfig::new(bridge_id, settings)).await
    }

    /// Adds a device from a full configuration and starts polling it.
    ///
    /// The feature flags are fetched once unless the configuration carries
    /// them. Settings are saved to the store only after a successful fetch.
    ///
    /// # Errors
    ///
    /// Returns `Error::Protocol` if the settings are malformed or the
    /// properties request fails (the host retries initialization later), or
    /// `Error::Config` if saving the settings fails.
    pub async fn add(&self, config: DeviceConfig) -> Result<DeviceId> {
        let DeviceConfig {
            identity,
            name,
            properties,
        } = config;
        identity.settings.validate_syntax()?;

        // A successful properties fetch also confirms the token.
        let (properties, confirmed) = match properties {
            Some(properties) => (properties, false),
            None => (self.fetch_properties(&identity).await?, true),
        };
        let profile = CapabilityProfile::from_properties(&properties);

        if confirmed && let Some(store) = &self.settings_store {
            store.save(&identity.bridge_id, &identity.settings)?;
        }

        let device_id = DeviceId::new();
        let (device, worker, commands) = self.build_worker(device_id, identity, name, profile);
        let bridge_id = device.identity.bridge_id.clone();

        tracing::info!(
            device_id = %device_id,
            bridge_id = %bridge_id,
            name = %device.name,
            capabilities = ?profile.capabilities(),
            "Device added"
        );

        self.devices.write().await.insert(device_id, device);
        self.event_bus.publish(DeviceEvent::DeviceAdded {
            device_id,
            bridge_id,
            profile,
        });
        tokio::spawn(worker.run(commands, self.polling.interval()));

        Ok(device_id)
    }

    /// Fetches the feature flags. Any failure fails initialization.
    async fn fetch_properties(&self, identity: &DeviceIdentity) -> Result<DeviceProperties> {
        self.api
            .device_properties(&identity.settings, &identity.bridge_id)
            .await
            .map_err(|e| {
                tracing::warn!(
                    bridge_id = %identity.bridge_id,
                    error = %e,
                    "Could not fetch device properties"
                );
                Error::from(e)
            })
    }

    fn build_worker(
        &self,
        device_id: DeviceId,
        identity: DeviceIdentity,
        name: Option<String>,
        profile: CapabilityProfile,
    ) -> (ManagedDevice, Worker<T>, mpsc::Receiver<Command>) {
        let (command_tx, command_rx) = mpsc::channel(COMMAND_QUEUE_DEPTH);
        let (values_tx, values_rx) = watch::channel(CapabilityValues::new());
        let (poll_tx, poll_rx) = watch::channel(PollState::Idle);
        let cancel = CancellationToken::new();
        let callbacks = Arc::new(CallbackRegistry::new());

        let worker = Worker {
            device_id,
            bridge_id: identity.bridge_id.clone(),
            settings: identity.settings.clone(),
            profile,
            api: self.api.clone(),
            values: values_tx,
            poll_state: poll_tx,
            events: self.event_bus.clone(),
            callbacks: Arc::clone(&callbacks),
            cancel: cancel.clone(),
            halted: false,
        };
        let device = ManagedDevice {
            name: name.unwrap_or_else(|| identity.bridge_id.clone()),
            identity,
            profile,
            commands: command_tx,
            cancel,
            values: values_rx,
            poll_state: poll_rx,
            callbacks,
        };

        (device, worker, command_rx)
    }

    /// Removes a device and cancels its worker.
    ///
    /// Returns `true` if the device was found. An in-flight request of the
    /// worker is not awaited.
    pub async fn remove_device(&self, device_id: DeviceId) -> bool {
        let Some(device) = self.devices.write().await.remove(&device_id) else {
            return false;
        };

        device.cancel.cancel();
        tracing::info!(device_id = %device_id, bridge_id = %device.identity.bridge_id, "Device removed");
        self.event_bus
            .publish(DeviceEvent::DeviceRemoved { device_id });
        true
    }

    /// Returns the ids of all managed devices.
    pub async fn device_ids(&self) -> Vec<DeviceId> {
        self.devices.read().await.keys().copied().collect()
    }

    /// Returns the number of managed devices.
    pub async fn device_count(&self) -> usize {
        self.devices.read().await.len()
    }

    /// Returns a device's identity with its current settings.
    pub async fn identity(&self, device_id: DeviceId) -> Option<DeviceIdentity> {
        self.devices
            .read()
            .await
            .get(&device_id)
            .map(|device| device.identity.clone())
    }

    /// Returns a device's display name.
    pub async fn name(&self, device_id: DeviceId) -> Option<String> {
        self.devices
            .read()
            .await
            .get(&device_id)
            .map(|device| device.name.clone())
    }

    /// Returns a device's capability profile.
    pub async fn profile(&self, device_id: DeviceId) -> Option<CapabilityProfile> {
        self.devices
            .read()
            .await
            .get(&device_id)
            .map(|device| device.profile)
    }

    // =========================================================================
    // Capabilities
    // =========================================================================

    /// Writes a capability by name.
    ///
    /// The write is queued behind any running poll of the device. Local
    /// values are updated before the first bridge action is sent.
    ///
    /// # Errors
    ///
    /// Returns `Error::DeviceNotFound`, `Error::Value` for an unknown name or
    /// wrong value kind, `Error::CapabilityNotSupported`, or `Error::Protocol`
    /// for the first failed bridge action. Remaining actions are not sent.
    pub async fn write_capability(
        &self,
        device_id: DeviceId,
        capability: &str,
        value: impl Into<CapabilityValue>,
    ) -> Result<()> {
        let capability: Capability = capability.parse()?;
        self.write(device_id, capability, value.into()).await
    }

    /// Writes a capability.
    ///
    /// # Errors
    ///
    /// See [`write_capability`](Self::write_capability).
    pub async fn write(
        &self,
        device_id: DeviceId,
        capability: Capability,
        value: CapabilityValue,
    ) -> Result<()> {
        let commands = self.commands(device_id).await?;
        let (reply, response) = oneshot::channel();
        commands
            .send(Command::Write {
                capability,
                value,
                reply,
            })
            .await
            .map_err(|_| Error::WorkerStopped)?;
        response.await.map_err(|_| Error::WorkerStopped)?
    }

    /// Reads a capability value by name. `None` if not known yet.
    ///
    /// # Errors
    ///
    /// Returns `Error::DeviceNotFound`, `Error::Value` for an unknown name, or
    /// `Error::CapabilityNotSupported` if the profile does not register it.
    pub async fn read_capability(
        &self,
        device_id: DeviceId,
        capability: &str,
    ) -> Result<Option<CapabilityValue>> {
        let capability: Capability = capability.parse()?;
        let devices = self.devices.read().await;
        let device = devices.get(&device_id).ok_or(Error::DeviceNotFound)?;
        if !device.profile.supports(capability) {
            return Err(Error::CapabilityNotSupported(capability.to_string()));
        }
        Ok(device.values.borrow().get(capability).cloned())
    }

    /// Returns a snapshot of a device's capability values.
    pub async fn capability_values(&self, device_id: DeviceId) -> Option<CapabilityValues> {
        self.devices
            .read()
            .await
            .get(&device_id)
            .map(ManagedDevice::current_values)
    }

    /// Returns a receiver that observes a device's capability values.
    pub async fn watch_device(
        &self,
        device_id: DeviceId,
    ) -> Option<watch::Receiver<CapabilityValues>> {
        self.devices
            .read()
            .await
            .get(&device_id)
            .map(|device| device.values.clone())
    }

    // =========================================================================
    // Polling
    // =========================================================================

    /// Returns the outcome of a device's most recent poll.
    pub async fn poll_state(&self, device_id: DeviceId) -> Option<PollState> {
        self.devices
            .read()
            .await
            .get(&device_id)
            .map(ManagedDevice::current_poll_state)
    }

    /// Runs one poll cycle now and returns its outcome.
    ///
    /// A halted device is not polled and reports [`PollState::Halted`].
    ///
    /// # Errors
    ///
    /// Returns `Error::DeviceNotFound` or `Error::WorkerStopped`.
    pub async fn refresh(&self, device_id: DeviceId) -> Result<PollState> {
        let commands = self.commands(device_id).await?;
        let (reply, response) = oneshot::channel();
        commands
            .send(Command::Refresh { reply })
            .await
            .map_err(|_| Error::WorkerStopped)?;
        response.await.map_err(|_| Error::WorkerStopped)
    }

    /// Validates new settings and, if valid, commits them.
    ///
    /// On success the worker uses the new settings from its next request,
    /// a halted worker resumes polling immediately, and the settings are
    /// saved to the settings store. Otherwise the previous settings stay in
    /// effect. Either way the validation outcome is returned.
    ///
    /// # Errors
    ///
    /// Returns `Error::DeviceNotFound`, `Error::WorkerStopped`, or
    /// `Error::Config` if saving fails (nothing is committed then).
    pub async fn update_settings(
        &self,
        device_id: DeviceId,
        settings: BridgeSettings,
    ) -> Result<ValidationOutcome> {
        let commands = self.commands(device_id).await?;

        let outcome = validate(&self.api, &settings).await;
        if !outcome.is_valid() {
            tracing::warn!(device_id = %device_id, outcome = outcome.message(), "Settings rejected");
            return Ok(outcome);
        }

        let bridge_id = self
            .identity(device_id)
            .await
            .ok_or(Error::DeviceNotFound)?
            .bridge_id;
        if let Some(store) = &self.settings_store {
            store.save(&bridge_id, &settings)?;
        }

        let (reply, response) = oneshot::channel();
        commands
            .send(Command::UpdateSettings {
                settings: settings.clone(),
                reply,
            })
            .await
            .map_err(|_| Error::WorkerStopped)?;
        response.await.map_err(|_| Error::WorkerStopped)?;

        if let Some(device) = self.devices.write().await.get_mut(&device_id) {
            device.identity.settings = settings;
        }

        tracing::info!(device_id = %device_id, bridge_id = %bridge_id, "Settings updated");
        Ok(outcome)
    }

    // =========================================================================
    // Callbacks
    // =========================================================================

    /// Registers a callback run once per successful poll of a device.
    ///
    /// # Errors
    ///
    /// Returns `Error::DeviceNotFound`.
    pub async fn on_reconciled<F>(&self, device_id: DeviceId, callback: F) -> Result<SubscriptionId>
    where
        F: Fn(&CapabilityValues) + Send + Sync + 'static,
    {
        Ok(self.callbacks(device_id).await?.on_reconciled(callback))
    }

    /// Registers a callback run for each value a poll changes.
    ///
    /// # Errors
    ///
    /// Returns `Error::DeviceNotFound`.
    pub async fn on_capability_changed<F>(
        &self,
        device_id: DeviceId,
        callback: F,
    ) -> Result<SubscriptionId>
    where
        F: Fn(&CapabilityChange) + Send + Sync + 'static,
    {
        Ok(self.callbacks(device_id).await?.on_capability_changed(callback))
    }

    /// Registers a callback run when polling of a device halts.
    ///
    /// # Errors
    ///
    /// Returns `Error::DeviceNotFound`.
    pub async fn on_halted<F>(&self, device_id: DeviceId, callback: F) -> Result<SubscriptionId>
    where
        F: Fn() + Send + Sync + 'static,
    {
        Ok(self.callbacks(device_id).await?.on_halted(callback))
    }

    /// Removes a callback. Returns `true` if it was registered.
    ///
    /// # Errors
    ///
    /// Returns `Error::DeviceNotFound`.
    pub async fn unsubscribe(&self, device_id: DeviceId, id: SubscriptionId) -> Result<bool> {
        Ok(self.callbacks(device_id).await?.unsubscribe(id))
    }

    async fn commands(&self, device_id: DeviceId) -> Result<mpsc::Sender<Command>> {
        self.devices
            .read()
            .await
            .get(&device_id)
            .map(|device| device.commands.clone())
            .ok_or(Error::DeviceNotFound)
    }

    async fn callbacks(&self, device_id: DeviceId) -> Result<Arc<CallbackRegistry>> {
        self.devices
            .read()
            .await
            .get(&device_id)
            .map(|device| Arc::clone(&device.callbacks))
            .ok_or(Error::DeviceNotFound)
    }
}

impl<T: Transport + 'static> std::fmt::Debug for DeviceManager<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeviceManager")
            .field("polling", &self.polling)
            .field("subscribers", &self.event_bus.subscriber_count())
            .finish_non_exhaustive()
    }
}
