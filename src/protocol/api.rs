// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Typed bridge endpoints.

use std::sync::Arc;

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::action::BridgeAction;
use crate::capabilities::DeviceProperties;
use crate::config::BridgeSettings;
use crate::error::ProtocolError;
use crate::protocol::{BridgeRequest, Transport};
use crate::state::DeviceState;
use crate::types::check_credentials;

/// Keys in the device listing that are bridge bookkeeping, not devices.
const LISTING_MARKER_KEYS: [&str; 2] = ["_", "__"];

/// Firmware information from `GET /v2/sys/version`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct FirmwareInfo {
    /// Firmware version string.
    #[serde(default)]
    pub fw_ver: Option<String>,
    /// Remaining fields of the payload.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Typed access to the bridge API.
///
/// Every call checks the address and token syntax first and fails with
/// [`ProtocolError::InvalidAddress`] or [`ProtocolError::InvalidToken`]
/// without touching the network.
#[derive(Debug)]
pub struct BridgeApi<T> {
    transport: Arc<T>,
}

impl<T> Clone for BridgeApi<T> {
    fn clone(&self) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
        }
    }
}

impl<T: Transport> BridgeApi<T> {
    /// Wraps a transport.
    #[must_use]
    pub fn new(transport: T) -> Self {
        Self {
            transport: Arc::new(transport),
        }
    }

    /// Wraps a shared transport.
    #[must_use]
    pub fn from_shared(transport: Arc<T>) -> Self {
        Self { transport }
    }

    /// Returns the underlying transport.
    #[must_use]
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Sends a raw request after checking the credentials.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError` on invalid credentials or a failed request.
    pub async fn request(
        &self,
        settings: &BridgeSettings,
        request: &BridgeRequest,
    ) -> Result<Value, ProtocolError> {
        check_credentials(&settings.address, &settings.token)?;
        self.transport.send(settings, request).await
    }

    /// Fetches the bridge firmware version. Sent without the token.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError` if the request fails or the payload is not an object.
    pub async fn firmware(&self, settings: &BridgeSettings) -> Result<FirmwareInfo, ProtocolError> {
        let payload = self
            .request(settings, &BridgeRequest::get("/v2/sys/version").without_token())
            .await?;

        serde_json::from_value(payload)
            .map_err(|e| ProtocolError::Unreachable(format!("unexpected firmware payload: {e}")))
    }

    /// Lists the identifiers of the devices known to the bridge.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError` if the request fails.
    pub async fn list_devices(&self, settings: &BridgeSettings) -> Result<Vec<String>, ProtocolError> {
        let payload = self
            .request(settings, &BridgeRequest::get("/v2/devices"))
            .await?;

        Ok(device_ids(&payload))
    }

    /// Fetches a device's detail payload, with its `id` injected.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError` if the request fails.
    pub async fn device_detail(
        &self,
        settings: &BridgeSettings,
        device_id: &str,
    ) -> Result<Value, ProtocolError> {
        let mut payload = self
            .request(settings, &BridgeRequest::get(device_path(device_id, "")))
            .await?;

        if let Value::Object(map) = &mut payload {
            map.insert("id".to_string(), Value::String(device_id.to_string()));
        }
        Ok(payload)
    }

    /// Fetches a device's static feature flags.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError` if the request fails.
    pub async fn device_properties(
        &self,
        settings: &BridgeSettings,
        device_id: &str,
    ) -> Result<DeviceProperties, ProtocolError> {
        let payload = self
            .request(
                settings,
                &BridgeRequest::get(device_path(device_id, "/properties")),
            )
            .await?;

        Ok(DeviceProperties::from_json(&payload))
    }

    /// Fetches a device's current raw state.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError` if the request fails.
    pub async fn device_state(
        &self,
        settings: &BridgeSettings,
        device_id: &str,
    ) -> Result<DeviceState, ProtocolError> {
        let payload = self
            .request(settings, &BridgeRequest::get(device_path(device_id, "/state")))
            .await?;

        Ok(DeviceState::from_json(&payload))
    }

    /// Sends an action to a device.
    ///
    /// Returns the bridge's echo of the applied arguments.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError` if the request fails.
    pub async fn send_action(
        &self,
        settings: &BridgeSettings,
        device_id: &str,
        action: BridgeAction,
    ) -> Result<Value, ProtocolError> {
        let path = device_path(
            device_id,
            &format!("/actions/{}", urlencoding::encode(action.name())),
        );

        tracing::debug!(device = %device_id, %action, "Sending bridge action");

        self.request(settings, &BridgeRequest::put(path, action.body()))
            .await
    }
}

fn device_path(device_id: &str, suffix: &str) -> String {
    format!("/v2/devices/{}{suffix}", urlencoding::encode(device_id))
}

/// Returns the listed device ids in sorted order.
fn device_ids(listing: &Value) -> Vec<String> {
    let mut ids: Vec<String> = listing
        .as_object()
        .map(|map| {
            map.keys()
                .filter(|key| !LISTING_MARKER_KEYS.contains(&key.as_str()))
                .cloned()
                .collect()
        })
        .unwrap_or_default();
    ids.sort_unstable();
    ids
}
