// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Credential and connectivity validation.
//!
//! [`validate`] gates pairing and every settings change. It stops at the
//! first failing step:
//!
//! 1. address syntax, then token syntax (no network)
//! 2. `GET /v2/sys/version` without the token
//! 3. `GET /v2/devices`, then the detail of the first listed device
//!
//! A rejected token maps to [`ValidationOutcome::InvalidToken`]; any other
//! request failure maps to [`ValidationOutcome::Unreachable`].

use serde_json::Value;

use crate::config::BridgeSettings;
use crate::error::{ProtocolError, Result};
use crate::protocol::{BridgeApi, Transport};

/// Result of validating bridge settings.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationOutcome {
    /// The bridge accepted the token. Carries the detail payload of the
    /// first listed device, with its `id` injected.
    Valid(Value),
    /// The address is not a dotted IPv4 address.
    InvalidAddress,
    /// The token is empty or was rejected by the bridge.
    InvalidToken,
    /// The bridge could not be reached or listed no devices.
    Unreachable,
}

impl ValidationOutcome {
    /// Returns `true` for [`ValidationOutcome::Valid`].
    #[must_use]
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid(_))
    }

    /// Returns the message shown to the user during pairing.
    #[must_use]
    pub const fn message(&self) -> &'static str {
        match self {
            Self::Valid(_) => "Valid Token :-)",
            Self::Unreachable => "Device could not be contacted !?",
            Self::InvalidToken => "Token Invalid !!",
            Self::InvalidAddress => "IP Address Invalid !?",
        }
    }

    fn from_error(error: &ProtocolError) -> Self {
        match error {
            ProtocolError::InvalidAddress(_) => Self::InvalidAddress,
            ProtocolError::InvalidToken | ProtocolError::Unauthorized => Self::InvalidToken,
            _ => Self::Unreachable,
        }
    }
}

/// Validates bridge settings against the bridge.
///
/// # Examples
///
/// ```no_run
/// use bondfan_lib::BridgeSettings;
/// use bondfan_lib::protocol::{BridgeApi, HttpClient};
/// use bondfan_lib::validation::validate;
///
/// # async fn example() -> bondfan_lib::Result<()> {
/// let api = BridgeApi::new(HttpClient::new()?);
/// let outcome = validate(&api, &BridgeSettings::new("192.168.1.20", "f3a1c0de")).await;
/// println!("{}", outcome.message());
/// # Ok(())
/// # }
/// ```
pub async fn validate<T: Transport>(api: &BridgeApi<T>, settings: &BridgeSettings) -> ValidationOutcome {
    if let Err(e) = settings.validate_syntax() {
        return ValidationOutcome::from_error(&e);
    }

    match api.firmware(settings).await {
        Ok(firmware) => {
            tracing::debug!(address = %settings.address, fw_ver = ?firmware.fw_ver, "Bridge firmware");
        }
        Err(ProtocolError::Unauthorized) => return ValidationOutcome::InvalidToken,
        Err(e) => {
            tracing::warn!(address = %settings.address, error = %e, "Firmware check failed");
            return ValidationOutcome::Unreachable;
        }
    }

    let ids = match api.list_devices(settings).await {
        Ok(ids) => ids,
        Err(e) => {
            tracing::warn!(address = %settings.address, error = %e, "Device listing failed");
            return ValidationOutcome::from_error(&e);
        }
    };

    let Some(first) = ids.first() else {
        tracing::warn!(address = %settings.address, "Bridge lists no devices");
        return ValidationOutcome::Unreachable;
    };

    match api.device_detail(settings, first).await {
        Ok(detail) => ValidationOutcome::Valid(detail),
        Err(e) => {
            tracing::warn!(address = %settings.address, bridge_id = %first, error = %e, "Device detail failed");
            ValidationOutcome::from_error(&e)
        }
    }
}

/// A device accepted during pairing.
#[derive(Debug, Clone, PartialEq)]
pub struct PairedDevice {
    /// Bridge-assigned device id.
    pub bridge_id: String,
    /// Display name reported by the bridge, or the id if none.
    pub name: String,
    /// Raw detail payload.
    pub detail: Value,
}

/// A device offered in the pairing list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairingCandidate {
    /// Bridge-assigned device id.
    pub id: String,
    /// Display name reported by the bridge, or the id if none.
    pub name: String,
}

/// Validates the settings and returns the first listed device.
///
/// # Errors
///
/// Returns the [`ValidationOutcome`] that stopped pairing.
pub async fn pair<T: Transport>(
    api: &BridgeApi<T>,
    settings: &BridgeSettings,
) -> std::result::Result<PairedDevice, ValidationOutcome> {
    match validate(api, settings).await {
        ValidationOutcome::Valid(detail) => {
            let bridge_id = detail
                .get("id")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();
            let name = display_name(&detail, &bridge_id);
            tracing::info!(bridge_id = %bridge_id, name = %name, "Paired device");
            Ok(PairedDevice {
                bridge_id,
                name,
                detail,
            })
        }
        outcome => Err(outcome),
    }
}

/// Lists the ids of the devices known to the bridge.
///
/// # Errors
///
/// Returns `Error::Protocol` if the settings are malformed or the request fails.
pub async fn list_devices<T: Transport>(api: &BridgeApi<T>, settings: &BridgeSettings) -> Result<Vec<String>> {
    Ok(api.list_devices(settings).await?)
}

/// Fetches the name of every device listed by the bridge.
///
/// # Errors
///
/// Returns `Error::Protocol` if the listing or any detail request fails.
pub async fn discover_devices<T: Transport>(
    api: &BridgeApi<T>,
    settings: &BridgeSettings,
) -> Result<Vec<PairingCandidate>> {
    let ids = api.list_devices(settings).await?;
    let mut candidates = Vec::with_capacity(ids.len());

    for id in ids {
        let detail = api.device_detail(settings, &id).await?;
        let name = display_name(&detail, &id);
        candidates.push(PairingCandidate { id, name });
    }

    Ok(candidates)
}

fn display_name(detail: &Value, fallback: &str) -> String {
    detail
        .get("name")
        .and_then(Value::as_str)
        .filter(|name| !name.is_empty())
        .unwrap_or(fallback)
        .to_string()
}
