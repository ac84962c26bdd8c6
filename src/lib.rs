// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `BondFan` Lib - A Rust library to control ceiling fans and lights behind a
//! LAN bridge.
//!
//! The bridge exposes a small JSON/HTTP API on the local network. This
//! library turns each fan into a set of host-facing capabilities and keeps
//! them in sync by polling.
//!
//! # Capabilities
//!
//! | Capability | Value | Registered when |
//! |------------|-------|-----------------|
//! | `onoff` | bool | always (drives the light if the fan has one) |
//! | `dim` | fraction `0.0..=1.0` | light with brightness |
//! | `fan_speed` | number `0..=max_speed` | `max_speed` reported |
//! | `fan_mode` | `off` / `low` / `medium` / `high` | no `max_speed` |
//! | `fan_direction` | `"1"` / `"-1"` | always |
//!
//! # Quick Start
//!
//! ## Pairing
//!
//! ```no_run
//! use bondfan_lib::BridgeSettings;
//! use bondfan_lib::protocol::{BridgeApi, HttpClient};
//! use bondfan_lib::validation::pair;
//!
//! #[tokio::main]
//! async fn main() -> bondfan_lib::Result<()> {
//!     let api = BridgeApi::new(HttpClient::new()?);
//!     let settings = BridgeSettings::new("192.168.1.20", "f3a1c0de");
//!
//!     match pair(&api, &settings).await {
//!         Ok(device) => println!("paired {} ({})", device.name, device.bridge_id),
//!         Err(outcome) => println!("{}", outcome.message()),
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Controlling a Fan
//!
//! ```no_run
//! use bondfan_lib::{BridgeSettings, DeviceManager};
//!
//! #[tokio::main]
//! async fn main() -> bondfan_lib::Result<()> {
//!     let manager = DeviceManager::http()?;
//!     let fan = manager
//!         .add_device("a1b2c3", BridgeSettings::new("192.168.1.20", "f3a1c0de"))
//!         .await?;
//!
//!     manager.write_capability(fan, "onoff", true).await?;
//!     manager.write_capability(fan, "fan_direction", "-1").await?;
//!
//!     println!("{:?}", manager.read_capability(fan, "onoff").await?);
//!     Ok(())
//! }
//! ```

pub mod action;
mod capabilities;
pub mod config;
pub mod error;
pub mod event;
pub mod manager;
pub mod mapping;
pub mod protocol;
pub mod state;
pub mod subscription;
pub mod types;
pub mod validation;

pub use action::BridgeAction;
pub use capabilities::{Capability, CapabilityProfile, DeviceProperties, PowerControl, SpeedControl};
pub use config::{
    BridgeSettings, JsonFileSettingsStore, MemorySettingsStore, PollingConfig, SettingsStore,
};
pub use error::{ConfigError, Error, ProtocolError, Result, ValueError};
pub use event::{DeviceEvent, DeviceId, EventBus};
pub use manager::{DeviceConfig, DeviceIdentity, DeviceManager, PollState};
pub use protocol::{BridgeApi, HttpClient, HttpConfig};
pub use state::{CapabilityChange, CapabilityValue, CapabilityValues};
pub use subscription::SubscriptionId;
pub use types::{Brightness, FanMode};
pub use validation::{PairedDevice, PairingCandidate, ValidationOutcome};
