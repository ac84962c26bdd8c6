// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device manager and per-device polling workers.
//!
//! The [`DeviceManager`] owns one worker task per device. A worker:
//!
//! - polls `GET /v2/devices/{id}/state` on a fixed interval and reconciles
//!   the payload into capability values
//! - applies capability writes from the manager, one at a time, between polls
//! - stops polling when the bridge rejects the token, until
//!   [`DeviceManager::update_settings`] commits validated settings
//!
//! Values are observable through a `watch` channel per device
//! ([`DeviceManager::watch_device`]), per-device callbacks, and the
//! manager-wide event bus ([`DeviceManager::subscribe`]).
//!
//! # Examples
//!
//! ```no_run
//! use bondfan_lib::{BridgeSettings, DeviceManager};
//!
//! # async fn example() -> bondfan_lib::Result<()> {
//! let manager = DeviceManager::http()?;
//! let fan = manager
//!     .add_device("a1b2c3", BridgeSettings::new("192.168.1.20", "f3a1c0de"))
//!     .await?;
//!
//! if let Some(mut values) = manager.watch_device(fan).await {
//!     tokio::spawn(async move {
//!         while values.changed().await.is_ok() {
//!             println!("fan mode: {:?}", values.borrow().fan_mode());
//!         }
//!     });
//! }
//! # Ok(())
//! # }
//! ```

mod device_config;
mod device_manager;
mod managed_device;
mod worker;

pub use device_config::{DeviceConfig, DeviceIdentity};
pub use device_manager::DeviceManager;
pub use managed_device::PollState;
