// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Per-device callbacks for poll outcomes.
//!
//! Callbacks are the synchronous counterpart of the event bus: they are
//! registered on one device through the device manager and run on that
//! device's worker task right after a poll cycle.
//!
//! ```no_run
//! use bondfan_lib::{BridgeSettings, DeviceManager};
//!
//! # async fn example() -> bondfan_lib::Result<()> {
//! let manager = DeviceManager::http()?;
//! let id = manager
//!     .add_device("a1b2c3", BridgeSettings::new("192.168.1.20", "f3a1c0de"))
//!     .await?;
//!
//! let sub = manager
//!     .on_reconciled(id, |values| {
//!         println!("onoff is now {:?}", values.onoff());
//!     })
//!     .await?;
//!
//! manager.unsubscribe(id, sub).await?;
//! # Ok(())
//! # }
//! ```

mod callback;

pub use callback::{CallbackRegistry, SubscriptionId};
