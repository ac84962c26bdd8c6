// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device events.
//!
//! The device manager publishes a [`DeviceEvent`] for every lifecycle change
//! and every poll outcome on an [`EventBus`]. Any number of subscribers can
//! listen; a subscriber that falls behind loses the oldest events.
//!
//! # Examples
//!
//! ```
//! use bondfan_lib::event::{DeviceEvent, DeviceId, EventBus};
//!
//! let bus = EventBus::new();
//! let mut rx = bus.subscribe();
//!
//! bus.publish(DeviceEvent::PollingHalted { device_id: DeviceId::new() });
//! assert!(rx.try_recv().unwrap().is_halt());
//! ```

mod device_event;
mod device_id;
mod event_bus;

pub use device_event::DeviceEvent;
pub use device_id::DeviceId;
pub use event_bus::EventBus;
