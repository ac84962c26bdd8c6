// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Value types for fan and light control.
//!
//! These types validate or clamp values at construction so the rest of the
//! library never handles an out-of-range brightness or an unknown fan mode.

mod address;
mod brightness;
mod fan_mode;

pub use address::{check_credentials, is_valid_ipv4};
pub use brightness::Brightness;
pub use fan_mode::FanMode;
