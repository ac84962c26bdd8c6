// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Fixed three-level fan mode for fans without a continuous speed range.

use std::fmt;
use std::str::FromStr;

use crate::error::ValueError;

/// Fan mode of a fan that only supports a fixed 3-speed scheme.
///
/// # Examples
///
/// ```
/// use bondfan_lib::types::FanMode;
///
/// let mode: FanMode = "medium".parse().unwrap();
/// assert_eq!(mode, FanMode::Medium);
/// assert_eq!(mode.speed_argument(), Some(50));
///
/// // Only 100 and 50 have a dedicated mode, everything else reads as low
/// assert_eq!(FanMode::from_speed(100), FanMode::High);
/// assert_eq!(FanMode::from_speed(37), FanMode::Low);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FanMode {
    /// Fan motor off.
    Off,
    /// Lowest speed.
    Low,
    /// Middle speed.
    Medium,
    /// Highest speed.
    High,
}

impl FanMode {
    /// Returns the capability string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Off => "off",
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }

    /// Returns the `SetSpeed` argument for this mode, or `None` for [`FanMode::Off`].
    #[must_use]
    pub const fn speed_argument(&self) -> Option<u32> {
        match self {
            Self::Off => None,
            Self::Low => Some(1),
            Self::Medium => Some(50),
            Self::High => Some(100),
        }
    }

    /// Quantizes a reported bridge speed to a mode.
    ///
    /// `100` is high and `50` is medium. Every other value, including 0,
    /// collapses to low.
    #[must_use]
    pub const fn from_speed(speed: i64) -> Self {
        match speed {
            100 => Self::High,
            50 => Self::Medium,
            _ => Self::Low,
        }
    }
}

impl fmt::Display for FanMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FanMode {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "off" => Ok(Self::Off),
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            _ => Err(ValueError::InvalidFanMode(s.to_string())),
        }
    }
}
