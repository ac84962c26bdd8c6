// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Brightness type for dimmable fan lights.
//!
//! The bridge speaks whole percentages (0-100) while the `dim` capability
//! is a fraction between 0.0 and 1.0. [`Brightness`] converts between the two.

use std::fmt;

use crate::error::ValueError;

/// Light brightness as a whole percentage (0-100).
///
/// # Examples
///
/// ```
/// use bondfan_lib::types::Brightness;
///
/// let level = Brightness::from_dim(0.42);
/// assert_eq!(level.value(), 42);
/// assert!((level.as_dim() - 0.42).abs() < f64::EPSILON);
///
/// // Out-of-range dim values clamp instead of failing
/// assert_eq!(Brightness::from_dim(1.7), Brightness::MAX);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Brightness(u8);

impl Brightness {
    /// Minimum brightness (0%).
    pub const MIN: Self = Self(0);

    /// Maximum brightness (100%).
    pub const MAX: Self = Self(100);

    /// Creates a brightness value.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::OutOfRange` if value exceeds 100.
    pub fn new(value: u8) -> Result<Self, ValueError> {
        if value > 100 {
            return Err(ValueError::OutOfRange {
                min: 0.0,
                max: 100.0,
                actual: f64::from(value),
            });
        }
        Ok(Self(value))
    }

    /// Creates a brightness value, clamping to the valid range.
    #[must_use]
    pub const fn clamped(value: u8) -> Self {
        if value > 100 { Self(100) } else { Self(value) }
    }

    /// Converts a `dim` fraction to a percentage.
    ///
    /// The fraction is scaled by 100, rounded to the nearest whole number
    /// and clamped to [0, 100]. `NaN` maps to 0.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn from_dim(fraction: f64) -> Self {
        if fraction.is_nan() {
            return Self::MIN;
        }
        // Safe: clamped to [0, 100] before the cast
        Self((fraction * 100.0).round().clamp(0.0, 100.0) as u8)
    }

    /// Converts a raw bridge reading to a brightness, clamping out-of-range values.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn from_raw(raw: i64) -> Self {
        Self(raw.clamp(0, 100) as u8)
    }

    /// Returns the percentage value.
    #[must_use]
    pub const fn value(&self) -> u8 {
        self.0
    }

    /// Returns the value as a `dim` fraction between 0.0 and 1.0.
    #[must_use]
    pub fn as_dim(&self) -> f64 {
        f64::from(self.0) / 100.0
    }
}

impl fmt::Display for Brightness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

impl TryFrom<u8> for Brightness {
    type Error = ValueError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn brightness_valid_values() {
        for v in 0..=100 {
            assert_eq!(Brightness::new(v).unwrap().value(), v);
        }
        assert!(Brightness::new(101).is_err());
    }

    #[test]
    fn from_dim_rounds_to_nearest() {
        assert_eq!(Brightness::from_dim(0.42).value(), 42);
        assert_eq!(Brightness::from_dim(0.75).value(), 75);
        assert_eq!(Brightness::from_dim(0.004).value(), 0);
        assert_eq!(Brightness::from_dim(0.005).value(), 1);
        assert_eq!(Brightness::from_dim(0.999).value(), 100);
    }

    #[test]
    fn from_dim_clamps() {
        assert_eq!(Brightness::from_dim(-0.5), Brightness::MIN);
        assert_eq!(Brightness::from_dim(2.0), Brightness::MAX);
        assert_eq!(Brightness::from_dim(f64::NAN), Brightness::MIN);
    }

    #[test]
    fn integer_percentages_round_trip() {
        for v in 0..=100 {
            let level = Brightness::new(v).unwrap();
            assert_eq!(Brightness::from_dim(level.as_dim()), level);
        }
    }

    #[test]
    fn from_raw_clamps() {
        assert_eq!(Brightness::from_raw(-3), Brightness::MIN);
        assert_eq!(Brightness::from_raw(42).value(), 42);
        assert_eq!(Brightness::from_raw(250), Brightness::MAX);
    }

    #[test]
    fn brightness_display() {
        assert_eq!(Brightness::new(75).unwrap().to_string(), "75%");
    }
}
