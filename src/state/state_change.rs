// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Capability change representation.
//!
//! Changes are produced by the write path (optimistic local values) and by
//! reconciliation after a poll, and applied to
//! [`CapabilityValues`](super::CapabilityValues).

use serde::Serialize;

use crate::capabilities::Capability;

use super::CapabilityValue;

/// A new value for one capability.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CapabilityChange {
    /// The capability being changed.
    pub capability: Capability,
    /// The new value.
    pub value: CapabilityValue,
}

impl CapabilityChange {
    /// Creates a change.
    #[must_use]
    pub fn new(capability: Capability, value: impl Into<CapabilityValue>) -> Self {
        Self {
            capability,
            value: value.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_converts_value() {
        let change = CapabilityChange::new(Capability::FanMode, "low");
        assert_eq!(change.capability, Capability::FanMode);
        assert_eq!(change.value, CapabilityValue::Text("low".to_string()));
    }
}
