// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the `BondFan` library.
//!
//! This module provides the error hierarchy for the library: value
//! validation, bridge communication and settings storage.
//!
//! The [`ProtocolError`] variants follow the bridge status taxonomy:
//!
//! | Variant | Origin | Handling |
//! |---------|--------|----------|
//! | [`InvalidAddress`](ProtocolError::InvalidAddress) | local syntax check | rejected before any request |
//! | [`InvalidToken`](ProtocolError::InvalidToken) | local syntax check | rejected before any request |
//! | [`Unauthorized`](ProtocolError::Unauthorized) | HTTP 401 | fatal for the device session |
//! | [`Unreachable`](ProtocolError::Unreachable) | network, timeout, bad JSON | transient |
//! | [`ClientError`](ProtocolError::ClientError) | any other non-200 | transient |

use thiserror::Error;

/// The main error type for this library.
#[derive(Debug, Error)]
pub enum Error {
    /// Error occurred during value validation.
    #[error("value error: {0}")]
    Value(#[from] ValueError),

    /// Error occurred while talking to the bridge.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// Error occurred while loading or saving settings.
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// Device was not found in the manager.
    #[error("device not found")]
    DeviceNotFound,

    /// The device profile does not register the requested capability.
    #[error("device does not support capability {0}")]
    CapabilityNotSupported(String),

    /// The device worker task is no longer running.
    #[error("device worker stopped")]
    WorkerStopped,
}

impl Error {
    /// Returns `true` if the bridge rejected the access token.
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Protocol(ProtocolError::Unauthorized))
    }
}

/// Errors related to value validation and constraints.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValueError {
    /// A numeric value is outside the allowed range.
    #[error("value {actual} is out of range [{min}, {max}]")]
    OutOfRange {
        /// Minimum allowed value.
        min: f64,
        /// Maximum allowed value.
        max: f64,
        /// The actual value that was provided.
        actual: f64,
    },

    /// An unknown capability name was provided.
    #[error("unknown capability: {0}")]
    UnknownCapability(String),

    /// An unknown fan mode was provided.
    #[error("invalid fan mode: {0}")]
    InvalidFanMode(String),

    /// The value has the wrong type for the capability.
    #[error("capability {capability} expects a {expected} value")]
    WrongType {
        /// The capability being written.
        capability: &'static str,
        /// The expected value kind.
        expected: &'static str,
    },

    /// A direction value could not be read as a number.
    #[error("invalid direction: {0}")]
    InvalidDirection(String),
}

/// Errors related to bridge communication.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// The bridge address is not a dotted IPv4 address.
    #[error("invalid address: {0:?}")]
    InvalidAddress(String),

    /// The access token is empty.
    #[error("invalid token: token must not be empty")]
    InvalidToken,

    /// The bridge answered HTTP 401.
    #[error("bridge rejected the access token")]
    Unauthorized,

    /// The bridge could not be reached or returned an unreadable body.
    #[error("bridge unreachable: {0}")]
    Unreachable(String),

    /// The bridge answered with an unexpected status code.
    #[error("bridge returned HTTP {0}")]
    ClientError(u16),

    /// The HTTP client could not be built.
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),
}

impl ProtocolError {
    /// Returns `true` for failures that should be retried on the next poll.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Unreachable(_) | Self::ClientError(_))
    }
}

/// Errors related to settings storage.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Reading or writing the settings file failed.
    #[error("settings I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// The settings file could not be (de)serialized.
    #[error("settings file is malformed: {0}")]
    Format(#[from] serde_json::Error),
}

/// A specialized Result type for this library.
pub type Result<T> = std::result::Result<T, Error>;
