// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Communication with the bridge's local HTTP API.
//!
//! - [`Transport`]: the raw request seam (one request, one outcome, no retry)
//! - [`HttpClient`]: the `reqwest` implementation of [`Transport`]
//! - [`BridgeApi`]: typed endpoints on top of any [`Transport`]
//!
//! Credentials are passed with each call and never stored by the transport,
//! so a settings change takes effect on the next request.

mod api;
mod http;
#[cfg(test)]
pub(crate) mod testing;

pub use api::{BridgeApi, FirmwareInfo};
pub use http::{HttpClient, HttpConfig, TOKEN_HEADER};

use std::fmt;
use std::future::Future;

use serde_json::Value;

use crate::config::BridgeSettings;
use crate::error::ProtocolError;

/// HTTP method of a bridge request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    /// Read a resource.
    Get,
    /// Invoke an action.
    Put,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Get => f.write_str("GET"),
            Self::Put => f.write_str("PUT"),
        }
    }
}

/// A single request to the bridge.
#[derive(Debug, Clone, PartialEq)]
pub struct BridgeRequest {
    /// HTTP method.
    pub method: Method,
    /// Resource path, starting with `/`.
    pub path: String,
    /// Optional JSON body.
    pub body: Option<Value>,
    /// Whether the access token header is attached.
    pub authenticated: bool,
}

impl BridgeRequest {
    /// Creates an authenticated `GET` request.
    #[must_use]
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            path: path.into(),
            body: None,
            authenticated: true,
        }
    }

    /// Creates an authenticated `PUT` request with a JSON body.
    #[must_use]
    pub fn put(path: impl Into<String>, body: Value) -> Self {
        Self {
            method: Method::Put,
            path: path.into(),
            body: Some(body),
            authenticated: true,
        }
    }

    /// Drops the access token header from this request.
    #[must_use]
    pub fn without_token(mut self) -> Self {
        self.authenticated = false;
        self
    }
}

/// Trait for transports that can carry bridge requests.
///
/// Implementations classify each response:
///
/// - HTTP 200 with a JSON body: `Ok(payload)`
/// - HTTP 401: [`ProtocolError::Unauthorized`]
/// - any other status: [`ProtocolError::ClientError`]
/// - network failure, timeout or unreadable body: [`ProtocolError::Unreachable`]
///
/// Implementations must not retry.
pub trait Transport: Send + Sync {
    /// Sends a request to the bridge at `settings.address`.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError` as classified above.
    fn send(
        &self,
        settings: &BridgeSettings,
        request: &BridgeRequest,
    ) -> impl Future<Output = Result<Value, ProtocolError>> + Send;
}
