// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! HTTP transport for the bridge API.

use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde_json::Value;

use crate::config::BridgeSettings;
use crate::error::ProtocolError;
use crate::protocol::{BridgeRequest, Method, Transport};

/// Header carrying the bridge access token.
pub const TOKEN_HEADER: &str = "BOND-Token";

// ============================================================================
// HttpConfig - Configuration for the HTTP transport
// ============================================================================

/// Configuration for the HTTP transport.
///
/// The bridge lives on the local network, so the default timeout is short:
/// an unresponsive bridge must not stall a polling task for long.
///
/// # Examples
///
/// ```
/// use bondfan_lib::protocol::HttpConfig;
/// use std::time::Duration;
///
/// let config = HttpConfig::new()
///     .with_port(8080)
///     .with_timeout(Duration::from_secs(2));
///
/// assert_eq!(config.port(), 8080);
/// assert_eq!(config.timeout(), Duration::from_secs(2));
/// ```
#[derive(Debug, Clone)]
pub struct HttpConfig {
    port: u16,
    timeout: Duration,
}

impl HttpConfig {
    /// Default HTTP port.
    pub const DEFAULT_PORT: u16 = 80;
    /// Default request timeout.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

    /// Creates a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self {
            port: Self::DEFAULT_PORT,
            timeout: Self::DEFAULT_TIMEOUT,
        }
    }

    /// Sets a custom port.
    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Sets the request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Returns the port.
    #[must_use]
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Returns the timeout.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Builds the base URL for a bridge address.
    #[must_use]
    pub fn base_url(&self, address: &str) -> String {
        if self.port == Self::DEFAULT_PORT {
            format!("http://{address}")
        } else {
            format!("http://{address}:{}", self.port)
        }
    }

    /// Creates an `HttpClient` from this configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be created.
    pub fn into_client(self) -> Result<HttpClient, ProtocolError> {
        let client = Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(ProtocolError::Http)?;

        Ok(HttpClient {
            client,
            config: self,
        })
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// HttpClient - reqwest-backed transport
// ============================================================================

/// HTTP client for the bridge API.
///
/// # Examples
///
/// ```no_run
/// use bondfan_lib::BridgeSettings;
/// use bondfan_lib::protocol::{BridgeApi, HttpClient};
///
/// # async fn example() -> bondfan_lib::Result<()> {
/// let api = BridgeApi::new(HttpClient::new()?);
/// let settings = BridgeSettings::new("192.168.1.20", "f3a1c0de");
///
/// let firmware = api.firmware(&settings).await?;
/// println!("bridge firmware: {:?}", firmware.fw_ver);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    config: HttpConfig,
}

impl HttpClient {
    /// Creates a client with the default configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be created.
    pub fn new() -> Result<Self, ProtocolError> {
        HttpConfig::new().into_client()
    }

    /// Returns the client configuration.
    #[must_use]
    pub fn config(&self) -> &HttpConfig {
        &self.config
    }

    fn build_url(&self, address: &str, path: &str) -> String {
        format!("{}{path}", self.config.base_url(address))
    }
}

impl Transport for HttpClient {
    async fn send(
        &self,
        settings: &BridgeSettings,
        request: &BridgeRequest,
    ) -> Result<Value, ProtocolError> {
        let url = self.build_url(&settings.address, &request.path);

        tracing::debug!(method = %request.method, url = %url, "Sending bridge request");

        let mut builder = match request.method {
            Method::Get => self.client.get(&url),
            Method::Put => self.client.put(&url),
        };
        if request.authenticated {
            builder = builder.header(TOKEN_HEADER, &settings.token);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| ProtocolError::Unreachable(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(ProtocolError::Unauthorized);
        }
        if status != StatusCode::OK {
            return Err(ProtocolError::ClientError(status.as_u16()));
        }

        let body = response
            .text()
            .await
            .map_err(|e| ProtocolError::Unreachable(e.to_string()))?;

        tracing::debug!(body = %body, "Received bridge response");

        serde_json::from_str(&body)
            .map_err(|e| ProtocolError::Unreachable(format!("invalid JSON body: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_config_default_values() {
        let config = HttpConfig::new();
        assert_eq!(config.port(), 80);
        assert_eq!(config.timeout(), Duration::from_secs(5));
    }

    #[test]
    fn base_url_omits_default_port() {
        let config = HttpConfig::new();
        assert_eq!(config.base_url("192.168.1.20"), "http://192.168.1.20");
    }

    #[test]
    fn base_url_with_custom_port() {
        let config = HttpConfig::new().with_port(8080);
        assert_eq!(config.base_url("192.168.1.20"), "http://192.168.1.20:8080");
    }

    #[test]
    fn build_url_appends_path() {
        let client = HttpClient::new().unwrap();
        assert_eq!(
            client.build_url("10.0.0.5", "/v2/devices/abc/state"),
            "http://10.0.0.5/v2/devices/abc/state"
        );
    }

    #[test]
    fn into_client_keeps_config() {
        let client = HttpConfig::new()
            .with_port(9000)
            .with_timeout(Duration::from_secs(1))
            .into_client()
            .unwrap();
        assert_eq!(client.config().port(), 9000);
        assert_eq!(client.config().timeout(), Duration::from_secs(1));
    }
}
