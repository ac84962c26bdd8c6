// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Integration tests for the HTTP transport using wiremock.

use std::time::Duration;

use bondfan_lib::protocol::{BridgeApi, HttpClient, HttpConfig};
use bondfan_lib::validation::{pair, validate};
use bondfan_lib::{
    BridgeAction, BridgeSettings, Brightness, DeviceManager, PollState, PollingConfig,
    ProtocolError, ValidationOutcome,
};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TOKEN: &str = "secret";

fn client_for(server: &MockServer) -> HttpClient {
    HttpConfig::new()
        .with_port(server.address().port())
        .with_timeout(Duration::from_secs(2))
        .into_client()
        .unwrap()
}

fn settings() -> BridgeSettings {
    BridgeSettings::new("127.0.0.1", TOKEN)
}

async fn mount_json(server: &MockServer, http_method: &str, route: &str, body: serde_json::Value) {
    Mock::given(method(http_method))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

// ============================================================================
// HttpClient Tests
// ============================================================================

mod http_client {
    use super::*;

    #[tokio::test]
    async fn authenticated_request_sends_token_header() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v2/devices/a1/state"))
            .and(header("BOND-Token", TOKEN))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "power": 1,
                "speed": 2,
                "light": 0,
                "direction": -1
            })))
            .expect(1)
            .mount(&server)
            .await;

        let api = BridgeApi::new(client_for(&server));
        let state = api.device_state(&settings(), "a1").await.unwrap();

        assert_eq!(state.power, Some(1));
        assert_eq!(state.speed, Some(2));
        assert_eq!(state.direction, Some(-1));
    }

    #[tokio::test]
    async fn firmware_request_omits_token() {
        let server = MockServer::start().await;
        mount_json(&server, "GET", "/v2/sys/version", json!({ "fw_ver": "v3.2.1" })).await;

        let api = BridgeApi::new(client_for(&server));
        let firmware = api.firmware(&settings()).await.unwrap();
        assert_eq!(firmware.fw_ver.as_deref(), Some("v3.2.1"));

        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 1);
        assert!(!requests[0].headers.contains_key("BOND-Token"));
    }

    #[tokio::test]
    async fn unauthorized_status_is_classified() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v2/devices"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let api = BridgeApi::new(client_for(&server));
        let err = api.list_devices(&settings()).await.unwrap_err();

        assert!(matches!(err, ProtocolError::Unauthorized));
        assert!(!err.is_transient());
    }

    #[tokio::test]
    async fn server_error_is_transient() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v2/devices/a1/state"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let api = BridgeApi::new(client_for(&server));
        let err = api.device_state(&settings(), "a1").await.unwrap_err();

        assert!(matches!(err, ProtocolError::ClientError(500)));
        assert!(err.is_transient());
    }

    #[tokio::test]
    async fn non_json_body_is_unreachable() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v2/devices/a1/state"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>busy</html>"))
            .mount(&server)
            .await;

        let api = BridgeApi::new(client_for(&server));
        let err = api.device_state(&settings(), "a1").await.unwrap_err();

        assert!(matches!(err, ProtocolError::Unreachable(_)));
    }

    #[tokio::test]
    async fn closed_port_is_unreachable() {
        let port = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();
        let client = HttpConfig::new().with_port(port).into_client().unwrap();

        let api = BridgeApi::new(client);
        let err = api.firmware(&settings()).await.unwrap_err();

        assert!(matches!(err, ProtocolError::Unreachable(_)));
    }

    #[tokio::test]
    async fn slow_bridge_times_out_as_unreachable() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v2/devices/a1/state"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "power": 1 }))
                    .set_delay(Duration::from_secs(5)),
            )
            .mount(&server)
            .await;

        let client = HttpConfig::new()
            .with_port(server.address().port())
            .with_timeout(Duration::from_millis(200))
            .into_client()
            .unwrap();
        let api = BridgeApi::new(client);

        let started = std::time::Instant::now();
        let err = api.device_state(&settings(), "a1").await.unwrap_err();

        assert!(matches!(err, ProtocolError::Unreachable(_)));
        assert!(err.is_transient());
        assert!(started.elapsed() < Duration::from_secs(4));
    }

    #[tokio::test]
    async fn action_is_put_with_argument_body() {
        let server = MockServer::start().await;

        Mock::given(method("PUT"))
            .and(path("/v2/devices/a1/actions/SetBrightness"))
            .and(header("BOND-Token", TOKEN))
            .and(body_json(json!({ "argument": 40 })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "argument": 40 })))
            .expect(1)
            .mount(&server)
            .await;

        let api = BridgeApi::new(client_for(&server));
        let action = BridgeAction::SetBrightness(Brightness::from_dim(0.4));

        let echo = api.send_action(&settings(), "a1", action).await.unwrap();
        assert_eq!(echo, json!({ "argument": 40 }));
    }

    #[tokio::test]
    async fn action_without_argument_sends_empty_object() {
        let server = MockServer::start().await;

        Mock::given(method("PUT"))
            .and(path("/v2/devices/a1/actions/TurnLightOff"))
            .and(body_json(json!({})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(1)
            .mount(&server)
            .await;

        let api = BridgeApi::new(client_for(&server));
        api.send_action(&settings(), "a1", BridgeAction::TurnLightOff)
            .await
            .unwrap();
    }
}

// ============================================================================
// Validation Tests
// ============================================================================

mod validation {
    use super::*;

    async fn healthy_bridge() -> MockServer {
        let server = MockServer::start().await;
        mount_json(&server, "GET", "/v2/sys/version", json!({ "fw_ver": "v3.2.1" })).await;
        mount_json(&server, "GET", "/v2/devices", json!({ "_": "7fc1e84b", "a1": {} })).await;
        mount_json(&server, "GET", "/v2/devices/a1", json!({ "name": "Bedroom Fan" })).await;
        server
    }

    #[tokio::test]
    async fn pairing_against_live_bridge() {
        let server = healthy_bridge().await;
        let api = BridgeApi::new(client_for(&server));

        let paired = pair(&api, &settings()).await.unwrap();
        assert_eq!(paired.bridge_id, "a1");
        assert_eq!(paired.name, "Bedroom Fan");
    }

    #[tokio::test]
    async fn rejected_token_is_invalid_token() {
        let server = MockServer::start().await;
        mount_json(&server, "GET", "/v2/sys/version", json!({ "fw_ver": "v3.2.1" })).await;
        Mock::given(method("GET"))
            .and(path("/v2/devices"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let api = BridgeApi::new(client_for(&server));
        let outcome = validate(&api, &settings()).await;

        assert_eq!(outcome, ValidationOutcome::InvalidToken);
        assert_eq!(outcome.message(), "Token Invalid !!");
    }

    #[tokio::test]
    async fn malformed_address_sends_nothing() {
        let server = MockServer::start().await;
        let api = BridgeApi::new(client_for(&server));

        let outcome = validate(&api, &BridgeSettings::new("bridge.local", TOKEN)).await;

        assert_eq!(outcome, ValidationOutcome::InvalidAddress);
        assert!(server.received_requests().await.unwrap().is_empty());
    }
}

// ============================================================================
// DeviceManager Tests
// ============================================================================

mod manager {
    use super::*;

    fn fast_polling() -> PollingConfig {
        PollingConfig::default().with_interval(Duration::from_millis(50))
    }

    async fn wait_for_state(
        manager: &DeviceManager<HttpClient>,
        id: bondfan_lib::DeviceId,
        done: impl Fn(&PollState) -> bool,
    ) -> PollState {
        tokio::time::timeout(Duration::from_secs(5), async {
            loop {
                if let Some(state) = manager.poll_state(id).await
                    && done(&state)
                {
                    return state;
                }
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn polls_and_reconciles_light_fan() {
        let server = MockServer::start().await;
        mount_json(
            &server,
            "GET",
            "/v2/devices/a1/properties",
            json!({ "feature_light": true, "feature_brightness": true, "max_speed": 6 }),
        )
        .await;
        mount_json(
            &server,
            "GET",
            "/v2/devices/a1/state",
            json!({ "power": 1, "speed": 4, "light": 1, "brightness": 40, "direction": 1 }),
        )
        .await;

        let manager = DeviceManager::new(client_for(&server)).with_polling_config(fast_polling());
        let fan = manager.add_device("a1", settings()).await.unwrap();

        wait_for_state(&manager, fan, PollState::is_reconciled).await;

        let values = manager.capability_values(fan).await.unwrap();
        assert_eq!(values.onoff(), Some(true));
        assert_eq!(values.dim(), Some(0.4));
        assert_eq!(values.fan_speed(), Some(4.0));
        assert_eq!(values.fan_direction(), Some("1"));
        assert_eq!(values.fan_mode(), None);
    }

    #[tokio::test]
    async fn unauthorized_poll_halts_after_one_request() {
        let server = MockServer::start().await;
        mount_json(&server, "GET", "/v2/devices/a1/properties", json!({})).await;
        Mock::given(method("GET"))
            .and(path("/v2/devices/a1/state"))
            .respond_with(ResponseTemplate::new(401))
            .expect(1)
            .mount(&server)
            .await;

        let manager = DeviceManager::new(client_for(&server)).with_polling_config(fast_polling());
        let fan = manager.add_device("a1", settings()).await.unwrap();

        wait_for_state(&manager, fan, PollState::is_halted).await;

        // Several intervals pass without another state request.
        tokio::time::sleep(Duration::from_millis(300)).await;
        assert_eq!(manager.refresh(fan).await.unwrap(), PollState::Halted);

        manager.remove_device(fan).await;
    }

    #[tokio::test]
    async fn write_fan_mode_sends_speed_action() {
        let server = MockServer::start().await;
        mount_json(&server, "GET", "/v2/devices/a1/properties", json!({})).await;
        Mock::given(method("PUT"))
            .and(path("/v2/devices/a1/actions/SetSpeed"))
            .and(body_json(json!({ "argument": 100 })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "argument": 100 })))
            .expect(1)
            .mount(&server)
            .await;

        // No state route: polls are skipped and never overwrite the write.
        let polling = PollingConfig::default().with_interval(Duration::from_secs(60));
        let manager = DeviceManager::new(client_for(&server)).with_polling_config(polling);
        let fan = manager.add_device("a1", settings()).await.unwrap();

        manager.write_capability(fan, "fan_mode", "high").await.unwrap();

        let values = manager.capability_values(fan).await.unwrap();
        assert_eq!(values.fan_mode(), Some("high"));
        assert_eq!(values.onoff(), Some(true));
    }
}
