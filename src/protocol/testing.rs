// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Scripted transport for unit tests.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::{Value, json};

use crate::config::BridgeSettings;
use crate::error::ProtocolError;
use crate::protocol::{BridgeRequest, Transport};

/// A canned reply for one request.
#[derive(Debug, Clone)]
pub(crate) enum FakeReply {
    Json(Value),
    Status(u16),
    Unreachable,
    /// A failure that is neither a 401 nor transient.
    Fatal,
}

impl FakeReply {
    fn into_result(self, path: &str) -> Result<Value, ProtocolError> {
        match self {
            Self::Fatal => Err(ProtocolError::InvalidAddress(path.to_string())),
            Self::Json(value) => Ok(value),
            Self::Status(401) => Err(ProtocolError::Unauthorized),
            Self::Status(code) => Err(ProtocolError::ClientError(code)),
            Self::Unreachable => Err(ProtocolError::Unreachable("connection refused".to_string())),
        }
    }
}

#[derive(Debug, Default)]
struct Inner {
    queued: HashMap<String, VecDeque<FakeReply>>,
    sticky: HashMap<String, FakeReply>,
    requests: Vec<BridgeRequest>,
}

/// Transport that answers from per-path scripts and records every request.
///
/// Queued replies are consumed in order; once a path's queue is empty the
/// last reply set with [`reply`](Self::reply) is repeated. Unscripted paths
/// answer `{}`.
#[derive(Debug, Clone, Default)]
pub(crate) struct FakeTransport {
    inner: Arc<Mutex<Inner>>,
}

impl FakeTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Sets the reply repeated for every request to `path`.
    pub(crate) fn reply(&self, path: &str, reply: FakeReply) {
        self.inner.lock().sticky.insert(path.to_string(), reply);
    }

    /// Queues a one-shot reply for the next request to `path`.
    pub(crate) fn enqueue(&self, path: &str, reply: FakeReply) {
        self.inner
            .lock()
            .queued
            .entry(path.to_string())
            .or_default()
            .push_back(reply);
    }

    pub(crate) fn requests(&self) -> Vec<BridgeRequest> {
        self.inner.lock().requests.clone()
    }

    pub(crate) fn requests_to(&self, path: &str) -> usize {
        self.inner
            .lock()
            .requests
            .iter()
            .filter(|request| request.path == path)
            .count()
    }

    pub(crate) fn paths(&self) -> Vec<String> {
        self.inner
            .lock()
            .requests
            .iter()
            .map(|request| request.path.clone())
            .collect()
    }
}

impl Transport for FakeTransport {
    async fn send(
        &self,
        _settings: &BridgeSettings,
        request: &BridgeRequest,
    ) -> Result<Value, ProtocolError> {
        let reply = {
            let mut inner = self.inner.lock();
            inner.requests.push(request.clone());
            let queued = inner
                .queued
                .get_mut(&request.path)
                .and_then(VecDeque::pop_front);
            queued
                .or_else(|| inner.sticky.get(&request.path).cloned())
                .unwrap_or_else(|| FakeReply::Json(json!({})))
        };
        reply.into_result(&request.path)
    }
}
