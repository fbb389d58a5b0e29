//! Shared test utilities

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{Value, json};
use uplift::{
    ActionRunner, ApplianceCatalog, Error, RelayDispatch, Result, Translator, TranslatorOptions,
};

/// Relay dispatcher that records every path it is asked to post to
#[derive(Default)]
pub struct RecordingRelay {
    pub calls: Mutex<Vec<String>>,
    pub fail: bool,
}

impl RecordingRelay {
    pub fn failing() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl RelayDispatch for RecordingRelay {
    async fn dispatch(&self, path: &str) -> Result<()> {
        self.calls.lock().unwrap().push(path.to_string());
        if self.fail {
            return Err(Error::Relay(format!("{path}: 503 Service Unavailable")));
        }
        Ok(())
    }
}

/// Action runner that records every action it runs
#[derive(Default)]
pub struct RecordingRunner {
    pub actions: Mutex<Vec<String>>,
    pub fail: bool,
}

impl RecordingRunner {
    pub fn failing() -> Self {
        Self {
            actions: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn actions(&self) -> Vec<String> {
        self.actions.lock().unwrap().clone()
    }
}

#[async_trait]
impl ActionRunner for RecordingRunner {
    async fn run(&self, action: &str) -> Result<()> {
        self.actions.lock().unwrap().push(action.to_string());
        if self.fail {
            return Err(Error::HardwareInvocation {
                action: action.to_string(),
                reason: "exited with code 1".to_string(),
            });
        }
        Ok(())
    }
}

/// Build a translator over the builtin catalog and a recording relay
pub fn translator_with(relay: Arc<RecordingRelay>, strict_relay: bool) -> Translator {
    Translator::new(
        Arc::new(ApplianceCatalog::builtin()),
        relay,
        TranslatorOptions { strict_relay },
    )
}

/// A v3 control directive
pub fn control_directive(namespace: &str, name: &str, endpoint_id: &str, payload: Value) -> Value {
    json!({
        "directive": {
            "header": {
                "namespace": namespace,
                "name": name,
                "payloadVersion": "3",
                "messageId": "4f2a6c1e-8b0d-4c7e-9a53-2d1f0e6b7c88",
                "correlationToken": "corr-token"
            },
            "endpoint": {
                "scope": {"type": "BearerToken", "token": "access-token"},
                "endpointId": endpoint_id,
                "cookie": {}
            },
            "payload": payload
        }
    })
}

/// A v3 discovery directive
pub fn discovery_directive() -> Value {
    json!({
        "directive": {
            "header": {
                "namespace": "Alexa.Discovery",
                "name": "Discover",
                "payloadVersion": "3",
                "messageId": "1bd5d003-31b9-476f-ad03-71d471922820"
            },
            "payload": {"scope": {"type": "BearerToken", "token": "access-token"}}
        }
    })
}
