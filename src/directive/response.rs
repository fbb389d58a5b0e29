//! Response envelopes returned to the voice service

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use uuid::Uuid;

use super::ALEXA;

/// Payload version of every response the translator emits
pub const RESPONSE_PAYLOAD_VERSION: &str = "3";

/// Uncertainty reported for commanded (not measured) property values
pub const COMMANDED_UNCERTAINTY_MS: u32 = 500;

/// Scope type echoed on response endpoints
const BEARER_TOKEN: &str = "BearerToken";

/// Outbound response envelope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<PropertyContext>,
    pub event: Event,
}

/// Event section of a response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub header: EventHeader,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<EventEndpoint>,
    pub payload: Value,
}

/// Response header
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventHeader {
    pub namespace: String,
    pub name: String,
    pub payload_version: String,
    pub message_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correlation_token: Option<String>,
}

impl EventHeader {
    /// Header with a freshly generated message ID
    #[must_use]
    pub fn new(namespace: &str, name: &str, correlation_token: Option<String>) -> Self {
        Self {
            namespace: namespace.to_string(),
            name: name.to_string(),
            payload_version: RESPONSE_PAYLOAD_VERSION.to_string(),
            message_id: Uuid::new_v4().to_string(),
            correlation_token,
        }
    }
}

/// Endpoint echoed back on control responses
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventEndpoint {
    pub scope: EventScope,
    pub endpoint_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventScope {
    #[serde(rename = "type")]
    pub kind: String,
    pub token: String,
}

impl EventEndpoint {
    #[must_use]
    pub fn bearer(endpoint_id: &str, token: &str) -> Self {
        Self {
            scope: EventScope {
                kind: BEARER_TOKEN.to_string(),
                token: token.to_string(),
            },
            endpoint_id: endpoint_id.to_string(),
        }
    }
}

/// Context carrying reported property values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyContext {
    pub properties: Vec<Property>,
}

/// A single reported property value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    pub namespace: String,
    pub name: String,
    pub value: Value,
    pub time_of_sample: String,
    pub uncertainty_in_milliseconds: u32,
}

impl Property {
    /// A commanded value sampled now
    #[must_use]
    pub fn commanded(namespace: &str, name: &str, value: impl Into<Value>) -> Self {
        Self {
            namespace: namespace.to_string(),
            name: name.to_string(),
            value: value.into(),
            time_of_sample: sample_timestamp(Utc::now()),
            uncertainty_in_milliseconds: COMMANDED_UNCERTAINTY_MS,
        }
    }
}

/// Format a sample time the way the voice service expects
#[must_use]
pub fn sample_timestamp(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%dT%H:%M:%S.00Z").to_string()
}

/// Error categories reported in an error envelope
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorType {
    InvalidDirective,
    NoSuchEndpoint,
    EndpointUnreachable,
    InternalError,
}

impl ErrorType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InvalidDirective => "INVALID_DIRECTIVE",
            Self::NoSuchEndpoint => "NO_SUCH_ENDPOINT",
            Self::EndpointUnreachable => "ENDPOINT_UNREACHABLE",
            Self::InternalError => "INTERNAL_ERROR",
        }
    }
}

impl ResponseEnvelope {
    /// Discovery response listing every endpoint
    #[must_use]
    pub fn discovery(endpoints: Value) -> Self {
        Self {
            context: None,
            event: Event {
                header: EventHeader::new(super::DISCOVERY, "Discover.Response", None),
                endpoint: None,
                payload: json!({ "endpoints": endpoints }),
            },
        }
    }

    /// Control response reporting one property for the directive's endpoint
    #[must_use]
    pub fn control(
        correlation_token: Option<String>,
        endpoint: EventEndpoint,
        property: Property,
    ) -> Self {
        Self {
            context: Some(PropertyContext {
                properties: vec![property],
            }),
            event: Event {
                header: EventHeader::new(ALEXA, "Response", correlation_token),
                endpoint: Some(endpoint),
                payload: json!({}),
            },
        }
    }

    /// Acknowledgment for an account-linking grant
    #[must_use]
    pub fn grant_accepted() -> Self {
        Self {
            context: None,
            event: Event {
                header: EventHeader::new(super::AUTHORIZATION, "AcceptGrant.Response", None),
                endpoint: None,
                payload: json!({}),
            },
        }
    }

    /// Error envelope
    ///
    /// Correlation token and endpoint are echoed when they can be recovered
    /// from the raw directive, even if it failed to parse as a whole.
    #[must_use]
    pub fn error(kind: ErrorType, message: &str, raw_directive: &Value) -> Self {
        let correlation_token = raw_directive
            .pointer("/directive/header/correlationToken")
            .and_then(Value::as_str)
            .map(ToString::to_string);

        let endpoint = raw_directive
            .pointer("/directive/endpoint/endpointId")
            .and_then(Value::as_str)
            .zip(
                raw_directive
                    .pointer("/directive/endpoint/scope/token")
                    .and_then(Value::as_str),
            )
            .map(|(id, token)| EventEndpoint::bearer(id, token));

        Self {
            context: None,
            event: Event {
                header: EventHeader::new(ALEXA, "ErrorResponse", correlation_token),
                endpoint,
                payload: json!({ "type": kind.as_str(), "message": message }),
            },
        }
    }

    #[must_use]
    pub fn header(&self) -> &EventHeader {
        &self.event.header
    }

    /// Find a context property by namespace and name
    #[must_use]
    pub fn property(&self, namespace: &str, name: &str) -> Option<&Property> {
        self.context
            .as_ref()?
            .properties
            .iter()
            .find(|p| p.namespace == namespace && p.name == name)
    }
}
