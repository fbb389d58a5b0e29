//! Directive envelopes for the smart-home protocol
//!
//! Inbound directives are parsed into typed envelopes; outbound responses
//! live in [`response`] and are shape-checked by [`validation`] before they
//! leave the translator.

pub mod response;
pub mod validation;

use serde::Deserialize;
use serde_json::Value;

use crate::{Error, Result};

pub use response::{
    ErrorType, EventEndpoint, EventHeader, Property, PropertyContext, ResponseEnvelope,
};

/// Namespace for discovery directives
pub const DISCOVERY: &str = "Alexa.Discovery";
/// Namespace for power directives
pub const POWER_CONTROLLER: &str = "Alexa.PowerController";
/// Namespace for input directives
pub const INPUT_CONTROLLER: &str = "Alexa.InputController";
/// Namespace for account-linking grants
pub const AUTHORIZATION: &str = "Alexa.Authorization";
/// Namespace used for generic control responses and errors
pub const ALEXA: &str = "Alexa";

/// Inbound directive envelope
#[derive(Debug, Clone, Deserialize)]
pub struct DirectiveEnvelope {
    pub directive: Directive,
}

/// Body of an inbound directive
#[derive(Debug, Clone, Deserialize)]
pub struct Directive {
    pub header: DirectiveHeader,
    #[serde(default)]
    pub endpoint: Option<DirectiveEndpoint>,
    #[serde(default)]
    pub payload: Value,
}

/// Directive header
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectiveHeader {
    pub namespace: String,
    pub name: String,
    #[serde(default)]
    pub payload_version: Option<String>,
    #[serde(default)]
    pub message_id: Option<String>,
    #[serde(default)]
    pub correlation_token: Option<String>,
}

/// Endpoint targeted by a control directive
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectiveEndpoint {
    pub endpoint_id: String,
    pub scope: Scope,
    #[serde(default)]
    pub cookie: Option<Value>,
}

/// Bearer scope attached to an endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct Scope {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    pub token: String,
}

impl DirectiveEnvelope {
    /// Parse a raw JSON directive
    ///
    /// # Errors
    ///
    /// Returns `Error::Schema` if the header, namespace or name are missing
    pub fn parse(raw: &Value) -> Result<Self> {
        Self::deserialize(raw).map_err(|e| Error::Schema(format!("malformed directive: {e}")))
    }

    #[must_use]
    pub fn header(&self) -> &DirectiveHeader {
        &self.directive.header
    }

    /// Correlation token to echo on the response
    #[must_use]
    pub fn correlation_token(&self) -> Option<String> {
        self.directive.header.correlation_token.clone()
    }

    /// The targeted endpoint, required by every control directive
    ///
    /// # Errors
    ///
    /// Returns `Error::Schema` if the directive has no endpoint
    pub fn endpoint(&self) -> Result<&DirectiveEndpoint> {
        self.directive.endpoint.as_ref().ok_or_else(|| {
            Error::Schema(format!(
                "{}.{} directive has no endpoint",
                self.directive.header.namespace, self.directive.header.name
            ))
        })
    }

    /// Read a string field from the payload
    ///
    /// # Errors
    ///
    /// Returns `Error::Schema` if the field is missing or not a string
    pub fn payload_str(&self, field: &str) -> Result<&str> {
        self.directive
            .payload
            .get(field)
            .and_then(Value::as_str)
            .ok_or_else(|| Error::Schema(format!("payload field `{field}` missing")))
    }
}

/// Schema version announced by a directive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadVersion {
    V3,
    V2,
    Unknown,
}

impl PayloadVersion {
    fn parse(s: &str) -> Self {
        match s {
            "3" => Self::V3,
            "2" => Self::V2,
            _ => Self::Unknown,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::V3 => "3",
            Self::V2 => "2",
            Self::Unknown => "-1",
        }
    }
}

impl std::fmt::Display for PayloadVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Determine the payload version of a raw directive
///
/// Checks the v3 location (`directive.header`) first, then the v2 layout
/// where the header sits at the top level. Only used for logging.
#[must_use]
pub fn determine_version(raw: &Value) -> PayloadVersion {
    raw.pointer("/directive/header/payloadVersion")
        .or_else(|| raw.pointer("/header/payloadVersion"))
        .and_then(Value::as_str)
        .map_or(PayloadVersion::Unknown, PayloadVersion::parse)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_determine_version_v3() {
        let raw = json!({"directive": {"header": {"payloadVersion": "3"}}});
        assert_eq!(determine_version(&raw), PayloadVersion::V3);
    }

    #[test]
    fn test_determine_version_legacy_header() {
        let raw = json!({"header": {"payloadVersion": "2"}, "payload": {}});
        assert_eq!(determine_version(&raw), PayloadVersion::V2);
    }

    #[test]
    fn test_determine_version_missing() {
        assert_eq!(determine_version(&json!({})), PayloadVersion::Unknown);
        assert_eq!(determine_version(&json!({})).as_str(), "-1");
        let raw = json!({"directive": {"header": {"payloadVersion": "9"}}});
        assert_eq!(determine_version(&raw), PayloadVersion::Unknown);
    }

    #[test]
    fn test_parse_requires_header() {
        let err = DirectiveEnvelope::parse(&json!({"directive": {}})).unwrap_err();
        assert!(matches!(err, Error::Schema(_)));

        let raw = json!({"directive": {"header": {"namespace": "Alexa"}}});
        let err = DirectiveEnvelope::parse(&raw).unwrap_err();
        assert!(matches!(err, Error::Schema(_)));
    }

    #[test]
    fn test_parse_control_directive() {
        let raw = json!({
            "directive": {
                "header": {
                    "namespace": "Alexa.InputController",
                    "name": "SelectInput",
                    "payloadVersion": "3",
                    "correlationToken": "abc"
                },
                "endpoint": {"endpointId": "tv", "scope": {"type": "BearerToken", "token": "tok"}},
                "payload": {"input": "HDMI 1"}
            }
        });
        let envelope = DirectiveEnvelope::parse(&raw).unwrap();

        assert_eq!(envelope.header().correlation_token.as_deref(), Some("abc"));
        assert_eq!(envelope.endpoint().unwrap().scope.token, "tok");
        assert_eq!(envelope.payload_str("input").unwrap(), "HDMI 1");
        assert!(envelope.payload_str("missing").is_err());
    }

    #[test]
    fn test_endpoint_missing() {
        let raw = json!({
            "directive": {"header": {"namespace": "Alexa.PowerController", "name": "TurnOn"}}
        });
        let envelope = DirectiveEnvelope::parse(&raw).unwrap();
        assert!(matches!(envelope.endpoint(), Err(Error::Schema(_))));
    }
}
