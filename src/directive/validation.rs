//! Shape checks for outbound responses
//!
//! Every response is serialized and checked against the shape the voice
//! service expects for its namespace/name pair before it is returned. A
//! failure aborts the handler with `Error::Validation`.

use chrono::DateTime;
use serde_json::Value;
use uuid::Uuid;

use super::response::RESPONSE_PAYLOAD_VERSION;
use super::{ALEXA, AUTHORIZATION, DISCOVERY, DirectiveEnvelope, ResponseEnvelope};
use crate::{Error, Result};

/// Validate a response against the directive that produced it
///
/// # Errors
///
/// Returns `Error::Validation` describing the first violation found
pub fn validate(request: &DirectiveEnvelope, response: &ResponseEnvelope) -> Result<()> {
    let json = serde_json::to_value(response)?;
    validate_value(request, &json)
}

/// Validate an already-serialized response
///
/// # Errors
///
/// Returns `Error::Validation` describing the first violation found
pub fn validate_value(request: &DirectiveEnvelope, response: &Value) -> Result<()> {
    let header = field(response, "/event/header")?;
    let namespace = non_empty_str(header, "/namespace")?;
    let name = non_empty_str(header, "/name")?;

    let version = non_empty_str(header, "/payloadVersion")?;
    if version != RESPONSE_PAYLOAD_VERSION {
        return Err(invalid(format!(
            "payloadVersion must be {RESPONSE_PAYLOAD_VERSION}, got {version}"
        )));
    }

    let message_id = non_empty_str(header, "/messageId")?;
    Uuid::parse_str(message_id).map_err(|e| invalid(format!("messageId is not a UUID: {e}")))?;

    let payload = field(response, "/event/payload")?;
    if !payload.is_object() {
        return Err(invalid("event.payload must be an object"));
    }

    match (namespace, name) {
        (DISCOVERY, "Discover.Response") => validate_discovery(payload),
        (ALEXA, "Response") => validate_control(request, response),
        (AUTHORIZATION, "AcceptGrant.Response") => validate_grant(response, payload),
        (ALEXA, "ErrorResponse") => {
            non_empty_str(payload, "/type")?;
            non_empty_str(payload, "/message")?;
            Ok(())
        }
        _ => Err(invalid(format!("unknown response {namespace}.{name}"))),
    }
}

fn validate_discovery(payload: &Value) -> Result<()> {
    let endpoints = array(payload, "/endpoints")?;

    for endpoint in endpoints {
        for key in ["/endpointId", "/friendlyName", "/manufacturerName", "/description"] {
            non_empty_str(endpoint, key)?;
        }
        if array(endpoint, "/displayCategories")?.is_empty() {
            return Err(invalid("endpoint has no display categories"));
        }
        let capabilities = array(endpoint, "/capabilities")?;
        if capabilities.is_empty() {
            return Err(invalid("endpoint has no capabilities"));
        }
        for capability in capabilities {
            for key in ["/type", "/interface", "/version"] {
                non_empty_str(capability, key)?;
            }
        }
    }

    Ok(())
}

fn validate_control(request: &DirectiveEnvelope, response: &Value) -> Result<()> {
    let endpoint = field(response, "/event/endpoint")?;
    let scope_type = non_empty_str(endpoint, "/scope/type")?;
    if scope_type != "BearerToken" {
        return Err(invalid(format!("unexpected scope type {scope_type}")));
    }
    non_empty_str(endpoint, "/scope/token")?;

    let endpoint_id = non_empty_str(endpoint, "/endpointId")?;
    let requested = request.endpoint()?.endpoint_id.as_str();
    if endpoint_id != requested {
        return Err(invalid(format!(
            "endpointId {endpoint_id} does not match directive endpoint {requested}"
        )));
    }

    let echoed = response
        .pointer("/event/header/correlationToken")
        .and_then(Value::as_str);
    if echoed != request.header().correlation_token.as_deref() {
        return Err(invalid("correlationToken not echoed"));
    }

    let properties = array(response, "/context/properties")?;
    if properties.is_empty() {
        return Err(invalid("control response reports no properties"));
    }
    for property in properties {
        non_empty_str(property, "/namespace")?;
        non_empty_str(property, "/name")?;
        field(property, "/value")?;
        let sampled = non_empty_str(property, "/timeOfSample")?;
        DateTime::parse_from_rfc3339(sampled)
            .map_err(|e| invalid(format!("timeOfSample {sampled} is not RFC 3339: {e}")))?;
        field(property, "/uncertaintyInMilliseconds")?
            .as_u64()
            .ok_or_else(|| invalid("uncertaintyInMilliseconds must be a non-negative integer"))?;
    }

    Ok(())
}

fn validate_grant(response: &Value, payload: &Value) -> Result<()> {
    if response.pointer("/event/endpoint").is_some() {
        return Err(invalid("grant response must not carry an endpoint"));
    }
    if payload.as_object().is_some_and(|p| !p.is_empty()) {
        return Err(invalid("grant response payload must be empty"));
    }
    Ok(())
}

fn invalid(message: impl Into<String>) -> Error {
    Error::Validation(message.into())
}

fn field<'a>(value: &'a Value, pointer: &str) -> Result<&'a Value> {
    value
        .pointer(pointer)
        .filter(|v| !v.is_null())
        .ok_or_else(|| invalid(format!("missing {pointer}")))
}

fn non_empty_str<'a>(value: &'a Value, pointer: &str) -> Result<&'a str> {
    field(value, pointer)?
        .as_str()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| invalid(format!("{pointer} must be a non-empty string")))
}

fn array<'a>(value: &'a Value, pointer: &str) -> Result<&'a Vec<Value>> {
    field(value, pointer)?
        .as_array()
        .ok_or_else(|| invalid(format!("{pointer} must be an array")))
}
