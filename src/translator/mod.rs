//! Directive translator
//!
//! Turns inbound directives into response envelopes. Discovery is answered
//! from the static catalog; power and input directives are forwarded to the
//! relay server and answered with the commanded state.

pub mod relay_client;

use std::sync::Arc;

use serde_json::Value;

pub use relay_client::{HttpRelayClient, RelayDispatch};

use crate::appliance::{ApplianceCatalog, ApplianceDescriptor};
use crate::directive::{
    self, DirectiveEnvelope, EventEndpoint, Property, ResponseEnvelope, validation,
};
use crate::relay::routes;
use crate::{Error, Result};

/// Translator behavior switches
#[derive(Debug, Clone, Copy, Default)]
pub struct TranslatorOptions {
    /// Fail the directive when the relay call fails instead of only logging it
    pub strict_relay: bool,
}

/// Stateless directive handler
pub struct Translator {
    catalog: Arc<ApplianceCatalog>,
    relay: Arc<dyn RelayDispatch>,
    options: TranslatorOptions,
}

impl Translator {
    #[must_use]
    pub fn new(
        catalog: Arc<ApplianceCatalog>,
        relay: Arc<dyn RelayDispatch>,
        options: TranslatorOptions,
    ) -> Self {
        Self {
            catalog,
            relay,
            options,
        }
    }

    #[must_use]
    pub fn catalog(&self) -> &ApplianceCatalog {
        &self.catalog
    }

    /// Handle one raw directive
    ///
    /// # Errors
    ///
    /// Returns `Error::Schema` for malformed or unsupported directives,
    /// `Error::UnknownAppliance` for endpoints outside the catalog,
    /// `Error::Validation` if the built response fails its shape check, and
    /// relay errors when `strict_relay` is set
    pub async fn handle(&self, raw: &Value) -> Result<ResponseEnvelope> {
        if tracing::enabled!(tracing::Level::DEBUG) {
            let pretty = serde_json::to_string_pretty(raw).unwrap_or_default();
            tracing::debug!(directive = %pretty, "received directive");
        }

        let version = directive::determine_version(raw);
        tracing::info!(%version, "directive payload version");

        let result = self.dispatch(raw).await;
        match &result {
            Ok(response) => tracing::info!(
                namespace = %response.header().namespace,
                name = %response.header().name,
                message_id = %response.header().message_id,
                "directive handled"
            ),
            Err(e) => tracing::error!(error = %e, "directive failed"),
        }
        result
    }

    async fn dispatch(&self, raw: &Value) -> Result<ResponseEnvelope> {
        let request = DirectiveEnvelope::parse(raw)?;
        let header = request.header();

        let response = match (header.namespace.as_str(), header.name.as_str()) {
            (directive::DISCOVERY, "Discover") => self.discover()?,
            (directive::POWER_CONTROLLER, _) => self.handle_power(&request).await?,
            (directive::INPUT_CONTROLLER, _) => self.handle_input(&request).await?,
            (directive::AUTHORIZATION, "AcceptGrant") => Self::handle_grant(),
            (namespace, name) => {
                return Err(Error::Schema(format!(
                    "unsupported directive {namespace}.{name}"
                )));
            }
        };

        validation::validate(&request, &response)?;

        if tracing::enabled!(tracing::Level::DEBUG) {
            let pretty = serde_json::to_string_pretty(&response).unwrap_or_default();
            tracing::debug!(response = %pretty, "built response");
        }

        Ok(response)
    }

    /// Discovery response listing the whole catalog in order
    ///
    /// # Errors
    ///
    /// Returns `Error::Serialization` if the catalog cannot be serialized
    pub fn discover(&self) -> Result<ResponseEnvelope> {
        let endpoints = serde_json::to_value(self.catalog.as_slice())?;
        tracing::info!(count = self.catalog.len(), "answering discovery");
        Ok(ResponseEnvelope::discovery(endpoints))
    }

    async fn handle_power(&self, request: &DirectiveEnvelope) -> Result<ResponseEnvelope> {
        let endpoint = request.endpoint()?;
        let appliance = self.controllable(&endpoint.endpoint_id, directive::POWER_CONTROLLER)?;

        let state = if request.header().name == "TurnOn" {
            "ON"
        } else {
            "OFF"
        };
        tracing::info!(endpoint = %appliance.endpoint_id, state, "power directive");

        // The relay only wires power-on; every power directive toggles through it
        self.forward(&routes::power_on_path(&appliance.endpoint_id))
            .await?;

        Ok(ResponseEnvelope::control(
            request.correlation_token(),
            EventEndpoint::bearer(&endpoint.endpoint_id, &endpoint.scope.token),
            Property::commanded(directive::POWER_CONTROLLER, "powerState", state),
        ))
    }

    async fn handle_input(&self, request: &DirectiveEnvelope) -> Result<ResponseEnvelope> {
        let endpoint = request.endpoint()?;
        let appliance = self.controllable(&endpoint.endpoint_id, directive::INPUT_CONTROLLER)?;
        let input = request.payload_str("input")?;

        tracing::info!(endpoint = %appliance.endpoint_id, input, "input directive");

        match routes::input_path(&appliance.endpoint_id, input) {
            Some(path) => self.forward(path).await?,
            None => tracing::warn!(
                endpoint = %appliance.endpoint_id,
                input,
                "no relay route for input, nothing sent"
            ),
        }

        Ok(ResponseEnvelope::control(
            request.correlation_token(),
            EventEndpoint::bearer(&endpoint.endpoint_id, &endpoint.scope.token),
            Property::commanded(directive::INPUT_CONTROLLER, "input", input),
        ))
    }

    /// Catalog appliance that advertises `interface`
    fn controllable(&self, endpoint_id: &str, interface: &str) -> Result<&ApplianceDescriptor> {
        let appliance = self.catalog.require(endpoint_id)?;
        if !appliance.supports(interface) {
            return Err(Error::Schema(format!(
                "endpoint {endpoint_id} does not support {interface}"
            )));
        }
        Ok(appliance)
    }

    fn handle_grant() -> ResponseEnvelope {
        tracing::info!("accepting authorization grant");
        ResponseEnvelope::grant_accepted()
    }

    /// Send one relay command, applying the relay failure policy
    async fn forward(&self, path: &str) -> Result<()> {
        match self.relay.dispatch(path).await {
            Ok(()) => Ok(()),
            Err(e) if self.options.strict_relay => Err(e),
            Err(e) => {
                tracing::warn!(
                    path,
                    error = %e,
                    "relay command failed, reporting commanded state anyway"
                );
                Ok(())
            }
        }
    }
}
