//! Static appliance catalog advertised during discovery
//!
//! The catalog is built once at startup and shared read-only. Field names
//! serialize in the directive protocol's camelCase form so a descriptor can
//! be returned verbatim in a discovery response.

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Interface version advertised for every capability
pub const INTERFACE_VERSION: &str = "3";

/// Property flags for a capability interface
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CapabilityProperties {
    pub supported: Vec<SupportedProperty>,
    pub retrievable: bool,
}

/// A single reportable property name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupportedProperty {
    pub name: String,
}

/// A declared interface an endpoint supports
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilityDescriptor {
    #[serde(rename = "type")]
    pub kind: String,
    pub interface: String,
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<CapabilityProperties>,
}

impl CapabilityDescriptor {
    /// Capability for a protocol interface at the current version
    #[must_use]
    pub fn interface(interface: &str) -> Self {
        Self {
            kind: "AlexaInterface".to_string(),
            interface: interface.to_string(),
            version: INTERFACE_VERSION.to_string(),
            properties: None,
        }
    }

    /// Attach non-retrievable property flags
    #[must_use]
    pub fn with_properties(mut self) -> Self {
        self.properties = Some(CapabilityProperties::default());
        self
    }
}

/// A controllable appliance identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplianceDescriptor {
    pub endpoint_id: String,
    pub manufacturer_name: String,
    pub friendly_name: String,
    pub description: String,
    pub display_categories: Vec<String>,
    #[serde(default)]
    pub cookie: serde_json::Map<String, serde_json::Value>,
    pub capabilities: Vec<CapabilityDescriptor>,
}

impl ApplianceDescriptor {
    fn infrared(
        endpoint_id: &str,
        manufacturer_name: &str,
        friendly_name: &str,
        description: &str,
        category: &str,
    ) -> Self {
        Self {
            endpoint_id: endpoint_id.to_string(),
            manufacturer_name: manufacturer_name.to_string(),
            friendly_name: friendly_name.to_string(),
            description: description.to_string(),
            display_categories: vec![category.to_string()],
            cookie: serde_json::Map::new(),
            capabilities: vec![
                CapabilityDescriptor::interface("Alexa"),
                CapabilityDescriptor::interface("Alexa.PowerController").with_properties(),
                CapabilityDescriptor::interface("Alexa.InputController").with_properties(),
            ],
        }
    }

    /// Whether this appliance advertises the given interface
    #[must_use]
    pub fn supports(&self, interface: &str) -> bool {
        self.capabilities.iter().any(|c| c.interface == interface)
    }
}

/// Immutable, ordered list of appliances known to the bridge
#[derive(Debug, Clone)]
pub struct ApplianceCatalog {
    appliances: Vec<ApplianceDescriptor>,
}

impl ApplianceCatalog {
    /// Create a catalog from an explicit list, preserving order
    #[must_use]
    pub const fn new(appliances: Vec<ApplianceDescriptor>) -> Self {
        Self { appliances }
    }

    /// The appliances wired to the infrared relay
    #[must_use]
    pub fn builtin() -> Self {
        Self::new(vec![
            ApplianceDescriptor::infrared(
                "tv",
                "Aled's TV",
                "TV",
                "Living room tv uplifted by RPi uplift",
                "TV",
            ),
            ApplianceDescriptor::infrared(
                "soundbar",
                "Soundbar",
                "Sound Bar",
                "Soundbar uplifted by RPi uplift",
                "SPEAKER",
            ),
        ])
    }

    /// Look up an appliance by endpoint ID
    #[must_use]
    pub fn get(&self, endpoint_id: &str) -> Option<&ApplianceDescriptor> {
        self.appliances.iter().find(|a| a.endpoint_id == endpoint_id)
    }

    /// Look up an appliance, failing if it is not in the catalog
    ///
    /// # Errors
    ///
    /// Returns `Error::UnknownAppliance` if no appliance has this ID
    pub fn require(&self, endpoint_id: &str) -> Result<&ApplianceDescriptor> {
        self.get(endpoint_id)
            .ok_or_else(|| Error::UnknownAppliance(endpoint_id.to_string()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &ApplianceDescriptor> {
        self.appliances.iter()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[ApplianceDescriptor] {
        &self.appliances
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.appliances.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.appliances.is_empty()
    }
}

impl Default for ApplianceCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}
