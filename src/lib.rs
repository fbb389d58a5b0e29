//! Uplift - smart-home directive bridge for infrared appliances
//!
//! This library provides the two halves of the bridge:
//! - Directive translator: answers voice-service directives and forwards
//!   control commands to the relay
//! - Relay server: authenticates relay calls and runs control scripts
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                Voice service                         │
//! └────────────────────┬────────────────────────────────┘
//!                      │ directive (JSON)
//! ┌────────────────────▼────────────────────────────────┐
//! │             Directive translator                     │
//! │   Discovery  │  Power  │  Input  │  Grant           │
//! └────────────────────┬────────────────────────────────┘
//!                      │ POST + shared secret
//! ┌────────────────────▼────────────────────────────────┐
//! │                Relay server                          │
//! │   tvon  │  hdmi_input  │  tv_input  │  soundbar_*   │
//! └─────────────────────────────────────────────────────┘
//! ```

pub mod api;
pub mod appliance;
pub mod config;
pub mod directive;
pub mod error;
pub mod relay;
pub mod security;
pub mod translator;

pub use appliance::{ApplianceCatalog, ApplianceDescriptor, CapabilityDescriptor};
pub use config::Config;
pub use directive::{DirectiveEnvelope, PayloadVersion, ResponseEnvelope, determine_version};
pub use error::{Error, Result};
pub use relay::{ActionRunner, RelayServer, ScriptRunner};
pub use security::SharedSecret;
pub use translator::{HttpRelayClient, RelayDispatch, Translator, TranslatorOptions};
