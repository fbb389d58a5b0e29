//! TOML configuration file loading
//!
//! Supports `~/.config/uplift/config.toml` (or `$UPLIFT_CONFIG`) as a
//! persistent config source. All fields are optional; the file is a
//! partial overlay on top of defaults.

use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Top-level TOML configuration file schema
#[derive(Debug, Default, Deserialize)]
pub struct UpliftConfigFile {
    /// Shared secret between translator and relay
    #[serde(default)]
    pub secret: Option<String>,

    /// Directive translator configuration
    #[serde(default)]
    pub translator: TranslatorFileConfig,

    /// Relay server configuration
    #[serde(default)]
    pub relay: RelayFileConfig,
}

/// Directive translator configuration
#[derive(Debug, Default, Deserialize)]
pub struct TranslatorFileConfig {
    /// Translator API port
    pub port: Option<u16>,

    /// Relay server base URL
    pub relay_url: Option<String>,

    /// Fail directives when the relay call fails
    pub strict_relay: Option<bool>,
}

/// Relay server configuration
#[derive(Debug, Default, Deserialize)]
pub struct RelayFileConfig {
    /// Relay server port
    pub port: Option<u16>,

    /// Directory holding the control scripts
    pub scripts_dir: Option<String>,

    /// Kill control scripts after this many seconds
    pub action_timeout_secs: Option<u64>,
}

/// Load the TOML config file from `$UPLIFT_CONFIG` or the standard path
///
/// Returns `UpliftConfigFile::default()` if the file doesn't exist or can't be parsed.
pub fn load_config_file() -> UpliftConfigFile {
    let path = std::env::var("UPLIFT_CONFIG")
        .ok()
        .map(PathBuf::from)
        .or_else(config_file_path);

    match path {
        Some(path) if path.exists() => load_from(&path),
        _ => UpliftConfigFile::default(),
    }
}

/// Load a config file from an explicit path
pub fn load_from(path: &Path) -> UpliftConfigFile {
    match std::fs::read_to_string(path) {
        Ok(content) => match toml::from_str(&content) {
            Ok(config) => {
                tracing::info!(path = %path.display(), "loaded config file");
                config
            }
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "failed to parse config file, using defaults"
                );
                UpliftConfigFile::default()
            }
        },
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "failed to read config file"
            );
            UpliftConfigFile::default()
        }
    }
}

/// Return the config file path: `~/.config/uplift/config.toml`
pub fn config_file_path() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|d| d.config_dir().join("uplift").join("config.toml"))
}
