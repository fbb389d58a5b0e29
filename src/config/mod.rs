//! Configuration management for the uplift bridge
//!
//! Values resolve as `env > config.toml > default`. The shared secret is the
//! only required value; loading fails without it.

pub mod file;

use std::path::PathBuf;
use std::time::Duration;

use crate::security::SharedSecret;
use crate::{Error, Result};

pub use file::UpliftConfigFile;

/// Default translator API port
pub const DEFAULT_TRANSLATOR_PORT: u16 = 8080;
/// Default relay server port
pub const DEFAULT_RELAY_PORT: u16 = 5000;
/// Default relay URL the translator posts to
pub const DEFAULT_RELAY_URL: &str = "http://localhost:5000";
/// Default control script directory, relative to the working directory
pub const DEFAULT_SCRIPTS_DIR: &str = "../remote_control";

/// Uplift configuration
#[derive(Debug)]
pub struct Config {
    /// Shared secret between translator and relay
    pub secret: SharedSecret,

    /// Directive translator configuration
    pub translator: TranslatorConfig,

    /// Relay server configuration
    pub relay: RelayConfig,
}

/// Directive translator configuration
#[derive(Debug, Clone)]
pub struct TranslatorConfig {
    /// Port to listen on
    pub port: u16,

    /// Relay server base URL
    pub relay_url: String,

    /// Fail directives when the relay call fails
    pub strict_relay: bool,
}

/// Relay server configuration
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// Port to listen on
    pub port: u16,

    /// Directory holding the control scripts
    pub scripts_dir: PathBuf,

    /// Kill control scripts after this long (none = wait indefinitely)
    pub action_timeout: Option<Duration>,
}

impl Config {
    /// Load configuration from the environment and config file
    ///
    /// # Errors
    ///
    /// Returns error if no shared secret is configured
    pub fn load() -> Result<Self> {
        let fc = file::load_config_file();
        Self::from_sources(fc, |key| std::env::var(key).ok())
    }

    /// Resolve configuration from a parsed file and an environment lookup
    ///
    /// # Errors
    ///
    /// Returns error if no shared secret is configured or a value fails to parse
    pub fn from_sources(
        fc: UpliftConfigFile,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        let secret = env("UPLIFT_SECRET")
            .or_else(|| env("SECRET"))
            .or(fc.secret)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| {
                Error::Config(
                    "no shared secret: set UPLIFT_SECRET or `secret` in config.toml".to_string(),
                )
            })?;

        let translator = TranslatorConfig {
            port: parse_env(&env, "UPLIFT_TRANSLATOR_PORT")?
                .or(fc.translator.port)
                .unwrap_or(DEFAULT_TRANSLATOR_PORT),
            relay_url: env("UPLIFT_RELAY_URL")
                .or(fc.translator.relay_url)
                .unwrap_or_else(|| DEFAULT_RELAY_URL.to_string()),
            strict_relay: env("UPLIFT_STRICT_RELAY")
                .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
                .or(fc.translator.strict_relay)
                .unwrap_or(false),
        };

        let relay = RelayConfig {
            port: parse_env(&env, "UPLIFT_RELAY_PORT")?
                .or(fc.relay.port)
                .unwrap_or(DEFAULT_RELAY_PORT),
            scripts_dir: env("UPLIFT_SCRIPTS_DIR")
                .or(fc.relay.scripts_dir)
                .map_or_else(|| PathBuf::from(DEFAULT_SCRIPTS_DIR), PathBuf::from),
            action_timeout: parse_env::<u64>(&env, "UPLIFT_ACTION_TIMEOUT_SECS")?
                .or(fc.relay.action_timeout_secs)
                .map(Duration::from_secs),
        };

        Ok(Self {
            secret: SharedSecret::new(secret),
            translator,
            relay,
        })
    }
}

fn parse_env<T: std::str::FromStr>(
    env: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> Result<Option<T>>
where
    T::Err: std::fmt::Display,
{
    env(key)
        .map(|v| {
            v.parse()
                .map_err(|e| Error::Config(format!("invalid {key}={v}: {e}")))
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_secret_required() {
        let err = Config::from_sources(UpliftConfigFile::default(), env_of(&[])).unwrap_err();
        assert!(matches!(err, Error::Config(_)));

        let err = Config::from_sources(UpliftConfigFile::default(), env_of(&[("SECRET", "")]))
            .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_defaults() {
        let config =
            Config::from_sources(UpliftConfigFile::default(), env_of(&[("SECRET", "s")])).unwrap();

        assert_eq!(config.secret.expose(), "s");
        assert_eq!(config.translator.port, DEFAULT_TRANSLATOR_PORT);
        assert_eq!(config.translator.relay_url, DEFAULT_RELAY_URL);
        assert!(!config.translator.strict_relay);
        assert_eq!(config.relay.port, DEFAULT_RELAY_PORT);
        assert_eq!(config.relay.scripts_dir, PathBuf::from(DEFAULT_SCRIPTS_DIR));
        assert!(config.relay.action_timeout.is_none());
    }

    #[test]
    fn test_env_overrides_file() {
        let fc: UpliftConfigFile = toml::from_str(
            r#"
            secret = "from-file"
            [translator]
            relay_url = "http://file:5000"
            port = 9000
            [relay]
            action_timeout_secs = 30
            "#,
        )
        .unwrap();

        let config = Config::from_sources(
            fc,
            env_of(&[
                ("UPLIFT_SECRET", "from-env"),
                ("UPLIFT_RELAY_URL", "http://env:5000"),
                ("UPLIFT_STRICT_RELAY", "true"),
            ]),
        )
        .unwrap();

        assert_eq!(config.secret.expose(), "from-env");
        assert_eq!(config.translator.relay_url, "http://env:5000");
        assert_eq!(config.translator.port, 9000);
        assert!(config.translator.strict_relay);
        assert_eq!(config.relay.action_timeout, Some(Duration::from_secs(30)));
    }

    #[test]
    fn test_invalid_port() {
        let err = Config::from_sources(
            UpliftConfigFile::default(),
            env_of(&[("SECRET", "s"), ("UPLIFT_RELAY_PORT", "http")]),
        )
        .unwrap_err();
        assert!(err.to_string().contains("UPLIFT_RELAY_PORT"));
    }
}
