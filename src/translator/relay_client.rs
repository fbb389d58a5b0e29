//! Outbound client for the relay server

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;

use crate::security::SharedSecret;
use crate::{Error, Result};

/// Forwards a command to a relay route
#[async_trait]
pub trait RelayDispatch: Send + Sync {
    /// POST to a relay path
    ///
    /// # Errors
    ///
    /// Returns an error if the relay could not be reached or rejected the call
    async fn dispatch(&self, path: &str) -> Result<()>;
}

/// Relay client posting form-encoded secrets over HTTP
#[derive(Debug, Clone)]
pub struct HttpRelayClient {
    /// HTTP client
    client: Client,
    /// Base URL of the relay server, without a trailing slash
    base_url: String,
    secret: Arc<SharedSecret>,
}

impl HttpRelayClient {
    /// Create a new relay client
    ///
    /// # Arguments
    ///
    /// * `base_url` - Relay server URL (e.g., <http://raspberrypi.local:5000>)
    /// * `secret` - Shared secret sent with every command
    #[must_use]
    pub fn new(base_url: impl Into<String>, secret: Arc<SharedSecret>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            client: Client::new(),
            base_url,
            secret,
        }
    }

    #[must_use]
    pub fn url_for(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}

#[async_trait]
impl RelayDispatch for HttpRelayClient {
    async fn dispatch(&self, path: &str) -> Result<()> {
        let url = self.url_for(path);
        tracing::debug!(%url, "posting relay command");

        let response = self
            .client
            .post(&url)
            .form(&[("secret", self.secret.expose())])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Relay(format!("{path}: {status} - {body}")));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_for_trims_trailing_slash() {
        let client = HttpRelayClient::new(
            "http://relay.local:5000/",
            Arc::new(SharedSecret::new("x")),
        );
        assert_eq!(client.url_for("/tvon"), "http://relay.local:5000/tvon");
    }
}
