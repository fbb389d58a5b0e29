//! Shared-secret handling between the translator and the relay server

use secrecy::{ExposeSecret, SecretString};

use crate::{Error, Result};

/// Process-wide secret sent by the translator and checked by the relay
#[derive(Debug)]
pub struct SharedSecret(SecretString);

impl SharedSecret {
    #[must_use]
    pub fn new(secret: impl Into<String>) -> Self {
        Self(SecretString::from(secret.into()))
    }

    /// Raw value, for placing into an outbound form body only
    #[must_use]
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }

    /// Check a caller-provided secret
    ///
    /// # Errors
    ///
    /// Returns `Error::Authorization` if the secret is missing or does not match
    pub fn verify(&self, provided: Option<&str>) -> Result<()> {
        let Some(provided) = provided else {
            return Err(Error::Authorization("no secret provided".to_string()));
        };

        if constant_time_eq(self.expose().as_bytes(), provided.as_bytes()) {
            Ok(())
        } else {
            Err(Error::Authorization("secrets don't match".to_string()))
        }
    }
}

/// Constant-time byte comparison to prevent timing attacks
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        result |= x ^ y;
    }
    result == 0
}
