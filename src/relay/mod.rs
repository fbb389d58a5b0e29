//! Relay server: HTTP-to-hardware bridge
//!
//! Exposes one POST route per (appliance, action) pair. Each request must
//! carry the shared secret in a form field; on a match exactly one control
//! script is run and the literal acknowledgment `OK` is returned.

pub mod action;
pub mod routes;

use std::sync::Arc;

use axum::{
    Form, Json, Router,
    extract::{State, rejection::FormRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

pub use action::{ActionRunner, ScriptRunner};
pub use routes::{ROUTES, RelayRoute};

use crate::api::health;
use crate::security::SharedSecret;
use crate::{Error, Result};

/// Body returned by every successful relay call
pub const ACKNOWLEDGMENT: &str = "OK";

/// Shared state for relay handlers
pub struct RelayState {
    pub secret: Arc<SharedSecret>,
    pub runner: Arc<dyn ActionRunner>,
}

/// Form body posted by the translator
#[derive(Debug, Deserialize)]
pub struct SecretForm {
    #[serde(default, alias = "SECRET")]
    pub secret: Option<String>,
}

/// Build the relay router with every route in [`ROUTES`]
pub fn router(state: Arc<RelayState>) -> Router {
    let mut router: Router<Arc<RelayState>> = Router::new();

    for route in ROUTES {
        let action = route.action;
        router = router.route(
            route.path,
            post(
                move |state: State<Arc<RelayState>>,
                      form: std::result::Result<Form<SecretForm>, FormRejection>| {
                    invoke(state, action, form)
                },
            ),
        );
    }

    router
        .with_state(state)
        .merge(health::router())
        .layer(TraceLayer::new_for_http())
}

/// Authorize and run one bound action
///
/// A body that is not a readable form carries no secret.
async fn invoke(
    State(state): State<Arc<RelayState>>,
    action: &'static str,
    form: std::result::Result<Form<SecretForm>, FormRejection>,
) -> std::result::Result<&'static str, RelayError> {
    let provided = match form {
        Ok(Form(form)) => form.secret,
        Err(rejection) => {
            tracing::debug!(action, error = %rejection, "unreadable relay form");
            None
        }
    };

    if let Err(e) = state.secret.verify(provided.as_deref()) {
        tracing::warn!(action, error = %e, "rejected relay request");
        return Err(RelayError(e));
    }

    tracing::info!(action, "relay request authorized");

    state.runner.run(action).await.map_err(|e| {
        tracing::error!(action, error = %e, "hardware action failed");
        RelayError(e)
    })?;

    Ok(ACKNOWLEDGMENT)
}

/// Relay error mapped onto an HTTP response
#[derive(Debug)]
pub struct RelayError(pub Error);

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        #[derive(Serialize)]
        struct ErrorResponse {
            error: ErrorBody,
        }

        #[derive(Serialize)]
        struct ErrorBody {
            code: &'static str,
            message: String,
        }

        let (status, code) = match &self.0 {
            Error::Authorization(_) => (StatusCode::FORBIDDEN, "forbidden"),
            Error::HardwareInvocation { .. } => (StatusCode::BAD_GATEWAY, "hardware_failed"),
            _ => (StatusCode::INTERNAL_SERVER_ERROR, "internal"),
        };

        // Authorization failures never echo what the caller sent
        let message = match &self.0 {
            Error::Authorization(_) => "invalid secret".to_string(),
            other => other.to_string(),
        };

        let body = ErrorResponse {
            error: ErrorBody { code, message },
        };
        (status, Json(body)).into_response()
    }
}

/// Relay HTTP server
pub struct RelayServer {
    state: Arc<RelayState>,
    port: u16,
}

impl RelayServer {
    #[must_use]
    pub fn new(secret: Arc<SharedSecret>, runner: Arc<dyn ActionRunner>, port: u16) -> Self {
        Self {
            state: Arc::new(RelayState { secret, runner }),
            port,
        }
    }

    /// Run the relay server until the process is terminated
    ///
    /// # Errors
    ///
    /// Returns error if the server fails to bind or run
    pub async fn run(self) -> Result<()> {
        let addr = format!("0.0.0.0:{}", self.port);
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|e| Error::Config(format!("failed to bind relay server: {e}")))?;

        tracing::info!(port = self.port, routes = ROUTES.len(), "relay server listening");

        axum::serve(listener, router(self.state))
            .await
            .map_err(|e| Error::Config(format!("relay server error: {e}")))?;

        Ok(())
    }
}
