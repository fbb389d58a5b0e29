//! HTTP API for the directive translator

pub mod health;

use std::sync::Arc;

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
};
use serde_json::Value;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::directive::{ErrorType, ResponseEnvelope};
use crate::translator::Translator;
use crate::{Error, Result};

/// Build the translator router
pub fn router(translator: Arc<Translator>) -> Router {
    Router::new()
        .route("/directive", post(handle_directive))
        .with_state(translator)
        .merge(health::router())
        .layer(TraceLayer::new_for_http())
}

/// Handle one directive, answering errors with an error envelope
async fn handle_directive(
    State(translator): State<Arc<Translator>>,
    body: Bytes,
) -> Response {
    let raw: Value = match serde_json::from_slice(&body) {
        Ok(raw) => raw,
        Err(e) => {
            tracing::warn!(error = %e, "directive body is not JSON");
            let envelope = ResponseEnvelope::error(
                ErrorType::InvalidDirective,
                &format!("body is not JSON: {e}"),
                &Value::Null,
            );
            return (StatusCode::BAD_REQUEST, Json(envelope)).into_response();
        }
    };

    match translator.handle(&raw).await {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(e) => {
            let (status, kind) = classify(&e);
            let envelope = ResponseEnvelope::error(kind, &e.to_string(), &raw);
            (status, Json(envelope)).into_response()
        }
    }
}

/// Map a translator error to its HTTP status and envelope error type
#[must_use]
pub fn classify(error: &Error) -> (StatusCode, ErrorType) {
    match error {
        Error::Schema(_) => (StatusCode::BAD_REQUEST, ErrorType::InvalidDirective),
        Error::UnknownAppliance(_) => (StatusCode::NOT_FOUND, ErrorType::NoSuchEndpoint),
        Error::Relay(_) | Error::Http(_) => {
            (StatusCode::BAD_GATEWAY, ErrorType::EndpointUnreachable)
        }
        _ => (StatusCode::INTERNAL_SERVER_ERROR, ErrorType::InternalError),
    }
}

/// Translator HTTP server
pub struct ApiServer {
    translator: Arc<Translator>,
    port: u16,
}

impl ApiServer {
    #[must_use]
    pub const fn new(translator: Arc<Translator>, port: u16) -> Self {
        Self { translator, port }
    }

    /// Run the API server
    ///
    /// # Errors
    ///
    /// Returns error if server fails to bind or run
    pub async fn run(self) -> Result<()> {
        let addr = format!("0.0.0.0:{}", self.port);
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|e| Error::Config(format!("failed to bind API server: {e}")))?;

        tracing::info!(port = self.port, "translator listening");

        axum::serve(listener, router(self.translator))
            .await
            .map_err(|e| Error::Config(format!("API server error: {e}")))?;

        Ok(())
    }
}
