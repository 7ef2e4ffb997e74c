use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use tracing::{info, warn};

use crate::domains::envelope::{open_envelope, Envelope};
use crate::domains::message::AgentMessage;
use crate::error::{AgentverseError, Result};
use crate::identity::AgentIdentity;
use crate::interfaces::handler::MessageHandler;

#[derive(Clone)]
pub struct InboxState {
    pub address: String,
    pub handler: Arc<dyn MessageHandler>,
}

pub struct LoggingHandler;

#[async_trait]
impl MessageHandler for LoggingHandler {
    async fn handle(&self, message: AgentMessage) -> Result<()> {
        info!(
            sender = %message.sender,
            target = %message.target,
            payload = %message.payload,
            "message received"
        );
        Ok(())
    }
}

#[derive(Serialize)]
struct StatusResponse {
    status: String,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

pub fn build_router(state: InboxState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/submit", post(submit))
        .with_state(state)
}

async fn health() -> Json<StatusResponse> {
    Json(StatusResponse {
        status: "ok".to_string(),
    })
}

fn reject(status: StatusCode, error: String) -> Response {
    (status, Json(ErrorResponse { error })).into_response()
}

async fn submit(State(state): State<InboxState>, body: Bytes) -> Response {
    let content = match std::str::from_utf8(&body) {
        Ok(content) => content,
        Err(err) => return reject(StatusCode::BAD_REQUEST, err.to_string()),
    };
    let envelope = match Envelope::from_json(content) {
        Ok(envelope) => envelope,
        Err(err) => return reject(StatusCode::BAD_REQUEST, err.to_string()),
    };
    if envelope.target != state.address {
        warn!(target = %envelope.target, "envelope addressed to another agent");
        return reject(
            StatusCode::BAD_REQUEST,
            format!("envelope is addressed to {}", envelope.target),
        );
    }

    let session = envelope.session;
    let message = match open_envelope::<AgentIdentity>(envelope) {
        Ok(message) => message,
        Err(err @ (AgentverseError::InvalidSignature(_) | AgentverseError::Config(_))) => {
            warn!(session = %session, error = %err, "rejected envelope");
            return reject(StatusCode::UNAUTHORIZED, err.to_string());
        }
        Err(err) => return reject(StatusCode::BAD_REQUEST, err.to_string()),
    };

    info!(sender = %message.sender, session = %session, "envelope accepted");
    match state.handler.handle(message).await {
        Ok(()) => (
            StatusCode::OK,
            Json(StatusResponse {
                status: "ok".to_string(),
            }),
        )
            .into_response(),
        Err(err) => reject(StatusCode::INTERNAL_SERVER_ERROR, err.to_string()),
    }
}

pub async fn run(host: &str, port: u16, state: InboxState) -> Result<()> {
    run_with_shutdown(host, port, state, std::future::pending::<()>()).await
}

pub async fn run_with_shutdown<F>(host: &str, port: u16, state: InboxState, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let listener = tokio::net::TcpListener::bind((host, port))
        .await
        .map_err(|e| AgentverseError::Io(e.to_string()))?;
    info!(host = %host, port = port, address = %state.address, "inbox listening");
    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| AgentverseError::Io(e.to_string()))
}
