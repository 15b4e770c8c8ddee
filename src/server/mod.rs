//! Thin HTTP surface over the notification manager: webhook registration and
//! a health probe. Everything else the pipeline does is driven through the
//! broker's `publish` by the embedding application.

pub mod message;

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use tracing::info;

use crate::notify::NotificationManager;
use crate::server::message::{SubscribeRequest, SubscribeResponse};
use crate::utils::error::NotifyError;

/// JSON error body returned by the registration endpoints.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status: u16,
}

impl IntoResponse for NotifyError {
    fn into_response(self) -> Response {
        let (status, error) = match &self {
            NotifyError::UnknownTopic(_) => (StatusCode::NOT_FOUND, "unknown_topic"),
            _ => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
        };

        let body = ErrorResponse {
            error: error.to_string(),
            message: self.to_string(),
            status: status.as_u16(),
        };

        (status, Json(body)).into_response()
    }
}

pub fn router(manager: Arc<NotificationManager>) -> Router {
    Router::new()
        .route("/subscriptions", post(subscribe))
        .route("/health", get(health))
        .with_state(manager)
}

/// Binds the registration server and serves until the process exits.
pub async fn start_server(addr: &str, manager: Arc<NotificationManager>) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(addr, "registration server listening");

    axum::serve(listener, router(manager)).await
}

async fn subscribe(
    State(manager): State<Arc<NotificationManager>>,
    Json(req): Json<SubscribeRequest>,
) -> Result<(StatusCode, Json<SubscribeResponse>), NotifyError> {
    let subscriber = manager
        .subscribe(&req.topic, &req.callback, req.secret)
        .await?;

    Ok((StatusCode::ACCEPTED, Json(subscriber.into())))
}

async fn health() -> StatusCode {
    StatusCode::OK
}
