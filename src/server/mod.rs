//! HTTP surface for the orchestration layer.
//!
//! Every `/api/ai/*` route marshals JSON (and base64 media) into a
//! [`GenerationRequest`], dispatches it through the [`Orchestrator`], and maps
//! any failure to `500 {"error": ...}`.

mod routes;

use crate::gateway::Orchestrator;
use crate::models::{GenerationRequest, GenerationResult};
use crate::{Error, Result};
use axum::body::Body;
use axum::extract::DefaultBodyLimit;
use axum::http::{Request, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;
use tracing::info;
use uuid::Uuid;

/// Base64 media makes bodies large.
pub const MAX_BODY_BYTES: usize = 50 * 1024 * 1024;

#[derive(Clone)]
pub struct AppState {
    orchestrator: Arc<Orchestrator>,
    request_timeout: Duration,
    shutdown: CancellationToken,
}

impl AppState {
    pub fn new(
        orchestrator: Arc<Orchestrator>,
        request_timeout: Duration,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            orchestrator,
            request_timeout,
            shutdown,
        }
    }

    /// Dispatch with the per-request deadline. Video waits are bounded by the
    /// poll policy instead and only end early on shutdown.
    async fn generate(&self, request: GenerationRequest) -> Result<GenerationResult> {
        let deadline = match request {
            GenerationRequest::Video(_) => None,
            _ => Some(Instant::now() + self.request_timeout),
        };
        let cancel = self.shutdown.child_token();
        self.orchestrator
            .dispatch_with_deadline(request, deadline, &cancel)
            .await
    }
}

/// Wrapper that renders any orchestration error as `500 {"error": ...}`.
#[derive(Debug)]
pub struct ApiError(Error);

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({ "error": self.0.to_string() })),
        )
            .into_response()
    }
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;

pub fn build_router(state: AppState) -> Router {
    let api = Router::new()
        .route("/text", post(routes::text))
        .route("/image", post(routes::image))
        .route("/analyze", post(routes::analyze))
        .route("/edit", post(routes::edit))
        .route("/code", post(routes::code))
        .route("/chat", post(routes::chat))
        .route("/trip-plan", post(routes::trip_plan))
        .route("/trip-extra", post(routes::trip_extra))
        .route("/video", post(routes::video))
        .route("/tts", post(routes::tts))
        .route("/transcribe", post(routes::transcribe))
        .route("/multimodal", post(routes::multimodal))
        .route("/voice-chat", post(routes::voice_chat));

    Router::new()
        .nest("/api/ai", api)
        .route("/health", get(health_check))
        .with_state(state)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                tracing::info_span!(
                    "request",
                    id = %Uuid::new_v4(),
                    method = %request.method(),
                    uri = %request.uri(),
                )
            }),
        )
}

async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, Json(serde_json::json!({ "status": "ok" })))
}

/// Serve until `shutdown` fires. Cancelling it also ends in-flight video waits.
pub async fn serve(listener: TcpListener, state: AppState) -> std::io::Result<()> {
    let shutdown = state.shutdown.clone();
    info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
}
