//! HTTP API server and chat UI.
//!
//! Exposes the chat endpoint consumed by the embedded single-page UI:
//!
//! - `POST /api/chat` - generate a response for a conversation
//! - `GET /api/chat` - fixed liveness string
//! - `GET /health` - health check
//! - `GET /` - the chat UI

use crate::chat::ChatEngine;
use crate::completion::Message;
use crate::error::PaddockError;
use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::error;

/// Fixed liveness string returned by `GET /api/chat`.
pub const LIVENESS_MESSAGE: &str = "API is working! send a POST request to chat.";

static INDEX_HTML: &str = include_str!("../../assets/index.html");

/// Shared application state.
struct AppState {
    engine: ChatEngine,
}

/// Build the application router around an engine.
///
/// The engine is injected so tests can substitute fakes for the embedder,
/// store, and model.
pub fn router(engine: ChatEngine) -> Router {
    let state = Arc::new(AppState { engine });

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/api/chat", get(liveness).post(chat))
        .layer(cors)
        .with_state(state)
}

// === Request/Response Types ===

#[derive(Deserialize)]
struct ChatRequest {
    messages: Vec<Message>,
}

#[derive(Serialize)]
struct ChatResponse {
    content: String,
}

// === Handlers ===

async fn index() -> impl IntoResponse {
    Html(INDEX_HTML)
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

/// Liveness probe; answers regardless of provider availability.
async fn liveness() -> impl IntoResponse {
    LIVENESS_MESSAGE
}

async fn chat(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ChatRequest>,
) -> impl IntoResponse {
    match state.engine.respond(&req.messages).await {
        Ok(content) => Json(ChatResponse { content }).into_response(),
        Err(PaddockError::InvalidInput(e)) => (StatusCode::BAD_REQUEST, e).into_response(),
        Err(e) => {
            error!("Error handling chat request: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
        }
    }
}
