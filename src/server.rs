//! HTTP chat server.
//!
//! Serves the browser chat page and a JSON endpoint that runs each question
//! through the shared [`Assistant`].
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET`  | `/` | Static chat page |
//! | `POST` | `/chat` | `{"query": "..."}` → `{"answer": "..."}` |
//! | `GET`  | `/health` | Health check (returns version) |
//!
//! # Status codes
//!
//! `POST /chat` answers `400` with `"Please enter a question."` when the
//! query is blank, missing, or the body is not a JSON object with a string
//! `query`. Every other question gets `200`, including the fallback reply.
//!
//! # CORS
//!
//! All origins, methods, and headers are permitted so the page can be served
//! from elsewhere during development.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::Html,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::assistant::{Assistant, EMPTY_QUESTION_MESSAGE};
use crate::config::Config;
use crate::models::Question;

const CHAT_PAGE: &str = include_str!("../assets/chat.html");

/// Shared application state passed to all route handlers via Axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    assistant: Arc<Assistant>,
}

impl AppState {
    pub fn new(assistant: Arc<Assistant>) -> Self {
        Self { assistant }
    }
}

/// Starts the chat server on `[server].bind` and runs until the process exits.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let bind_addr = config.server.bind.clone();
    let state = AppState::new(Arc::new(Assistant::from_config(config)));

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!(
        bind = %bind_addr,
        knowledge_root = %config.knowledge.root.display(),
        "chat server listening"
    );
    println!("Chat server listening on http://{}", bind_addr);

    axum::serve(listener, router(state)).await?;

    Ok(())
}

/// Builds the route table. Exposed so tests can drive it without a socket.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(handle_home))
        .route("/chat", post(handle_chat))
        .route("/health", get(handle_health))
        .layer(cors)
        .with_state(state)
}

// ============ GET / ============

async fn handle_home() -> Html<&'static str> {
    Html(CHAT_PAGE)
}

// ============ POST /chat ============

/// Request body for `POST /chat`. A missing `query` is treated as blank.
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub query: Option<String>,
}

/// Response body for `POST /chat`.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatResponse {
    pub answer: String,
}

async fn handle_chat(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> (StatusCode, Json<ChatResponse>) {
    let raw = match &payload {
        Ok(Json(req)) => req.query.as_deref(),
        Err(rejection) => {
            tracing::debug!(error = %rejection, "unreadable chat request body");
            None
        }
    };

    let Some(question) = Question::parse(raw) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(ChatResponse {
                answer: EMPTY_QUESTION_MESSAGE.to_string(),
            }),
        );
    };

    let answer = state.assistant.answer(&question);
    (
        StatusCode::OK,
        Json(ChatResponse {
            answer: answer.text(),
        }),
    )
}

// ============ GET /health ============

/// JSON response body for `GET /health`.
#[derive(Serialize)]
struct HealthResponse {
    /// Always `"ok"` when the server is running.
    status: String,
    /// The crate version from `Cargo.toml`.
    version: String,
}

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
