//! Route handlers.

use axum::Json;
use axum::body::Bytes;
use axum::extract::rejection::BytesRejection;
use axum::extract::{Request, State};
use axum::http::{Method, StatusCode, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use chatfolio_knowledge::{KnowledgeSummary, build_system_prompt};
use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::SharedState;
use crate::error::ApiError;
use crate::validate::{ValidationError, validate_input};

pub const CHAT_PATH: &str = "/api/chat";

/// Characters of the user message echoed into the logs.
const LOG_PREVIEW_CHARS: usize = 50;

#[derive(Debug, Serialize)]
pub struct BannerResponse {
    pub status: String,
    pub version: &'static str,
    pub description: String,
}

pub async fn root(State(state): State<SharedState>) -> Json<BannerResponse> {
    let name = &state.knowledge.personal_info.name;
    Json(BannerResponse {
        status: format!("{name} Portfolio Chatbot API"),
        version: env!("CARGO_PKG_VERSION"),
        description: format!("AI assistant with knowledge about {name}'s portfolio and experience"),
    })
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    /// Unix seconds with sub-second precision
    pub timestamp: f64,
    pub service: String,
}

pub async fn health(State(state): State<SharedState>) -> Json<HealthResponse> {
    let now = chrono::Utc::now();
    Json(HealthResponse {
        status: "healthy",
        timestamp: now.timestamp_micros() as f64 / 1_000_000.0,
        service: format!("{} Portfolio Chatbot", state.knowledge.personal_info.name),
    })
}

#[derive(Debug, Serialize)]
pub struct KnowledgeResponse {
    pub status: &'static str,
    pub data: KnowledgeSummary,
}

pub async fn knowledge(State(state): State<SharedState>) -> Json<KnowledgeResponse> {
    Json(KnowledgeResponse {
        status: "success",
        data: state.knowledge.summary(),
    })
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: &'static str,
}

/// Body for `OPTIONS /api/chat`.
///
/// The CORS layer answers every OPTIONS request itself with an empty body, so
/// this runs outside it and fills that body in, keeping the CORS headers. The
/// completion client is never reached.
pub async fn chat_preflight(req: Request, next: Next) -> Response {
    let is_chat_options = req.method() == Method::OPTIONS && req.uri().path() == CHAT_PATH;
    let response = next.run(req).await;
    if !is_chat_options || !response.status().is_success() {
        return response;
    }

    let (mut parts, _) = response.into_parts();
    parts.headers.remove(header::CONTENT_LENGTH);
    let body = Json(StatusResponse { status: "ok" }).into_response();
    let (body_parts, body) = body.into_parts();
    parts.headers.extend(body_parts.headers);
    Response::from_parts(parts, body)
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub response: String,
    pub status: &'static str,
}

pub async fn chat(
    State(state): State<SharedState>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<ChatResponse>, ApiError> {
    info!("Received chat request");

    let body = body.map_err(|rejection| {
        warn!(error = %rejection, "Failed to read chat request body");
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ApiError::new(StatusCode::PAYLOAD_TOO_LARGE, "Request body too large")
        } else {
            ApiError::from(ValidationError::InvalidFormat)
        }
    })?;
    debug!(bytes = body.len(), "Request body received");

    let message = validate_input(&body)?;
    let preview: String = message.chars().take(LOG_PREVIEW_CHARS).collect();
    info!(preview = %preview, "Processing message");

    let system_prompt = build_system_prompt(&state.knowledge).map_err(|e| {
        error!(error = %e, "Failed to render system prompt");
        ApiError::internal(e, state.debug)
    })?;

    let answer = state
        .completion
        .complete(&system_prompt, &message)
        .await
        .map_err(|e| ApiError::from_completion(e, state.debug))?;

    info!(chars = answer.chars().count(), "Successfully generated response");
    Ok(Json(ChatResponse {
        response: answer,
        status: "success",
    }))
}
