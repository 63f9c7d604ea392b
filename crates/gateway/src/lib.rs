//! HTTP API gateway for Chatfolio.
//!
//! Exposes the portfolio chat endpoint plus banner, health and knowledge
//! summary routes. Built on Axum; CORS, body limits, panic recovery and
//! request tracing come from `tower-http` layers.

pub mod error;
pub mod handlers;
pub mod validate;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::middleware;
use axum::http::{HeaderValue, Method, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use chatfolio_config::{AppConfig, GatewayConfig};
use chatfolio_knowledge::KnowledgeRecord;
use chatfolio_providers::CompletionClient;
use std::any::Any;
use std::sync::Arc;
use std::time::Duration;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use crate::error::ApiError;

/// Largest accepted request body.
pub const BODY_LIMIT_BYTES: usize = 64 * 1024;

/// Shared, read-only state for every request.
pub struct GatewayState {
    pub knowledge: Arc<KnowledgeRecord>,
    pub completion: CompletionClient,
    /// Include raw error detail in error responses
    pub debug: bool,
}

impl GatewayState {
    pub fn new(knowledge: Arc<KnowledgeRecord>, completion: CompletionClient, debug: bool) -> Self {
        Self {
            knowledge,
            completion,
            debug,
        }
    }
}

pub type SharedState = Arc<GatewayState>;

/// Build the router with all routes and middleware.
pub fn build_router(state: SharedState, gateway: &GatewayConfig) -> Router {
    let debug = state.debug;
    let routes = Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .route("/api/knowledge", get(handlers::knowledge))
        .route(handlers::CHAT_PATH, post(handlers::chat))
        .with_state(state);
    with_middleware(routes, &gateway.allowed_origins, debug)
}

/// Layers applied to every route:
/// - request body limit (64 KiB)
/// - panic recovery into a 500 JSON body
/// - CORS with an explicit origin allow-list
/// - the `{"status":"ok"}` body on `OPTIONS /api/chat`
/// - HTTP trace logging
fn with_middleware(router: Router, allowed_origins: &[String], debug: bool) -> Router {
    router
        .layer(DefaultBodyLimit::max(BODY_LIMIT_BYTES))
        .layer(CatchPanicLayer::custom(
            move |panic: Box<dyn Any + Send + 'static>| panic_response(panic, debug),
        ))
        .layer(cors_layer(allowed_origins))
        .layer(middleware::from_fn(handlers::chat_preflight))
        .layer(TraceLayer::new_for_http())
}

/// CORS policy for browser clients. Origins that are not valid header values
/// are skipped.
pub fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(origin = %origin, error = %e, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT])
        .max_age(Duration::from_secs(3600))
}

fn panic_response(panic: Box<dyn Any + Send + 'static>, debug: bool) -> Response {
    let detail = if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else {
        "unknown panic".to_string()
    };
    error!(panic = %detail, "Handler panicked");
    ApiError::internal(detail, debug).into_response()
}

/// Start the gateway HTTP server.
///
/// The knowledge record and completion client are built once and shared by
/// every request. A missing API key is logged but does not stop startup; chat
/// requests then fail with a configuration error.
pub async fn start(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let addr = format!("{}:{}", config.gateway.host, config.gateway.port);

    let knowledge = Arc::new(KnowledgeRecord::load(config.knowledge.path.as_deref())?);
    let completion = CompletionClient::from_config(&config)?;
    if !completion.is_configured() {
        error!("API key is not configured; chat requests will fail until one is set");
    }

    let state = Arc::new(GatewayState::new(
        knowledge,
        completion,
        config.gateway.debug,
    ));
    let app = build_router(state, &config.gateway);

    info!(
        addr = %addr,
        model = %config.model,
        debug = config.gateway.debug,
        "Gateway starting"
    );
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Gateway stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
