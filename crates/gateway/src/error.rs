//! Mapping from internal failures to HTTP error responses.
//!
//! Every failure leaves the gateway as `{ "error": ..., "details": ... }`
//! with a fixed, caller-safe `error` string. `details` carries raw diagnostic
//! text and is only filled in when the gateway runs in debug mode.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use chatfolio_core::error::CompletionError;
use serde::Serialize;
use std::fmt::Display;

use crate::validate::ValidationError;

pub const CONFIG_ERROR: &str = "Service configuration error. Please contact support.";
pub const RATE_LIMITED: &str = "Service is busy. Please try again in a few minutes.";
pub const UPSTREAM_UNAVAILABLE: &str =
    "AI service is temporarily unavailable. Please try again in a few minutes.";
pub const EMPTY_RESPONSE: &str = "Unable to generate response. Please try again.";
pub const INTERNAL_ERROR: &str = "An unexpected error occurred. Please try again later.";

/// JSON body of every error response.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    error: String,
    details: Option<String>,
}

impl ApiError {
    pub fn new(status: StatusCode, error: impl Into<String>) -> Self {
        Self {
            status,
            error: error.into(),
            details: None,
        }
    }

    fn with_details(mut self, details: Option<String>) -> Self {
        self.details = details;
        self
    }

    /// Map a classified completion failure. `debug` gates raw detail.
    pub fn from_completion(err: CompletionError, debug: bool) -> Self {
        let gated = |detail: String| debug.then_some(detail);
        match err {
            CompletionError::Config(_) => Self::new(StatusCode::SERVICE_UNAVAILABLE, CONFIG_ERROR)
                .with_details(gated("API key issue".into())),
            CompletionError::RateLimited(_) => {
                Self::new(StatusCode::SERVICE_UNAVAILABLE, RATE_LIMITED)
                    .with_details(gated("Rate limit exceeded".into()))
            }
            CompletionError::UpstreamUnavailable(detail) => {
                Self::new(StatusCode::SERVICE_UNAVAILABLE, UPSTREAM_UNAVAILABLE)
                    .with_details(gated(detail))
            }
            // The detail here is a fixed sentence, not raw error text.
            CompletionError::EmptyResponse => {
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, EMPTY_RESPONSE)
                    .with_details(Some(CompletionError::EmptyResponse.to_string()))
            }
        }
    }

    /// An unanticipated failure inside the gateway itself.
    pub fn internal(err: impl Display, debug: bool) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR)
            .with_details(debug.then(|| err.to_string()))
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.error
    }

    pub fn details(&self) -> Option<&str> {
        self.details.as_deref()
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        Self::new(StatusCode::BAD_REQUEST, err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.error,
            details: self.details,
        };
        (self.status, Json(body)).into_response()
    }
}
