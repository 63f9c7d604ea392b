//! Error types for the Chatfolio domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Provider-level failures (`ProviderError`) are classified exactly once into
//! the closed `CompletionError` set before they leave the providers crate.

use thiserror::Error;

/// Raw failure modes reported by a completion provider.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),
}

/// The closed set of failure kinds a completion call can end in.
///
/// The gateway picks an HTTP status and a user-facing message from the
/// variant alone; the payload is diagnostic detail that is only shown to
/// callers in debug mode.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompletionError {
    /// Credential missing or rejected.
    #[error("{0}")]
    Config(String),

    /// The provider refused the call because of rate limiting.
    #[error("{0}")]
    RateLimited(String),

    /// Any other provider-side or transport failure.
    #[error("{0}")]
    UpstreamUnavailable(String),

    /// The call succeeded but carried no usable text.
    #[error("Empty response from AI service")]
    EmptyResponse,
}

impl CompletionError {
    /// Classify the final, unrecovered provider error.
    pub fn from_provider(err: &ProviderError) -> Self {
        match err {
            ProviderError::AuthenticationFailed(_) => {
                Self::Config("API key is invalid or expired".into())
            }
            ProviderError::NotConfigured(_) => Self::Config("API key is not configured".into()),
            ProviderError::RateLimited { .. } => {
                Self::RateLimited("API rate limit exceeded".into())
            }
            ProviderError::ApiError { .. } => {
                Self::UpstreamUnavailable("API is currently experiencing issues".into())
            }
            other => Self::UpstreamUnavailable(other.to_string()),
        }
    }
}

impl From<ProviderError> for CompletionError {
    fn from(err: ProviderError) -> Self {
        Self::from_provider(&err)
    }
}
