//! LLM provider implementations for Chatfolio.
//!
//! `OpenAiCompatProvider` implements the `chatfolio_core::Provider` trait;
//! `CompletionClient` wraps a provider with the fixed request shape, the
//! retry policy, and error classification.

pub mod completion;
pub mod openai_compat;
pub mod retry;

pub use completion::{CompletionClient, CompletionSettings};
pub use openai_compat::OpenAiCompatProvider;
pub use retry::RetryPolicy;

use chatfolio_core::error::ProviderError;
use chatfolio_core::provider::Provider;
use std::sync::Arc;

/// Build the configured provider.
///
/// A missing API key is not an error here: the provider is created
/// unconfigured and every completion through it fails fast.
pub fn build_from_config(
    config: &chatfolio_config::AppConfig,
) -> Result<Arc<dyn Provider>, ProviderError> {
    let provider = OpenAiCompatProvider::new(
        "openai",
        config.api_base_url.clone(),
        config.api_key.clone(),
    )?;
    Ok(Arc::new(provider))
}
