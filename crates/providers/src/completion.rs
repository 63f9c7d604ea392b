//! The completion client: one system prompt plus one user message in, one
//! generated answer (or one classified failure) out.
//!
//! Flow: credential precondition → fixed request → `RetryPolicy` →
//! classify the last error once → reject empty answers.

use chatfolio_config::AppConfig;
use chatfolio_core::error::{CompletionError, ProviderError};
use chatfolio_core::message::Message;
use chatfolio_core::provider::{Provider, ProviderRequest};
use std::sync::Arc;
use tracing::{error, info};

use crate::retry::RetryPolicy;

/// Fixed parameters sent with every completion request.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionSettings {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl CompletionSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        }
    }
}

impl Default for CompletionSettings {
    fn default() -> Self {
        Self::from_config(&AppConfig::default())
    }
}

pub struct CompletionClient {
    provider: Arc<dyn Provider>,
    settings: CompletionSettings,
    retry: RetryPolicy,
}

impl CompletionClient {
    pub fn new(provider: Arc<dyn Provider>, settings: CompletionSettings, retry: RetryPolicy) -> Self {
        Self {
            provider,
            settings,
            retry,
        }
    }

    /// Build the client against the configured OpenAI-compatible endpoint.
    pub fn from_config(config: &AppConfig) -> Result<Self, ProviderError> {
        let provider = crate::build_from_config(config)?;
        Ok(Self::new(
            provider,
            CompletionSettings::from_config(config),
            RetryPolicy::from_config(&config.retry),
        ))
    }

    pub fn is_configured(&self) -> bool {
        self.provider.is_configured()
    }

    pub fn provider(&self) -> &Arc<dyn Provider> {
        &self.provider
    }

    /// Generate an answer to `user_message` under `system_prompt`.
    pub async fn complete(
        &self,
        system_prompt: &str,
        user_message: &str,
    ) -> Result<String, CompletionError> {
        if !self.provider.is_configured() {
            error!(provider = %self.provider.name(), "API key is not configured");
            return Err(CompletionError::Config("API key is not configured".into()));
        }

        let request = ProviderRequest {
            model: self.settings.model.clone(),
            messages: vec![Message::system(system_prompt), Message::user(user_message)],
            temperature: self.settings.temperature,
            max_tokens: Some(self.settings.max_tokens),
        };

        let result = self
            .retry
            .run(|attempt| {
                info!(
                    provider = %self.provider.name(),
                    model = %request.model,
                    attempt,
                    "Attempting completion call"
                );
                self.provider.complete(request.clone())
            })
            .await;

        let response = match result {
            Ok(response) => response,
            Err(e) => {
                let kind = CompletionError::from_provider(&e);
                error!(error = %e, kind = ?kind, "Completion call failed");
                return Err(kind);
            }
        };

        if response.message.content.is_empty() {
            error!(model = %response.model, "Empty response from completion API");
            return Err(CompletionError::EmptyResponse);
        }

        info!(
            model = %response.model,
            total_tokens = response.usage.as_ref().map(|u| u.total_tokens),
            "Completion call successful"
        );
        Ok(response.message.content)
    }
}
