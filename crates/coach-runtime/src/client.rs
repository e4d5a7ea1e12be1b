//! The text-generation client.
//!
//! One call in, one completion out. The client bounds every call with the
//! configured timeout and turns blank completions into errors, but it never
//! retries: falling back is decided by the strategies and the orchestrator.

use std::sync::Arc;

use crate::config::{CallKind, GenerationSettings};
use crate::providers::{ChatMessage, LlmProvider, ProviderError, TokenUsage};

/// Text produced by one successful call.
#[derive(Debug, Clone)]
pub struct Generation {
    pub text: String,
    pub usage: TokenUsage,
    pub model: String,
}

/// Narrow text-generation capability shared by all strategies of a pipeline.
pub struct TextGenerationClient {
    provider: Arc<dyn LlmProvider>,
    settings: GenerationSettings,
}

impl std::fmt::Debug for TextGenerationClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextGenerationClient")
            .field("provider", &self.provider.name())
            .field("settings", &self.settings)
            .finish()
    }
}

impl TextGenerationClient {
    pub fn new(provider: Arc<dyn LlmProvider>, settings: GenerationSettings) -> Self {
        Self { provider, settings }
    }

    pub fn settings(&self) -> &GenerationSettings {
        &self.settings
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Token budget configured for a kind of call.
    pub fn budget(&self, kind: CallKind) -> u32 {
        self.settings.budgets.for_call(kind)
    }

    pub async fn health_check(&self) -> bool {
        self.provider.health_check().await
    }

    /// Generate text for one prompt.
    ///
    /// Fails with [`ProviderError::InvalidRequest`] for a blank prompt or a
    /// zero token budget, [`ProviderError::Timeout`] when the call outlives
    /// the configured timeout and [`ProviderError::EmptyCompletion`] when the
    /// service answers with no text.
    pub async fn generate(
        &self,
        system_instruction: &str,
        user_prompt: &str,
        max_tokens: u32,
        temperature: f32,
    ) -> Result<Generation, ProviderError> {
        if user_prompt.trim().is_empty() {
            return Err(ProviderError::InvalidRequest(
                "prompt must not be empty".to_string(),
            ));
        }
        if max_tokens == 0 {
            return Err(ProviderError::InvalidRequest(
                "max_tokens must be greater than zero".to_string(),
            ));
        }

        let mut messages = Vec::with_capacity(2);
        if !system_instruction.is_empty() {
            messages.push(ChatMessage::system(system_instruction));
        }
        messages.push(ChatMessage::user(user_prompt));

        let config = self.settings.completion_config(max_tokens, temperature);
        let timeout = config.timeout;

        tracing::debug!(
            provider = self.provider.name(),
            model = %config.model,
            max_tokens,
            prompt_tokens_estimate = self.provider.estimate_tokens(user_prompt),
            "Sending completion request"
        );

        let response = tokio::time::timeout(timeout, self.provider.complete(messages, &config))
            .await
            .map_err(|_| ProviderError::Timeout(timeout))??;

        if response.content.trim().is_empty() {
            return Err(ProviderError::EmptyCompletion);
        }

        Ok(Generation {
            text: response.content,
            usage: response.usage,
            model: response.model,
        })
    }
}
