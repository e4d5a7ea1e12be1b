//! Single-shot feedback.

use async_trait::async_trait;
use std::sync::Arc;

use coach_core::render::render_template;
use coach_core::{FeedbackRequest, FeedbackType, SimpleConfig};

use super::{FeedbackStrategy, StrategyError, StrategyOutput};
use crate::client::TextGenerationClient;
use crate::config::CallKind;
use crate::prompts::{DEFAULT_SIMPLE_TEMPLATE, SIMPLE_OPERATION, SIMPLE_SYSTEM_PROMPT};
use crate::resilience::CallStatus;
use crate::run::RunContext;

/// One call with a coaching template.
///
/// The call is not isolated: this strategy is the orchestrator's last
/// generated fallback, so its failures must reach the orchestrator.
pub struct SimpleStrategy {
    client: Arc<TextGenerationClient>,
    config: SimpleConfig,
}

impl SimpleStrategy {
    pub fn new(client: Arc<TextGenerationClient>, config: SimpleConfig) -> Self {
        Self { client, config }
    }

    /// The configured template, or the built-in one when unset or blank.
    fn template(&self) -> &str {
        match self.config.prompt_template.as_deref() {
            Some(template) if !template.trim().is_empty() => template,
            _ => DEFAULT_SIMPLE_TEMPLATE,
        }
    }
}

#[async_trait]
impl FeedbackStrategy for SimpleStrategy {
    fn feedback_type(&self) -> FeedbackType {
        FeedbackType::Simple
    }

    async fn generate(
        &self,
        request: &FeedbackRequest,
        run: &RunContext,
    ) -> Result<StrategyOutput, StrategyError> {
        if run.is_cancelled() {
            return Err(StrategyError::Cancelled);
        }

        let prompt = render_template(self.template(), request);
        let settings = self.client.settings();

        let result = self
            .client
            .generate(
                SIMPLE_SYSTEM_PROMPT,
                &prompt,
                self.client.budget(CallKind::Simple),
                settings.temperature,
            )
            .await;

        match result {
            Ok(generation) => {
                run.record_generation(&generation);
                run.record_call(SIMPLE_OPERATION, CallStatus::Succeeded);
                Ok(StrategyOutput {
                    text: generation.text,
                    status: CallStatus::Succeeded,
                })
            }
            Err(e) => {
                tracing::warn!(operation = SIMPLE_OPERATION, kind = %e.kind(), error = %e, "Simple feedback call failed");
                run.record_call(SIMPLE_OPERATION, CallStatus::Degraded(e.kind()));
                Err(e.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GenerationSettings;
    use crate::providers::{FailureKind, ProviderError};
    use crate::test_support::ScriptedProvider;
    use coach_core::FeedbackConfig;

    fn setup(provider: ScriptedProvider) -> (Arc<ScriptedProvider>, Arc<TextGenerationClient>) {
        let provider = Arc::new(provider);
        let client = Arc::new(TextGenerationClient::new(
            provider.clone(),
            GenerationSettings::default(),
        ));
        (provider, client)
    }

    fn request() -> FeedbackRequest {
        FeedbackRequest::new(
            "Q: Why Rust?\nA: Fearless concurrency.",
            "Backend Engineer",
            FeedbackConfig::default(),
        )
    }

    #[tokio::test]
    async fn test_default_template() {
        let (provider, client) = setup(ScriptedProvider::always("Overall Rating: Good"));
        let strategy = SimpleStrategy::new(client, SimpleConfig::default());
        let run = RunContext::new();

        let output = strategy
            .generate(&request().with_user_name("Grace"), &run)
            .await
            .unwrap();
        assert_eq!(output.text, "Overall Rating: Good");
        assert_eq!(output.status, CallStatus::Succeeded);

        let calls = provider.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].system, SIMPLE_SYSTEM_PROMPT);
        assert_eq!(calls[0].max_tokens, 1000);
        assert!(calls[0].prompt.contains("Job Description:\nBackend Engineer"));
        assert!(calls[0].prompt.contains("A: Fearless concurrency."));
        assert!(calls[0].prompt.ends_with("helpful for Grace."));

        assert_eq!(run.usage().llm_calls, 1);
        assert_eq!(run.calls()[0].operation, "simple");
    }

    #[tokio::test]
    async fn test_template_override_used_verbatim() {
        let (provider, client) = setup(ScriptedProvider::echo());
        let strategy = SimpleStrategy::new(
            client,
            SimpleConfig {
                prompt_template: Some("Give three short tips.".to_string()),
            },
        );

        let output = strategy.generate(&request(), &RunContext::new()).await.unwrap();
        assert_eq!(output.text, "Give three short tips.");
        assert_eq!(provider.calls()[0].prompt, "Give three short tips.");
    }

    #[tokio::test]
    async fn test_blank_template_uses_default() {
        let (provider, client) = setup(ScriptedProvider::always("ok"));
        let strategy = SimpleStrategy::new(
            client,
            SimpleConfig {
                prompt_template: Some("   ".to_string()),
            },
        );

        strategy.generate(&request(), &RunContext::new()).await.unwrap();
        assert!(provider.calls()[0].prompt.contains("the candidate"));
    }

    #[tokio::test]
    async fn test_failure_propagates() {
        let (_, client) = setup(ScriptedProvider::failing(ProviderError::AuthError));
        let strategy = SimpleStrategy::new(client, SimpleConfig::default());
        let run = RunContext::new();

        let err = strategy.generate(&request(), &run).await.unwrap_err();
        assert!(matches!(err, StrategyError::Provider(ProviderError::AuthError)));
        assert_eq!(
            run.calls()[0].status,
            CallStatus::Degraded(FailureKind::AuthFailure)
        );
    }

    #[tokio::test]
    async fn test_empty_completion_is_a_failure() {
        let (_, client) = setup(ScriptedProvider::always(""));
        let strategy = SimpleStrategy::new(client, SimpleConfig::default());

        let err = strategy
            .generate(&request(), &RunContext::new())
            .await
            .unwrap_err();
        assert!(matches!(err, StrategyError::Provider(ProviderError::EmptyCompletion)));
    }
}
