//! Fallback orchestrator for feedback generation.
//!
//! The orchestrator is the pipeline's outer contract. It:
//! - Selects and runs the configured strategy
//! - Re-runs the simple strategy with a generic template when the output
//!   was degraded by quota
//! - Replaces any hard failure with a fixed manual message
//!
//! It is the only place a failure is swallowed, and it always returns
//! non-empty feedback unless the caller cancels the run.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use coach_core::{FallbackReason, FeedbackRequest, FeedbackType, StrategyUsed};

use crate::client::TextGenerationClient;
use crate::config::{GenerationSettings, SettingsError};
use crate::providers::LlmProvider;
use crate::resilience::{
    simple_fallback_config, FallbackDecision, LlmUsage, MANUAL_FALLBACK_FEEDBACK,
};
use crate::run::{CallRecord, RunContext};
use crate::strategies::{
    select_strategy, FeedbackStrategy, SimpleStrategy, StrategyError, StrategyOutput,
};

/// Errors from the orchestrator.
#[derive(Error, Debug)]
pub enum OrchestratorError {
    #[error("Provider not configured: {0}")]
    ProviderNotConfigured(String),

    #[error("Invalid generation settings: {0}")]
    InvalidSettings(#[from] SettingsError),

    #[error("Feedback run cancelled")]
    Cancelled,
}

/// Feedback returned to the request handler.
#[derive(Debug, Clone, Serialize)]
pub struct FeedbackResult {
    /// Final feedback, never empty
    pub text: String,

    /// Which path produced `text`
    pub strategy_used: StrategyUsed,

    /// Configured strategy, set when a fallback was taken
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_strategy: Option<FeedbackType>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback_reason: Option<FallbackReason>,

    pub generated_at: DateTime<Utc>,

    /// LLM usage of this run
    pub usage: LlmUsage,

    /// Every generation call of this run, in completion order
    pub calls: Vec<CallRecord>,
}

impl FeedbackResult {
    fn new(text: String, strategy_used: StrategyUsed, run: &RunContext) -> Self {
        Self {
            text,
            strategy_used,
            original_strategy: None,
            fallback_reason: None,
            generated_at: Utc::now(),
            usage: run.usage(),
            calls: run.calls(),
        }
    }

    fn fallback(mut self, original: FeedbackType, reason: FallbackReason) -> Self {
        self.original_strategy = Some(original);
        self.fallback_reason = Some(reason);
        self
    }

    pub fn is_fallback(&self) -> bool {
        self.strategy_used.is_fallback()
    }
}

/// Runs feedback strategies behind the two-level fallback chain.
pub struct FeedbackOrchestrator {
    client: Arc<TextGenerationClient>,
}

impl FeedbackOrchestrator {
    pub fn new(client: Arc<TextGenerationClient>) -> Self {
        Self { client }
    }

    pub fn builder() -> FeedbackOrchestratorBuilder {
        FeedbackOrchestratorBuilder::new()
    }

    pub fn client(&self) -> &TextGenerationClient {
        &self.client
    }

    /// Whether the text-generation service is reachable with the configured credentials.
    pub async fn health_check(&self) -> bool {
        let healthy = self.client.health_check().await;
        if !healthy {
            tracing::warn!(provider = self.client.provider_name(), "Provider health check failed");
        }
        healthy
    }

    /// Generate feedback. Never fails and never returns empty text.
    pub async fn generate_feedback(&self, request: &FeedbackRequest) -> FeedbackResult {
        let run = RunContext::new();
        match self.run(request, &run).await {
            Ok(result) => result,
            // A run without a cancellation source cannot be cancelled.
            Err(_) => self.manual_fallback(request.feedback_type(), &run),
        }
    }

    /// Generate feedback, aborting in-flight calls once `cancel` fires.
    ///
    /// On cancellation no partial result is returned.
    pub async fn generate_feedback_with_cancel(
        &self,
        request: &FeedbackRequest,
        cancel: CancellationToken,
    ) -> Result<FeedbackResult, OrchestratorError> {
        let run = RunContext::with_cancellation(cancel.clone());

        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                tracing::info!(strategy = %request.feedback_type(), "Feedback run cancelled");
                Err(OrchestratorError::Cancelled)
            }
            result = self.run(request, &run) => result,
        }
    }

    async fn run(
        &self,
        request: &FeedbackRequest,
        run: &RunContext,
    ) -> Result<FeedbackResult, OrchestratorError> {
        let configured = request.feedback_type();
        let strategy = select_strategy(&request.config, self.client.clone());

        tracing::info!(
            strategy = %configured,
            provider = self.client.provider_name(),
            "Generating feedback"
        );

        match strategy.generate(request, run).await {
            Ok(output) => match FallbackDecision::for_output(configured, output.status) {
                FallbackDecision::Accept => Ok(self.accept(output, configured, run)),
                FallbackDecision::DowngradeToSimple => {
                    tracing::warn!(
                        strategy = %configured,
                        "Strategy output degraded by API quota, falling back to simple"
                    );
                    self.simple_fallback(request, configured, run).await
                }
            },
            Err(StrategyError::Cancelled) => Err(OrchestratorError::Cancelled),
            Err(e) => {
                tracing::error!(strategy = %configured, error = %e, "Feedback generation failed");
                Ok(self.manual_fallback(configured, run))
            }
        }
    }

    fn accept(&self, output: StrategyOutput, configured: FeedbackType, run: &RunContext) -> FeedbackResult {
        if output.text.trim().is_empty() {
            tracing::error!(strategy = %configured, "Strategy returned empty feedback");
            return self.manual_fallback(configured, run);
        }

        tracing::info!(strategy = %configured, degraded = output.status.is_degraded(), "Feedback generated");
        FeedbackResult::new(output.text, configured.into(), run)
    }

    async fn simple_fallback(
        &self,
        request: &FeedbackRequest,
        configured: FeedbackType,
        run: &RunContext,
    ) -> Result<FeedbackResult, OrchestratorError> {
        let strategy = SimpleStrategy::new(self.client.clone(), simple_fallback_config(configured));

        match strategy.generate(request, run).await {
            Ok(output) if !output.text.trim().is_empty() => Ok(FeedbackResult::new(
                output.text,
                StrategyUsed::SimpleFallback,
                run,
            )
            .fallback(configured, FallbackReason::ApiQuotaExceeded)),
            Ok(_) => Ok(self.manual_fallback(configured, run)),
            Err(StrategyError::Cancelled) => Err(OrchestratorError::Cancelled),
            Err(e) => {
                tracing::error!(strategy = %configured, error = %e, "Simple fallback failed");
                Ok(self.manual_fallback(configured, run))
            }
        }
    }

    fn manual_fallback(&self, configured: FeedbackType, run: &RunContext) -> FeedbackResult {
        tracing::warn!(strategy = %configured, "Returning manual fallback feedback");
        FeedbackResult::new(
            MANUAL_FALLBACK_FEEDBACK.to_string(),
            StrategyUsed::ManualFallback,
            run,
        )
        .fallback(configured, FallbackReason::CompleteApiFailure)
    }
}

/// Builder for FeedbackOrchestrator.
pub struct FeedbackOrchestratorBuilder {
    provider: Option<Arc<dyn LlmProvider>>,
    settings: GenerationSettings,
}

impl FeedbackOrchestratorBuilder {
    pub fn new() -> Self {
        Self {
            provider: None,
            settings: GenerationSettings::default(),
        }
    }

    /// Set the LLM provider.
    pub fn provider(mut self, provider: Arc<dyn LlmProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Set the generation settings.
    pub fn settings(mut self, settings: GenerationSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Build the orchestrator.
    pub fn build(self) -> Result<FeedbackOrchestrator, OrchestratorError> {
        let provider = self
            .provider
            .ok_or_else(|| OrchestratorError::ProviderNotConfigured("No provider set".to_string()))?;

        self.settings.validate()?;

        Ok(FeedbackOrchestrator::new(Arc::new(TextGenerationClient::new(
            provider,
            self.settings,
        ))))
    }
}

impl Default for FeedbackOrchestratorBuilder {
    fn default() -> Self {
        Self::new()
    }
}
