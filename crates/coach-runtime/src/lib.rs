//! # coach-runtime
//!
//! The async half of the Coach feedback pipeline: it turns a
//! [`FeedbackRequest`](coach_core::FeedbackRequest) into feedback text by
//! calling a text-generation service.
//!
//! Call flow, outermost first:
//! - [`FeedbackOrchestrator`] applies the fallback chain and always returns
//!   a [`FeedbackResult`]
//! - a [`FeedbackStrategy`] (simple, multi-analysis or detailed) builds
//!   prompts and sequences calls
//! - [`resilience::isolate`] turns each failed call into degraded text with
//!   an explicit status
//! - [`TextGenerationClient`] makes one bounded call through an
//!   [`LlmProvider`]
//!
//! ## Example
//!
//! ```rust,ignore
//! use coach_runtime::{FeedbackOrchestrator, OpenAiProvider};
//!
//! let provider = OpenAiProvider::from_config(&provider_config)?;
//! let orchestrator = FeedbackOrchestrator::builder()
//!     .provider(Arc::new(provider))
//!     .settings(settings)
//!     .build()?;
//!
//! let result = orchestrator.generate_feedback(&request).await;
//! println!("{} ({})", result.text, result.strategy_used);
//! ```

pub mod client;
pub mod config;
pub mod orchestrator;
pub mod prompts;
pub mod providers;
pub mod resilience;
pub mod run;
pub mod strategies;

#[cfg(test)]
mod test_support;

pub use client::{Generation, TextGenerationClient};
pub use config::{CallKind, GenerationSettings, SettingsError, TokenBudgets};
pub use orchestrator::{
    FeedbackOrchestrator, FeedbackOrchestratorBuilder, FeedbackResult, OrchestratorError,
};
pub use providers::{
    ApiCredential, CredentialSource, FailureKind, LlmProvider, OpenAiProvider, ProviderError,
    OPENAI_API_KEY_ENV,
};
pub use resilience::{CallStatus, LlmUsage};
pub use run::{CallRecord, RunContext};
pub use strategies::{
    select_strategy, DetailedStrategy, FeedbackStrategy, MultiAnalysisStrategy, SimpleStrategy,
    StrategyError, StrategyOutput,
};
