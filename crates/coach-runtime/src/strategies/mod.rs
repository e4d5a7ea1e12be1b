//! Feedback strategies.
//!
//! Three fixed pipeline shapes turn one [`FeedbackRequest`] into feedback
//! text. Strategies are built per run from the request's configuration by
//! [`select_strategy`] and share one [`TextGenerationClient`].

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

use coach_core::{FeedbackConfig, FeedbackRequest, FeedbackType};

use crate::client::TextGenerationClient;
use crate::providers::ProviderError;
use crate::resilience::CallStatus;
use crate::run::RunContext;

mod detailed;
mod multi_analysis;
mod simple;

pub use detailed::DetailedStrategy;
pub use multi_analysis::MultiAnalysisStrategy;
pub use simple::SimpleStrategy;

/// Errors a strategy lets through to the orchestrator.
#[derive(Error, Debug)]
pub enum StrategyError {
    /// An unisolated call failed (simple strategy only)
    #[error("Generation failed: {0}")]
    Provider(#[from] ProviderError),

    #[error("Detailed feedback requires at least one stage")]
    NoStages,

    #[error("Feedback run cancelled")]
    Cancelled,
}

/// Feedback text plus whether degraded output went into it.
#[derive(Debug, Clone, PartialEq)]
pub struct StrategyOutput {
    pub text: String,

    /// Combined status of the calls whose text is part of `text`
    pub status: CallStatus,
}

/// A feedback pipeline shape.
///
/// # Isolation Contract
/// - All state of a run lives in the [`RunContext`]
/// - Calls go through the error-isolation wrapper, except in the simple
///   strategy, whose failures reach the orchestrator
#[async_trait]
pub trait FeedbackStrategy: Send + Sync {
    /// The configured type this strategy implements.
    fn feedback_type(&self) -> FeedbackType;

    /// Produce feedback for one request.
    async fn generate(
        &self,
        request: &FeedbackRequest,
        run: &RunContext,
    ) -> Result<StrategyOutput, StrategyError>;
}

/// Build the strategy for a configuration.
///
/// Tags were already resolved when the configuration was parsed, so unknown
/// tags arrive here as [`FeedbackConfig::Simple`].
pub fn select_strategy(
    config: &FeedbackConfig,
    client: Arc<TextGenerationClient>,
) -> Box<dyn FeedbackStrategy> {
    match config {
        FeedbackConfig::Simple(c) => Box::new(SimpleStrategy::new(client, c.clone())),
        FeedbackConfig::MultiAnalysis(c) => Box::new(MultiAnalysisStrategy::new(client, c.clone())),
        FeedbackConfig::Detailed(c) => Box::new(DetailedStrategy::new(client, c.clone())),
    }
}
