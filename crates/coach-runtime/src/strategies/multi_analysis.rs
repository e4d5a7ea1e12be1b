//! Independent analyses merged by a synthesis call.
//!
//! Analyses have no data dependency on each other, so they run
//! concurrently. `join_all` yields results in declaration order, which is
//! the order the synthesis prompt renders them in.

use async_trait::async_trait;
use futures::future::join_all;
use std::sync::Arc;

use coach_core::render::{analysis_prompt, synthesis_prompt};
use coach_core::{AnalysisResult, AnalysisSpec, FeedbackRequest, FeedbackType, MultiAnalysisConfig};

use super::{FeedbackStrategy, StrategyError, StrategyOutput};
use crate::client::TextGenerationClient;
use crate::config::CallKind;
use crate::prompts::{
    analysis_fallback_message, analysis_system_prompt, SYNTHESIS_FALLBACK_MESSAGE,
    SYNTHESIS_OPERATION, SYNTHESIS_SYSTEM_PROMPT,
};
use crate::resilience::isolate;
use crate::run::RunContext;

pub struct MultiAnalysisStrategy {
    client: Arc<TextGenerationClient>,
    config: MultiAnalysisConfig,
}

impl MultiAnalysisStrategy {
    pub fn new(client: Arc<TextGenerationClient>, config: MultiAnalysisConfig) -> Self {
        Self { client, config }
    }

    async fn run_analysis(
        &self,
        spec: &AnalysisSpec,
        request: &FeedbackRequest,
        run: &RunContext,
    ) -> AnalysisResult {
        let system = analysis_system_prompt(&spec.name);
        let prompt = analysis_prompt(spec, request);
        let fallback = analysis_fallback_message(&spec.name);
        let temperature = self.client.settings().temperature;

        let output = isolate(
            run,
            &spec.name,
            &fallback,
            self.client.generate(
                &system,
                &prompt,
                self.client.budget(CallKind::Analysis),
                temperature,
            ),
        )
        .await;

        AnalysisResult {
            name: spec.name.clone(),
            text: output.text,
            weight: spec.weight,
        }
    }
}

#[async_trait]
impl FeedbackStrategy for MultiAnalysisStrategy {
    fn feedback_type(&self) -> FeedbackType {
        FeedbackType::MultiAnalysis
    }

    async fn generate(
        &self,
        request: &FeedbackRequest,
        run: &RunContext,
    ) -> Result<StrategyOutput, StrategyError> {
        if run.is_cancelled() {
            return Err(StrategyError::Cancelled);
        }

        tracing::debug!(
            strategy = "multi_analysis",
            analyses = self.config.analyses.len(),
            "Starting analyses"
        );

        let results = join_all(
            self.config
                .analyses
                .iter()
                .map(|spec| self.run_analysis(spec, request, run)),
        )
        .await;

        if run.is_cancelled() {
            return Err(StrategyError::Cancelled);
        }

        let prompt = synthesis_prompt(&self.config.synthesis_prompt, &results, request);
        let output = isolate(
            run,
            SYNTHESIS_OPERATION,
            SYNTHESIS_FALLBACK_MESSAGE,
            self.client.generate(
                SYNTHESIS_SYSTEM_PROMPT,
                &prompt,
                self.client.budget(CallKind::Synthesis),
                self.client.settings().temperature,
            ),
        )
        .await;

        // Only the synthesis text is returned, so only its status counts.
        Ok(StrategyOutput {
            text: output.text,
            status: output.status,
        })
    }
}
