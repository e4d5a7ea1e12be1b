//! Sequential multi-stage feedback.
//!
//! Stage `i + 1` sees the results of every earlier stage, so stages run
//! strictly one after another. When the last stage is terminal its text is
//! the feedback; otherwise every stage result is concatenated in order.

use async_trait::async_trait;
use std::sync::Arc;

use coach_core::render::{combine_stage_results, is_terminal_stage, stage_prompt};
use coach_core::{DetailedConfig, FeedbackRequest, FeedbackType, StageResult};

use super::{FeedbackStrategy, StrategyError, StrategyOutput};
use crate::client::TextGenerationClient;
use crate::config::CallKind;
use crate::prompts::{stage_fallback_message, stage_operation, stage_system_prompt};
use crate::resilience::{isolate, CallStatus};
use crate::run::RunContext;

pub struct DetailedStrategy {
    client: Arc<TextGenerationClient>,
    config: DetailedConfig,
}

impl DetailedStrategy {
    pub fn new(client: Arc<TextGenerationClient>, config: DetailedConfig) -> Self {
        Self { client, config }
    }
}

#[async_trait]
impl FeedbackStrategy for DetailedStrategy {
    fn feedback_type(&self) -> FeedbackType {
        FeedbackType::Detailed
    }

    async fn generate(
        &self,
        request: &FeedbackRequest,
        run: &RunContext,
    ) -> Result<StrategyOutput, StrategyError> {
        let stages = &self.config.stages;
        let Some(last) = stages.last() else {
            return Err(StrategyError::NoStages);
        };

        let total = stages.len();
        let temperature = self.client.settings().temperature;
        let mut results: Vec<StageResult> = Vec::with_capacity(total);
        let mut statuses: Vec<CallStatus> = Vec::with_capacity(total);

        for (index, stage) in stages.iter().enumerate() {
            if run.is_cancelled() {
                return Err(StrategyError::Cancelled);
            }

            let number = index + 1;
            tracing::debug!(strategy = "detailed", stage = %stage.name, number, total, "Starting stage");

            let system = stage_system_prompt(number, total);
            let prompt = stage_prompt(stage, request, &results);
            let output = isolate(
                run,
                &stage_operation(number, &stage.name),
                &stage_fallback_message(number),
                self.client.generate(
                    &system,
                    &prompt,
                    self.client.budget(CallKind::Stage),
                    temperature,
                ),
            )
            .await;

            results.push(StageResult {
                name: stage.name.clone(),
                text: output.text,
            });
            statuses.push(output.status);
        }

        if is_terminal_stage(last) {
            tracing::debug!(stage = %last.name, "Returning terminal stage result");
            let status = statuses.last().copied().unwrap_or(CallStatus::Succeeded);
            let text = results.pop().map(|r| r.text).unwrap_or_default();
            return Ok(StrategyOutput { text, status });
        }

        tracing::debug!("No terminal stage, combining all stage results");
        let status = statuses
            .into_iter()
            .fold(CallStatus::Succeeded, CallStatus::combine);

        Ok(StrategyOutput {
            text: combine_stage_results(&results),
            status,
        })
    }
}
