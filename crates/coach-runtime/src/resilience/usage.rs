//! Token usage accounting for a feedback run.

use serde::{Deserialize, Serialize};

use crate::providers::TokenUsage;

/// Accumulated LLM usage for one feedback run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LlmUsage {
    /// Total tokens used
    pub total_tokens: u32,

    /// Prompt/input tokens
    pub prompt_tokens: u32,

    /// Completion/output tokens
    pub completion_tokens: u32,

    /// Number of successful LLM calls
    pub llm_calls: u32,

    /// Estimated cost in USD
    pub estimated_cost: f64,
}

impl LlmUsage {
    /// Add token usage from a provider response.
    pub fn add(&mut self, usage: &TokenUsage, model: &str) {
        self.prompt_tokens = self.prompt_tokens.saturating_add(usage.prompt_tokens);
        self.completion_tokens = self.completion_tokens.saturating_add(usage.completion_tokens);
        self.total_tokens = self.total_tokens.saturating_add(usage.total());
        self.llm_calls = self.llm_calls.saturating_add(1);
        self.estimated_cost += Self::estimate_cost(usage, model);
    }

    /// Estimate cost for a usage entry.
    fn estimate_cost(usage: &TokenUsage, model: &str) -> f64 {
        // USD per million tokens
        let (input_rate, output_rate) = match model {
            m if m.contains("gpt-4.1-nano") => (0.1, 0.4),
            m if m.contains("gpt-4.1-mini") => (0.4, 1.6),
            m if m.contains("gpt-4.1") => (2.0, 8.0),
            m if m.contains("gpt-4o-mini") => (0.15, 0.6),
            m if m.contains("gpt-4o") => (2.5, 10.0),
            _ => (0.1, 0.4),
        };

        let input_cost = (usage.prompt_tokens as f64 / 1_000_000.0) * input_rate;
        let output_cost = (usage.completion_tokens as f64 / 1_000_000.0) * output_rate;

        input_cost + output_cost
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usage_accumulates() {
        let mut usage = LlmUsage::default();
        let call = TokenUsage {
            prompt_tokens: 1_000_000,
            completion_tokens: 500_000,
        };

        usage.add(&call, "gpt-4.1-nano");
        usage.add(&call, "gpt-4.1-nano-2025-04-14");

        assert_eq!(usage.llm_calls, 2);
        assert_eq!(usage.prompt_tokens, 2_000_000);
        assert_eq!(usage.completion_tokens, 1_000_000);
        assert_eq!(usage.total_tokens, 3_000_000);
        // 2 * (0.1 + 0.2)
        assert!((usage.estimated_cost - 0.6).abs() < 1e-9);
    }

    #[test]
    fn test_oversized_counts_saturate() {
        let huge = TokenUsage {
            prompt_tokens: u32::MAX / 2 + 1,
            completion_tokens: u32::MAX / 2 + 1,
        };
        assert_eq!(huge.total(), u32::MAX);

        let mut usage = LlmUsage::default();
        usage.add(&huge, "gpt-4.1-nano");
        usage.add(&huge, "gpt-4.1-nano");

        assert_eq!(usage.llm_calls, 2);
        assert_eq!(usage.prompt_tokens, u32::MAX);
        assert_eq!(usage.completion_tokens, u32::MAX);
        assert_eq!(usage.total_tokens, u32::MAX);
        assert!(usage.estimated_cost.is_finite());
    }

    #[test]
    fn test_model_pricing() {
        let call = TokenUsage {
            prompt_tokens: 1_000_000,
            completion_tokens: 1_000_000,
        };
        assert!((LlmUsage::estimate_cost(&call, "gpt-4o") - 12.5).abs() < 1e-9);
        assert!((LlmUsage::estimate_cost(&call, "gpt-4o-mini") - 0.75).abs() < 1e-9);
        assert!((LlmUsage::estimate_cost(&call, "gpt-4.1") - 10.0).abs() < 1e-9);
    }
}
