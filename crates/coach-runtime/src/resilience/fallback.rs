//! Fallback chain applied by the orchestrator.
//!
//! Level one re-runs the simple strategy with a generic template when the
//! configured strategy came back degraded by quota. Level two replaces any
//! hard failure with a fixed manual message.

use coach_core::{FeedbackType, SimpleConfig};

use super::CallStatus;
use crate::prompts::simple_fallback_template;

/// Feedback returned when no generation call could produce text.
pub const MANUAL_FALLBACK_FEEDBACK: &str = "**Feedback temporarily unavailable**\n\nWe apologize, but we're unable to generate detailed feedback at this time due to API limitations. Please try again later or contact support if the issue persists.\n\n**General Interview Tips:**\n- Speak clearly and confidently\n- Provide specific examples from your experience\n- Ask thoughtful questions about the role\n- Follow up with a thank-you note";

/// What the orchestrator does with a strategy's output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackDecision {
    /// Return the output as produced
    Accept,

    /// Discard the output and re-run the simple strategy
    DowngradeToSimple,
}

impl FallbackDecision {
    /// Only quota degradation of a non-simple strategy triggers a downgrade;
    /// simple output is always accepted since simple is the downgrade target.
    pub fn for_output(configured: FeedbackType, status: CallStatus) -> Self {
        if status.is_quota() && configured != FeedbackType::Simple {
            FallbackDecision::DowngradeToSimple
        } else {
            FallbackDecision::Accept
        }
    }
}

/// Configuration of the simple re-run for a downgraded strategy.
pub fn simple_fallback_config(original: FeedbackType) -> SimpleConfig {
    SimpleConfig {
        prompt_template: Some(simple_fallback_template(original)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::FailureKind;

    #[test]
    fn test_quota_downgrades_complex_strategies() {
        let quota = CallStatus::Degraded(FailureKind::Quota);
        assert_eq!(
            FallbackDecision::for_output(FeedbackType::Detailed, quota),
            FallbackDecision::DowngradeToSimple
        );
        assert_eq!(
            FallbackDecision::for_output(FeedbackType::MultiAnalysis, quota),
            FallbackDecision::DowngradeToSimple
        );
        assert_eq!(
            FallbackDecision::for_output(FeedbackType::Simple, quota),
            FallbackDecision::Accept
        );
    }

    #[test]
    fn test_other_degradation_is_accepted() {
        for kind in [FailureKind::AuthFailure, FailureKind::Other] {
            assert_eq!(
                FallbackDecision::for_output(FeedbackType::Detailed, CallStatus::Degraded(kind)),
                FallbackDecision::Accept
            );
        }
        assert_eq!(
            FallbackDecision::for_output(FeedbackType::MultiAnalysis, CallStatus::Succeeded),
            FallbackDecision::Accept
        );
    }

    #[test]
    fn test_simple_fallback_config() {
        let template = simple_fallback_config(FeedbackType::MultiAnalysis)
            .prompt_template
            .unwrap();
        assert!(template.contains("multi_analysis interview analysis"));
    }

    #[test]
    fn test_manual_message_is_not_empty() {
        assert!(MANUAL_FALLBACK_FEEDBACK.starts_with("**Feedback temporarily unavailable**"));
        assert!(MANUAL_FALLBACK_FEEDBACK.contains("General Interview Tips"));
    }
}
