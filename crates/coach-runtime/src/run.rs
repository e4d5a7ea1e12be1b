//! Per-run state shared by the calls of one feedback run.
//!
//! A [`RunContext`] is created for every request and dropped with it, so
//! nothing here is ever visible to a concurrent run.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::client::Generation;
use crate::resilience::{CallStatus, LlmUsage};

/// Outcome of one generation call, without its text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallRecord {
    pub operation: String,
    pub status: CallStatus,
}

#[derive(Debug, Default)]
pub struct RunContext {
    cancel: CancellationToken,
    usage: Mutex<LlmUsage>,
    calls: Mutex<Vec<CallRecord>>,
}

impl RunContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// A run that stops once `cancel` fires.
    pub fn with_cancellation(cancel: CancellationToken) -> Self {
        Self {
            cancel,
            ..Self::default()
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Account for a successful call.
    pub fn record_generation(&self, generation: &Generation) {
        self.usage.lock().add(&generation.usage, &generation.model);
    }

    pub fn record_call(&self, operation: impl Into<String>, status: CallStatus) {
        self.calls.lock().push(CallRecord {
            operation: operation.into(),
            status,
        });
    }

    pub fn usage(&self) -> LlmUsage {
        self.usage.lock().clone()
    }

    /// Calls in completion order.
    pub fn calls(&self) -> Vec<CallRecord> {
        self.calls.lock().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::{FailureKind, TokenUsage};

    #[test]
    fn test_records_usage_and_calls() {
        let run = RunContext::new();
        run.record_generation(&Generation {
            text: "ok".to_string(),
            usage: TokenUsage {
                prompt_tokens: 10,
                completion_tokens: 5,
            },
            model: "gpt-4.1-nano".to_string(),
        });
        run.record_call("clarity", CallStatus::Succeeded);
        run.record_call("synthesis", CallStatus::Degraded(FailureKind::Quota));

        assert_eq!(run.usage().total_tokens, 15);
        assert_eq!(run.usage().llm_calls, 1);

        let calls = run.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[1].operation, "synthesis");
        assert!(calls[1].status.is_quota());
    }

    #[test]
    fn test_call_record_serialization() {
        let record = CallRecord {
            operation: "stage_1_intro".to_string(),
            status: CallStatus::Degraded(FailureKind::AuthFailure),
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["operation"], "stage_1_intro");
        assert_eq!(json["status"]["state"], "degraded");
        assert_eq!(json["status"]["kind"], "auth_failure");
    }

    #[test]
    fn test_cancellation() {
        let token = CancellationToken::new();
        let run = RunContext::with_cancellation(token.clone());
        assert!(!run.is_cancelled());
        token.cancel();
        assert!(run.is_cancelled());
    }
}
