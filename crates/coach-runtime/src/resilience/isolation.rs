//! Per-call error isolation.
//!
//! [`isolate`] runs one generation call and never fails: a provider error
//! becomes degraded text plus a [`CallStatus`] naming the failure kind.
//! Callers decide on fallbacks from the status, never from the text.

use serde::{Deserialize, Serialize};
use std::future::Future;

use crate::client::Generation;
use crate::providers::{FailureKind, ProviderError};
use crate::run::RunContext;

/// Whether a call produced real output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "kind", rename_all = "snake_case")]
pub enum CallStatus {
    Succeeded,
    Degraded(FailureKind),
}

impl CallStatus {
    pub fn is_degraded(&self) -> bool {
        matches!(self, CallStatus::Degraded(_))
    }

    pub fn is_quota(&self) -> bool {
        matches!(self, CallStatus::Degraded(FailureKind::Quota))
    }

    pub fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            CallStatus::Succeeded => None,
            CallStatus::Degraded(kind) => Some(*kind),
        }
    }

    /// Status of text assembled from two parts; quota degradation dominates.
    pub fn combine(self, other: CallStatus) -> CallStatus {
        match (self, other) {
            (CallStatus::Degraded(FailureKind::Quota), _)
            | (_, CallStatus::Degraded(FailureKind::Quota)) => {
                CallStatus::Degraded(FailureKind::Quota)
            }
            (CallStatus::Degraded(kind), _) | (_, CallStatus::Degraded(kind)) => {
                CallStatus::Degraded(kind)
            }
            _ => CallStatus::Succeeded,
        }
    }
}

/// Text of one isolated call.
#[derive(Debug, Clone, PartialEq)]
pub struct IsolatedOutput {
    pub text: String,
    pub status: CallStatus,
}

/// User-facing notice for a failed call.
pub fn degraded_text(kind: FailureKind, fallback_message: &str) -> String {
    let notice = match kind {
        FailureKind::Quota => "**Analysis temporarily unavailable due to API limits.**",
        FailureKind::AuthFailure => "**Analysis unavailable due to authentication error.**",
        FailureKind::Other => "**Analysis temporarily unavailable.**",
    };
    format!("{}\n\n{}", notice, fallback_message)
}

/// Run `call`, converting any failure into degraded text.
///
/// Usage and the call's status are recorded on `run`.
pub async fn isolate<F>(
    run: &RunContext,
    operation: &str,
    fallback_message: &str,
    call: F,
) -> IsolatedOutput
where
    F: Future<Output = Result<Generation, ProviderError>>,
{
    tracing::debug!(operation, "Generation call started");

    let output = match call.await {
        Ok(generation) => {
            run.record_generation(&generation);
            tracing::debug!(operation, tokens = generation.usage.total(), "Generation call finished");
            IsolatedOutput {
                text: generation.text,
                status: CallStatus::Succeeded,
            }
        }
        Err(e) => {
            let kind = e.kind();
            tracing::warn!(operation, kind = %kind, error = %e, "Generation call degraded");
            IsolatedOutput {
                text: degraded_text(kind, fallback_message),
                status: CallStatus::Degraded(kind),
            }
        }
    };

    run.record_call(operation, output.status);
    output
}
