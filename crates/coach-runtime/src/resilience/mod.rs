//! Resilience patterns for coach-runtime.
//!
//! This module provides:
//! - Per-call error isolation with explicit degraded status
//! - Token usage accounting
//! - The orchestrator's fallback chain

mod fallback;
mod isolation;
mod usage;

pub use fallback::{simple_fallback_config, FallbackDecision, MANUAL_FALLBACK_FEEDBACK};
pub use isolation::{degraded_text, isolate, CallStatus, IsolatedOutput};
pub use usage::LlmUsage;
