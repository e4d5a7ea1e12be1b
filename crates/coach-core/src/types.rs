//! Request, provenance and intermediate result types.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::FeedbackConfig;

/// Name used in prompts when no display name is supplied.
pub const DEFAULT_CANDIDATE: &str = "the candidate";

/// The three fixed feedback pipeline shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackType {
    /// One generation call from a single template
    Simple,

    /// Independent analyses followed by a synthesis call
    MultiAnalysis,

    /// Sequential stages, each seeing all earlier results
    Detailed,
}

impl FeedbackType {
    /// Map a profile's `feedback_type` tag to a pipeline shape.
    ///
    /// Unknown or missing tags select [`FeedbackType::Simple`]; this never fails.
    pub fn from_tag(tag: Option<&str>) -> Self {
        match tag {
            Some("multi_analysis") => FeedbackType::MultiAnalysis,
            Some("detailed") => FeedbackType::Detailed,
            _ => FeedbackType::Simple,
        }
    }

    /// The configuration tag for this type.
    pub fn as_str(&self) -> &'static str {
        match self {
            FeedbackType::Simple => "simple",
            FeedbackType::MultiAnalysis => "multi_analysis",
            FeedbackType::Detailed => "detailed",
        }
    }
}

impl fmt::Display for FeedbackType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which pipeline actually produced the returned feedback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyUsed {
    Simple,
    MultiAnalysis,
    Detailed,

    /// Simple strategy re-run after the configured strategy hit API limits
    SimpleFallback,

    /// Fixed message returned after every generation attempt failed
    ManualFallback,
}

impl StrategyUsed {
    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyUsed::Simple => "simple",
            StrategyUsed::MultiAnalysis => "multi_analysis",
            StrategyUsed::Detailed => "detailed",
            StrategyUsed::SimpleFallback => "simple_fallback",
            StrategyUsed::ManualFallback => "manual_fallback",
        }
    }

    /// Whether this label marks a fallback path.
    pub fn is_fallback(&self) -> bool {
        matches!(self, StrategyUsed::SimpleFallback | StrategyUsed::ManualFallback)
    }
}

impl From<FeedbackType> for StrategyUsed {
    fn from(feedback_type: FeedbackType) -> Self {
        match feedback_type {
            FeedbackType::Simple => StrategyUsed::Simple,
            FeedbackType::MultiAnalysis => StrategyUsed::MultiAnalysis,
            FeedbackType::Detailed => StrategyUsed::Detailed,
        }
    }
}

impl fmt::Display for StrategyUsed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a fallback path was taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FallbackReason {
    #[serde(rename = "API quota exceeded")]
    ApiQuotaExceeded,

    #[serde(rename = "Complete API failure")]
    CompleteApiFailure,
}

impl FallbackReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            FallbackReason::ApiQuotaExceeded => "API quota exceeded",
            FallbackReason::CompleteApiFailure => "Complete API failure",
        }
    }
}

impl fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable input to a single feedback run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackRequest {
    /// Interview transcript
    pub transcript: String,

    /// Job description the interview was held for
    pub job_description: String,

    /// Optional display name of the candidate
    #[serde(default)]
    pub user_name: Option<String>,

    /// Pipeline shape and its parameters
    pub config: FeedbackConfig,
}

impl FeedbackRequest {
    pub fn new(
        transcript: impl Into<String>,
        job_description: impl Into<String>,
        config: FeedbackConfig,
    ) -> Self {
        Self {
            transcript: transcript.into(),
            job_description: job_description.into(),
            user_name: None,
            config,
        }
    }

    /// Set the candidate's display name.
    pub fn with_user_name(mut self, name: impl Into<String>) -> Self {
        self.user_name = Some(name.into());
        self
    }

    /// Name to address in prompts; blank names fall back to "the candidate".
    pub fn candidate(&self) -> &str {
        match self.user_name.as_deref() {
            Some(name) if !name.trim().is_empty() => name,
            _ => DEFAULT_CANDIDATE,
        }
    }

    /// The pipeline shape selected by this request's configuration.
    pub fn feedback_type(&self) -> FeedbackType {
        self.config.feedback_type()
    }
}

/// Output of one independent analysis.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisResult {
    pub name: String,
    pub text: String,
    pub weight: f64,
}

/// Output of one sequential stage.
#[derive(Debug, Clone, PartialEq)]
pub struct StageResult {
    pub name: String,
    pub text: String,
}
