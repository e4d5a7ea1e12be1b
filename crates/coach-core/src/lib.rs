//! # coach-core
//!
//! Deterministic building blocks of the Coach interview-feedback pipeline.
//!
//! This crate owns everything about a feedback run that does not touch
//! the network:
//! - the request and provenance types handed across the pipeline boundary
//! - feedback profile configuration, validated against JSON Schema
//! - prompt and output rendering for every strategy
//!
//! The async pipeline that calls a text-generation service lives in
//! `coach-runtime`.
//!
//! ## Example
//!
//! ```rust,ignore
//! use coach_core::{FeedbackRequest, ProfileConfig};
//!
//! let profile = ProfileConfig::from_file("profiles/engineering.yaml")?;
//! let request = FeedbackRequest::new(transcript, job_description, profile.feedback_config()?)
//!     .with_user_name("Ada");
//! ```

pub mod config;
pub mod render;
pub mod types;

pub use config::{
    AnalysisSpec, ConfigError, DetailedConfig, FeedbackConfig, MultiAnalysisConfig,
    ProfileConfig, SimpleConfig, StageSpec,
};
pub use types::{
    AnalysisResult, FallbackReason, FeedbackRequest, FeedbackType, StageResult, StrategyUsed,
    DEFAULT_CANDIDATE,
};

/// Build a request from a stored profile and interview texts.
///
/// This is the inbound boundary used by request handlers: the profile is
/// resolved (unknown tags select the simple strategy) and validated before
/// any generation happens.
pub fn request_from_profile(
    profile: &ProfileConfig,
    transcript: impl Into<String>,
    job_description: impl Into<String>,
    user_name: Option<String>,
) -> Result<FeedbackRequest, ConfigError> {
    let config = profile.feedback_config()?;
    let mut request = FeedbackRequest::new(transcript, job_description, config);
    request.user_name = user_name;
    Ok(request)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_from_profile() {
        let profile = ProfileConfig::from_yaml(
            r#"
feedback_type: detailed
feedback_config:
  stages:
    - name: intro
      prompt: "Assess the introduction"
"#,
        )
        .unwrap();

        let request =
            request_from_profile(&profile, "transcript", "jd", Some("Ada".to_string())).unwrap();
        assert_eq!(request.feedback_type(), FeedbackType::Detailed);
        assert_eq!(request.candidate(), "Ada");
    }

    #[test]
    fn test_request_from_invalid_profile() {
        let profile = ProfileConfig::from_json(
            r#"{"feedback_type": "detailed", "feedback_config": {"stages": [{"name": "x"}]}}"#,
        )
        .unwrap();
        assert!(request_from_profile(&profile, "t", "jd", None).is_err());
    }
}
