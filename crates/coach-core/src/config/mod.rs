//! Feedback profile configuration.
//!
//! Profiles are stored as a type tag plus a free-form config blob. This
//! module resolves the tag, validates the blob against a JSON Schema and
//! produces a typed [`FeedbackConfig`].

mod parser;
mod schema;

pub use parser::{
    AnalysisSpec, ConfigError, DetailedConfig, FeedbackConfig, MultiAnalysisConfig,
    ProfileConfig, SimpleConfig, StageSpec, DEFAULT_SYNTHESIS_PROMPT,
};
pub use schema::validate_feedback_config_schema;
