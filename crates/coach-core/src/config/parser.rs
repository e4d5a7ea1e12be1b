//! Profile configuration parsing from YAML/JSON.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::fs;
use std::path::Path;
use thiserror::Error;

use super::schema::validate_feedback_config_schema;
use crate::types::FeedbackType;

/// Synthesis instruction used when a multi-analysis profile omits one.
pub const DEFAULT_SYNTHESIS_PROMPT: &str =
    "Combine the individual analyses below into a single, coherent piece of interview feedback.";

/// Errors that can occur when loading a feedback configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read configuration file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Feedback config does not match the {feedback_type} schema: {}", .errors.join("; "))]
    SchemaError {
        feedback_type: FeedbackType,
        errors: Vec<String>,
    },

    #[error("Feedback config validation failed: {0}")]
    ValidationError(String),
}

fn default_weight() -> f64 {
    1.0
}

fn default_synthesis_prompt() -> String {
    DEFAULT_SYNTHESIS_PROMPT.to_string()
}

/// One independent evaluative lens of a multi-analysis run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnalysisSpec {
    /// Identifier, also used as the operation name in logs
    pub name: String,

    /// Instruction for this analysis
    pub prompt: String,

    /// Advisory weight rendered into the synthesis prompt (must be > 0)
    #[serde(default = "default_weight")]
    pub weight: f64,
}

impl AnalysisSpec {
    pub fn new(name: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            prompt: prompt.into(),
            weight: default_weight(),
        }
    }

    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }
}

/// One step of a detailed run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StageSpec {
    pub name: String,

    pub prompt: String,

    /// Explicit terminal marker. When unset, a stage named like
    /// "synthesis" or "final" is treated as terminal.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub terminal: Option<bool>,
}

impl StageSpec {
    pub fn new(name: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            prompt: prompt.into(),
            terminal: None,
        }
    }

    pub fn terminal(mut self, terminal: bool) -> Self {
        self.terminal = Some(terminal);
        self
    }
}

/// Parameters of the single-shot strategy.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SimpleConfig {
    /// Replaces the built-in coaching template
    #[serde(default)]
    pub prompt_template: Option<String>,
}

/// Parameters of the analysis/synthesis strategy.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MultiAnalysisConfig {
    /// Analyses in rendering order
    #[serde(default)]
    pub analyses: Vec<AnalysisSpec>,

    #[serde(default = "default_synthesis_prompt")]
    pub synthesis_prompt: String,
}

impl Default for MultiAnalysisConfig {
    fn default() -> Self {
        Self {
            analyses: Vec::new(),
            synthesis_prompt: default_synthesis_prompt(),
        }
    }
}

/// Parameters of the sequential strategy.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DetailedConfig {
    /// Stages in execution order
    #[serde(default)]
    pub stages: Vec<StageSpec>,
}

/// Strategy shape plus its parameters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FeedbackConfig {
    Simple(SimpleConfig),
    MultiAnalysis(MultiAnalysisConfig),
    Detailed(DetailedConfig),
}

impl Default for FeedbackConfig {
    fn default() -> Self {
        FeedbackConfig::Simple(SimpleConfig::default())
    }
}

impl FeedbackConfig {
    /// Build a configuration from a profile's type tag and config blob.
    ///
    /// The tag is resolved with [`FeedbackType::from_tag`]; the blob is
    /// checked against the schema for that type before deserializing.
    /// A missing or `null` blob yields the type's defaults.
    pub fn from_parts(tag: Option<&str>, blob: Option<&JsonValue>) -> Result<Self, ConfigError> {
        let feedback_type = FeedbackType::from_tag(tag);
        let blob = match blob {
            Some(JsonValue::Null) | None => JsonValue::Object(Default::default()),
            Some(value) => value.clone(),
        };

        validate_feedback_config_schema(feedback_type, &blob).map_err(|errors| {
            ConfigError::SchemaError {
                feedback_type,
                errors,
            }
        })?;

        let config = match feedback_type {
            FeedbackType::Simple => FeedbackConfig::Simple(serde_json::from_value(blob)?),
            FeedbackType::MultiAnalysis => {
                FeedbackConfig::MultiAnalysis(serde_json::from_value(blob)?)
            }
            FeedbackType::Detailed => FeedbackConfig::Detailed(serde_json::from_value(blob)?),
        };

        config.validate()?;
        Ok(config)
    }

    /// The pipeline shape this configuration selects.
    pub fn feedback_type(&self) -> FeedbackType {
        match self {
            FeedbackConfig::Simple(_) => FeedbackType::Simple,
            FeedbackConfig::MultiAnalysis(_) => FeedbackType::MultiAnalysis,
            FeedbackConfig::Detailed(_) => FeedbackType::Detailed,
        }
    }

    /// Check invariants that hold regardless of how the config was built.
    ///
    /// An empty stage list is allowed here; the detailed strategy reports it
    /// as an empty-input failure at run time.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self {
            FeedbackConfig::Simple(_) => Ok(()),
            FeedbackConfig::MultiAnalysis(config) => {
                for analysis in &config.analyses {
                    if analysis.name.trim().is_empty() {
                        return Err(ConfigError::ValidationError(
                            "analysis name must not be empty".to_string(),
                        ));
                    }
                    if !(analysis.weight.is_finite() && analysis.weight > 0.0) {
                        return Err(ConfigError::ValidationError(format!(
                            "analysis '{}' has non-positive weight {}",
                            analysis.name, analysis.weight
                        )));
                    }
                }
                Ok(())
            }
            FeedbackConfig::Detailed(config) => {
                if let Some(stage) = config.stages.iter().find(|s| s.name.trim().is_empty()) {
                    return Err(ConfigError::ValidationError(format!(
                        "stage with prompt '{}' has an empty name",
                        stage.prompt
                    )));
                }
                Ok(())
            }
        }
    }
}

/// The profile record the persistence layer stores for a feedback profile.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileConfig {
    /// Strategy tag (`simple`, `multi_analysis`, `detailed`)
    #[serde(default)]
    pub feedback_type: Option<String>,

    /// Strategy parameters as stored
    #[serde(default)]
    pub feedback_config: Option<JsonValue>,
}

impl ProfileConfig {
    /// Parse a profile from YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Parse a profile from JSON string.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Parse a profile file, choosing JSON for `.json` and YAML otherwise.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json(&contents),
            _ => Self::from_yaml(&contents),
        }
    }

    /// The pipeline shape this profile selects.
    pub fn feedback_type(&self) -> FeedbackType {
        FeedbackType::from_tag(self.feedback_type.as_deref())
    }

    /// Resolve and validate the typed feedback configuration.
    pub fn feedback_config(&self) -> Result<FeedbackConfig, ConfigError> {
        FeedbackConfig::from_parts(self.feedback_type.as_deref(), self.feedback_config.as_ref())
    }
}
