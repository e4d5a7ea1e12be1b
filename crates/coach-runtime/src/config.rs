//! Generation settings for the feedback pipeline.
//!
//! Settings cover everything about a call that is not prompt content:
//! model, sampling temperature, per-call token budgets and the per-call
//! timeout. They load from YAML or JSON; every field has a default.
//!
//! ```yaml
//! model: gpt-4.1-nano
//! temperature: 0.7
//! timeout: 45s
//! budgets:
//!   analysis: 600
//! ```

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

use crate::providers::CompletionConfig;

/// Errors from loading generation settings.
#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Failed to read settings file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Invalid settings: {0}")]
    Invalid(String),
}

/// The kinds of call a feedback run makes, each with its own token budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallKind {
    Simple,
    Analysis,
    Synthesis,
    Stage,
}

/// Maximum completion tokens per call kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenBudgets {
    pub simple: u32,
    pub analysis: u32,
    pub synthesis: u32,
    pub stage: u32,
}

impl Default for TokenBudgets {
    fn default() -> Self {
        Self {
            simple: 1000,
            analysis: 800,
            synthesis: 1200,
            stage: 1000,
        }
    }
}

impl TokenBudgets {
    pub fn for_call(&self, kind: CallKind) -> u32 {
        match kind {
            CallKind::Simple => self.simple,
            CallKind::Analysis => self.analysis,
            CallKind::Synthesis => self.synthesis,
            CallKind::Stage => self.stage,
        }
    }
}

/// Settings shared by every call of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationSettings {
    /// Model identifier sent to the provider
    pub model: String,

    /// Sampling temperature
    pub temperature: f32,

    /// Token budgets per call kind
    pub budgets: TokenBudgets,

    /// Per-call timeout, written as a human-readable duration ("30s", "1m 30s")
    #[serde(
        serialize_with = "serialize_duration",
        deserialize_with = "deserialize_duration"
    )]
    pub timeout: Duration,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            model: "gpt-4.1-nano".to_string(),
            temperature: 0.7,
            budgets: TokenBudgets::default(),
            timeout: Duration::from_secs(30),
        }
    }
}

impl GenerationSettings {
    /// Parse settings from YAML.
    pub fn from_yaml(yaml: &str) -> Result<Self, SettingsError> {
        let settings: Self = serde_yaml::from_str(yaml)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Parse settings from JSON.
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from a file; `.json` files are read as JSON, anything else as YAML.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json(&content),
            _ => Self::from_yaml(&content),
        }
    }

    /// Set the per-call timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.model.trim().is_empty() {
            return Err(SettingsError::Invalid("model must not be empty".to_string()));
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(SettingsError::Invalid(format!(
                "temperature {} outside 0.0..=2.0",
                self.temperature
            )));
        }
        let budgets = self.budgets;
        if [budgets.simple, budgets.analysis, budgets.synthesis, budgets.stage].contains(&0) {
            return Err(SettingsError::Invalid(
                "token budgets must be greater than zero".to_string(),
            ));
        }
        if self.timeout.is_zero() {
            return Err(SettingsError::Invalid("timeout must be greater than zero".to_string()));
        }
        Ok(())
    }

    /// Provider request parameters for one call.
    pub fn completion_config(&self, max_tokens: u32, temperature: f32) -> CompletionConfig {
        CompletionConfig {
            model: self.model.clone(),
            max_tokens,
            temperature,
            timeout: self.timeout,
        }
    }
}

fn serialize_duration<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&humantime::format_duration(*duration).to_string())
}

fn deserialize_duration<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
    let raw = String::deserialize(deserializer)?;
    humantime::parse_duration(&raw).map_err(serde::de::Error::custom)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = GenerationSettings::default();
        assert_eq!(settings.model, "gpt-4.1-nano");
        assert_eq!(settings.temperature, 0.7);
        assert_eq!(settings.budgets.for_call(CallKind::Simple), 1000);
        assert_eq!(settings.budgets.for_call(CallKind::Analysis), 800);
        assert_eq!(settings.budgets.for_call(CallKind::Synthesis), 1200);
        assert_eq!(settings.budgets.for_call(CallKind::Stage), 1000);
        assert_eq!(settings.timeout, Duration::from_secs(30));
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_partial_yaml() {
        let settings = GenerationSettings::from_yaml(
            r#"
timeout: 1m 30s
budgets:
  analysis: 600
"#,
        )
        .unwrap();
        assert_eq!(settings.timeout, Duration::from_secs(90));
        assert_eq!(settings.budgets.analysis, 600);
        assert_eq!(settings.budgets.synthesis, 1200);
        assert_eq!(settings.model, "gpt-4.1-nano");
    }

    #[test]
    fn test_json_settings() {
        let settings =
            GenerationSettings::from_json(r#"{"model": "gpt-4o-mini", "timeout": "500ms"}"#).unwrap();
        assert_eq!(settings.model, "gpt-4o-mini");
        assert_eq!(settings.timeout, Duration::from_millis(500));
    }

    #[test]
    fn test_invalid_settings() {
        assert!(matches!(
            GenerationSettings::from_yaml("timeout: soon"),
            Err(SettingsError::YamlError(_))
        ));
        assert!(matches!(
            GenerationSettings::from_yaml("budgets:\n  stage: 0"),
            Err(SettingsError::Invalid(_))
        ));
        assert!(matches!(
            GenerationSettings::from_yaml("temperature: 3.5"),
            Err(SettingsError::Invalid(_))
        ));
        assert!(matches!(
            GenerationSettings::from_yaml("model: ''"),
            Err(SettingsError::Invalid(_))
        ));
    }

    #[test]
    fn test_completion_config() {
        let settings = GenerationSettings::default().with_timeout(Duration::from_secs(5));
        let config = settings.completion_config(800, 0.2);
        assert_eq!(config.max_tokens, 800);
        assert_eq!(config.temperature, 0.2);
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.model, "gpt-4.1-nano");
    }
}
