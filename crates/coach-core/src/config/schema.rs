//! JSON Schema validation for stored feedback configuration blobs.
//!
//! Each feedback type has its own schema under `schema/`. Blobs are
//! validated before deserialization so that profile authors get the
//! offending path instead of a generic serde error.

use std::sync::OnceLock;

use crate::types::FeedbackType;

const SIMPLE_SCHEMA_JSON: &str = include_str!("../../schema/simple.schema.json");
const MULTI_ANALYSIS_SCHEMA_JSON: &str = include_str!("../../schema/multi_analysis.schema.json");
const DETAILED_SCHEMA_JSON: &str = include_str!("../../schema/detailed.schema.json");

type CompiledSchema = OnceLock<Result<jsonschema::Validator, String>>;

static SIMPLE_SCHEMA: CompiledSchema = OnceLock::new();
static MULTI_ANALYSIS_SCHEMA: CompiledSchema = OnceLock::new();
static DETAILED_SCHEMA: CompiledSchema = OnceLock::new();

fn compile(source: &str) -> Result<jsonschema::Validator, String> {
    let schema: serde_json::Value =
        serde_json::from_str(source).map_err(|e| format!("Invalid schema JSON: {}", e))?;
    jsonschema::options()
        .build(&schema)
        .map_err(|e| format!("Failed to compile schema: {}", e))
}

fn get_validator(feedback_type: FeedbackType) -> Result<&'static jsonschema::Validator, String> {
    let (cell, source) = match feedback_type {
        FeedbackType::Simple => (&SIMPLE_SCHEMA, SIMPLE_SCHEMA_JSON),
        FeedbackType::MultiAnalysis => (&MULTI_ANALYSIS_SCHEMA, MULTI_ANALYSIS_SCHEMA_JSON),
        FeedbackType::Detailed => (&DETAILED_SCHEMA, DETAILED_SCHEMA_JSON),
    };

    cell.get_or_init(|| compile(source))
        .as_ref()
        .map_err(|e| e.clone())
}

/// Validate a config blob against the schema for `feedback_type`.
///
/// Returns every violation found, formatted as `message at /path`.
pub fn validate_feedback_config_schema(
    feedback_type: FeedbackType,
    blob: &serde_json::Value,
) -> Result<(), Vec<String>> {
    let validator = get_validator(feedback_type).map_err(|e| vec![e])?;

    let errors: Vec<String> = validator
        .iter_errors(blob)
        .map(|e| format!("{} at {}", e, e.instance_path))
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        tracing::debug!(
            feedback_type = %feedback_type,
            errors = errors.len(),
            "Feedback config rejected by schema"
        );
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_all_schemas_compile() {
        for feedback_type in [
            FeedbackType::Simple,
            FeedbackType::MultiAnalysis,
            FeedbackType::Detailed,
        ] {
            assert!(get_validator(feedback_type).is_ok(), "{} schema", feedback_type);
        }
    }

    #[test]
    fn test_simple_accepts_null_template() {
        assert!(validate_feedback_config_schema(FeedbackType::Simple, &json!({})).is_ok());
        assert!(validate_feedback_config_schema(
            FeedbackType::Simple,
            &json!({ "prompt_template": null })
        )
        .is_ok());
        assert!(validate_feedback_config_schema(
            FeedbackType::Simple,
            &json!({ "prompt_template": 42 })
        )
        .is_err());
    }

    #[test]
    fn test_analysis_requires_name_and_prompt() {
        let value = json!({ "analyses": [{ "name": "clarity" }] });
        let errors = validate_feedback_config_schema(FeedbackType::MultiAnalysis, &value)
            .unwrap_err();
        assert!(!errors.is_empty());
        assert!(errors.iter().any(|e| e.contains("/analyses/0")));
    }

    #[test]
    fn test_weight_must_be_positive() {
        let zero = json!({ "analyses": [{ "name": "a", "prompt": "p", "weight": 0 }] });
        assert!(validate_feedback_config_schema(FeedbackType::MultiAnalysis, &zero).is_err());

        let fractional = json!({ "analyses": [{ "name": "a", "prompt": "p", "weight": 0.5 }] });
        assert!(validate_feedback_config_schema(FeedbackType::MultiAnalysis, &fractional).is_ok());
    }

    #[test]
    fn test_stage_shape() {
        let valid = json!({
            "stages": [
                { "name": "intro", "prompt": "Assess intro" },
                { "name": "wrap", "prompt": "Summarize", "terminal": true }
            ]
        });
        assert!(validate_feedback_config_schema(FeedbackType::Detailed, &valid).is_ok());

        let invalid = json!({ "stages": [{ "name": "", "prompt": "p" }] });
        assert!(validate_feedback_config_schema(FeedbackType::Detailed, &invalid).is_err());

        let not_a_list = json!({ "stages": "intro" });
        assert!(validate_feedback_config_schema(FeedbackType::Detailed, &not_a_list).is_err());
    }

    #[test]
    fn test_extra_profile_fields_tolerated() {
        let value = json!({ "stages": [], "ui_color": "blue" });
        assert!(validate_feedback_config_schema(FeedbackType::Detailed, &value).is_ok());
    }
}
