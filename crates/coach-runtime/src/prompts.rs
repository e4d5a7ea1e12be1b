//! System instructions, built-in templates and fallback texts.
//!
//! Templates use the `{transcript}`, `{job_description}` and `{candidate}`
//! placeholders understood by [`coach_core::render::render_template`].

use coach_core::FeedbackType;

/// System instruction for single-shot feedback.
pub const SIMPLE_SYSTEM_PROMPT: &str = "You are an expert interview coach providing constructive feedback to help candidates improve their interview performance.";

/// System instruction for the synthesis call.
pub const SYNTHESIS_SYSTEM_PROMPT: &str = "You are an expert interview coach synthesizing multiple detailed analyses into comprehensive feedback.";

/// Built-in coaching template used when a profile sets no `prompt_template`.
pub const DEFAULT_SIMPLE_TEMPLATE: &str = r#"You are an expert interview coach. Please analyze this job interview transcript and provide detailed feedback.

Job Description:
{job_description}

Interview Transcript:
{transcript}

Please provide feedback in the following format:

Overall Rating: [Excellent/Very Good/Good/Needs Improvement/Poor]

Strengths:
- [Specific positive points]

Areas for Improvement:
- [Specific areas to work on]

Recommendations:
- [Actionable advice for future interviews]

Keep the feedback constructive, specific, and helpful for {candidate}."#;

/// Fallback text for a degraded synthesis call.
pub const SYNTHESIS_FALLBACK_MESSAGE: &str =
    "Combined analysis results would be synthesized here if API was available.";

/// Operation name of the synthesis call.
pub const SYNTHESIS_OPERATION: &str = "synthesis";

/// Operation name of the single-shot call.
pub const SIMPLE_OPERATION: &str = "simple";

pub fn analysis_system_prompt(name: &str) -> String {
    format!("You are an expert evaluating the {} aspect of an interview.", name)
}

pub fn analysis_fallback_message(name: &str) -> String {
    format!(
        "Basic {} assessment would be provided here if API was available.",
        name
    )
}

/// `number` is 1-based.
pub fn stage_system_prompt(number: usize, total: usize) -> String {
    format!(
        "You are conducting stage {} of {} in a detailed interview analysis.",
        number, total
    )
}

pub fn stage_fallback_message(number: usize) -> String {
    format!(
        "Stage {} analysis would be provided here if API was available.",
        number
    )
}

pub fn stage_operation(number: usize, name: &str) -> String {
    format!("stage_{}_{}", number, name)
}

/// Generic template for the simple re-run after a quota-degraded run.
pub fn simple_fallback_template(original: FeedbackType) -> String {
    format!(
        "You are an expert interview coach. Provide concise but helpful feedback for this {} interview analysis.\n\nJob Description:\n{{job_description}}\n\nInterview Transcript:\n{{transcript}}\n\nAddress the feedback to {{candidate}}.",
        original
    )
}
