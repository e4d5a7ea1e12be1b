//! Deterministic prompt and output assembly.
//!
//! Everything the strategies send to the model, and every combined
//! output they return, is rendered here. Nothing in this module performs
//! I/O, so prompt construction can be tested exhaustively without a
//! provider.
//!
//! ## Ordering
//!
//! Analyses and stages are rendered in the order given. Reordering the
//! input changes the rendered text, and for detailed runs it also changes
//! which results each stage can see.

use lazy_static::lazy_static;
use regex::{Captures, Regex};

use crate::config::{AnalysisSpec, StageSpec};
use crate::types::{AnalysisResult, FeedbackRequest, StageResult};

lazy_static! {
    /// Placeholders recognised in prompt templates.
    static ref PLACEHOLDER: Regex =
        Regex::new(r"\{(transcript|job_description|candidate)\}").unwrap();

    /// Stage names that mark the last stage as a synthesis of the others.
    static ref TERMINAL_STAGE_NAME: Regex = Regex::new(r"(?i)synthesis|final").unwrap();
}

/// Substitute `{transcript}`, `{job_description}` and `{candidate}` in a template.
///
/// Substitution is single-pass: placeholder text that appears inside the
/// transcript itself is left untouched. Templates without placeholders
/// are returned verbatim.
pub fn render_template(template: &str, request: &FeedbackRequest) -> String {
    PLACEHOLDER
        .replace_all(template, |caps: &Captures<'_>| match &caps[1] {
            "transcript" => request.transcript.clone(),
            "job_description" => request.job_description.clone(),
            _ => request.candidate().to_string(),
        })
        .into_owned()
}

fn interview_sections(request: &FeedbackRequest) -> String {
    format!(
        "Job Description:\n{}\n\nInterview Transcript:\n{}",
        request.job_description, request.transcript
    )
}

/// Prompt for one independent analysis.
pub fn analysis_prompt(analysis: &AnalysisSpec, request: &FeedbackRequest) -> String {
    format!(
        "{}\n\n{}\n\nProvide specific, detailed analysis for {}.",
        analysis.prompt,
        interview_sections(request),
        request.candidate()
    )
}

/// One analysis as it appears in the synthesis prompt: `NAME (Weight: w):\ntext`.
pub fn analysis_block(result: &AnalysisResult) -> String {
    format!(
        "{} (Weight: {}):\n{}",
        result.name.to_uppercase(),
        result.weight,
        result.text
    )
}

/// Prompt for the synthesis call that merges all analyses.
pub fn synthesis_prompt(
    synthesis_instruction: &str,
    results: &[AnalysisResult],
    request: &FeedbackRequest,
) -> String {
    let blocks = results
        .iter()
        .map(analysis_block)
        .collect::<Vec<_>>()
        .join("\n\n");

    format!(
        "{}\n\nIndividual Analyses:\n\n{}\n\nCreate a comprehensive, well-structured final feedback for {}.",
        synthesis_instruction,
        blocks,
        request.candidate()
    )
}

/// Prompt for one stage of a detailed run.
///
/// `previous` holds every earlier stage's result in execution order; it is
/// empty for the first stage.
pub fn stage_prompt(
    stage: &StageSpec,
    request: &FeedbackRequest,
    previous: &[StageResult],
) -> String {
    let mut prompt = format!("{}\n\n{}", stage.prompt, interview_sections(request));

    if !previous.is_empty() {
        let context = previous
            .iter()
            .map(|s| format!("{}: {}", s.name, s.text))
            .collect::<Vec<_>>()
            .join("\n\n");
        prompt.push_str("\n\nPrevious Analysis Results:\n");
        prompt.push_str(&context);
    }

    prompt.push_str(&format!("\n\nAnalyze for {}.", request.candidate()));
    prompt
}

/// Whether a stage's output should be returned as the whole run's feedback.
///
/// An explicit `terminal` flag wins. Otherwise the name is matched,
/// case-insensitively, against "synthesis" or "final".
pub fn is_terminal_stage(stage: &StageSpec) -> bool {
    stage
        .terminal
        .unwrap_or_else(|| TERMINAL_STAGE_NAME.is_match(&stage.name))
}

/// Join every stage result as `NAME:\ntext`, separated by blank lines.
pub fn combine_stage_results(results: &[StageResult]) -> String {
    results
        .iter()
        .map(|s| format!("{}:\n{}", s.name.to_uppercase(), s.text))
        .collect::<Vec<_>>()
        .join("\n\n")
}
