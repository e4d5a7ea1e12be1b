//! Coach CLI
//!
//! Generate interview feedback from the command line.
//!
//! ```text
//! coach generate --profile profile.yaml --transcript interview.txt --job job.txt --name Ada
//! coach validate profile.yaml
//! coach check
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use coach_core::{request_from_profile, ProfileConfig};
use coach_runtime::{FeedbackOrchestrator, GenerationSettings, OpenAiProvider, OrchestratorError};

#[derive(Parser, Debug)]
#[command(name = "coach")]
#[command(about = "Interview feedback generation")]
#[command(version)]
struct Cli {
    /// Log at debug level unless RUST_LOG is set
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate feedback for one interview and print it as JSON
    Generate {
        /// Feedback profile (YAML, or JSON with a .json extension)
        #[arg(short, long)]
        profile: PathBuf,

        /// Interview transcript file
        #[arg(short, long)]
        transcript: PathBuf,

        /// Job description file
        #[arg(short, long)]
        job: PathBuf,

        /// Candidate display name
        #[arg(short, long)]
        name: Option<String>,

        /// Generation settings file
        #[arg(short, long)]
        settings: Option<PathBuf>,

        /// API key for the text-generation service
        #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
        api_key: Option<String>,

        /// Base URL of an OpenAI-compatible endpoint
        #[arg(long)]
        base_url: Option<String>,

        /// Print only the feedback text
        #[arg(long)]
        text: bool,
    },

    /// Check a feedback profile without generating anything
    Validate {
        /// Feedback profile (YAML, or JSON with a .json extension)
        profile: PathBuf,
    },

    /// Check that the text-generation service is reachable
    Check {
        /// Generation settings file
        #[arg(short, long)]
        settings: Option<PathBuf>,

        /// API key for the text-generation service
        #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
        api_key: Option<String>,

        /// Base URL of an OpenAI-compatible endpoint
        #[arg(long)]
        base_url: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Generate {
            profile,
            transcript,
            job,
            name,
            settings,
            api_key,
            base_url,
            text,
        } => {
            let profile = load_profile(&profile)?;
            let transcript = read_text(&transcript, "transcript")?;
            let job_description = read_text(&job, "job description")?;
            let request = request_from_profile(&profile, transcript, job_description, name)
                .context("Invalid feedback profile")?;

            let orchestrator = build_orchestrator(settings, api_key, base_url)?;

            let cancel = CancellationToken::new();
            let on_interrupt = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    on_interrupt.cancel();
                }
            });

            let result = match orchestrator
                .generate_feedback_with_cancel(&request, cancel)
                .await
            {
                Ok(result) => result,
                Err(OrchestratorError::Cancelled) => {
                    tracing::warn!("Interrupted, no feedback generated");
                    std::process::exit(130);
                }
                Err(e) => return Err(e.into()),
            };

            tracing::info!(
                strategy_used = %result.strategy_used,
                calls = result.usage.llm_calls,
                tokens = result.usage.total_tokens,
                "Feedback ready"
            );

            if text {
                println!("{}", result.text);
            } else {
                println!("{}", serde_json::to_string_pretty(&result)?);
            }
        }

        Command::Validate { profile } => {
            let loaded = load_profile(&profile)?;
            let config = loaded
                .feedback_config()
                .with_context(|| format!("{} is not a valid feedback profile", profile.display()))?;
            println!("{}: valid {} profile", profile.display(), config.feedback_type());
        }

        Command::Check {
            settings,
            api_key,
            base_url,
        } => {
            let orchestrator = build_orchestrator(settings, api_key, base_url)?;
            let provider = orchestrator.client().provider_name().to_string();
            if !orchestrator.health_check().await {
                anyhow::bail!("{} provider is not reachable", provider);
            }
            println!("{}: ok", provider);
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn build_orchestrator(
    settings: Option<PathBuf>,
    api_key: Option<String>,
    base_url: Option<String>,
) -> Result<FeedbackOrchestrator> {
    let settings = match settings {
        Some(path) => GenerationSettings::from_file(&path)
            .with_context(|| format!("Failed to load settings from {}", path.display()))?,
        None => GenerationSettings::default(),
    };

    let mut provider_config = serde_json::Map::new();
    if let Some(key) = api_key {
        provider_config.insert("api_key".to_string(), key.into());
    }
    if let Some(url) = base_url {
        provider_config.insert("base_url".to_string(), url.into());
    }
    let provider = OpenAiProvider::from_config(&provider_config.into())
        .context("Text-generation provider not configured")?;

    Ok(FeedbackOrchestrator::builder()
        .provider(Arc::new(provider))
        .settings(settings)
        .build()?)
}

fn load_profile(path: &Path) -> Result<ProfileConfig> {
    ProfileConfig::from_file(path)
        .with_context(|| format!("Failed to load profile from {}", path.display()))
}

fn read_text(path: &Path, what: &str) -> Result<String> {
    std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {} from {}", what, path.display()))
}
