//! sandcode CLI - Main entry point

mod cli;

use clap::Parser;
use sandcode_foundation::AgentSettings;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// sandcode - a Gemini coding agent confined to one working directory
#[derive(Parser, Debug)]
#[command(name = "sandcode")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Prompt for the agent (words are joined with spaces)
    prompt: Vec<String>,

    /// Print tool arguments, tool results and token usage
    #[arg(long)]
    verbose: bool,

    /// Directory the tools are confined to (default: current directory)
    #[arg(long)]
    working_dir: Option<PathBuf>,

    /// Only allow writes inside this subdirectory of the working directory
    #[arg(long)]
    safe_root: Option<PathBuf>,

    /// Model to use
    #[arg(long)]
    model: Option<String>,

    /// API key (overrides env and config)
    #[arg(long)]
    api_key: Option<String>,

    /// Base URL of the model API
    #[arg(long)]
    base_url: Option<String>,

    /// Maximum model calls per run
    #[arg(long)]
    max_iterations: Option<u32>,

    /// Interpreter used by run_script
    #[arg(long)]
    interpreter: Option<String>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

impl Args {
    fn prompt(&self) -> String {
        self.prompt.join(" ").trim().to_string()
    }

    /// Settings layer from command-line flags
    fn overrides(&self) -> AgentSettings {
        AgentSettings {
            api_key: self.api_key.clone(),
            model: self.model.clone(),
            base_url: self.base_url.clone(),
            working_dir: self.working_dir.clone(),
            safe_root: self.safe_root.clone(),
            max_iterations: self.max_iterations,
            interpreter: self.interpreter.clone(),
            ..Default::default()
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let args = Args::parse();

    let prompt = args.prompt();
    if prompt.is_empty() {
        eprintln!("usage: sandcode \"prompt\" [--verbose]");
        return Ok(ExitCode::FAILURE);
    }

    // Initialize logging (stderr keeps stdout for the conversation)
    let log_level = if args.debug {
        "debug"
    } else if args.verbose {
        "info"
    } else {
        "warn"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    // Load configuration
    let mut settings = AgentSettings::load().unwrap_or_else(|e| {
        eprintln!("Warning: Failed to load config: {}", e);
        let mut settings = AgentSettings::default();
        settings.apply_env(|key| std::env::var(key).ok());
        settings
    });
    settings.merge(args.overrides());

    cli::run_once(&settings, &prompt, args.verbose).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_words_joined() {
        let args = Args::try_parse_from(["sandcode", "fix", "the", "bug", "--verbose"]).unwrap();
        assert_eq!(args.prompt(), "fix the bug");
        assert!(args.verbose);

        let args = Args::try_parse_from(["sandcode"]).unwrap();
        assert!(args.prompt().is_empty());
    }

    #[test]
    fn test_flags_override_settings() {
        let args = Args::try_parse_from([
            "sandcode",
            "hello",
            "--model",
            "gemini-1.5-pro",
            "--max-iterations",
            "5",
            "--safe-root",
            "pkg",
        ])
        .unwrap();

        let mut settings = AgentSettings {
            model: Some("gemini-2.0-flash-001".into()),
            api_key: Some("from-config".into()),
            ..Default::default()
        };
        settings.merge(args.overrides());

        assert_eq!(settings.effective_model(), "gemini-1.5-pro");
        assert_eq!(settings.effective_max_iterations(), 5);
        assert_eq!(settings.safe_root, Some(PathBuf::from("pkg")));
        assert_eq!(settings.api_key.as_deref(), Some("from-config"));
    }
}
