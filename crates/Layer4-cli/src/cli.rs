//! Non-interactive CLI mode

use anyhow::Context;
use sandcode_agent::{Agent, AgentContext, AgentEvent, AgentOutcome, MessageHistory};
use sandcode_foundation::config::ENV_API_KEY;
use sandcode_foundation::AgentSettings;
use sandcode_provider::{GeminiProvider, RetryConfig};
use std::process::ExitCode;
use std::sync::Arc;
use tokio::sync::mpsc;

const MAX_OUTPUT_TOKENS: u32 = 8192;

/// Run a single prompt in non-interactive mode
pub async fn run_once(
    settings: &AgentSettings,
    prompt: &str,
    verbose: bool,
) -> anyhow::Result<ExitCode> {
    let api_key = settings
        .api_key
        .clone()
        .filter(|key| !key.trim().is_empty())
        .with_context(|| format!("{} is not set (use --api-key or the config file)", ENV_API_KEY))?;

    let sandbox = settings.sandbox_config()?;
    tracing::info!("Working directory: {}", sandbox.working_root().display());

    let mut provider = GeminiProvider::new(api_key, settings.effective_model(), MAX_OUTPUT_TOKENS);
    if let Some(base_url) = &settings.base_url {
        provider = provider.with_base_url(base_url);
    }
    let provider = Arc::new(provider);
    let ctx = AgentContext::new(provider, &sandbox)
        .with_retry(RetryConfig::with_max_retries(settings.effective_max_retries()));
    let agent = Agent::new(Arc::new(ctx)).with_max_iterations(settings.effective_max_iterations());

    if verbose {
        println!("User prompt: \"{}\"", prompt);
    }

    let (tx, mut rx) = mpsc::channel(100);

    // Spawn event handler
    let event_handle = tokio::spawn(async move {
        let mut last_usage = None;
        while let Some(event) = rx.recv().await {
            if let AgentEvent::Usage {
                input_tokens,
                output_tokens,
            } = event
            {
                last_usage = Some((input_tokens, output_tokens));
            }
            if let Some(line) = render_event(&event, verbose) {
                println!("{}", line);
            }
        }
        last_usage
    });

    let mut history = MessageHistory::new();
    let outcome = agent.run(&mut history, prompt, tx).await;

    // Wait for event handler to finish
    let last_usage = event_handle.await.unwrap_or_default();

    let code = match outcome {
        Ok(AgentOutcome::Final(text)) => {
            println!("Final response:\n{}", text);
            ExitCode::SUCCESS
        }
        Ok(AgentOutcome::MaxIterations) => {
            println!("Max iterations reached without final response.");
            ExitCode::SUCCESS
        }
        Err(e) => {
            println!("Fatal error calling model: {}", e);
            return Ok(ExitCode::FAILURE);
        }
    };

    if verbose {
        if let Some((input_tokens, output_tokens)) = last_usage {
            println!("Prompt tokens: {}", input_tokens);
            println!("Response tokens: {}", output_tokens);
        }
    }

    Ok(code)
}

/// Line printed for an agent event, if any
fn render_event(event: &AgentEvent, verbose: bool) -> Option<String> {
    match event {
        AgentEvent::ToolStart {
            tool_name,
            arguments,
            ..
        } => Some(if verbose {
            format!("Calling function: {}({})", tool_name, arguments)
        } else {
            format!(" - Calling function: {}", tool_name)
        }),
        AgentEvent::ToolComplete { payload, .. } if verbose => Some(format!("-> {}", payload)),
        _ => None,
    }
}
