//! Dialogue loop tests against a scripted model

use async_trait::async_trait;
use sandcode_agent::{Agent, AgentContext, AgentEvent, AgentOutcome, MessageHistory};
use sandcode_foundation::{Error, SandboxConfig};
use sandcode_provider::{
    Message, MessageRole, ModelInfo, Provider, ProviderError, ProviderMetadata,
    ProviderResponse, RetryConfig, ToolCall, ToolDef,
};
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::fs;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use tokio::sync::mpsc;

/// Replays canned responses and records every request
struct ScriptedProvider {
    metadata: ProviderMetadata,
    model: ModelInfo,
    script: Mutex<VecDeque<Result<ProviderResponse, ProviderError>>>,
    fallback: ProviderResponse,
    requests: Mutex<Vec<Vec<Message>>>,
}

impl ScriptedProvider {
    fn new(script: Vec<Result<ProviderResponse, ProviderError>>) -> Self {
        Self {
            metadata: ProviderMetadata {
                id: "scripted".into(),
                display_name: "Scripted".into(),
                default_model: "scripted".into(),
                api_key_env: None,
            },
            model: ModelInfo::new("scripted", "scripted"),
            script: Mutex::new(script.into()),
            fallback: ProviderResponse::text("done"),
            requests: Mutex::new(Vec::new()),
        }
    }

    fn with_fallback(mut self, fallback: ProviderResponse) -> Self {
        self.fallback = fallback;
        self
    }

    fn requests(&self) -> Vec<Vec<Message>> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Provider for ScriptedProvider {
    fn metadata(&self) -> &ProviderMetadata {
        &self.metadata
    }

    fn model(&self) -> &ModelInfo {
        &self.model
    }

    async fn complete(
        &self,
        messages: Vec<Message>,
        _tools: Vec<ToolDef>,
        _system_prompt: Option<String>,
    ) -> Result<ProviderResponse, ProviderError> {
        self.requests.lock().unwrap().push(messages);
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(self.fallback.clone()))
    }

    fn is_available(&self) -> bool {
        true
    }
}

fn call(id: &str, name: &str, args: Value) -> ToolCall {
    ToolCall::new(id, name, args)
}

fn fast_retry() -> RetryConfig {
    RetryConfig {
        max_retries: 2,
        initial_delay_ms: 1,
        max_delay_ms: 2,
        jitter: false,
        ..Default::default()
    }
}

struct Harness {
    temp: TempDir,
    provider: Arc<ScriptedProvider>,
    agent: Agent,
}

fn harness(provider: ScriptedProvider, retry: RetryConfig) -> Harness {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("main.py"), "print('hello')").unwrap();

    let sandbox = SandboxConfig::new(temp.path()).unwrap();
    let provider = Arc::new(provider);
    let ctx = AgentContext::new(provider.clone(), &sandbox).with_retry(retry);

    Harness {
        temp,
        provider,
        agent: Agent::new(Arc::new(ctx)),
    }
}

async fn run(
    agent: &Agent,
    history: &mut MessageHistory,
    prompt: &str,
) -> (sandcode_foundation::Result<AgentOutcome>, Vec<AgentEvent>) {
    let (tx, mut rx) = mpsc::channel(100);
    let outcome = agent.run(history, prompt, tx).await;

    let mut events = Vec::new();
    while let Some(event) = rx.recv().await {
        events.push(event);
    }
    (outcome, events)
}

#[tokio::test]
async fn test_tool_call_then_final_answer() {
    let h = harness(
        ScriptedProvider::new(vec![
            Ok(ProviderResponse::tool_calls(vec![call("call_0", "list_directory", json!({}))])
                .with_usage(50, 5)),
            Ok(ProviderResponse::text("  There is one file.\n").with_usage(80, 6)),
        ]),
        fast_retry(),
    );

    let mut history = MessageHistory::new();
    let (outcome, events) = run(&h.agent, &mut history, "what files are here?").await;

    assert_eq!(outcome.unwrap(), AgentOutcome::Final("There is one file.".into()));

    let roles: Vec<_> = history.messages().iter().map(|m| m.role).collect();
    assert_eq!(
        roles,
        [
            MessageRole::User,
            MessageRole::Assistant,
            MessageRole::Tool,
            MessageRole::Assistant
        ]
    );

    // second request carries the tool result
    let requests = h.provider.requests();
    assert_eq!(requests.len(), 2);
    let result = requests[1].last().unwrap().tool_result.clone().unwrap();
    assert_eq!(result.name, "list_directory");
    assert_eq!(
        result.content,
        "- main.py: file_size=14 bytes, is_dir=False"
    );
    assert!(!result.is_error);

    assert!(matches!(
        &events[1],
        AgentEvent::ToolStart { tool_name, .. } if tool_name == "list_directory"
    ));
    assert!(matches!(
        &events[2],
        AgentEvent::ToolComplete { success: true, payload, .. }
            if payload["result"].as_str().unwrap().contains("main.py")
    ));
    assert!(matches!(
        events.last(),
        Some(AgentEvent::Done { full_response }) if full_response == "There is one file."
    ));
}

#[tokio::test]
async fn test_tool_failure_goes_back_to_model() {
    let h = harness(
        ScriptedProvider::new(vec![Ok(ProviderResponse::tool_calls(vec![
            call("call_0", "read_file", json!({ "file_path": "../secret.txt" })),
            call("call_1", "delete_everything", json!({})),
        ]))]),
        fast_retry(),
    );

    let mut history = MessageHistory::new();
    let (outcome, events) = run(&h.agent, &mut history, "read the secret").await;

    assert_eq!(outcome.unwrap(), AgentOutcome::Final("done".into()));

    let failures: Vec<_> = events
        .iter()
        .filter_map(|e| match e {
            AgentEvent::ToolComplete {
                success: false,
                payload,
                ..
            } => Some(payload["error"].as_str().unwrap().to_string()),
            _ => None,
        })
        .collect();
    assert_eq!(failures.len(), 2);
    assert!(failures[0].starts_with("Error: Cannot read \"../secret.txt\""));
    assert_eq!(failures[1], "Error: Unknown function: delete_everything");

    let last_request = h.provider.requests().pop().unwrap();
    let results: Vec<_> = last_request
        .iter()
        .filter_map(|m| m.tool_result.as_ref())
        .collect();
    assert_eq!(results.len(), 2);
    assert!(results.iter().all(|r| r.is_error));
}

#[tokio::test]
async fn test_max_iterations() {
    let provider = ScriptedProvider::new(vec![]).with_fallback(ProviderResponse::tool_calls(
        vec![call("call_0", "list_directory", json!({}))],
    ));
    let mut h = harness(provider, fast_retry());
    h.agent = h.agent.with_max_iterations(3);

    let mut history = MessageHistory::new();
    let (outcome, events) = run(&h.agent, &mut history, "loop forever").await;

    assert_eq!(outcome.unwrap(), AgentOutcome::MaxIterations);
    assert_eq!(h.provider.requests().len(), 3);
    assert!(!events
        .iter()
        .any(|e| matches!(e, AgentEvent::Done { .. })));
}

#[tokio::test]
async fn test_model_failure_ends_run() {
    let h = harness(
        ScriptedProvider::new(vec![Err(ProviderError::Authentication(
            "API key not valid".into(),
        ))]),
        fast_retry(),
    );

    let mut history = MessageHistory::new();
    let (outcome, events) = run(&h.agent, &mut history, "hello").await;

    let err = outcome.unwrap_err();
    assert!(matches!(err, Error::Api { .. }));
    assert!(err.to_string().contains("API key not valid"));
    assert_eq!(h.provider.requests().len(), 1);
    assert!(events.is_empty());
}

#[tokio::test]
async fn test_transient_failure_is_retried() {
    let h = harness(
        ScriptedProvider::new(vec![
            Err(ProviderError::ServerError("overloaded".into())),
            Err(ProviderError::Network("reset".into())),
            Ok(ProviderResponse::text("recovered")),
        ]),
        fast_retry(),
    );

    let mut history = MessageHistory::new();
    let (outcome, _) = run(&h.agent, &mut history, "hello").await;

    assert_eq!(outcome.unwrap(), AgentOutcome::Final("recovered".into()));
    assert_eq!(h.provider.requests().len(), 3);
}

#[tokio::test]
async fn test_model_cannot_move_working_directory() {
    let outside = TempDir::new().unwrap();
    let h = harness(
        ScriptedProvider::new(vec![Ok(ProviderResponse::tool_calls(vec![call(
            "call_0",
            "write_file",
            json!({
                "file_path": "notes.txt",
                "content": "hi",
                "working_directory": outside.path().to_string_lossy()
            }),
        )]))]),
        fast_retry(),
    );

    let mut history = MessageHistory::new();
    let (outcome, _) = run(&h.agent, &mut history, "write a note").await;

    assert!(outcome.is_ok());
    assert_eq!(
        fs::read_to_string(h.temp.path().join("notes.txt")).unwrap(),
        "hi"
    );
    assert!(!outside.path().join("notes.txt").exists());
}
