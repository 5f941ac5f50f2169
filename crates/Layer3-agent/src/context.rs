//! Agent context - shared state for agent execution

use sandcode_core::{Dispatcher, ToolDefinition};
use sandcode_foundation::SandboxConfig;
use sandcode_provider::tool_def::{ToolDef, ToolParameters};
use sandcode_provider::{Provider, RetryConfig};
use std::path::PathBuf;
use std::sync::Arc;

/// Context shared across agent execution
pub struct AgentContext {
    /// Model client
    pub provider: Arc<dyn Provider>,

    /// Sandboxed tool dispatcher
    pub dispatcher: Dispatcher,

    /// Working directory every tool is confined to
    pub working_dir: PathBuf,

    /// System prompt
    pub system_prompt: String,

    /// Retry policy for model calls
    pub retry: RetryConfig,
}

impl AgentContext {
    /// Create a new agent context
    pub fn new(provider: Arc<dyn Provider>, sandbox: &SandboxConfig) -> Self {
        Self {
            provider,
            dispatcher: Dispatcher::new(sandbox),
            working_dir: sandbox.working_root().to_path_buf(),
            system_prompt: default_system_prompt(),
            retry: RetryConfig::default(),
        }
    }

    /// Set custom system prompt
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Get tool definitions for LLM
    pub fn tool_definitions(&self) -> Vec<ToolDef> {
        self.dispatcher
            .definitions()
            .into_iter()
            .map(to_tool_def)
            .collect()
    }
}

fn to_tool_def(def: ToolDefinition) -> ToolDef {
    ToolDef {
        name: def.name,
        description: def.description,
        parameters: ToolParameters {
            schema_type: def.parameters.schema_type,
            properties: def.parameters.properties,
            required: def.parameters.required,
        },
    }
}

/// Default system prompt for the agent
fn default_system_prompt() -> String {
    r#"You are a helpful AI coding agent.

Workflow:
1. When you need information, respond only with a function call
   (list_directory, read_file, write_file, or run_script).
2. The tool response will be added to the conversation.
3. Repeat function calls as needed.
4. When you can fully answer the user, reply with plain text and no
   function call.

Rules:
- Never output plans or explanations before calling a function.
- Paths must be relative to the working directory.
- Never pass a working_directory argument; it is fixed for you."#
        .to_string()
}
