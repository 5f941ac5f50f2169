//! Core agent implementation

use crate::context::AgentContext;
use crate::history::MessageHistory;
use sandcode_foundation::{Error, Result, DEFAULT_MAX_ITERATIONS};
use sandcode_provider::{with_retry, ProviderResponse, ToolCall, ToolResult};
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Events emitted by the agent during execution
#[derive(Debug, Clone)]
pub enum AgentEvent {
    /// Tool execution started
    ToolStart {
        tool_name: String,
        tool_call_id: String,
        arguments: Value,
    },

    /// Tool execution completed
    ToolComplete {
        tool_name: String,
        tool_call_id: String,
        /// `{"result": ...}` or `{"error": ...}`
        payload: Value,
        success: bool,
    },

    /// Token usage of one model call
    Usage {
        input_tokens: u32,
        output_tokens: u32,
    },

    /// Final answer produced
    Done { full_response: String },
}

/// How a run ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AgentOutcome {
    /// Model answered with plain text (trimmed)
    Final(String),

    /// Iteration cap hit while the model was still calling tools
    MaxIterations,
}

/// The core agent that handles conversation with LLM
pub struct Agent {
    ctx: Arc<AgentContext>,

    /// Maximum model calls per run
    max_iterations: u32,
}

impl Agent {
    pub fn new(ctx: Arc<AgentContext>) -> Self {
        Self {
            ctx,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }

    /// Set maximum iterations for tool use loop
    pub fn with_max_iterations(mut self, max: u32) -> Self {
        self.max_iterations = max;
        self
    }

    /// Run the agent with a user message
    ///
    /// Model call failures (after retries) end the run with an error;
    /// tool failures never do, they go back to the model as results.
    pub async fn run(
        &self,
        history: &mut MessageHistory,
        user_message: &str,
        event_tx: mpsc::Sender<AgentEvent>,
    ) -> Result<AgentOutcome> {
        history.add_user(user_message);

        if history.system_prompt().is_none() {
            history.set_system_prompt(&self.ctx.system_prompt);
        }

        for iteration in 1..=self.max_iterations {
            debug!("Iteration {}/{}", iteration, self.max_iterations);

            let response = self.call_model(history).await?;

            let _ = event_tx
                .send(AgentEvent::Usage {
                    input_tokens: response.usage.input_tokens,
                    output_tokens: response.usage.output_tokens,
                })
                .await;

            // No tool calls: this is the answer
            if response.tool_calls.is_empty() {
                history.add_assistant(&response.content);

                let full_response = response.content.trim().to_string();
                let _ = event_tx
                    .send(AgentEvent::Done {
                        full_response: full_response.clone(),
                    })
                    .await;

                return Ok(AgentOutcome::Final(full_response));
            }

            history.add_assistant_with_tools(&response.content, response.tool_calls.clone());

            for tool_call in &response.tool_calls {
                let result = self.execute_tool(tool_call, &event_tx).await;
                history.add_tool_result(result);
            }
        }

        warn!(
            "Max iterations ({}) reached without final response",
            self.max_iterations
        );
        Ok(AgentOutcome::MaxIterations)
    }

    async fn call_model(&self, history: &MessageHistory) -> Result<ProviderResponse> {
        let messages = history.to_messages();
        let tools = self.ctx.tool_definitions();
        let system_prompt = history.system_prompt().map(|s| s.to_string());

        with_retry(&self.ctx.retry, "generate content", || {
            self.ctx
                .provider
                .complete(messages.clone(), tools.clone(), system_prompt.clone())
        })
        .await
        .map_err(Error::from)
    }

    /// Execute a single tool call
    async fn execute_tool(
        &self,
        tool_call: &ToolCall,
        event_tx: &mpsc::Sender<AgentEvent>,
    ) -> ToolResult {
        info!("Executing tool: {}", tool_call.name);

        let _ = event_tx
            .send(AgentEvent::ToolStart {
                tool_name: tool_call.name.clone(),
                tool_call_id: tool_call.id.clone(),
                arguments: tool_call.arguments.clone(),
            })
            .await;

        let response = self
            .ctx
            .dispatcher
            .dispatch(&tool_call.name, tool_call.arguments.clone())
            .await;

        let _ = event_tx
            .send(AgentEvent::ToolComplete {
                tool_name: tool_call.name.clone(),
                tool_call_id: tool_call.id.clone(),
                payload: response.to_payload(),
                success: !response.is_error(),
            })
            .await;

        ToolResult::new(
            &tool_call.id,
            &tool_call.name,
            response.content(),
            response.is_error(),
        )
    }
}
