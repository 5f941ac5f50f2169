//! Provider trait and common types

use crate::error::ProviderError;
use crate::{Message, ToolCall, ToolDef};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Token usage reported by a provider
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    /// Prompt tokens
    pub input_tokens: u32,

    /// Response tokens
    pub output_tokens: u32,
}

/// Model information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelInfo {
    /// Model ID (e.g., "gemini-2.0-flash-001")
    pub id: String,

    /// Provider name (e.g., "gemini")
    pub provider: String,

    pub display_name: String,

    /// Context window size (tokens)
    pub context_window: u32,

    /// Max output tokens
    pub max_output_tokens: u32,
}

impl ModelInfo {
    pub fn new(id: impl Into<String>, provider: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            display_name: id.clone(),
            id,
            provider: provider.into(),
            context_window: 128000,
            max_output_tokens: 8192,
        }
    }
}

/// Provider metadata
#[derive(Debug, Clone)]
pub struct ProviderMetadata {
    /// Provider ID (e.g., "gemini")
    pub id: String,

    /// Display name (e.g., "Google Gemini")
    pub display_name: String,

    /// Default model ID
    pub default_model: String,

    /// Environment variable holding the API key
    pub api_key_env: Option<String>,
}

/// LLM Provider trait
///
/// Implement this trait to add support for a new LLM provider.
#[async_trait]
pub trait Provider: Send + Sync {
    fn metadata(&self) -> &ProviderMetadata;

    /// Get current model information
    fn model(&self) -> &ModelInfo;

    /// Send messages and get a complete response
    async fn complete(
        &self,
        messages: Vec<Message>,
        tools: Vec<ToolDef>,
        system_prompt: Option<String>,
    ) -> Result<ProviderResponse, ProviderError>;

    /// Check if the provider is available (e.g., API key is set)
    fn is_available(&self) -> bool;
}

/// Complete response from provider
#[derive(Debug, Clone, Default)]
pub struct ProviderResponse {
    /// Text content
    pub content: String,

    /// Tool calls (if any)
    pub tool_calls: Vec<ToolCall>,

    pub usage: TokenUsage,

    pub finish_reason: FinishReason,

    /// Model used (may differ from requested if fallback occurred)
    pub model: String,
}

impl ProviderResponse {
    /// Plain text response with no tool calls
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            finish_reason: FinishReason::Stop,
            ..Default::default()
        }
    }

    /// Response requesting tool calls
    pub fn tool_calls(tool_calls: Vec<ToolCall>) -> Self {
        Self {
            tool_calls,
            finish_reason: FinishReason::ToolUse,
            ..Default::default()
        }
    }

    pub fn with_usage(mut self, input_tokens: u32, output_tokens: u32) -> Self {
        self.usage = TokenUsage {
            input_tokens,
            output_tokens,
        };
        self
    }
}

/// Reason for completion finishing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FinishReason {
    /// Completed naturally
    Stop,

    /// Hit max tokens limit
    MaxTokens,

    /// Tool use requested
    ToolUse,

    /// Content filtered
    ContentFilter,

    /// Unknown/other
    #[default]
    Other,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_response_builders() {
        let text = ProviderResponse::text("done").with_usage(3, 1);
        assert_eq!(text.finish_reason, FinishReason::Stop);
        assert!(text.tool_calls.is_empty());
        assert_eq!(text.usage.output_tokens, 1);

        let calls = ProviderResponse::tool_calls(vec![ToolCall::new(
            "call_0",
            "list_directory",
            json!({}),
        )]);
        assert_eq!(calls.finish_reason, FinishReason::ToolUse);
        assert_eq!(calls.tool_calls.len(), 1);
    }
}
