//! # sandcode-provider
//!
//! Model client layer for sandcode.
//!
//! ## Features
//! - Provider-neutral conversation types (messages, tool calls, tool results)
//! - Automatic retry with exponential backoff
//! - Google Gemini function calling over the `generateContent` API

pub mod error;
pub mod message;
pub mod providers;
pub mod retry;
pub mod tool_def;
pub mod r#trait;

// Core traits and types
pub use message::{Message, MessageRole, ToolCall, ToolResult};
pub use r#trait::{
    FinishReason, ModelInfo, Provider, ProviderMetadata, ProviderResponse, TokenUsage,
};
pub use tool_def::ToolDef;

// Error and retry
pub use error::ProviderError;
pub use retry::{with_retry, RetryConfig};

// Provider implementations
pub use providers::gemini::GeminiProvider;
