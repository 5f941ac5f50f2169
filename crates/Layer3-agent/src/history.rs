//! Message history management

use sandcode_provider::{Message, MessageRole, ToolCall, ToolResult};

/// Conversation history for one run
#[derive(Debug, Clone, Default)]
pub struct MessageHistory {
    /// Messages in order
    messages: Vec<Message>,

    system_prompt: Option<String>,
}

impl MessageHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with a system prompt
    pub fn with_system_prompt(prompt: impl Into<String>) -> Self {
        Self {
            messages: vec![],
            system_prompt: Some(prompt.into()),
        }
    }

    pub fn set_system_prompt(&mut self, prompt: impl Into<String>) {
        self.system_prompt = Some(prompt.into());
    }

    pub fn system_prompt(&self) -> Option<&str> {
        self.system_prompt.as_deref()
    }

    pub fn add_user(&mut self, content: impl Into<String>) {
        self.messages.push(Message::user(content));
    }

    pub fn add_assistant(&mut self, content: impl Into<String>) {
        self.messages.push(Message::assistant(content));
    }

    /// Add an assistant message with tool calls
    pub fn add_assistant_with_tools(
        &mut self,
        content: impl Into<String>,
        tool_calls: Vec<ToolCall>,
    ) {
        self.messages
            .push(Message::assistant_with_tools(content, tool_calls));
    }

    /// Add the result of one tool call
    pub fn add_tool_result(&mut self, result: ToolResult) {
        self.messages.push(Message::tool_result(result));
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Get messages as owned vec
    pub fn to_messages(&self) -> Vec<Message> {
        self.messages.clone()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// Get the last assistant message
    pub fn last_assistant(&self) -> Option<&Message> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == MessageRole::Assistant)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_turn_order() {
        let mut history = MessageHistory::with_system_prompt("rules");
        history.add_user("list files");
        history.add_assistant_with_tools(
            "",
            vec![ToolCall::new("call_0", "list_directory", json!({}))],
        );
        history.add_tool_result(ToolResult::new(
            "call_0",
            "list_directory",
            "(empty directory)",
            false,
        ));
        history.add_assistant("The directory is empty.");

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
        assert_eq!(history.system_prompt(), Some("rules"));
        assert_eq!(
            history.last_assistant().map(|m| m.content.as_str()),
            Some("The directory is empty.")
        );
    }

    #[test]
    fn test_empty() {
        let history = MessageHistory::new();
        assert!(history.is_empty());
        assert!(history.last().is_none());
        assert!(history.system_prompt().is_none());
    }
}
