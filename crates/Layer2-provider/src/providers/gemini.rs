//! Google Gemini provider implementation (generateContent REST API)

use crate::{
    error::ProviderError,
    r#trait::{FinishReason, ModelInfo, Provider, ProviderMetadata, ProviderResponse, TokenUsage},
    Message, MessageRole, ToolCall, ToolDef, ToolResult,
};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;
use tracing::debug;

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const REQUEST_TIMEOUT_SECS: u64 = 120;

/// Deterministic sampling
const TEMPERATURE: f32 = 0.0;

pub const DEFAULT_MODEL: &str = "gemini-2.0-flash-001";
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Google Gemini provider
pub struct GeminiProvider {
    client: Client,
    api_key: String,
    model_info: ModelInfo,
    metadata: ProviderMetadata,
    max_tokens: u32,
    base_url: String,
}

impl GeminiProvider {
    /// Create a new Gemini provider
    pub fn new(api_key: impl Into<String>, model: impl Into<String>, max_tokens: u32) -> Self {
        let model_id = model.into();

        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
                .build()
                .unwrap_or_default(),
            api_key: api_key.into(),
            model_info: Self::get_model_info(&model_id),
            metadata: Self::create_metadata(),
            max_tokens,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn create_metadata() -> ProviderMetadata {
        ProviderMetadata {
            id: "gemini".to_string(),
            display_name: "Google Gemini".to_string(),
            default_model: DEFAULT_MODEL.to_string(),
            api_key_env: Some(API_KEY_ENV.to_string()),
        }
    }

    fn get_model_info(model_id: &str) -> ModelInfo {
        let display_name = match model_id {
            "gemini-2.0-flash" | "gemini-2.0-flash-001" => "Gemini 2.0 Flash",
            "gemini-2.0-flash-lite" | "gemini-2.0-flash-lite-001" => "Gemini 2.0 Flash Lite",
            "gemini-1.5-pro" => "Gemini 1.5 Pro",
            "gemini-1.5-flash" => "Gemini 1.5 Flash",
            _ => return ModelInfo::new(model_id, "gemini"),
        };

        ModelInfo {
            display_name: display_name.to_string(),
            context_window: 1048576,
            ..ModelInfo::new(model_id, "gemini")
        }
    }

    fn generate_url(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model_info.id)
    }

    fn build_request(
        &self,
        messages: &[Message],
        tools: &[ToolDef],
        system_prompt: Option<&str>,
    ) -> GeminiRequest {
        let mut contents: Vec<GeminiContent> = vec![];

        for msg in messages {
            let content = GeminiContent::from(msg);

            // 한 턴의 function response는 하나의 content로 묶음
            if let Some(last) = contents.last_mut() {
                if last.role == FUNCTION_ROLE && content.role == FUNCTION_ROLE {
                    last.parts.extend(content.parts);
                    continue;
                }
            }
            contents.push(content);
        }

        let gemini_tools = if tools.is_empty() {
            None
        } else {
            Some(vec![GeminiTool {
                function_declarations: tools.iter().map(|t| t.into()).collect(),
            }])
        };

        let system_instruction = system_prompt.map(|s| GeminiSystemInstruction {
            parts: vec![GeminiPart::Text {
                text: s.to_string(),
            }],
        });

        GeminiRequest {
            contents,
            tools: gemini_tools,
            system_instruction,
            generation_config: Some(GeminiGenerationConfig {
                max_output_tokens: Some(self.max_tokens),
                temperature: Some(TEMPERATURE),
            }),
        }
    }

    fn parse_error_response(status: reqwest::StatusCode, body: &str) -> ProviderError {
        if let Ok(error_response) = serde_json::from_str::<GeminiErrorResponse>(body) {
            let message = error_response.error.message;

            return match error_response.error.status.as_deref() {
                Some("RESOURCE_EXHAUSTED") => ProviderError::from_http_status(429, body),
                Some("INVALID_ARGUMENT") => {
                    if message.contains("context") || message.contains("token") {
                        ProviderError::ContextLengthExceeded(message)
                    } else {
                        ProviderError::InvalidRequest(message)
                    }
                }
                Some("PERMISSION_DENIED") | Some("UNAUTHENTICATED") => {
                    ProviderError::Authentication(message)
                }
                Some("NOT_FOUND") => ProviderError::ModelNotFound(message),
                _ => ProviderError::from_http_status(status.as_u16(), &message),
            };
        }
        ProviderError::from_http_status(status.as_u16(), body)
    }

    fn parse_response(
        &self,
        api_response: GeminiResponse,
    ) -> Result<ProviderResponse, ProviderError> {
        if let Some(reason) = api_response
            .prompt_feedback
            .as_ref()
            .and_then(|f| f.block_reason.as_deref())
        {
            return Err(ProviderError::ContentFiltered(format!(
                "Prompt blocked: {}",
                reason
            )));
        }

        let candidate = api_response.candidates.into_iter().next().ok_or_else(|| {
            ProviderError::InvalidResponse("No candidates in response".to_string())
        })?;

        let mut content = String::new();
        let mut tool_calls = Vec::new();

        if let Some(content_block) = candidate.content {
            for part in content_block.parts {
                match part {
                    GeminiPart::Text { text } => content.push_str(&text),
                    GeminiPart::FunctionCall { function_call } => {
                        tool_calls.push(ToolCall::new(
                            format!("call_{}", tool_calls.len()),
                            function_call.name,
                            function_call.args,
                        ));
                    }
                    GeminiPart::FunctionResponse { .. } => {}
                }
            }
        }

        let finish_reason = match candidate.finish_reason.as_deref() {
            _ if !tool_calls.is_empty() => FinishReason::ToolUse,
            Some("STOP") | None => FinishReason::Stop,
            Some("MAX_TOKENS") => FinishReason::MaxTokens,
            Some("SAFETY") | Some("RECITATION") | Some("PROHIBITED_CONTENT") => {
                FinishReason::ContentFilter
            }
            Some(_) => FinishReason::Other,
        };

        let usage = api_response.usage_metadata.unwrap_or_default();

        Ok(ProviderResponse {
            content,
            tool_calls,
            usage: TokenUsage {
                input_tokens: usage.prompt_token_count.unwrap_or(0),
                output_tokens: usage.candidates_token_count.unwrap_or(0),
            },
            finish_reason,
            model: api_response
                .model_version
                .unwrap_or_else(|| self.model_info.id.clone()),
        })
    }
}

#[async_trait]
impl Provider for GeminiProvider {
    fn metadata(&self) -> &ProviderMetadata {
        &self.metadata
    }

    fn model(&self) -> &ModelInfo {
        &self.model_info
    }

    async fn complete(
        &self,
        messages: Vec<Message>,
        tools: Vec<ToolDef>,
        system_prompt: Option<String>,
    ) -> Result<ProviderResponse, ProviderError> {
        if !self.is_available() {
            return Err(ProviderError::NotConfigured(format!(
                "{} is not set",
                API_KEY_ENV
            )));
        }

        let request = self.build_request(&messages, &tools, system_prompt.as_deref());
        debug!(
            "Gemini request: model={}, contents={}, tools={}",
            self.model_info.id,
            request.contents.len(),
            tools.len()
        );

        let response = self
            .client
            .post(self.generate_url())
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Self::parse_error_response(status, &body));
        }

        let api_response: GeminiResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::InvalidResponse(e.to_string()))?;

        self.parse_response(api_response)
    }

    fn is_available(&self) -> bool {
        !self.api_key.trim().is_empty()
    }
}

// ============================================================================
// Wire types
// ============================================================================

const FUNCTION_ROLE: &str = "function";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<GeminiTool>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<GeminiSystemInstruction>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GeminiGenerationConfig>,
}

#[derive(Debug, Serialize)]
struct GeminiSystemInstruction {
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiGenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiContent {
    #[serde(default)]
    role: String,
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
enum GeminiPart {
    Text {
        text: String,
    },
    FunctionCall {
        #[serde(rename = "functionCall")]
        function_call: GeminiFunctionCall,
    },
    FunctionResponse {
        #[serde(rename = "functionResponse")]
        function_response: GeminiFunctionResponse,
    },
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiFunctionCall {
    name: String,
    #[serde(default)]
    args: Value,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiFunctionResponse {
    name: String,
    response: Value,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiTool {
    function_declarations: Vec<GeminiFunctionDeclaration>,
}

#[derive(Debug, Serialize)]
struct GeminiFunctionDeclaration {
    name: String,
    description: String,
    parameters: Value,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    #[serde(default)]
    usage_metadata: Option<GeminiUsageMetadata>,
    #[serde(default)]
    prompt_feedback: Option<GeminiPromptFeedback>,
    #[serde(default)]
    model_version: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    content: Option<GeminiContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiPromptFeedback {
    block_reason: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiUsageMetadata {
    prompt_token_count: Option<u32>,
    candidates_token_count: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorResponse {
    error: GeminiError,
}

#[derive(Debug, Deserialize)]
struct GeminiError {
    message: String,
    status: Option<String>,
}

// ============================================================================
// Conversions
// ============================================================================

/// `{"result": ...}` on success, `{"error": ...}` on failure
fn function_response_payload(result: &ToolResult) -> Value {
    if result.is_error {
        json!({ "error": result.content })
    } else {
        json!({ "result": result.content })
    }
}

impl From<&Message> for GeminiContent {
    fn from(msg: &Message) -> Self {
        if let Some(ref tool_result) = msg.tool_result {
            return GeminiContent {
                role: FUNCTION_ROLE.to_string(),
                parts: vec![GeminiPart::FunctionResponse {
                    function_response: GeminiFunctionResponse {
                        name: tool_result.name.clone(),
                        response: function_response_payload(tool_result),
                    },
                }],
            };
        }

        let role = match msg.role {
            MessageRole::Assistant => "model",
            MessageRole::Tool => FUNCTION_ROLE,
            MessageRole::User => "user",
        };

        let mut parts: Vec<GeminiPart> = vec![];

        if !msg.content.is_empty() {
            parts.push(GeminiPart::Text {
                text: msg.content.clone(),
            });
        }

        if let Some(ref tool_calls) = msg.tool_calls {
            for tc in tool_calls {
                parts.push(GeminiPart::FunctionCall {
                    function_call: GeminiFunctionCall {
                        name: tc.name.clone(),
                        args: tc.arguments.clone(),
                    },
                });
            }
        }

        if parts.is_empty() {
            parts.push(GeminiPart::Text {
                text: String::new(),
            });
        }

        GeminiContent {
            role: role.to_string(),
            parts,
        }
    }
}

impl From<&ToolDef> for GeminiFunctionDeclaration {
    fn from(tool: &ToolDef) -> Self {
        GeminiFunctionDeclaration {
            name: tool.name.clone(),
            description: tool.description.clone(),
            parameters: tool.schema(),
        }
    }
}
