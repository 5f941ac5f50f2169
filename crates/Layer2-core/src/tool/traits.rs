//! Tool trait 및 도구 선언 타입

use super::error::OperationResult;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt;

// ============================================================================
// Tool Kind
// ============================================================================

/// 사용 가능한 도구 (닫힌 열거형)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolKind {
    ListDirectory,
    ReadFile,
    WriteFile,
    RunScript,
}

impl ToolKind {
    pub const ALL: [ToolKind; 4] = [
        ToolKind::ListDirectory,
        ToolKind::ReadFile,
        ToolKind::WriteFile,
        ToolKind::RunScript,
    ];

    /// 모델에 노출되는 이름
    pub fn name(&self) -> &'static str {
        match self {
            ToolKind::ListDirectory => "list_directory",
            ToolKind::ReadFile => "read_file",
            ToolKind::WriteFile => "write_file",
            ToolKind::RunScript => "run_script",
        }
    }

    /// 하이픈 표기 이름 (`read-file` 등)
    pub fn alias(&self) -> &'static str {
        match self {
            ToolKind::ListDirectory => "list-directory",
            ToolKind::ReadFile => "read-file",
            ToolKind::WriteFile => "write-file",
            ToolKind::RunScript => "run-script",
        }
    }

    /// 선언 이름과 하이픈 표기 모두 허용
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name() == name || kind.alias() == name)
    }
}

impl fmt::Display for ToolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ============================================================================
// Tool Definition
// ============================================================================

/// 도구 정의 (LLM에 전달)
#[derive(Debug, Clone, PartialEq)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub parameters: ToolParameters,
}

/// 도구 파라미터 정의 (JSON Schema object)
#[derive(Debug, Clone, PartialEq)]
pub struct ToolParameters {
    pub schema_type: String,
    pub properties: Value,
    pub required: Vec<String>,
}

impl ToolDefinition {
    pub fn new(kind: ToolKind, description: impl Into<String>) -> Self {
        Self {
            name: kind.name().to_string(),
            description: description.into(),
            parameters: ToolParameters {
                schema_type: "object".to_string(),
                properties: Value::Object(Default::default()),
                required: Vec::new(),
            },
        }
    }

    /// 파라미터 추가
    pub fn param(mut self, name: &str, schema: Value, required: bool) -> Self {
        if let Value::Object(props) = &mut self.parameters.properties {
            props.insert(name.to_string(), schema);
        }
        if required {
            self.parameters.required.push(name.to_string());
        }
        self
    }
}

// ============================================================================
// Tool Trait
// ============================================================================

/// 샌드박스 도구
///
/// 인자는 디스패처에서 한 번만 `Args`로 변환되어 전달됩니다.
/// `execute`는 실패를 `ToolError`로 돌려주며 패닉하지 않아야 합니다.
#[async_trait]
pub trait Tool: Send + Sync {
    type Args: DeserializeOwned + Send;

    fn definition(&self) -> ToolDefinition;

    async fn execute(&self, args: Self::Args) -> OperationResult;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_kind_names() {
        for kind in ToolKind::ALL {
            assert_eq!(ToolKind::from_name(kind.name()), Some(kind));
        }
        assert_eq!(ToolKind::from_name("read-file"), Some(ToolKind::ReadFile));
        assert_eq!(ToolKind::from_name("run-script"), Some(ToolKind::RunScript));
        assert_eq!(ToolKind::from_name("get_files_info"), None);
        assert_eq!(ToolKind::from_name("read-File"), None);
        assert_eq!(ToolKind::RunScript.to_string(), "run_script");
    }

    #[test]
    fn test_definition_params() {
        let def = ToolDefinition::new(ToolKind::WriteFile, "write")
            .param("file_path", json!({"type": "string"}), true)
            .param("content", json!({"type": "string"}), true);

        assert_eq!(def.name, "write_file");
        assert_eq!(def.parameters.required, vec!["file_path", "content"]);
        assert!(def.parameters.properties.get("content").is_some());
    }
}
