//! Tool Error - 도구 실행 결과 타입
//!
//! 모든 도구 연산은 `OperationResult`를 반환하며 패닉하거나
//! 에러를 호출자에게 전파하지 않습니다.

use serde_json::{json, Value};
use std::fmt;
use thiserror::Error;

/// 도구 연산 결과 (성공 텍스트 또는 태그된 에러)
pub type OperationResult = std::result::Result<String, ToolError>;

/// 접근 종류 (에러 메시지용)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    List,
    Read,
    Write,
    Execute,
}

impl fmt::Display for Access {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verb = match self {
            Access::List => "list",
            Access::Read => "read",
            Access::Write => "write to",
            Access::Execute => "execute",
        };
        f.write_str(verb)
    }
}

/// 에러 분류
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    OutsideRoot,
    OutsideSafeRoot,
    NotADirectory,
    NotAFile,
    NotAScript,
    Timeout,
    UnknownOperation,
    Unexpected,
}

/// 도구 에러
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ToolError {
    #[error("Cannot {access} \"{path}\" as it is outside the permitted working directory")]
    OutsideRoot { access: Access, path: String },

    #[error("For safety, may only write inside \"{safe_root}\" (got \"{path}\")")]
    OutsideSafeRoot { safe_root: String, path: String },

    #[error("\"{path}\" is not a directory")]
    NotADirectory { path: String },

    #[error("File not found or is not a regular file: \"{path}\"")]
    NotAFile { path: String },

    #[error("\"{path}\" is not a .{extension} script")]
    NotAScript { path: String, extension: String },

    #[error("Execution of \"{path}\" timed out after {seconds} seconds")]
    Timeout { path: String, seconds: u64 },

    #[error("Unknown function: {0}")]
    UnknownOperation(String),

    #[error("{0}")]
    Unexpected(String),
}

impl ToolError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ToolError::OutsideRoot { .. } => ErrorKind::OutsideRoot,
            ToolError::OutsideSafeRoot { .. } => ErrorKind::OutsideSafeRoot,
            ToolError::NotADirectory { .. } => ErrorKind::NotADirectory,
            ToolError::NotAFile { .. } => ErrorKind::NotAFile,
            ToolError::NotAScript { .. } => ErrorKind::NotAScript,
            ToolError::Timeout { .. } => ErrorKind::Timeout,
            ToolError::UnknownOperation(_) => ErrorKind::UnknownOperation,
            ToolError::Unexpected(_) => ErrorKind::Unexpected,
        }
    }

    /// I/O 등 예기치 못한 실패를 문맥과 함께 감싸기
    pub fn unexpected(context: &str, err: impl fmt::Display) -> Self {
        ToolError::Unexpected(format!("{}: {}", context, err))
    }
}

// ============================================================================
// Tool Response
// ============================================================================

/// 디스패처 응답 (연산 이름 + 결과)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolResponse {
    pub name: String,
    pub result: OperationResult,
}

impl ToolResponse {
    pub fn new(name: impl Into<String>, result: OperationResult) -> Self {
        Self {
            name: name.into(),
            result,
        }
    }

    pub fn is_error(&self) -> bool {
        self.result.is_err()
    }

    pub fn kind(&self) -> Option<ErrorKind> {
        self.result.as_ref().err().map(ToolError::kind)
    }

    /// 모델에게 전달할 텍스트 (에러는 `Error:` 접두사)
    pub fn content(&self) -> String {
        match &self.result {
            Ok(text) => text.clone(),
            Err(e) => format!("Error: {}", e),
        }
    }

    /// `{"result": ...}` 또는 `{"error": ...}`
    pub fn to_payload(&self) -> Value {
        match &self.result {
            Ok(text) => json!({ "result": text }),
            Err(_) => json!({ "error": self.content() }),
        }
    }
}
