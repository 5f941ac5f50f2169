//! Read File Tool - 파일 읽기 도구
//!
//! 파일 내용을 최대 문자 수까지 읽어서 반환합니다.
//! - UTF-8이 아닌 바이트는 U+FFFD로 치환
//! - 제한을 넘으면 잘림 표시 추가
//! - 파일 전체를 메모리에 올리지 않음

use async_trait::async_trait;
use sandcode_foundation::SandboxConfig;
use serde::Deserialize;
use serde_json::json;
use tokio::io::AsyncReadExt;

use crate::tool::error::{Access, OperationResult, ToolError};
use crate::tool::security::PathGuard;
use crate::tool::traits::{Tool, ToolDefinition, ToolKind};

/// Read File 도구 입력
#[derive(Debug, Deserialize)]
pub struct ReadFileArgs {
    /// 작업 루트 기준 파일 경로
    pub file_path: String,
}

/// Read File 도구
#[derive(Debug, Clone)]
pub struct ReadFileTool {
    guard: PathGuard,
    max_chars: usize,
}

impl ReadFileTool {
    pub fn new(config: &SandboxConfig) -> Self {
        Self {
            guard: PathGuard::new(config.working_root()),
            max_chars: config.max_read_chars(),
        }
    }

    /// UTF-8 한 문자는 최대 4바이트
    fn byte_budget(&self) -> u64 {
        (self.max_chars as u64 + 1) * 4
    }
}

#[async_trait]
impl Tool for ReadFileTool {
    type Args = ReadFileArgs;

    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(
            ToolKind::ReadFile,
            format!(
                "Reads the contents of a file, constrained to the working directory. Output is truncated after {} characters.",
                self.max_chars
            ),
        )
        .param(
            "file_path",
            json!({
                "type": "string",
                "description": "Path of the file to read, relative to the working directory."
            }),
            true,
        )
    }

    async fn execute(&self, args: ReadFileArgs) -> OperationResult {
        let resolved = self.guard.resolve(Some(&args.file_path));

        if !resolved.contained {
            return Err(ToolError::OutsideRoot {
                access: Access::Read,
                path: args.file_path,
            });
        }
        if !resolved.target.is_file() {
            return Err(ToolError::NotAFile {
                path: args.file_path,
            });
        }

        let file = tokio::fs::File::open(&resolved.target)
            .await
            .map_err(|e| ToolError::unexpected("reading file", e))?;

        let mut bytes = Vec::new();
        file.take(self.byte_budget())
            .read_to_end(&mut bytes)
            .await
            .map_err(|e| ToolError::unexpected("reading file", e))?;

        let text = String::from_utf8_lossy(&bytes);
        let mut chars = text.chars();
        let head: String = chars.by_ref().take(self.max_chars).collect();

        if chars.next().is_some() {
            Ok(format!(
                "{}\n[...File \"{}\" truncated at {} characters]",
                head, args.file_path, self.max_chars
            ))
        } else {
            Ok(head)
        }
    }
}

// ============================================================================
// 테스트
// ============================================================================
