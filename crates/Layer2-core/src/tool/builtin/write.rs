//! Write File Tool - 파일 쓰기 도구
//!
//! 파일 내용을 쓰거나 덮어씁니다.
//! - 새 파일 생성
//! - 기존 파일 전체 덮어쓰기
//! - 부모 디렉토리 자동 생성
//! - safe root가 설정된 경우 그 안에서만 쓰기 허용

use async_trait::async_trait;
use sandcode_foundation::SandboxConfig;
use serde::Deserialize;
use serde_json::json;
use std::path::PathBuf;
use tokio::fs;
use tracing::debug;

use crate::tool::error::{Access, OperationResult, ToolError};
use crate::tool::security::{resolves_within, PathGuard};
use crate::tool::traits::{Tool, ToolDefinition, ToolKind};

/// Write File 도구 입력
#[derive(Debug, Deserialize)]
pub struct WriteFileArgs {
    /// 작업 루트 기준 파일 경로
    pub file_path: String,

    /// 작성할 내용
    pub content: String,
}

/// Write File 도구
#[derive(Debug, Clone)]
pub struct WriteFileTool {
    guard: PathGuard,
    safe_root: Option<PathBuf>,
}

impl WriteFileTool {
    pub fn new(config: &SandboxConfig) -> Self {
        Self {
            guard: PathGuard::new(config.working_root()),
            safe_root: config.safe_root().map(PathBuf::from),
        }
    }

    /// 에러 메시지용 safe root 표시 (작업 루트 기준)
    fn safe_root_display(&self, safe_root: &std::path::Path) -> String {
        safe_root
            .strip_prefix(self.guard.root())
            .unwrap_or(safe_root)
            .display()
            .to_string()
    }
}

#[async_trait]
impl Tool for WriteFileTool {
    type Args = WriteFileArgs;

    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(
            ToolKind::WriteFile,
            "Writes content to a file, creating missing parent directories and overwriting existing files, constrained to the working directory.",
        )
        .param(
            "file_path",
            json!({
                "type": "string",
                "description": "Path of the file to write, relative to the working directory."
            }),
            true,
        )
        .param(
            "content",
            json!({
                "type": "string",
                "description": "The full content to write to the file."
            }),
            true,
        )
    }

    async fn execute(&self, args: WriteFileArgs) -> OperationResult {
        let resolved = self.guard.resolve(Some(&args.file_path));

        if let Some(safe_root) = &self.safe_root {
            let inside = resolved.target.starts_with(safe_root)
                && resolves_within(&resolved.target, safe_root);
            if !inside {
                return Err(ToolError::OutsideSafeRoot {
                    safe_root: self.safe_root_display(safe_root),
                    path: args.file_path,
                });
            }
        }
        if !resolved.contained {
            return Err(ToolError::OutsideRoot {
                access: Access::Write,
                path: args.file_path,
            });
        }

        if let Some(parent) = resolved.target.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| ToolError::unexpected("creating directories", e))?;
        }

        fs::write(&resolved.target, &args.content)
            .await
            .map_err(|e| ToolError::unexpected("writing file", e))?;

        let written = args.content.chars().count();
        debug!("Wrote {} characters to {}", written, resolved.target.display());

        Ok(format!(
            "Successfully wrote to \"{}\" ({} characters written)",
            args.file_path, written
        ))
    }
}

// ============================================================================
// 테스트
// ============================================================================
