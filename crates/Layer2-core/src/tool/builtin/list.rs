//! List Directory Tool - 디렉토리 목록 도구
//!
//! 작업 루트 안의 디렉토리 직계 항목을 이름순으로 나열합니다.

use async_trait::async_trait;
use sandcode_foundation::SandboxConfig;
use serde::Deserialize;
use serde_json::json;
use tokio::fs;

use crate::tool::error::{Access, OperationResult, ToolError};
use crate::tool::security::PathGuard;
use crate::tool::traits::{Tool, ToolDefinition, ToolKind};

/// 빈 디렉토리 결과
pub const EMPTY_DIRECTORY: &str = "(empty directory)";

/// List Directory 도구 입력
#[derive(Debug, Default, Deserialize)]
pub struct ListDirectoryArgs {
    /// 작업 루트 기준 디렉토리 (없으면 루트)
    #[serde(default)]
    pub directory: Option<String>,
}

/// List Directory 도구
#[derive(Debug, Clone)]
pub struct ListDirectoryTool {
    guard: PathGuard,
}

impl ListDirectoryTool {
    pub fn new(config: &SandboxConfig) -> Self {
        Self {
            guard: PathGuard::new(config.working_root()),
        }
    }
}

fn format_entry(name: &str, size: u64, is_dir: bool) -> String {
    format!(
        "- {}: file_size={} bytes, is_dir={}",
        name,
        size,
        if is_dir { "True" } else { "False" }
    )
}

#[async_trait]
impl Tool for ListDirectoryTool {
    type Args = ListDirectoryArgs;

    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(
            ToolKind::ListDirectory,
            "Lists files in the specified directory along with their sizes, constrained to the working directory.",
        )
        .param(
            "directory",
            json!({
                "type": "string",
                "description": "The directory to list files from, relative to the working directory. If not provided, lists files in the working directory itself."
            }),
            false,
        )
    }

    async fn execute(&self, args: ListDirectoryArgs) -> OperationResult {
        let display = args.directory.clone().unwrap_or_else(|| ".".to_string());
        let resolved = self.guard.resolve(args.directory.as_deref());

        if !resolved.contained {
            return Err(ToolError::OutsideRoot {
                access: Access::List,
                path: display,
            });
        }
        if !resolved.target.is_dir() {
            return Err(ToolError::NotADirectory { path: display });
        }

        let mut dir = fs::read_dir(&resolved.target)
            .await
            .map_err(|e| ToolError::unexpected("listing directory", e))?;

        let mut entries = Vec::new();
        while let Some(entry) = dir
            .next_entry()
            .await
            .map_err(|e| ToolError::unexpected("listing directory", e))?
        {
            let path = entry.path();
            // 깨진 링크는 링크 자체의 메타데이터 사용
            let meta = match fs::metadata(&path).await {
                Ok(meta) => meta,
                Err(_) => fs::symlink_metadata(&path)
                    .await
                    .map_err(|e| ToolError::unexpected("reading metadata", e))?,
            };

            let name = entry.file_name().to_string_lossy().into_owned();
            entries.push((name, meta.len(), meta.is_dir()));
        }

        if entries.is_empty() {
            return Ok(EMPTY_DIRECTORY.to_string());
        }

        entries.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(entries
            .iter()
            .map(|(name, size, is_dir)| format_entry(name, *size, *is_dir))
            .collect::<Vec<_>>()
            .join("\n"))
    }
}

// ============================================================================
// 테스트
// ============================================================================
