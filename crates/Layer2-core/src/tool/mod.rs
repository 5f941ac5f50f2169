//! Tool System - 샌드박스 도구 실행 계층
//!
//! ## 아키텍처
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Dispatcher                                                  │
//! │  ├── dispatch(name, args) - Lookup → Prepare → Execute → Wrap│
//! │  └── definitions() - 모델용 도구 선언                        │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Builtin Tools (Tool trait 구현)                             │
//! │  ├── ListDirectoryTool - 디렉토리 목록                       │
//! │  ├── ReadFileTool - 파일 읽기                                │
//! │  ├── WriteFileTool - 파일 쓰기                               │
//! │  └── RunScriptTool - 스크립트 실행                           │
//! ├─────────────────────────────────────────────────────────────┤
//! │  PathGuard - 작업 루트 격리                                  │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## 사용법
//!
//! ```ignore
//! use sandcode_core::tool::Dispatcher;
//! use sandcode_foundation::SandboxConfig;
//!
//! let config = SandboxConfig::new("calculator")?;
//! let dispatcher = Dispatcher::new(&config);
//!
//! let response = dispatcher
//!     .dispatch("read_file", json!({ "file_path": "main.py" }))
//!     .await;
//! println!("{}", response.content());
//! ```

pub mod builtin;
mod dispatcher;
mod error;
pub mod security;
mod traits;

// Re-exports: Tools
pub use builtin::{
    ListDirectoryArgs, ListDirectoryTool, ReadFileArgs, ReadFileTool, RunScriptArgs,
    RunScriptTool, WriteFileArgs, WriteFileTool, EMPTY_DIRECTORY, NO_OUTPUT,
};

// Re-exports: Dispatcher
pub use dispatcher::{Dispatcher, WORKING_DIRECTORY_KEY};

// Re-exports: Errors
pub use error::{Access, ErrorKind, OperationResult, ToolError, ToolResponse};

// Re-exports: Security
pub use security::{normalize_path, PathGuard, ResolvedPath};

// Re-exports: Trait
pub use traits::{Tool, ToolDefinition, ToolKind, ToolParameters};
