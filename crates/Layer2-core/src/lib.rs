//! sandcode-core: 샌드박스 도구 실행 계층
//!
//! Layer2 - Agent 도구 구현 레이어
//!
//! # 주요 모듈
//!
//! - `tool`: Path Guard, 네 가지 샌드박스 도구, Dispatcher
//!
//! # 사용 예시
//!
//! ```ignore
//! use sandcode_core::Dispatcher;
//! use sandcode_foundation::SandboxConfig;
//!
//! let config = SandboxConfig::new(".")?;
//! let dispatcher = Dispatcher::new(&config);
//!
//! let response = dispatcher
//!     .dispatch("list_directory", json!({ "directory": "pkg" }))
//!     .await;
//! assert!(!response.is_error());
//! ```

pub mod tool;

// Re-exports: Tool
pub use tool::{
    Dispatcher, ErrorKind, OperationResult, PathGuard, Tool, ToolDefinition, ToolError, ToolKind,
    ToolParameters, ToolResponse,
};
