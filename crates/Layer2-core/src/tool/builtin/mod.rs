//! Builtin Tools - 샌드박스 도구들
//!
//! ## 도구 목록
//!
//! ### 파일시스템 (Filesystem)
//! - `list_directory` - 디렉토리 목록 (크기, 디렉토리 여부)
//! - `read_file` - 파일 읽기 (최대 문자 수 제한)
//! - `write_file` - 파일 쓰기 (생성 또는 덮어쓰기)
//!
//! ### 실행 (Execute)
//! - `run_script` - 스크립트 실행 (제한 시간)
//!
//! 모든 도구는 `PathGuard`로 작업 루트 밖 접근을 거부합니다.

// Filesystem tools
pub mod list;
pub mod read;
pub mod write;

// Execute tools
pub mod run;

// Re-exports
pub use list::{ListDirectoryArgs, ListDirectoryTool, EMPTY_DIRECTORY};
pub use read::{ReadFileArgs, ReadFileTool};
pub use run::{RunScriptArgs, RunScriptTool, NO_OUTPUT};
pub use write::{WriteFileArgs, WriteFileTool};
