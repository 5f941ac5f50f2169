//! # sandcode-foundation
//!
//! Foundation layer for sandcode:
//! - Error: 공통 에러 타입
//! - Config: 샌드박스 설정 (SandboxConfig), 사용자 설정 (AgentSettings)
//! - Storage: JsonStore (글로벌/프로젝트 설정 파일)

pub mod config;
pub mod error;
pub mod storage;

// ============================================================================
// Error
// ============================================================================
pub use error::{Error, Result};

// ============================================================================
// Config (설정)
// ============================================================================
pub use config::{
    AgentSettings, SandboxConfig, ScriptRuntime, DEFAULT_MAX_ITERATIONS, DEFAULT_MODEL,
    MAX_READ_CHARS, SCRIPT_TIMEOUT_SECS, SETTINGS_FILE,
};

// ============================================================================
// Storage (저장소)
// ============================================================================
pub use storage::JsonStore;
