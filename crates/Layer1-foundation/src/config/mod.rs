//! Config module for sandcode
//!
//! - `sandbox`: 도구 실행 샌드박스 (작업 루트, 제한값)
//! - `settings`: 사용자 설정 (JSON + 환경 변수)

mod sandbox;
mod settings;

pub use sandbox::{
    SandboxConfig, ScriptRuntime, DEFAULT_INTERPRETER, DEFAULT_SCRIPT_EXTENSION, MAX_READ_CHARS,
    SCRIPT_TIMEOUT_SECS,
};
pub use settings::{
    AgentSettings, DEFAULT_MAX_ITERATIONS, DEFAULT_MAX_RETRIES, DEFAULT_MODEL, ENV_API_KEY,
    ENV_MODEL, ENV_WORKING_DIR, SETTINGS_FILE,
};
