//! Sandbox Config - 도구 실행 샌드박스 설정
//!
//! 프로세스 시작 시 한 번 생성되어 모든 도구에 참조로 전달됩니다.
//! 생성 이후 작업 루트는 변경되지 않습니다.

use crate::{Error, Result};
use std::path::{Component, Path, PathBuf};
use std::time::Duration;

/// 파일 읽기 최대 문자 수
pub const MAX_READ_CHARS: usize = 10_000;

/// 스크립트 실행 제한 시간 (초)
pub const SCRIPT_TIMEOUT_SECS: u64 = 30;

/// 기본 인터프리터
pub const DEFAULT_INTERPRETER: &str = "python3";

/// 기본 스크립트 확장자
pub const DEFAULT_SCRIPT_EXTENSION: &str = "py";

// ============================================================================
// Script Runtime
// ============================================================================

/// 스크립트 실행기 (인터프리터 + 허용 확장자)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptRuntime {
    interpreter: String,
    extension: String,
}

impl ScriptRuntime {
    pub fn new(interpreter: impl Into<String>, extension: impl Into<String>) -> Self {
        Self {
            interpreter: interpreter.into(),
            extension: extension.into().trim_start_matches('.').to_string(),
        }
    }

    pub fn python() -> Self {
        Self::new(DEFAULT_INTERPRETER, DEFAULT_SCRIPT_EXTENSION)
    }

    pub fn interpreter(&self) -> &str {
        &self.interpreter
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// 경로가 이 실행기의 스크립트인지 확인
    pub fn accepts(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|e| e == self.extension)
            .unwrap_or(false)
    }
}

impl Default for ScriptRuntime {
    fn default() -> Self {
        Self::python()
    }
}

// ============================================================================
// Sandbox Config
// ============================================================================

/// 샌드박스 설정
#[derive(Debug, Clone)]
pub struct SandboxConfig {
    /// 작업 루트 (canonical 절대 경로)
    working_root: PathBuf,

    /// 쓰기 전용 하위 루트 (선택)
    safe_root: Option<PathBuf>,

    runtime: ScriptRuntime,
    max_read_chars: usize,
    script_timeout: Duration,
}

impl SandboxConfig {
    /// 작업 루트로 설정 생성
    ///
    /// 디렉토리가 존재하지 않으면 실패합니다.
    pub fn new(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref();
        let working_root = root.canonicalize().map_err(|e| {
            Error::Config(format!(
                "Working directory {} is not accessible: {}",
                root.display(),
                e
            ))
        })?;

        if !working_root.is_dir() {
            return Err(Error::Config(format!(
                "Working directory {} is not a directory",
                root.display()
            )));
        }

        Ok(Self {
            working_root,
            safe_root: None,
            runtime: ScriptRuntime::default(),
            max_read_chars: MAX_READ_CHARS,
            script_timeout: Duration::from_secs(SCRIPT_TIMEOUT_SECS),
        })
    }

    /// 쓰기를 하위 디렉토리로 제한
    ///
    /// `sub`은 작업 루트 기준 상대 경로여야 하며 `..`을 포함할 수 없습니다.
    pub fn with_safe_root(mut self, sub: impl AsRef<Path>) -> Result<Self> {
        let sub = sub.as_ref();
        let mut safe_root = self.working_root.clone();

        for component in sub.components() {
            match component {
                Component::Normal(part) => safe_root.push(part),
                Component::CurDir => {}
                _ => {
                    return Err(Error::Config(format!(
                        "Safe root must be a relative path inside the working directory: {}",
                        sub.display()
                    )))
                }
            }
        }

        self.safe_root = Some(safe_root);
        Ok(self)
    }

    pub fn with_runtime(mut self, runtime: ScriptRuntime) -> Self {
        self.runtime = runtime;
        self
    }

    pub fn with_max_read_chars(mut self, max: usize) -> Self {
        self.max_read_chars = max;
        self
    }

    pub fn with_script_timeout(mut self, timeout: Duration) -> Self {
        self.script_timeout = timeout;
        self
    }

    pub fn working_root(&self) -> &Path {
        &self.working_root
    }

    pub fn safe_root(&self) -> Option<&Path> {
        self.safe_root.as_deref()
    }

    pub fn runtime(&self) -> &ScriptRuntime {
        &self.runtime
    }

    pub fn max_read_chars(&self) -> usize {
        self.max_read_chars
    }

    pub fn script_timeout(&self) -> Duration {
        self.script_timeout
    }
}
