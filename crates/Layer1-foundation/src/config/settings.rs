//! Agent Settings - 사용자 설정
//!
//! 글로벌 → 프로젝트 → 환경 변수 → CLI 순서로 병합됩니다.

use crate::config::sandbox::{
    SandboxConfig, ScriptRuntime, DEFAULT_INTERPRETER, DEFAULT_SCRIPT_EXTENSION,
};
use crate::storage::JsonStore;
use crate::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::debug;

/// 설정 파일명
pub const SETTINGS_FILE: &str = "config.json";

/// 기본 모델
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash-001";

/// 기본 최대 반복 횟수
pub const DEFAULT_MAX_ITERATIONS: u32 = 20;

/// 기본 재시도 횟수
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// API 키 환경 변수
pub const ENV_API_KEY: &str = "GEMINI_API_KEY";

/// 모델 환경 변수
pub const ENV_MODEL: &str = "SANDCODE_MODEL";

/// 작업 디렉토리 환경 변수
pub const ENV_WORKING_DIR: &str = "SANDCODE_WORKING_DIR";

/// 에이전트 설정
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    /// 모델 API 엔드포인트 (프록시/테스트 서버용)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    /// 작업 루트 (기본: 현재 디렉토리)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub working_dir: Option<PathBuf>,

    /// 쓰기 제한 하위 디렉토리
    #[serde(skip_serializing_if = "Option::is_none")]
    pub safe_root: Option<PathBuf>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_iterations: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub interpreter: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub script_extension: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_retries: Option<u32>,
}

impl AgentSettings {
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // Load
    // ========================================================================

    /// 글로벌 + 프로젝트 + 환경 변수 병합 로드
    pub fn load() -> Result<Self> {
        let global = JsonStore::global().ok();
        let project = JsonStore::current_project().ok();

        let mut settings = Self::load_layered(global.as_ref(), project.as_ref())?;
        settings.apply_env(|key| std::env::var(key).ok());
        Ok(settings)
    }

    /// 저장소 순서대로 병합 (뒤쪽이 우선)
    pub fn load_layered(global: Option<&JsonStore>, project: Option<&JsonStore>) -> Result<Self> {
        let mut settings = Self::new();

        for store in [global, project].into_iter().flatten() {
            if let Some(layer) = store.load_optional::<AgentSettings>(SETTINGS_FILE)? {
                debug!("Merging settings from {}", store.base_dir().display());
                settings.merge(layer);
            }
        }

        Ok(settings)
    }

    /// 환경 변수 적용 (빈 값은 무시)
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(key) = get(ENV_API_KEY) {
            self.api_key = Some(key);
        }
        if let Some(model) = get(ENV_MODEL) {
            self.model = Some(model);
        }
        if let Some(dir) = get(ENV_WORKING_DIR) {
            self.working_dir = Some(PathBuf::from(dir));
        }
    }

    /// 다른 설정과 병합 (other가 우선)
    pub fn merge(&mut self, other: AgentSettings) {
        if other.api_key.is_some() {
            self.api_key = other.api_key;
        }
        if other.model.is_some() {
            self.model = other.model;
        }
        if other.base_url.is_some() {
            self.base_url = other.base_url;
        }
        if other.working_dir.is_some() {
            self.working_dir = other.working_dir;
        }
        if other.safe_root.is_some() {
            self.safe_root = other.safe_root;
        }
        if other.max_iterations.is_some() {
            self.max_iterations = other.max_iterations;
        }
        if other.interpreter.is_some() {
            self.interpreter = other.interpreter;
        }
        if other.script_extension.is_some() {
            self.script_extension = other.script_extension;
        }
        if other.max_retries.is_some() {
            self.max_retries = other.max_retries;
        }
    }

    // ========================================================================
    // Effective values
    // ========================================================================

    pub fn effective_model(&self) -> &str {
        self.model.as_deref().unwrap_or(DEFAULT_MODEL)
    }

    pub fn effective_max_iterations(&self) -> u32 {
        self.max_iterations.unwrap_or(DEFAULT_MAX_ITERATIONS)
    }

    pub fn effective_max_retries(&self) -> u32 {
        self.max_retries.unwrap_or(DEFAULT_MAX_RETRIES)
    }

    pub fn script_runtime(&self) -> ScriptRuntime {
        ScriptRuntime::new(
            self.interpreter.as_deref().unwrap_or(DEFAULT_INTERPRETER),
            self.script_extension
                .as_deref()
                .unwrap_or(DEFAULT_SCRIPT_EXTENSION),
        )
    }

    /// 샌드박스 설정 생성
    pub fn sandbox_config(&self) -> Result<SandboxConfig> {
        let root = self
            .working_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from("."));

        let mut config = SandboxConfig::new(root)?.with_runtime(self.script_runtime());
        if let Some(safe_root) = &self.safe_root {
            config = config.with_safe_root(safe_root)?;
        }
        Ok(config)
    }
}
