//! Tool Dispatcher - 모델이 요청한 도구 호출 실행
//!
//! 호출 흐름: Lookup → Prepare → Execute → Wrap
//!
//! - Lookup: 이름을 `ToolKind`로 해석 (알 수 없는 이름은 실행 없이 에러 응답)
//! - Prepare: 인자 객체 검사, 호출자가 넣은 `working_directory` 제거, 타입 변환
//! - Execute: 도구 실행 (패닉도 `Unexpected`로 포착)
//! - Wrap: `ToolResponse { name, result }`
//!
//! 디스패처는 어떤 경우에도 에러를 전파하지 않습니다.

use super::builtin::{ListDirectoryTool, ReadFileTool, RunScriptTool, WriteFileTool};
use super::error::{OperationResult, ToolError, ToolResponse};
use super::traits::{Tool, ToolDefinition, ToolKind};
use futures::FutureExt;
use sandcode_foundation::SandboxConfig;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::time::Instant;
use tracing::{debug, info, warn};

/// 호출자가 넣어도 무시되는 인자 이름
pub const WORKING_DIRECTORY_KEY: &str = "working_directory";

/// 도구 디스패처
///
/// 네 개의 도구 슬롯은 제네릭이라 테스트에서 대체 구현을 끼울 수 있습니다.
pub struct Dispatcher<
    L = ListDirectoryTool,
    R = ReadFileTool,
    W = WriteFileTool,
    S = RunScriptTool,
> {
    list: L,
    read: R,
    write: W,
    run: S,
}

impl Dispatcher {
    /// 샌드박스 설정으로 기본 도구 구성
    pub fn new(config: &SandboxConfig) -> Self {
        Self::from_tools(
            ListDirectoryTool::new(config),
            ReadFileTool::new(config),
            WriteFileTool::new(config),
            RunScriptTool::new(config),
        )
    }
}

impl<L, R, W, S> Dispatcher<L, R, W, S>
where
    L: Tool,
    R: Tool,
    W: Tool,
    S: Tool,
{
    pub fn from_tools(list: L, read: R, write: W, run: S) -> Self {
        Self {
            list,
            read,
            write,
            run,
        }
    }

    /// 모델에 노출할 도구 선언
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        vec![
            self.list.definition(),
            self.read.definition(),
            self.write.definition(),
            self.run.definition(),
        ]
    }

    /// 도구 호출 실행
    pub async fn dispatch(&self, name: &str, args: Value) -> ToolResponse {
        let started = Instant::now();

        let result = match ToolKind::from_name(name) {
            Some(ToolKind::ListDirectory) => invoke(&self.list, name, args).await,
            Some(ToolKind::ReadFile) => invoke(&self.read, name, args).await,
            Some(ToolKind::WriteFile) => invoke(&self.write, name, args).await,
            Some(ToolKind::RunScript) => invoke(&self.run, name, args).await,
            None => {
                warn!("Unknown tool requested: {}", name);
                Err(ToolError::UnknownOperation(name.to_string()))
            }
        };

        match &result {
            Ok(_) => info!("Tool {} completed in {:?}", name, started.elapsed()),
            Err(e) => info!("Tool {} failed in {:?}: {}", name, started.elapsed(), e),
        }

        ToolResponse::new(name, result)
    }
}

async fn invoke<T: Tool>(tool: &T, name: &str, args: Value) -> OperationResult {
    let args = prepare::<T::Args>(name, args)?;

    match AssertUnwindSafe(tool.execute(args)).catch_unwind().await {
        Ok(result) => result,
        Err(panic) => Err(ToolError::Unexpected(format!(
            "executing {}: {}",
            name,
            panic_message(panic.as_ref())
        ))),
    }
}

/// 인자 객체를 도구 입력 타입으로 변환
fn prepare<A: DeserializeOwned>(name: &str, args: Value) -> Result<A, ToolError> {
    let mut map = match args {
        Value::Object(map) => map,
        Value::Null => Map::new(),
        other => {
            return Err(ToolError::Unexpected(format!(
                "invalid arguments for {}: expected a JSON object, got {}",
                name, other
            )))
        }
    };

    if let Some(ignored) = map.remove(WORKING_DIRECTORY_KEY) {
        warn!(
            "Ignoring caller-supplied {} for {}: {}",
            WORKING_DIRECTORY_KEY, name, ignored
        );
    }

    debug!("Prepared arguments for {}: {:?}", name, map);
    serde_json::from_value(Value::Object(map))
        .map_err(|e| ToolError::Unexpected(format!("invalid arguments for {}: {}", name, e)))
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "tool panicked".to_string()
    }
}

// ============================================================================
// 테스트
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tool::error::ErrorKind;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tempfile::TempDir;

    /// 호출 횟수를 기록하는 대체 도구
    struct SpyTool {
        kind: ToolKind,
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl Tool for SpyTool {
        type Args = Value;

        fn definition(&self) -> ToolDefinition {
            ToolDefinition::new(self.kind, "spy")
        }

        async fn execute(&self, args: Value) -> OperationResult {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(args.to_string())
        }
    }

    struct PanicTool;

    #[async_trait]
    impl Tool for PanicTool {
        type Args = Value;

        fn definition(&self) -> ToolDefinition {
            ToolDefinition::new(ToolKind::RunScript, "panics")
        }

        async fn execute(&self, _args: Value) -> OperationResult {
            panic!("boom")
        }
    }

    fn spy_dispatcher(calls: &Arc<AtomicUsize>) -> Dispatcher<SpyTool, SpyTool, SpyTool, SpyTool> {
        let spy = |kind| SpyTool {
            kind,
            calls: calls.clone(),
        };
        Dispatcher::from_tools(
            spy(ToolKind::ListDirectory),
            spy(ToolKind::ReadFile),
            spy(ToolKind::WriteFile),
            spy(ToolKind::RunScript),
        )
    }

    #[tokio::test]
    async fn test_unknown_operation_invokes_nothing() {
        let calls = Arc::new(AtomicUsize::new(0));
        let dispatcher = spy_dispatcher(&calls);

        let response = dispatcher.dispatch("delete_everything", json!({})).await;

        assert_eq!(response.name, "delete_everything");
        assert_eq!(response.kind(), Some(ErrorKind::UnknownOperation));
        assert_eq!(response.content(), "Error: Unknown function: delete_everything");
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_working_directory_stripped() {
        let calls = Arc::new(AtomicUsize::new(0));
        let dispatcher = spy_dispatcher(&calls);

        let response = dispatcher
            .dispatch(
                "read_file",
                json!({ "file_path": "main.py", "working_directory": "/" }),
            )
            .await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(response.result, Ok(json!({ "file_path": "main.py" }).to_string()));
    }

    #[tokio::test]
    async fn test_hyphenated_names() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("a.txt"), "alpha").unwrap();
        let dispatcher = Dispatcher::new(&SandboxConfig::new(dir.path()).unwrap());

        let response = dispatcher
            .dispatch("read-file", json!({ "file_path": "a.txt" }))
            .await;
        assert_eq!(response.name, "read-file");
        assert_eq!(response.result, Ok("alpha".to_string()));

        let calls = Arc::new(AtomicUsize::new(0));
        let spies = spy_dispatcher(&calls);
        for name in ["list-directory", "read-file", "write-file", "run-script"] {
            let response = spies.dispatch(name, json!({})).await;
            assert_ne!(response.kind(), Some(ErrorKind::UnknownOperation));
        }
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_non_object_arguments() {
        let calls = Arc::new(AtomicUsize::new(0));
        let dispatcher = spy_dispatcher(&calls);

        let response = dispatcher.dispatch("write_file", json!(["a", "b"])).await;
        assert_eq!(response.kind(), Some(ErrorKind::Unexpected));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_panic_captured() {
        let calls = Arc::new(AtomicUsize::new(0));
        let spy = |kind| SpyTool {
            kind,
            calls: calls.clone(),
        };
        let dispatcher = Dispatcher::from_tools(
            spy(ToolKind::ListDirectory),
            spy(ToolKind::ReadFile),
            spy(ToolKind::WriteFile),
            PanicTool,
        );

        let response = dispatcher.dispatch("run_script", json!({})).await;
        assert_eq!(response.kind(), Some(ErrorKind::Unexpected));
        assert_eq!(response.content(), "Error: executing run_script: boom");
    }

    #[tokio::test]
    async fn test_shape_mismatch_on_real_tools() {
        let dir = TempDir::new().unwrap();
        let dispatcher = Dispatcher::new(&SandboxConfig::new(dir.path()).unwrap());

        let missing = dispatcher.dispatch("read_file", json!({})).await;
        assert_eq!(missing.kind(), Some(ErrorKind::Unexpected));
        assert!(missing.content().starts_with("Error: invalid arguments for read_file"));

        let wrong_type = dispatcher
            .dispatch("write_file", json!({ "file_path": 7, "content": "x" }))
            .await;
        assert_eq!(wrong_type.kind(), Some(ErrorKind::Unexpected));
    }

    #[tokio::test]
    async fn test_definitions() {
        let dir = TempDir::new().unwrap();
        let dispatcher = Dispatcher::new(&SandboxConfig::new(dir.path()).unwrap());

        let names: Vec<String> = dispatcher
            .definitions()
            .into_iter()
            .map(|d| d.name)
            .collect();
        assert_eq!(
            names,
            vec!["list_directory", "read_file", "write_file", "run_script"]
        );
    }
}
