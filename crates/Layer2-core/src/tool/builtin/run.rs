//! Run Script Tool - 스크립트 실행 도구
//!
//! 작업 루트 안의 스크립트를 설정된 인터프리터로 실행합니다.
//! - cwd는 항상 작업 루트
//! - stdout/stderr 동시 수집
//! - 제한 시간 초과 시 자식 프로세스 kill

use async_trait::async_trait;
use sandcode_foundation::{SandboxConfig, ScriptRuntime};
use serde::Deserialize;
use serde_json::json;
use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::tool::error::{Access, OperationResult, ToolError};
use crate::tool::security::PathGuard;
use crate::tool::traits::{Tool, ToolDefinition, ToolKind};

/// 출력이 없을 때 결과
pub const NO_OUTPUT: &str = "No output produced.";

/// Run Script 도구 입력
#[derive(Debug, Deserialize)]
pub struct RunScriptArgs {
    /// 작업 루트 기준 스크립트 경로
    pub file_path: String,

    /// 스크립트에 전달할 인자
    #[serde(default)]
    pub args: Vec<String>,
}

/// Run Script 도구
#[derive(Debug, Clone)]
pub struct RunScriptTool {
    guard: PathGuard,
    runtime: ScriptRuntime,
    timeout: Duration,
}

impl RunScriptTool {
    pub fn new(config: &SandboxConfig) -> Self {
        Self {
            guard: PathGuard::new(config.working_root()),
            runtime: config.runtime().clone(),
            timeout: config.script_timeout(),
        }
    }

    async fn run(&self, script: PathBuf, args: &[String], display: &str) -> OperationResult {
        let mut cmd = Command::new(self.runtime.interpreter());
        cmd.arg(&script)
            .args(args)
            .current_dir(self.guard.root())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = cmd
            .spawn()
            .map_err(|e| ToolError::unexpected("executing script", e))?;

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();

        // 타임아웃과 함께 실행
        let result = timeout(self.timeout, async {
            let (out, err) = tokio::join!(read_pipe(stdout), read_pipe(stderr));
            let status = child.wait().await?;
            Ok::<_, std::io::Error>((out?, err?, status))
        })
        .await;

        match result {
            Ok(Ok((out, err, status))) => {
                let code = exit_code(&status);
                debug!("{} exited with code {}", script.display(), code);
                Ok(format_output(
                    &String::from_utf8_lossy(&out),
                    &String::from_utf8_lossy(&err),
                    code,
                ))
            }
            Ok(Err(e)) => Err(ToolError::unexpected("executing script", e)),
            Err(_) => {
                // 타임아웃 - 프로세스 강제 종료
                let _ = child.kill().await;
                warn!(
                    "{} timed out after {:?}, process killed",
                    script.display(),
                    self.timeout
                );
                Err(ToolError::Timeout {
                    path: display.to_string(),
                    seconds: self.timeout.as_secs(),
                })
            }
        }
    }
}

async fn read_pipe<R: AsyncRead + Unpin>(pipe: Option<R>) -> std::io::Result<Vec<u8>> {
    let mut buf = Vec::new();
    if let Some(mut pipe) = pipe {
        pipe.read_to_end(&mut buf).await?;
    }
    Ok(buf)
}

/// 종료 코드 (시그널 N으로 종료되면 -N)
fn exit_code(status: &ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return -signal;
        }
    }
    -1
}

/// STDOUT / STDERR / 종료 코드 조합
fn format_output(stdout: &str, stderr: &str, code: i32) -> String {
    let mut parts = Vec::new();

    if !stdout.trim().is_empty() {
        parts.push(format!("STDOUT:\n{}", stdout.trim_end()));
    }
    if !stderr.trim().is_empty() {
        parts.push(format!("STDERR:\n{}", stderr.trim_end()));
    }
    if code != 0 {
        parts.push(format!("Process exited with code {}", code));
    }

    if parts.is_empty() {
        NO_OUTPUT.to_string()
    } else {
        parts.join("\n")
    }
}

#[async_trait]
impl Tool for RunScriptTool {
    type Args = RunScriptArgs;

    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(
            ToolKind::RunScript,
            format!(
                "Executes a .{} file with {} and returns its output, constrained to the working directory. Times out after {} seconds.",
                self.runtime.extension(),
                self.runtime.interpreter(),
                self.timeout.as_secs()
            ),
        )
        .param(
            "file_path",
            json!({
                "type": "string",
                "description": "Path of the script to execute, relative to the working directory."
            }),
            true,
        )
        .param(
            "args",
            json!({
                "type": "array",
                "items": { "type": "string" },
                "description": "Optional command-line arguments passed to the script."
            }),
            false,
        )
    }

    async fn execute(&self, args: RunScriptArgs) -> OperationResult {
        let resolved = self.guard.resolve(Some(&args.file_path));

        if !resolved.contained {
            return Err(ToolError::OutsideRoot {
                access: Access::Execute,
                path: args.file_path,
            });
        }
        if !resolved.target.is_file() {
            return Err(ToolError::NotAFile {
                path: args.file_path,
            });
        }
        if !self.runtime.accepts(&resolved.target) {
            return Err(ToolError::NotAScript {
                path: args.file_path,
                extension: self.runtime.extension().to_string(),
            });
        }

        self.run(resolved.target, &args.args, &args.file_path).await
    }
}

// ============================================================================
// 테스트
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tool::error::ErrorKind;
    use std::time::Instant;
    use tempfile::TempDir;

    fn sh_tool(dir: &TempDir) -> RunScriptTool {
        let config = SandboxConfig::new(dir.path())
            .unwrap()
            .with_runtime(ScriptRuntime::new("sh", "sh"));
        RunScriptTool::new(&config)
    }

    fn args(path: &str) -> RunScriptArgs {
        RunScriptArgs {
            file_path: path.to_string(),
            args: Vec::new(),
        }
    }

    #[test]
    fn test_format_output() {
        assert_eq!(format_output("", "", 0), "No output produced.");
        assert_eq!(format_output("  \n", "\n", 0), "No output produced.");
        assert_eq!(format_output("hi\n\n", "", 0), "STDOUT:\nhi");
        assert_eq!(
            format_output("out\n", "warn\n", 2),
            "STDOUT:\nout\nSTDERR:\nwarn\nProcess exited with code 2"
        );
        assert_eq!(format_output("", "", 3), "Process exited with code 3");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_stdout_only() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("hello.sh"), "echo hi\n").unwrap();

        let output = sh_tool(&dir).execute(args("hello.sh")).await.unwrap();
        assert_eq!(output, "STDOUT:\nhi");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_exit_code_only() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("fail.sh"), "exit 3\n").unwrap();

        let output = sh_tool(&dir).execute(args("fail.sh")).await.unwrap();
        assert_eq!(output, "Process exited with code 3");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_args_and_cwd() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join("pkg")).unwrap();
        std::fs::write(dir.path().join("pkg/show.sh"), "echo \"$1 $2\"\nls\n").unwrap();
        std::fs::write(dir.path().join("marker.txt"), "").unwrap();

        let output = sh_tool(&dir)
            .execute(RunScriptArgs {
                file_path: "pkg/show.sh".into(),
                args: vec!["3".into(), "+ 5".into()],
            })
            .await
            .unwrap();

        assert!(output.starts_with("STDOUT:\n3 + 5\n"));
        assert!(output.contains("marker.txt"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_stderr_and_exit() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("err.sh"), "echo oops >&2\nexit 1\n").unwrap();

        let output = sh_tool(&dir).execute(args("err.sh")).await.unwrap();
        assert_eq!(output, "STDERR:\noops\nProcess exited with code 1");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_signal_exit_code() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("killed.sh"), "kill -9 $$\n").unwrap();

        let output = sh_tool(&dir).execute(args("killed.sh")).await.unwrap();
        assert_eq!(output, "Process exited with code -9");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_timeout_kills_process() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("sleep.sh"), "sleep 5\n").unwrap();
        let config = SandboxConfig::new(dir.path())
            .unwrap()
            .with_runtime(ScriptRuntime::new("sh", "sh"))
            .with_script_timeout(Duration::from_millis(300));
        let tool = RunScriptTool::new(&config);

        let started = Instant::now();
        let err = tool.execute(args("sleep.sh")).await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Timeout);
        assert!(started.elapsed() < Duration::from_secs(4));
    }

    #[tokio::test]
    async fn test_rejections() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("notes.txt"), "").unwrap();
        let tool = sh_tool(&dir);

        let outside = tool.execute(args("../evil.sh")).await.unwrap_err();
        assert_eq!(
            outside.to_string(),
            "Cannot execute \"../evil.sh\" as it is outside the permitted working directory"
        );

        let missing = tool.execute(args("missing.sh")).await.unwrap_err();
        assert_eq!(missing.kind(), ErrorKind::NotAFile);

        let wrong = tool.execute(args("notes.txt")).await.unwrap_err();
        assert_eq!(wrong.kind(), ErrorKind::NotAScript);
        assert_eq!(wrong.to_string(), "\"notes.txt\" is not a .sh script");
    }
}
