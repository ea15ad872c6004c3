/// Agent process orchestration — the only place a notes worker is launched.
///
/// One isolated process per call: the request document goes in on stdin, stdin is
/// closed, stdout and stderr are collected until exit. A fixed wall-clock deadline
/// measured from launch bounds the whole exchange; on expiry the process is killed.
///
/// No retries. Every call resolves exactly once.
use std::io;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::process::{Child, ChildStdin, Command};
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::config::{Config, WorkerConfig};
use crate::notes::models::{NoteRequest, NotesDocument};

/// Hard deadline for one worker exchange, measured from launch.
pub const WORKER_DEADLINE: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AgentError {
    #[error("Agent process error: {0}")]
    LaunchFailure(String),

    #[error("Failed to send payload: {0}")]
    WriteFailure(String),

    #[error("Agent timed out after {seconds}s")]
    Timeout { seconds: u64 },

    #[error("{0}")]
    NonZeroExit(String),

    #[error("Invalid JSON from agent: {reason}\n{raw}")]
    MalformedOutput { reason: String, raw: String },
}

/// The notes worker seam. `AppState` carries an `Arc<dyn NotesWorker>`.
#[async_trait]
pub trait NotesWorker: Send + Sync {
    async fn generate(
        &self,
        request: &NoteRequest,
        config: &WorkerConfig,
    ) -> Result<NotesDocument, AgentError>;
}

/// Launches `program args...` once per request.
#[derive(Debug, Clone)]
pub struct AgentProcess {
    program: String,
    args: Vec<String>,
    deadline: Duration,
}

impl AgentProcess {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            deadline: WORKER_DEADLINE,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.agent_program.clone(), vec![config.agent_script.clone()])
    }

    #[cfg(test)]
    fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }

    /// Runs one request/reply exchange with a fresh worker process.
    pub async fn run(
        &self,
        request: &NoteRequest,
        config: &WorkerConfig,
    ) -> Result<NotesDocument, AgentError> {
        let payload =
            serde_json::to_vec(request).map_err(|e| AgentError::WriteFailure(e.to_string()))?;

        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .env("OPENROUTER_API_KEY", &config.api_key)
            .env("OPENAI_BASE_URL", &config.base_url)
            .env("MODEL_NAME", &config.model)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let started = Instant::now();
        let deadline = started + self.deadline;

        let mut child = cmd
            .spawn()
            .map_err(|e| AgentError::LaunchFailure(e.to_string()))?;
        let pid = child.id();
        debug!(?pid, program = %self.program, "agent process launched");

        let stdin = child.stdin.take();
        let stdout_task = tokio::spawn(collect(child.stdout.take()));
        let stderr_task = tokio::spawn(collect(child.stderr.take()));
        let readers = [stdout_task.abort_handle(), stderr_task.abort_handle()];

        let exchange = async {
            let write_result = write_payload(stdin, &payload).await;
            let status = child.wait().await;
            let stdout = stdout_task.await.unwrap_or_default();
            let stderr = stderr_task.await.unwrap_or_default();
            (write_result, status, stdout, stderr)
        };
        let outcome = tokio::time::timeout_at(deadline, exchange).await;

        let (write_result, status, stdout, stderr) = match outcome {
            Ok(done) => done,
            Err(_) => {
                terminate(&mut child).await;
                for reader in &readers {
                    reader.abort();
                }
                warn!(?pid, seconds = self.deadline.as_secs(), "agent timed out, killed");
                return Err(AgentError::Timeout {
                    seconds: self.deadline.as_secs(),
                });
            }
        };

        let status = status
            .map_err(|e| AgentError::LaunchFailure(format!("failed to wait on agent: {e}")))?;

        let result = classify(WorkerExit {
            success: status.success(),
            code: status.code(),
            write_error: write_result.err(),
            stdout,
            stderr,
        });

        let elapsed_ms = started.elapsed().as_millis() as u64;
        match &result {
            Ok(_) => info!(?pid, elapsed_ms, "agent completed"),
            Err(e) => warn!(?pid, elapsed_ms, "agent failed: {e}"),
        }
        result
    }
}

#[async_trait]
impl NotesWorker for AgentProcess {
    async fn generate(
        &self,
        request: &NoteRequest,
        config: &WorkerConfig,
    ) -> Result<NotesDocument, AgentError> {
        self.run(request, config).await
    }
}

async fn write_payload(stdin: Option<ChildStdin>, payload: &[u8]) -> io::Result<()> {
    let mut stdin = stdin
        .ok_or_else(|| io::Error::new(io::ErrorKind::BrokenPipe, "agent stdin unavailable"))?;
    stdin.write_all(payload).await?;
    stdin.flush().await?;
    // dropping closes the pipe: end of input
    Ok(())
}

async fn collect<R: AsyncRead + Unpin>(reader: Option<R>) -> Vec<u8> {
    let mut buf = Vec::new();
    if let Some(mut reader) = reader {
        if let Err(e) = reader.read_to_end(&mut buf).await {
            debug!("agent stream read stopped early: {e}");
        }
    }
    buf
}

/// Forced, non-cooperative kill. Safe to call when the process already exited.
async fn terminate(child: &mut Child) {
    if let Err(e) = child.start_kill() {
        debug!("agent kill skipped: {e}");
    }
    if let Err(e) = child.wait().await {
        debug!("agent reap failed: {e}");
    }
}

/// Everything observed from a worker that terminated before the deadline.
#[derive(Debug)]
struct WorkerExit {
    success: bool,
    code: Option<i32>,
    write_error: Option<io::Error>,
    stdout: Vec<u8>,
    stderr: Vec<u8>,
}

/// Maps a finished worker to exactly one outcome.
///
/// A failed exit takes precedence over a write error (a worker that quits
/// early closes its stdin).
fn classify(exit: WorkerExit) -> Result<NotesDocument, AgentError> {
    if !exit.success {
        return Err(AgentError::NonZeroExit(best_diagnostic(
            &exit.stderr,
            &exit.stdout,
            exit.code,
        )));
    }

    if let Some(e) = exit.write_error {
        return Err(AgentError::WriteFailure(e.to_string()));
    }

    match serde_json::from_slice::<Value>(&exit.stdout) {
        Ok(document) => Ok(NotesDocument::new(document)),
        Err(e) => Err(AgentError::MalformedOutput {
            reason: e.to_string(),
            raw: String::from_utf8_lossy(&exit.stdout).into_owned(),
        }),
    }
}

/// stderr, else stdout, else a generic message naming the exit code.
fn best_diagnostic(stderr: &[u8], stdout: &[u8], code: Option<i32>) -> String {
    [stderr, stdout]
        .into_iter()
        .map(|bytes| String::from_utf8_lossy(bytes).trim().to_string())
        .find(|text| !text.is_empty())
        .unwrap_or_else(|| match code {
            Some(code) => format!("Agent exited with code {code}"),
            None => "Agent terminated by signal".to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notes::models::{Depth, ExamType};
    use serde_json::json;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn request() -> NoteRequest {
        NoteRequest {
            content: "Enzymes lower activation energy.".to_string(),
            exam_type: ExamType::Final,
            depth: Depth::Detailed,
        }
    }

    fn worker_config() -> WorkerConfig {
        WorkerConfig {
            api_key: "sk-or-test".to_string(),
            base_url: "https://openrouter.ai/api/v1".to_string(),
            model: "test/model".to_string(),
        }
    }

    /// Writes a throwaway /bin/sh worker. Keep the handle alive for the call.
    fn script(body: &str) -> (NamedTempFile, AgentProcess) {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "{body}").unwrap();
        let path = file.path().to_string_lossy().into_owned();
        (file, AgentProcess::new("/bin/sh", vec![path]))
    }

    fn exit(success: bool, code: Option<i32>, stdout: &str, stderr: &str) -> WorkerExit {
        WorkerExit {
            success,
            code,
            write_error: None,
            stdout: stdout.as_bytes().to_vec(),
            stderr: stderr.as_bytes().to_vec(),
        }
    }

    #[test]
    fn test_classify_success() {
        let doc = classify(exit(true, Some(0), r#"{"title":"T"}"#, "")).unwrap();
        assert_eq!(doc.raw(), &json!({ "title": "T" }));
    }

    #[test]
    fn test_classify_prefers_stderr() {
        let err = classify(exit(false, Some(1), "out text", "err text")).unwrap_err();
        assert_eq!(err, AgentError::NonZeroExit("err text".to_string()));
    }

    #[test]
    fn test_classify_falls_back_to_stdout() {
        let err = classify(exit(false, Some(1), "out text\n", "  \n")).unwrap_err();
        assert_eq!(err, AgentError::NonZeroExit("out text".to_string()));
    }

    #[test]
    fn test_classify_generic_message() {
        let err = classify(exit(false, Some(4), "", "")).unwrap_err();
        assert_eq!(
            err,
            AgentError::NonZeroExit("Agent exited with code 4".to_string())
        );
        let err = classify(exit(false, None, "", "")).unwrap_err();
        assert_eq!(
            err,
            AgentError::NonZeroExit("Agent terminated by signal".to_string())
        );
    }

    #[test]
    fn test_classify_write_error_on_clean_exit() {
        let mut finished = exit(true, Some(0), r#"{"title":"T"}"#, "");
        finished.write_error = Some(io::Error::new(io::ErrorKind::BrokenPipe, "pipe closed"));
        assert!(matches!(
            classify(finished),
            Err(AgentError::WriteFailure(msg)) if msg.contains("pipe closed")
        ));
    }

    #[test]
    fn test_classify_failed_exit_beats_write_error() {
        let mut finished = exit(false, Some(2), "", "bad key");
        finished.write_error = Some(io::Error::new(io::ErrorKind::BrokenPipe, "pipe closed"));
        assert_eq!(
            classify(finished),
            Err(AgentError::NonZeroExit("bad key".to_string()))
        );
    }

    #[test]
    fn test_classify_malformed_keeps_raw_text() {
        for raw in ["", "not json", r#"{"title": "T""#, r#"{"a":1}{"b":2}"#] {
            match classify(exit(true, Some(0), raw, "")) {
                Err(AgentError::MalformedOutput { raw: got, .. }) => assert_eq!(got, raw),
                other => panic!("expected MalformedOutput for {raw:?}, got {other:?}"),
            }
        }
    }

    #[tokio::test]
    async fn test_run_returns_worker_document() {
        let (_file, agent) = script(
            r#"cat > /dev/null
printf '%s\n' '{"title":"T","key_concepts":["A","B"],"important_points":["C"],"exam_tips":["D","E"]}'"#,
        );
        let doc = agent.run(&request(), &worker_config()).await.unwrap();
        assert_eq!(
            doc.raw(),
            &json!({
                "title": "T",
                "key_concepts": ["A", "B"],
                "important_points": ["C"],
                "exam_tips": ["D", "E"]
            })
        );
        assert_eq!(doc.notes().key_concepts, vec!["A", "B"]);
    }

    #[tokio::test]
    async fn test_run_sends_request_on_stdin_and_closes_it() {
        // `cat` only exits once stdin reaches EOF
        let (_file, agent) = script("cat");
        let doc = agent.run(&request(), &worker_config()).await.unwrap();
        assert_eq!(
            doc.raw(),
            &json!({
                "content": "Enzymes lower activation energy.",
                "exam_type": "final",
                "depth": "detailed"
            })
        );
    }

    #[tokio::test]
    async fn test_run_passes_worker_config_as_env() {
        let (_file, agent) = script(
            r#"cat > /dev/null
printf '{"title":"%s","key_concepts":["%s","%s"]}' "$OPENROUTER_API_KEY" "$OPENAI_BASE_URL" "$MODEL_NAME""#,
        );
        let doc = agent.run(&request(), &worker_config()).await.unwrap();
        assert_eq!(doc.notes().title, "sk-or-test");
        assert_eq!(
            doc.notes().key_concepts,
            vec!["https://openrouter.ai/api/v1", "test/model"]
        );
    }

    #[tokio::test]
    async fn test_run_non_zero_exit_reports_stderr() {
        let (_file, agent) = script(
            r#"cat > /dev/null
echo '{"partial": true}'
echo 'model refused the request' >&2
exit 3"#,
        );
        let err = agent.run(&request(), &worker_config()).await.unwrap_err();
        assert_eq!(
            err,
            AgentError::NonZeroExit("model refused the request".to_string())
        );
    }

    #[tokio::test]
    async fn test_run_non_zero_exit_without_reading_stdin() {
        let (_file, agent) = script("exit 7");
        let err = agent.run(&request(), &worker_config()).await.unwrap_err();
        assert_eq!(
            err,
            AgentError::NonZeroExit("Agent exited with code 7".to_string())
        );
    }

    #[tokio::test]
    async fn test_run_malformed_output() {
        let (_file, agent) = script(
            r#"cat > /dev/null
echo 'Here are your notes!'"#,
        );
        let err = agent.run(&request(), &worker_config()).await.unwrap_err();
        assert!(matches!(
            err,
            AgentError::MalformedOutput { ref raw, .. } if raw == "Here are your notes!\n"
        ));
    }

    #[tokio::test]
    async fn test_run_empty_output_is_malformed() {
        let (_file, agent) = script("cat > /dev/null");
        let err = agent.run(&request(), &worker_config()).await.unwrap_err();
        assert!(matches!(err, AgentError::MalformedOutput { ref raw, .. } if raw.is_empty()));
    }

    #[tokio::test]
    async fn test_run_launch_failure() {
        let agent = AgentProcess::new("/nonexistent/notes-worker", vec![]);
        let err = agent.run(&request(), &worker_config()).await.unwrap_err();
        assert!(matches!(err, AgentError::LaunchFailure(_)));
    }

    #[tokio::test]
    async fn test_run_timeout_kills_worker() {
        let pid_file = NamedTempFile::new().unwrap();
        let pid_path = pid_file.path().to_string_lossy().into_owned();
        let (_file, agent) = script(&format!("echo $$ > {pid_path}\nexec sleep 30"));
        let agent = agent.with_deadline(Duration::from_millis(300));

        let started = std::time::Instant::now();
        let err = agent.run(&request(), &worker_config()).await.unwrap_err();

        assert_eq!(err, AgentError::Timeout { seconds: 0 });
        assert!(started.elapsed() < Duration::from_secs(10));

        let pid = std::fs::read_to_string(pid_file.path()).unwrap();
        let proc_path = format!("/proc/{}", pid.trim());
        if cfg!(target_os = "linux") {
            assert!(!std::path::Path::new(&proc_path).exists());
        }
    }

    #[tokio::test]
    async fn test_run_timeout_discards_partial_output() {
        let (_file, agent) = script(
            r#"printf '{"title":"half'
exec sleep 30"#,
        );
        let agent = agent.with_deadline(Duration::from_millis(300));
        let err = agent.run(&request(), &worker_config()).await.unwrap_err();
        assert!(matches!(err, AgentError::Timeout { .. }));
    }

    #[tokio::test]
    async fn test_concurrent_calls_use_separate_processes() {
        let (_file, agent) = script("cat");
        let mut handles = Vec::new();
        for i in 0..4 {
            let agent = agent.clone();
            handles.push(tokio::spawn(async move {
                let mut req = request();
                req.content = format!("Independent request number {i} for the worker");
                agent.run(&req, &worker_config()).await
            }));
        }
        for (i, handle) in handles.into_iter().enumerate() {
            let doc = handle.await.unwrap().unwrap();
            assert_eq!(
                doc.raw()["content"],
                json!(format!("Independent request number {i} for the worker"))
            );
        }
    }

    #[test]
    fn test_default_deadline_is_sixty_seconds() {
        let agent = AgentProcess::new("python3", vec!["agent/agent.py".to_string()]);
        assert_eq!(agent.deadline, Duration::from_secs(60));
    }
}
