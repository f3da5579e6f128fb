use std::ffi::OsString;
use std::io::Read;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{anyhow, Context, Result};
use wait_timeout::ChildExt;

/// Single-shot external command execution with a bounded wait.
#[derive(Debug, Clone)]
pub struct ExecService {
    timeout: Duration,
}

impl ExecService {
    /// A zero timeout waits indefinitely.
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    pub fn run(&self, request: ExecRequest) -> Result<ExecOutput> {
        let mut cmd = Command::new(&request.program);
        cmd.args(&request.args);
        if let Some(ref cwd) = request.cwd {
            cmd.current_dir(cwd);
        }
        for (key, value) in &request.env {
            cmd.env(key, value);
        }
        cmd.stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        tracing::debug!(program = ?request.program, args = ?request.args, "spawning");
        let mut child = cmd.spawn().with_context(|| {
            format!(
                "failed to spawn {:?} with args {:?}",
                request.program, request.args
            )
        })?;

        // Drain pipes concurrently; large JSON payloads would otherwise fill the
        // pipe buffer and stall the child before it exits.
        let stdout_reader = child.stdout.take().map(spawn_reader);
        let stderr_reader = child.stderr.take().map(spawn_reader);

        let timeout = self.timeout;
        let started = Instant::now();
        let status = if timeout.is_zero() {
            child.wait().context("failed to wait for process")?
        } else {
            match child
                .wait_timeout(timeout)
                .context("failed to wait with timeout")?
            {
                Some(status) => status,
                None => {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(anyhow!(
                        "command {:?} timed out after {:?}",
                        request.program,
                        timeout
                    ));
                }
            }
        };
        let elapsed = started.elapsed();

        let stdout = join_reader(stdout_reader)?;
        let stderr = join_reader(stderr_reader)?;
        tracing::debug!(
            program = ?request.program,
            code = ?status.code(),
            elapsed_ms = elapsed.as_millis() as u64,
            "process finished"
        );

        Ok(ExecOutput {
            status,
            stdout,
            stderr,
        })
    }
}

fn spawn_reader<R: Read + Send + 'static>(
    mut stream: R,
) -> thread::JoinHandle<std::io::Result<String>> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        stream.read_to_end(&mut buf)?;
        Ok(String::from_utf8_lossy(&buf).into_owned())
    })
}

fn join_reader(handle: Option<thread::JoinHandle<std::io::Result<String>>>) -> Result<String> {
    match handle {
        None => Ok(String::new()),
        Some(h) => h
            .join()
            .map_err(|_| anyhow!("output reader thread panicked"))?
            .context("failed to read process output"),
    }
}

impl Default for ExecService {
    fn default() -> Self {
        Self::new(Duration::from_secs(30))
    }
}

#[derive(Debug, Default)]
pub struct ExecRequest {
    program: OsString,
    args: Vec<OsString>,
    cwd: Option<PathBuf>,
    env: Vec<(OsString, OsString)>,
}

impl ExecRequest {
    pub fn new(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
            ..Self::default()
        }
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn cwd(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    pub fn env(mut self, key: impl Into<OsString>, value: impl Into<OsString>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }
}

#[derive(Debug)]
pub struct ExecOutput {
    pub status: std::process::ExitStatus,
    pub stdout: String,
    pub stderr: String,
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn test_run_captures_stdout() {
        let out = ExecService::default()
            .run(ExecRequest::new("sh").args(["-c", "printf hello; printf oops >&2"]))
            .expect("run sh");
        assert!(out.status.success());
        assert_eq!(out.stdout, "hello");
        assert_eq!(out.stderr, "oops");
    }

    #[test]
    fn test_run_reports_timeout() {
        let err = ExecService::new(Duration::from_millis(200))
            .run(ExecRequest::new("sh").args(["-c", "sleep 5"]))
            .expect_err("should time out");
        assert!(err.to_string().contains("timed out"), "{}", err);
    }

    #[test]
    fn test_run_drains_large_output() {
        let out = ExecService::default()
            .run(ExecRequest::new("sh").args(["-c", "head -c 300000 /dev/zero | tr '\\0' x"]))
            .expect("run sh");
        assert_eq!(out.stdout.len(), 300_000);
    }

    #[test]
    fn test_missing_program_is_spawn_error() {
        let err = ExecService::default()
            .run(ExecRequest::new("zetteldev-definitely-not-a-program"))
            .expect_err("spawn should fail");
        assert!(err.to_string().contains("failed to spawn"), "{}", err);
    }
}
