//! Subprocess execution.
//!
//! Provides utilities for running external commands with:
//! - No shell interpretation (direct exec)
//! - An optional timeout covering both the process and its output pipes
//! - Captured stdout/stderr, separately or interleaved through one pipe

use std::io::{self, Read};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::error::{CommandErrorKind, SvcctlError};

/// How stdout and stderr are captured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capture {
    /// Two pipes; `stdout` and `stderr` are kept apart.
    Separate,
    /// One pipe shared by both streams, so writes keep their order. Everything
    /// lands in `stdout`; `stderr` stays empty.
    Interleaved,
}

/// Result of a subprocess execution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubprocessResult {
    /// Whether the command exited successfully (exit code 0).
    pub success: bool,
    /// The exit code, if available.
    pub exit_code: Option<i32>,
    /// Captured stdout as a string.
    pub stdout: String,
    /// Captured stderr as a string.
    pub stderr: String,
}

impl SubprocessResult {
    /// Stdout followed by stderr. For [`Capture::Interleaved`] runs this is
    /// the merged stream as written.
    pub fn combined_output(&self) -> String {
        let mut combined = String::with_capacity(self.stdout.len() + self.stderr.len());
        combined.push_str(&self.stdout);
        combined.push_str(&self.stderr);
        combined
    }
}

#[derive(Debug, Clone, Copy)]
enum Stream {
    Stdout,
    Stderr,
}

/// Builder for subprocess execution.
pub struct SubprocessBuilder {
    program: String,
    args: Vec<String>,
    timeout: Option<Duration>,
    capture: Capture,
}

impl SubprocessBuilder {
    /// Create a new subprocess builder.
    pub fn new(program: &str) -> Self {
        Self {
            program: program.to_string(),
            args: Vec::new(),
            timeout: None,
            capture: Capture::Separate,
        }
    }

    /// Add arguments to the command.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.args.extend(args.into_iter().map(|s| s.as_ref().to_string()));
        self
    }

    /// Bound how long the command may run. `None` waits indefinitely.
    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn capture(mut self, capture: Capture) -> Self {
        self.capture = capture;
        self
    }

    /// Execute the command and wait for it to finish.
    ///
    /// A non-zero exit is not an error here; callers inspect
    /// [`SubprocessResult::success`]. If a timeout is set, it covers the
    /// process and the draining of its output: a descendant still holding
    /// the pipes past the deadline also yields a timeout error.
    pub fn run(self) -> Result<SubprocessResult, SvcctlError> {
        debug!(
            program = %self.program,
            args = ?self.args,
            capture = ?self.capture,
            timeout_secs = ?self.timeout.map(|t| t.as_secs()),
            "Executing subprocess"
        );

        let start = Instant::now();
        let deadline = self.timeout.map(|t| start + t);

        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        cmd.stdin(Stdio::null());

        let (tx, rx) = mpsc::channel();
        let mut pending = 0;
        let mut child = match self.capture {
            Capture::Separate => {
                cmd.stdout(Stdio::piped());
                cmd.stderr(Stdio::piped());
                let mut child = self.spawn(&mut cmd)?;
                if let Some(out) = child.stdout.take() {
                    drain(out, Stream::Stdout, tx.clone());
                    pending += 1;
                }
                if let Some(err) = child.stderr.take() {
                    drain(err, Stream::Stderr, tx.clone());
                    pending += 1;
                }
                child
            }
            Capture::Interleaved => {
                let (reader, writer) = io::pipe().map_err(|e| self.spawn_error(e))?;
                let writer_for_stderr = writer.try_clone().map_err(|e| self.spawn_error(e))?;
                cmd.stdout(writer);
                cmd.stderr(writer_for_stderr);
                let child = self.spawn(&mut cmd)?;
                drain(reader, Stream::Stdout, tx.clone());
                pending += 1;
                child
            }
        };
        // The command still owns our copies of the write ends; the reader only
        // sees EOF once they are gone.
        drop(cmd);
        drop(tx);

        let status = self.wait(&mut child, deadline)?;

        let mut stdout = Vec::new();
        let mut stderr = Vec::new();
        for _ in 0..pending {
            let received = match deadline {
                None => rx.recv().ok(),
                Some(deadline) => {
                    match rx.recv_timeout(deadline.saturating_duration_since(Instant::now())) {
                        Ok(chunk) => Some(chunk),
                        Err(RecvTimeoutError::Timeout) => {
                            warn!(program = %self.program, "Output pipes still open at deadline");
                            return Err(self.timed_out(&mut child));
                        }
                        Err(RecvTimeoutError::Disconnected) => None,
                    }
                }
            };
            match received {
                Some((Stream::Stdout, bytes)) => stdout = bytes,
                Some((Stream::Stderr, bytes)) => stderr = bytes,
                None => break,
            }
        }

        let result = SubprocessResult {
            success: status.success(),
            exit_code: status.code(),
            stdout: String::from_utf8_lossy(&stdout).to_string(),
            stderr: String::from_utf8_lossy(&stderr).to_string(),
        };
        debug!(
            success = result.success,
            exit_code = ?result.exit_code,
            duration_ms = start.elapsed().as_millis(),
            "Subprocess completed"
        );
        Ok(result)
    }

    fn spawn(&self, cmd: &mut Command) -> Result<Child, SvcctlError> {
        cmd.spawn().map_err(|e| self.spawn_error(e))
    }

    fn spawn_error(&self, e: io::Error) -> SvcctlError {
        SvcctlError::Command {
            kind: CommandErrorKind::SpawnFailed {
                program: self.program.clone(),
                message: e.to_string(),
            },
        }
    }

    fn wait(
        &self,
        child: &mut Child,
        deadline: Option<Instant>,
    ) -> Result<ExitStatus, SvcctlError> {
        let Some(deadline) = deadline else {
            return child.wait().map_err(|e| self.spawn_error(e));
        };

        let poll_interval = Duration::from_millis(50);
        loop {
            match child.try_wait() {
                Ok(Some(status)) => return Ok(status),
                Ok(None) => {
                    if Instant::now() >= deadline {
                        warn!(program = %self.program, "Process timed out, killing");
                        return Err(self.timed_out(child));
                    }
                    thread::sleep(poll_interval);
                }
                Err(e) => {
                    return Err(SvcctlError::Command {
                        kind: CommandErrorKind::SpawnFailed {
                            program: self.program.clone(),
                            message: format!("failed to check process status: {}", e),
                        },
                    });
                }
            }
        }
    }

    fn timed_out(&self, child: &mut Child) -> SvcctlError {
        if let Err(e) = child.kill() {
            warn!(error = %e, "Failed to kill timed-out process");
        }
        // Reap the zombie process
        let _ = child.wait();
        SvcctlError::Command {
            kind: CommandErrorKind::Timeout {
                timeout_secs: self.timeout.map_or(0, |t| t.as_secs()),
            },
        }
    }
}

/// Read a pipe to EOF on a helper thread and hand the bytes back.
fn drain<R: Read + Send + 'static>(mut pipe: R, stream: Stream, tx: Sender<(Stream, Vec<u8>)>) {
    thread::spawn(move || {
        let mut buf = Vec::new();
        let _ = pipe.read_to_end(&mut buf);
        // The receiver is gone if the caller already timed out
        let _ = tx.send((stream, buf));
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(
        program: &str,
        args: &[&str],
        timeout: Option<Duration>,
    ) -> Result<SubprocessResult, SvcctlError> {
        SubprocessBuilder::new(program).args(args).timeout(timeout).run()
    }

    #[test]
    fn test_run_echo() {
        let result = run("echo", &["hello", "world"], None).unwrap();
        assert!(result.success);
        assert_eq!(result.exit_code, Some(0));
        assert_eq!(result.stdout.trim(), "hello world");
    }

    #[test]
    fn test_run_false_command() {
        let result = run("false", &[], None).unwrap();
        assert!(!result.success);
        assert_eq!(result.exit_code, Some(1));
    }

    #[test]
    fn test_subprocess_builder() {
        let result = SubprocessBuilder::new("echo")
            .args(["test", "builder"])
            .timeout(Some(Duration::from_secs(5)))
            .run()
            .unwrap();

        assert!(result.success);
        assert_eq!(result.stdout.trim(), "test builder");
    }

    #[test]
    fn test_nonexistent_command() {
        let result = run("nonexistent_command_12345", &[], None);
        assert!(matches!(
            result,
            Err(SvcctlError::Command {
                kind: CommandErrorKind::SpawnFailed { .. }
            })
        ));
    }

    #[test]
    fn test_separate_capture() {
        let result = run("sh", &["-c", "echo out; echo err >&2; exit 3"], None).unwrap();
        assert!(!result.success);
        assert_eq!(result.exit_code, Some(3));
        assert_eq!(result.stdout, "out\n");
        assert_eq!(result.stderr, "err\n");
        assert_eq!(result.combined_output(), "out\nerr\n");
    }

    #[test]
    fn test_interleaved_capture_keeps_order() {
        for timeout in [None, Some(Duration::from_secs(5))] {
            let result = SubprocessBuilder::new("sh")
                .args(["-c", "echo one; echo two >&2; echo three; exit 4"])
                .capture(Capture::Interleaved)
                .timeout(timeout)
                .run()
                .unwrap();

            assert_eq!(result.exit_code, Some(4));
            assert_eq!(result.stdout, "one\ntwo\nthree\n");
            assert!(result.stderr.is_empty());
            assert_eq!(result.combined_output(), "one\ntwo\nthree\n");
        }
    }

    #[test]
    fn test_timeout_kills_process() {
        let start = Instant::now();
        let result = run("sleep", &["10"], Some(Duration::from_secs(1)));
        assert!(matches!(
            result,
            Err(SvcctlError::Command {
                kind: CommandErrorKind::Timeout { timeout_secs: 1 }
            })
        ));
        assert!(start.elapsed() < Duration::from_secs(5));
    }

    #[test]
    fn test_timeout_covers_background_descendant() {
        // The shell exits at once but its background child keeps the pipes open.
        for capture in [Capture::Separate, Capture::Interleaved] {
            let start = Instant::now();
            let result = SubprocessBuilder::new("sh")
                .args(["-c", "sleep 8 & echo hi"])
                .capture(capture)
                .timeout(Some(Duration::from_secs(1)))
                .run();

            assert!(matches!(
                result,
                Err(SvcctlError::Command {
                    kind: CommandErrorKind::Timeout { timeout_secs: 1 }
                })
            ));
            assert!(start.elapsed() < Duration::from_secs(4));
        }
    }

    #[test]
    fn test_timeout_large_output() {
        // More than a pipe buffer's worth must not stall the wait loop.
        let result = run(
            "sh",
            &["-c", "head -c 200000 /dev/zero | tr '\\0' x"],
            Some(Duration::from_secs(10)),
        )
        .unwrap();
        assert!(result.success);
        assert_eq!(result.stdout.len(), 200_000);
    }
}
