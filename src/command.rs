//! Running external commands.

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use crate::error::VexError;

/// Executes an external program and returns its standard output.
#[allow(async_fn_in_trait)] // implemented in-crate and by test doubles only
pub trait Runner {
    /// Run `program` with `args`.
    ///
    /// A nonzero exit yields [`VexError::Exit`] carrying the captured stderr.
    async fn run(&self, program: &str, args: &[String]) -> Result<Vec<u8>, VexError>;
}

/// Spawns the program as a child process and waits for it.
#[derive(Debug, Clone, Default)]
pub struct ShellRunner {
    pub working_dir: Option<PathBuf>,
    pub timeout: Option<Duration>,
}

impl ShellRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

impl Runner for ShellRunner {
    async fn run(&self, program: &str, args: &[String]) -> Result<Vec<u8>, VexError> {
        let mut cmd = tokio::process::Command::new(program);
        cmd.args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(ref dir) = self.working_dir {
            cmd.current_dir(dir);
        }

        let child = cmd.spawn().map_err(|source| {
            tracing::error!(program, error = %source, "failed to start command");
            VexError::Spawn {
                command: program.to_string(),
                source,
            }
        })?;

        let wait = child.wait_with_output();
        let output = match self.timeout {
            // Dropping the timed-out future drops the child, which kills it.
            Some(limit) => tokio::time::timeout(limit, wait).await.map_err(|_| {
                VexError::Timeout {
                    command: program.to_string(),
                    secs: limit.as_secs(),
                }
            })?,
            None => wait.await,
        }
        .map_err(|source| {
            tracing::error!(program, error = %source, "failed waiting for command");
            VexError::Wait {
                command: program.to_string(),
                source,
            }
        })?;

        if !output.status.success() {
            return Err(VexError::Exit {
                command: program.to_string(),
                // None when terminated by a signal
                code: output.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&output.stderr).trim_end().to_string(),
            });
        }

        Ok(output.stdout)
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn sh(script: &str) -> Vec<String> {
        vec!["-c".into(), script.into()]
    }

    #[tokio::test]
    async fn captures_stdout() {
        let out = ShellRunner::new().run("sh", &sh("printf hello")).await.unwrap();
        assert_eq!(out, b"hello");
    }

    #[tokio::test]
    async fn nonzero_exit_carries_code_and_stderr() {
        let err = ShellRunner::new()
            .run("sh", &sh("echo boom >&2; exit 3"))
            .await
            .unwrap_err();
        match err {
            VexError::Exit {
                command,
                code,
                stderr,
            } => {
                assert_eq!(command, "sh");
                assert_eq!(code, 3);
                assert_eq!(stderr, "boom");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn missing_binary_is_a_spawn_error() {
        let err = ShellRunner::new()
            .run("/nonexistent/vagrant", &[])
            .await
            .unwrap_err();
        assert!(matches!(err, VexError::Spawn { .. }));
    }

    #[test]
    fn wait_failure_reads_differently_from_spawn_failure() {
        let io = || std::io::Error::other("broken pipe");
        let spawn = VexError::Spawn {
            command: "vagrant".into(),
            source: io(),
        };
        let wait = VexError::Wait {
            command: "vagrant".into(),
            source: io(),
        };
        assert!(spawn.to_string().contains("failed to start"));
        assert!(!wait.to_string().contains("failed to start"));
        assert!(wait.to_string().contains("after it started"));
    }

    #[tokio::test]
    async fn runs_in_working_dir() {
        let dir = tempfile::tempdir().unwrap();
        let out = ShellRunner::new()
            .with_working_dir(dir.path())
            .run("sh", &sh("pwd"))
            .await
            .unwrap();
        let printed = String::from_utf8(out).unwrap();
        let expected = dir.path().canonicalize().unwrap();
        assert_eq!(
            std::path::Path::new(printed.trim()).canonicalize().unwrap(),
            expected
        );
    }

    #[tokio::test]
    async fn slow_command_times_out() {
        let err = ShellRunner::new()
            .with_timeout(Duration::from_millis(100))
            .run("sh", &sh("sleep 5"))
            .await
            .unwrap_err();
        assert!(matches!(err, VexError::Timeout { .. }));
    }
}
