//! Process-spawning command runner.

use super::{CommandInvocation, CommandOutput, CommandRunner, FALLBACK_EXIT_CODE};
use async_trait::async_trait;
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, warn};

/// Runs programs as child processes of the agent.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemCommandRunner;

impl SystemCommandRunner {
    /// Creates a runner.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    async fn spawn(invocation: &CommandInvocation) -> std::io::Result<std::process::Output> {
        let mut command = Command::new(invocation.program());
        command
            .args(invocation.arguments())
            .envs(invocation.environment().iter().map(|(k, v)| (k, v)))
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        match invocation.stdin_path() {
            Some(path) => {
                let file = tokio::fs::File::open(path).await?.into_std().await;
                command.stdin(Stdio::from(file));
            }
            None => {
                command.stdin(Stdio::null());
            }
        }

        command.output().await
    }
}

#[async_trait]
impl CommandRunner for SystemCommandRunner {
    async fn run(&self, invocation: &CommandInvocation) -> CommandOutput {
        debug!(command = %invocation, "running external command");

        let output = match Self::spawn(invocation).await {
            Ok(output) => CommandOutput {
                exit_code: output.status.code().unwrap_or(FALLBACK_EXIT_CODE),
                stdout: trim_trailing_newline(&output.stdout),
                stderr: trim_trailing_newline(&output.stderr),
            },
            Err(err) => CommandOutput {
                exit_code: FALLBACK_EXIT_CODE,
                stdout: String::new(),
                stderr: err.to_string(),
            },
        };

        if !output.succeeded() {
            warn!(
                command = %invocation,
                exit_code = output.exit_code,
                "external command failed"
            );
        }
        output
    }
}

fn trim_trailing_newline(bytes: &[u8]) -> String {
    let text = String::from_utf8_lossy(bytes);
    text.strip_suffix('\n').unwrap_or(&text).to_owned()
}

#[cfg(all(test, unix))]
mod tests {
    use super::SystemCommandRunner;
    use crate::command::{CommandInvocation, CommandRunner, FALLBACK_EXIT_CODE};
    use std::io::Write;

    #[tokio::test(flavor = "multi_thread")]
    async fn captures_exit_code_and_both_streams() {
        let invocation = CommandInvocation::new("sh")
            .arg("-c")
            .arg("echo out; echo err >&2; exit 3");

        let output = SystemCommandRunner::new().run(&invocation).await;

        assert_eq!(output.exit_code, 3);
        assert_eq!(output.stdout, "out");
        assert_eq!(output.stderr, "err");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn only_one_trailing_newline_is_removed() {
        let invocation = CommandInvocation::new("sh").arg("-c").arg("printf 'a\\n\\n'");

        let output = SystemCommandRunner::new().run(&invocation).await;

        assert!(output.succeeded());
        assert_eq!(output.stdout, "a\n");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn missing_program_reports_the_fallback_code() {
        let invocation = CommandInvocation::new("/nonexistent/dbfleet-tool");

        let output = SystemCommandRunner::new().run(&invocation).await;

        assert_eq!(output.exit_code, FALLBACK_EXIT_CODE);
        assert!(!output.stderr.is_empty());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn stdin_file_is_fed_to_the_child() {
        let mut dump = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(dump, "select 1;").expect("write dump");
        let invocation = CommandInvocation::new("cat").stdin_file(dump.path());

        let output = SystemCommandRunner::new().run(&invocation).await;

        assert_eq!(output.stdout, "select 1;");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn environment_is_passed_through() {
        let invocation = CommandInvocation::new("sh")
            .arg("-c")
            .arg("printf %s \"$DBFLEET_PROBE\"")
            .env("DBFLEET_PROBE", "present");

        let output = SystemCommandRunner::new().run(&invocation).await;

        assert_eq!(output.stdout, "present");
    }
}
