//! External command execution.
//!
//! CLI-driven vendor adapters shell out to the vendor's client tool. The
//! [`CommandRunner`] port keeps that boundary mockable; [`SystemCommandRunner`]
//! is the process-spawning implementation.

mod system;

pub use system::SystemCommandRunner;

use async_trait::async_trait;
use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};

/// Exit code reported when a process fails without one of its own.
pub const FALLBACK_EXIT_CODE: i32 = 1;

/// Captured result of running an external program.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Process exit code, or [`FALLBACK_EXIT_CODE`] when none was available.
    pub exit_code: i32,
    /// Standard output with a single trailing newline removed.
    pub stdout: String,
    /// Standard error with a single trailing newline removed.
    pub stderr: String,
}

impl CommandOutput {
    /// Returns `true` when the program exited with code 0.
    #[must_use]
    pub const fn succeeded(&self) -> bool {
        self.exit_code == 0
    }
}

/// A program invocation: path, arguments, environment and optional stdin file.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct CommandInvocation {
    program: PathBuf,
    args: Vec<OsString>,
    envs: Vec<(OsString, OsString)>,
    stdin_file: Option<PathBuf>,
    redacted: Vec<String>,
}

impl CommandInvocation {
    /// Starts an invocation of `program`.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            ..Self::default()
        }
    }

    /// Appends one argument.
    #[must_use]
    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Appends several arguments.
    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Sets an environment variable for the child process.
    #[must_use]
    pub fn env(mut self, key: impl Into<OsString>, value: impl Into<OsString>) -> Self {
        self.envs.push((key.into(), value.into()));
        self
    }

    /// Feeds the named file to the child's standard input.
    #[must_use]
    pub fn stdin_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.stdin_file = Some(path.into());
        self
    }

    /// Marks a secret so it is masked whenever the invocation is displayed.
    #[must_use]
    pub fn redact(mut self, secret: impl Into<String>) -> Self {
        let secret = secret.into();
        if !secret.is_empty() {
            self.redacted.push(secret);
        }
        self
    }

    /// Returns the program path.
    #[must_use]
    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Returns the argument list.
    #[must_use]
    pub fn arguments(&self) -> &[OsString] {
        &self.args
    }

    /// Returns the extra environment variables.
    #[must_use]
    pub fn environment(&self) -> &[(OsString, OsString)] {
        &self.envs
    }

    /// Returns the file wired to standard input, if any.
    #[must_use]
    pub fn stdin_path(&self) -> Option<&Path> {
        self.stdin_file.as_deref()
    }

    /// Returns `true` when any argument equals `needle`.
    #[must_use]
    pub fn has_arg(&self, needle: &str) -> bool {
        self.args.iter().any(|arg| arg == needle)
    }

    fn masked(&self, value: &str) -> String {
        self.redacted
            .iter()
            .fold(value.to_owned(), |acc, secret| acc.replace(secret.as_str(), "****"))
    }
}

impl fmt::Display for CommandInvocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.masked(&self.program.to_string_lossy()))?;
        for arg in &self.args {
            write!(f, " {}", self.masked(&arg.to_string_lossy()))?;
        }
        if let Some(path) = &self.stdin_file {
            write!(f, " < {}", path.display())?;
        }
        Ok(())
    }
}

impl fmt::Debug for CommandInvocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CommandInvocation({self})")
    }
}

/// Runs external programs and captures their output.
///
/// Implementations never fail: spawn errors and signal terminations are
/// folded into a [`CommandOutput`] carrying [`FALLBACK_EXIT_CODE`].
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Runs `invocation` to completion.
    async fn run(&self, invocation: &CommandInvocation) -> CommandOutput;
}
