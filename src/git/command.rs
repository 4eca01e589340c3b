//! Typed git invocation.
//!
//! Every git call in the crate is described by a [`GitArgs`] value and
//! executed through the [`GitRunner`] trait. Arguments are passed to the
//! process as a list, never through a shell, so branch names with spaces or
//! shell metacharacters reach git untouched.

use std::fmt;
use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;

use thiserror::Error;
use tokio::process::Command;
use tracing::debug;

/// Argument list for a single git invocation (without the leading `git`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GitArgs {
    args: Vec<String>,
}

impl GitArgs {
    /// Starts a new invocation of the given git subcommand.
    pub fn new(subcommand: &str) -> Self {
        Self {
            args: vec![subcommand.to_string()],
        }
    }

    /// Appends one argument.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Appends several arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Appends an argument only when `condition` holds.
    pub fn arg_if(self, condition: bool, arg: impl Into<String>) -> Self {
        if condition {
            self.arg(arg)
        } else {
            self
        }
    }

    /// Returns the arguments as passed to the process.
    pub fn as_slice(&self) -> &[String] {
        &self.args
    }
}

impl fmt::Display for GitArgs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "git")?;
        for arg in &self.args {
            if arg.is_empty() || arg.contains(char::is_whitespace) {
                write!(f, " '{arg}'")?;
            } else {
                write!(f, " {arg}")?;
            }
        }
        Ok(())
    }
}

/// A git invocation that did not succeed.
#[derive(Error, Debug)]
pub enum GitCommandError {
    /// The git binary could not be started.
    #[error("Failed to run `{command}`")]
    Spawn {
        /// Rendered command line.
        command: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Git ran and exited unsuccessfully.
    #[error("`{command}` exited with {}: {stderr}", describe_status(.code))]
    Failed {
        /// Rendered command line.
        command: String,
        /// Exit code, if the process was not killed by a signal.
        code: Option<i32>,
        /// Trimmed standard error output.
        stderr: String,
    },
}

fn describe_status(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("status {code}"),
        None => "no status (terminated by signal)".to_string(),
    }
}

/// Boxed future returned by [`GitRunner::run`].
pub type GitFuture<'a> = Pin<Box<dyn Future<Output = Result<String, GitCommandError>> + Send + 'a>>;

/// Executes git invocations and returns their standard output.
pub trait GitRunner: Send + Sync {
    /// Runs git with the given arguments.
    ///
    /// Resolves to stdout on a zero exit status and to
    /// [`GitCommandError::Failed`] otherwise.
    fn run<'a>(&'a self, args: &'a GitArgs) -> GitFuture<'a>;
}

/// Runs the `git` binary found on `PATH`.
#[derive(Debug, Clone, Default)]
pub struct SystemGit {
    repo_dir: Option<PathBuf>,
}

impl SystemGit {
    /// Runs git in the current working directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs git inside the given directory.
    pub fn in_dir(repo_dir: impl Into<PathBuf>) -> Self {
        Self {
            repo_dir: Some(repo_dir.into()),
        }
    }
}

impl GitRunner for SystemGit {
    fn run<'a>(&'a self, args: &'a GitArgs) -> GitFuture<'a> {
        Box::pin(async move {
            debug!(command = %args, "Running git");

            let mut command = Command::new("git");
            command.args(args.as_slice());
            if let Some(dir) = &self.repo_dir {
                command.current_dir(dir);
            }

            let output = command
                .output()
                .await
                .map_err(|source| GitCommandError::Spawn {
                    command: args.to_string(),
                    source,
                })?;

            if !output.status.success() {
                let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
                debug!(command = %args, code = ?output.status.code(), "git failed");
                return Err(GitCommandError::Failed {
                    command: args.to_string(),
                    code: output.status.code(),
                    stderr,
                });
            }

            Ok(String::from_utf8_lossy(&output.stdout).into_owned())
        })
    }
}
