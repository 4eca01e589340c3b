//! Shared test utilities for the `git` module.

#![allow(clippy::unwrap_used)]

use std::collections::HashMap;
use std::sync::Mutex;

use crate::git::command::{GitArgs, GitCommandError, GitFuture, GitRunner};

/// Canned outcome of a git invocation.
enum Reply {
    Stdout(String),
    Failure { code: i32, stderr: String },
}

/// Fake git runner that answers from a table keyed by argument list.
///
/// Replies are looked up by the exact argument list, so the order in which
/// concurrent callers arrive does not matter. Every call is recorded;
/// invocations with no programmed reply fail with exit status 1.
#[derive(Default)]
pub(crate) struct RecordingGit {
    replies: HashMap<Vec<String>, Reply>,
    calls: Mutex<Vec<Vec<String>>>,
}

impl RecordingGit {
    /// Creates a runner with no programmed replies.
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Programs a successful reply for the given argument list.
    pub(crate) fn respond(mut self, args: &[&str], stdout: &str) -> Self {
        self.replies
            .insert(to_key(args), Reply::Stdout(stdout.to_string()));
        self
    }

    /// Programs a failing reply for the given argument list.
    pub(crate) fn fail(mut self, args: &[&str], code: i32, stderr: &str) -> Self {
        self.replies.insert(
            to_key(args),
            Reply::Failure {
                code,
                stderr: stderr.to_string(),
            },
        );
        self
    }

    /// Returns every argument list received so far, in call order.
    pub(crate) fn calls(&self) -> Vec<Vec<String>> {
        self.calls.lock().unwrap().clone()
    }
}

fn to_key(args: &[&str]) -> Vec<String> {
    args.iter().map(|a| (*a).to_string()).collect()
}

impl GitRunner for RecordingGit {
    fn run<'a>(&'a self, args: &'a GitArgs) -> GitFuture<'a> {
        let key = args.as_slice().to_vec();
        self.calls.lock().unwrap().push(key.clone());

        let result = match self.replies.get(&key) {
            Some(Reply::Stdout(stdout)) => Ok(stdout.clone()),
            Some(Reply::Failure { code, stderr }) => Err(GitCommandError::Failed {
                command: args.to_string(),
                code: Some(*code),
                stderr: stderr.clone(),
            }),
            None => Err(GitCommandError::Failed {
                command: args.to_string(),
                code: Some(1),
                stderr: "unexpected git call".to_string(),
            }),
        };

        Box::pin(async move { result })
    }
}
