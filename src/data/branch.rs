//! Branch record and the enums describing where branches come from.

use std::fmt;

use chrono::{DateTime, FixedOffset};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Where branches are listed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum BranchSource {
    /// Local branches (`refs/heads`).
    Local,
    /// Remote-tracking branches (`refs/remotes`).
    Remote,
}

impl fmt::Display for BranchSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local => write!(f, "local"),
            Self::Remote => write!(f, "remote"),
        }
    }
}

/// Whether branches are fully contained in the main branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum MergeState {
    /// Every commit is reachable from the main branch.
    Merged,
    /// At least one commit is not on the main branch.
    Unmerged,
}

impl MergeState {
    /// Returns the `git branch` filter flag for this state.
    pub fn git_flag(self) -> &'static str {
        match self {
            Self::Merged => "--merged",
            Self::Unmerged => "--no-merged",
        }
    }

    /// Returns the capitalised label used in notifications.
    pub fn label(self) -> &'static str {
        match self {
            Self::Merged => "Merged",
            Self::Unmerged => "Unmerged",
        }
    }
}

impl fmt::Display for MergeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Merged => write!(f, "merged"),
            Self::Unmerged => write!(f, "unmerged"),
        }
    }
}

/// A branch together with its last commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Branch {
    /// Reference as printed by `git branch` (e.g. `origin/feature-x`).
    pub name: String,
    /// Name with the remote prefix removed.
    pub pretty_name: String,
    /// Last committer name.
    pub author: String,
    /// Last committer email.
    pub email: String,
    /// Last commit date.
    pub date: DateTime<FixedOffset>,
    /// Relative rendering of `date` (e.g. "3 weeks ago").
    pub pretty_date: String,
    /// Issue tracker link, empty when the name carries no known issue key.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub issue_url: String,
}

/// Sorts branches oldest first.
///
/// The sort is stable, so branches sharing a commit date keep their
/// relative order and sorting twice changes nothing.
pub fn sort_by_date(branches: &mut [Branch]) {
    branches.sort_by_key(|b| b.date);
}

#[cfg(test)]
pub(crate) fn sample_branch(name: &str, author: &str, date: &str) -> Branch {
    #[allow(clippy::unwrap_used)]
    let date = DateTime::parse_from_rfc3339(date).unwrap();
    Branch {
        name: name.to_string(),
        pretty_name: name.trim_start_matches("origin/").to_string(),
        author: author.to_string(),
        email: format!("{}@example.com", author.to_lowercase().replace(' ', ".")),
        date,
        pretty_date: "some time ago".to_string(),
        issue_url: String::new(),
    }
}
