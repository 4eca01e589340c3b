//! Branch discovery through `git branch`.

use tracing::debug;

use crate::data::branch::{BranchSource, MergeState};
use crate::error::CleanError;
use crate::git::command::{GitArgs, GitRunner};

/// Branches that must never be listed.
#[derive(Debug, Clone)]
pub struct BranchFilter {
    /// Branch every listing is compared against.
    pub main_branch: String,
    /// Branches excluded regardless of merge state.
    pub protected: Vec<String>,
    /// Remote whose branches are listed for the remote source.
    pub remote_name: String,
}

/// Builds the listing invocation for a source and merge state.
pub fn list_args(source: BranchSource, merge_state: MergeState, main_branch: &str) -> GitArgs {
    GitArgs::new("branch")
        .arg("--no-color")
        .arg_if(source == BranchSource::Remote, "-r")
        .arg(merge_state.git_flag())
        .arg(main_branch)
}

/// Lists branch names for the given source and merge state.
///
/// The main branch and protected branches are removed. Local branches are
/// protected by exact name; remote branches by substring, which also drops
/// the `origin/HEAD -> origin/master` pointer when `HEAD` is protected.
/// Remote listings keep only branches of the configured remote.
pub async fn list_branches(
    git: &dyn GitRunner,
    source: BranchSource,
    merge_state: MergeState,
    filter: &BranchFilter,
) -> Result<Vec<String>, CleanError> {
    let args = list_args(source, merge_state, &filter.main_branch);
    let output = git
        .run(&args)
        .await
        .map_err(CleanError::SourceUnavailable)?;

    let branches = sanitize_branch_output(&output, &filter.main_branch);
    let listed = branches.len();
    let branches = exclude_protected(branches, &filter.protected, source);
    let branches = match source {
        BranchSource::Local => branches,
        BranchSource::Remote => only_remote(branches, &filter.remote_name),
    };

    debug!(
        %source,
        %merge_state,
        listed,
        kept = branches.len(),
        "Listed branches"
    );

    Ok(branches)
}

/// Cleans raw `git branch` output into branch names.
///
/// Strips the checkout markers (`*` for the current branch, `+` for a branch
/// checked out in another worktree), trims whitespace, drops blank lines,
/// drops every line mentioning the main branch and drops parenthesised
/// pseudo-entries such as `(HEAD detached at 1a2b3c4)`.
pub fn sanitize_branch_output(output: &str, main_branch: &str) -> Vec<String> {
    output
        .lines()
        .map(|line| {
            let line = line.trim_start();
            line.strip_prefix('*')
                .or_else(|| line.strip_prefix('+'))
                .unwrap_or(line)
                .trim()
        })
        .filter(|line| !line.is_empty() && !line.starts_with('('))
        .filter(|line| !line.contains(main_branch))
        .map(str::to_string)
        .collect()
}

/// Removes protected branches from a listing.
pub fn exclude_protected(
    branches: Vec<String>,
    protected: &[String],
    source: BranchSource,
) -> Vec<String> {
    branches
        .into_iter()
        .filter(|branch| match source {
            BranchSource::Local => !protected.iter().any(|p| p == branch),
            BranchSource::Remote => !protected.iter().any(|p| branch.contains(p.as_str())),
        })
        .collect()
}

/// Keeps branches listed under `<remote_name>/`.
pub fn only_remote(branches: Vec<String>, remote_name: &str) -> Vec<String> {
    let prefix = format!("{remote_name}/");
    branches
        .into_iter()
        .filter(|branch| branch.starts_with(&prefix))
        .collect()
}
