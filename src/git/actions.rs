//! Branch deletion.

use tracing::info;

use crate::data::branch::{Branch, BranchSource};
use crate::error::CleanError;
use crate::git::command::{GitArgs, GitRunner};

/// Builds the prune invocation for a remote.
pub fn prune_args(remote_name: &str) -> GitArgs {
    GitArgs::new("remote").arg("prune").arg(remote_name)
}

/// Builds the batched delete invocation, or `None` when nothing is selected.
pub fn delete_args(
    selected: &[Branch],
    source: BranchSource,
    remote_name: &str,
) -> Option<GitArgs> {
    if selected.is_empty() {
        return None;
    }

    let names = selected.iter().map(|b| b.pretty_name.clone());
    let args = match source {
        BranchSource::Local => GitArgs::new("branch").arg("-D").args(names),
        BranchSource::Remote => GitArgs::new("push")
            .arg(remote_name)
            .arg("--delete")
            .args(names),
    };
    Some(args)
}

/// Prunes stale remote-tracking refs, then deletes the selected branches.
///
/// The prune always runs, even with an empty selection. Deletion is one git
/// call for the whole selection: `branch -D` for local branches, `push
/// --delete` for remote ones.
pub async fn delete_branches(
    git: &dyn GitRunner,
    selected: &[Branch],
    source: BranchSource,
    remote_name: &str,
) -> Result<(), CleanError> {
    git.run(&prune_args(remote_name))
        .await
        .map_err(CleanError::ActionFailure)?;

    if let Some(args) = delete_args(selected, source, remote_name) {
        git.run(&args).await.map_err(CleanError::ActionFailure)?;
        info!(count = selected.len(), %source, "Deleted branches");
    }

    Ok(())
}
