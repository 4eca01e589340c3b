//! Preflight validation checks for early failure detection
//!
//! Commands call these before listing anything so a missing git binary or a
//! wrong working directory fails fast with a clear message instead of a
//! confusing subprocess error.

use std::path::Path;

use anyhow::{bail, Context, Result};
use git2::Repository;

/// Validate the `git` binary is installed and runnable
pub fn check_git_installed() -> Result<()> {
    match std::process::Command::new("git").arg("--version").output() {
        Ok(output) if output.status.success() => Ok(()),
        Ok(output) => bail!(
            "git is installed but `git --version` failed: {}",
            String::from_utf8_lossy(&output.stderr).trim()
        ),
        Err(_) => bail!(
            "git is not installed or not in PATH.\n\
             Please install it from https://git-scm.com/"
        ),
    }
}

/// Validate we're in a valid git repository
pub fn check_git_repository() -> Result<()> {
    let cwd = std::env::current_dir().context("Failed to read the working directory")?;
    check_git_repository_at(&cwd)
}

/// Validate `path` is inside a git repository
pub fn check_git_repository_at(path: &Path) -> Result<()> {
    Repository::discover(path).with_context(|| {
        format!(
            "Not in a git repository ({}). Please run this command from within a git repository.",
            path.display()
        )
    })?;
    Ok(())
}

/// Combined preflight check for commands that read branches
pub fn check_branch_command_prerequisites() -> Result<()> {
    check_git_installed()?;
    check_git_repository()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn repository_is_found_from_subdirectory() {
        let dir = tempfile::tempdir().unwrap();
        Repository::init(dir.path()).unwrap();
        let nested = dir.path().join("a/b");
        std::fs::create_dir_all(&nested).unwrap();

        assert!(check_git_repository_at(&nested).is_ok());
    }

    #[test]
    fn plain_directory_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let err = check_git_repository_at(dir.path()).unwrap_err();
        assert!(err.to_string().contains("Not in a git repository"));
    }
}
