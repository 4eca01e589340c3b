//! Last-commit metadata for listed branches.

use std::sync::Arc;

use chrono::{DateTime, FixedOffset};
use tracing::debug;

use crate::data::branch::{sort_by_date, Branch, BranchSource};
use crate::error::CleanError;
use crate::git::command::{GitArgs, GitRunner};
use crate::issue::IssueLinker;

/// Default number of `git log` processes run at once.
pub const DEFAULT_CONCURRENCY: usize = 8;

/// `%cn` committer name, `%cr` relative date, `%cI` strict ISO 8601 date,
/// `%ce` committer email.
const COMMIT_FORMAT: &str = "--format=%cn | %cr | %cI | %ce";

/// What enrichment needs besides the branch name.
#[derive(Debug, Clone)]
pub struct EnrichContext {
    /// Where the branch names came from.
    pub source: BranchSource,
    /// Remote whose prefix is stripped from remote branch names.
    pub remote_name: String,
    /// Issue link resolver.
    pub linker: IssueLinker,
}

/// Parsed `git log` line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitMeta {
    /// Committer name.
    pub author: String,
    /// Relative date as rendered by git.
    pub relative_date: String,
    /// Commit date.
    pub date: DateTime<FixedOffset>,
    /// Committer email.
    pub email: String,
}

/// Builds the metadata invocation for one branch.
pub fn log_args(branch: &str) -> GitArgs {
    GitArgs::new("log")
        .args(["-n", "1", COMMIT_FORMAT])
        .arg(branch)
        .arg("--")
}

/// Parses one `name | relative | iso | email` line.
///
/// Only the last three separators are significant, so a committer name
/// containing `|` survives intact.
pub fn parse_commit_line(line: &str) -> Result<CommitMeta, String> {
    let line = line.trim();
    let mut fields = line.rsplitn(4, '|').map(str::trim);

    let (Some(email), Some(iso), Some(relative), Some(author)) = (
        fields.next(),
        fields.next(),
        fields.next(),
        fields.next(),
    ) else {
        return Err(format!("unexpected commit line '{line}'"));
    };

    let date = DateTime::parse_from_rfc3339(iso)
        .map_err(|e| format!("invalid commit date '{iso}': {e}"))?;

    Ok(CommitMeta {
        author: author.to_string(),
        relative_date: relative.to_string(),
        date,
        email: email.to_string(),
    })
}

/// Strips the `<remote>/` prefix from remote branch names.
pub fn pretty_name(name: &str, source: BranchSource, remote_name: &str) -> String {
    match source {
        BranchSource::Local => name.to_string(),
        BranchSource::Remote => name
            .strip_prefix(remote_name)
            .and_then(|rest| rest.strip_prefix('/'))
            .unwrap_or(name)
            .to_string(),
    }
}

/// Fetches the last commit of one branch and builds its record.
pub async fn fetch_branch(
    git: &dyn GitRunner,
    name: &str,
    ctx: &EnrichContext,
) -> Result<Branch, CleanError> {
    let args = log_args(name);
    let output = git
        .run(&args)
        .await
        .map_err(|e| CleanError::EnrichmentFailure {
            branch: name.to_string(),
            reason: e.to_string(),
        })?;

    let meta = parse_commit_line(&output).map_err(|reason| CleanError::EnrichmentFailure {
        branch: name.to_string(),
        reason,
    })?;

    let pretty_name = pretty_name(name, ctx.source, &ctx.remote_name);
    let issue_url = ctx.linker.resolve(&pretty_name);

    Ok(Branch {
        name: name.to_string(),
        pretty_name,
        author: meta.author,
        email: meta.email,
        date: meta.date,
        pretty_date: meta.relative_date,
        issue_url,
    })
}

/// Enriches every branch and returns them oldest first.
///
/// At most `concurrency` metadata lookups run at once. All lookups are
/// joined before returning; the first failure (in listing order) fails the
/// whole batch.
pub async fn enrich_branches(
    git: &dyn GitRunner,
    names: &[String],
    ctx: &EnrichContext,
    concurrency: usize,
) -> Result<Vec<Branch>, CleanError> {
    let semaphore = Arc::new(tokio::sync::Semaphore::new(concurrency.max(1)));

    debug!(
        branches = names.len(),
        concurrency, "Fetching branch metadata"
    );

    let futs: Vec<_> = names
        .iter()
        .map(|name| {
            let sem = semaphore.clone();
            async move {
                let _permit = sem
                    .acquire()
                    .await
                    .map_err(|e| CleanError::EnrichmentFailure {
                        branch: name.clone(),
                        reason: format!("semaphore closed: {e}"),
                    })?;
                fetch_branch(git, name, ctx).await
            }
        })
        .collect();

    let results = futures::future::join_all(futs).await;
    let mut branches = results.into_iter().collect::<Result<Vec<_>, _>>()?;

    sort_by_date(&mut branches);
    Ok(branches)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::git::test_utils::RecordingGit;

    const FORMAT: &str = "--format=%cn | %cr | %cI | %ce";

    fn ctx(source: BranchSource) -> EnrichContext {
        EnrichContext {
            source,
            remote_name: "origin".to_string(),
            linker: IssueLinker::new(&["JIRA".to_string()], Some("https://x/y")).unwrap(),
        }
    }

    #[test]
    fn parses_commit_line() {
        let meta =
            parse_commit_line("Anna Smith | 3 weeks ago | 2024-05-02T10:11:12+02:00 | anna@example.com\n")
                .unwrap();
        assert_eq!(meta.author, "Anna Smith");
        assert_eq!(meta.relative_date, "3 weeks ago");
        assert_eq!(meta.email, "anna@example.com");
        assert_eq!(meta.date.to_rfc3339(), "2024-05-02T10:11:12+02:00");
    }

    #[test]
    fn pipe_in_committer_name_is_kept() {
        let meta =
            parse_commit_line("Build | Bot | 2 days ago | 2024-05-02T10:11:12Z | ci@example.com").unwrap();
        assert_eq!(meta.author, "Build | Bot");
        assert_eq!(meta.email, "ci@example.com");
    }

    #[test]
    fn rejects_truncated_and_undated_lines() {
        assert!(parse_commit_line("").is_err());
        assert!(parse_commit_line("Anna | yesterday | anna@example.com").is_err());
        assert!(parse_commit_line("Anna | yesterday | not-a-date | anna@example.com").is_err());
    }

    #[test]
    fn remote_prefix_is_stripped() {
        assert_eq!(
            pretty_name("origin/feature/foo", BranchSource::Remote, "origin"),
            "feature/foo"
        );
        assert_eq!(
            pretty_name("upstream/feature", BranchSource::Remote, "origin"),
            "upstream/feature"
        );
        assert_eq!(
            pretty_name("originals/x", BranchSource::Remote, "origin"),
            "originals/x"
        );
        assert_eq!(
            pretty_name("origin/foo", BranchSource::Local, "origin"),
            "origin/foo"
        );
    }

    #[test]
    fn log_args_end_revision_list() {
        assert_eq!(
            log_args("origin/x").as_slice(),
            ["log", "-n", "1", FORMAT, "origin/x", "--"]
        );
    }

    #[tokio::test]
    async fn enriches_and_sorts_oldest_first() {
        let git = RecordingGit::new()
            .respond(
                &["log", "-n", "1", FORMAT, "origin/JIRA-7-login", "--"],
                "Anna Smith | 2 days ago | 2024-06-10T09:00:00+00:00 | anna@example.com",
            )
            .respond(
                &["log", "-n", "1", FORMAT, "origin/cleanup", "--"],
                "Bob Jones | 1 year ago | 2023-06-10T09:00:00+00:00 | bob@example.com",
            );
        let names = vec!["origin/JIRA-7-login".to_string(), "origin/cleanup".to_string()];

        let branches = enrich_branches(&git, &names, &ctx(BranchSource::Remote), 2)
            .await
            .unwrap();

        assert_eq!(branches.len(), 2);
        assert_eq!(branches[0].pretty_name, "cleanup");
        assert_eq!(branches[0].issue_url, "");
        assert_eq!(branches[1].pretty_name, "JIRA-7-login");
        assert_eq!(branches[1].issue_url, "https://x/y/browse/JIRA-7");
        assert_eq!(branches[1].pretty_date, "2 days ago");
    }

    #[tokio::test]
    async fn one_failed_lookup_fails_the_batch() {
        let git = RecordingGit::new()
            .respond(
                &["log", "-n", "1", FORMAT, "good", "--"],
                "Anna | now | 2024-06-10T09:00:00+00:00 | a@example.com",
            )
            .fail(
                &["log", "-n", "1", FORMAT, "gone", "--"],
                128,
                "fatal: bad revision 'gone'",
            );
        let names = vec!["good".to_string(), "gone".to_string()];

        let err = enrich_branches(&git, &names, &ctx(BranchSource::Local), 4)
            .await
            .unwrap_err();

        match err {
            CleanError::EnrichmentFailure { branch, reason } => {
                assert_eq!(branch, "gone");
                assert!(reason.contains("bad revision"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn zero_concurrency_still_makes_progress() {
        let git = RecordingGit::new().respond(
            &["log", "-n", "1", FORMAT, "a", "--"],
            "Anna | now | 2024-06-10T09:00:00+00:00 | a@example.com",
        );
        let names = vec!["a".to_string()];

        let branches = enrich_branches(&git, &names, &ctx(BranchSource::Local), 0)
            .await
            .unwrap();
        assert_eq!(branches.len(), 1);
        assert_eq!(git.calls().len(), 1);
    }
}
