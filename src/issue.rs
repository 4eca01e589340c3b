//! Issue tracker links derived from branch names.

use anyhow::{Context, Result};
use regex::Regex;

/// Turns issue keys found in branch names into browse URLs.
///
/// A key is `<PROJECT>-<digits>` for any configured project, matched
/// case-insensitively. The first key in the name wins.
#[derive(Debug, Clone)]
pub struct IssueLinker {
    pattern: Option<Regex>,
    base_url: String,
}

impl IssueLinker {
    /// Builds a linker for the given project keys and tracker base URL.
    ///
    /// With no projects or no base URL every lookup yields an empty string.
    pub fn new(projects: &[String], base_url: Option<&str>) -> Result<Self> {
        let projects: Vec<String> = projects
            .iter()
            .map(|p| p.trim())
            .filter(|p| !p.is_empty())
            .map(regex::escape)
            .collect();

        let pattern = match (projects.is_empty(), base_url) {
            (false, Some(_)) => {
                let source = format!(r"(?i)(?:{})-\d+", projects.join("|"));
                Some(
                    Regex::new(&source)
                        .with_context(|| format!("Invalid issue key pattern: {source}"))?,
                )
            }
            _ => None,
        };

        Ok(Self {
            pattern,
            base_url: base_url.unwrap_or_default().to_string(),
        })
    }

    /// A linker that never produces links.
    pub fn disabled() -> Self {
        Self {
            pattern: None,
            base_url: String::new(),
        }
    }

    /// Returns the first issue key in `branch_name`, as written there.
    pub fn issue_key<'a>(&self, branch_name: &'a str) -> Option<&'a str> {
        self.pattern
            .as_ref()
            .and_then(|p| p.find(branch_name))
            .map(|m| m.as_str())
    }

    /// Returns the browse URL for `branch_name`, or an empty string.
    pub fn resolve(&self, branch_name: &str) -> String {
        match self.issue_key(branch_name) {
            Some(key) => join_url(&self.base_url, &["browse", key]),
            None => String::new(),
        }
    }
}

/// Joins URL segments with exactly one slash between them.
fn join_url(base: &str, segments: &[&str]) -> String {
    let mut url = base.trim_end_matches('/').to_string();
    for segment in segments {
        url.push('/');
        url.push_str(segment.trim_matches('/'));
    }
    url
}

/// Returns the last path segment of an issue URL (the issue key).
pub fn issue_label(url: &str) -> &str {
    url.rsplit('/').next().unwrap_or(url)
}
