//! Branch data and its serialized views.

use anyhow::{Context, Result};
use serde::Serialize;

pub mod branch;
pub mod grouping;

pub use branch::{sort_by_date, Branch, BranchSource, MergeState};
pub use grouping::{BranchGroups, Grouping};

/// Non-interactive listing output.
#[derive(Debug, Clone, Serialize)]
pub struct BranchListing {
    /// Version information for the git-clean tool.
    pub versions: VersionInfo,
    /// Where the branches were listed from.
    pub source: BranchSource,
    /// Merge state the listing was filtered by.
    pub merge_state: MergeState,
    /// Branch the merge state is relative to.
    pub main_branch: String,
    /// Number of branches across all groups.
    pub total: usize,
    /// Branches under their group labels.
    pub groups: BranchGroups,
}

/// Version information.
#[derive(Debug, Clone, Serialize)]
pub struct VersionInfo {
    /// Version of the git-clean tool.
    pub git_clean: String,
}

impl Default for VersionInfo {
    fn default() -> Self {
        Self {
            git_clean: crate::VERSION.to_string(),
        }
    }
}

/// Serializes a value to YAML.
pub fn to_yaml<T: Serialize>(data: &T) -> Result<String> {
    serde_yaml::to_string(data).context("Failed to serialize to YAML")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::data::branch::sample_branch;

    #[test]
    fn listing_yaml_groups_branches_by_label() {
        let groups = Grouping::ByAuthor.apply(vec![
            sample_branch("origin/a", "Anna Smith", "2024-01-01T00:00:00+00:00"),
            sample_branch("origin/b", "Bob Jones", "2024-02-01T00:00:00+00:00"),
        ]);
        let listing = BranchListing {
            versions: VersionInfo::default(),
            source: BranchSource::Remote,
            merge_state: MergeState::Unmerged,
            main_branch: "main".to_string(),
            total: groups.len(),
            groups,
        };

        let yaml = to_yaml(&listing).unwrap();
        let value: serde_yaml::Value = serde_yaml::from_str(&yaml).unwrap();

        assert_eq!(value["source"].as_str(), Some("remote"));
        assert_eq!(value["merge_state"].as_str(), Some("unmerged"));
        assert_eq!(value["total"].as_u64(), Some(2));
        assert_eq!(
            value["groups"]["Anna Smith"][0]["pretty_name"].as_str(),
            Some("a")
        );
        assert_eq!(
            value["groups"]["Bob Jones"][0]["email"].as_str(),
            Some("bob.jones@example.com")
        );
    }
}
