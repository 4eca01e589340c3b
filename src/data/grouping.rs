//! Grouping and filtering of enriched branches.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::data::branch::Branch;

/// Label used when branches are not grouped.
pub const UNGROUPED_LABEL: &str = "Branches";

/// How a branch list is arranged for display and follow-up actions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Grouping {
    /// One group holding every branch.
    None,
    /// One group per last committer.
    ByAuthor,
    /// One group per last committer whose name contains the given text
    /// (case-insensitive).
    AuthorFilter(String),
}

impl Grouping {
    /// Arranges branches, keeping their incoming order inside each group.
    pub fn apply(&self, branches: Vec<Branch>) -> BranchGroups {
        match self {
            Self::None => group_by_none(branches),
            Self::ByAuthor => group_by_author(branches),
            Self::AuthorFilter(needle) => branches_by_author(branches, needle),
        }
    }
}

/// Branches arranged under labels.
///
/// Labels iterate in sorted order. When [`BranchGroups::is_by_author`] is
/// true each label is a committer name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BranchGroups {
    #[serde(skip)]
    by_author: bool,
    #[serde(flatten)]
    groups: BTreeMap<String, Vec<Branch>>,
}

impl BranchGroups {
    /// Returns whether labels are committer names.
    pub fn is_by_author(&self) -> bool {
        self.by_author
    }

    /// Iterates over `(label, branches)` pairs in label order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Branch])> {
        self.groups.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// Iterates over every branch, group by group.
    pub fn branches(&self) -> impl Iterator<Item = &Branch> {
        self.groups.values().flatten()
    }

    /// Total number of branches across groups.
    pub fn len(&self) -> usize {
        self.groups.values().map(Vec::len).sum()
    }

    /// Returns whether no group holds any branch.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the branches of one group.
    pub fn get(&self, label: &str) -> Option<&[Branch]> {
        self.groups.get(label).map(Vec::as_slice)
    }

    /// Returns the same branches grouped by committer.
    ///
    /// Already author-grouped values are returned unchanged.
    pub fn regroup_by_author(self) -> Self {
        if self.by_author {
            return self;
        }
        group_by_author(self.groups.into_values().flatten().collect())
    }
}

/// Wraps every branch in a single group.
pub fn group_by_none(branches: Vec<Branch>) -> BranchGroups {
    let mut groups = BTreeMap::new();
    groups.insert(UNGROUPED_LABEL.to_string(), branches);
    BranchGroups {
        by_author: false,
        groups,
    }
}

/// Groups branches by their last committer.
pub fn group_by_author(branches: Vec<Branch>) -> BranchGroups {
    let mut groups: BTreeMap<String, Vec<Branch>> = BTreeMap::new();
    for branch in branches {
        groups.entry(branch.author.clone()).or_default().push(branch);
    }
    BranchGroups {
        by_author: true,
        groups,
    }
}

/// Groups the branches whose committer name contains `needle`, ignoring case.
pub fn branches_by_author(branches: Vec<Branch>, needle: &str) -> BranchGroups {
    let needle = needle.to_lowercase();
    group_by_author(
        branches
            .into_iter()
            .filter(|b| b.author.to_lowercase().contains(&needle))
            .collect(),
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::data::branch::sample_branch;

    fn fixture() -> Vec<Branch> {
        vec![
            sample_branch("origin/a", "Bob Jones", "2023-01-01T00:00:00+00:00"),
            sample_branch("origin/b", "Anna Smith", "2023-02-01T00:00:00+00:00"),
            sample_branch("origin/c", "Bob Jones", "2023-03-01T00:00:00+00:00"),
            sample_branch("origin/d", "Hannah Lee", "2023-04-01T00:00:00+00:00"),
        ]
    }

    fn names(branches: &[Branch]) -> Vec<&str> {
        branches.iter().map(|b| b.name.as_str()).collect()
    }

    #[test]
    fn no_grouping_wraps_everything() {
        let groups = Grouping::None.apply(fixture());
        assert!(!groups.is_by_author());
        assert_eq!(groups.iter().count(), 1);
        assert_eq!(
            names(groups.get(UNGROUPED_LABEL).unwrap()),
            ["origin/a", "origin/b", "origin/c", "origin/d"]
        );
    }

    #[test]
    fn by_author_preserves_order_within_group() {
        let groups = Grouping::ByAuthor.apply(fixture());
        assert!(groups.is_by_author());
        assert_eq!(names(groups.get("Bob Jones").unwrap()), ["origin/a", "origin/c"]);
        let labels: Vec<_> = groups.iter().map(|(label, _)| label).collect();
        assert_eq!(labels, ["Anna Smith", "Bob Jones", "Hannah Lee"]);
    }

    #[test]
    fn author_filter_is_case_insensitive() {
        let groups = Grouping::AuthorFilter("ANN".to_string()).apply(fixture());
        let labels: Vec<_> = groups.iter().map(|(label, _)| label).collect();
        assert_eq!(labels, ["Anna Smith", "Hannah Lee"]);

        let groups = branches_by_author(fixture(), "ann");
        assert!(groups.get("Anna Smith").is_some());
    }

    #[test]
    fn author_filter_without_match_is_empty() {
        let groups = branches_by_author(fixture(), "zed");
        assert!(groups.is_empty());
        assert_eq!(groups.iter().count(), 0);
    }

    #[test]
    fn regroup_turns_flat_view_into_author_view() {
        let groups = group_by_none(fixture()).regroup_by_author();
        assert!(groups.is_by_author());
        assert_eq!(groups.len(), 4);
        assert_eq!(names(groups.get("Bob Jones").unwrap()), ["origin/a", "origin/c"]);
    }

    mod prop {
        use super::*;
        use proptest::prelude::*;
        use proptest::prelude::prop;

        const AUTHORS: [&str; 4] = ["Anna Smith", "Bob Jones", "anna smith", "Zoë"];

        proptest! {
            #[test]
            fn grouping_keeps_every_branch_exactly_once(
                picks in prop::collection::vec(0_usize..AUTHORS.len(), 0..50)
            ) {
                let input: Vec<Branch> = picks
                    .iter()
                    .enumerate()
                    .map(|(i, a)| sample_branch(&format!("b{i}"), AUTHORS[*a], "2024-01-01T00:00:00+00:00"))
                    .collect();

                let groups = group_by_author(input.clone());

                let mut seen: Vec<&str> = groups.branches().map(|b| b.name.as_str()).collect();
                seen.sort_unstable();
                let mut expected: Vec<&str> = input.iter().map(|b| b.name.as_str()).collect();
                expected.sort_unstable();
                prop_assert_eq!(seen, expected);

                for (author, members) in groups.iter() {
                    prop_assert!(members.iter().all(|b| b.author == author));
                }
            }
        }
    }
}
