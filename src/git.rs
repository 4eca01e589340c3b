//! Git subprocess operations: listing, enrichment and deletion of branches.

pub mod actions;
pub mod command;
pub mod enrich;
pub mod enumerate;

#[cfg(test)]
pub(crate) mod test_utils;

pub use actions::delete_branches;
pub use command::{GitArgs, GitCommandError, GitRunner, SystemGit};
pub use enrich::{enrich_branches, EnrichContext, DEFAULT_CONCURRENCY};
pub use enumerate::{list_branches, BranchFilter};
