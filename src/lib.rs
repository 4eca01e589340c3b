//! # git-clean
//!
//! Finds stale git branches and helps clean them up.
//!
//! Branches are listed with `git branch --merged`/`--no-merged`, enriched with
//! their last commit and an optional issue tracker link, then shown grouped
//! by committer. From there they can be deleted, or their last committers can
//! be reminded by email or chat webhook.
//!
//! ## Quick Start
//!
//! ```rust
//! use git_clean::data::Grouping;
//!
//! let groups = Grouping::ByAuthor.apply(Vec::new());
//! assert!(groups.is_empty());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod cli;
pub mod config;
pub mod data;
pub mod error;
pub mod git;
pub mod issue;
pub mod notify;
pub mod prompt;
pub mod utils;
pub mod wizard;

pub use crate::cli::Cli;

/// The current version of git-clean.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
