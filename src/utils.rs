//! Utility functions and helpers.

pub mod preflight;

pub use preflight::{
    check_branch_command_prerequisites, check_git_installed, check_git_repository,
    check_git_repository_at,
};
