//! Error taxonomy for branch listing, actions and notifications.

use thiserror::Error;

use crate::git::command::GitCommandError;

/// Errors that end a git-clean run.
///
/// Every variant is fatal: the CLI prints it together with its cause chain
/// and exits with a non-zero status. Nothing is retried.
#[derive(Error, Debug)]
pub enum CleanError {
    /// The branch listing command failed.
    #[error("Unable to list branches")]
    SourceUnavailable(#[source] GitCommandError),

    /// Last-commit metadata could not be fetched or parsed for a branch.
    #[error("Failed to read last commit of branch '{branch}': {reason}")]
    EnrichmentFailure {
        /// Raw branch name as listed by git.
        branch: String,
        /// What went wrong.
        reason: String,
    },

    /// A prune or delete command failed.
    #[error("Branch cleanup failed")]
    ActionFailure(#[source] GitCommandError),

    /// A notification could not be delivered.
    #[error("Failed to send {channel} notification to {recipient}: {reason}")]
    DeliveryFailure {
        /// Delivery channel ("email" or "webhook").
        channel: &'static str,
        /// Who the notification was for.
        recipient: String,
        /// What went wrong.
        reason: String,
    },

    /// Configuration could not be resolved.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}
