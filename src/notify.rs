//! Reminders sent to the last committers of branches.

use std::future::Future;
use std::io::Write as _;
use std::pin::Pin;

use anyhow::Result;
use tracing::{info, warn};

use crate::data::{Branch, BranchGroups, MergeState};
use crate::error::CleanError;
use crate::prompt::Prompter;

pub mod alias;
pub mod email;
pub mod webhook;

pub use alias::EmailAliases;
pub use email::EmailNotifier;
pub use webhook::WebhookNotifier;

/// One reminder: an author and the branches they last committed to.
#[derive(Debug, Clone)]
pub struct Notification<'a> {
    /// Committer name.
    pub author: &'a str,
    /// Address the reminder goes to, after alias rewriting.
    pub email: &'a str,
    /// Merge state the branches were listed with.
    pub merge_state: MergeState,
    /// Branches in display order.
    pub branches: &'a [Branch],
    /// Branch the merge state is relative to.
    pub main_branch: &'a str,
}

/// Future returned by [`Notifier::deliver`].
pub type NotifyFuture<'a> = Pin<Box<dyn Future<Output = Result<(), CleanError>> + Send + 'a>>;

/// A delivery channel for reminders.
pub trait Notifier: Send + Sync {
    /// Short channel name used in prompts and errors.
    fn channel(&self) -> &'static str;

    /// Delivers one reminder.
    fn deliver<'a>(&'a self, notification: &'a Notification<'a>) -> NotifyFuture<'a>;
}

/// Offers a reminder to every author in `groups` and sends the accepted ones.
///
/// Branches are regrouped by author first. Each author's address is taken
/// from their first branch and passed through `aliases`. Returns how many
/// reminders were delivered; the first delivery failure aborts the loop.
pub async fn notify_authors(
    notifier: &dyn Notifier,
    groups: BranchGroups,
    merge_state: MergeState,
    main_branch: &str,
    aliases: &EmailAliases,
    prompter: &mut Prompter<'_>,
) -> Result<usize> {
    let groups = groups.regroup_by_author();
    let mut sent = 0;

    for (author, branches) in groups.iter() {
        let Some(first) = branches.first() else {
            continue;
        };
        let email = aliases.rewrite(&first.email);

        let question = format!(
            "Send {} to {author} <{email}> about {} branch(es)?",
            notifier.channel(),
            branches.len()
        );
        if !prompter.confirm(&question, false)? {
            info!(author, "Skipped reminder");
            continue;
        }

        let notification = Notification {
            author,
            email: &email,
            merge_state,
            branches,
            main_branch,
        };
        if let Err(e) = notifier.deliver(&notification).await {
            warn!(author, error = %e, "Reminder delivery failed");
            return Err(e.into());
        }
        writeln!(prompter.writer(), "✅ Sent {} to {author}", notifier.channel())?;
        sent += 1;
    }

    Ok(sent)
}
