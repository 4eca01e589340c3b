//! Interactive cleanup command.

use std::io::{self, BufRead, Write};

use anyhow::Result;
use clap::Parser;
use termcolor::{ColorChoice, StandardStream, WriteColor};
use tracing::{info, warn};

use super::formatting::print_groups;
use super::{branch_filter, enrich_context, resolve_concurrency};
use crate::config::Config;
use crate::data::{Branch, BranchGroups, BranchSource, MergeState};
use crate::git::{delete_branches, enrich_branches, list_branches, GitRunner, SystemGit};
use crate::notify::{notify_authors, EmailAliases, EmailNotifier, Notifier, WebhookNotifier};
use crate::prompt::{Entry, Prompter};
use crate::utils::check_branch_command_prerequisites;
use crate::wizard::{run_wizard, Answers, ListAction, Outcome, Plan};

/// Wizard options; each one answers the matching question up front.
#[derive(Parser, Debug, Default)]
pub struct RunCommand {
    /// List local or remote branches.
    #[arg(long, value_enum)]
    pub source: Option<BranchSource>,

    /// List merged or unmerged branches.
    #[arg(long, value_enum)]
    pub merge_state: Option<MergeState>,

    /// How remote branches are listed.
    #[arg(long, value_enum)]
    pub action: Option<ListAction>,

    /// Author name to search for (implies --action find-by-author).
    #[arg(long, value_parser = crate::cli::parse_author)]
    pub author: Option<String>,

    /// What to do with the listed branches.
    #[arg(long, value_enum)]
    pub outcome: Option<Outcome>,

    /// Maximum concurrent metadata lookups.
    #[arg(long)]
    pub concurrency: Option<usize>,
}

impl RunCommand {
    /// Executes the wizard against the repository in the working directory.
    pub async fn execute(self) -> Result<()> {
        check_branch_command_prerequisites()?;
        let config = Config::load()?;
        let concurrency = resolve_concurrency(self.concurrency, &config)?;
        let git = SystemGit::new();

        let stdin = io::stdin();
        let mut input = stdin.lock();
        let mut out = StandardStream::stdout(ColorChoice::Auto);

        run_session(
            &git,
            &config,
            self.answers(),
            concurrency,
            &mut input,
            &mut out,
        )
        .await
    }

    /// Converts the flags into pre-filled wizard answers.
    pub fn answers(&self) -> Answers {
        let author = self.author.clone().filter(|a| !a.trim().is_empty());
        let action = match (self.action, &author) {
            (None, Some(_)) => Some(ListAction::FindByAuthor),
            (action, _) => action,
        };
        Answers {
            source: self.source,
            merge_state: self.merge_state,
            action,
            author,
            outcome: self.outcome,
        }
    }
}

/// Runs one wizard session: ask, list, show, then act.
pub(crate) async fn run_session<W: WriteColor>(
    git: &dyn GitRunner,
    config: &Config,
    answers: Answers,
    concurrency: usize,
    input: &mut dyn BufRead,
    out: &mut W,
) -> Result<()> {
    let plan = {
        let mut prompter = Prompter::new(&mut *input, &mut *out);
        run_wizard(&mut prompter, answers)?
    };
    info!(?plan, "Wizard finished");

    let names = list_branches(git, plan.source, plan.merge_state, &branch_filter(config)).await?;
    writeln!(out, "🔍 Found {} branches", names.len())?;
    if names.is_empty() {
        return Ok(());
    }

    let ctx = enrich_context(config, plan.source)?;
    let branches = enrich_branches(git, &names, &ctx, concurrency).await?;
    let groups = plan.grouping.apply(branches);

    writeln!(out)?;
    print_groups(out, &groups)?;
    if groups.is_empty() {
        writeln!(out, "No branches match the author filter.")?;
        return Ok(());
    }

    match plan.outcome {
        Outcome::View => Ok(()),
        Outcome::Delete => delete_interactively(git, config, &plan, groups, input, out).await,
        Outcome::Email | Outcome::Webhook => {
            let Some(notifier) = build_notifier(plan.outcome, config, out).await? else {
                return Ok(());
            };
            let aliases = EmailAliases::new(config.email_aliases.clone());
            let mut prompter = Prompter::new(&mut *input, &mut *out);
            let sent = notify_authors(
                notifier.as_ref(),
                groups,
                plan.merge_state,
                &config.main_branch,
                &aliases,
                &mut prompter,
            )
            .await?;
            writeln!(out, "📨 Sent {sent} reminder(s)")?;
            Ok(())
        }
    }
}

async fn delete_interactively<W: WriteColor>(
    git: &dyn GitRunner,
    config: &Config,
    plan: &Plan,
    groups: BranchGroups,
    input: &mut dyn BufRead,
    out: &mut W,
) -> Result<()> {
    let groups = groups.regroup_by_author();

    let mut entries = Vec::new();
    let mut candidates: Vec<&Branch> = Vec::new();
    for (author, branches) in groups.iter() {
        entries.push(Entry::Separator(author));
        for branch in branches {
            entries.push(Entry::Item(&branch.pretty_name));
            candidates.push(branch);
        }
    }

    let (picked, confirmed) = {
        let mut prompter = Prompter::new(&mut *input, &mut *out);
        let picked = prompter.multi_select("Select branches to delete", &entries)?;
        let confirmed =
            prompter.confirm("Are you sure you want to delete these branches?", false)?;
        (picked, confirmed)
    };

    if !confirmed {
        writeln!(out, "Exiting without deleting any branches.")?;
        return Ok(());
    }

    let selected: Vec<Branch> = picked
        .iter()
        .filter_map(|&i| candidates.get(i).map(|b| (*b).clone()))
        .collect();

    writeln!(out, "🗑️  Deleting {} branches...", selected.len())?;
    delete_branches(git, &selected, plan.source, &config.remote_name).await?;
    writeln!(out, "✅ Done.")?;
    Ok(())
}

/// Builds the notifier for `outcome`, or warns and returns `None` when the
/// channel is not configured.
async fn build_notifier(
    outcome: Outcome,
    config: &Config,
    out: &mut dyn Write,
) -> Result<Option<Box<dyn Notifier>>> {
    match outcome {
        Outcome::Email => {
            let Some(smtp) = &config.smtp else {
                warn!("SMTP is not configured");
                writeln!(out, "⚠️  SMTP_SERVER is not configured; skipping email reminders.")?;
                return Ok(None);
            };
            let notifier = EmailNotifier::connect(smtp)?;
            notifier.verify().await?;
            writeln!(out, "✅ SMTP server is ready to take messages")?;
            Ok(Some(Box::new(notifier)))
        }
        Outcome::Webhook => {
            let Some(url) = &config.webhook_url else {
                warn!("Webhook is not configured");
                writeln!(
                    out,
                    "⚠️  TEAMS_WEBHOOK_URL is not configured; skipping webhook reminders."
                )?;
                return Ok(None);
            };
            Ok(Some(Box::new(WebhookNotifier::new(url.clone()))))
        }
        Outcome::View | Outcome::Delete => Ok(None),
    }
}
