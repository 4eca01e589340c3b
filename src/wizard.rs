//! The interactive question sequence that decides what to list and what to do.
//!
//! The sequence is a fixed list of [`Step`]s. Each step has a `when`
//! predicate over the answers gathered so far and is skipped when the
//! predicate is false or the answer was already supplied on the command line.

use anyhow::{Context, Result};
use clap::ValueEnum;
use tracing::debug;

use crate::data::{BranchSource, Grouping, MergeState};
use crate::prompt::{Choice, Prompter};

/// How remote branches are listed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ListAction {
    /// Every branch, oldest first.
    ListAll,
    /// Every branch, grouped by last committer.
    ListByAuthor,
    /// Branches of committers matching a name.
    FindByAuthor,
}

/// What happens after the branches are shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Outcome {
    /// Show the branches and exit.
    View,
    /// Show the branches, then pick some to delete.
    Delete,
    /// Show the branches, then email their last committers.
    Email,
    /// Show the branches, then post a reminder per committer to the webhook.
    Webhook,
}

/// Answers gathered so far; `None` means not yet answered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Answers {
    /// Branch source.
    pub source: Option<BranchSource>,
    /// Merge state filter.
    pub merge_state: Option<MergeState>,
    /// Remote listing action.
    pub action: Option<ListAction>,
    /// Author filter text.
    pub author: Option<String>,
    /// Follow-up action.
    pub outcome: Option<Outcome>,
}

/// The fully answered questionnaire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plan {
    /// Where branches are listed from.
    pub source: BranchSource,
    /// Merge state filter.
    pub merge_state: MergeState,
    /// How the listing is arranged.
    pub grouping: Grouping,
    /// What happens after the listing.
    pub outcome: Outcome,
}

/// One question of the sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Local or remote.
    ChooseSource,
    /// Merged or unmerged.
    ChooseMergeState,
    /// How to list remote branches; remote source only.
    ChooseRemoteAction,
    /// Author name; "find by author" only.
    EnterAuthorFilter,
    /// View, delete or notify.
    ChooseOutcome,
}

/// Steps in the order they are asked.
pub const STEPS: [Step; 5] = [
    Step::ChooseSource,
    Step::ChooseMergeState,
    Step::ChooseRemoteAction,
    Step::EnterAuthorFilter,
    Step::ChooseOutcome,
];

impl Step {
    /// Returns whether the step applies given earlier answers.
    pub fn when(self, answers: &Answers) -> bool {
        match self {
            Self::ChooseSource | Self::ChooseMergeState | Self::ChooseOutcome => true,
            Self::ChooseRemoteAction => answers.source == Some(BranchSource::Remote),
            Self::EnterAuthorFilter => answers.action == Some(ListAction::FindByAuthor),
        }
    }

    fn is_answered(self, answers: &Answers) -> bool {
        match self {
            Self::ChooseSource => answers.source.is_some(),
            Self::ChooseMergeState => answers.merge_state.is_some(),
            Self::ChooseRemoteAction => answers.action.is_some(),
            Self::EnterAuthorFilter => answers.author.is_some(),
            Self::ChooseOutcome => answers.outcome.is_some(),
        }
    }

    fn ask(self, prompter: &mut Prompter<'_>, answers: &mut Answers) -> Result<()> {
        match self {
            Self::ChooseSource => {
                answers.source = Some(prompter.select(
                    "Do you want to view local or remote branches?",
                    &[
                        Choice::new("local", BranchSource::Local),
                        Choice::new("remote", BranchSource::Remote),
                    ],
                    0,
                )?);
            }
            Self::ChooseMergeState => {
                answers.merge_state = Some(prompter.select(
                    "Do you want to view merged or unmerged branches?",
                    &[
                        Choice::new("merged", MergeState::Merged),
                        Choice::new("unmerged", MergeState::Unmerged),
                    ],
                    0,
                )?);
            }
            Self::ChooseRemoteAction => {
                answers.action = Some(prompter.select(
                    "What do you want to do?",
                    &[
                        Choice::new("List all (oldest to newest)", ListAction::ListAll),
                        Choice::new("List all (grouped by author)", ListAction::ListByAuthor),
                        Choice::new("Find by author", ListAction::FindByAuthor),
                    ],
                    0,
                )?);
            }
            Self::EnterAuthorFilter => {
                answers.author = Some(prompter.input("Enter author name (case-insensitive)")?);
            }
            Self::ChooseOutcome => {
                answers.outcome = Some(prompter.select(
                    "What do you want to do with these branches?",
                    &[
                        Choice::new("View only", Outcome::View),
                        Choice::new("View and delete", Outcome::Delete),
                        Choice::new("Email the last committers", Outcome::Email),
                        Choice::new("Notify the last committers via webhook", Outcome::Webhook),
                    ],
                    0,
                )?);
            }
        }
        Ok(())
    }
}

/// Asks every applicable, unanswered step and returns the resulting plan.
pub fn run_wizard(prompter: &mut Prompter<'_>, mut answers: Answers) -> Result<Plan> {
    for step in STEPS {
        if !step.when(&answers) {
            debug!(?step, "Skipping step");
            continue;
        }
        if step.is_answered(&answers) {
            debug!(?step, "Step answered on the command line");
            continue;
        }
        step.ask(prompter, &mut answers)?;
    }
    Plan::from_answers(answers)
}

impl Plan {
    /// Builds a plan from complete answers.
    ///
    /// Local listings are always grouped by author. Remote listings follow
    /// the chosen [`ListAction`].
    pub fn from_answers(answers: Answers) -> Result<Self> {
        let source = answers.source.context("Branch source was not chosen")?;
        let merge_state = answers.merge_state.context("Merge state was not chosen")?;
        let outcome = answers.outcome.context("Outcome was not chosen")?;

        let grouping = match source {
            BranchSource::Local => Grouping::ByAuthor,
            BranchSource::Remote => {
                match answers.action.context("Listing action was not chosen")? {
                    ListAction::ListAll => Grouping::None,
                    ListAction::ListByAuthor => Grouping::ByAuthor,
                    ListAction::FindByAuthor => Grouping::AuthorFilter(
                        answers.author.context("Author filter was not entered")?,
                    ),
                }
            }
        };

        Ok(Self {
            source,
            merge_state,
            grouping,
            outcome,
        })
    }
}
