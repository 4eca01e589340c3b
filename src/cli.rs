//! CLI interface for git-clean.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use crate::config::Config;
use crate::data::BranchSource;
use crate::error::CleanError;
use crate::git::{BranchFilter, EnrichContext};
use crate::issue::IssueLinker;

pub mod config;
pub mod formatting;
pub mod list;
pub mod run;

/// git-clean: find stale branches, then delete them or remind their authors.
#[derive(Parser)]
#[command(name = "git-clean")]
#[command(about = "Find stale git branches and clean them up", long_about = None)]
#[command(version)]
#[command(args_conflicts_with_subcommands = true)]
pub struct Cli {
    /// The command to execute; the interactive wizard when omitted.
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Wizard options used when no command is given.
    #[command(flatten)]
    pub run: run::RunCommand,
}

/// Top-level commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Runs the interactive cleanup wizard.
    Run(run::RunCommand),
    /// Lists branches without prompting.
    List(list::ListCommand),
    /// Configuration operations.
    Config(config::ConfigCommand),
}

impl Cli {
    /// Executes the CLI command.
    pub async fn execute(self) -> Result<()> {
        match self.command {
            None => self.run.execute().await,
            Some(Commands::Run(run_cmd)) => run_cmd.execute().await,
            Some(Commands::List(list_cmd)) => list_cmd.execute().await,
            Some(Commands::Config(config_cmd)) => config_cmd.execute(),
        }
    }
}

/// Parses an author filter, rejecting blank text.
pub(crate) fn parse_author(value: &str) -> Result<String, String> {
    let value = value.trim();
    if value.is_empty() {
        return Err("author name must not be empty".to_string());
    }
    Ok(value.to_string())
}

/// Builds the listing filter from configuration.
pub(crate) fn branch_filter(config: &Config) -> BranchFilter {
    BranchFilter {
        main_branch: config.main_branch.clone(),
        protected: config.protected_branches.clone(),
        remote_name: config.remote_name.clone(),
    }
}

/// Builds the enrichment context for one listing.
pub(crate) fn enrich_context(config: &Config, source: BranchSource) -> Result<EnrichContext> {
    let linker = IssueLinker::new(&config.issue_projects, config.issue_base_url.as_deref())
        .context("Failed to build issue link pattern")?;
    Ok(EnrichContext {
        source,
        remote_name: config.remote_name.clone(),
        linker,
    })
}

/// Picks the command-line concurrency over the configured one.
pub(crate) fn resolve_concurrency(flag: Option<usize>, config: &Config) -> Result<usize, CleanError> {
    match flag {
        Some(0) => Err(CleanError::InvalidConfig(
            "--concurrency must be at least 1".to_string(),
        )),
        Some(n) => Ok(n),
        None => Ok(config.concurrency),
    }
}
