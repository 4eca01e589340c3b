//! Non-interactive branch listing.

use anyhow::Result;
use clap::{Parser, ValueEnum};
use termcolor::{ColorChoice, StandardStream};

use super::formatting::print_groups;
use super::{branch_filter, enrich_context, resolve_concurrency};
use crate::config::Config;
use crate::data::{to_yaml, BranchListing, BranchSource, Grouping, MergeState, VersionInfo};
use crate::git::{enrich_branches, list_branches, GitRunner, SystemGit};
use crate::utils::check_branch_command_prerequisites;

/// How listed branches are grouped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum GroupBy {
    /// A single list, oldest first.
    #[value(name = "none")]
    Flat,
    /// One section per last committer.
    Author,
}

/// Output format of the listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Coloured columns.
    Table,
    /// YAML document.
    Yaml,
}

/// List command options.
#[derive(Parser, Debug)]
pub struct ListCommand {
    /// List local or remote branches.
    #[arg(long, value_enum, default_value_t = BranchSource::Local)]
    pub source: BranchSource,

    /// List merged or unmerged branches.
    #[arg(long, value_enum, default_value_t = MergeState::Merged)]
    pub merge_state: MergeState,

    /// How to group the branches.
    #[arg(long, value_enum, default_value_t = GroupBy::Author)]
    pub group: GroupBy,

    /// Only show authors whose name contains this text (case-insensitive).
    #[arg(long, value_parser = crate::cli::parse_author)]
    pub author: Option<String>,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,

    /// Maximum concurrent metadata lookups.
    #[arg(long)]
    pub concurrency: Option<usize>,
}

impl ListCommand {
    /// Executes the list command.
    pub async fn execute(self) -> Result<()> {
        check_branch_command_prerequisites()?;
        let config = Config::load()?;
        let listing = self.build_listing(&SystemGit::new(), &config).await?;

        match self.format {
            OutputFormat::Yaml => print!("{}", to_yaml(&listing)?),
            OutputFormat::Table => {
                let mut out = StandardStream::stdout(ColorChoice::Auto);
                print_groups(&mut out, &listing.groups)?;
            }
        }
        Ok(())
    }

    /// Returns how the branches should be grouped.
    pub fn grouping(&self) -> Grouping {
        match (&self.author, self.group) {
            (Some(author), _) if !author.trim().is_empty() => {
                Grouping::AuthorFilter(author.clone())
            }
            (_, GroupBy::Author) => Grouping::ByAuthor,
            (_, GroupBy::Flat) => Grouping::None,
        }
    }

    /// Lists, enriches and groups branches.
    pub(crate) async fn build_listing(
        &self,
        git: &dyn GitRunner,
        config: &Config,
    ) -> Result<BranchListing> {
        let concurrency = resolve_concurrency(self.concurrency, config)?;
        let names = list_branches(git, self.source, self.merge_state, &branch_filter(config)).await?;
        let ctx = enrich_context(config, self.source)?;
        let branches = enrich_branches(git, &names, &ctx, concurrency).await?;
        let groups = self.grouping().apply(branches);

        Ok(BranchListing {
            versions: VersionInfo::default(),
            source: self.source,
            merge_state: self.merge_state,
            main_branch: config.main_branch.clone(),
            total: groups.len(),
            groups,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::RawSettings;
    use crate::git::test_utils::RecordingGit;

    const FORMAT: &str = "--format=%cn | %cr | %cI | %ce";

    fn command(args: &[&str]) -> ListCommand {
        let mut argv = vec!["list"];
        argv.extend_from_slice(args);
        ListCommand::try_parse_from(argv).unwrap()
    }

    fn git() -> RecordingGit {
        RecordingGit::new()
            .respond(
                &["branch", "--no-color", "--no-merged", "main"],
                "* main\n  JIRA-9-search\n+ wip\n",
            )
            .respond(
                &["log", "-n", "1", FORMAT, "JIRA-9-search", "--"],
                "Anna Smith | 2 days ago | 2024-05-02T09:00:00+02:00 | anna@example.com\n",
            )
            .respond(
                &["log", "-n", "1", FORMAT, "wip", "--"],
                "Bob Jones | 5 days ago | 2024-04-29T09:00:00+02:00 | bob@example.com\n",
            )
    }

    fn config() -> Config {
        Config::resolve(RawSettings {
            main_branch: Some("main".to_string()),
            jira_projects: Some("JIRA".to_string()),
            remote_url: Some("https://jira.example.com".to_string()),
            ..RawSettings::default()
        })
        .unwrap()
    }

    #[test]
    fn defaults() {
        let cmd = command(&[]);
        assert_eq!(cmd.source, BranchSource::Local);
        assert_eq!(cmd.merge_state, MergeState::Merged);
        assert_eq!(cmd.grouping(), Grouping::ByAuthor);
        assert_eq!(cmd.format, OutputFormat::Table);
    }

    #[test]
    fn author_takes_precedence_over_group() {
        let cmd = command(&["--group", "none", "--author", "ann"]);
        assert_eq!(cmd.grouping(), Grouping::AuthorFilter("ann".to_string()));
        assert_eq!(command(&["--group", "none"]).grouping(), Grouping::None);
    }

    #[test]
    fn blank_author_is_rejected() {
        assert!(ListCommand::try_parse_from(["list", "--author", ""]).is_err());
    }

    #[tokio::test]
    async fn listing_is_enriched_and_grouped() {
        let cmd = command(&["--merge-state", "unmerged", "--group", "none"]);
        let listing = cmd.build_listing(&git(), &config()).await.unwrap();

        assert_eq!(listing.total, 2);
        let names: Vec<_> = listing.groups.branches().map(|b| b.name.as_str()).collect();
        assert_eq!(names, ["wip", "JIRA-9-search"]);
        let search = listing.groups.branches().nth(1).unwrap();
        assert_eq!(search.issue_url, "https://jira.example.com/browse/JIRA-9");

        let yaml = to_yaml(&listing).unwrap();
        assert!(yaml.contains("merge_state: unmerged"));
        assert!(yaml.contains("main_branch: main"));
    }
}
