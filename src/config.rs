//! Configuration loading.
//!
//! Settings are read from JSON `.gitcleanrc` files in the home directory and
//! the working directory, then from `GITCLEAN_<KEY>` environment variables.
//! Later layers override earlier ones; built-in defaults fill the gaps.

use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use crate::error::CleanError;
use crate::git::DEFAULT_CONCURRENCY;

/// Name of the settings file looked up in each directory.
pub const RC_FILE_NAME: &str = ".gitcleanrc";

/// Prefix of environment variable overrides.
pub const ENV_PREFIX: &str = "GITCLEAN_";

const DEFAULT_MAIN_BRANCH: &str = "master";
const DEFAULT_PROTECTED_BRANCHES: &str = "HEAD, origin/master";
const DEFAULT_REMOTE_NAME: &str = "origin";

/// One layer of settings as written in a `.gitcleanrc` file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct RawSettings {
    /// Branch that others are compared against.
    pub main_branch: Option<String>,
    /// Comma-separated protected branches.
    pub protected_branches: Option<String>,
    /// Remote used for remote listings, deletion and pruning.
    pub remote_name: Option<String>,
    /// Comma-separated issue tracker project keys.
    pub jira_projects: Option<String>,
    /// Issue tracker base URL.
    pub remote_url: Option<String>,
    /// SMTP relay host.
    pub smtp_server: Option<String>,
    /// SMTP user, also the sender address.
    pub smtp_user: Option<String>,
    /// SMTP password.
    pub smtp_password: Option<String>,
    /// Chat webhook URL.
    pub teams_webhook_url: Option<String>,
    /// Email address rewrites, literal substring to replacement.
    pub email_aliases: Option<BTreeMap<String, String>>,
    /// Maximum concurrent metadata lookups.
    pub concurrency: Option<usize>,
}

impl RawSettings {
    /// Loads one layer from a file; a missing file is an empty layer.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file: {}", path.display()))?;

        let settings = serde_json::from_str::<Self>(&content).map_err(|e| {
            CleanError::InvalidConfig(format!("{}: {e}", path.display()))
        })?;

        debug!(path = %path.display(), "Loaded settings file");
        Ok(settings)
    }

    /// Reads `GITCLEAN_<KEY>` overrides through `lookup`.
    ///
    /// `EMAIL_ALIASES` is only read from files.
    pub fn from_env_with<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(&format!("{ENV_PREFIX}{key}"));

        let concurrency = match var("CONCURRENCY") {
            Some(value) => Some(value.trim().parse::<usize>().map_err(|e| {
                CleanError::InvalidConfig(format!("{ENV_PREFIX}CONCURRENCY '{value}': {e}"))
            })?),
            None => None,
        };

        Ok(Self {
            main_branch: var("MAIN_BRANCH"),
            protected_branches: var("PROTECTED_BRANCHES"),
            remote_name: var("REMOTE_NAME"),
            jira_projects: var("JIRA_PROJECTS"),
            remote_url: var("REMOTE_URL"),
            smtp_server: var("SMTP_SERVER"),
            smtp_user: var("SMTP_USER"),
            smtp_password: var("SMTP_PASSWORD"),
            teams_webhook_url: var("TEAMS_WEBHOOK_URL"),
            email_aliases: None,
            concurrency,
        })
    }

    /// Overlays `other` on top of `self`; values set in `other` win.
    pub fn merge(self, other: Self) -> Self {
        Self {
            main_branch: other.main_branch.or(self.main_branch),
            protected_branches: other.protected_branches.or(self.protected_branches),
            remote_name: other.remote_name.or(self.remote_name),
            jira_projects: other.jira_projects.or(self.jira_projects),
            remote_url: other.remote_url.or(self.remote_url),
            smtp_server: other.smtp_server.or(self.smtp_server),
            smtp_user: other.smtp_user.or(self.smtp_user),
            smtp_password: other.smtp_password.or(self.smtp_password),
            teams_webhook_url: other.teams_webhook_url.or(self.teams_webhook_url),
            email_aliases: other.email_aliases.or(self.email_aliases),
            concurrency: other.concurrency.or(self.concurrency),
        }
    }
}

/// SMTP credentials.
#[derive(Debug, Clone, Serialize)]
pub struct SmtpSettings {
    /// Relay host, optionally `host:port`.
    pub server: String,
    /// Login, also used as the sender address.
    pub user: String,
    /// Password.
    #[serde(serialize_with = "redact")]
    pub password: String,
}

#[allow(clippy::ptr_arg)]
fn redact<S: serde::Serializer>(_: &String, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str("********")
}

/// Resolved configuration.
#[derive(Debug, Clone, Serialize)]
pub struct Config {
    /// Branch that others are compared against.
    pub main_branch: String,
    /// Branches never listed or deleted.
    pub protected_branches: Vec<String>,
    /// Remote used for remote listings, deletion and pruning.
    pub remote_name: String,
    /// Issue tracker project keys.
    pub issue_projects: Vec<String>,
    /// Issue tracker base URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issue_base_url: Option<String>,
    /// SMTP settings, when email notification is configured.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub smtp: Option<SmtpSettings>,
    /// Chat webhook URL, when webhook notification is configured.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub webhook_url: Option<String>,
    /// Email address rewrites.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub email_aliases: BTreeMap<String, String>,
    /// Maximum concurrent metadata lookups.
    pub concurrency: usize,
}

impl Config {
    /// Loads configuration from the default locations and the environment.
    pub fn load() -> Result<Self> {
        let home_rc = dirs::home_dir().map(|home| home.join(RC_FILE_NAME));
        let local_rc = PathBuf::from(RC_FILE_NAME);
        Self::load_layers(home_rc.as_deref(), Some(local_rc.as_path()), |key| {
            env::var(key).ok()
        })
    }

    /// Loads configuration from explicit file layers and an environment lookup.
    pub fn load_layers<F>(home_rc: Option<&Path>, local_rc: Option<&Path>, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut raw = RawSettings::default();
        for path in [home_rc, local_rc].into_iter().flatten() {
            raw = raw.merge(RawSettings::load_from_path(path)?);
        }
        raw = raw.merge(RawSettings::from_env_with(lookup)?);
        Ok(Self::resolve(raw)?)
    }

    /// Applies defaults and validates a merged settings layer.
    pub fn resolve(raw: RawSettings) -> Result<Self, CleanError> {
        let main_branch = non_blank(raw.main_branch)
            .unwrap_or_else(|| DEFAULT_MAIN_BRANCH.to_string());

        let protected_branches = split_list(
            raw.protected_branches
                .as_deref()
                .unwrap_or(DEFAULT_PROTECTED_BRANCHES),
        );

        let remote_name = non_blank(raw.remote_name)
            .unwrap_or_else(|| DEFAULT_REMOTE_NAME.to_string());

        let issue_projects = raw.jira_projects.as_deref().map(split_list).unwrap_or_default();

        let issue_base_url = non_blank(raw.remote_url)
            .map(|url| validate_url("REMOTE_URL", url))
            .transpose()?;

        let webhook_url = non_blank(raw.teams_webhook_url)
            .map(|url| validate_url("TEAMS_WEBHOOK_URL", url))
            .transpose()?;

        let smtp = match (non_blank(raw.smtp_server), raw.smtp_user) {
            (Some(server), Some(user)) => Some(SmtpSettings {
                server,
                user,
                password: raw.smtp_password.unwrap_or_default(),
            }),
            (Some(_), None) => {
                return Err(CleanError::InvalidConfig(
                    "SMTP_SERVER is set but SMTP_USER is missing".to_string(),
                ))
            }
            _ => None,
        };

        let concurrency = raw.concurrency.unwrap_or(DEFAULT_CONCURRENCY);
        if concurrency == 0 {
            return Err(CleanError::InvalidConfig(
                "CONCURRENCY must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            main_branch,
            protected_branches,
            remote_name,
            issue_projects,
            issue_base_url,
            smtp,
            webhook_url,
            email_aliases: raw.email_aliases.unwrap_or_default(),
            concurrency,
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Splits a comma-separated list, dropping blank entries.
pub fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn validate_url(key: &str, value: String) -> Result<String, CleanError> {
    Url::parse(&value)
        .map_err(|e| CleanError::InvalidConfig(format!("{key} '{value}' is not a valid URL: {e}")))?;
    Ok(value)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn defaults_without_any_layer() {
        let config = Config::load_layers(None, None, no_env).unwrap();
        assert_eq!(config.main_branch, "master");
        assert_eq!(config.protected_branches, ["HEAD", "origin/master"]);
        assert_eq!(config.remote_name, "origin");
        assert!(config.issue_projects.is_empty());
        assert!(config.issue_base_url.is_none());
        assert!(config.smtp.is_none());
        assert!(config.webhook_url.is_none());
        assert_eq!(config.concurrency, DEFAULT_CONCURRENCY);
    }

    #[test]
    fn missing_file_is_an_empty_layer() {
        let dir = TempDir::new().unwrap();
        let raw = RawSettings::load_from_path(dir.path().join(RC_FILE_NAME)).unwrap();
        assert!(raw.main_branch.is_none());
    }

    #[test]
    fn local_file_overrides_home_file_and_env_overrides_both() {
        let dir = TempDir::new().unwrap();
        let home_rc = dir.path().join("home.json");
        let local_rc = dir.path().join("local.json");
        fs::write(
            &home_rc,
            r#"{
                "MAIN_BRANCH": "develop",
                "JIRA_PROJECTS": "ABC, DEF",
                "REMOTE_URL": "https://tracker.example.com",
                "EMAIL_ALIASES": { "@old.example.com": "@example.com" }
            }"#,
        )
        .unwrap();
        fs::write(&local_rc, r#"{ "MAIN_BRANCH": "main", "PROTECTED_BRANCHES": "HEAD,release" }"#)
            .unwrap();

        let env: HashMap<&str, &str> = [("GITCLEAN_REMOTE_NAME", "upstream")].into_iter().collect();
        let config = Config::load_layers(Some(home_rc.as_path()), Some(local_rc.as_path()), |key| {
            env.get(key).map(|v| (*v).to_string())
        })
        .unwrap();

        assert_eq!(config.main_branch, "main");
        assert_eq!(config.protected_branches, ["HEAD", "release"]);
        assert_eq!(config.remote_name, "upstream");
        assert_eq!(config.issue_projects, ["ABC", "DEF"]);
        assert_eq!(config.issue_base_url.as_deref(), Some("https://tracker.example.com"));
        assert_eq!(
            config.email_aliases.get("@old.example.com").map(String::as_str),
            Some("@example.com")
        );
    }

    #[test]
    fn malformed_file_is_invalid_config() {
        let dir = TempDir::new().unwrap();
        let rc = dir.path().join(RC_FILE_NAME);
        fs::write(&rc, "MAIN_BRANCH=main").unwrap();

        let err = RawSettings::load_from_path(&rc).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<CleanError>(),
            Some(CleanError::InvalidConfig(_))
        ));
    }

    #[test]
    fn invalid_urls_are_rejected() {
        let raw = RawSettings {
            remote_url: Some("not a url".to_string()),
            ..RawSettings::default()
        };
        assert!(matches!(Config::resolve(raw), Err(CleanError::InvalidConfig(_))));
    }

    #[test]
    fn smtp_requires_user() {
        let raw = RawSettings {
            smtp_server: Some("smtp.example.com".to_string()),
            ..RawSettings::default()
        };
        assert!(Config::resolve(raw).is_err());

        let raw = RawSettings {
            smtp_server: Some("smtp.example.com".to_string()),
            smtp_user: Some("bot@example.com".to_string()),
            smtp_password: Some("hunter2".to_string()),
            ..RawSettings::default()
        };
        let smtp = Config::resolve(raw).unwrap().smtp.unwrap();
        assert_eq!(smtp.server, "smtp.example.com");
        assert_eq!(smtp.password, "hunter2");
    }

    #[test]
    fn blank_main_branch_falls_back_to_default() {
        let raw = RawSettings {
            main_branch: Some("  ".to_string()),
            ..RawSettings::default()
        };
        assert_eq!(Config::resolve(raw).unwrap().main_branch, "master");
    }

    #[test]
    fn zero_concurrency_is_rejected() {
        let err = RawSettings::from_env_with(|key| {
            (key == "GITCLEAN_CONCURRENCY").then(|| "0".to_string())
        })
        .and_then(|raw| Ok(Config::resolve(raw)?));
        assert!(err.is_err());

        let err = RawSettings::from_env_with(|key| {
            (key == "GITCLEAN_CONCURRENCY").then(|| "many".to_string())
        });
        assert!(err.is_err());
    }

    #[test]
    fn yaml_view_redacts_password() {
        let raw = RawSettings {
            smtp_server: Some("smtp.example.com".to_string()),
            smtp_user: Some("bot@example.com".to_string()),
            smtp_password: Some("hunter2".to_string()),
            ..RawSettings::default()
        };
        let yaml = serde_yaml::to_string(&Config::resolve(raw).unwrap()).unwrap();
        assert!(!yaml.contains("hunter2"));
        assert!(yaml.contains("********"));
    }

    #[test]
    fn split_list_drops_blanks() {
        assert_eq!(split_list(" a, ,b ,"), ["a", "b"]);
        assert!(split_list("").is_empty());
    }
}
