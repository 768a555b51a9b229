// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! Configuration document describing how statistics are collected.
//!
//! The YAML document mirrors the knobs exposed by the CLI. Every value is
//! optional and falls back to the defaults below, so an empty document is a
//! valid configuration.

use std::{fs, path::Path};

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{self, Error};

/// REST endpoint used when no override is configured.
pub const DEFAULT_BASE_URL: &str = "https://api.github.com";
/// Upper bound on simultaneous page requests in concurrent mode.
pub const DEFAULT_MAX_CONCURRENCY: usize = 8;
/// Days after which an open issue counts as old.
pub const DEFAULT_ISSUE_DAYS_TO_OLD: u32 = 14;
/// Days after which an open pull request counts as old.
pub const DEFAULT_PR_DAYS_TO_OLD: u32 = 30;
/// Number of contributors shown in rendered rankings.
pub const DEFAULT_TOP_CONTRIBUTORS: usize = 30;

/// Root configuration document.
///
/// # Examples
///
/// ```
/// use repostat::CollectorConfig;
///
/// let config = repostat::parse_config("max_concurrency: 4\npr_days_to_old: 10\n",)?;
/// assert_eq!(config.max_concurrency, 4);
/// assert_eq!(config.pr_days_to_old, 10);
/// assert_eq!(config.issue_days_to_old, 14);
/// # Ok::<(), repostat::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize,)]
#[serde(default)]
pub struct CollectorConfig
{
    /// Base URL of the REST API.
    #[serde(alias = "base-url", alias = "baseUrl")]
    pub base_url:          String,
    /// Optional bearer token; requests are unauthenticated without it.
    #[serde(skip_serializing)]
    pub token:             Option<String,>,
    /// Maximum number of page requests in flight in concurrent mode.
    #[serde(alias = "max-concurrency", alias = "maxConcurrency")]
    pub max_concurrency:   usize,
    /// Staleness threshold for issues, in days.
    #[serde(alias = "issue-days-to-old", alias = "issueDaysToOld")]
    pub issue_days_to_old: u32,
    /// Staleness threshold for pull requests, in days.
    #[serde(alias = "pr-days-to-old", alias = "prDaysToOld")]
    pub pr_days_to_old:    u32,
    /// Number of contributors rendered in rankings.
    #[serde(alias = "top-contributors", alias = "topContributors")]
    pub top_contributors:  usize,
}

impl Default for CollectorConfig
{
    fn default() -> Self
    {
        Self {
            base_url:          DEFAULT_BASE_URL.to_owned(),
            token:             None,
            max_concurrency:   DEFAULT_MAX_CONCURRENCY,
            issue_days_to_old: DEFAULT_ISSUE_DAYS_TO_OLD,
            pr_days_to_old:    DEFAULT_PR_DAYS_TO_OLD,
            top_contributors:  DEFAULT_TOP_CONTRIBUTORS,
        }
    }
}

impl CollectorConfig
{
    /// Checks the invariants every consumer relies on.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Argument`] when the base URL is not absolute or a
    /// count that must be positive is zero.
    pub fn validate(&self,) -> Result<(), Error,>
    {
        let base = Url::parse(&self.base_url,)
            .map_err(|e| Error::argument(format!("invalid base_url '{}': {e}", self.base_url),),)?;
        if base.cannot_be_a_base() {
            return Err(Error::argument(format!("base_url '{}' must be absolute", self.base_url),),);
        }
        if self.max_concurrency == 0 {
            return Err(Error::argument("max_concurrency must be greater than 0",),);
        }
        if self.top_contributors == 0 {
            return Err(Error::argument("top_contributors must be greater than 0",),);
        }
        Ok((),)
    }

    /// Extracts the settings consumed by the HTTP client.
    ///
    /// Blank tokens are treated as absent.
    pub fn client(&self,) -> ClientConfig
    {
        ClientConfig {
            base_url:        self.base_url.trim_end_matches('/',).to_owned(),
            token:           self.token.as_deref().map(str::trim,).filter(|t| !t.is_empty(),).map(str::to_owned,),
            max_concurrency: self.max_concurrency,
        }
    }
}

/// Settings consumed by [`GithubClient`](crate::GithubClient).
#[derive(Debug, Clone, PartialEq, Eq,)]
pub struct ClientConfig
{
    /// Base URL of the REST API without a trailing slash.
    pub base_url:        String,
    /// Optional bearer token.
    pub token:           Option<String,>,
    /// Maximum number of page requests in flight in concurrent mode.
    pub max_concurrency: usize,
}

impl Default for ClientConfig
{
    fn default() -> Self
    {
        CollectorConfig::default().client()
    }
}

/// Loads and validates a configuration document from disk.
///
/// # Errors
///
/// Returns [`Error::ConfigIo`] when the file cannot be read,
/// [`Error::ConfigParse`] for invalid YAML and [`Error::Argument`] when the
/// values violate invariants.
pub fn load_config(path: &Path,) -> Result<CollectorConfig, Error,>
{
    let contents = fs::read_to_string(path,).map_err(|source| error::config_io_error(path, source,),)?;
    parse_config(&contents,)
}

/// Parses and validates a configuration document.
///
/// An empty or whitespace-only document yields the defaults.
///
/// # Errors
///
/// Propagates [`Error::ConfigParse`] and [`Error::Argument`].
pub fn parse_config(contents: &str,) -> Result<CollectorConfig, Error,>
{
    let config = if contents.trim().is_empty() {
        CollectorConfig::default()
    } else {
        serde_yaml::from_str::<CollectorConfig,>(contents,)?
    };
    config.validate()?;
    Ok(config,)
}
