// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! Typed records produced by the normalizer and consumed by the aggregators.
//!
//! Records are immutable value objects. Required fields are guaranteed by the
//! normalizer, so aggregation code never re-checks them.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::window::TimeWindow;

/// Identity reported when a commit carries neither an account login nor an
/// embedded author name.
pub const UNKNOWN_CONTRIBUTOR: &str = "Unknown";

/// Paginated collection exposed by the upstream API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize,)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind
{
    /// `/repos/{owner}/{repo}/commits`
    Commits,
    /// `/repos/{owner}/{repo}/issues`
    Issues,
    /// `/repos/{owner}/{repo}/pulls`
    Pulls,
}

impl ResourceKind
{
    /// Path segment appended to the repository route.
    pub const fn path(self,) -> &'static str
    {
        match self {
            Self::Commits => "commits",
            Self::Issues => "issues",
            Self::Pulls => "pulls",
        }
    }
}

impl fmt::Display for ResourceKind
{
    fn fmt(&self, f: &mut fmt::Formatter<'_,>,) -> fmt::Result
    {
        f.write_str(self.path(),)
    }
}

/// Family of event-like records sharing the open/closed lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize,)]
#[serde(rename_all = "snake_case")]
pub enum EventKind
{
    /// Repository issue.
    Issue,
    /// Pull request.
    PullRequest,
}

impl EventKind
{
    /// Collection the records of this kind are fetched from.
    pub const fn resource(self,) -> ResourceKind
    {
        match self {
            Self::Issue => ResourceKind::Issues,
            Self::PullRequest => ResourceKind::Pulls,
        }
    }

    /// Display label used in rendered summaries.
    pub const fn label(self,) -> &'static str
    {
        match self {
            Self::Issue => "Issues",
            Self::PullRequest => "Pull requests",
        }
    }

    /// Record family name used in diagnostics.
    pub const fn record_name(self,) -> &'static str
    {
        match self {
            Self::Issue => "issue",
            Self::PullRequest => "pull request",
        }
    }

    /// Staleness threshold applied when the caller does not supply one.
    pub const fn default_days_to_old(self,) -> u32
    {
        match self {
            Self::Issue => crate::config::DEFAULT_ISSUE_DAYS_TO_OLD,
            Self::PullRequest => crate::config::DEFAULT_PR_DAYS_TO_OLD,
        }
    }
}

/// Lifecycle state of an issue or pull request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize,)]
#[serde(rename_all = "snake_case")]
pub enum EventState
{
    /// Still open.
    Open,
    /// Closed or merged.
    Closed,
}

impl EventState
{
    /// Parses the upstream wire value.
    pub fn from_wire(value: &str,) -> Option<Self,>
    {
        match value {
            "open" => Some(Self::Open,),
            "closed" => Some(Self::Closed,),
            _ => None,
        }
    }

    /// Upstream wire value.
    pub const fn as_str(self,) -> &'static str
    {
        match self {
            Self::Open => "open",
            Self::Closed => "closed",
        }
    }
}

/// Git identity embedded in a commit body. Not an account.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize,)]
pub struct ShortIdentity
{
    /// Display name recorded by git.
    pub name:  Option<String,>,
    /// E-mail address recorded by git.
    pub email: Option<String,>,
}

/// Normalized commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize,)]
pub struct CommitRecord
{
    /// API URL of the commit.
    pub url:             String,
    /// Author identity from the commit body.
    pub author:          Option<ShortIdentity,>,
    /// Committer identity from the commit body.
    pub committer:       Option<ShortIdentity,>,
    /// Login of the account linked to the author, when the hosting service
    /// could match one.
    pub author_login:    Option<String,>,
    /// Login of the account linked to the committer.
    pub committer_login: Option<String,>,
    /// Commit message.
    pub message:         String,
}

impl CommitRecord
{
    /// Resolves the single identity this commit is credited to.
    ///
    /// The linked author account wins; otherwise the embedded author's display
    /// name is used, and [`UNKNOWN_CONTRIBUTOR`] when both are missing.
    ///
    /// # Examples
    ///
    /// ```
    /// use repostat::{CommitRecord, ShortIdentity};
    ///
    /// let commit = CommitRecord {
    ///     url:             "https://api.github.com/repos/o/r/commits/1".to_owned(),
    ///     author:          Some(ShortIdentity {
    ///         name: Some("Bob".to_owned(),), email: None,
    ///     },),
    ///     committer:       None,
    ///     author_login:    None,
    ///     committer_login: None,
    ///     message:         "fix".to_owned(),
    /// };
    /// assert_eq!(commit.contributor(), "Bob");
    /// ```
    pub fn contributor(&self,) -> &str
    {
        self.author_login
            .as_deref()
            .or_else(|| self.author.as_ref().and_then(|author| author.name.as_deref(),),)
            .unwrap_or(UNKNOWN_CONTRIBUTOR,)
    }
}

/// Normalized issue or pull request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize,)]
pub struct EventRecord
{
    /// Record family.
    pub kind:       EventKind,
    /// API URL of the record.
    pub url:        String,
    /// Lifecycle state.
    pub state:      EventState,
    /// Creation timestamp.
    pub created_at: DateTime<Utc,>,
    /// Closing timestamp; upstream sets it exactly when the state is closed.
    pub closed_at:  Option<DateTime<Utc,>,>,
    /// Draft flag, reported for pull requests only.
    pub is_draft:   Option<bool,>,
}

/// Repository, branch and time window a statistic was collected for.
///
/// # Examples
///
/// ```
/// use repostat::{StatisticScope, TimeWindow};
///
/// let scope = StatisticScope::new("octocat", "hello-world", Some("main",), TimeWindow::unbounded(),);
/// assert_eq!(scope.to_string(), "octocat/hello-world on branch main for all time");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize,)]
pub struct StatisticScope
{
    /// Repository owner.
    pub organisation: String,
    /// Repository name.
    pub repository:   String,
    /// Branch the commits were listed from; `None` means the default branch.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch:       Option<String,>,
    /// Time window applied to the records.
    pub window:       TimeWindow,
}

impl StatisticScope
{
    /// Creates a scope.
    pub fn new(organisation: &str, repository: &str, branch: Option<&str,>, window: TimeWindow,) -> Self
    {
        Self {
            organisation: organisation.to_owned(),
            repository: repository.to_owned(),
            branch: branch.map(str::to_owned,),
            window,
        }
    }
}

impl fmt::Display for StatisticScope
{
    fn fmt(&self, f: &mut fmt::Formatter<'_,>,) -> fmt::Result
    {
        write!(f, "{}/{}", self.organisation, self.repository)?;
        if let Some(branch,) = &self.branch {
            write!(f, " on branch {branch}")?;
        }
        write!(f, " {}", self.window)
    }
}
